use iced::{
    widget::{button, column, container, row, text, text_input, Column, Row, Space},
    alignment, font, Background, Border, Color, Element, Font, Length, Theme,
};

use crate::activity::{self, Kind};
use crate::analysis::DrugAnalysis;
use crate::display::status_style;
use crate::history::HistoryEntry;
use crate::Message;

const BOLD: Font = Font {
    weight: font::Weight::Bold,
    ..Font::MONOSPACE
};

const MUTED: Color = Color::from_rgb(0.58, 0.62, 0.72);
const PANEL: Color = Color::from_rgba(1.0, 1.0, 1.0, 0.04);
const ERROR_RED: Color = Color::from_rgb(0.94, 0.36, 0.36);

const LOADING_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const LOADING_MESSAGES: [&str; 6] = [
    "Checking international schedules...",
    "Resolving street names...",
    "Consulting regulatory lists...",
    "Looking up the active ingredient...",
    "Reviewing prescription rules...",
    "Weighing the safety profile...",
];

const DISCLAIMER: &str = "Disclaimer: this tool uses AI to analyze drug statuses based on general international regulatory data (e.g., NDLEA, DEA, WHO). It is for informational purposes only and does not constitute legal or medical advice. Always consult official government gazettes or a qualified professional for verification.";

fn panel(background: Color) -> impl Fn(&Theme) -> container::Style {
    move |_theme: &Theme| container::Style {
        background: Some(Background::Color(background)),
        border: Border {
            radius: 10.0.into(),
            ..Border::default()
        },
        ..container::Style::default()
    }
}

pub fn header<'a>() -> Element<'a, Message> {
    let title = column![
        text("DrugCheck").size(24).font(BOLD),
        text("SENTINEL SYSTEM").size(12).color(MUTED),
    ]
    .spacing(2);

    let intro = text(
        "Check whether a drug is controlled, prescription-only, or OTC using AI analysis aligned with regulatory standards.",
    )
    .size(14)
    .color(MUTED);

    column![title, intro].spacing(12).into()
}

pub fn search_bar<'a>(value: &'a str, input_id: &text_input::Id, loading: bool) -> Element<'a, Message> {
    let mut input = text_input("Enter drug name (e.g., Tramadol, Codeine)...", value)
        .id(input_id.clone())
        .padding(15)
        .size(18);

    // No on_input means the field is disabled
    if !loading {
        input = input
            .on_input(Message::InputChanged)
            .on_submit(Message::Submit);
    }

    let can_submit = !loading && !value.trim().is_empty();
    let label = if loading { "..." } else { "Analyze" };
    let submit = button(text(label).size(16).font(BOLD))
        .padding(15)
        .on_press_maybe(can_submit.then_some(Message::Submit));

    row![input, submit]
        .spacing(10)
        .align_y(alignment::Vertical::Center)
        .into()
}

pub fn loading_indicator<'a>(frame: usize) -> Element<'a, Message> {
    let message_idx = (frame / 10) % LOADING_MESSAGES.len();
    let spinner_idx = frame % LOADING_FRAMES.len();

    container(
        column![
            text(LOADING_FRAMES[spinner_idx]).size(32),
            text(LOADING_MESSAGES[message_idx]).size(15),
        ]
        .spacing(10)
        .align_x(alignment::Horizontal::Center),
    )
    .width(Length::Fill)
    .padding(30)
    .align_x(alignment::Horizontal::Center)
    .into()
}

pub fn error_banner<'a>(message: &'a str) -> Element<'a, Message> {
    container(
        row![text("⛔").size(18), text(message).size(15).color(ERROR_RED)]
            .spacing(10)
            .align_y(alignment::Vertical::Center),
    )
    .padding(15)
    .width(Length::Fill)
    .style(panel(Color { a: 0.12, ..ERROR_RED }))
    .into()
}

fn section<'a>(title: &'a str, body: Element<'a, Message>) -> Element<'a, Message> {
    container(
        column![text(title).size(12).color(MUTED).font(BOLD), body].spacing(8),
    )
    .padding(15)
    .width(Length::Fill)
    .style(panel(PANEL))
    .into()
}

fn bullet_list<'a>(items: &'a [String], bullet: &'a str) -> Element<'a, Message> {
    if items.is_empty() {
        return text("None listed").size(14).color(MUTED).into();
    }

    Column::with_children(
        items
            .iter()
            .map(|item| text(format!("{} {}", bullet, item)).size(14).into()),
    )
    .spacing(6)
    .into()
}

pub fn result_card<'a>(analysis: &'a DrugAnalysis) -> Element<'a, Message> {
    let style = status_style(analysis.status);

    let mut names = column![text(analysis.subject_name.as_str()).size(28).font(BOLD)].spacing(4);
    if let Some(scientific) = analysis.scientific_name() {
        names = names.push(text(scientific).size(14));
    }

    let badge = container(
        text(format!("{} {}", style.icon, style.label))
            .size(14)
            .font(BOLD)
            .color(style.accent),
    )
    .padding([6, 14])
    .style(panel(Color::WHITE));

    let banner = container(
        row![names, Space::with_width(Length::Fill), badge]
            .spacing(16)
            .align_y(alignment::Vertical::Center),
    )
    .padding(20)
    .width(Length::Fill)
    .style(move |_theme: &Theme| container::Style {
        background: Some(Background::Color(style.accent)),
        text_color: Some(Color::WHITE),
        border: Border {
            radius: 12.0.into(),
            ..Border::default()
        },
        ..container::Style::default()
    });

    let classification = section(
        "CLASSIFICATION & REASON",
        column![
            text(analysis.classification.as_str()).size(18).font(BOLD),
            text(analysis.reason.as_str()).size(14),
        ]
        .spacing(6)
        .into(),
    );

    let legal = section(
        "LEGAL IMPLICATIONS",
        text(analysis.legal_implications.as_str()).size(14).into(),
    );

    let lists = row![
        section("COMMON USES", bullet_list(&analysis.common_uses, "•")),
        section("SAFETY WARNINGS", bullet_list(&analysis.safety_warnings, "⚠")),
    ]
    .spacing(12);

    let copy_button = container(
        button(text("[Copy]").size(14))
            .on_press(Message::CopyResult)
            .padding(10),
    )
    .width(Length::Fill)
    .align_x(alignment::Horizontal::Right);

    column![banner, classification, legal, lists, copy_button]
        .spacing(12)
        .into()
}

fn history_button<'a>(entry: &'a HistoryEntry) -> Element<'a, Message> {
    let style = status_style(entry.analysis.status);

    button(
        column![
            text(entry.analysis.subject_name.as_str()).size(15).font(BOLD),
            text(style.short_label).size(12).color(style.accent),
        ]
        .spacing(4),
    )
    .on_press(Message::HistorySelected(entry.id.clone()))
    .width(Length::Fill)
    .padding(12)
    .style(button::secondary)
    .into()
}

pub fn history_list<'a>(entries: Vec<&'a HistoryEntry>) -> Option<Element<'a, Message>> {
    if entries.is_empty() {
        return None;
    }

    let rows = entries.chunks(3).map(|chunk| {
        let mut cells: Vec<Element<'a, Message>> = chunk.iter().map(|e| history_button(*e)).collect();
        while cells.len() < 3 {
            cells.push(Space::with_width(Length::Fill).into());
        }
        Row::with_children(cells).spacing(10).into()
    });

    Some(
        column![
            text("RECENT SEARCHES").size(12).color(MUTED).font(BOLD),
            Column::with_children(rows).spacing(10),
        ]
        .spacing(10)
        .into(),
    )
}

pub fn footer<'a>(model: &'a str) -> Element<'a, Message> {
    let status = match activity::latest() {
        Some(entry) => {
            let color = match entry.kind {
                Kind::Error => ERROR_RED,
                Kind::Http | Kind::Info => MUTED,
            };
            text(format!("[{}] {}", model, entry.text)).size(12).color(color)
        }
        None => text(format!("[{}] ready", model)).size(12).color(MUTED),
    };

    column![text(DISCLAIMER).size(12).color(MUTED), status]
        .spacing(8)
        .into()
}
