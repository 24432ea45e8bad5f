mod activity;
mod analysis;
mod config;
mod controller;
mod display;
mod gemini;
mod history;
mod ui;

use iced::{
    widget::{column, container, scrollable, text_input, text_input::Id},
    Element, Length, Task, Theme, Font, Size, Subscription,
    time, clipboard,
    keyboard::{self, Key},
    event::{self, Event as IcedEvent},
    window,
};
use std::sync::Arc;
use std::time::Duration;

use activity::Kind;
use analysis::DrugAnalysis;
use controller::{Controller, Phase, RequestId};
use gemini::GeminiClient;

fn main() -> iced::Result {
    let config = config::Config::load();
    let size = Size::new(config.window.width as f32, config.window.height as f32);
    let min_size = Size::new(config.window.min_width as f32, config.window.min_height as f32);

    iced::application("DrugCheck Sentinel", App::update, App::view)
        .theme(App::theme)
        .subscription(App::subscription)
        .window(window::Settings {
            size,
            min_size: Some(min_size),
            position: window::Position::Centered,
            ..Default::default()
        })
        .default_font(Font::MONOSPACE)
        .run_with(move || App::new(config))
}

#[derive(Debug, Clone)]
pub enum Message {
    InputChanged(String),
    Submit,
    Classified(RequestId, DrugAnalysis),
    Failed(RequestId, String),
    HistorySelected(String),
    Tick,
    CopyResult,
    Exit,
}

struct App {
    input_text: String,
    controller: Controller,
    loading_frame: usize,
    client: Arc<GeminiClient>,
    input_id: Id,
}

impl App {
    fn new(config: config::Config) -> (Self, Task<Message>) {
        let client = GeminiClient::with_config(&config.gemini);
        activity::log(format!("Using model {}", client.get_model()));

        let input_id = Id::unique();

        let app = App {
            input_text: String::new(),
            controller: Controller::new(),
            loading_frame: 0,
            client: Arc::new(client),
            input_id: input_id.clone(),
        };

        (app, text_input::focus(input_id))
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::InputChanged(value) => {
                self.input_text = value;
                Task::none()
            }
            Message::Submit => {
                let Some((request_id, query)) = self.controller.submit(&self.input_text) else {
                    return Task::none();
                };

                self.loading_frame = 0;
                activity::log(format!("Checking {}", query));
                let client = self.client.clone();

                Task::future(async move {
                    match client.classify(&query).await {
                        Ok(analysis) => Message::Classified(request_id, analysis),
                        Err(e) => {
                            eprintln!("Classification failed for {}: {}", query, e);
                            activity::log_with(Kind::Error, e.to_string());
                            Message::Failed(request_id, e.user_message())
                        }
                    }
                })
            }
            Message::Classified(request_id, analysis) => {
                if !self.controller.complete(request_id, analysis) {
                    activity::log("Dropped stale response");
                }
                Task::none()
            }
            Message::Failed(request_id, error) => {
                if !self.controller.fail(request_id, error) {
                    activity::log("Dropped stale failure");
                }
                Task::none()
            }
            Message::HistorySelected(id) => {
                if let Some(entry) = self.controller.select_history(&id) {
                    activity::log(format!("Showing {} from history", entry.analysis.subject_name));
                }
                Task::none()
            }
            Message::Tick => {
                if self.controller.is_loading() {
                    self.loading_frame = (self.loading_frame + 1) % 60; // 10 frames * 6 messages
                }
                Task::none()
            }
            Message::CopyResult => {
                match self.controller.current_result() {
                    Some(result) => clipboard::write(result.to_plain_text()),
                    None => Task::none(),
                }
            }
            Message::Exit => {
                iced::exit()
            }
        }
    }

    fn subscription(&self) -> Subscription<Message> {
        let timer = if self.controller.is_loading() {
            time::every(Duration::from_millis(80)).map(|_| Message::Tick)
        } else {
            Subscription::none()
        };

        let events = event::listen_with(|event, _status, _id| {
            if let IcedEvent::Keyboard(keyboard::Event::KeyPressed {
                key: Key::Named(keyboard::key::Named::Escape),
                ..
            }) = event
            {
                Some(Message::Exit)
            } else {
                None
            }
        });

        Subscription::batch([timer, events])
    }

    fn view(&self) -> Element<Message> {
        let loading = self.controller.phase() == Phase::Loading;

        let mut content = column![
            ui::header(),
            ui::search_bar(&self.input_text, &self.input_id, loading),
        ]
        .spacing(20)
        .padding(20);

        if let Some(error) = self.controller.error_message() {
            content = content.push(ui::error_banner(error));
        }

        if loading {
            content = content.push(ui::loading_indicator(self.loading_frame));
        }

        if let Some(result) = self.controller.current_result() {
            content = content.push(ui::result_card(result));
        }

        if let Some(history) = ui::history_list(self.controller.history().list().collect()) {
            content = content.push(history);
        }

        content = content.push(ui::footer(self.client.get_model()));

        container(scrollable(content).height(Length::Fill))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn theme(&self) -> Theme {
        Theme::TokyoNight
    }
}
