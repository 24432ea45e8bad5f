use iced::Color;

use crate::analysis::ClassificationStatus;

/// How a status is drawn: badge text, history label, glyph and colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusStyle {
    pub label: &'static str,
    pub short_label: &'static str,
    pub icon: &'static str,
    pub accent: Color,
}

pub fn status_style(status: ClassificationStatus) -> StatusStyle {
    match status {
        ClassificationStatus::Controlled => StatusStyle {
            label: "CONTROLLED SUBSTANCE",
            short_label: "CONTROLLED",
            icon: "⚠",
            accent: Color::from_rgb8(0xdc, 0x26, 0x26),
        },
        ClassificationStatus::PrescriptionOnly => StatusStyle {
            label: "PRESCRIPTION ONLY",
            short_label: "PRESCRIPTION ONLY",
            icon: "℞",
            accent: Color::from_rgb8(0xd9, 0x77, 0x06),
        },
        ClassificationStatus::Otc => StatusStyle {
            label: "NOT CONTROLLED (OTC)",
            short_label: "OTC",
            icon: "✔",
            accent: Color::from_rgb8(0x05, 0x96, 0x69),
        },
        ClassificationStatus::Unknown => StatusStyle {
            label: "STATUS UNKNOWN",
            short_label: "UNKNOWN",
            icon: "ℹ",
            accent: Color::from_rgb8(0x47, 0x55, 0x69),
        },
    }
}
