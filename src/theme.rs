use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub marker_glyph: String,
    pub marker_font_size: f32,
    pub marker_fill: Option<String>,
    /// Prefix line names with their symbol in stats output.
    pub show_symbols: bool,
    pub complete_suffix: String,
    pub heading_suffix: String,
    pub progress_fill: char,
    pub progress_empty: char,
    pub progress_width: usize,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            marker_glyph: "✅".to_string(),
            marker_font_size: 20.0,
            marker_fill: None,
            show_symbols: true,
            complete_suffix: " 🎉".to_string(),
            heading_suffix: " 😎".to_string(),
            progress_fill: '█',
            progress_empty: '░',
            progress_width: 40,
        }
    }

    /// ASCII-only variant for terminals without emoji fonts.
    pub fn plain() -> Self {
        Self {
            marker_glyph: "x".to_string(),
            marker_font_size: 20.0,
            marker_fill: Some("#1a7f37".to_string()),
            show_symbols: false,
            complete_suffix: " (complete)".to_string(),
            heading_suffix: String::new(),
            progress_fill: '#',
            progress_empty: '.',
            progress_width: 40,
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "classic" | "default" => Some(Self::classic()),
            "plain" | "ascii" => Some(Self::plain()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
