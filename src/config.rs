use crate::theme::Theme;
use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

const CTA_LINES: [(&str, &str, u32); 8] = [
    ("Red", "🔴", 33),
    ("Blue", "🔵", 33),
    ("Green", "🟢", 31),
    ("Purple", "🟣", 26),
    ("Brown", "🟤", 27),
    ("Yellow", "🟡", 3),
    ("Orange", "🟠", 16),
    ("Pink", "🩷", 22),
];

const CTA_TOTAL_STATIONS: u32 = 146;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSpec {
    pub name: String,
    pub symbol: String,
    pub total: u32,
}

impl LineSpec {
    pub fn new(name: &str, symbol: &str, total: u32) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            total,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub network_name: String,
    /// Distinct stations in the network. Interchanges make this smaller
    /// than the sum of the line totals.
    pub total_stations: u32,
    pub lines: Vec<LineSpec>,
    /// Attribute listing a station element's lines, comma separated.
    pub line_attribute: String,
    pub label_tag: String,
    /// Substring of a group id that marks it as a station's base layer.
    pub base_marker: String,
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network_name: "CTA".to_string(),
            total_stations: CTA_TOTAL_STATIONS,
            lines: CTA_LINES
                .iter()
                .map(|(name, symbol, total)| LineSpec::new(name, symbol, *total))
                .collect(),
            line_attribute: "data-line".to_string(),
            label_tag: "title".to_string(),
            base_marker: "base".to_string(),
            theme: Theme::classic(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.lines.is_empty() {
            bail!("config must define at least one line");
        }
        if self.total_stations == 0 {
            bail!("totalStations must be positive");
        }
        let mut seen = BTreeSet::new();
        for line in &self.lines {
            if line.name.trim().is_empty() {
                bail!("line names must not be empty");
            }
            if line.total == 0 {
                bail!("line '{}' must have a positive total", line.name);
            }
            if !seen.insert(line.name.as_str()) {
                bail!("line '{}' is defined twice", line.name);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    marker_glyph: Option<String>,
    marker_font_size: Option<f32>,
    marker_fill: Option<String>,
    show_symbols: Option<bool>,
    complete_suffix: Option<String>,
    heading_suffix: Option<String>,
    progress_width: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    network_name: Option<String>,
    total_stations: Option<u32>,
    lines: Option<Vec<LineSpec>>,
    line_attribute: Option<String>,
    label_tag: Option<String>,
    base_marker: Option<String>,
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
}

fn preset(name: &str) -> anyhow::Result<Theme> {
    Theme::by_name(name).ok_or_else(|| anyhow!("unknown theme '{name}'"))
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    load_config_with_theme(path, None)
}

/// Like [`load_config`], but `theme` names the preset instead of the file's
/// `theme` key. The file's `themeVariables` are still applied on top.
pub fn load_config_with_theme(
    path: Option<&Path>,
    theme: Option<&str>,
) -> anyhow::Result<Config> {
    let Some(path) = path else {
        let mut config = Config::default();
        if let Some(name) = theme {
            config.theme = preset(name)?;
        }
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    parse_config_with_theme(&contents, theme)
        .with_context(|| format!("loading config {}", path.display()))
}

/// Overlays a JSON (or JSON5) config document onto the CTA defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    parse_config_with_theme(contents, None)
}

pub fn parse_config_with_theme(contents: &str, theme: Option<&str>) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(_) => json5::from_str(contents)?,
    };

    let mut config = Config::default();
    if let Some(name) = theme.or(parsed.theme.as_deref()) {
        config.theme = preset(name)?;
    }
    if let Some(v) = parsed.network_name {
        config.network_name = v;
    }
    if let Some(v) = parsed.total_stations {
        config.total_stations = v;
    }
    if let Some(v) = parsed.lines {
        config.lines = v;
    }
    if let Some(v) = parsed.line_attribute {
        config.line_attribute = v;
    }
    if let Some(v) = parsed.label_tag {
        config.label_tag = v;
    }
    if let Some(v) = parsed.base_marker {
        config.base_marker = v;
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.marker_glyph {
            config.theme.marker_glyph = v;
        }
        if let Some(v) = vars.marker_font_size {
            config.theme.marker_font_size = v;
        }
        if let Some(v) = vars.marker_fill {
            config.theme.marker_fill = Some(v);
        }
        if let Some(v) = vars.show_symbols {
            config.theme.show_symbols = v;
        }
        if let Some(v) = vars.complete_suffix {
            config.theme.complete_suffix = v;
        }
        if let Some(v) = vars.heading_suffix {
            config.theme.heading_suffix = v;
        }
        if let Some(v) = vars.progress_width {
            config.theme.progress_width = v;
        }
    }

    config.validate()?;
    Ok(config)
}
