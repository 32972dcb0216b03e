pub mod config;
pub mod controller;
pub mod ledger;
pub mod map;
pub mod position;
pub mod render;
pub mod station;
pub mod stats;
pub mod theme;
pub mod transform;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{
    load_config, load_config_with_theme, parse_config, parse_config_with_theme, Config, LineSpec,
};
pub use controller::{ClickController, ClickOutcome, TrackerError};
pub use ledger::{LedgerError, Line, Toggle, VisitLedger};
pub use map::{MapError, MapTree, NodeId, SvgMap};
pub use position::{resolve_position, Position};
pub use render::{annotate_svg, MarkerLayer, MarkerSurface};
pub use station::{discover_stations, resolve_station, ResolvedStation, StationId};
pub use stats::{render_html, render_json, render_text, StatsPanel, StatsSink, StatsSnapshot};
pub use theme::Theme;
pub use transform::{parse_translate, Offset};

/// Controller wired to the in-memory marker layer, as used by the CLI and
/// the wasm bindings.
pub type Tracker = ClickController<MarkerLayer, StatsPanel>;

impl Tracker {
    pub fn with_config(config: Config) -> Self {
        ClickController::new(config, MarkerLayer::new(), StatsPanel::default())
    }

    /// The source map with a marker drawn on every visited station.
    pub fn annotated_svg(&self, source: &str) -> Result<String, MapError> {
        annotate_svg(source, self.markers(), &self.config().theme)
    }
}
