use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::ledger::{LedgerError, Toggle, VisitLedger};
use crate::map::{MapError, MapTree};
use crate::position::Position;
use crate::render::MarkerSurface;
use crate::station::{discover_stations, resolve_station, StationId};
use crate::stats::{StatsSink, StatsSnapshot};

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// The click did not land on a labelled station.
    Ignored,
    Selected {
        station: StationId,
        position: Position,
        lines: Vec<String>,
    },
    Deselected {
        station: StationId,
        lines: Vec<String>,
    },
}

/// Turns clicks on the map into ledger toggles, marker updates and stats
/// refreshes.
pub struct ClickController<M, S> {
    config: Config,
    ledger: VisitLedger,
    markers: M,
    stats: S,
}

impl<M: MarkerSurface, S: StatsSink> ClickController<M, S> {
    pub fn new(config: Config, markers: M, stats: S) -> Self {
        let ledger = VisitLedger::new(&config);
        Self {
            config,
            ledger,
            markers,
            stats,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ledger(&self) -> &VisitLedger {
        &self.ledger
    }

    pub fn markers(&self) -> &M {
        &self.markers
    }

    pub fn stats_sink(&self) -> &S {
        &self.stats
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.ledger.snapshot()
    }

    /// Handles one click on `target`.
    ///
    /// Either the whole update happens (ledger, marker, stats) or, for
    /// ignored clicks and ledger faults, nothing does.
    pub fn click<T: MapTree>(
        &mut self,
        tree: &T,
        target: T::Node,
    ) -> Result<ClickOutcome, TrackerError> {
        let Some(station) = resolve_station(tree, target, &self.config) else {
            debug!(?target, "click outside any labelled station");
            return Ok(ClickOutcome::Ignored);
        };

        let outcome = match self.ledger.toggle(&station.id, &station.lines)? {
            Toggle::Removed => {
                self.markers.erase_marker(&station.id);
                info!(station = %station.id, lines = ?station.lines, "station unmarked");
                ClickOutcome::Deselected {
                    station: station.id,
                    lines: station.lines,
                }
            }
            Toggle::Added => {
                self.markers.draw_marker(&station.id, station.position);
                info!(station = %station.id, lines = ?station.lines, "station visited");
                ClickOutcome::Selected {
                    station: station.id,
                    position: station.position,
                    lines: station.lines,
                }
            }
        };

        self.stats.refresh(&self.ledger.snapshot());
        Ok(outcome)
    }

    /// Clicks the element that represents the station `id` (its textual
    /// `label-x-y` form).
    pub fn click_station<T, I>(
        &mut self,
        tree: &T,
        elements: I,
        id: &str,
    ) -> Result<ClickOutcome, TrackerError>
    where
        T: MapTree,
        I: IntoIterator<Item = T::Node>,
    {
        let element = discover_stations(tree, elements, &self.config)
            .into_iter()
            .find(|station| station.id.to_string() == id)
            .map(|station| station.element)
            .ok_or_else(|| MapError::UnknownStation(id.to_string()))?;
        self.click(tree, element)
    }

    /// Unmarks every station.
    pub fn reset(&mut self) {
        let visited: Vec<StationId> = self.ledger.visited_stations().cloned().collect();
        for id in &visited {
            self.markers.erase_marker(id);
        }
        self.ledger.reset();
        self.stats.refresh(&self.ledger.snapshot());
    }
}
