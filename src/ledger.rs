use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, error};

use crate::config::{Config, LineSpec};
use crate::station::StationId;
use crate::stats::{LineStats, StatsSnapshot};

/// A line's running tally. Only `visited` and `fraction` ever change.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub name: String,
    pub symbol: String,
    pub total: u32,
    pub visited: u32,
    pub fraction: f64,
}

impl Line {
    fn from_spec(spec: &LineSpec) -> Self {
        Self {
            name: spec.name.clone(),
            symbol: spec.symbol.clone(),
            total: spec.total,
            visited: 0,
            fraction: 0.0,
        }
    }

    fn set_visited(&mut self, visited: u32) {
        self.visited = visited;
        self.fraction = f64::from(visited) / f64::from(self.total);
    }

    pub fn is_complete(&self) -> bool {
        self.visited == self.total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

/// Raised when a toggle would break the ledger's bookkeeping. These point
/// at a map whose line attributes disagree with the configured catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("station {station} lists unknown line '{line}'")]
    UnknownLine { station: String, line: String },
    #[error("line {line} would leave 0..={total} ({visited} visited) toggling {station}")]
    CountOutOfRange {
        station: String,
        line: String,
        visited: u32,
        total: u32,
    },
    #[error("station {station} was visited on [{recorded}] but deselected on [{given}]")]
    LineMismatch {
        station: String,
        recorded: String,
        given: String,
    },
}

/// Visited stations plus the per-line tallies derived from them.
#[derive(Debug, Clone)]
pub struct VisitLedger {
    network: String,
    total_stations: u32,
    lines: Vec<Line>,
    visited: BTreeMap<StationId, Vec<String>>,
}

impl VisitLedger {
    pub fn new(config: &Config) -> Self {
        Self {
            network: config.network_name.clone(),
            total_stations: config.total_stations,
            lines: config.lines.iter().map(Line::from_spec).collect(),
            visited: BTreeMap::new(),
        }
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, name: &str) -> Option<&Line> {
        self.lines.iter().find(|line| line.name == name)
    }

    pub fn is_visited(&self, id: &StationId) -> bool {
        self.visited.contains_key(id)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    pub fn visited_stations(&self) -> impl Iterator<Item = &StationId> {
        self.visited.keys()
    }

    /// Flips `id` between visited and unvisited, moving every line in
    /// `lines` by one in the same direction.
    ///
    /// All checks run before anything is written, so an error leaves the
    /// ledger exactly as it was.
    pub fn toggle(&mut self, id: &StationId, lines: &[String]) -> Result<Toggle, LedgerError> {
        let removing = self.visited.contains_key(id);
        let indices = self.line_indices(id, lines)?;

        if let Some(recorded) = self.visited.get(id) {
            if !same_lines(recorded, lines) {
                return Err(fault(LedgerError::LineMismatch {
                    station: id.to_string(),
                    recorded: recorded.join(","),
                    given: lines.join(","),
                }));
            }
        }

        for &idx in &indices {
            let line = &self.lines[idx];
            let in_range = if removing {
                line.visited > 0
            } else {
                line.visited < line.total
            };
            if !in_range {
                return Err(fault(LedgerError::CountOutOfRange {
                    station: id.to_string(),
                    line: line.name.clone(),
                    visited: line.visited,
                    total: line.total,
                }));
            }
        }

        let toggle = if removing {
            self.visited.remove(id);
            for &idx in &indices {
                let visited = self.lines[idx].visited - 1;
                self.lines[idx].set_visited(visited);
            }
            Toggle::Removed
        } else {
            self.visited.insert(id.clone(), lines.to_vec());
            for &idx in &indices {
                let visited = self.lines[idx].visited + 1;
                self.lines[idx].set_visited(visited);
            }
            Toggle::Added
        };

        debug!(station = %id, ?toggle, "ledger updated");
        debug_assert!(self.is_consistent(), "ledger tallies diverged after toggling {id}");
        Ok(toggle)
    }

    fn line_indices(&self, id: &StationId, lines: &[String]) -> Result<Vec<usize>, LedgerError> {
        lines
            .iter()
            .map(|name| {
                self.lines
                    .iter()
                    .position(|line| &line.name == name)
                    .ok_or_else(|| {
                        fault(LedgerError::UnknownLine {
                            station: id.to_string(),
                            line: name.clone(),
                        })
                    })
            })
            .collect()
    }

    /// Sum of the line tallies matches the line memberships recorded for
    /// visited stations, and every tally is within its line's total.
    pub fn is_consistent(&self) -> bool {
        let attributed: usize = self.visited.values().map(Vec::len).sum();
        let counted: usize = self.lines.iter().map(|line| line.visited as usize).sum();
        attributed == counted && self.lines.iter().all(|line| line.visited <= line.total)
    }

    /// Clears every visit, as a fresh session would.
    pub fn reset(&mut self) {
        self.visited.clear();
        for line in &mut self.lines {
            line.set_visited(0);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot::new(
            &self.network,
            self.visited.len(),
            self.total_stations,
            self.lines.iter().map(LineStats::from_line).collect(),
        )
    }
}

fn same_lines(recorded: &[String], given: &[String]) -> bool {
    let mut recorded = recorded.to_vec();
    let mut given = given.to_vec();
    recorded.sort();
    given.sort();
    recorded == given
}

fn fault(err: LedgerError) -> LedgerError {
    error!(%err, "visit ledger consistency fault");
    err
}
