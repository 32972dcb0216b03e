use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

use crate::map::MapTree;
use crate::transform::{parse_number_prefix, parse_translate};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Nearest integer pixel, halves rounding toward positive infinity.
    pub fn rounded(&self) -> (i64, i64) {
        (round_half_up(self.x), round_half_up(self.y))
    }
}

fn round_half_up(value: f64) -> i64 {
    // Negative halves go up too.
    let rounded = value.round();
    if rounded - value == -0.5 {
        (rounded + 1.0) as i64
    } else {
        rounded as i64
    }
}

/// Absolute position of `start` in the coordinate space of `root`.
///
/// Sums the `x`/`y` attributes and translate offsets of `start` and every
/// ancestor below `root`. `root` itself contributes nothing. A node seen
/// twice (cyclic parent links) ends the walk.
pub fn resolve_position<T: MapTree>(tree: &T, start: T::Node, root: T::Node) -> Position {
    let mut total = Position::default();
    let mut seen = HashSet::new();
    let mut current = Some(start);

    while let Some(node) = current {
        if node == root {
            break;
        }
        if !seen.insert(node) {
            warn!(?start, ?node, "parent links form a cycle, stopping ancestor walk");
            break;
        }
        total.x += numeric_attribute(tree, node, "x");
        total.y += numeric_attribute(tree, node, "y");
        let offset = parse_translate(tree.attribute(node, "transform"));
        total.x += offset.dx;
        total.y += offset.dy;

        current = tree.parent(node);
    }

    total
}

fn numeric_attribute<T: MapTree>(tree: &T, node: T::Node, name: &str) -> f64 {
    tree.attribute(node, name)
        .and_then(parse_number_prefix)
        .unwrap_or(0.0)
}
