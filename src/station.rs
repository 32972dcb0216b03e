use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::config::Config;
use crate::map::MapTree;
use crate::position::{resolve_position, Position};

/// Stable key of a station: its label plus its rounded map position.
///
/// Labels repeat across the network (the Blue line has two "Western"
/// stops), the position tells them apart.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StationId {
    pub label: String,
    pub x: i64,
    pub y: i64,
}

impl StationId {
    pub fn new(label: &str, position: Position) -> Self {
        let (x, y) = position.rounded();
        Self {
            label: label.trim().to_string(),
            x,
            y,
        }
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.label, self.x, self.y)
    }
}

impl Serialize for StationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Everything a click on one station element resolves to.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStation<N> {
    pub element: N,
    pub id: StationId,
    pub position: Position,
    pub lines: Vec<String>,
}

/// Nearest ancestor-or-self of `target` carrying the line attribute.
pub fn find_station_element<T: MapTree>(
    tree: &T,
    target: T::Node,
    line_attribute: &str,
) -> Option<T::Node> {
    let mut current = Some(target);
    while let Some(node) = current {
        if tree.attribute(node, line_attribute).is_some() {
            return Some(node);
        }
        current = tree.parent(node);
    }
    None
}

/// Label text for a station element: its own label node first, then one
/// under its parent.
pub fn find_label<T: MapTree>(tree: &T, station: T::Node, label_tag: &str) -> Option<String> {
    let title = tree.find_descendant(station, label_tag).or_else(|| {
        tree.parent(station)
            .and_then(|parent| tree.find_descendant(parent, label_tag))
    })?;
    Some(tree.text_content(title).trim().to_string())
}

/// The element whose position stands for the station.
///
/// Base-layer groups sit inside the positioned group, so they are measured
/// through their parent.
pub fn measured_element<T: MapTree>(tree: &T, station: T::Node, base_marker: &str) -> T::Node {
    match tree.tag_name(station) {
        "use" => station,
        "g" if tree
            .attribute(station, "id")
            .is_some_and(|id| id.contains(base_marker)) =>
        {
            tree.parent(station).unwrap_or(station)
        }
        _ => station,
    }
}

/// Splits a line attribute into names: trimmed, empties and repeats dropped.
pub fn parse_line_list(raw: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Resolves the station `target` belongs to, or `None` for clicks on
/// decoration (no line attribute above it, or no label nearby).
pub fn resolve_station<T: MapTree>(
    tree: &T,
    target: T::Node,
    config: &Config,
) -> Option<ResolvedStation<T::Node>> {
    let element = find_station_element(tree, target, &config.line_attribute)?;
    let label = find_label(tree, element, &config.label_tag)?;
    let lines = parse_line_list(tree.attribute(element, &config.line_attribute)?);
    let measured = measured_element(tree, element, &config.base_marker);
    let position = resolve_position(tree, measured, tree.root());
    Some(ResolvedStation {
        element,
        id: StationId::new(&label, position),
        position,
        lines,
    })
}

/// Every distinct station the map offers, in document order.
///
/// Several elements can resolve to the same station (a hit target and its
/// base layer); the first one wins.
pub fn discover_stations<T, I>(tree: &T, elements: I, config: &Config) -> Vec<ResolvedStation<T::Node>>
where
    T: MapTree,
    I: IntoIterator<Item = T::Node>,
{
    let mut seen = BTreeSet::new();
    elements
        .into_iter()
        .filter(|node| tree.attribute(*node, &config.line_attribute).is_some())
        .filter_map(|node| resolve_station(tree, node, config))
        .filter(|station| seen.insert(station.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::SvgMap;

    const MAP: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink">
  <g id="western-north" transform="translate(100,50)">
    <title>Western</title>
    <use id="western-north-dot" xlink:href="#stop" x="2" y="3" data-line="Blue"/>
  </g>
  <g id="western-south" transform="translate(100,400)">
    <g id="western-south-base" data-line="Blue">
      <title>Western </title>
      <circle id="western-south-shape" r="4"/>
    </g>
  </g>
  <g id="grand" transform="translate(300.4,200.6)">
    <use id="grand-dot" xlink:href="#stop" data-line="Red, Blue,Red"/>
    <title>Grand</title>
  </g>
  <g id="legend">
    <use id="orphan" xlink:href="#stop" data-line="Red"/>
  </g>
  <rect id="river" x="0" y="0"/>
</svg>"##;

    fn map() -> SvgMap {
        SvgMap::parse(MAP).unwrap()
    }

    #[test]
    fn identifier_joins_label_and_rounded_position() {
        let id = StationId::new("  Clark/Lake ", Position::new(10.4, 19.5));
        assert_eq!(id.to_string(), "Clark/Lake-10-20");
    }

    #[test]
    fn label_found_on_parent() {
        let map = map();
        let config = Config::default();
        let target = map.find_by_id("western-north-dot").unwrap();
        let station = resolve_station(&map, target, &config).unwrap();
        assert_eq!(station.id.to_string(), "Western-102-53");
        assert_eq!(station.lines, vec!["Blue"]);
    }

    #[test]
    fn base_group_is_measured_through_its_parent() {
        let map = map();
        let config = Config::default();
        let target = map.find_by_id("western-south-shape").unwrap();
        let station = resolve_station(&map, target, &config).unwrap();
        assert_eq!(station.element, map.find_by_id("western-south-base").unwrap());
        assert_eq!(station.id.to_string(), "Western-100-400");
    }

    #[test]
    fn same_label_different_position_is_a_different_station() {
        let map = map();
        let config = Config::default();
        let north = resolve_station(&map, map.find_by_id("western-north-dot").unwrap(), &config);
        let south = resolve_station(&map, map.find_by_id("western-south-shape").unwrap(), &config);
        assert_ne!(north.unwrap().id, south.unwrap().id);
    }

    #[test]
    fn line_list_is_trimmed_and_deduplicated() {
        let map = map();
        let station =
            resolve_station(&map, map.find_by_id("grand-dot").unwrap(), &Config::default()).unwrap();
        assert_eq!(station.lines, vec!["Red", "Blue"]);
        assert_eq!(station.id.to_string(), "Grand-300-201");
        assert_eq!(parse_line_list(",,"), Vec::<String>::new());
    }

    #[test]
    fn decoration_and_unlabelled_elements_are_ignored() {
        let map = map();
        let config = Config::default();
        assert!(resolve_station(&map, map.find_by_id("river").unwrap(), &config).is_none());
        assert!(resolve_station(&map, map.find_by_id("orphan").unwrap(), &config).is_none());
    }

    #[test]
    fn discovers_each_station_once() {
        let map = map();
        let stations = discover_stations(&map, map.elements(), &Config::default());
        let ids: Vec<String> = stations.iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, vec!["Western-102-53", "Western-100-400", "Grand-300-201"]);
    }

    #[test]
    fn serializes_as_display_string() {
        let id = StationId::new("Grand", Position::new(1.0, 2.0));
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"Grand-1-2\"");
    }
}
