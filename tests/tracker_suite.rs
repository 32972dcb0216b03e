use std::path::Path;

use cta_tracker::{
    discover_stations, parse_config, render_html, render_text, ClickOutcome, Config, MapTree,
    SvgMap, Theme, Tracker,
};

fn fixture_source() -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("loop.svg");
    std::fs::read_to_string(path).expect("fixture read failed")
}

fn fixture_map() -> SvgMap {
    SvgMap::parse(&fixture_source()).expect("fixture parse failed")
}

fn counts(tracker: &Tracker) -> (usize, u32, u32, u32) {
    let ledger = tracker.ledger();
    (
        ledger.visited_count(),
        ledger.line("Red").unwrap().visited,
        ledger.line("Blue").unwrap().visited,
        ledger.line("Brown").unwrap().visited,
    )
}

#[test]
fn discovers_fixture_stations() {
    let map = fixture_map();
    let ids: Vec<String> = discover_stations(&map, map.elements(), &Config::default())
        .iter()
        .map(|station| station.id.to_string())
        .collect();
    assert_eq!(
        ids,
        vec![
            "Clark/Lake-620-411",
            "Washington-600-460",
            "Western-251-270",
            "Western-250-660",
            "Howard-640-40",
        ]
    );
}

#[test]
fn clark_lake_round_trip() {
    let map = fixture_map();
    let mut tracker = Tracker::with_config(Config::default());
    let howard = map.find_by_id("howard-dot").unwrap();
    tracker.click(&map, howard).unwrap();
    let before = counts(&tracker);
    assert_eq!(before, (1, 1, 0, 0));

    let clark = map.find_by_id("clark-lake-dot").unwrap();
    let outcome = tracker.click(&map, clark).unwrap();
    assert!(matches!(outcome, ClickOutcome::Selected { .. }));
    assert_eq!(counts(&tracker), (2, 2, 1, 1));
    assert_eq!(tracker.markers().len(), 2);

    let outcome = tracker.click(&map, clark).unwrap();
    assert!(matches!(outcome, ClickOutcome::Deselected { .. }));
    assert_eq!(counts(&tracker), before);
    assert_eq!(tracker.markers().len(), 1);
}

#[test]
fn both_westerns_count_separately() {
    let map = fixture_map();
    let mut tracker = Tracker::with_config(Config::default());
    let ohare_label = map.find_by_id("western-ohare-label").unwrap();
    let forest_park = map.find_by_id("western-forest-park-dot").unwrap();

    tracker.click(&map, ohare_label).unwrap();
    tracker.click(&map, forest_park).unwrap();

    assert_eq!(tracker.ledger().visited_count(), 2);
    assert_eq!(tracker.ledger().line("Blue").unwrap().visited, 2);
}

#[test]
fn clicks_off_station_are_ignored() {
    let map = fixture_map();
    let mut tracker = Tracker::with_config(Config::default());
    for id in ["chicago-river", "legend-stop", "legend-caption", "blue-line"] {
        let target = map.find_by_id(id).unwrap();
        assert_eq!(tracker.click(&map, target).unwrap(), ClickOutcome::Ignored, "{id}");
    }
    assert_eq!(tracker.click(&map, map.root()).unwrap(), ClickOutcome::Ignored);
    assert_eq!(tracker.ledger().visited_count(), 0);
    assert!(tracker.stats_sink().latest().is_none());
}

#[test]
fn annotated_map_carries_markers() {
    let source = fixture_source();
    let map = SvgMap::parse(&source).unwrap();
    let mut tracker = Tracker::with_config(Config::default());
    tracker
        .click_station(&map, map.elements(), "Clark/Lake-620-411")
        .unwrap();

    let annotated = tracker.annotated_svg(&source).unwrap();
    assert!(annotated.contains("data-station=\"Clark/Lake-620-411\""));
    assert!(annotated.trim_end().ends_with("</svg>"));

    let reparsed = SvgMap::parse(&annotated).unwrap();
    let marker = reparsed
        .elements()
        .find(|node| reparsed.attribute(*node, "data-station").is_some())
        .unwrap();
    assert_eq!(reparsed.parent(marker), Some(reparsed.root()));
    assert_eq!(reparsed.attribute(marker, "pointer-events"), Some("none"));
}

#[test]
fn stats_panel_after_visits() {
    let map = fixture_map();
    let mut tracker = Tracker::with_config(Config::default());
    for id in ["clark-lake-dot", "howard-dot"] {
        tracker.click(&map, map.find_by_id(id).unwrap()).unwrap();
    }
    let snapshot = tracker.stats_sink().latest().unwrap().clone();
    assert_eq!(snapshot, tracker.snapshot());
    assert_eq!(snapshot.total_visited, 2);
    assert_eq!(snapshot.overall_percentage, 1.37);

    let text = render_text(&snapshot, &Theme::classic());
    assert!(text.starts_with("You have visited 2 out of 146 total CTA stations (1.37%)! 😎\n"));
    let html = render_html(&snapshot, &Theme::classic());
    assert!(html.contains("<tr><th scope=\"row\">🔴 Red</th><td>2</td><td>6.06%</td></tr>"));
}

#[test]
fn custom_asset_conventions() {
    let source = r#"<svg xmlns="http://www.w3.org/2000/svg">
  <g id="park-st" transform="translate(40,40)">
    <g id="park-st-underlay" data-routes="Red, Green">
      <desc>Park Street</desc>
    </g>
  </g>
</svg>"#;
    let config = parse_config(
        r#"{
            "networkName": "MBTA",
            "totalStations": 2,
            "lines": [{"name": "Red", "symbol": "R", "total": 1}, {"name": "Green", "symbol": "G", "total": 1}],
            "lineAttribute": "data-routes",
            "labelTag": "desc",
            "baseMarker": "underlay"
        }"#,
    )
    .unwrap();
    let map = SvgMap::parse(source).unwrap();
    let mut tracker = Tracker::with_config(config);
    let outcome = tracker
        .click(&map, map.find_by_id("park-st-underlay").unwrap())
        .unwrap();
    let ClickOutcome::Selected { station, .. } = outcome else {
        panic!("expected a selection");
    };
    assert_eq!(station.to_string(), "Park Street-40-40");

    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.overall_percentage, 50.0);
    assert!(snapshot.lines.iter().all(|line| line.complete));
    assert!(render_text(&snapshot, &tracker.config().theme).contains("100.00% 🎉"));
}
