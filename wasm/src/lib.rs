use cta_tracker::{
    discover_stations, parse_config, render_html, render_json, ClickOutcome, Config, SvgMap,
    Tracker,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClickReport {
    outcome: &'static str,
    station: Option<String>,
    x: Option<f64>,
    y: Option<f64>,
    lines: Vec<String>,
}

impl From<ClickOutcome> for ClickReport {
    fn from(outcome: ClickOutcome) -> Self {
        match outcome {
            ClickOutcome::Ignored => Self {
                outcome: "ignored",
                station: None,
                x: None,
                y: None,
                lines: Vec::new(),
            },
            ClickOutcome::Selected {
                station,
                position,
                lines,
            } => Self {
                outcome: "selected",
                station: Some(station.to_string()),
                x: Some(position.x),
                y: Some(position.y),
                lines,
            },
            ClickOutcome::Deselected { station, lines } => Self {
                outcome: "deselected",
                station: Some(station.to_string()),
                x: None,
                y: None,
                lines,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct StationEntry {
    id: String,
    lines: Vec<String>,
}

fn build_config(config_json: Option<&str>) -> Result<Config, String> {
    match config_json {
        Some(raw) => parse_config(raw).map_err(|error| format!("{error:#}")),
        None => Ok(Config::default()),
    }
}

fn report_json(outcome: ClickOutcome) -> Result<String, String> {
    serde_json::to_string(&ClickReport::from(outcome)).map_err(|error| error.to_string())
}

/// Visit tracker bound to one map. The page forwards the id of the
/// clicked element; marker drawing happens by swapping in `annotatedSvg`.
#[wasm_bindgen]
pub struct MapTracker {
    source: String,
    map: SvgMap,
    tracker: Tracker,
}

impl MapTracker {
    fn create(svg: &str, config_json: Option<&str>) -> Result<Self, String> {
        let config = build_config(config_json)?;
        let map = SvgMap::parse(svg).map_err(|error| error.to_string())?;
        Ok(Self {
            source: svg.to_string(),
            map,
            tracker: Tracker::with_config(config),
        })
    }

    fn click_element_inner(&mut self, element_id: &str) -> Result<String, String> {
        let target = self.map.find_by_id(element_id).map_err(|error| error.to_string())?;
        let outcome = self
            .tracker
            .click(&self.map, target)
            .map_err(|error| error.to_string())?;
        report_json(outcome)
    }

    fn click_station_inner(&mut self, station_id: &str) -> Result<String, String> {
        let outcome = self
            .tracker
            .click_station(&self.map, self.map.elements(), station_id)
            .map_err(|error| error.to_string())?;
        report_json(outcome)
    }

    fn stations_inner(&self) -> Result<String, String> {
        let entries: Vec<StationEntry> =
            discover_stations(&self.map, self.map.elements(), self.tracker.config())
                .into_iter()
                .map(|station| StationEntry {
                    id: station.id.to_string(),
                    lines: station.lines,
                })
                .collect();
        serde_json::to_string(&entries).map_err(|error| error.to_string())
    }

    fn annotated_svg_inner(&self) -> Result<String, String> {
        self.tracker
            .annotated_svg(&self.source)
            .map_err(|error| error.to_string())
    }
}

#[wasm_bindgen]
impl MapTracker {
    #[wasm_bindgen(constructor)]
    pub fn new(svg: &str, config_json: Option<String>) -> Result<MapTracker, JsValue> {
        Self::create(svg, config_json.as_deref()).map_err(|error| JsValue::from_str(&error))
    }

    #[wasm_bindgen(js_name = clickElement)]
    pub fn click_element(&mut self, element_id: &str) -> Result<String, JsValue> {
        self.click_element_inner(element_id)
            .map_err(|error| JsValue::from_str(&error))
    }

    #[wasm_bindgen(js_name = clickStation)]
    pub fn click_station(&mut self, station_id: &str) -> Result<String, JsValue> {
        self.click_station_inner(station_id)
            .map_err(|error| JsValue::from_str(&error))
    }

    pub fn stations(&self) -> Result<String, JsValue> {
        self.stations_inner().map_err(|error| JsValue::from_str(&error))
    }

    #[wasm_bindgen(js_name = statsJson)]
    pub fn stats_json(&self) -> Result<String, JsValue> {
        render_json(&self.tracker.snapshot()).map_err(|error| JsValue::from_str(&error.to_string()))
    }

    #[wasm_bindgen(js_name = statsHtml)]
    pub fn stats_html(&self) -> String {
        render_html(&self.tracker.snapshot(), &self.tracker.config().theme)
    }

    #[wasm_bindgen(js_name = annotatedSvg)]
    pub fn annotated_svg(&self) -> Result<String, JsValue> {
        self.annotated_svg_inner()
            .map_err(|error| JsValue::from_str(&error))
    }

    pub fn reset(&mut self) {
        self.tracker.reset();
    }
}
