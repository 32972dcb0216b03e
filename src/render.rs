use crate::map::{parsing_options, MapError};
use crate::position::Position;
use crate::station::StationId;
use crate::theme::Theme;
use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// The one drawing capability the tracker needs from its host: put a
/// visited marker on a station or take it off again.
pub trait MarkerSurface {
    fn draw_marker(&mut self, id: &StationId, at: Position);
    fn erase_marker(&mut self, id: &StationId) -> bool;
}

/// Markers kept in memory and emitted as SVG on request.
#[derive(Debug, Clone, Default)]
pub struct MarkerLayer {
    markers: BTreeMap<StationId, Position>,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &StationId) -> bool {
        self.markers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StationId, &Position)> {
        self.markers.iter()
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }
}

impl MarkerSurface for MarkerLayer {
    fn draw_marker(&mut self, id: &StationId, at: Position) {
        self.markers.insert(id.clone(), at);
    }

    fn erase_marker(&mut self, id: &StationId) -> bool {
        self.markers.remove(id).is_some()
    }
}

pub fn marker_svg(id: &StationId, at: Position, theme: &Theme) -> String {
    let fill = theme
        .marker_fill
        .as_deref()
        .map(|fill| format!(" fill=\"{}\"", escape_xml(fill)))
        .unwrap_or_default();
    format!(
        "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-size=\"{}\"{fill} data-station=\"{}\" pointer-events=\"none\">{}</text>",
        at.x,
        at.y,
        theme.marker_font_size,
        escape_xml(&id.to_string()),
        escape_xml(&theme.marker_glyph)
    )
}

pub fn render_markers(layer: &MarkerLayer, theme: &Theme) -> String {
    let mut svg = String::new();
    for (id, at) in layer.iter() {
        svg.push_str(&marker_svg(id, *at, theme));
    }
    svg
}

/// Returns `source` with the layer's markers appended as the last children
/// of the document element, so they sit on top of everything else.
pub fn annotate_svg(source: &str, layer: &MarkerLayer, theme: &Theme) -> Result<String, MapError> {
    let markers = render_markers(layer, theme);
    let doc = roxmltree::Document::parse_with_options(source, parsing_options())?;
    let range = doc.root_element().range();
    let element = &source[range.clone()];

    let mut svg = String::with_capacity(source.len() + markers.len() + 16);
    if element.ends_with("/>") {
        // `<svg .../>` has no content to append to; open it up.
        let name = element[1..]
            .split(|c: char| c.is_whitespace() || c == '/' || c == '>')
            .next()
            .unwrap_or("svg");
        svg.push_str(&source[..range.end - 2]);
        svg.push('>');
        svg.push_str(&markers);
        svg.push_str("</");
        svg.push_str(name);
        svg.push('>');
    } else {
        let close = element
            .rfind("</")
            .map(|offset| range.start + offset)
            .ok_or(MapError::MissingRoot)?;
        svg.push_str(&source[..close]);
        svg.push_str(&markers);
        svg.push_str(&source[close..range.end]);
    }
    svg.push_str(&source[range.end..]);
    Ok(svg)
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
