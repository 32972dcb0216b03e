//! Read-only view of the map graphic.
//!
//! The tracker never mutates the map tree. It only asks for parents,
//! attributes, tag names and label text, so the queries live behind
//! [`MapTree`] and the owned [`SvgMap`] is one implementation of it.

use std::fmt;
use std::hash::Hash;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("invalid map SVG: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("map has no <svg> root element")]
    MissingRoot,
    #[error("no element with id '{0}' in map")]
    UnknownElement(String),
    #[error("no station '{0}' in map")]
    UnknownStation(String),
}

/// Editor exports usually carry a DOCTYPE.
pub(crate) fn parsing_options() -> roxmltree::ParsingOptions {
    roxmltree::ParsingOptions {
        allow_dtd: true,
        ..roxmltree::ParsingOptions::default()
    }
}

/// The queries the tracker runs against the visual tree.
pub trait MapTree {
    type Node: Copy + Eq + Hash + fmt::Debug;

    /// Boundary element; positions are expressed in its coordinate space.
    fn root(&self) -> Self::Node;
    fn parent(&self, node: Self::Node) -> Option<Self::Node>;
    fn tag_name(&self, node: Self::Node) -> &str;
    fn attribute(&self, node: Self::Node, name: &str) -> Option<&str>;
    /// First element below `node` (depth-first, document order, `node`
    /// itself excluded) whose tag is `tag`.
    fn find_descendant(&self, node: Self::Node, tag: &str) -> Option<Self::Node>;
    /// Concatenated text of every text node below `node`.
    fn text_content(&self, node: Self::Node) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
struct MapNode {
    tag: String,
    attributes: Vec<(String, String)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    text: String,
}

/// Owned element arena built from SVG source text.
#[derive(Debug, Clone)]
pub struct SvgMap {
    nodes: Vec<MapNode>,
    root: NodeId,
}

impl SvgMap {
    pub fn parse(source: &str) -> Result<Self, MapError> {
        let doc = roxmltree::Document::parse_with_options(source, parsing_options())?;
        let mut map = SvgMap {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        map.push_element(doc.root_element(), None);
        let root = map
            .elements()
            .find(|id| map.tag_name(*id) == "svg")
            .ok_or(MapError::MissingRoot)?;
        map.root = root;
        Ok(map)
    }

    fn push_element(&mut self, node: roxmltree::Node<'_, '_>, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        let text = node
            .descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect::<String>();
        self.nodes.push(MapNode {
            tag: node.tag_name().name().to_string(),
            attributes: node
                .attributes()
                .map(|attr| (attr.name().to_string(), attr.value().to_string()))
                .collect(),
            parent,
            children: Vec::new(),
            text,
        });
        for child in node.children().filter(|n| n.is_element()) {
            let child_id = self.push_element(child, Some(id));
            self.nodes[id.0].children.push(child_id);
        }
        id
    }

    /// All elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn find_by_id(&self, id: &str) -> Result<NodeId, MapError> {
        self.elements()
            .find(|node| self.attribute(*node, "id") == Some(id))
            .ok_or_else(|| MapError::UnknownElement(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl MapTree for SvgMap {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        self.root
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn tag_name(&self, node: NodeId) -> &str {
        &self.nodes[node.0].tag
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node.0]
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn find_descendant(&self, node: NodeId, tag: &str) -> Option<NodeId> {
        for child in self.children(node) {
            if self.tag_name(*child) == tag {
                return Some(*child);
            }
            if let Some(found) = self.find_descendant(*child, tag) {
                return Some(found);
            }
        }
        None
    }

    fn text_content(&self, node: NodeId) -> String {
        self.nodes[node.0].text.clone()
    }
}
