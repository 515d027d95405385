//! Diagram file (JSON) and its validated in-memory form.
//!
//! JSON shape:
//! {
//!   "title": "Cloud Architecture",          // optional
//!   "categories": [                         // legend entries, in order
//!     { "id": "web", "label": "Web", "color": "#2196F3" }
//!   ],
//!   "nodes": [
//!     {
//!       "id": "web_server_1",               // unique key
//!       "label": "Web Server 1",            // optional, derived from id
//!       "description": "Handles HTTP",      // optional hover / info text
//!       "pos": [4, 6],                      // data units, y grows upward
//!       "category": "web",                  // optional legend bucket
//!       "color": "#2196F3",                 // optional if category given
//!       "size": 25,                         // display radius in px
//!       "external": false,                  // outside the cloud boundary
//!       "standalone": false                 // intentionally unconnected
//!     }
//!   ],
//!   "edges": [["load_balancer", "web_server_1"]]
//! }

use crate::Result;
use crate::spec::error::{DiagramError, Endpoint};

use anyhow::{Context, bail};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Tables shipped with the binary.
const BUILTIN_JSON: &str = include_str!("../../diagrams/cloud_architecture.json");

const DEFAULT_TITLE: &str = "Cloud Architecture";
const DEFAULT_RADIUS: f64 = 25.0;
const MAX_RADIUS: f64 = 200.0;

const NODE_ID_RE: &str = r"^[A-Za-z][A-Za-z0-9_-]*$";
const HEX_COLOR_RE: &str = r"^#(?:[0-9A-Fa-f]{3}|[0-9A-Fa-f]{6})$";
const NAMED_COLOR_RE: &str = r"^[a-z]+$";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub categories: Vec<CategorySpec>,

    #[serde(default)]
    pub nodes: Vec<RawNode>,

    /// Directed edges: [source, target]
    #[serde(default)]
    pub edges: Vec<[String; 2]>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySpec {
    pub id: String,
    pub label: String,
    pub color: String,
}

/// Raw node shape as it appears in the diagram file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawNode {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub pos: [f64; 2],

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub external: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub standalone: bool,
}

/// A point in data units (y grows upward).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Category {
    pub id: String,
    pub label: String,
    pub color: String,
}

/// Validated node: label and color resolved, numbers checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub description: Option<String>,
    pub pos: Position,
    pub color: String,
    pub radius: f64,
    pub category: Option<String>,
    pub external: bool,
    pub standalone: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    /// Position in the edge table.
    pub index: usize,
    pub source: String,
    pub target: String,
}

/// Validated diagram. Nodes and edges keep file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagram {
    pub title: String,
    pub categories: Vec<Category>,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Diagram {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

impl DiagramSpec {
    pub fn from_json(text: &str) -> Result<Self> {
        let spec = serde_json::from_str(text).context("parse diagram JSON")?;
        Ok(spec)
    }

    /// The built-in cloud architecture tables.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_JSON).context("built-in diagram")
    }

    /// Read a diagram file, or fall back to the built-in tables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("read diagram file {}", path.display()))?;
                Self::from_json(&text).with_context(|| format!("load {}", path.display()))
            }
            None => Self::builtin(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }

    /// Validate the tables and build a `Diagram`:
    /// - unique, well-formed node and category ids
    /// - finite positions, radius in (0, 200]
    /// - colors resolved (explicit or via category) and well-formed
    /// - every edge endpoint is a node key, no self-loops, no duplicates
    ///
    /// Failures are `DiagramError`s wrapped in `anyhow::Error`.
    pub fn validate_and_build(&self) -> Result<Diagram> {
        let node_id_re = Regex::new(NODE_ID_RE)?;
        let colors = ColorSyntax::new()?;

        if self.nodes.is_empty() {
            bail!(DiagramError::EmptyDiagram);
        }

        // 1) Categories.
        let mut categories = Vec::with_capacity(self.categories.len());
        let mut category_colors: BTreeMap<&str, &str> = BTreeMap::new();
        for c in &self.categories {
            if category_colors.contains_key(c.id.as_str()) {
                bail!(DiagramError::DuplicateCategory { id: c.id.clone() });
            }
            if !colors.is_valid(&c.color) {
                bail!(DiagramError::InvalidColor {
                    owner: format!("category {}", c.id),
                    color: c.color.clone(),
                });
            }
            category_colors.insert(&c.id, &c.color);
            categories.push(Category {
                id: c.id.clone(),
                label: c.label.clone(),
                color: c.color.clone(),
            });
        }

        // 2) Nodes.
        let mut seen = BTreeSet::<&str>::new();
        let mut nodes = Vec::with_capacity(self.nodes.len());
        for raw in &self.nodes {
            if !node_id_re.is_match(&raw.id) {
                bail!(DiagramError::InvalidNodeId { id: raw.id.clone() });
            }
            if !seen.insert(&raw.id) {
                bail!(DiagramError::DuplicateNode { id: raw.id.clone() });
            }

            let [x, y] = raw.pos;
            if !x.is_finite() || !y.is_finite() {
                bail!(DiagramError::InvalidPosition { node: raw.id.clone() });
            }

            let radius = raw.size.unwrap_or(DEFAULT_RADIUS);
            if !radius.is_finite() || radius <= 0.0 || radius > MAX_RADIUS {
                bail!(DiagramError::InvalidSize {
                    node: raw.id.clone(),
                    size: radius,
                });
            }

            let category_color = match &raw.category {
                Some(cat) => match category_colors.get(cat.as_str()) {
                    Some(color) => Some(*color),
                    None => bail!(DiagramError::UnknownCategory {
                        node: raw.id.clone(),
                        category: cat.clone(),
                    }),
                },
                None => None,
            };

            let color = match (&raw.color, category_color) {
                (Some(color), _) => {
                    if !colors.is_valid(color) {
                        bail!(DiagramError::InvalidColor {
                            owner: format!("node {}", raw.id),
                            color: color.clone(),
                        });
                    }
                    color.clone()
                }
                (None, Some(color)) => color.to_string(),
                (None, None) => bail!(DiagramError::MissingColor { node: raw.id.clone() }),
            };

            nodes.push(Node {
                id: raw.id.clone(),
                label: raw.label.clone().unwrap_or_else(|| default_label(&raw.id)),
                description: raw.description.clone(),
                pos: Position { x, y },
                color,
                radius,
                category: raw.category.clone(),
                external: raw.external,
                standalone: raw.standalone,
            });
        }

        // 3) Edges.
        let mut pairs = BTreeSet::<(&str, &str)>::new();
        let mut edges = Vec::with_capacity(self.edges.len());
        for (index, [source, target]) in self.edges.iter().enumerate() {
            if !seen.contains(source.as_str()) {
                bail!(DiagramError::UnknownNodeReference {
                    edge: index,
                    endpoint: Endpoint::Source,
                    id: source.clone(),
                });
            }
            if !seen.contains(target.as_str()) {
                bail!(DiagramError::UnknownNodeReference {
                    edge: index,
                    endpoint: Endpoint::Target,
                    id: target.clone(),
                });
            }
            if source == target {
                bail!(DiagramError::SelfLoop {
                    edge: index,
                    id: source.clone(),
                });
            }
            if !pairs.insert((source.as_str(), target.as_str())) {
                bail!(DiagramError::DuplicateEdge {
                    edge: index,
                    source: source.clone(),
                    target: target.clone(),
                });
            }
            edges.push(Edge {
                index,
                source: source.clone(),
                target: target.clone(),
            });
        }

        Ok(Diagram {
            title: self
                .title
                .clone()
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            categories,
            nodes,
            edges,
        })
    }
}

/// `#rgb`, `#rrggbb`, or a lowercase CSS/SVG named color ("darkgray").
struct ColorSyntax {
    hex: Regex,
    named: Regex,
}

impl ColorSyntax {
    fn new() -> Result<Self> {
        Ok(Self {
            hex: Regex::new(HEX_COLOR_RE)?,
            named: Regex::new(NAMED_COLOR_RE)?,
        })
    }

    /// Names are checked against the same table the rasterizer uses.
    fn is_valid(&self, color: &str) -> bool {
        self.hex.is_match(color)
            || (self.named.is_match(color) && svgtypes::Color::from_str(color).is_ok())
    }
}

/// "load_balancer" => "Load Balancer"
pub fn default_label(id: &str) -> String {
    id.split(['_', '-'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kind(err: anyhow::Error) -> DiagramError {
        err.downcast_ref::<DiagramError>()
            .cloned()
            .unwrap_or_else(|| panic!("not a DiagramError: {err:#}"))
    }

    fn minimal() -> DiagramSpec {
        DiagramSpec::from_json(
            r##"{
                "categories": [{ "id": "web", "label": "Web", "color": "#2196F3" }],
                "nodes": [
                    { "id": "users", "pos": [1, 1], "color": "#4CAF50" },
                    { "id": "web_server", "pos": [3, 2], "category": "web" }
                ],
                "edges": [["users", "web_server"]]
            }"##,
        )
        .unwrap()
    }

    #[test]
    fn builtin_tables_validate() {
        let diagram = DiagramSpec::builtin().unwrap().validate_and_build().unwrap();
        assert_eq!(diagram.nodes.len(), 10);
        assert_eq!(diagram.edges.len(), 13);
        assert_eq!(diagram.categories.len(), 7);
        assert_eq!(diagram.title, "Cloud Architecture");
    }

    #[test]
    fn builtin_edges_reference_known_nodes() {
        let diagram = DiagramSpec::builtin().unwrap().validate_and_build().unwrap();
        for edge in &diagram.edges {
            assert!(diagram.node(&edge.source).is_some(), "{}", edge.source);
            assert!(diagram.node(&edge.target).is_some(), "{}", edge.target);
        }
    }

    #[test]
    fn builtin_nodes_keep_literal_attributes() {
        let diagram = DiagramSpec::builtin().unwrap().validate_and_build().unwrap();
        let app = diagram.node("app_server").unwrap();
        assert_eq!(app.pos, Position { x: 6.0, y: 5.0 });
        assert_eq!(app.color, "#FF9800");
        assert_eq!(app.radius, 30.0);
        assert_eq!(app.label, "App Server");
        assert_eq!(diagram.node("cdn").unwrap().label, "CDN");
        assert!(diagram.node("users").unwrap().external);
    }

    #[test]
    fn resolves_defaults() {
        let diagram = minimal().validate_and_build().unwrap();
        let web = diagram.node("web_server").unwrap();
        assert_eq!(web.label, "Web Server");
        assert_eq!(web.color, "#2196F3");
        assert_eq!(web.radius, DEFAULT_RADIUS);
        assert_eq!(diagram.title, DEFAULT_TITLE);
        assert_eq!(
            diagram.edges,
            vec![Edge {
                index: 0,
                source: "users".into(),
                target: "web_server".into(),
            }]
        );
    }

    #[test]
    fn unknown_edge_target_is_reported() {
        let mut spec = minimal();
        spec.edges.push(["web_server".into(), "database".into()]);
        let err = spec.validate_and_build().unwrap_err();
        assert_eq!(
            kind(err),
            DiagramError::UnknownNodeReference {
                edge: 1,
                endpoint: Endpoint::Target,
                id: "database".into(),
            }
        );
    }

    #[test]
    fn unknown_edge_source_is_reported() {
        let mut spec = minimal();
        spec.edges.insert(0, ["cdn".into(), "users".into()]);
        let err = spec.validate_and_build().unwrap_err();
        assert_eq!(
            kind(err),
            DiagramError::UnknownNodeReference {
                edge: 0,
                endpoint: Endpoint::Source,
                id: "cdn".into(),
            }
        );
    }

    #[test]
    fn rejects_duplicate_nodes() {
        let mut spec = minimal();
        let dup = spec.nodes[0].clone();
        spec.nodes.push(dup);
        let err = spec.validate_and_build().unwrap_err();
        assert_eq!(kind(err), DiagramError::DuplicateNode { id: "users".into() });
    }

    #[test]
    fn rejects_self_loops_and_duplicate_edges() {
        let mut spec = minimal();
        spec.edges.push(["users".into(), "users".into()]);
        assert!(matches!(
            kind(spec.validate_and_build().unwrap_err()),
            DiagramError::SelfLoop { edge: 1, .. }
        ));

        let mut spec = minimal();
        spec.edges.push(["users".into(), "web_server".into()]);
        assert!(matches!(
            kind(spec.validate_and_build().unwrap_err()),
            DiagramError::DuplicateEdge { edge: 1, .. }
        ));
    }

    #[test]
    fn rejects_bad_colors_and_sizes() {
        let mut spec = minimal();
        spec.nodes[0].color = Some("#12345".into());
        assert!(matches!(
            kind(spec.validate_and_build().unwrap_err()),
            DiagramError::InvalidColor { .. }
        ));

        let mut spec = minimal();
        spec.nodes[0].color = None;
        assert_eq!(
            kind(spec.validate_and_build().unwrap_err()),
            DiagramError::MissingColor { node: "users".into() }
        );

        let mut spec = minimal();
        spec.nodes[1].size = Some(0.0);
        assert!(matches!(
            kind(spec.validate_and_build().unwrap_err()),
            DiagramError::InvalidSize { .. }
        ));

        let mut spec = minimal();
        spec.nodes[1].pos = [f64::NAN, 1.0];
        assert!(matches!(
            kind(spec.validate_and_build().unwrap_err()),
            DiagramError::InvalidPosition { .. }
        ));
    }

    #[test]
    fn named_colors_must_exist() {
        let mut spec = minimal();
        spec.nodes[0].color = Some("blurple".into());
        assert_eq!(
            kind(spec.validate_and_build().unwrap_err()),
            DiagramError::InvalidColor {
                owner: "node users".into(),
                color: "blurple".into(),
            }
        );

        for color in ["darkgray", "lightcyan", "#abc", "#A1B2C3"] {
            let mut spec = minimal();
            spec.nodes[0].color = Some(color.into());
            let diagram = spec.validate_and_build().unwrap();
            assert_eq!(diagram.nodes[0].color, color);
        }

        // only the two hex forms and plain names are accepted
        for color in ["rgb(1,2,3)", "#abcd", "DarkGray", ""] {
            let mut spec = minimal();
            spec.nodes[0].color = Some(color.into());
            assert!(
                matches!(
                    kind(spec.validate_and_build().unwrap_err()),
                    DiagramError::InvalidColor { .. }
                ),
                "{color}"
            );
        }
    }

    #[test]
    fn rejects_bad_category_color() {
        let mut spec = minimal();
        spec.categories[0].color = "webblue".into();
        assert_eq!(
            kind(spec.validate_and_build().unwrap_err()),
            DiagramError::InvalidColor {
                owner: "category web".into(),
                color: "webblue".into(),
            }
        );
    }

    #[test]
    fn rejects_duplicate_categories() {
        let mut spec = minimal();
        let dup = spec.categories[0].clone();
        spec.categories.push(dup);
        assert_eq!(
            kind(spec.validate_and_build().unwrap_err()),
            DiagramError::DuplicateCategory { id: "web".into() }
        );
    }

    #[test]
    fn size_upper_bound_is_inclusive() {
        let mut spec = minimal();
        spec.nodes[1].size = Some(MAX_RADIUS);
        assert_eq!(spec.validate_and_build().unwrap().nodes[1].radius, MAX_RADIUS);

        spec.nodes[1].size = Some(200.5);
        assert_eq!(
            kind(spec.validate_and_build().unwrap_err()),
            DiagramError::InvalidSize {
                node: "web_server".into(),
                size: 200.5,
            }
        );
    }

    #[test]
    fn rejects_unknown_category_and_bad_ids() {
        let mut spec = minimal();
        spec.nodes[1].category = Some("db".into());
        assert_eq!(
            kind(spec.validate_and_build().unwrap_err()),
            DiagramError::UnknownCategory {
                node: "web_server".into(),
                category: "db".into(),
            }
        );

        let mut spec = minimal();
        spec.nodes[0].id = "1users".into();
        assert!(matches!(
            kind(spec.validate_and_build().unwrap_err()),
            DiagramError::InvalidNodeId { .. }
        ));
    }

    #[test]
    fn rejects_empty_diagram() {
        let spec = DiagramSpec::from_json("{}").unwrap();
        assert_eq!(
            kind(spec.validate_and_build().unwrap_err()),
            DiagramError::EmptyDiagram
        );
    }

    #[test]
    fn export_reloads_to_same_diagram() {
        let spec = DiagramSpec::builtin().unwrap();
        let text = spec.to_json_pretty().unwrap();
        let again = DiagramSpec::from_json(&text).unwrap();
        assert_eq!(
            spec.validate_and_build().unwrap(),
            again.validate_and_build().unwrap()
        );
    }

    #[test]
    fn labels_follow_id_words() {
        assert_eq!(default_label("load_balancer"), "Load Balancer");
        assert_eq!(default_label("web_server_1"), "Web Server 1");
        assert_eq!(default_label("edge-router"), "Edge Router");
        assert_eq!(default_label("cdn"), "Cdn");
    }
}
