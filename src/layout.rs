//! Pixel placement for a validated diagram.
//!
//! Positions come straight from the node table; this is an affine map from
//! data units to canvas pixels (y flipped), plus the derived geometry both
//! renderers need: clipped edge segments, the cloud boundary, legend and
//! caption anchors.

use crate::spec::Diagram;

use serde::Serialize;
use std::collections::BTreeMap;

/// Space under a node reserved for its label.
const LABEL_ROOM: f64 = 20.0;
const BOUNDARY_SIDE_PAD: f64 = 20.0;
const BOUNDARY_TOP_PAD: f64 = 34.0;
const BOUNDARY_BOTTOM_PAD: f64 = 40.0;
const LEGEND_GAP: f64 = 24.0;
const LEGEND_WIDTH: f64 = 150.0;
/// Vertical pitch of legend entries.
pub const LEGEND_ROW: f64 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    /// Pixels per data unit.
    pub unit: f64,
    pub margin: f64,
    /// Band above the plot for the title.
    pub header: f64,
    /// Band below the plot for the caption.
    pub footer: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            unit: 90.0,
            margin: 60.0,
            header: 70.0,
            footer: 40.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedNode {
    pub id: String,
    pub center: Point,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedEdge {
    pub index: usize,
    pub source: String,
    pub target: String,
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub width: f64,
    pub height: f64,
    /// Node table order.
    pub nodes: Vec<PlacedNode>,
    /// Edge table order.
    pub edges: Vec<PlacedEdge>,
    /// None when every node is external.
    pub boundary: Option<Rect>,
    pub title_anchor: Point,
    pub footer_anchor: Point,
    /// Top-left of the legend; None without categories.
    pub legend_origin: Option<Point>,
}

impl Layout {
    pub fn compute(diagram: &Diagram, opts: &LayoutOptions) -> Layout {
        let (min_x, max_x, min_y, max_y) = data_bounds(diagram);
        let max_radius = diagram
            .nodes
            .iter()
            .map(|n| n.radius)
            .fold(0.0f64, f64::max);

        // Room around the outermost centers for radius, label and boundary.
        let pad = max_radius + BOUNDARY_BOTTOM_PAD + LABEL_ROOM / 2.0;
        let plot_left = opts.margin + pad;
        let plot_top = opts.margin + opts.header + pad;
        let plot_width = (max_x - min_x) * opts.unit + 2.0 * pad;
        let plot_height = (max_y - min_y) * opts.unit + 2.0 * pad;

        let to_px = |x: f64, y: f64| Point {
            x: plot_left + (x - min_x) * opts.unit,
            y: plot_top + (max_y - y) * opts.unit,
        };

        let nodes: Vec<PlacedNode> = diagram
            .nodes
            .iter()
            .map(|n| PlacedNode {
                id: n.id.clone(),
                center: to_px(n.pos.x, n.pos.y),
                radius: n.radius,
            })
            .collect();

        let by_id: BTreeMap<&str, &PlacedNode> =
            nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        // Validated diagrams never miss an endpoint; anything else is skipped.
        let edges = diagram
            .edges
            .iter()
            .filter_map(|e| {
                let src = by_id.get(e.source.as_str())?;
                let dst = by_id.get(e.target.as_str())?;
                let (start, end) = clip_segment(src.center, src.radius, dst.center, dst.radius);
                Some(PlacedEdge {
                    index: e.index,
                    source: e.source.clone(),
                    target: e.target.clone(),
                    start,
                    end,
                })
            })
            .collect();

        let boundary = cloud_boundary(diagram, &nodes);

        let legend_width = if diagram.categories.is_empty() {
            0.0
        } else {
            LEGEND_GAP + LEGEND_WIDTH
        };
        let legend_height = diagram.categories.len() as f64 * LEGEND_ROW;
        let body_height = plot_height.max(legend_height);
        let width = opts.margin * 2.0 + plot_width + legend_width;
        let height = opts.margin * 2.0 + opts.header + body_height + opts.footer;

        let plot_right = opts.margin + plot_width;
        Layout {
            width,
            height,
            nodes,
            edges,
            boundary,
            title_anchor: Point {
                x: width / 2.0,
                y: opts.margin + opts.header / 2.0,
            },
            footer_anchor: Point {
                x: opts.margin + plot_width / 2.0,
                y: height - opts.margin - opts.footer / 2.0,
            },
            legend_origin: (!diagram.categories.is_empty()).then_some(Point {
                x: plot_right + LEGEND_GAP,
                y: plot_top - pad,
            }),
        }
    }

    pub fn node(&self, id: &str) -> Option<&PlacedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

fn data_bounds(diagram: &Diagram) -> (f64, f64, f64, f64) {
    let mut it = diagram.nodes.iter().map(|n| n.pos);
    let Some(first) = it.next() else {
        return (0.0, 0.0, 0.0, 0.0);
    };
    it.fold(
        (first.x, first.x, first.y, first.y),
        |(min_x, max_x, min_y, max_y), p| {
            (min_x.min(p.x), max_x.max(p.x), min_y.min(p.y), max_y.max(p.y))
        },
    )
}

/// Bounding box of internal nodes (circle + label), padded.
fn cloud_boundary(diagram: &Diagram, placed: &[PlacedNode]) -> Option<Rect> {
    let mut bounds: Option<(f64, f64, f64, f64)> = None;
    for (node, p) in diagram.nodes.iter().zip(placed) {
        if node.external {
            continue;
        }
        let left = p.center.x - p.radius - BOUNDARY_SIDE_PAD;
        let right = p.center.x + p.radius + BOUNDARY_SIDE_PAD;
        let top = p.center.y - p.radius - BOUNDARY_TOP_PAD;
        let bottom = p.center.y + p.radius + BOUNDARY_BOTTOM_PAD;
        bounds = Some(match bounds {
            None => (left, right, top, bottom),
            Some((l, r, t, b)) => (l.min(left), r.max(right), t.min(top), b.max(bottom)),
        });
    }
    bounds.map(|(l, r, t, b)| Rect {
        x: l,
        y: t,
        width: r - l,
        height: b - t,
    })
}

/// Shorten the segment a->b so it starts on a's rim and ends on b's rim.
/// Overlapping circles keep the raw center-to-center segment.
pub fn clip_segment(a: Point, ra: f64, b: Point, rb: f64) -> (Point, Point) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= ra + rb {
        return (a, b);
    }
    let (ux, uy) = (dx / len, dy / len);
    (
        Point {
            x: a.x + ux * ra,
            y: a.y + uy * ra,
        },
        Point {
            x: b.x - ux * rb,
            y: b.y - uy * rb,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::DiagramSpec;
    use pretty_assertions::assert_eq;

    fn builtin_layout() -> (Diagram, Layout) {
        let diagram = DiagramSpec::builtin().unwrap().validate_and_build().unwrap();
        let layout = Layout::compute(&diagram, &LayoutOptions::default());
        (diagram, layout)
    }

    #[test]
    fn places_every_node_and_edge() {
        let (diagram, layout) = builtin_layout();
        assert_eq!(layout.nodes.len(), diagram.nodes.len());
        assert_eq!(layout.edges.len(), diagram.edges.len());
        for (placed, edge) in layout.edges.iter().zip(&diagram.edges) {
            assert_eq!(placed.index, edge.index);
        }
    }

    #[test]
    fn y_axis_is_flipped() {
        let (_, layout) = builtin_layout();
        let db = layout.node("database").unwrap().center;
        let cache = layout.node("cache").unwrap().center;
        // database (8,6) sits above cache (8,4)
        assert_eq!(db.x, cache.x);
        assert!(db.y < cache.y);
        assert_eq!(cache.y - db.y, 2.0 * LayoutOptions::default().unit);
    }

    #[test]
    fn everything_fits_on_canvas() {
        let (_, layout) = builtin_layout();
        for n in &layout.nodes {
            assert!(n.center.x - n.radius >= 0.0 && n.center.x + n.radius <= layout.width);
            assert!(n.center.y - n.radius >= 0.0 && n.center.y + n.radius <= layout.height);
        }
        let b = layout.boundary.unwrap();
        assert!(b.x >= 0.0 && b.y >= 0.0);
        assert!(b.x + b.width <= layout.width && b.y + b.height <= layout.height);
    }

    #[test]
    fn boundary_excludes_external_nodes() {
        let (_, layout) = builtin_layout();
        let b = layout.boundary.unwrap();
        let users = layout.node("users").unwrap();
        // users is the only node at y=1, below every internal node
        assert!(users.center.y > b.y + b.height - BOUNDARY_BOTTOM_PAD);
        let cache = layout.node("cache").unwrap();
        assert!(cache.center.x < b.x + b.width && cache.center.y < b.y + b.height);
    }

    #[test]
    fn no_boundary_when_every_node_is_external() {
        let spec = DiagramSpec::from_json(
            r##"{
                "nodes": [
                    { "id": "a", "pos": [0, 0], "color": "red", "external": true },
                    { "id": "b", "pos": [2, 1], "color": "blue", "external": true }
                ],
                "edges": [["a", "b"]]
            }"##,
        )
        .unwrap();
        let diagram = spec.validate_and_build().unwrap();
        let layout = Layout::compute(&diagram, &LayoutOptions::default());
        assert_eq!(layout.boundary, None);
        assert_eq!(layout.legend_origin, None);
    }

    #[test]
    fn canvas_grows_with_legend_rows() {
        let categories: Vec<String> = (0..40)
            .map(|i| format!(r#"{{ "id": "c{i}", "label": "Category {i}", "color": "gray" }}"#))
            .collect();
        let spec = DiagramSpec::from_json(&format!(
            r#"{{
                "categories": [{}],
                "nodes": [{{ "id": "a", "pos": [0, 0], "category": "c0", "standalone": true }}]
            }}"#,
            categories.join(",")
        ))
        .unwrap();
        let diagram = spec.validate_and_build().unwrap();
        let opts = LayoutOptions::default();
        let layout = Layout::compute(&diagram, &opts);

        let origin = layout.legend_origin.unwrap();
        let last_row_bottom = origin.y + 40.0 * LEGEND_ROW;
        assert!(last_row_bottom <= layout.height - opts.margin - opts.footer);
        assert!(layout.footer_anchor.y >= last_row_bottom);
    }

    #[test]
    fn clipped_segments_end_on_rims() {
        let (start, end) = clip_segment(
            Point { x: 0.0, y: 0.0 },
            10.0,
            Point { x: 100.0, y: 0.0 },
            20.0,
        );
        assert_eq!(start, Point { x: 10.0, y: 0.0 });
        assert_eq!(end, Point { x: 80.0, y: 0.0 });

        let a = Point { x: 0.0, y: 0.0 };
        let b = Point { x: 5.0, y: 0.0 };
        assert_eq!(clip_segment(a, 10.0, b, 10.0), (a, b));
    }

    #[test]
    fn layout_is_deterministic() {
        let (diagram, layout) = builtin_layout();
        assert_eq!(layout, Layout::compute(&diagram, &LayoutOptions::default()));
    }
}
