use crate::layout::{LEGEND_ROW, Layout};
use crate::model::LABEL_OFFSET;
use crate::spec::Diagram;

pub const FONT_FAMILY: &str = "DejaVu Sans, Arial, Helvetica, sans-serif";

const BOUNDARY_CAPTION: &str = "Cloud Infrastructure";
const FOOTER_CAPTION: &str = "Components and Data Flow";
const EDGE_COLOR: &str = "#888888";
const SWATCH: f64 = 14.0;

/// How the root `<svg>` element is sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SvgMode {
    /// Fixed pixel size, for rasterizing.
    Static,
    /// Fills its container; carries `id="diagram"` for the page script.
    Embedded,
}

/// Static diagram: boundary, title, one `line.edge` per edge, one `g.node`
/// per node, legend, caption.
pub fn render_svg(diagram: &Diagram, layout: &Layout) -> String {
    render_svg_with(diagram, layout, SvgMode::Static)
}

pub fn render_svg_with(diagram: &Diagram, layout: &Layout, mode: SvgMode) -> String {
    let mut svg = String::new();
    let (w, h) = (layout.width, layout.height);

    match mode {
        SvgMode::Static => svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w:.0}\" height=\"{h:.0}\" viewBox=\"0 0 {w:.2} {h:.2}\" font-family=\"{FONT_FAMILY}\">\n"
        )),
        SvgMode::Embedded => svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" id=\"diagram\" width=\"100%\" viewBox=\"0 0 {w:.2} {h:.2}\" font-family=\"{FONT_FAMILY}\">\n"
        )),
    }

    svg.push_str(&format!(
        "<defs><marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"5\" markerHeight=\"5\" orient=\"auto\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"{EDGE_COLOR}\"/></marker></defs>\n"
    ));
    svg.push_str("<rect class=\"background\" width=\"100%\" height=\"100%\" fill=\"white\"/>\n");
    svg.push_str("<g id=\"viewport\">\n");

    if let Some(b) = layout.boundary {
        svg.push_str(&format!(
            "<rect class=\"boundary\" x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"12\" ry=\"12\" fill=\"lightcyan\" fill-opacity=\"0.3\" stroke=\"lightblue\" stroke-width=\"2\" stroke-dasharray=\"8 5\"/>\n",
            b.x, b.y, b.width, b.height
        ));
        svg.push_str(&format!(
            "<text class=\"boundary-caption\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"16\" font-weight=\"bold\" fill=\"darkblue\">{}</text>\n",
            b.x + b.width / 2.0,
            b.y + 22.0,
            BOUNDARY_CAPTION
        ));
    }

    svg.push_str(&format!(
        "<text class=\"title\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" dominant-baseline=\"middle\" font-size=\"24\" font-weight=\"bold\" fill=\"#333333\">{}</text>\n",
        layout.title_anchor.x,
        layout.title_anchor.y,
        escape_xml(&diagram.title)
    ));

    svg.push_str("<g class=\"edges\">\n");
    for edge in &layout.edges {
        svg.push_str(&format!(
            "<line class=\"edge\" data-index=\"{}\" data-source=\"{}\" data-target=\"{}\" x1=\"{:.2}\" y1=\"{:.2}\" x2=\"{:.2}\" y2=\"{:.2}\" stroke=\"{EDGE_COLOR}\" stroke-width=\"2\" marker-end=\"url(#arrow)\"/>\n",
            edge.index,
            escape_xml(&edge.source),
            escape_xml(&edge.target),
            edge.start.x,
            edge.start.y,
            edge.end.x,
            edge.end.y,
        ));
    }
    svg.push_str("</g>\n");

    svg.push_str("<g class=\"nodes\">\n");
    for (node, placed) in diagram.nodes.iter().zip(&layout.nodes) {
        let tooltip = match &node.description {
            Some(d) => format!("{}: {}", node.label, d),
            None => node.label.clone(),
        };
        svg.push_str(&format!(
            "<g class=\"node\" data-id=\"{}\"><title>{}</title>",
            escape_xml(&node.id),
            escape_xml(&tooltip)
        ));
        svg.push_str(&format!(
            "<circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\" fill=\"{}\" fill-opacity=\"0.9\" stroke=\"black\" stroke-width=\"2\"/>",
            placed.center.x,
            placed.center.y,
            placed.radius,
            escape_xml(&node.color)
        ));
        svg.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"12\" font-weight=\"bold\" fill=\"#222222\">{}</text></g>\n",
            placed.center.x,
            placed.center.y + placed.radius + LABEL_OFFSET,
            escape_xml(&node.label)
        ));
    }
    svg.push_str("</g>\n");

    if let Some(origin) = layout.legend_origin {
        svg.push_str("<g class=\"legend\">\n");
        for (i, cat) in diagram.categories.iter().enumerate() {
            let y = origin.y + i as f64 * LEGEND_ROW;
            svg.push_str(&format!(
                "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{SWATCH}\" height=\"{SWATCH}\" fill=\"{}\" stroke=\"#444444\" stroke-width=\"1\"/>",
                origin.x,
                y,
                escape_xml(&cat.color)
            ));
            svg.push_str(&format!(
                "<text x=\"{:.2}\" y=\"{:.2}\" font-size=\"13\" fill=\"#333333\">{}</text>\n",
                origin.x + SWATCH + 8.0,
                y + SWATCH - 2.0,
                escape_xml(&cat.label)
            ));
        }
        svg.push_str("</g>\n");
    }

    svg.push_str(&format!(
        "<text class=\"caption\" x=\"{:.2}\" y=\"{:.2}\" text-anchor=\"middle\" font-size=\"14\" fill=\"#555555\">{}</text>\n",
        layout.footer_anchor.x, layout.footer_anchor.y, FOOTER_CAPTION
    ));

    svg.push_str("</g>\n</svg>\n");
    svg
}

pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
