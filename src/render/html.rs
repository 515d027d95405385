use crate::Result;
use crate::layout::Layout;
use crate::model::build_view;
use crate::render::svg::{SvgMode, escape_xml, render_svg_with};
use crate::spec::Diagram;

pub const DRAG_HINT: &str = "Click and drag to explore the architecture";

/// Render the self-contained interactive page (inline SVG + embedded JSON).
///
/// Important: we avoid `format!()` for the page because the script contains
/// many `{}` from JS blocks and template literals. Placeholders are filled in
/// one left-to-right pass, so inserted text is never rescanned.
pub fn render_html(diagram: &Diagram, layout: &Layout) -> Result<String> {
    let view = build_view(diagram, layout);
    // `</` inside a JSON string would close the <script> element early.
    let json = serde_json::to_string(&view)?.replace("</", "<\\/");

    let svg = render_svg_with(diagram, layout, SvgMode::Embedded);
    let title = escape_xml(&diagram.title);
    let info = render_info_list(diagram);

    const TEMPLATE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>__TITLE__</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 20px; background: #f5f5f5; color: #333; }
  header { text-align: center; margin-bottom: 20px; }
  .info { background: white; padding: 15px; border-radius: 5px; margin-bottom: 20px; box-shadow: 0 2px 5px rgba(0,0,0,0.1); }
  .info ul { margin: 0; padding-left: 20px; }
  .chart-container { background: white; border-radius: 5px; box-shadow: 0 2px 5px rgba(0,0,0,0.1); padding: 20px; }
  .hint { color: gray; font-size: 12px; margin-top: 6px; }
  #diagram { display: block; max-height: 85vh; cursor: grab; user-select: none; }
  #diagram.panning { cursor: grabbing; }
  #diagram .node { cursor: move; }
  #diagram .node:hover circle { stroke-width: 3; }
</style>
</head>
<body>
<header>
  <h1>__TITLE__</h1>
</header>

__INFO__
<div class="chart-container">
__SVG__
  <div class="hint">__HINT__</div>
</div>

<script>
// Embedded diagram data (JSON object literal)
const DATA = __DATA__;

const svg = document.getElementById("diagram");
const viewport = document.getElementById("viewport");
const view = { tx: 0, ty: 0, k: 1 };
let drag = null;

function applyView() {
  viewport.setAttribute("transform", `translate(${view.tx} ${view.ty}) scale(${view.k})`);
}

// Client coordinates -> SVG user space (before the viewport transform).
function svgPoint(evt) {
  const pt = svg.createSVGPoint();
  pt.x = evt.clientX;
  pt.y = evt.clientY;
  return pt.matrixTransform(svg.getScreenCTM().inverse());
}

function toViewport(p) {
  return { x: (p.x - view.tx) / view.k, y: (p.y - view.ty) / view.k };
}

function clip(a, ra, b, rb) {
  const dx = b.x - a.x, dy = b.y - a.y;
  const len = Math.hypot(dx, dy);
  if (len <= ra + rb) return [a, b];
  const ux = dx / len, uy = dy / len;
  return [
    { x: a.x + ux * ra, y: a.y + uy * ra },
    { x: b.x - ux * rb, y: b.y - uy * rb },
  ];
}

function redrawEdges(id) {
  for (const line of svg.querySelectorAll(".edge")) {
    const s = line.dataset.source, t = line.dataset.target;
    if (s !== id && t !== id) continue;
    const a = DATA.nodes[s], b = DATA.nodes[t];
    const [p, q] = clip(a, a.r, b, b.r);
    line.setAttribute("x1", p.x.toFixed(2));
    line.setAttribute("y1", p.y.toFixed(2));
    line.setAttribute("x2", q.x.toFixed(2));
    line.setAttribute("y2", q.y.toFixed(2));
  }
}

function moveNode(g, id, x, y) {
  const node = DATA.nodes[id];
  node.x = x;
  node.y = y;
  const circle = g.querySelector("circle");
  circle.setAttribute("cx", x.toFixed(2));
  circle.setAttribute("cy", y.toFixed(2));
  const label = g.querySelector("text");
  label.setAttribute("x", x.toFixed(2));
  label.setAttribute("y", (y + node.r + DATA.label_offset).toFixed(2));
  redrawEdges(id);
}

for (const g of svg.querySelectorAll(".node")) {
  g.addEventListener("mousedown", (e) => {
    e.stopPropagation();
    const id = g.dataset.id;
    const p = toViewport(svgPoint(e));
    const node = DATA.nodes[id];
    drag = { kind: "node", g, id, dx: node.x - p.x, dy: node.y - p.y };
  });
}

svg.addEventListener("mousedown", (e) => {
  const p = svgPoint(e);
  drag = { kind: "pan", x: p.x - view.tx, y: p.y - view.ty };
  svg.classList.add("panning");
});

window.addEventListener("mousemove", (e) => {
  if (!drag) return;
  const p = svgPoint(e);
  if (drag.kind === "node") {
    const q = toViewport(p);
    moveNode(drag.g, drag.id, q.x + drag.dx, q.y + drag.dy);
  } else {
    view.tx = p.x - drag.x;
    view.ty = p.y - drag.y;
    applyView();
  }
});

window.addEventListener("mouseup", () => {
  drag = null;
  svg.classList.remove("panning");
});

svg.addEventListener("wheel", (e) => {
  e.preventDefault();
  const p = svgPoint(e);
  const factor = Math.exp(-e.deltaY * 0.001);
  const k = Math.min(8, Math.max(0.2, view.k * factor));
  view.tx = p.x - (p.x - view.tx) * (k / view.k);
  view.ty = p.y - (p.y - view.ty) * (k / view.k);
  view.k = k;
  applyView();
}, { passive: false });

svg.addEventListener("dblclick", () => {
  view.tx = 0;
  view.ty = 0;
  view.k = 1;
  applyView();
});
</script>
</body>
</html>
"#;

    Ok(fill_template(
        TEMPLATE,
        &[
            ("__TITLE__", title.as_str()),
            ("__INFO__", info.as_str()),
            ("__SVG__", svg.as_str()),
            ("__HINT__", DRAG_HINT),
            ("__DATA__", json.as_str()),
        ],
    ))
}

/// Bullet list of components that carry a description. Empty when none do.
fn render_info_list(diagram: &Diagram) -> String {
    let items: Vec<String> = diagram
        .nodes
        .iter()
        .filter_map(|n| {
            n.description.as_ref().map(|d| {
                format!(
                    "    <li><strong>{}:</strong> {}</li>\n",
                    escape_xml(&n.label),
                    escape_xml(d)
                )
            })
        })
        .collect();

    if items.is_empty() {
        return String::new();
    }

    let mut out = String::from("<div class=\"info\">\n  <h3>Architecture Components</h3>\n  <ul>\n");
    for item in items {
        out.push_str(&item);
    }
    out.push_str("  </ul>\n</div>\n");
    out
}

/// Replace each placeholder occurrence in a single pass over `template`.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    loop {
        let next = values
            .iter()
            .filter_map(|(key, value)| rest.find(key).map(|at| (at, *key, *value)))
            .min_by_key(|(at, _, _)| *at);
        match next {
            Some((at, key, value)) => {
                out.push_str(&rest[..at]);
                out.push_str(value);
                rest = &rest[at + key.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}
