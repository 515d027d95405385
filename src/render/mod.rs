//! Renderers: SVG markup, PNG rasterization and the interactive HTML page.

pub mod html;
pub mod png;
pub mod svg;

pub use html::render_html;
pub use png::{DEFAULT_SCALE, render_png};
pub use svg::{SvgMode, render_svg, render_svg_with};
