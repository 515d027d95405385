use crate::Result;
use crate::render::svg::FONT_FAMILY;

use anyhow::{anyhow, bail};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;

pub const DEFAULT_SCALE: f32 = 2.0;

/// Largest surface we allocate (RGBA, so 4 bytes per pixel).
pub const MAX_PIXELS: u64 = 64_000_000;

/// Rasterize an SVG document into PNG bytes at `scale` x its pixel size.
pub fn render_png(svg: &str, scale: f32) -> Result<Vec<u8>> {
    if !scale.is_finite() || scale <= 0.0 {
        bail!("scale must be a finite number greater than zero, got {}", scale);
    }

    let mut options = usvg::Options::default();
    options.font_family = primary_font(FONT_FAMILY);
    options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|err| anyhow!("failed to parse generated SVG for PNG export: {err}"))?;

    let size = tree.size().to_int_size();
    let scaled_width = (size.width() as f32 * scale).ceil();
    let scaled_height = (size.height() as f32 * scale).ceil();

    if scaled_width < 1.0 || scaled_height < 1.0 {
        bail!("scaled dimensions collapsed below 1px; try a larger scale factor");
    }
    if scaled_width > u32::MAX as f32 || scaled_height > u32::MAX as f32 {
        bail!("scaled dimensions exceed supported limits; try a smaller scale factor");
    }

    let (width, height) = (scaled_width as u32, scaled_height as u32);
    let pixels = u64::from(width) * u64::from(height);
    if pixels > MAX_PIXELS {
        bail!(
            "PNG surface {width}x{height} ({pixels} px) exceeds the {MAX_PIXELS} px limit; \
             bring node positions closer together or lower the scale"
        );
    }
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| anyhow!("failed to allocate {width}x{height} surface for PNG export"))?;

    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|err| anyhow!("failed to encode PNG output: {err}"))
}

fn primary_font(fonts: &str) -> String {
    fonts
        .split(',')
        .map(|s| s.trim().trim_matches('"'))
        .find(|s| !s.is_empty())
        .unwrap_or("sans-serif")
        .to_string()
}
