//! End-to-end pipeline: validate -> graph -> layout -> render -> write.

use crate::Result;
use crate::layout::{Layout, LayoutOptions};
use crate::model::{ArchitectureGraph, GraphSummary};
use crate::render::{DEFAULT_SCALE, render_html, render_png, render_svg};
use crate::spec::DiagramSpec;

use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PNG_NAME: &str = "cloud_architecture_static.png";
pub const DEFAULT_HTML_PATH: &str = "docs/index.html";

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub png: PathBuf,
    pub html: PathBuf,
    /// PNG pixels per SVG pixel.
    pub scale: f32,
    pub layout: LayoutOptions,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            png: default_png_path(),
            html: PathBuf::from(DEFAULT_HTML_PATH),
            scale: DEFAULT_SCALE,
            layout: LayoutOptions::default(),
        }
    }
}

pub fn default_png_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_PNG_NAME)
}

/// In-memory artifacts for one diagram.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub svg: String,
    pub png: Vec<u8>,
    pub html: String,
    pub summary: GraphSummary,
}

#[derive(Debug, Clone)]
pub struct GeneratedFiles {
    pub png: PathBuf,
    pub html: PathBuf,
    pub summary: GraphSummary,
}

/// Validate and render without touching the file system.
pub fn render_all(spec: &DiagramSpec, opts: &OutputOptions) -> Result<Rendered> {
    let diagram = spec.validate_and_build()?;
    let graph = ArchitectureGraph::build(&diagram)?;
    let summary = graph.summary();
    log::info!(
        "diagram '{}': {} nodes, {} edges, entry points [{}]{}",
        diagram.title,
        summary.nodes,
        summary.edges,
        summary.entry_points.join(", "),
        if summary.acyclic { "" } else { " (contains cycles)" }
    );

    let layout = Layout::compute(&diagram, &opts.layout);
    log::debug!("canvas {:.0}x{:.0}px", layout.width, layout.height);

    log::info!("generating static diagram");
    let svg = render_svg(&diagram, &layout);
    let png = render_png(&svg, opts.scale).context("rasterize static diagram")?;

    log::info!("generating interactive diagram");
    let html = render_html(&diagram, &layout)?;

    Ok(Rendered {
        svg,
        png,
        html,
        summary,
    })
}

/// Render both artifacts and write them, creating parent directories.
pub fn generate(spec: &DiagramSpec, opts: &OutputOptions) -> Result<GeneratedFiles> {
    let rendered = render_all(spec, opts)?;

    write_file(&opts.png, &rendered.png)?;
    log::info!("static diagram saved to {}", opts.png.display());

    write_file(&opts.html, rendered.html.as_bytes())?;
    log::info!("interactive diagram saved to {}", opts.html.display());

    Ok(GeneratedFiles {
        png: opts.png.clone(),
        html: opts.html.clone(),
        summary: rendered.summary,
    })
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::DiagramError;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_paths() {
        let opts = OutputOptions::default();
        assert_eq!(opts.html, PathBuf::from("docs/index.html"));
        assert_eq!(opts.png.file_name().unwrap(), DEFAULT_PNG_NAME);
        assert!(opts.png.starts_with(std::env::temp_dir()));
    }

    #[test]
    fn render_all_stops_on_dangling_edge() {
        let mut spec = DiagramSpec::builtin().unwrap();
        spec.edges.push(["cache".into(), "queue".into()]);
        let err = render_all(&spec, &OutputOptions::default()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DiagramError>(),
            Some(DiagramError::UnknownNodeReference { .. })
        ));
    }
}
