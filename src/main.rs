use clap::{Args, Parser, Subcommand};
use cloudviz::Result;
use cloudviz::generate::{self, OutputOptions};
use cloudviz::model::ArchitectureGraph;
use cloudviz::render::DEFAULT_SCALE;
use cloudviz::spec::DiagramSpec;

use anyhow::Context;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cloudviz")]
#[command(about = "Cloud architecture diagram generator (PNG + interactive HTML)", long_about = None)]
struct Cli {
    /// More log output (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Defaults to `render` with default paths.
    #[command(subcommand)]
    cmd: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the static PNG and the interactive HTML page.
    Render(RenderArgs),

    /// Validate a diagram file and print its graph summary.
    Validate {
        /// Diagram JSON; the built-in cloud architecture if omitted.
        #[arg(long)]
        diagram: Option<PathBuf>,
    },

    /// Write the built-in diagram as JSON, for editing and reuse.
    Export {
        /// Output file; stdout if omitted.
        #[arg(short = 'o', long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args, Default)]
struct RenderArgs {
    /// Diagram JSON; the built-in cloud architecture if omitted.
    #[arg(long)]
    diagram: Option<PathBuf>,

    /// PNG output path [default: <temp dir>/cloud_architecture_static.png]
    #[arg(long)]
    png: Option<PathBuf>,

    /// HTML output path.
    #[arg(long, default_value = generate::DEFAULT_HTML_PATH)]
    html: PathBuf,

    /// PNG pixels per diagram pixel.
    #[arg(long, default_value_t = DEFAULT_SCALE)]
    scale: f32,

    /// Open the HTML page in the default browser afterwards.
    #[arg(long)]
    open: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Some(Commands::Render(args)) => render(args)?,
        None => render(RenderArgs {
            html: PathBuf::from(generate::DEFAULT_HTML_PATH),
            scale: DEFAULT_SCALE,
            ..RenderArgs::default()
        })?,
        Some(Commands::Validate { diagram }) => {
            let spec = DiagramSpec::load(diagram.as_deref())?;
            let graph = ArchitectureGraph::build(&spec.validate_and_build()?)?;
            println!("{}", serde_json::to_string_pretty(&graph.summary())?);
        }
        Some(Commands::Export { out }) => {
            let text = DiagramSpec::builtin()?.to_json_pretty()?;
            match out {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("write {}", path.display()))?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{}", text),
            }
        }
    }

    Ok(())
}

fn render(args: RenderArgs) -> Result<()> {
    let spec = DiagramSpec::load(args.diagram.as_deref())?;
    let opts = OutputOptions {
        png: args.png.unwrap_or_else(generate::default_png_path),
        html: args.html,
        scale: args.scale,
        ..OutputOptions::default()
    };

    let files = generate::generate(&spec, &opts)?;
    println!("Wrote {}", files.png.display());
    println!("Wrote {}", files.html.display());

    if args.open {
        let target = std::fs::canonicalize(&files.html)
            .with_context(|| format!("resolve {}", files.html.display()))?;
        log::info!("opening {} in browser", target.display());
        if let Err(err) = webbrowser::open(&target.to_string_lossy()) {
            log::warn!("could not open browser: {}", err);
        }
    }
    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}
