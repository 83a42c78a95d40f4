//! Foam3D terminal viewer
//!
//! Orbits a tube swept along a polyline (or an imported STL model) inside
//! a grid cube, rendered as ASCII art.
//! Controls:
//!   - Mouse drag: orbit
//!   - Mouse wheel / `+` `-`: zoom
//!   - P: toggle perspective and orthographic projection
//!   - Q/ESC: Quit

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use foam3d_core::stl;
use foam3d_terminal::{TerminalApp, ViewerConfig};

#[derive(Parser, Debug)]
#[command(name = "foam3d-terminal", version, about = "Orbiting 3D line viewer for the terminal")]
struct Args {
    /// TOML file with viewer settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show this STL model instead of the tube
    #[arg(long)]
    stl: Option<PathBuf>,

    /// Start with the orthographic camera
    #[arg(long)]
    ortho: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ViewerConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    if args.ortho {
        config.projection = foam3d_terminal::config::Projection::Orthographic;
    }

    let model = match &args.stl {
        Some(path) => {
            let data = std::fs::read(path)
                .with_context(|| format!("failed to read STL file {}", path.display()))?;
            let mesh = stl::parse_stl(&data)
                .with_context(|| format!("failed to parse STL file {}", path.display()))?;
            log::info!("loaded {} with {} triangles", path.display(), mesh.indices.len() / 3);
            Some(mesh)
        }
        None => None,
    };

    let mut app = TerminalApp::new(&config, model)?;
    app.run()?;

    log::info!("Graceful shutdown. Bye!");
    Ok(())
}
