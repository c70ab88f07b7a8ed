/// spincube terminal demo - spinning, bouncing cube
///
/// Controls:
///   - Space: Pause / resume
///   - Q/ESC: Quit
use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use spincube_core::{SceneConfig, ShaderSources};
use spincube_terminal::TerminalApp;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Preset {
    /// Flat per-face colors, fixed bounds
    Basic,
    /// Directional lighting through the normal matrix
    Lit,
}

#[derive(Parser)]
#[command(name = "spincube-terminal", about = "Spinning, bouncing cube in the terminal")]
struct Cli {
    /// Built-in scene to run when no config file is given
    #[arg(short, long, value_enum, default_value = "basic")]
    preset: Preset,

    /// JSON scene configuration; overrides the preset
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding cube.vert and cube.frag
    #[arg(long)]
    shader_dir: Option<PathBuf>,

    /// Write logs to this file (the terminal is taken over by the renderer)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("failed to create log file {}", path.display()))?;
        let filter = if cli.verbose { "debug" } else { "info" };
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    }

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load scene config {}", path.display()))?,
        None => match cli.preset {
            Preset::Basic => SceneConfig::basic(),
            Preset::Lit => SceneConfig::lit(),
        },
    };

    let shaders = match &cli.shader_dir {
        Some(dir) => ShaderSources::load(dir, config.shading)?,
        None => ShaderSources::embedded(config.shading),
    };

    let mut app = TerminalApp::new(&shaders, config).context("renderer startup failed")?;
    app.run()?;

    println!("Thank you for using spincube!");
    Ok(())
}
