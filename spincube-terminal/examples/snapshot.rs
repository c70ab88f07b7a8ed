/// Example: render a single frame of the cube to stdout without taking over
/// the terminal
///
/// Usage: cargo run --example snapshot -- [frame] [lit]
use std::env;
use std::io::{self, Write};

use spincube_core::{Renderer, SceneConfig, ShaderSources};
use spincube_terminal::SoftwareBackend;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let frame: u32 = match args.get(1) {
        Some(n) => n.parse()?,
        None => 0,
    };
    let config = match args.get(2).map(String::as_str) {
        Some("lit") => SceneConfig::lit(),
        _ => SceneConfig::basic(),
    };

    let shaders = ShaderSources::embedded(config.shading);
    let mut renderer = Renderer::new(SoftwareBackend::new(80, 24), &shaders, config)?;

    // advance the animation to the requested frame, drawing each one
    for _ in 0..=frame {
        renderer.frame(1.0);
    }

    let mut stdout = io::stdout();
    renderer.backend().present(&mut stdout)?;
    stdout.flush()?;

    let state = renderer.state();
    println!(
        "frame {} | rotation {:.2} rad | position ({:.2}, {:.2}, {:.2})",
        frame, state.rotation, state.position[0], state.position[1], state.position[2]
    );
    Ok(())
}
