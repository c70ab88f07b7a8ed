/// Terminal front end for the spinning cube
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use spincube_core::{Error, Renderer, SceneConfig, Shading, ShaderSources};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod renderer;

pub use renderer::SoftwareBackend;

/// Rows reserved below the framebuffer for the status line
const STATUS_ROWS: u16 = 1;

/// Duration of one nominal animation frame
const NOMINAL_FRAME: Duration = Duration::from_micros(16_667);

/// Main application struct for terminal rendering
pub struct TerminalApp {
    renderer: Renderer<SoftwareBackend>,
    running: bool,
    last_frame: Instant,
    last_fps_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    /// Sizes the framebuffer to the terminal and runs renderer startup.
    pub fn new(shaders: &ShaderSources, config: SceneConfig) -> Result<Self, Error> {
        let (width, height) =
            terminal::size().map_err(|e| Error::ContextUnavailable(e.to_string()))?;
        let backend = SoftwareBackend::new(
            width as usize,
            height.saturating_sub(STATUS_ROWS) as usize,
        );

        let now = Instant::now();
        Ok(Self {
            renderer: Renderer::new(backend, shaders, config)?,
            running: true,
            last_frame: now,
            last_fps_sample: now,
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target
        self.last_frame = Instant::now();

        while self.running {
            let frame_start = Instant::now();

            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?);
            }

            let dt = frame_start.duration_since(self.last_frame).as_secs_f32()
                / NOMINAL_FRAME.as_secs_f32();
            self.last_frame = frame_start;

            self.render(dt)?;

            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_fps_sample).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_fps_sample).as_secs_f32();
                self.frame_count = 0;
                self.last_fps_sample = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => match code {
                KeyCode::Char('q') | KeyCode::Esc => self.running = false,
                KeyCode::Char(' ') => self.renderer.toggle_pause(),
                _ => {}
            },
            Event::Resize(width, height) => {
                tracing::debug!(width, height, "terminal resized");
                self.renderer
                    .backend_mut()
                    .resize(width as usize, height.saturating_sub(STATUS_ROWS) as usize);
            }
            _ => {}
        }
    }

    fn render(&mut self, dt: f32) -> io::Result<()> {
        let mut stdout = stdout();

        // A paused frame draws nothing; the last image stays on screen.
        if self.renderer.frame(dt).is_some() {
            queue!(stdout, cursor::MoveTo(0, 0))?;
            self.renderer.backend().present(&mut stdout)?;
        }

        let (_, rows) = terminal::size()?;
        queue!(
            stdout,
            cursor::MoveTo(0, rows.saturating_sub(STATUS_ROWS)),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(status_line(&self.renderer, self.fps)),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

fn status_line(renderer: &Renderer<SoftwareBackend>, fps: f32) -> String {
    let state = if renderer.state().is_paused() {
        "PAUSED"
    } else {
        "running"
    };
    let shading = match renderer.config().shading {
        Shading::Flat => "flat",
        Shading::Lit => "lit",
    };
    format!(
        "spincube | {} | {} | FPS: {:.1} | Controls: Space=Pause Q=Quit",
        shading, state, fps
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(config: SceneConfig) -> Renderer<SoftwareBackend> {
        let shaders = ShaderSources::embedded(config.shading);
        Renderer::new(SoftwareBackend::new(40, 12), &shaders, config).unwrap()
    }

    #[test]
    fn test_status_line_shows_shading_and_pause() {
        let mut basic = renderer(SceneConfig::basic());
        assert!(status_line(&basic, 30.0).starts_with("spincube | flat | running | FPS: 30.0"));

        basic.toggle_pause();
        assert!(status_line(&basic, 30.0).contains("| PAUSED |"));

        let lit = renderer(SceneConfig::lit());
        assert!(status_line(&lit, 12.5).contains("| lit |"));
    }
}
