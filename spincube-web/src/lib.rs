/// spincube Web - WebGL2 renderer for the spinning cube
///
/// `start` runs the cube with embedded shaders; `start_with_shader_urls`
/// fetches the shader sources first and only starts the frame loop once both
/// have arrived.
use std::cell::RefCell;
use std::rc::Rc;

use spincube_core::{Error, Renderer, SceneConfig, ShaderSources};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{console, KeyboardEvent, Response};

mod backend;
mod logging;

pub use backend::WebGlBackend;

/// Duration of one nominal animation frame in milliseconds
const NOMINAL_FRAME_MS: f64 = 1000.0 / 60.0;

/// Frame deltas are capped so a backgrounded tab does not teleport the cube
const MAX_FRAME_DELTA: f32 = 4.0;

type SharedRenderer = Rc<RefCell<Renderer<WebGlBackend>>>;
type FrameCallback = Closure<dyn FnMut(f64)>;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    logging::init(tracing::Level::INFO);
}

/// Starts the cube on the canvas with the given id using embedded shaders.
#[wasm_bindgen]
pub fn start(canvas_id: &str, lit: bool) -> Result<(), JsValue> {
    let config = preset(lit);
    let shaders = ShaderSources::embedded(config.shading);
    launch(canvas_id, &shaders, config)
}

/// Fetches vertex and fragment shader text, then starts the cube. A failed
/// fetch aborts startup before any frame is scheduled.
#[wasm_bindgen]
pub async fn start_with_shader_urls(
    canvas_id: String,
    vertex_url: String,
    fragment_url: String,
    lit: bool,
) -> Result<(), JsValue> {
    let config = preset(lit);
    let vertex = fetch_text(&vertex_url).await.map_err(report)?;
    let fragment = fetch_text(&fragment_url).await.map_err(report)?;
    let shaders = ShaderSources::from_text(vertex, fragment, config.shading).map_err(report)?;
    launch(&canvas_id, &shaders, config)
}

fn preset(lit: bool) -> SceneConfig {
    if lit {
        SceneConfig::lit()
    } else {
        SceneConfig::basic()
    }
}

fn launch(canvas_id: &str, shaders: &ShaderSources, config: SceneConfig) -> Result<(), JsValue> {
    let backend = WebGlBackend::from_canvas_id(canvas_id).map_err(report)?;
    let renderer = Renderer::new(backend, shaders, config).map_err(report)?;
    let renderer = Rc::new(RefCell::new(renderer));

    install_pause_toggle(&renderer)?;
    run_frame_loop(renderer)
}

/// Space bar flips the pause flag.
fn install_pause_toggle(renderer: &SharedRenderer) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let renderer = Rc::clone(renderer);
    let on_key = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
        if event.key() == " " {
            renderer.borrow_mut().toggle_pause();
        }
    });
    window.add_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref())?;
    // lives for the page
    on_key.forget();
    Ok(())
}

/// Schedules one `frame` per animation frame. The callback reschedules itself
/// even while paused so the cube can be resumed.
fn run_frame_loop(renderer: SharedRenderer) -> Result<(), JsValue> {
    let callback: Rc<RefCell<Option<FrameCallback>>> = Rc::new(RefCell::new(None));
    let reschedule = Rc::clone(&callback);
    let mut last_timestamp = None;

    *callback.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
        let dt = frame_delta(last_timestamp, timestamp);
        last_timestamp = Some(timestamp);
        renderer.borrow_mut().frame(dt);

        if let Some(next) = reschedule.borrow().as_ref() {
            if let Err(e) = request_animation_frame(next) {
                console::error_2(&"failed to schedule frame".into(), &e);
            }
        }
    }));

    let first = callback.borrow();
    let first = first
        .as_ref()
        .ok_or_else(|| JsValue::from_str("frame callback missing"))?;
    request_animation_frame(first)?;
    Ok(())
}

fn request_animation_frame(callback: &FrameCallback) -> Result<i32, JsValue> {
    web_sys::window()
        .ok_or_else(|| JsValue::from_str("no window"))?
        .request_animation_frame(callback.as_ref().unchecked_ref())
}

/// Elapsed nominal frames between two animation-frame timestamps.
fn frame_delta(previous: Option<f64>, now: f64) -> f32 {
    match previous {
        Some(previous) => (((now - previous) / NOMINAL_FRAME_MS) as f32).clamp(0.0, MAX_FRAME_DELTA),
        None => 1.0,
    }
}

async fn fetch_text(url: &str) -> Result<String, Error> {
    let fetch_error = |message: String| Error::ShaderFetch {
        path: url.into(),
        source: std::io::Error::new(std::io::ErrorKind::Other, message),
    };

    let window = web_sys::window().ok_or_else(|| fetch_error("no window".to_string()))?;
    let response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| fetch_error(format!("{e:?}")))?
        .dyn_into::<Response>()
        .map_err(|_| fetch_error("fetch did not return a Response".to_string()))?;
    if !response.ok() {
        return Err(fetch_error(format!("HTTP {}", response.status())));
    }

    let text = response.text().map_err(|e| fetch_error(format!("{e:?}")))?;
    let text = JsFuture::from(text)
        .await
        .map_err(|e| fetch_error(format!("{e:?}")))?;
    text.as_string()
        .ok_or_else(|| fetch_error("response body is not text".to_string()))
}

/// Surfaces a startup failure to the user and converts it for JS.
fn report(error: Error) -> JsValue {
    let message = error.to_string();
    tracing::error!(%message, "startup failed");
    if matches!(error, Error::ContextUnavailable(_)) {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(&message);
        }
    }
    JsValue::from_str(&message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_frame_is_one_nominal_frame() {
        assert_eq!(frame_delta(None, 1234.5), 1.0);
    }

    #[test]
    fn test_frame_delta_scales_with_elapsed_time() {
        let dt = frame_delta(Some(1000.0), 1000.0 + 2.0 * NOMINAL_FRAME_MS);
        assert!((dt - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_frame_delta_is_capped() {
        assert_eq!(frame_delta(Some(0.0), 10_000.0), MAX_FRAME_DELTA);
        assert_eq!(frame_delta(Some(50.0), 10.0), 0.0);
    }

    #[test]
    fn test_presets() {
        assert_eq!(preset(false), SceneConfig::basic());
        assert_eq!(preset(true), SceneConfig::lit());
    }
}
