pub mod bridge;
pub mod gpu;
pub mod logging;
pub mod timing;

use rand::rngs::StdRng;
use rand::SeedableRng;
use renderer::Renderer;
use sim_core::{GpuSimEngine, SimError};
use timing::FrameTiming;
use tracing::{error, info, warn};
use types::{SimParams, WorldSize};
use wasm_bindgen::prelude::*;

/// Canvas-to-world divisors tried in order when the full-resolution field
/// does not fit the device.
const WORLD_SCALES: [u32; 3] = [1, 2, 4];

pub struct App {
    pub gpu: gpu::GpuContext,
    pub engine: GpuSimEngine,
    pub renderer: Renderer,
    pub timing: FrameTiming,
    /// Parameters the running frames use.
    pub params: SimParams,
    /// Edits from the bridge, applied at the next frame boundary.
    pub staged: Option<SimParams>,
    pub reset_requested: bool,
    /// Set after the first failed frame; the loop does nothing afterwards.
    pub halted: bool,
}

impl App {
    pub fn pending_params(&self) -> &SimParams {
        self.staged.as_ref().unwrap_or(&self.params)
    }

    pub fn stage(&mut self, params: SimParams) {
        self.staged = Some(params);
    }

    /// Swap in staged params and run any requested reset. A different agent
    /// count always resets.
    fn apply_pending(&mut self) -> Result<(), SimError> {
        if let Some(next) = self.staged.take() {
            next.validate()?;
            if next.agent_count != self.params.agent_count {
                self.reset_requested = true;
            }
            self.params = next;
        }
        if self.reset_requested {
            self.reset_requested = false;
            self.engine
                .reset(&self.gpu.device, &self.gpu.queue, &self.params)?;
            info!(agents = self.params.agent_count, "swarm reset");
        }
        Ok(())
    }

    fn halt(&mut self, e: &SimError) {
        error!(error = %e, "simulation stopped");
        self.halted = true;
    }
}

fn entropy_seed() -> u64 {
    (js_sys::Math::random() * u64::MAX as f64) as u64
}

#[wasm_bindgen]
pub async fn init() -> Result<(), JsValue> {
    logging::init(tracing::Level::DEBUG);

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let canvas = document
        .get_element_by_id("gpu-canvas")
        .ok_or("no canvas element with id 'gpu-canvas'")?;
    let canvas: web_sys::HtmlCanvasElement = canvas
        .dyn_into()
        .map_err(|_| "element is not a canvas")?;

    // One field cell per device pixel.
    let dpr = window.device_pixel_ratio();
    let width = ((canvas.client_width() as f64 * dpr) as u32).max(1);
    let height = ((canvas.client_height() as f64 * dpr) as u32).max(1);
    canvas.set_width(width);
    canvas.set_height(height);

    info!(width, height, dpr, "canvas sized");

    let gpu = gpu::init_gpu(canvas).await.map_err(|e| JsValue::from_str(&e))?;
    let params = SimParams::default();

    let mut engine = None;
    for &scale in &WORLD_SCALES {
        let world = WorldSize::new((width / scale).max(1), (height / scale).max(1));
        info!(width = world.width, height = world.height, "trying world");
        let rng = StdRng::seed_from_u64(entropy_seed());
        match GpuSimEngine::try_new(&gpu.device, &gpu.queue, world, &params, rng) {
            Ok(e) => {
                engine = Some(e);
                break;
            }
            Err(SimError::Resource(e)) => {
                warn!(
                    width = world.width,
                    height = world.height,
                    error = %e,
                    "world does not fit, trying smaller"
                );
            }
            Err(e) => return Err(JsValue::from_str(&e.to_string())),
        }
    }

    let engine = engine.ok_or_else(|| {
        JsValue::from_str("Failed to allocate GPU buffers. GPU may lack sufficient memory.")
    })?;

    let renderer = Renderer::new(&gpu.device, gpu.surface_config.format);

    let app = App {
        gpu,
        engine,
        renderer,
        timing: FrameTiming::new(),
        params,
        staged: None,
        reset_requested: false,
        halted: false,
    };

    bridge::APP.with(|cell| {
        *cell.borrow_mut() = Some(app);
    });

    info!("swarm initialized");
    Ok(())
}

#[wasm_bindgen]
pub fn frame() {
    bridge::APP.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let app = match borrow.as_mut() {
            Some(app) if !app.halted => app,
            _ => return,
        };

        if let Err(e) = app.apply_pending() {
            app.halt(&e);
            return;
        }

        for _ in 0..app.timing.ticks_due() {
            if let Err(e) = app.engine.tick(&app.gpu.device, &app.gpu.queue, &app.params) {
                app.halt(&e);
                return;
            }
        }

        let surface_texture = match app.gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost) => {
                app.gpu.surface.configure(&app.gpu.device, &app.gpu.surface_config);
                return;
            }
            Err(_) => return,
        };

        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = app
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        app.renderer.render_frame(
            &mut encoder,
            &surface_view,
            &app.gpu.device,
            &app.gpu.queue,
            app.engine.current_field_buffer(),
            app.engine.world(),
            app.gpu.surface_size(),
        );

        app.gpu.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
    });
}
