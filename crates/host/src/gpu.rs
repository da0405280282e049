use tracing::info;
use web_sys::HtmlCanvasElement;

pub struct GpuContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    pub fn surface_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }
}

/// The composite shader writes linear intensities, so a non-sRGB target is
/// preferred. Falls back to whatever the surface lists first.
pub fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| !f.is_srgb())
        .or_else(|| formats.first().copied())
}

fn surface_config(format: wgpu::TextureFormat, width: u32, height: u32) -> wgpu::SurfaceConfiguration {
    wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: width.max(1),
        height: height.max(1),
        present_mode: wgpu::PresentMode::AutoVsync,
        alpha_mode: wgpu::CompositeAlphaMode::Auto,
        view_formats: vec![],
        desired_maximum_frame_latency: 2,
    }
}

const MIB: u64 = 1024 * 1024;

pub async fn init_gpu(canvas: HtmlCanvasElement) -> Result<GpuContext, String> {
    let (width, height) = (canvas.width(), canvas.height());

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::BROWSER_WEBGPU,
        ..Default::default()
    });
    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas))
        .map_err(|e| format!("Failed to create surface: {e}"))?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .map_err(|e| format!("No suitable GPU adapter: {e}"))?;

    let adapter_info = adapter.get_info();
    // Field and agent buffers scale with the canvas; ask for what the adapter has.
    let limits = adapter.limits();
    info!(
        adapter = %adapter_info.name,
        backend = ?adapter_info.backend,
        max_buffer_mib = limits.max_buffer_size / MIB,
        max_storage_mib = limits.max_storage_buffer_binding_size as u64 / MIB,
        max_workgroups = limits.max_compute_workgroups_per_dimension,
        "gpu adapter selected"
    );

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("swarm_device"),
            required_features: wgpu::Features::empty(),
            required_limits: limits,
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        })
        .await
        .map_err(|e| format!("Failed to create device: {e}"))?;

    let format = pick_surface_format(&surface.get_capabilities(&adapter).formats)
        .ok_or("Surface reports no formats")?;
    let surface_config = surface_config(format, width, height);
    surface.configure(&device, &surface_config);
    info!(width = surface_config.width, height = surface_config.height, ?format, "surface configured");

    Ok(GpuContext {
        device,
        queue,
        surface,
        surface_config,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::TextureFormat;

    #[test]
    fn prefers_linear_format() {
        let formats = [TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm];
        assert_eq!(pick_surface_format(&formats), Some(TextureFormat::Bgra8Unorm));
    }

    #[test]
    fn falls_back_to_first_format() {
        let formats = [TextureFormat::Rgba8UnormSrgb, TextureFormat::Bgra8UnormSrgb];
        assert_eq!(pick_surface_format(&formats), Some(TextureFormat::Rgba8UnormSrgb));
        assert_eq!(pick_surface_format(&[]), None);
    }

    #[test]
    fn zero_sized_canvas_still_configures() {
        let config = surface_config(TextureFormat::Bgra8Unorm, 0, 0);
        assert_eq!((config.width, config.height), (1, 1));
        assert_eq!(config.usage, wgpu::TextureUsages::RENDER_ATTACHMENT);
    }
}
