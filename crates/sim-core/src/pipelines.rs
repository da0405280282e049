const COMMON_WGSL: &str = include_str!("../../../shaders/common.wgsl");
const DEPOSIT_WGSL: &str = include_str!("../../../shaders/deposit.wgsl");
const EVOLVE_WGSL: &str = include_str!("../../../shaders/evolve.wgsl");
const SENSE_MOVE_WGSL: &str = include_str!("../../../shaders/sense_move.wgsl");

pub const AGENT_WORKGROUP: u32 = 64;
pub const FIELD_WORKGROUP: u32 = 8;

fn storage_entry(binding: u32, read_only: bool) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Storage { read_only },
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::COMPUTE,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Full module source of a pass: shared declarations, then the pass body.
fn pass_source(body: &str) -> String {
    format!("{}\n{}", COMMON_WGSL, body)
}

fn build(
    device: &wgpu::Device,
    label: &str,
    body: &str,
    entry_point: &str,
    entries: &[wgpu::BindGroupLayoutEntry],
) -> (wgpu::ComputePipeline, wgpu::BindGroupLayout) {
    let source = pass_source(body);
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(&format!("{label}_bgl")),
        entries,
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{label}_pl")),
        bind_group_layouts: &[&bgl],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
        label: Some(&format!("{label}_pipeline")),
        layout: Some(&layout),
        module: &shader,
        entry_point: Some(entry_point),
        compilation_options: Default::default(),
        cache: None,
    });

    (pipeline, bgl)
}

/// The three compute passes of a frame. Swap has no pipeline; it is a
/// bind-group choice on the host.
pub struct SimPipelines {
    pub deposit: wgpu::ComputePipeline,
    pub deposit_bgl: wgpu::BindGroupLayout,
    pub evolve: wgpu::ComputePipeline,
    pub evolve_bgl: wgpu::BindGroupLayout,
    pub sense_move: wgpu::ComputePipeline,
    pub sense_move_bgl: wgpu::BindGroupLayout,
}

impl SimPipelines {
    pub fn new(device: &wgpu::Device) -> Self {
        // 0: positions (read), 1: hits (atomic), 2: params
        let (deposit, deposit_bgl) = build(
            device,
            "deposit",
            DEPOSIT_WGSL,
            "deposit_main",
            &[storage_entry(0, true), storage_entry(1, false), uniform_entry(2)],
        );

        // 0: field read, 1: field write, 2: hits (drained), 3: params
        let (evolve, evolve_bgl) = build(
            device,
            "evolve",
            EVOLVE_WGSL,
            "evolve_main",
            &[
                storage_entry(0, true),
                storage_entry(1, false),
                storage_entry(2, false),
                uniform_entry(3),
            ],
        );

        // 0/1: positions+headings read, 2/3: positions+headings write,
        // 4: evolved field, 5: params
        let (sense_move, sense_move_bgl) = build(
            device,
            "sense_move",
            SENSE_MOVE_WGSL,
            "sense_move_main",
            &[
                storage_entry(0, true),
                storage_entry(1, true),
                storage_entry(2, false),
                storage_entry(3, false),
                storage_entry(4, true),
                uniform_entry(5),
            ],
        );

        Self {
            deposit,
            deposit_bgl,
            evolve,
            evolve_bgl,
            sense_move,
            sense_move_bgl,
        }
    }
}
