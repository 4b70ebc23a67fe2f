use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use bytemuck::cast_slice;
use gallery_core::{Gallery, IndicatorFrame, IndicatorIcon};
use wgpu::util::DeviceExt;
use winit::{dpi::PhysicalSize, window::Window};

use super::super::shaders::{
    INDICATOR_SHADER_SOURCE, IndicatorUniforms, PLANE_SHADER_SOURCE, PlaneUniforms, QUAD_INDICES,
    QUAD_VERTICES, QuadVertex,
};
use super::ViewerState;
use super::layout::logical_viewport;
use super::planes::PlaneResources;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Bundles the wgpu objects tied to the viewer window.
struct WgpuBootstrap {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    present_mode: wgpu::PresentMode,
    alpha_mode: wgpu::CompositeAlphaMode,
}

/// Plane pipelines that differ only in depth state, plus the HUD pipeline.
struct Pipelines {
    depth_tested: wgpu::RenderPipeline,
    overlay: wgpu::RenderPipeline,
    indicator: wgpu::RenderPipeline,
    plane_layout: wgpu::BindGroupLayout,
    indicator_layout: wgpu::BindGroupLayout,
}

/// Brings up wgpu for `window`, builds the plane and indicator pipelines and
/// one set of per-plane resources for every gallery item. The gallery is
/// resized to the window's logical size before the first frame.
pub(super) async fn new(window: Arc<Window>, mut gallery: Gallery) -> Result<ViewerState> {
    let size = window.inner_size();
    let wgpu = bootstrap_wgpu(window.clone()).await?;
    let WgpuBootstrap {
        surface,
        device,
        queue,
        surface_format,
        present_mode,
        alpha_mode,
    } = wgpu;

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: surface_format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode,
        alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 1,
    };
    surface.configure(&device, &config);
    println!(
        "Surface configured: {}x{} {:?} ({:?})",
        config.width, config.height, surface_format, present_mode
    );

    let pipelines = create_pipelines(&device, surface_format);
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("gallery-video-sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    let quad_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("gallery-quad-vertices"),
        contents: cast_slice(&QUAD_VERTICES),
        usage: wgpu::BufferUsages::VERTEX,
    });
    let quad_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("gallery-quad-indices"),
        contents: cast_slice(&QUAD_INDICES),
        usage: wgpu::BufferUsages::INDEX,
    });

    let indicator_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("gallery-indicator-uniforms"),
        contents: cast_slice(&[IndicatorUniforms::new(
            IndicatorFrame {
                icon: IndicatorIcon::Play,
                opacity: 0.0,
            },
            1.0,
        )]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let indicator_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("gallery-indicator-bind-group"),
        layout: &pipelines.indicator_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: indicator_uniform_buffer.as_entire_binding(),
        }],
    });

    let planes = gallery
        .registry()
        .ids()
        .map(|item| PlaneResources::new(&device, &pipelines.plane_layout, &sampler, item))
        .collect::<Vec<_>>();
    println!("Allocated GPU resources for {} plane(s)", planes.len());

    let (depth_texture, depth_view) = create_depth_texture(&device, size);
    gallery.resize(logical_viewport(size, window.scale_factor()));

    Ok(ViewerState {
        window,
        surface,
        device,
        queue,
        config,
        size,
        gallery,
        clock: Instant::now(),
        cursor: None,
        _depth_texture: depth_texture,
        depth_view,
        depth_tested_pipeline: pipelines.depth_tested,
        overlay_pipeline: pipelines.overlay,
        indicator_pipeline: pipelines.indicator,
        indicator_uniform_buffer,
        indicator_bind_group,
        quad_vertex_buffer,
        quad_index_buffer,
        quad_index_count: QUAD_INDICES.len() as u32,
        plane_layout: pipelines.plane_layout,
        sampler,
        planes,
    })
}

async fn bootstrap_wgpu(window: Arc<Window>) -> Result<WgpuBootstrap> {
    let instance = wgpu::Instance::default();
    let surface = instance
        .create_surface(window.clone())
        .context("creating wgpu surface")?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        })
        .await
        .context("requesting wgpu adapter")?;

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("gallery-viewer-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
            },
            None,
        )
        .await
        .context("requesting wgpu device")?;

    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .copied()
        .find(|format| format.is_srgb())
        .or_else(|| surface_caps.formats.first().copied())
        .context("surface reports no texture formats")?;
    let present_mode = surface_caps
        .present_modes
        .iter()
        .copied()
        .find(|mode| *mode == wgpu::PresentMode::Mailbox)
        .unwrap_or(wgpu::PresentMode::Fifo);
    let alpha_mode = surface_caps
        .alpha_modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Opaque);

    Ok(WgpuBootstrap {
        surface,
        device,
        queue,
        surface_format,
        present_mode,
        alpha_mode,
    })
}

fn create_pipelines(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Pipelines {
    let plane_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("plane-bind-group-layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<PlaneUniforms>() as u64
                    ),
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });
    let indicator_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("indicator-bind-group-layout"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(
                    std::mem::size_of::<IndicatorUniforms>() as u64
                ),
            },
            count: None,
        }],
    });

    let plane_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("plane-shader"),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(PLANE_SHADER_SOURCE)),
    });
    let indicator_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("indicator-shader"),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(INDICATOR_SHADER_SOURCE)),
    });

    let plane_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("plane-pipeline-layout"),
        bind_group_layouts: &[&plane_layout],
        push_constant_ranges: &[],
    });
    let indicator_pipeline_layout =
        device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("indicator-pipeline-layout"),
            bind_group_layouts: &[&indicator_layout],
            push_constant_ranges: &[],
        });

    let plane_pipeline = |label: &str, depth: wgpu::DepthStencilState| {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&plane_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &plane_shader,
                entry_point: "vs_main",
                buffers: &[quad_vertex_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &plane_shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(depth),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        })
    };

    let depth_tested = plane_pipeline(
        "plane-pipeline",
        wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        },
    );
    // Focused plane: drawn last, ignores and leaves the depth buffer alone.
    let overlay = plane_pipeline(
        "plane-overlay-pipeline",
        wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Always,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        },
    );

    let indicator = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("indicator-pipeline"),
        layout: Some(&indicator_pipeline_layout),
        vertex: wgpu::VertexState {
            module: &indicator_shader,
            entry_point: "vs_main",
            buffers: &[quad_vertex_layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &indicator_shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: false,
            depth_compare: wgpu::CompareFunction::Always,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    });

    Pipelines {
        depth_tested,
        overlay,
        indicator,
        plane_layout,
        indicator_layout,
    }
}

fn quad_vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &QUAD_ATTRIBUTES,
    }
}

const QUAD_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
    wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x2];

pub(super) fn create_depth_texture(
    device: &wgpu::Device,
    size: PhysicalSize<u32>,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("gallery-depth-texture"),
        size: wgpu::Extent3d {
            width: size.width.max(1),
            height: size.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
