//! Window-side runtime for the gallery. Owns the wgpu device and surface plus
//! one texture/uniform pair per plane, and forwards window input into the
//! `Gallery`. Submodules cover lifecycle slices: `init` for setup, `layout`
//! for resize handling, `input` for pointer routing, `planes` for per-plane
//! GPU resources and `render` for the frame itself.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use gallery_core::Gallery;
use wgpu::SurfaceError;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::window::Window;

mod init;
mod input;
mod layout;
mod planes;
mod render;

use planes::PlaneResources;

pub struct ViewerState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    gallery: Gallery,
    clock: Instant,
    cursor: Option<PhysicalPosition<f64>>,
    _depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
    depth_tested_pipeline: wgpu::RenderPipeline,
    overlay_pipeline: wgpu::RenderPipeline,
    indicator_pipeline: wgpu::RenderPipeline,
    indicator_uniform_buffer: wgpu::Buffer,
    indicator_bind_group: wgpu::BindGroup,
    quad_vertex_buffer: wgpu::Buffer,
    quad_index_buffer: wgpu::Buffer,
    quad_index_count: u32,
    plane_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    planes: Vec<PlaneResources>,
}

impl ViewerState {
    pub async fn new(window: Arc<Window>, gallery: Gallery) -> Result<Self> {
        init::new(window, gallery).await
    }

    pub fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        layout::resize(self, new_size);
    }

    pub fn render(&mut self) -> Result<(), SurfaceError> {
        render::render(self)
    }

    pub fn cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        input::cursor_moved(self, position);
    }

    pub fn cursor_left(&mut self) {
        input::cursor_left(self);
    }

    pub fn pointer_pressed(&mut self) {
        input::pointer_pressed(self);
    }
}
