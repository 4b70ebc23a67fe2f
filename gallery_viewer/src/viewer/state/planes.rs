use std::time::Duration;

use anyhow::Result;
use bytemuck::cast_slice;
use gallery_core::{ItemId, VideoFrame};
use wgpu::util::DeviceExt;

use super::super::shaders::PlaneUniforms;
use super::ViewerState;
use crate::texture::prepare_rgba_upload;

const VIDEO_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Texture, uniforms and bind group for one gallery item.
pub(super) struct PlaneResources {
    label: String,
    uniform_buffer: wgpu::Buffer,
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    extent: (u32, u32),
    last_sequence: Option<u64>,
}

impl PlaneResources {
    /// Starts out with a 1x1 texture; the shader shows a placeholder colour
    /// until the first frame lands.
    pub(super) fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        item: ItemId,
    ) -> Self {
        let label = format!("plane-{item}");
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-uniforms")),
            contents: cast_slice(&[PlaneUniforms::new(
                glam::Mat4::IDENTITY,
                gallery_core::HoverStyle::Plain,
                false,
                false,
            )]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let texture = create_video_texture(device, &label, 1, 1);
        let bind_group = create_bind_group(device, layout, sampler, &label, &uniform_buffer, &texture);
        Self {
            label,
            uniform_buffer,
            texture,
            bind_group,
            extent: (1, 1),
            last_sequence: None,
        }
    }

    pub(super) fn textured(&self) -> bool {
        self.last_sequence.is_some()
    }

    pub(super) fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }

    pub(super) fn write_uniforms(&self, queue: &wgpu::Queue, uniforms: PlaneUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, cast_slice(&[uniforms]));
    }

    /// Copy `frame` into the plane texture, reallocating it when the video
    /// size changes. Frames already uploaded are skipped.
    pub(super) fn upload(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        sampler: &wgpu::Sampler,
        frame: &VideoFrame<'_>,
    ) -> Result<()> {
        if self.last_sequence == Some(frame.sequence) {
            return Ok(());
        }
        let upload = prepare_rgba_upload(frame.width, frame.height, frame.rgba)?;

        if self.extent != (frame.width, frame.height) {
            self.texture = create_video_texture(device, &self.label, frame.width, frame.height);
            self.bind_group = create_bind_group(
                device,
                layout,
                sampler,
                &self.label,
                &self.uniform_buffer,
                &self.texture,
            );
            self.extent = (frame.width, frame.height);
            log::debug!(
                "[gallery_viewer] {} texture now {}x{}",
                self.label,
                frame.width,
                frame.height
            );
        }

        queue.write_texture(
            wgpu::ImageCopyTexture {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            upload.pixels(),
            wgpu::ImageDataLayout {
                offset: 0,
                bytes_per_row: Some(upload.bytes_per_row()),
                rows_per_image: Some(frame.height),
            },
            wgpu::Extent3d {
                width: frame.width,
                height: frame.height,
                depth_or_array_layers: 1,
            },
        );
        self.last_sequence = Some(frame.sequence);
        Ok(())
    }
}

/// Decode due frames for every item and push the new ones to the GPU.
pub(super) fn upload_media(state: &mut ViewerState, now: Duration) {
    let ViewerState {
        gallery,
        planes,
        device,
        queue,
        plane_layout,
        sampler,
        ..
    } = state;
    gallery.poll_media(now, &mut |item, frame| {
        let Some(plane) = planes.get_mut(item.0) else {
            return;
        };
        if let Err(err) = plane.upload(device, queue, plane_layout, sampler, frame) {
            log::warn!("[gallery_viewer] dropping frame for item {item}: {err:#}");
        }
    });
}

fn create_video_texture(device: &wgpu::Device, label: &str, width: u32, height: u32) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some(&format!("{label}-texture")),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: VIDEO_FORMAT,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    })
}

fn create_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    label: &str,
    uniform_buffer: &wgpu::Buffer,
    texture: &wgpu::Texture,
) -> wgpu::BindGroup {
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{label}-bind-group")),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}
