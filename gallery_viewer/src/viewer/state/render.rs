use gallery_core::{DrawItem, FrameSnapshot};
use wgpu::SurfaceError;

use super::super::shaders::{IndicatorUniforms, PlaneUniforms};
use super::ViewerState;
use super::planes;

pub(super) fn render(state: &mut ViewerState) -> Result<(), SurfaceError> {
    let now = state.clock.elapsed();
    planes::upload_media(state, now);
    let snapshot = state.gallery.advance_frame(now);
    for transition in &snapshot.transitions {
        log::info!(
            "[gallery_viewer] item {} {:?} -> {:?}",
            transition.item,
            transition.from,
            transition.to
        );
    }

    let frame = state.surface.get_current_texture()?;
    let view = frame
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = state
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("gallery-viewer-encoder"),
        });

    write_uniforms(state, &snapshot);
    draw_gallery(state, &snapshot, &view, &mut encoder);

    state.queue.submit(std::iter::once(encoder.finish()));
    frame.present();
    Ok(())
}

fn write_uniforms(state: &ViewerState, snapshot: &FrameSnapshot) {
    for draw in &snapshot.draw_list {
        let Some(plane) = state.planes.get(draw.item.0) else {
            continue;
        };
        plane.write_uniforms(
            &state.queue,
            PlaneUniforms::new(
                snapshot.view_projection * draw.model,
                draw.style,
                plane.textured(),
                draw.selected,
            ),
        );
    }
    if let Some(indicator) = snapshot.indicator {
        let aspect = state.size.width.max(1) as f32 / state.size.height.max(1) as f32;
        state.queue.write_buffer(
            &state.indicator_uniform_buffer,
            0,
            bytemuck::cast_slice(&[IndicatorUniforms::new(indicator, aspect)]),
        );
    }
}

fn draw_gallery(
    state: &ViewerState,
    snapshot: &FrameSnapshot,
    view: &wgpu::TextureView,
    encoder: &mut wgpu::CommandEncoder,
) {
    let [r, g, b] = snapshot.background;
    let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("gallery-pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color {
                    r: r as f64,
                    g: g as f64,
                    b: b as f64,
                    a: 1.0,
                }),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: &state.depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    rpass.set_vertex_buffer(0, state.quad_vertex_buffer.slice(..));
    rpass.set_index_buffer(state.quad_index_buffer.slice(..), wgpu::IndexFormat::Uint16);

    // Draw list order is the paint order: render order first, then item order.
    for draw in &snapshot.draw_list {
        let Some(plane) = state.planes.get(draw.item.0) else {
            continue;
        };
        rpass.set_pipeline(pipeline_for(state, draw));
        rpass.set_bind_group(0, plane.bind_group(), &[]);
        rpass.draw_indexed(0..state.quad_index_count, 0, 0..1);
    }

    if snapshot.indicator.is_some() {
        rpass.set_pipeline(&state.indicator_pipeline);
        rpass.set_bind_group(0, &state.indicator_bind_group, &[]);
        rpass.draw_indexed(0..state.quad_index_count, 0, 0..1);
    }
}

fn pipeline_for<'a>(state: &'a ViewerState, draw: &DrawItem) -> &'a wgpu::RenderPipeline {
    if draw.depth_test {
        &state.depth_tested_pipeline
    } else {
        &state.overlay_pipeline
    }
}
