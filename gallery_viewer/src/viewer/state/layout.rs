use gallery_core::Viewport;
use winit::dpi::PhysicalSize;

use super::ViewerState;
use super::init::create_depth_texture;

pub(super) fn resize(state: &mut ViewerState, new_size: PhysicalSize<u32>) {
    if new_size.width == 0 || new_size.height == 0 {
        return;
    }

    state.size = new_size;
    state.config.width = new_size.width;
    state.config.height = new_size.height;
    state.surface.configure(&state.device, &state.config);
    let (depth_texture, depth_view) = create_depth_texture(&state.device, new_size);
    state._depth_texture = depth_texture;
    state.depth_view = depth_view;

    let viewport = logical_viewport(new_size, state.window.scale_factor());
    state.gallery.resize(viewport);
    log::debug!(
        "[gallery_viewer] resized to {}x{} ({}x{} logical)",
        new_size.width,
        new_size.height,
        viewport.width,
        viewport.height
    );
}

/// The camera works in logical pixels so plane sizes do not depend on the
/// display's scale factor.
pub(super) fn logical_viewport(size: PhysicalSize<u32>, scale_factor: f64) -> Viewport {
    let logical = size.to_logical::<f32>(scale_factor);
    Viewport::new(logical.width.max(1.0), logical.height.max(1.0))
}
