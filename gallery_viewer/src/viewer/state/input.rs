use gallery_core::{PointerEvent, PointerOutcome};
use winit::dpi::PhysicalPosition;

use super::ViewerState;

fn pointer_event(state: &ViewerState, position: PhysicalPosition<f64>) -> PointerEvent {
    let logical = position.to_logical::<f32>(state.window.scale_factor());
    PointerEvent::new(logical.x, logical.y)
}

pub(super) fn cursor_moved(state: &mut ViewerState, position: PhysicalPosition<f64>) {
    state.cursor = Some(position);
    let pointer = pointer_event(state, position);
    let before = state.gallery.hovered();
    let after = state.gallery.pointer_move(pointer);
    if before != after {
        log::trace!("[gallery_viewer] hover {before:?} -> {after:?}");
    }
}

pub(super) fn cursor_left(state: &mut ViewerState) {
    state.cursor = None;
    // Far off-screen, so the pick misses and the hover clears.
    state
        .gallery
        .pointer_move(PointerEvent::new(-1.0e6, -1.0e6));
}

pub(super) fn pointer_pressed(state: &mut ViewerState) {
    let Some(position) = state.cursor else {
        return;
    };
    let pointer = pointer_event(state, position);
    let now = state.clock.elapsed();
    match state.gallery.pointer_down(pointer, now) {
        Ok(PointerOutcome::Activated(transition)) => log::info!(
            "[gallery_viewer] item {} {:?} -> {:?}",
            transition.item,
            transition.from,
            transition.to
        ),
        Ok(PointerOutcome::Dismissed(transition)) => {
            log::info!("[gallery_viewer] item {} dismissed", transition.item)
        }
        Ok(PointerOutcome::Ignored) => {}
        Err(err) => log::warn!("[gallery_viewer] pointer down failed: {err}"),
    }
}
