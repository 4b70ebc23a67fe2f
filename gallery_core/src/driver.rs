//! Per-frame tick: spin pivots, advance tweens once, face the camera and
//! hand the renderer a draw list.

use std::time::Duration;

use glam::{Mat4, Vec3};

use crate::gallery::Gallery;
use crate::hover::HoverStyle;
use crate::indicator::IndicatorFrame;
use crate::item::{ItemId, facing_rotation};
use crate::registry::ItemRegistry;
use crate::selection::Transition;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub item: ItemId,
    /// Maps the unit quad (`-0.5..=0.5` in x and y) onto the item in world space.
    pub model: Mat4,
    pub depth_test: bool,
    pub render_order: i32,
    pub style: HoverStyle,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub view_projection: Mat4,
    pub background: [f32; 3],
    /// Stable-sorted by render order; focused items come last.
    pub draw_list: Vec<DrawItem>,
    pub indicator: Option<IndicatorFrame>,
    /// Transitions triggered by tween completions this tick.
    pub transitions: Vec<Transition>,
}

pub fn advance(gallery: &mut Gallery, now: Duration) -> FrameSnapshot {
    let (pivots, _) = gallery.registry.parts_mut();
    for pivot in pivots.iter_mut() {
        pivot.advance();
    }

    let completions = gallery.tweens.update(now, &mut gallery.registry);
    gallery.registry.release(&completions);
    let transitions: Vec<Transition> = completions
        .iter()
        .filter_map(|completion| gallery.dispatch_completion(completion, now))
        .collect();

    face_camera(&mut gallery.registry, gallery.camera.position());

    let selected = gallery.selection.selected();
    let mut draw_list: Vec<DrawItem> = gallery
        .registry
        .items()
        .iter()
        .filter_map(|item| {
            let world = gallery.registry.world_matrix(item.id())?;
            let flags = item.render_flags();
            Some(DrawItem {
                item: item.id(),
                model: world * Mat4::from_scale(item.size().extend(1.0)),
                depth_test: flags.depth_test,
                render_order: flags.render_order,
                style: gallery.hover.style_for(item.id()),
                selected: selected == Some(item.id()),
            })
        })
        .collect();
    draw_list.sort_by_key(|draw| draw.render_order);

    FrameSnapshot {
        view_projection: gallery.camera.view_projection(),
        background: gallery.config.background,
        draw_list,
        indicator: gallery.indicator.frame(now),
        transitions,
    }
}

/// Orient every item so its +Z face points at `target`, compensating for the
/// pivot rotation it inherits.
fn face_camera(registry: &mut ItemRegistry, target: Vec3) {
    let (pivots, items) = registry.parts_mut();
    for (pivot, item) in pivots.iter().zip(items.iter_mut()) {
        let world = pivot.rotation * item.transform.position;
        let facing = facing_rotation(world, target);
        item.transform.rotation = (pivot.rotation.inverse() * facing).normalize();
    }
}
