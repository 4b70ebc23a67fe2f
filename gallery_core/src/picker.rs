//! Pointer-to-item ray picking, scoped to one layer at a time.

use glam::Vec3;

use crate::camera::{Camera, Ray};
use crate::item::{ItemId, Layer};
use crate::registry::ItemRegistry;

/// Pointer position in client pixels, origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub client_x: f32,
    pub client_y: f32,
}

impl PointerEvent {
    pub fn new(client_x: f32, client_y: f32) -> Self {
        Self { client_x, client_y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub item: ItemId,
    pub distance: f32,
    pub point: Vec3,
}

#[derive(Debug, Clone)]
pub struct Picker {
    active_layer: Layer,
}

impl Default for Picker {
    fn default() -> Self {
        Self {
            active_layer: Layer::Interactive,
        }
    }
}

impl Picker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layer click picking is currently restricted to.
    pub fn active_layer(&self) -> Layer {
        self.active_layer
    }

    pub(crate) fn set_active_layer(&mut self, layer: Layer) {
        self.active_layer = layer;
    }

    pub fn pick(&self, pointer: PointerEvent, camera: &Camera, registry: &ItemRegistry) -> Option<ItemId> {
        self.pick_layer(pointer, camera, registry, self.active_layer)
    }

    pub fn pick_layer(
        &self,
        pointer: PointerEvent,
        camera: &Camera,
        registry: &ItemRegistry,
        layer: Layer,
    ) -> Option<ItemId> {
        let ndc = camera.viewport().to_ndc(pointer.client_x, pointer.client_y);
        let ray = camera.ray_from_ndc(ndc)?;
        intersect_items(&ray, registry, layer).map(|hit| hit.item)
    }
}

/// Nearest item on `layer` whose quad the ray crosses.
pub fn intersect_items(ray: &Ray, registry: &ItemRegistry, layer: Layer) -> Option<PickHit> {
    let mut best: Option<PickHit> = None;
    for item in registry.items() {
        if item.layer() != layer {
            continue;
        }
        let Some(world) = registry.world_matrix(item.id()) else {
            continue;
        };
        if world.determinant().abs() <= f32::EPSILON {
            continue;
        }
        let inverse = world.inverse();
        // Direction is mapped without renormalizing so `t` stays in world units.
        let origin = inverse.transform_point3(ray.origin);
        let direction = inverse.transform_vector3(ray.direction);
        if direction.z.abs() <= f32::EPSILON {
            continue;
        }
        let t = -origin.z / direction.z;
        if t < 0.0 {
            continue;
        }
        let local = origin + direction * t;
        let half = item.size() * 0.5;
        if local.x.abs() > half.x || local.y.abs() > half.y {
            continue;
        }
        if best.map_or(true, |current| t < current.distance) {
            best = Some(PickHit {
                item: item.id(),
                distance: t,
                point: ray.at(t),
            });
        }
    }
    best
}
