use std::fmt;

use glam::{Mat3, Mat4, Quat, Vec2, Vec3};
use serde::Serialize;

use crate::media::{MediaElement, MediaVariant};
use crate::tween::TweenHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ItemId(pub usize);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Picking/draw partition an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Layer {
    Interactive,
    Focused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlaybackState {
    /// Preview source bound, no frame decoded yet.
    Initial,
    /// Preview source is producing frames.
    PreviewReady,
    /// Full-length source bound and paused, waiting for the focus animation.
    FullLoaded,
    /// Full-length source unmuted and under user play/pause control.
    FullPlaying,
}

impl PlaybackState {
    pub fn label(self) -> &'static str {
        match self {
            PlaybackState::Initial => "initial",
            PlaybackState::PreviewReady => "preview-ready",
            PlaybackState::FullLoaded => "full-loaded",
            PlaybackState::FullPlaying => "full-playing",
        }
    }
}

/// Live local transform of an item relative to its pivot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ItemTransform {
    pub position: Vec3,
    pub scale: Vec3,
    pub rotation: Quat,
}

impl ItemTransform {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            scale: Vec3::ONE,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderFlags {
    pub depth_test: bool,
    pub render_order: i32,
}

impl Default for RenderFlags {
    fn default() -> Self {
        Self {
            depth_test: true,
            render_order: 0,
        }
    }
}

/// Active tween per animated property; a new request on a property cancels
/// whatever handle sits in its slot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSlots {
    pub position: Option<TweenHandle>,
    pub scale: Option<TweenHandle>,
}

pub struct Item {
    id: ItemId,
    home_position: Vec3,
    media_identifier: String,
    size: Vec2,
    pub(crate) transform: ItemTransform,
    pub(crate) playback_state: PlaybackState,
    pub(crate) layer: Layer,
    pub(crate) render: RenderFlags,
    pub(crate) bound_variant: Option<MediaVariant>,
    pub(crate) animations: AnimationSlots,
    pub(crate) media: Box<dyn MediaElement>,
}

impl Item {
    pub(crate) fn new(
        id: ItemId,
        home_position: Vec3,
        media_identifier: String,
        size: Vec2,
        media: Box<dyn MediaElement>,
    ) -> Self {
        Self {
            id,
            home_position,
            media_identifier,
            size,
            transform: ItemTransform::at(home_position),
            playback_state: PlaybackState::Initial,
            layer: Layer::Interactive,
            render: RenderFlags::default(),
            bound_variant: None,
            animations: AnimationSlots::default(),
            media,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn home_position(&self) -> Vec3 {
        self.home_position
    }

    pub fn media_identifier(&self) -> &str {
        &self.media_identifier
    }

    /// Plane width and height in world units at unit scale.
    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn transform(&self) -> &ItemTransform {
        &self.transform
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.playback_state
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn render_flags(&self) -> RenderFlags {
        self.render
    }

    pub fn bound_variant(&self) -> Option<MediaVariant> {
        self.bound_variant
    }

    pub fn animations(&self) -> AnimationSlots {
        self.animations
    }

    pub fn media(&self) -> &dyn MediaElement {
        self.media.as_ref()
    }
}

/// Orbital anchor owning exactly one item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pivot {
    item: ItemId,
    rotation_axis: Vec3,
    rotation_speed: f32,
    pub(crate) rotation: Quat,
}

impl Pivot {
    pub(crate) fn new(item: ItemId, rotation_axis: Vec3, rotation_speed: f32) -> Self {
        Self {
            item,
            rotation_axis,
            rotation_speed,
            rotation: Quat::IDENTITY,
        }
    }

    pub fn item(&self) -> ItemId {
        self.item
    }

    pub fn rotation_axis(&self) -> Vec3 {
        self.rotation_axis
    }

    /// Radians applied per frame tick.
    pub fn rotation_speed(&self) -> f32 {
        self.rotation_speed
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Rotate about the pivot's own axis in local space.
    pub(crate) fn advance(&mut self) {
        let step = Quat::from_axis_angle(self.rotation_axis, self.rotation_speed);
        self.rotation = (self.rotation * step).normalize();
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation)
    }
}

/// Rotation whose +Z axis points from `from` toward `target`, keeping +Y as
/// close to world up as possible. Planes are authored facing +Z.
pub fn facing_rotation(from: Vec3, target: Vec3) -> Quat {
    let forward = (target - from).normalize_or_zero();
    if forward == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let mut right = Vec3::Y.cross(forward);
    if right.length_squared() < 1e-8 {
        // Looking straight up or down; borrow +Z as the up hint instead.
        right = Vec3::Z.cross(forward);
    }
    let right = right.normalize();
    let up = forward.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, forward))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn facing_rotation_points_plus_z_at_target() {
        let from = Vec3::new(1.0, -0.5, 0.25);
        let target = Vec3::new(0.0, 0.0, 5.0);
        let rotation = facing_rotation(from, target);
        let forward = rotation * Vec3::Z;
        let expected = (target - from).normalize();
        assert!((forward - expected).length() < EPSILON, "{forward:?}");
        let up = rotation * Vec3::Y;
        assert!(up.y > 0.0);
    }

    #[test]
    fn facing_rotation_handles_vertical_direction() {
        let rotation = facing_rotation(Vec3::ZERO, Vec3::new(0.0, 3.0, 0.0));
        let forward = rotation * Vec3::Z;
        assert!((forward - Vec3::Y).length() < EPSILON);
    }

    #[test]
    fn pivot_advances_about_axis() {
        let mut pivot = Pivot::new(ItemId(0), Vec3::Y, std::f32::consts::FRAC_PI_2);
        pivot.advance();
        let moved = pivot.rotation() * Vec3::X;
        assert!((moved - Vec3::new(0.0, 0.0, -1.0)).length() < EPSILON);
        assert_eq!(pivot.rotation_axis(), Vec3::Y);
    }
}
