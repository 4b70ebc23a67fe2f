use std::time::Duration;

use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::camera::{Camera, Viewport};
use crate::config::GalleryConfig;
use crate::driver::{self, FrameSnapshot};
use crate::error::GalleryError;
use crate::hover::{HoverFeedback, hover_feedback};
use crate::indicator::{IndicatorIcon, PlaybackIndicator};
use crate::item::{ItemId, Layer, PlaybackState};
use crate::media::{
    MediaBinder, MediaElement, MediaResolver, MediaSource, MediaVariant, StreamingClient, VideoFrame,
};
use crate::picker::{Picker, PointerEvent};
use crate::registry::ItemRegistry;
use crate::selection::{
    PlaybackToggle, PointerOutcome, SelectionContext, SelectionController, Transition,
};
use crate::tween::{TweenCompletion, TweenTimer};

/// The whole interactive scene: items, camera, animation timer and the
/// selection controller, behind the handful of events a window delivers.
pub struct Gallery {
    pub(crate) config: GalleryConfig,
    pub(crate) registry: ItemRegistry,
    pub(crate) camera: Camera,
    pub(crate) picker: Picker,
    pub(crate) tweens: TweenTimer,
    pub(crate) binder: MediaBinder,
    pub(crate) selection: SelectionController,
    pub(crate) hover: Box<dyn HoverFeedback>,
    pub(crate) indicator: PlaybackIndicator,
}

impl Gallery {
    pub fn new<F>(
        config: GalleryConfig,
        viewport: Viewport,
        client: Box<dyn StreamingClient>,
        element_factory: F,
    ) -> Self
    where
        F: FnMut(&MediaSource) -> Box<dyn MediaElement>,
    {
        let mut rng = match config.scene.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut binder = MediaBinder::new(MediaResolver::new(config.media.iter().cloned()), client);
        let registry = ItemRegistry::create(
            &config.media,
            &config.scene,
            &mut rng,
            element_factory,
            &mut binder,
        );
        log::info!(
            "[gallery] created {} item(s) from {} media source(s)",
            registry.len(),
            binder.resolver().len()
        );

        Self {
            registry,
            camera: Camera::new(&config.camera, viewport),
            picker: Picker::new(),
            tweens: TweenTimer::new(),
            binder,
            selection: SelectionController::new(config.focus.clone()),
            hover: hover_feedback(config.hover.feedback),
            indicator: PlaybackIndicator::new(&config.indicator),
            config,
        }
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn picker(&self) -> &Picker {
        &self.picker
    }

    pub fn tweens(&self) -> &TweenTimer {
        &self.tweens
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.selection.selected()
    }

    pub fn hovered(&self) -> Option<ItemId> {
        self.selection.hovered()
    }

    pub fn hover_feedback(&self) -> &dyn HoverFeedback {
        self.hover.as_ref()
    }

    pub fn indicator(&self) -> &PlaybackIndicator {
        &self.indicator
    }

    fn split(&mut self, now: Duration) -> (&mut SelectionController, SelectionContext<'_>) {
        let Gallery {
            registry,
            picker,
            tweens,
            binder,
            selection,
            hover,
            ..
        } = self;
        (
            selection,
            SelectionContext {
                registry,
                picker,
                tweens,
                binder,
                hover: hover.as_mut(),
                now,
            },
        )
    }

    /// Pick under the pointer with the picker's current layer, then activate
    /// the hit item or dismiss the selection on a miss.
    pub fn pointer_down(
        &mut self,
        pointer: PointerEvent,
        now: Duration,
    ) -> Result<PointerOutcome, GalleryError> {
        if self.registry.is_empty() {
            return Ok(PointerOutcome::Ignored);
        }
        let hit = self.picker.pick(pointer, &self.camera, &self.registry);
        let (selection, mut ctx) = self.split(now);
        let outcome = selection.pointer_down(hit, &mut ctx)?;
        match outcome {
            PointerOutcome::Activated(transition) => self.note_transition(&transition, now),
            PointerOutcome::Dismissed(_) => self.indicator.hide(),
            PointerOutcome::Ignored => {}
        }
        Ok(outcome)
    }

    /// Hover picking looks at the interactive layer, so the focused item
    /// never shows up as hovered. While something is selected the focused
    /// quad is tested first and hides whatever sits behind it.
    pub fn pointer_move(&mut self, pointer: PointerEvent) -> Option<ItemId> {
        let hit = if self.registry.is_empty() || self.focused_under(pointer) {
            None
        } else {
            self.picker
                .pick_layer(pointer, &self.camera, &self.registry, Layer::Interactive)
        };
        self.selection.pointer_move(hit, self.hover.as_mut());
        self.selection.hovered()
    }

    fn focused_under(&self, pointer: PointerEvent) -> bool {
        self.selection.selected().is_some()
            && self
                .picker
                .pick_layer(pointer, &self.camera, &self.registry, Layer::Focused)
                .is_some()
    }

    pub fn activate(&mut self, item: ItemId, now: Duration) -> Result<Transition, GalleryError> {
        let (selection, mut ctx) = self.split(now);
        let transition = selection.activate(item, &mut ctx)?;
        self.note_transition(&transition, now);
        Ok(transition)
    }

    pub fn dismiss(&mut self, now: Duration) -> Option<Transition> {
        let (selection, mut ctx) = self.split(now);
        let transition = selection.dismiss(&mut ctx)?;
        self.indicator.hide();
        Some(transition)
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.camera.resize(viewport);
    }

    /// The preview of `item` produced its first frame.
    pub fn media_frame_ready(&mut self, item: ItemId) -> bool {
        self.selection.preview_ready(item, &mut self.registry)
    }

    /// Advance every media element to `now` and hand each decoded frame to
    /// `sink`.
    pub fn poll_media(&mut self, now: Duration, sink: &mut dyn FnMut(ItemId, &VideoFrame<'_>)) {
        let mut produced = Vec::new();
        for item in self.registry.items_mut().iter_mut() {
            let id = item.id();
            if let Some(frame) = item.media.current_frame(now) {
                sink(id, &frame);
                produced.push(id);
            }
        }
        for id in produced {
            self.media_frame_ready(id);
        }
    }

    pub fn advance_frame(&mut self, now: Duration) -> FrameSnapshot {
        driver::advance(self, now)
    }

    pub(crate) fn dispatch_completion(
        &mut self,
        completion: &TweenCompletion,
        now: Duration,
    ) -> Option<Transition> {
        let (selection, mut ctx) = self.split(now);
        let transition = selection.on_animation_complete(completion, &mut ctx)?;
        self.note_transition(&transition, now);
        Some(transition)
    }

    fn note_transition(&mut self, transition: &Transition, now: Duration) {
        if transition.demoted.is_some() {
            self.indicator.hide();
        }
        match transition.toggled {
            Some(PlaybackToggle::Playing) => self.indicator.show(IndicatorIcon::Play, now),
            Some(PlaybackToggle::Paused) => self.indicator.show(IndicatorIcon::Pause, now),
            None if transition.started_playback() => self.indicator.show(IndicatorIcon::Play, now),
            None => {}
        }
    }

    pub fn layout(&self) -> LayoutSummary {
        let items = self
            .registry
            .items()
            .iter()
            .zip(self.registry.pivots())
            .map(|(item, pivot)| ItemLayout {
                id: item.id(),
                media_identifier: item.media_identifier().to_string(),
                home_position: item.home_position(),
                size: item.size(),
                rotation_axis: pivot.rotation_axis(),
                rotation_speed: pivot.rotation_speed(),
                playback_state: item.playback_state(),
                bound_variant: item.bound_variant(),
                source: item.media().src().map(str::to_string),
            })
            .collect();
        let viewport = self.camera.viewport();
        LayoutSummary {
            viewport: [viewport.width, viewport.height],
            zoom: self.config.camera.zoom,
            hover_feedback: self.hover.name(),
            items,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutSummary {
    pub viewport: [f32; 2],
    pub zoom: f32,
    pub hover_feedback: &'static str,
    pub items: Vec<ItemLayout>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemLayout {
    pub id: ItemId,
    pub media_identifier: String,
    pub home_position: Vec3,
    pub size: Vec2,
    pub rotation_axis: Vec3,
    pub rotation_speed: f32,
    pub playback_state: PlaybackState,
    pub bound_variant: Option<MediaVariant>,
    pub source: Option<String>,
}
