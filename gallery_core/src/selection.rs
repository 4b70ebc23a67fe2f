//! Selection state machine.
//!
//! `SelectionController` owns the single selected item and the single hovered
//! item. Pointer-down with a hit activates that item; pointer-down without a
//! hit dismisses the current selection. Transitions enqueue tweens and touch
//! media directly but never wait on either; the follow-up "start full
//! playback" step runs from the centering tween's completion.

use std::time::Duration;

use glam::Vec3;

use crate::config::FocusConfig;
use crate::error::{GalleryError, MediaError};
use crate::hover::HoverFeedback;
use crate::item::{Item, ItemId, Layer, PlaybackState};
use crate::media::{MediaBinder, MediaVariant};
use crate::picker::Picker;
use crate::registry::ItemRegistry;
use crate::tween::{CompletionAction, TweenCompletion, TweenProperty, TweenRequest, TweenTimer};

/// Everything a transition is allowed to touch.
pub struct SelectionContext<'a> {
    pub registry: &'a mut ItemRegistry,
    pub picker: &'a mut Picker,
    pub tweens: &'a mut TweenTimer,
    pub binder: &'a mut MediaBinder,
    pub hover: &'a mut dyn HoverFeedback,
    pub now: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackToggle {
    Playing,
    Paused,
}

/// Record of one transition, returned to the caller for logging and UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub item: ItemId,
    pub from: PlaybackState,
    pub to: PlaybackState,
    /// Result of a play/pause toggle on a `FullPlaying` item.
    pub toggled: Option<PlaybackToggle>,
    /// Previously selected item sent back home by this activation.
    pub demoted: Option<ItemId>,
}

impl Transition {
    fn unchanged(item: ItemId, state: PlaybackState) -> Self {
        Self {
            item,
            from: state,
            to: state,
            toggled: None,
            demoted: None,
        }
    }

    /// True when full-length playback started (as opposed to toggling).
    pub fn started_playback(&self) -> bool {
        self.from == PlaybackState::FullLoaded && self.to == PlaybackState::FullPlaying
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerOutcome {
    Activated(Transition),
    Dismissed(Transition),
    /// Miss with nothing selected.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct SelectionController {
    selected: Option<ItemId>,
    hovered: Option<ItemId>,
    focus: FocusConfig,
}

impl SelectionController {
    pub fn new(focus: FocusConfig) -> Self {
        Self {
            selected: None,
            hovered: None,
            focus,
        }
    }

    pub fn selected(&self) -> Option<ItemId> {
        self.selected
    }

    pub fn hovered(&self) -> Option<ItemId> {
        self.hovered
    }

    pub fn pointer_down(
        &mut self,
        hit: Option<ItemId>,
        ctx: &mut SelectionContext<'_>,
    ) -> Result<PointerOutcome, GalleryError> {
        match hit {
            Some(item) => self.activate(item, ctx).map(PointerOutcome::Activated),
            None => Ok(self
                .dismiss(ctx)
                .map_or(PointerOutcome::Ignored, PointerOutcome::Dismissed)),
        }
    }

    /// Update the hovered item. The selected item is never reported as
    /// hovered. Returns true when the hovered item changed.
    pub fn pointer_move(&mut self, hit: Option<ItemId>, feedback: &mut dyn HoverFeedback) -> bool {
        let hit = hit.filter(|item| Some(*item) != self.selected);
        if hit == self.hovered {
            return false;
        }
        let previous = std::mem::replace(&mut self.hovered, hit);
        feedback.hover_changed(previous, hit);
        true
    }

    pub fn activate(
        &mut self,
        item: ItemId,
        ctx: &mut SelectionContext<'_>,
    ) -> Result<Transition, GalleryError> {
        if ctx.registry.get(item).is_none() {
            return Err(GalleryError::UnknownItem(item));
        }

        let mut demoted = None;
        if self.selected != Some(item) {
            if let Some(previous) = self.selected.take() {
                self.send_home(previous, ctx);
                set_focus(previous, false, ctx);
                demoted = Some(previous);
            }
            self.selected = Some(item);
            if self.hovered == Some(item) {
                self.hovered = None;
                ctx.hover.hover_changed(Some(item), None);
            }
            set_focus(item, true, ctx);
            for other in ctx.registry.items_mut() {
                if other.id() != item {
                    other.render.render_order = 0;
                }
            }
            self.center(item, ctx);
        }

        let mut transition = self.advance_playback(item, ctx)?;
        transition.demoted = demoted;
        Ok(transition)
    }

    /// Release the current selection, if any, and put it back on its preview.
    pub fn dismiss(&mut self, ctx: &mut SelectionContext<'_>) -> Option<Transition> {
        let item = self.selected.take()?;
        set_focus(item, false, ctx);
        self.send_home(item, ctx);

        let entry = ctx.registry.get_mut(item)?;
        let from = entry.playback_state;
        let identifier = entry.media_identifier().to_string();
        match ctx
            .binder
            .bind_variant(entry.media.as_mut(), &identifier, MediaVariant::Preview)
        {
            Ok(_) => {
                entry.playback_state = PlaybackState::Initial;
                entry.bound_variant = Some(MediaVariant::Preview);
                entry.media.play();
            }
            Err(err @ MediaError::UnknownIdentifier { .. }) => {
                log::warn!("[gallery] item {item}: {err}; keeping current media");
            }
            Err(err) => {
                log::warn!("[gallery] item {item}: {err}");
                entry.playback_state = PlaybackState::Initial;
                entry.bound_variant = None;
                entry.media.play();
            }
        }
        let to = entry.playback_state;
        log::info!(
            "[gallery] dismissed item {item} ({} -> {})",
            from.label(),
            to.label()
        );

        Some(Transition {
            item,
            from,
            to,
            toggled: None,
            demoted: None,
        })
    }

    /// Handle a finished tween. Only the centering tween carries an action;
    /// it starts full playback if the item is still selected and still
    /// waiting in `FullLoaded`.
    pub fn on_animation_complete(
        &mut self,
        completion: &TweenCompletion,
        ctx: &mut SelectionContext<'_>,
    ) -> Option<Transition> {
        match completion.action? {
            CompletionAction::BeginFullPlayback => {
                if self.selected != Some(completion.item) {
                    return None;
                }
                let entry = ctx.registry.get_mut(completion.item)?;
                if entry.playback_state != PlaybackState::FullLoaded {
                    return None;
                }
                begin_full_playback(entry);
                Some(Transition {
                    item: completion.item,
                    from: PlaybackState::FullLoaded,
                    to: PlaybackState::FullPlaying,
                    toggled: None,
                    demoted: None,
                })
            }
        }
    }

    /// Mark the preview of `item` as producing frames.
    pub fn preview_ready(&mut self, item: ItemId, registry: &mut ItemRegistry) -> bool {
        let Some(entry) = registry.get_mut(item) else {
            return false;
        };
        if entry.playback_state == PlaybackState::Initial
            && entry.bound_variant == Some(MediaVariant::Preview)
        {
            entry.playback_state = PlaybackState::PreviewReady;
            true
        } else {
            false
        }
    }

    fn advance_playback(
        &self,
        item: ItemId,
        ctx: &mut SelectionContext<'_>,
    ) -> Result<Transition, GalleryError> {
        let centering = self.is_centering(item, ctx);
        let entry = ctx
            .registry
            .get_mut(item)
            .ok_or(GalleryError::UnknownItem(item))?;
        let from = entry.playback_state;
        let mut toggled = None;

        let to = match from {
            PlaybackState::Initial | PlaybackState::PreviewReady => {
                let identifier = entry.media_identifier().to_string();
                match ctx
                    .binder
                    .bind_variant(entry.media.as_mut(), &identifier, MediaVariant::Full)
                {
                    Ok(url) => {
                        entry.bound_variant = Some(MediaVariant::Full);
                        log::info!("[gallery] item {item} loaded full stream {url}");
                    }
                    Err(err @ MediaError::UnknownIdentifier { .. }) => {
                        log::warn!("[gallery] item {item}: {err}; staying on preview");
                        return Ok(Transition::unchanged(item, from));
                    }
                    Err(err) => {
                        log::warn!("[gallery] item {item}: {err}");
                        entry.bound_variant = None;
                    }
                }
                PlaybackState::FullLoaded
            }
            PlaybackState::FullLoaded if centering => PlaybackState::FullLoaded,
            PlaybackState::FullLoaded => {
                begin_full_playback(entry);
                PlaybackState::FullPlaying
            }
            PlaybackState::FullPlaying => {
                let media = entry.media.as_mut();
                toggled = Some(if media.paused() {
                    media.play();
                    PlaybackToggle::Playing
                } else {
                    media.pause();
                    PlaybackToggle::Paused
                });
                PlaybackState::FullPlaying
            }
        };
        entry.playback_state = to;

        Ok(Transition {
            item,
            from,
            to,
            toggled,
            demoted: None,
        })
    }

    fn is_centering(&self, item: ItemId, ctx: &SelectionContext<'_>) -> bool {
        let Some(handle) = ctx.registry.get(item).and_then(|entry| entry.animations.position) else {
            return false;
        };
        ctx.tweens
            .request(handle)
            .is_some_and(|request| request.on_complete == Some(CompletionAction::BeginFullPlayback))
    }

    fn center(&self, item: ItemId, ctx: &mut SelectionContext<'_>) {
        let position = TweenRequest::new(item, TweenProperty::Position, Vec3::ZERO, self.focus.duration())
            .easing(self.focus.easing)
            .on_complete(CompletionAction::BeginFullPlayback);
        let scale = TweenRequest::new(
            item,
            TweenProperty::Scale,
            Vec3::splat(self.focus.scale),
            self.focus.duration(),
        )
        .easing(self.focus.easing);
        ctx.registry.animate(ctx.tweens, position, ctx.now);
        ctx.registry.animate(ctx.tweens, scale, ctx.now);
    }

    fn send_home(&self, item: ItemId, ctx: &mut SelectionContext<'_>) {
        let Some(home) = ctx.registry.get(item).map(|entry| entry.home_position()) else {
            return;
        };
        let position = TweenRequest::new(item, TweenProperty::Position, home, self.focus.duration())
            .easing(self.focus.easing);
        let scale = TweenRequest::new(item, TweenProperty::Scale, Vec3::ONE, self.focus.duration())
            .easing(self.focus.easing);
        ctx.registry.animate(ctx.tweens, position, ctx.now);
        ctx.registry.animate(ctx.tweens, scale, ctx.now);
    }
}

/// Move `item` onto (or off) the focused layer, together with the picker and
/// the draw flags that keep a focused item unoccluded.
fn set_focus(item: ItemId, focused: bool, ctx: &mut SelectionContext<'_>) {
    let layer = if focused { Layer::Focused } else { Layer::Interactive };
    if let Some(entry) = ctx.registry.get_mut(item) {
        entry.layer = layer;
        entry.render.depth_test = !focused;
        entry.render.render_order = i32::from(focused);
    }
    ctx.picker.set_active_layer(layer);
}

fn begin_full_playback(entry: &mut Item) {
    entry.media.set_muted(false);
    entry.media.play();
    entry.playback_state = PlaybackState::FullPlaying;
    log::info!("[gallery] item {} playing full stream", entry.id());
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::config::SceneConfig;
    use crate::hover::OutlineHighlight;
    use crate::media::testing::{DirectClient, ElementLog, FakeElement};
    use crate::media::{MediaElement, MediaResolver, MediaSource};

    struct Fixture {
        registry: ItemRegistry,
        picker: Picker,
        tweens: TweenTimer,
        binder: MediaBinder,
        hover: OutlineHighlight,
        logs: Vec<Rc<RefCell<ElementLog>>>,
    }

    impl Fixture {
        fn new(count: usize) -> Self {
            let sources = vec![MediaSource::new("rainy", "loop_rainy.m3u8", "rainy_full.m3u8")];
            let mut binder = MediaBinder::new(MediaResolver::new(sources.clone()), Box::new(DirectClient));
            let mut logs = Vec::new();
            let scene = SceneConfig {
                plane_count: Some(count),
                ..SceneConfig::default()
            };
            let registry = ItemRegistry::create(
                &sources,
                &scene,
                &mut StdRng::seed_from_u64(5),
                |_| {
                    let (element, log) = FakeElement::new(false);
                    logs.push(log);
                    Box::new(element) as Box<dyn MediaElement>
                },
                &mut binder,
            );
            Self {
                registry,
                picker: Picker::new(),
                tweens: TweenTimer::new(),
                binder,
                hover: OutlineHighlight::default(),
                logs,
            }
        }

        fn ctx(&mut self, now_ms: u64) -> SelectionContext<'_> {
            SelectionContext {
                registry: &mut self.registry,
                picker: &mut self.picker,
                tweens: &mut self.tweens,
                binder: &mut self.binder,
                hover: &mut self.hover,
                now: Duration::from_millis(now_ms),
            }
        }

        fn state(&self, item: usize) -> PlaybackState {
            self.registry.get(ItemId(item)).unwrap().playback_state()
        }
    }

    #[test]
    fn first_activation_loads_full_stream_paused() {
        let mut fixture = Fixture::new(2);
        let mut controller = SelectionController::new(FocusConfig::default());
        let transition = controller.activate(ItemId(0), &mut fixture.ctx(0)).unwrap();
        assert_eq!(transition.from, PlaybackState::Initial);
        assert_eq!(transition.to, PlaybackState::FullLoaded);
        assert_eq!(controller.selected(), Some(ItemId(0)));
        assert_eq!(fixture.picker.active_layer(), Layer::Focused);

        let item = fixture.registry.get(ItemId(0)).unwrap();
        assert_eq!(item.layer(), Layer::Focused);
        assert!(!item.render_flags().depth_test);
        assert_eq!(item.render_flags().render_order, 1);
        let log = fixture.logs[0].borrow();
        assert_eq!(log.src.as_deref(), Some("rainy_full.m3u8"));
        assert!(log.paused && log.muted);
        assert_eq!(fixture.tweens.len(), 2);
    }

    #[test]
    fn second_click_waits_for_centering_then_plays() {
        let mut fixture = Fixture::new(1);
        let mut controller = SelectionController::new(FocusConfig::default());
        controller.activate(ItemId(0), &mut fixture.ctx(0)).unwrap();

        let waiting = controller.activate(ItemId(0), &mut fixture.ctx(200)).unwrap();
        assert_eq!(waiting.to, PlaybackState::FullLoaded);
        assert!(fixture.logs[0].borrow().paused);

        let handle = fixture.registry.get(ItemId(0)).unwrap().animations().position.unwrap();
        fixture.tweens.cancel(handle);
        let started = controller.activate(ItemId(0), &mut fixture.ctx(300)).unwrap();
        assert!(started.started_playback());
        let log = fixture.logs[0].borrow();
        assert!(!log.paused && !log.muted);
    }

    #[test]
    fn completion_ignored_once_item_is_no_longer_selected() {
        let mut fixture = Fixture::new(2);
        let mut controller = SelectionController::new(FocusConfig::default());
        controller.activate(ItemId(0), &mut fixture.ctx(0)).unwrap();
        let completion = TweenCompletion {
            handle: fixture.registry.get(ItemId(0)).unwrap().animations().position.unwrap(),
            item: ItemId(0),
            property: TweenProperty::Position,
            action: Some(CompletionAction::BeginFullPlayback),
        };
        controller.dismiss(&mut fixture.ctx(100)).unwrap();
        assert!(controller
            .on_animation_complete(&completion, &mut fixture.ctx(1000))
            .is_none());
        assert_eq!(fixture.state(0), PlaybackState::Initial);
    }

    #[test]
    fn unknown_identifier_leaves_media_untouched() {
        let mut fixture = Fixture::new(1);
        fixture.binder = MediaBinder::new(MediaResolver::default(), Box::new(DirectClient));
        let mut controller = SelectionController::new(FocusConfig::default());
        let transition = controller.activate(ItemId(0), &mut fixture.ctx(0)).unwrap();
        assert_eq!(transition.to, PlaybackState::Initial);
        assert_eq!(fixture.state(0), PlaybackState::Initial);
        let log = fixture.logs[0].borrow();
        assert_eq!(log.src.as_deref(), Some("loop_rainy.m3u8"));
        assert_eq!(log.src_assignments, 1);
        assert!(!log.paused);
    }

    #[test]
    fn dismiss_keeps_state_when_preview_cannot_resolve() {
        let mut fixture = Fixture::new(1);
        let mut controller = SelectionController::new(FocusConfig::default());
        controller.activate(ItemId(0), &mut fixture.ctx(0)).unwrap();
        assert_eq!(fixture.state(0), PlaybackState::FullLoaded);

        fixture.binder = MediaBinder::new(MediaResolver::default(), Box::new(DirectClient));
        let transition = controller.dismiss(&mut fixture.ctx(100)).unwrap();
        assert_eq!(transition.from, PlaybackState::FullLoaded);
        assert_eq!(transition.to, PlaybackState::FullLoaded);
        assert_eq!(controller.selected(), None);

        let item = fixture.registry.get(ItemId(0)).unwrap();
        assert_eq!(item.playback_state(), PlaybackState::FullLoaded);
        assert_eq!(item.bound_variant(), Some(MediaVariant::Full));
        assert_eq!(item.layer(), Layer::Interactive);
        let log = fixture.logs[0].borrow();
        assert_eq!(log.src.as_deref(), Some("rainy_full.m3u8"));
        assert!(log.paused);
    }

    #[test]
    fn selected_item_is_never_hovered() {
        let mut fixture = Fixture::new(2);
        let mut controller = SelectionController::new(FocusConfig::default());
        let mut feedback = OutlineHighlight::default();
        assert!(controller.pointer_move(Some(ItemId(1)), &mut feedback));
        assert_eq!(controller.hovered(), Some(ItemId(1)));

        controller.activate(ItemId(1), &mut fixture.ctx(0)).unwrap();
        assert_eq!(controller.hovered(), None);
        assert!(!controller.pointer_move(Some(ItemId(1)), &mut feedback));
        assert_eq!(controller.hovered(), None);
        assert!(controller.pointer_move(Some(ItemId(0)), &mut feedback));
        assert_eq!(feedback.outlined(), &[ItemId(0)]);
    }

    #[test]
    fn unknown_item_is_an_error() {
        let mut fixture = Fixture::new(1);
        let mut controller = SelectionController::new(FocusConfig::default());
        let err = controller.activate(ItemId(7), &mut fixture.ctx(0)).unwrap_err();
        assert!(matches!(err, GalleryError::UnknownItem(ItemId(7))));
        assert_eq!(controller.selected(), None);
    }
}
