//! Fixed set of items and their pivots, created once at startup.

use std::time::Duration;

use glam::{Mat4, Vec2, Vec3};
use rand::Rng;

use crate::config::SceneConfig;
use crate::item::{Item, ItemId, Pivot};
use crate::media::{MediaBinder, MediaElement, MediaSource, MediaVariant};
use crate::tween::{TweenCompletion, TweenHandle, TweenProperty, TweenRequest, TweenTarget, TweenTimer};

#[derive(Default)]
pub struct ItemRegistry {
    items: Vec<Item>,
    pivots: Vec<Pivot>,
}

impl ItemRegistry {
    /// Build `scene.plane_count` items (one per source when unset), cycling
    /// through `sources` in order. Each item's preview stream is bound and
    /// started before the registry is returned.
    pub fn create<R, F>(
        sources: &[MediaSource],
        scene: &SceneConfig,
        rng: &mut R,
        mut element_factory: F,
        binder: &mut MediaBinder,
    ) -> Self
    where
        R: Rng + ?Sized,
        F: FnMut(&MediaSource) -> Box<dyn MediaElement>,
    {
        let count = if sources.is_empty() {
            if scene.plane_count.is_some_and(|count| count > 0) {
                log::warn!("[gallery] plane_count set but no media sources configured; scene is empty");
            }
            0
        } else {
            scene.plane_count.unwrap_or(sources.len())
        };

        let mut registry = ItemRegistry::default();
        for index in 0..count {
            let source = &sources[index % sources.len()];
            let id = ItemId(index);
            let home = random_home(rng, scene.plane_distance);
            let axis = random_axis(rng);
            let speed = if scene.max_speed > scene.min_speed {
                rng.gen_range(scene.min_speed..=scene.max_speed)
            } else {
                scene.min_speed
            };
            let size = Vec2::new(
                scene.plane_scale * source.orientation().aspect_ratio(),
                scene.plane_scale,
            );

            let mut item = Item::new(id, home, source.identifier.clone(), size, element_factory(source));
            match binder.bind_variant(item.media.as_mut(), &source.identifier, MediaVariant::Preview) {
                Ok(url) => {
                    item.bound_variant = Some(MediaVariant::Preview);
                    log::debug!("[gallery] item {id} bound preview {url}");
                }
                Err(err) => log::warn!("[gallery] item {id}: {err}"),
            }
            item.media.play();

            registry.pivots.push(Pivot::new(id, axis, speed));
            registry.items.push(item);
        }
        registry
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn pivots(&self) -> &[Pivot] {
        &self.pivots
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id.0)
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.items.get_mut(id.0)
    }

    pub fn pivot(&self, id: ItemId) -> Option<&Pivot> {
        self.pivots.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().map(Item::id)
    }

    pub(crate) fn items_mut(&mut self) -> &mut [Item] {
        &mut self.items
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut [Pivot], &mut [Item]) {
        (&mut self.pivots, &mut self.items)
    }

    /// Item-to-world transform: pivot rotation applied to the item's local
    /// transform.
    pub fn world_matrix(&self, id: ItemId) -> Option<Mat4> {
        let item = self.get(id)?;
        let pivot = self.pivot(id)?;
        Some(pivot.matrix() * item.transform.matrix())
    }

    pub fn world_position(&self, id: ItemId) -> Option<Vec3> {
        let item = self.get(id)?;
        let pivot = self.pivot(id)?;
        Some(pivot.rotation * item.transform.position)
    }

    /// Start `request`, cancelling whatever tween currently drives the same
    /// property on the same item.
    pub fn animate(
        &mut self,
        tweens: &mut TweenTimer,
        request: TweenRequest,
        now: Duration,
    ) -> Option<TweenHandle> {
        let from = self.read(request.item, request.property)?;
        let item = self.get_mut(request.item)?;
        let slot = match request.property {
            TweenProperty::Position => &mut item.animations.position,
            TweenProperty::Scale => &mut item.animations.scale,
        };
        if let Some(previous) = slot.take() {
            tweens.cancel(previous);
        }
        let handle = tweens.start(request, from, now);
        *slot = Some(handle);
        Some(handle)
    }

    /// Clear the animation slots of tweens that just finished.
    pub fn release(&mut self, completions: &[TweenCompletion]) {
        for completion in completions {
            let Some(item) = self.get_mut(completion.item) else {
                continue;
            };
            let slot = match completion.property {
                TweenProperty::Position => &mut item.animations.position,
                TweenProperty::Scale => &mut item.animations.scale,
            };
            if *slot == Some(completion.handle) {
                *slot = None;
            }
        }
    }
}

impl TweenTarget for ItemRegistry {
    fn read(&self, item: ItemId, property: TweenProperty) -> Option<Vec3> {
        let item = self.get(item)?;
        Some(match property {
            TweenProperty::Position => item.transform.position,
            TweenProperty::Scale => item.transform.scale,
        })
    }

    fn write(&mut self, item: ItemId, property: TweenProperty, value: Vec3) {
        if let Some(item) = self.get_mut(item) {
            match property {
                TweenProperty::Position => item.transform.position = value,
                TweenProperty::Scale => item.transform.scale = value,
            }
        }
    }
}

fn random_home<R: Rng + ?Sized>(rng: &mut R, side: f32) -> Vec3 {
    Vec3::new(
        (rng.gen::<f32>() - 0.5) * side,
        (rng.gen::<f32>() - 0.5) * side,
        (rng.gen::<f32>() - 0.5) * side,
    )
}

fn random_axis<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let raw = Vec3::new(rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>());
    raw.try_normalize().unwrap_or(Vec3::Y)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::media::testing::{DirectClient, FakeElement};
    use crate::media::MediaResolver;

    fn sources() -> Vec<MediaSource> {
        vec![
            MediaSource::new("rainy", "loop_rainy_landscape.m3u8", "rainy_full.m3u8"),
            MediaSource::new("boy", "loop_boy_portrait.m3u8", "boy_full.m3u8"),
        ]
    }

    fn build(scene: &SceneConfig) -> ItemRegistry {
        let sources = sources();
        let mut binder = MediaBinder::new(MediaResolver::new(sources.clone()), Box::new(DirectClient));
        let mut rng = StdRng::seed_from_u64(11);
        ItemRegistry::create(
            &sources,
            scene,
            &mut rng,
            |_| Box::new(FakeElement::new(false).0) as Box<dyn MediaElement>,
            &mut binder,
        )
    }

    #[test]
    fn items_sit_inside_the_cube_with_bounded_speeds() {
        let scene = SceneConfig {
            plane_count: Some(12),
            ..SceneConfig::default()
        };
        let registry = build(&scene);
        assert_eq!(registry.len(), 12);
        for (item, pivot) in registry.items().iter().zip(registry.pivots()) {
            assert_eq!(pivot.item(), item.id());
            let home = item.home_position();
            assert!(home.abs().max_element() <= scene.plane_distance * 0.5);
            assert!((pivot.rotation_axis().length() - 1.0).abs() < 1e-5);
            assert!(pivot.rotation_speed() >= scene.min_speed);
            assert!(pivot.rotation_speed() <= scene.max_speed);
        }
        // Sources are cycled in order.
        assert_eq!(registry.items()[2].media_identifier(), "rainy");
        assert_eq!(registry.items()[3].media_identifier(), "boy");
    }

    #[test]
    fn previews_are_bound_and_playing_muted() {
        let registry = build(&SceneConfig::default());
        assert_eq!(registry.len(), 2);
        let boy = registry.get(ItemId(1)).unwrap();
        assert_eq!(boy.bound_variant(), Some(MediaVariant::Preview));
        assert_eq!(boy.media().src(), Some("loop_boy_portrait.m3u8"));
        assert!(boy.media().muted());
        assert!(!boy.media().paused());
        assert!((boy.size().x - 9.0 / 16.0).abs() < 1e-6);
        assert_eq!(boy.size().y, 1.0);
    }

    #[test]
    fn new_animation_cancels_previous_on_same_property() {
        let mut registry = build(&SceneConfig::default());
        let mut tweens = TweenTimer::new();
        let id = ItemId(0);
        let ms = Duration::from_millis;
        let first = registry
            .animate(&mut tweens, TweenRequest::new(id, TweenProperty::Position, Vec3::ZERO, ms(1000)), ms(0))
            .unwrap();
        let scale = registry
            .animate(&mut tweens, TweenRequest::new(id, TweenProperty::Scale, Vec3::splat(3.0), ms(1000)), ms(0))
            .unwrap();
        let second = registry
            .animate(&mut tweens, TweenRequest::new(id, TweenProperty::Position, Vec3::X, ms(1000)), ms(10))
            .unwrap();
        assert!(!tweens.is_active(first));
        assert!(tweens.is_active(second));
        assert!(tweens.is_active(scale));
        assert_eq!(registry.get(id).unwrap().animations().position, Some(second));
    }

    #[test]
    fn empty_sources_produce_empty_registry() {
        let mut binder = MediaBinder::new(MediaResolver::default(), Box::new(DirectClient));
        let mut rng = StdRng::seed_from_u64(1);
        let scene = SceneConfig {
            plane_count: Some(4),
            ..SceneConfig::default()
        };
        let registry = ItemRegistry::create(
            &[],
            &scene,
            &mut rng,
            |_| Box::new(FakeElement::new(false).0) as Box<dyn MediaElement>,
            &mut binder,
        );
        assert!(registry.is_empty());
        assert!(registry.world_matrix(ItemId(0)).is_none());
    }
}
