//! Time-based interpolation of item transforms.
//!
//! Requests are fire-and-forget: `TweenTimer::start` captures the current
//! value, and `update` (called exactly once per frame) writes interpolated
//! values through a [`TweenTarget`] and reports finished tweens together with
//! their completion action. Cancelled tweens disappear silently; their
//! completion action never fires.

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::item::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenHandle(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    QuadraticInOut,
    ExponentialIn,
    ExponentialOut,
    #[default]
    ExponentialInOut,
}

impl Easing {
    /// Map linear progress `k` in `[0, 1]` onto the curve.
    pub fn apply(self, k: f32) -> f32 {
        let k = k.clamp(0.0, 1.0);
        match self {
            Easing::Linear => k,
            Easing::QuadraticInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k * k
                } else {
                    let k = k - 1.0;
                    -0.5 * (k * (k - 2.0) - 1.0)
                }
            }
            Easing::ExponentialIn => {
                if k == 0.0 {
                    0.0
                } else {
                    1024f32.powf(k - 1.0)
                }
            }
            Easing::ExponentialOut => {
                if k == 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * k)
                }
            }
            Easing::ExponentialInOut => {
                if k == 0.0 {
                    return 0.0;
                }
                if k == 1.0 {
                    return 1.0;
                }
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * 1024f32.powf(k - 1.0)
                } else {
                    0.5 * (-(2f32.powf(-10.0 * (k - 1.0))) + 2.0)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TweenProperty {
    Position,
    Scale,
}

/// Follow-up work to run when a tween reaches its end value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionAction {
    /// Unmute and start the full-length stream of the tweened item.
    BeginFullPlayback,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenRequest {
    pub item: ItemId,
    pub property: TweenProperty,
    pub to: Vec3,
    pub duration: Duration,
    pub easing: Easing,
    pub on_complete: Option<CompletionAction>,
}

impl TweenRequest {
    pub fn new(item: ItemId, property: TweenProperty, to: Vec3, duration: Duration) -> Self {
        Self {
            item,
            property,
            to,
            duration,
            easing: Easing::Linear,
            on_complete: None,
        }
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn on_complete(mut self, action: CompletionAction) -> Self {
        self.on_complete = Some(action);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenCompletion {
    pub handle: TweenHandle,
    pub item: ItemId,
    pub property: TweenProperty,
    pub action: Option<CompletionAction>,
}

/// Something whose properties tweens can read and write.
pub trait TweenTarget {
    fn read(&self, item: ItemId, property: TweenProperty) -> Option<Vec3>;
    fn write(&mut self, item: ItemId, property: TweenProperty, value: Vec3);
}

#[derive(Debug, Clone)]
struct ActiveTween {
    handle: TweenHandle,
    request: TweenRequest,
    from: Vec3,
    started_at: Duration,
}

impl ActiveTween {
    fn progress(&self, now: Duration) -> f32 {
        if self.request.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        (elapsed.as_secs_f64() / self.request.duration.as_secs_f64()).min(1.0) as f32
    }
}

#[derive(Debug, Default)]
pub struct TweenTimer {
    next_handle: u64,
    active: Vec<ActiveTween>,
}

impl TweenTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, request: TweenRequest, from: Vec3, now: Duration) -> TweenHandle {
        let handle = TweenHandle(self.next_handle);
        self.next_handle += 1;
        self.active.push(ActiveTween {
            handle,
            request,
            from,
            started_at: now,
        });
        handle
    }

    pub fn cancel(&mut self, handle: TweenHandle) -> bool {
        let before = self.active.len();
        self.active.retain(|tween| tween.handle != handle);
        before != self.active.len()
    }

    pub fn is_active(&self, handle: TweenHandle) -> bool {
        self.active.iter().any(|tween| tween.handle == handle)
    }

    pub fn request(&self, handle: TweenHandle) -> Option<&TweenRequest> {
        self.active
            .iter()
            .find(|tween| tween.handle == handle)
            .map(|tween| &tween.request)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Advance every in-flight tween to `now`, in start order.
    pub fn update(&mut self, now: Duration, target: &mut dyn TweenTarget) -> Vec<TweenCompletion> {
        let mut completions = Vec::new();
        self.active.retain(|tween| {
            let k = tween.progress(now);
            let value = if k >= 1.0 {
                tween.request.to
            } else {
                tween.from.lerp(tween.request.to, tween.request.easing.apply(k))
            };
            target.write(tween.request.item, tween.request.property, value);
            if k >= 1.0 {
                completions.push(TweenCompletion {
                    handle: tween.handle,
                    item: tween.request.item,
                    property: tween.request.property,
                    action: tween.request.on_complete,
                });
                false
            } else {
                true
            }
        });
        completions
    }
}
