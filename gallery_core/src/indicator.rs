//! Transient play/pause icon shown over the focused item.

use std::time::Duration;

use serde::Serialize;

use crate::config::IndicatorConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IndicatorIcon {
    Play,
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorFrame {
    pub icon: IndicatorIcon,
    pub opacity: f32,
}

#[derive(Debug, Clone)]
pub struct PlaybackIndicator {
    enabled: bool,
    fade: Duration,
    shown: Option<(IndicatorIcon, Duration)>,
}

impl PlaybackIndicator {
    pub fn new(config: &IndicatorConfig) -> Self {
        Self {
            enabled: config.enabled,
            fade: Duration::from_millis(config.fade_ms),
            shown: None,
        }
    }

    pub fn show(&mut self, icon: IndicatorIcon, now: Duration) {
        if self.enabled {
            self.shown = Some((icon, now));
        }
    }

    pub fn hide(&mut self) {
        self.shown = None;
    }

    /// Opacity falls linearly from 1 to 0 over the fade window.
    pub fn opacity(&self, now: Duration) -> f32 {
        let Some((_, shown_at)) = self.shown else {
            return 0.0;
        };
        if self.fade.is_zero() {
            return 0.0;
        }
        let elapsed = now.saturating_sub(shown_at).as_secs_f32();
        (1.0 - elapsed / self.fade.as_secs_f32()).clamp(0.0, 1.0)
    }

    pub fn frame(&self, now: Duration) -> Option<IndicatorFrame> {
        let (icon, _) = self.shown?;
        let opacity = self.opacity(now);
        (opacity > 0.0).then_some(IndicatorFrame { icon, opacity })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fades_out_over_configured_window() {
        let mut indicator = PlaybackIndicator::new(&IndicatorConfig {
            enabled: true,
            fade_ms: 1000,
        });
        assert!(indicator.frame(Duration::ZERO).is_none());
        indicator.show(IndicatorIcon::Pause, Duration::from_millis(200));
        let half = indicator.frame(Duration::from_millis(700)).expect("visible");
        assert_eq!(half.icon, IndicatorIcon::Pause);
        assert!((half.opacity - 0.5).abs() < 1e-4);
        assert!(indicator.frame(Duration::from_millis(1200)).is_none());
    }

    #[test]
    fn disabled_indicator_stays_hidden() {
        let mut indicator = PlaybackIndicator::new(&IndicatorConfig {
            enabled: false,
            fade_ms: 1000,
        });
        indicator.show(IndicatorIcon::Play, Duration::ZERO);
        assert_eq!(indicator.opacity(Duration::ZERO), 0.0);
    }
}
