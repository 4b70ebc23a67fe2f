mod catalog;
mod playback;
mod yuv;

use std::path::Path;
use std::time::Duration;

use gallery_core::media::{CrossOrigin, OGG_VIDEO_MIME};
use gallery_core::{MediaElement, VideoFrame};

pub use catalog::{CatalogStats, MediaCatalog};
pub use playback::OgvPlayback;

/// `MediaElement` backed by a local Ogg/Theora file.
///
/// The element keeps its own media clock: it only advances between
/// `current_frame` calls while the element is playing, so pausing freezes the
/// picture and resuming continues where it stopped. The file is opened lazily
/// on the first frame request after a new source is assigned.
pub struct VideoElement {
    src: Option<String>,
    playback: Option<OgvPlayback>,
    open_failed: bool,
    cross_origin: Option<CrossOrigin>,
    looping: bool,
    muted: bool,
    paused: bool,
    position: Duration,
    last_tick: Option<Duration>,
}

impl VideoElement {
    pub fn new() -> Self {
        Self {
            src: None,
            playback: None,
            open_failed: false,
            cross_origin: None,
            looping: false,
            muted: true,
            paused: true,
            position: Duration::ZERO,
            last_tick: None,
        }
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    fn tick(&mut self, now: Duration) {
        let elapsed = self
            .last_tick
            .map_or(Duration::ZERO, |last| now.saturating_sub(last));
        self.last_tick = Some(now);
        if !self.paused {
            self.position += elapsed;
        }
    }

    fn ensure_open(&mut self) -> Option<&mut OgvPlayback> {
        if self.playback.is_none() && !self.open_failed {
            let src = self.src.as_deref()?;
            log::debug!(
                "[gallery_viewer] opening {src} (loop: {}, cross-origin: {:?})",
                self.looping,
                self.cross_origin
            );
            match OgvPlayback::open(Path::new(src)) {
                Ok(playback) => self.playback = Some(playback),
                Err(err) => {
                    log::warn!("[gallery_viewer] {err:#}");
                    self.open_failed = true;
                }
            }
        }
        self.playback.as_mut()
    }
}

impl Default for VideoElement {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaElement for VideoElement {
    fn can_play_type(&self, mime: &str) -> bool {
        mime == OGG_VIDEO_MIME
    }

    fn set_src(&mut self, url: &str) {
        self.src = Some(url.to_string());
        self.playback = None;
        self.open_failed = false;
        self.position = Duration::ZERO;
    }

    fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    fn set_cross_origin(&mut self, mode: CrossOrigin) {
        self.cross_origin = Some(mode);
    }

    fn set_loop(&mut self, looping: bool) {
        self.looping = looping;
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn muted(&self) -> bool {
        self.muted
    }

    fn play(&mut self) {
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn paused(&self) -> bool {
        self.paused
    }

    fn current_frame(&mut self, now: Duration) -> Option<VideoFrame<'_>> {
        self.tick(now);
        let position = self.position;
        let looping = self.looping;
        let playback = self.ensure_open()?;
        if let Err(err) = playback.seek_forward(position, looping) {
            log::warn!("[gallery_viewer] {err:#}");
            self.playback = None;
            self.open_failed = true;
            return None;
        }

        let playback = self.playback.as_ref()?;
        if playback.frames_decoded() == 0 {
            return None;
        }
        Some(VideoFrame {
            width: playback.width(),
            height: playback.height(),
            rgba: playback.rgba(),
            sequence: playback.frames_decoded(),
        })
    }
}
