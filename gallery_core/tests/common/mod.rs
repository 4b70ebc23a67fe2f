#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use gallery_core::media::CrossOrigin;
use gallery_core::{
    Gallery, GalleryConfig, ItemId, MediaElement, MediaError, MediaSource, PointerEvent,
    StreamingClient, VideoFrame, Viewport,
};

#[derive(Debug, Default)]
pub struct Probe {
    pub src: Option<String>,
    pub muted: bool,
    pub paused: bool,
    pub looping: bool,
    pub src_history: Vec<String>,
    pub play_calls: usize,
}

pub type Probes = Rc<RefCell<Vec<Rc<RefCell<Probe>>>>>;

/// In-memory media element that records what the gallery did to it and
/// reports a frame once it has a source and is playing.
pub struct ProbeElement {
    probe: Rc<RefCell<Probe>>,
    src: Option<String>,
    pixels: Vec<u8>,
    frames: u64,
}

impl MediaElement for ProbeElement {
    fn can_play_type(&self, _mime: &str) -> bool {
        false
    }

    fn set_src(&mut self, url: &str) {
        self.src = Some(url.to_string());
        let mut probe = self.probe.borrow_mut();
        probe.src = Some(url.to_string());
        probe.src_history.push(url.to_string());
    }

    fn src(&self) -> Option<&str> {
        self.src.as_deref()
    }

    fn set_cross_origin(&mut self, _mode: CrossOrigin) {}

    fn set_loop(&mut self, looping: bool) {
        self.probe.borrow_mut().looping = looping;
    }

    fn set_muted(&mut self, muted: bool) {
        self.probe.borrow_mut().muted = muted;
    }

    fn muted(&self) -> bool {
        self.probe.borrow().muted
    }

    fn play(&mut self) {
        let mut probe = self.probe.borrow_mut();
        probe.paused = false;
        probe.play_calls += 1;
    }

    fn pause(&mut self) {
        self.probe.borrow_mut().paused = true;
    }

    fn paused(&self) -> bool {
        self.probe.borrow().paused
    }

    fn current_frame(&mut self, _now: Duration) -> Option<VideoFrame<'_>> {
        if self.src.is_none() || self.paused() {
            return None;
        }
        self.frames += 1;
        Some(VideoFrame {
            width: 2,
            height: 2,
            rgba: &self.pixels,
            sequence: self.frames,
        })
    }
}

pub struct PassthroughClient;

impl StreamingClient for PassthroughClient {
    fn is_supported(&self) -> bool {
        true
    }

    fn attach(&mut self, url: &str, element: &mut dyn MediaElement) -> Result<(), MediaError> {
        element.set_src(url);
        Ok(())
    }
}

pub fn sources() -> Vec<MediaSource> {
    vec![
        MediaSource::new("rainy", "loops/loop_rainy_landscape.m3u8", "full/rainy_full.m3u8"),
        MediaSource::new("boy", "loops/loop_boy_portrait.m3u8", "full/boy_full.m3u8"),
        MediaSource::new("ocean", "loops/loop_ocean.m3u8", "full/ocean_full.m3u8"),
    ]
}

pub fn config(sources: Vec<MediaSource>) -> GalleryConfig {
    let mut config = GalleryConfig::default();
    config.scene.seed = Some(42);
    config.media = sources;
    config
}

pub fn viewport() -> Viewport {
    Viewport::new(1200.0, 600.0)
}

pub fn gallery(config: GalleryConfig) -> (Gallery, Probes) {
    let probes: Probes = Rc::default();
    let sink = probes.clone();
    let gallery = Gallery::new(config, viewport(), Box::new(PassthroughClient), move |_| {
        let probe = Rc::new(RefCell::new(Probe {
            paused: true,
            ..Probe::default()
        }));
        sink.borrow_mut().push(probe.clone());
        Box::new(ProbeElement {
            probe,
            src: None,
            pixels: vec![0; 16],
            frames: 0,
        }) as Box<dyn MediaElement>
    });
    (gallery, probes)
}

pub fn probe(probes: &Probes, item: ItemId) -> Rc<RefCell<Probe>> {
    probes.borrow()[item.0].clone()
}

pub fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// Client-pixel pointer over the world-space centre of `item`.
pub fn pointer_over(gallery: &Gallery, item: ItemId) -> PointerEvent {
    let world = gallery
        .registry()
        .world_position(item)
        .expect("item is registered");
    let ndc = gallery.camera().project(world).expect("item projects");
    let viewport = gallery.camera().viewport();
    PointerEvent::new(
        (ndc.x + 1.0) * 0.5 * viewport.width,
        (1.0 - ndc.y) * 0.5 * viewport.height,
    )
}

/// A pointer position no item covers (items live within a few units of the
/// origin; the viewport spans x in [-5, 5]).
pub fn empty_space() -> PointerEvent {
    PointerEvent::new(2.0, 2.0)
}

/// Element whose probe nobody keeps.
pub fn silent_element() -> ProbeElement {
    ProbeElement {
        probe: Rc::new(RefCell::new(Probe {
            paused: true,
            ..Probe::default()
        })),
        src: None,
        pixels: vec![0; 16],
        frames: 0,
    }
}
