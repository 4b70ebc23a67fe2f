//! Media source lookup and binding.
//!
//! Every item carries a logical media identifier that maps to a looping
//! preview stream and a full-length stream. `MediaResolver` performs the pure
//! lookup, `MediaBinder` attaches a resolved URL to an item's media element
//! through the streaming client (or native playback as a fallback) and always
//! leaves the element paused and muted; playback only ever starts from an
//! explicit selection side effect.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::MediaError;

/// MIME type reported for HLS-style playlists.
pub const PLAYLIST_MIME: &str = "application/vnd.apple.mpegurl";
/// MIME type reported for Ogg/Theora movies.
pub const OGG_VIDEO_MIME: &str = "video/ogg";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaVariant {
    Preview,
    Full,
}

impl fmt::Display for MediaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaVariant::Preview => f.write_str("preview"),
            MediaVariant::Full => f.write_str("full"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    /// Preview URLs tag portrait footage with a `_portrait` suffix; everything
    /// else is treated as landscape.
    pub fn from_url(url: &str) -> Self {
        if url.contains("_portrait") {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }

    /// Width over height of the plane that displays this footage.
    pub fn aspect_ratio(self) -> f32 {
        match self {
            Orientation::Landscape => 16.0 / 9.0,
            Orientation::Portrait => 9.0 / 16.0,
        }
    }
}

/// One subject's preview/full stream pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSource {
    pub identifier: String,
    pub preview: String,
    pub full: String,
    #[serde(default)]
    pub orientation: Option<Orientation>,
}

impl MediaSource {
    pub fn new(
        identifier: impl Into<String>,
        preview: impl Into<String>,
        full: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            preview: preview.into(),
            full: full.into(),
            orientation: None,
        }
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
            .unwrap_or_else(|| Orientation::from_url(&self.preview))
    }

    pub fn url(&self, variant: MediaVariant) -> &str {
        match variant {
            MediaVariant::Preview => &self.preview,
            MediaVariant::Full => &self.full,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossOrigin {
    Anonymous,
    UseCredentials,
}

/// A decoded RGBA frame borrowed from a media element.
#[derive(Debug, Clone, Copy)]
pub struct VideoFrame<'a> {
    pub width: u32,
    pub height: u32,
    pub rgba: &'a [u8],
    /// Monotonic counter that changes whenever the pixels change.
    pub sequence: u64,
}

/// Playback surface exclusively owned by one item.
pub trait MediaElement {
    fn can_play_type(&self, mime: &str) -> bool;
    fn set_src(&mut self, url: &str);
    fn src(&self) -> Option<&str>;
    fn set_cross_origin(&mut self, mode: CrossOrigin);
    fn set_loop(&mut self, looping: bool);
    fn set_muted(&mut self, muted: bool);
    fn muted(&self) -> bool;
    fn play(&mut self);
    fn pause(&mut self);
    fn paused(&self) -> bool;

    /// Advance the element's clock to `now` and hand back the frame to show,
    /// if one has been decoded.
    fn current_frame(&mut self, _now: Duration) -> Option<VideoFrame<'_>> {
        None
    }
}

/// Adaptive streaming client that turns a playlist URL into playable media.
pub trait StreamingClient {
    fn is_supported(&self) -> bool;
    fn attach(&mut self, url: &str, element: &mut dyn MediaElement) -> Result<(), MediaError>;
}

/// Client used when no adaptive streaming support is available at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedStreaming;

impl StreamingClient for UnsupportedStreaming {
    fn is_supported(&self) -> bool {
        false
    }

    fn attach(&mut self, url: &str, _element: &mut dyn MediaElement) -> Result<(), MediaError> {
        Err(MediaError::StreamingUnsupported {
            url: url.to_string(),
        })
    }
}

pub fn mime_for_url(url: &str) -> &'static str {
    let lower = url.to_ascii_lowercase();
    if lower.ends_with(".ogv") || lower.ends_with(".ogg") {
        OGG_VIDEO_MIME
    } else {
        PLAYLIST_MIME
    }
}

#[derive(Debug, Default, Clone)]
pub struct MediaResolver {
    sources: BTreeMap<String, MediaSource>,
}

impl MediaResolver {
    pub fn new<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = MediaSource>,
    {
        let mut resolver = MediaResolver::default();
        for source in sources {
            if let Some(previous) = resolver.sources.insert(source.identifier.clone(), source) {
                log::warn!(
                    "[gallery] duplicate media identifier '{}', keeping the later entry",
                    previous.identifier
                );
            }
        }
        resolver
    }

    pub fn resolve(&self, identifier: &str, variant: MediaVariant) -> Result<String, MediaError> {
        self.sources
            .get(identifier)
            .map(|source| source.url(variant).to_string())
            .ok_or_else(|| MediaError::UnknownIdentifier {
                identifier: identifier.to_string(),
                variant,
            })
    }

    pub fn source(&self, identifier: &str) -> Option<&MediaSource> {
        self.sources.get(identifier)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

/// Resolver plus streaming client; the only path through which items get
/// their media attached.
pub struct MediaBinder {
    resolver: MediaResolver,
    client: Box<dyn StreamingClient>,
}

impl MediaBinder {
    pub fn new(resolver: MediaResolver, client: Box<dyn StreamingClient>) -> Self {
        Self { resolver, client }
    }

    pub fn resolver(&self) -> &MediaResolver {
        &self.resolver
    }

    /// Attach `url` to `element`. Regardless of the outcome the element is
    /// left anonymous-CORS, looping, muted and paused.
    pub fn bind(&mut self, element: &mut dyn MediaElement, url: &str) -> Result<(), MediaError> {
        let attached = if self.client.is_supported() {
            self.client.attach(url, element)
        } else if element.can_play_type(mime_for_url(url)) {
            element.set_src(url);
            Ok(())
        } else {
            Err(MediaError::StreamingUnsupported {
                url: url.to_string(),
            })
        };

        element.set_cross_origin(CrossOrigin::Anonymous);
        element.set_loop(true);
        element.set_muted(true);
        element.pause();
        attached
    }

    /// Resolve `identifier` for `variant` and bind it. Unknown identifiers
    /// fail before the element is touched.
    pub fn bind_variant(
        &mut self,
        element: &mut dyn MediaElement,
        identifier: &str,
        variant: MediaVariant,
    ) -> Result<String, MediaError> {
        let url = self.resolver.resolve(identifier, variant)?;
        self.bind(element, &url)?;
        Ok(url)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{DirectClient, FakeElement};
    use super::*;

    fn resolver() -> MediaResolver {
        MediaResolver::new([
            MediaSource::new("rainy", "loops/loop_rainy_landscape.m3u8", "full/rainy_full.m3u8"),
            MediaSource::new("boy", "loops/loop_boy_portrait.m3u8", "full/boy_full.m3u8"),
        ])
    }

    #[test]
    fn resolves_both_variants() {
        let resolver = resolver();
        assert_eq!(
            resolver.resolve("rainy", MediaVariant::Full).unwrap(),
            "full/rainy_full.m3u8"
        );
        assert_eq!(
            resolver.resolve("boy", MediaVariant::Preview).unwrap(),
            "loops/loop_boy_portrait.m3u8"
        );
    }

    #[test]
    fn unknown_identifier_is_reported() {
        let err = resolver()
            .resolve("awui", MediaVariant::Full)
            .expect_err("awui is not configured");
        assert_eq!(
            err,
            MediaError::UnknownIdentifier {
                identifier: "awui".to_string(),
                variant: MediaVariant::Full,
            }
        );
    }

    #[test]
    fn orientation_follows_preview_suffix() {
        let resolver = resolver();
        let boy = resolver.source("boy").unwrap();
        assert_eq!(boy.orientation(), Orientation::Portrait);
        assert!((boy.orientation().aspect_ratio() - 9.0 / 16.0).abs() < f32::EPSILON);
        assert_eq!(
            resolver.source("rainy").unwrap().orientation(),
            Orientation::Landscape
        );
    }

    #[test]
    fn bind_leaves_element_paused_and_muted() {
        let mut binder = MediaBinder::new(resolver(), Box::new(DirectClient));
        let (mut element, log) = FakeElement::new(false);
        element.play();
        binder
            .bind(&mut element, "loops/loop_rainy_landscape.m3u8")
            .unwrap();
        let log = log.borrow();
        assert!(log.paused);
        assert!(log.muted);
        assert!(log.looping);
        assert_eq!(log.cross_origin, Some(CrossOrigin::Anonymous));
        assert_eq!(log.src.as_deref(), Some("loops/loop_rainy_landscape.m3u8"));
    }

    #[test]
    fn native_fallback_assigns_src_directly() {
        let mut binder = MediaBinder::new(resolver(), Box::new(UnsupportedStreaming));
        let (mut element, log) = FakeElement::new(true);
        binder
            .bind_variant(&mut element, "boy", MediaVariant::Full)
            .unwrap();
        assert_eq!(log.borrow().src.as_deref(), Some("full/boy_full.m3u8"));
    }

    #[test]
    fn unsupported_streaming_still_configures_element() {
        let mut binder = MediaBinder::new(resolver(), Box::new(UnsupportedStreaming));
        let (mut element, log) = FakeElement::new(false);
        let err = binder
            .bind_variant(&mut element, "rainy", MediaVariant::Preview)
            .expect_err("no playback path available");
        assert!(matches!(err, MediaError::StreamingUnsupported { .. }));
        let log = log.borrow();
        assert!(log.src.is_none());
        assert!(log.muted && log.paused && log.looping);
    }

    #[test]
    fn unknown_identifier_leaves_element_untouched() {
        let mut binder = MediaBinder::new(resolver(), Box::new(DirectClient));
        let (mut element, log) = FakeElement::new(true);
        element.play();
        assert!(binder
            .bind_variant(&mut element, "missing", MediaVariant::Full)
            .is_err());
        let log = log.borrow();
        assert!(!log.paused);
        assert_eq!(log.src_assignments, 0);
    }

    #[test]
    fn mime_detection_prefers_playlist() {
        assert_eq!(mime_for_url("a/b/clip.OGV"), OGG_VIDEO_MIME);
        assert_eq!(mime_for_url("a/b/clip.m3u8"), PLAYLIST_MIME);
    }
}
