//! Scene model and interaction core for the orbiting video gallery.
//!
//! Everything here is windowing- and GPU-agnostic: the viewer feeds pointer,
//! resize and frame events into [`Gallery`] and draws the [`FrameSnapshot`]
//! it gets back.

pub mod camera;
pub mod config;
pub mod driver;
pub mod error;
pub mod gallery;
pub mod hover;
pub mod indicator;
pub mod item;
pub mod media;
pub mod picker;
pub mod registry;
pub mod selection;
pub mod tween;

pub use camera::{Camera, Viewport};
pub use config::{GalleryConfig, load_gallery_config};
pub use driver::{DrawItem, FrameSnapshot};
pub use error::{GalleryError, MediaError};
pub use gallery::{Gallery, LayoutSummary};
pub use hover::{HoverFeedback, HoverFeedbackKind, HoverStyle};
pub use indicator::{IndicatorFrame, IndicatorIcon};
pub use item::{Item, ItemId, Layer, PlaybackState};
pub use media::{MediaElement, MediaSource, MediaVariant, StreamingClient, VideoFrame};
pub use picker::{Picker, PointerEvent};
pub use registry::ItemRegistry;
pub use selection::{PlaybackToggle, PointerOutcome, SelectionController, Transition};
pub use tween::{Easing, TweenTimer};
