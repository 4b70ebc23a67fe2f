use thiserror::Error;

use crate::item::ItemId;
use crate::media::MediaVariant;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("item {0} is not registered")]
    UnknownItem(ItemId),
    #[error(transparent)]
    Media(#[from] MediaError),
}

/// Failures raised while resolving or attaching media. None of these are
/// fatal to the interaction loop; callers log them and keep going.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaError {
    #[error("no {variant} source configured for media identifier '{identifier}'")]
    UnknownIdentifier {
        identifier: String,
        variant: MediaVariant,
    },
    #[error("neither the streaming client nor native playback can handle '{url}'")]
    StreamingUnsupported { url: String },
    #[error("failed to attach '{url}': {reason}")]
    Attach { url: String, reason: String },
}
