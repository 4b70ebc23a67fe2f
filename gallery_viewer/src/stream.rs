use std::fs;
use std::path::{Path, PathBuf};

use gallery_core::{MediaElement, MediaError, StreamingClient};
use thiserror::Error;

/// Master playlists may point at variant playlists; follow at most this many.
const MAX_PLAYLIST_DEPTH: usize = 4;

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("reading playlist {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("playlist {} lists no media", .0.display())]
    Empty(PathBuf),
    #[error("playlist {} nests deeper than {} levels", .0.display(), MAX_PLAYLIST_DEPTH)]
    TooDeep(PathBuf),
    #[error("remote media '{0}' is not supported, only local files")]
    Remote(String),
}

/// Streaming client for local `.m3u8` playlists.
///
/// The first media URI in the playlist is resolved relative to the playlist
/// file and handed to the element as its source. Bare `.ogv` URLs pass
/// straight through.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaylistClient;

impl StreamingClient for PlaylistClient {
    fn is_supported(&self) -> bool {
        true
    }

    fn attach(&mut self, url: &str, element: &mut dyn MediaElement) -> Result<(), MediaError> {
        let media = resolve_media(url).map_err(|err| MediaError::Attach {
            url: url.to_string(),
            reason: err.to_string(),
        })?;
        element.set_src(&media.to_string_lossy());
        Ok(())
    }
}

/// Follow `url` through any playlists down to a playable media file.
pub fn resolve_media(url: &str) -> Result<PathBuf, PlaylistError> {
    if is_remote(url) {
        return Err(PlaylistError::Remote(url.to_string()));
    }
    let mut current = PathBuf::from(url);
    for _ in 0..MAX_PLAYLIST_DEPTH {
        if !is_playlist(&current) {
            return Ok(current);
        }
        let entry = first_entry(&current)?;
        if is_remote(&entry) {
            return Err(PlaylistError::Remote(entry));
        }
        current = match current.parent() {
            Some(dir) => dir.join(&entry),
            None => PathBuf::from(&entry),
        };
    }
    if is_playlist(&current) {
        return Err(PlaylistError::TooDeep(PathBuf::from(url)));
    }
    Ok(current)
}

fn first_entry(path: &Path) -> Result<String, PlaylistError> {
    let text = fs::read_to_string(path).map_err(|source| PlaylistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .ok_or_else(|| PlaylistError::Empty(path.to_path_buf()))
}

fn is_playlist(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("m3u8"))
}

fn is_remote(url: &str) -> bool {
    url.contains("://")
}
