use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use gallery_core::MediaSource;
use walkdir::WalkDir;

const PREVIEW_PREFIX: &str = "loop_";
const FULL_SUFFIX: &str = "_full";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Container {
    Ogv,
    Playlist,
}

impl Container {
    fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?;
        if ext.eq_ignore_ascii_case("m3u8") {
            Some(Container::Playlist)
        } else if ext.eq_ignore_ascii_case("ogv") {
            Some(Container::Ogv)
        } else {
            None
        }
    }
}

#[derive(Debug, Default, Clone)]
struct Pair {
    preview: Option<(Container, PathBuf)>,
    full: Option<(Container, PathBuf)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    pub paired: usize,
    pub preview_only: usize,
    pub full_only: usize,
}

/// Media sources discovered on disk. A subject is usable once both its
/// `loop_<subject>[_portrait]` preview and `<subject>_full` stream exist;
/// playlists win over bare `.ogv` files when both are present.
#[derive(Debug, Default, Clone)]
pub struct MediaCatalog {
    index: BTreeMap<String, Pair>,
}

impl MediaCatalog {
    pub fn from_roots<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut catalog = MediaCatalog::default();
        for root in roots {
            catalog.extend_from_root(root.as_ref());
        }
        catalog
    }

    pub fn extend_from_root(&mut self, root: &Path) {
        if !root.exists() {
            log::warn!("[gallery_viewer] media root {} does not exist", root.display());
            return;
        }
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!(
                        "[gallery_viewer] failed to traverse {}: {err}",
                        root.display()
                    );
                    continue;
                }
            };
            if entry.file_type().is_file() {
                self.insert(entry.path());
            }
        }
    }

    fn insert(&mut self, path: &Path) {
        let Some(container) = Container::from_path(path) else {
            return;
        };
        let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) else {
            return;
        };

        let (subject, slot) = if let Some(rest) = stem.strip_prefix(PREVIEW_PREFIX) {
            let subject = rest
                .strip_suffix("_portrait")
                .or_else(|| rest.strip_suffix("_landscape"))
                .unwrap_or(rest);
            (subject, &mut self.index.entry(subject.to_string()).or_default().preview)
        } else if let Some(subject) = stem.strip_suffix(FULL_SUFFIX) {
            (subject, &mut self.index.entry(subject.to_string()).or_default().full)
        } else {
            return;
        };

        if matches!(slot, Some((existing, _)) if *existing >= container) {
            log::debug!(
                "[gallery_viewer] '{subject}' already has a stream, skipping {}",
                path.display()
            );
        } else {
            *slot = Some((container, path.to_path_buf()));
        }
    }

    /// Paired subjects, ordered by identifier.
    pub fn sources(&self) -> Vec<MediaSource> {
        self.index
            .iter()
            .filter_map(|(subject, pair)| {
                let (_, preview) = pair.preview.as_ref()?;
                let (_, full) = pair.full.as_ref()?;
                Some(MediaSource::new(
                    subject.clone(),
                    preview.to_string_lossy(),
                    full.to_string_lossy(),
                ))
            })
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats {
            paired: 0,
            preview_only: 0,
            full_only: 0,
        };
        for pair in self.index.values() {
            match (pair.preview.is_some(), pair.full.is_some()) {
                (true, true) => stats.paired += 1,
                (true, false) => stats.preview_only += 1,
                (false, true) => stats.full_only += 1,
                (false, false) => {}
            }
        }
        stats
    }
}
