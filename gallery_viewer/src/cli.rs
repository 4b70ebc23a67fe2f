use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use gallery_core::{GalleryConfig, HoverFeedbackKind, load_gallery_config};

use crate::movie::MediaCatalog;

#[derive(Parser, Debug)]
#[command(about = "Orbiting video gallery: click a plane to bring it forward and play it", version)]
pub struct Args {
    /// Gallery config JSON (scene, camera, focus, hover, indicator, media)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory to scan for `loop_<subject>` / `<subject>_full` streams;
    /// may be repeated
    #[arg(long = "media-root")]
    pub media_roots: Vec<PathBuf>,

    /// Seed for plane placement and spin speeds
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of planes to create (defaults to one per media source)
    #[arg(long)]
    pub planes: Option<usize>,

    /// Hover feedback strategy
    #[arg(long, value_enum)]
    pub hover_feedback: Option<HoverArg>,

    /// Initial window size in logical pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Write the initial layout (homes, axes, speeds, bound media) as JSON
    #[arg(long)]
    pub dump_layout: Option<PathBuf>,

    /// Decode the first preview frame and write it to disk (PNG)
    #[arg(long)]
    pub dump_frame: Option<PathBuf>,

    /// Skip creating a winit window/event loop; useful for headless automation
    #[arg(long)]
    pub headless: bool,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoverArg {
    None,
    Outline,
    Wireframe,
}

impl From<HoverArg> for HoverFeedbackKind {
    fn from(value: HoverArg) -> Self {
        match value {
            HoverArg::None => HoverFeedbackKind::None,
            HoverArg::Outline => HoverFeedbackKind::Outline,
            HoverArg::Wireframe => HoverFeedbackKind::Wireframe,
        }
    }
}

/// Load the config file (or defaults) and fold the command-line overrides in.
pub fn resolve_config(args: &Args) -> Result<GalleryConfig> {
    let mut config = match args.config.as_deref() {
        Some(path) => load_gallery_config(path)?,
        None => GalleryConfig::default(),
    };
    apply_overrides(args, &mut config);
    config.validate()?;
    Ok(config)
}

pub fn apply_overrides(args: &Args, config: &mut GalleryConfig) {
    if !args.media_roots.is_empty() {
        let catalog = MediaCatalog::from_roots(&args.media_roots);
        let stats = catalog.stats();
        println!(
            "Media catalog: {} paired subject(s), {} preview-only, {} full-only",
            stats.paired, stats.preview_only, stats.full_only
        );
        for source in catalog.sources() {
            if config
                .media
                .iter()
                .any(|existing| existing.identifier == source.identifier)
            {
                log::info!(
                    "[gallery_viewer] config already lists '{}', ignoring scanned copy",
                    source.identifier
                );
                continue;
            }
            config.media.push(source);
        }
    }
    if let Some(seed) = args.seed {
        config.scene.seed = Some(seed);
    }
    if let Some(planes) = args.planes {
        config.scene.plane_count = Some(planes);
    }
    if let Some(kind) = args.hover_feedback {
        config.hover.feedback = kind.into();
    }
}
