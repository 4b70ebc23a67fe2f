mod cli;
mod movie;
mod stream;
mod texture;
mod viewer;

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use gallery_core::{Gallery, GalleryConfig, MediaElement, Viewport};
use pollster::FutureExt;
use wgpu::SurfaceError;
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::WindowBuilder,
};

use cli::Args;
use movie::VideoElement;
use stream::PlaylistClient;
use viewer::ViewerState;

fn build_gallery(config: GalleryConfig, viewport: Viewport) -> Gallery {
    Gallery::new(config, viewport, Box::new(PlaylistClient), |_| {
        Box::new(VideoElement::new()) as Box<dyn MediaElement>
    })
}

fn print_summary(gallery: &Gallery) {
    let config = gallery.config();
    println!(
        "Gallery: {} plane(s) from {} media source(s), hover feedback '{}'",
        gallery.registry().len(),
        config.media.len(),
        gallery.hover_feedback().name()
    );
    for item in gallery.registry().items() {
        println!(
            "  - item {} '{}' {:?} home {:.2?} bound {:?}",
            item.id(),
            item.media_identifier(),
            item.playback_state(),
            item.home_position().to_array(),
            item.media().src()
        );
    }
}

fn dump_layout(gallery: &Gallery, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&gallery.layout()).context("serializing layout")?;
    fs::write(path, json).with_context(|| format!("writing layout to {}", path.display()))?;
    println!("Layout written to {}", path.display());
    Ok(())
}

/// Decode the first preview picture of the first item that yields one.
fn dump_first_frame(gallery: &mut Gallery, path: &Path) -> Result<()> {
    let mut written = None;
    gallery.poll_media(Duration::ZERO, &mut |item, frame| {
        if written.is_some() {
            return;
        }
        written = Some(
            texture::export_rgba_to_png(path, frame.width, frame.height, frame.rgba)
                .map(|()| (item, frame.width, frame.height)),
        );
    });
    match written {
        Some(Ok((item, width, height))) => {
            println!(
                "Frame of item {item} ({width}x{height}) written to {}",
                path.display()
            );
            Ok(())
        }
        Some(Err(err)) => Err(err),
        None => {
            eprintln!("[gallery_viewer] no preview produced a frame; skipped {}", path.display());
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = cli::resolve_config(&args)?;

    let initial = Viewport::new(args.width.max(1) as f32, args.height.max(1) as f32);
    let mut gallery = build_gallery(config, initial);
    print_summary(&gallery);

    if let Some(path) = args.dump_layout.as_deref() {
        dump_layout(&gallery, path)?;
    }
    if let Some(path) = args.dump_frame.as_deref() {
        dump_first_frame(&mut gallery, path)?;
    }

    if args.headless {
        println!("Headless mode requested; viewer window bootstrap skipped.");
        return Ok(());
    }

    let event_loop = EventLoop::new().context("creating winit event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Gallery Viewer")
            .with_inner_size(LogicalSize::new(args.width.max(1), args.height.max(1)))
            .build(&event_loop)
            .context("creating viewer window")?,
    );

    let mut state = ViewerState::new(window, gallery).block_on()?;
    println!(
        "Click a plane to bring it forward; click it again to pause/resume, click empty space to send it back."
    );

    event_loop
        .run(move |event, target| {
            target.set_control_flow(ControlFlow::Poll);

            match event {
                Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                    match event {
                        WindowEvent::CloseRequested => target.exit(),
                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    logical_key: Key::Named(NamedKey::Escape),
                                    state: ElementState::Pressed,
                                    ..
                                },
                            ..
                        } => target.exit(),
                        WindowEvent::CursorMoved { position, .. } => state.cursor_moved(position),
                        WindowEvent::CursorLeft { .. } => state.cursor_left(),
                        WindowEvent::MouseInput {
                            state: ElementState::Pressed,
                            ..
                        } => state.pointer_pressed(),
                        WindowEvent::Resized(new_size) => state.resize(new_size),
                        WindowEvent::ScaleFactorChanged { .. } => {
                            let size = state.window().inner_size();
                            state.resize(size);
                        }
                        WindowEvent::RedrawRequested => match state.render() {
                            Ok(_) => {}
                            Err(SurfaceError::Lost) => state.resize(state.size()),
                            Err(SurfaceError::OutOfMemory) => target.exit(),
                            Err(err) => eprintln!("[gallery_viewer] render error: {err:?}"),
                        },
                        _ => {}
                    }
                }
                Event::AboutToWait => state.window().request_redraw(),
                _ => {}
            }
        })
        .context("running gallery viewer")?;
    Ok(())
}
