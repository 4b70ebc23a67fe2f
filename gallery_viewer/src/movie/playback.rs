use std::ffi::CString;
use std::mem::MaybeUninit;
use std::os::raw::c_char;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use theorafile_rs::{
    OggTheora_File, tf_close, tf_eos, tf_fopen, tf_hasvideo, tf_readvideo, tf_videoinfo,
    th_pixel_fmt,
};

use crate::movie::yuv::{FrameLayout, Subsampling};

const FALLBACK_FPS: f64 = 30.0;

/// Owned handle to an open Theora file.
struct TheoraStream {
    file: OggTheora_File,
}

impl TheoraStream {
    fn open(path: &Path) -> Result<(Self, StreamInfo)> {
        let c_path = CString::new(path.to_string_lossy().as_bytes())
            .with_context(|| format!("movie path '{}' contains NUL byte", path.display()))?;

        let mut file = MaybeUninit::<OggTheora_File>::zeroed();
        let open_rc = unsafe { tf_fopen(c_path.as_ptr(), file.as_mut_ptr()) };
        if open_rc != 0 {
            bail!(
                "failed to open Theora movie '{}' (error code {open_rc})",
                path.display()
            );
        }
        // Closed by Drop from here on, including on the error paths below.
        let mut stream = TheoraStream {
            file: unsafe { file.assume_init() },
        };

        if unsafe { tf_hasvideo(&mut stream.file) } == 0 {
            bail!("Theora movie '{}' has no video stream", path.display());
        }

        let mut width: i32 = 0;
        let mut height: i32 = 0;
        let mut fps: f64 = 0.0;
        let mut pixel_format: th_pixel_fmt = 0;
        unsafe {
            tf_videoinfo(
                &mut stream.file,
                &mut width,
                &mut height,
                &mut fps,
                &mut pixel_format,
            );
        }

        let width = u32::try_from(width)
            .ok()
            .filter(|value| *value > 0)
            .ok_or_else(|| anyhow!("invalid video width {width} in '{}'", path.display()))?;
        let height = u32::try_from(height)
            .ok()
            .filter(|value| *value > 0)
            .ok_or_else(|| anyhow!("invalid video height {height} in '{}'", path.display()))?;
        let subsampling = Subsampling::from_theora(pixel_format).ok_or_else(|| {
            anyhow!(
                "unsupported pixel format {pixel_format} in '{}'",
                path.display()
            )
        })?;

        let info = StreamInfo {
            width,
            height,
            fps: if fps > 0.0 { fps } else { FALLBACK_FPS },
            layout: FrameLayout::new(width as usize, height as usize, subsampling),
        };
        Ok((stream, info))
    }

    fn read_frame(&mut self, yuv: &mut [u8]) -> i32 {
        unsafe { tf_readvideo(&mut self.file, yuv.as_mut_ptr() as *mut c_char, 1) }
    }

    fn at_end(&mut self) -> bool {
        unsafe { tf_eos(&mut self.file) != 0 }
    }
}

impl Drop for TheoraStream {
    fn drop(&mut self) {
        unsafe {
            tf_close(&mut self.file);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StreamInfo {
    width: u32,
    height: u32,
    fps: f64,
    layout: FrameLayout,
}

enum FrameStatus {
    Advanced,
    Duplicate,
    EndOfStream,
}

/// Decodes an Ogg/Theora file on demand, following a media clock rather than
/// wall time so paused elements stop advancing.
pub struct OgvPlayback {
    path: PathBuf,
    stream: TheoraStream,
    info: StreamInfo,
    yuv_buffer: Vec<u8>,
    rgba_buffer: Vec<u8>,
    frame_cursor: Option<u64>,
    /// Known once the stream has been read to the end at least once.
    frame_count: Option<u64>,
    end_of_stream: bool,
    decoded: u64,
}

impl OgvPlayback {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let (stream, info) = TheoraStream::open(&path)?;
        let yuv_len = info
            .layout
            .yuv_len()
            .ok_or_else(|| anyhow!("video buffer size overflow for '{}'", path.display()))?;
        let rgba_len = info
            .layout
            .rgba_len()
            .ok_or_else(|| anyhow!("RGBA buffer size overflow for '{}'", path.display()))?;
        log::debug!(
            "[gallery_viewer] opened {} ({}x{} {} @ {:.2} fps)",
            path.display(),
            info.width,
            info.height,
            info.layout.subsampling().label(),
            info.fps
        );
        Ok(Self {
            path,
            stream,
            info,
            yuv_buffer: vec![0u8; yuv_len],
            rgba_buffer: vec![0u8; rgba_len],
            frame_cursor: None,
            frame_count: None,
            end_of_stream: false,
            decoded: 0,
        })
    }

    pub fn width(&self) -> u32 {
        self.info.width
    }

    pub fn height(&self) -> u32 {
        self.info.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba_buffer
    }

    /// Number of pictures decoded since opening, across loops.
    pub fn frames_decoded(&self) -> u64 {
        self.decoded
    }

    /// Decode forward until the picture shown at `position` is in the RGBA
    /// buffer. Looping streams wrap once their length is known; otherwise the
    /// last picture is held.
    pub fn seek_forward(&mut self, position: Duration, looping: bool) -> Result<()> {
        let mut target = (position.as_secs_f64() * self.info.fps).floor() as u64;
        if looping {
            if let Some(count) = self.frame_count {
                target %= count.max(1);
            }
        }
        if let Some(current) = self.frame_cursor {
            if target < current {
                self.rewind()?;
            }
        }
        self.ensure_frame(target)?;

        if looping && self.end_of_stream && self.frame_cursor.is_some_and(|cursor| cursor < target)
        {
            if let Some(count) = self.frame_count {
                self.rewind()?;
                self.ensure_frame(target % count.max(1))?;
            }
        }
        Ok(())
    }

    fn rewind(&mut self) -> Result<()> {
        let (stream, info) = TheoraStream::open(&self.path)
            .with_context(|| format!("rewinding {}", self.path.display()))?;
        if info.width != self.info.width || info.height != self.info.height {
            bail!("'{}' changed size while playing", self.path.display());
        }
        self.stream = stream;
        self.frame_cursor = None;
        self.end_of_stream = false;
        Ok(())
    }

    fn ensure_frame(&mut self, target: u64) -> Result<()> {
        loop {
            if self.frame_cursor.is_some_and(|current| current >= target) || self.end_of_stream {
                return Ok(());
            }
            match self.decode_next_frame()? {
                FrameStatus::Advanced | FrameStatus::Duplicate => continue,
                FrameStatus::EndOfStream => return Ok(()),
            }
        }
    }

    fn decode_next_frame(&mut self) -> Result<FrameStatus> {
        match self.stream.read_frame(&mut self.yuv_buffer) {
            1 => {
                self.info.layout.convert(&self.yuv_buffer, &mut self.rgba_buffer);
                self.step_cursor();
                self.decoded += 1;
                Ok(FrameStatus::Advanced)
            }
            0 if self.stream.at_end() => {
                let Some(last) = self.frame_cursor else {
                    bail!(
                        "Theora movie '{}' ended without yielding a frame",
                        self.path.display()
                    );
                };
                self.end_of_stream = true;
                self.frame_count.get_or_insert(last + 1);
                Ok(FrameStatus::EndOfStream)
            }
            0 => {
                if self.frame_cursor.is_none() {
                    bail!(
                        "Theora movie '{}' repeated a frame before the first one",
                        self.path.display()
                    );
                }
                self.step_cursor();
                Ok(FrameStatus::Duplicate)
            }
            other => Err(anyhow!(
                "Theora decoder for '{}' returned unexpected status {other}",
                self.path.display()
            )),
        }
    }

    fn step_cursor(&mut self) {
        self.frame_cursor = Some(self.frame_cursor.map_or(0, |value| value.saturating_add(1)));
    }
}
