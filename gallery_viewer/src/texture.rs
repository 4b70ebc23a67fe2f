use std::borrow::Cow;
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use image::{ColorType, ImageEncoder, codecs::png::PngEncoder};

/// RGBA pixels laid out with the row pitch `Queue::write_texture` expects.
pub struct TextureUpload<'a> {
    data: Cow<'a, [u8]>,
    bytes_per_row: u32,
}

impl TextureUpload<'_> {
    pub fn pixels(&self) -> &[u8] {
        &self.data
    }

    pub fn bytes_per_row(&self) -> u32 {
        self.bytes_per_row
    }
}

/// Borrow `data` when its rows already meet wgpu's copy alignment, otherwise
/// copy it into padded rows.
pub fn prepare_rgba_upload(width: u32, height: u32, data: &[u8]) -> Result<TextureUpload<'_>> {
    ensure!(width > 0 && height > 0, "texture has no dimensions");
    let row_bytes = 4 * width as usize;
    let rows = height as usize;
    ensure!(
        data.len() >= row_bytes * rows,
        "frame buffer ({} bytes) smaller than {width}x{height} RGBA ({} bytes)",
        data.len(),
        row_bytes * rows
    );

    let alignment = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize;
    if row_bytes % alignment == 0 {
        return Ok(TextureUpload {
            data: Cow::Borrowed(&data[..row_bytes * rows]),
            bytes_per_row: row_bytes as u32,
        });
    }

    let padded_row_bytes = row_bytes.div_ceil(alignment) * alignment;
    let mut buffer = vec![0u8; padded_row_bytes * rows];
    for (dst, src) in buffer
        .chunks_exact_mut(padded_row_bytes)
        .zip(data.chunks_exact(row_bytes))
    {
        dst[..row_bytes].copy_from_slice(src);
    }
    Ok(TextureUpload {
        data: Cow::Owned(buffer),
        bytes_per_row: padded_row_bytes as u32,
    })
}

pub fn export_rgba_to_png(path: &Path, width: u32, height: u32, data: &[u8]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    PngEncoder::new(file)
        .write_image(data, width, height, ColorType::Rgba8.into())
        .with_context(|| format!("writing PNG to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aligned_rows_are_borrowed() -> Result<()> {
        let data = vec![7u8; 64 * 2 * 4];
        let upload = prepare_rgba_upload(64, 2, &data)?;
        assert!(matches!(upload.data, Cow::Borrowed(_)));
        assert_eq!(upload.bytes_per_row(), 256);
        assert_eq!(upload.pixels().len(), data.len());
        Ok(())
    }

    #[test]
    fn narrow_rows_are_padded() -> Result<()> {
        let data: Vec<u8> = (0..2 * 3 * 4).map(|value| value as u8).collect();
        let upload = prepare_rgba_upload(2, 3, &data)?;
        assert_eq!(upload.bytes_per_row(), wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);
        let pitch = upload.bytes_per_row() as usize;
        for row in 0..3 {
            assert_eq!(&upload.pixels()[row * pitch..row * pitch + 8], &data[row * 8..row * 8 + 8]);
        }
        Ok(())
    }

    #[test]
    fn short_buffers_are_rejected() {
        assert!(prepare_rgba_upload(4, 4, &[0u8; 16]).is_err());
        assert!(prepare_rgba_upload(0, 4, &[]).is_err());
    }

    #[test]
    fn png_export_writes_a_readable_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("frame.png");
        export_rgba_to_png(&path, 2, 2, &[255u8; 16])?;
        let bytes = std::fs::read(&path)?;
        assert_eq!(&bytes[1..4], b"PNG");
        Ok(())
    }
}
