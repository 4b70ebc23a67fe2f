use theorafile_rs::{
    th_pixel_fmt, th_pixel_fmt_TH_PF_420, th_pixel_fmt_TH_PF_422, th_pixel_fmt_TH_PF_444,
};

/// Chroma subsampling of a decoded Theora picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsampling {
    Yuv420,
    Yuv422,
    Yuv444,
}

impl Subsampling {
    pub fn from_theora(format: th_pixel_fmt) -> Option<Self> {
        match format {
            pf if pf == th_pixel_fmt_TH_PF_420 => Some(Subsampling::Yuv420),
            pf if pf == th_pixel_fmt_TH_PF_422 => Some(Subsampling::Yuv422),
            pf if pf == th_pixel_fmt_TH_PF_444 => Some(Subsampling::Yuv444),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Subsampling::Yuv420 => "4:2:0",
            Subsampling::Yuv422 => "4:2:2",
            Subsampling::Yuv444 => "4:4:4",
        }
    }

    fn shifts(self) -> (usize, usize) {
        match self {
            Subsampling::Yuv420 => (1, 1),
            Subsampling::Yuv422 => (1, 0),
            Subsampling::Yuv444 => (0, 0),
        }
    }
}

/// Sizes of the three planes `tf_readvideo` writes back to back.
#[derive(Debug, Clone, Copy)]
pub struct FrameLayout {
    width: usize,
    height: usize,
    chroma_width: usize,
    chroma_height: usize,
    subsampling: Subsampling,
}

impl FrameLayout {
    pub fn new(width: usize, height: usize, subsampling: Subsampling) -> Self {
        let (shift_x, shift_y) = subsampling.shifts();
        Self {
            width,
            height,
            chroma_width: (width >> shift_x).max(1),
            chroma_height: (height >> shift_y).max(1),
            subsampling,
        }
    }

    pub fn subsampling(&self) -> Subsampling {
        self.subsampling
    }

    pub fn yuv_len(&self) -> Option<usize> {
        let luma = self.width.checked_mul(self.height)?;
        let chroma = self.chroma_width.checked_mul(self.chroma_height)?;
        luma.checked_add(chroma.checked_mul(2)?)
    }

    pub fn rgba_len(&self) -> Option<usize> {
        self.width.checked_mul(self.height)?.checked_mul(4)
    }

    /// Convert a packed Y/Cb/Cr buffer into opaque RGBA8.
    pub fn convert(&self, yuv: &[u8], rgba: &mut [u8]) {
        let luma_len = self.width * self.height;
        let chroma_len = self.chroma_width * self.chroma_height;
        let (luma, rest) = yuv.split_at(luma_len);
        let (cb, rest) = rest.split_at(chroma_len);
        let cr = &rest[..chroma_len];
        let (shift_x, shift_y) = self.subsampling.shifts();

        for (row, out_row) in rgba.chunks_exact_mut(self.width * 4).take(self.height).enumerate() {
            let chroma_row = (row >> shift_y).min(self.chroma_height - 1) * self.chroma_width;
            let luma_row = &luma[row * self.width..(row + 1) * self.width];
            for (col, (pixel, &y)) in out_row.chunks_exact_mut(4).zip(luma_row).enumerate() {
                let chroma = chroma_row + (col >> shift_x).min(self.chroma_width - 1);
                let [r, g, b] = ycbcr_to_rgb(y, cb[chroma], cr[chroma]);
                pixel.copy_from_slice(&[r, g, b, 255]);
            }
        }
    }
}

fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let y = y as f32;
    let cb = cb as f32 - 128.0;
    let cr = cr as f32 - 128.0;
    let r = y + 1.402 * cr;
    let g = y - 0.344_136 * cb - 0.714_136 * cr;
    let b = y + 1.772 * cb;
    [r, g, b].map(|channel| channel.clamp(0.0, 255.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_chroma_yields_grey() {
        let layout = FrameLayout::new(4, 2, Subsampling::Yuv420);
        assert_eq!(layout.yuv_len(), Some(8 + 2 * 2));
        let mut yuv = vec![200u8; 8];
        yuv.extend_from_slice(&[128; 4]);
        let mut rgba = vec![0u8; layout.rgba_len().unwrap()];
        layout.convert(&yuv, &mut rgba);
        for pixel in rgba.chunks_exact(4) {
            assert_eq!(pixel, &[200, 200, 200, 255]);
        }
    }

    #[test]
    fn chroma_is_shared_across_subsampled_columns() {
        let layout = FrameLayout::new(2, 1, Subsampling::Yuv422);
        // luma, then one Cb and one Cr sample covering both columns
        let yuv = [128u8, 128, 128, 255];
        let mut rgba = [0u8; 8];
        layout.convert(&yuv, &mut rgba);
        assert_eq!(rgba[..4], rgba[4..]);
        assert!(rgba[0] > 200, "strong Cr pushes red up: {:?}", &rgba[..4]);
    }
}
