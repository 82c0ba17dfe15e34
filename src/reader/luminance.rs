use image::{imageops, DynamicImage, GrayImage};
use tracing::trace;

use crate::common::error::{ScanError, ScanResult};

// Luminance source
//------------------------------------------------------------------------------

/// Single channel brightness view of an image. Rotation and inversion are optional
/// capabilities; the reader checks the `is_*_supported` flags before asking for them.
pub trait LuminanceSource: Send {
    fn luma(&self) -> &GrayImage;

    fn width(&self) -> u32 {
        self.luma().width()
    }

    fn height(&self) -> u32 {
        self.luma().height()
    }

    fn is_rotate_supported(&self) -> bool {
        false
    }

    fn is_inversion_supported(&self) -> bool {
        false
    }

    /// Returns a copy rotated by 90 degrees counter-clockwise.
    fn rotate_counter_clockwise(&self) -> ScanResult<Box<dyn LuminanceSource>> {
        Err(ScanError::RotationUnsupported)
    }

    /// Returns a copy with every luma value `v` replaced by `255 - v`.
    fn invert(&self) -> ScanResult<Box<dyn LuminanceSource>> {
        Err(ScanError::InversionUnsupported)
    }
}

// Raw pixel layouts
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum RawFormat {
    Gray8,
    Rgb24,
    Bgr24,
    Rgba32,
    Bgra32,
    Argb32,
    /// Little endian 5-6-5 packed
    Rgb565,
}

impl RawFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Gray8 => 1,
            Self::Rgb565 => 2,
            Self::Rgb24 | Self::Bgr24 => 3,
            Self::Rgba32 | Self::Bgra32 | Self::Argb32 => 4,
        }
    }

    fn luma(self, px: &[u8]) -> u8 {
        match self {
            Self::Gray8 => px[0],
            Self::Rgb24 => rgb_luma(px[0], px[1], px[2]),
            Self::Bgr24 => rgb_luma(px[2], px[1], px[0]),
            Self::Rgba32 => over_white(rgb_luma(px[0], px[1], px[2]), px[3]),
            Self::Bgra32 => over_white(rgb_luma(px[2], px[1], px[0]), px[3]),
            Self::Argb32 => over_white(rgb_luma(px[1], px[2], px[3]), px[0]),
            Self::Rgb565 => {
                let v = u16::from_le_bytes([px[0], px[1]]);
                let (r5, g6, b5) = ((v >> 11) & 0x1f, (v >> 5) & 0x3f, v & 0x1f);
                let r = (r5 << 3 | r5 >> 2) as u8;
                let g = (g6 << 2 | g6 >> 4) as u8;
                let b = (b5 << 3 | b5 >> 2) as u8;
                rgb_luma(r, g, b)
            }
        }
    }
}

// Integer approximation of 0.299R + 0.587G + 0.114B, weights sum to 1024
fn rgb_luma(r: u8, g: u8, b: u8) -> u8 {
    ((306 * r as u32 + 601 * g as u32 + 117 * b as u32 + 0x200) >> 10) as u8
}

// Transparent pixels read as white paper
fn over_white(luma: u8, alpha: u8) -> u8 {
    let (l, a) = (luma as u32, alpha as u32);
    ((l * a + 255 * (255 - a)) / 255) as u8
}

// Gray luminance source
//------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GrayLuminanceSource {
    img: GrayImage,
}

impl GrayLuminanceSource {
    pub fn new(img: GrayImage) -> ScanResult<Self> {
        if img.width() == 0 || img.height() == 0 {
            return Err(ScanError::EmptyImage);
        }
        Ok(Self { img })
    }

    pub fn from_image(img: &DynamicImage) -> ScanResult<Self> {
        Self::new(img.to_luma8())
    }

    pub fn from_raw(data: &[u8], width: u32, height: u32, format: RawFormat) -> ScanResult<Self> {
        if width == 0 || height == 0 || data.is_empty() {
            return Err(ScanError::EmptyImage);
        }

        let bpp = format.bytes_per_pixel();
        if data.len() != width as usize * height as usize * bpp {
            return Err(ScanError::InvalidBuffer { len: data.len(), width, height, bpp });
        }

        let buffer = data.chunks_exact(bpp).map(|px| format.luma(px)).collect::<Vec<_>>();
        let img = GrayImage::from_raw(width, height, buffer).ok_or(ScanError::InvalidBuffer {
            len: data.len(),
            width,
            height,
            bpp,
        })?;
        Self::new(img)
    }

    pub fn into_inner(self) -> GrayImage {
        self.img
    }
}

impl LuminanceSource for GrayLuminanceSource {
    fn luma(&self) -> &GrayImage {
        &self.img
    }

    fn is_rotate_supported(&self) -> bool {
        true
    }

    fn is_inversion_supported(&self) -> bool {
        true
    }

    fn rotate_counter_clockwise(&self) -> ScanResult<Box<dyn LuminanceSource>> {
        trace!(w = self.img.width(), h = self.img.height(), "Rotating luminance 90deg ccw");
        // rotate270 turns the image clockwise by 270, same as 90 counter-clockwise
        Ok(Box::new(Self { img: imageops::rotate270(&self.img) }))
    }

    fn invert(&self) -> ScanResult<Box<dyn LuminanceSource>> {
        let mut img = self.img.clone();
        imageops::invert(&mut img);
        Ok(Box::new(Self { img }))
    }
}

/// Default factory used by readers over [`DynamicImage`].
pub fn dynamic_image_source(img: &DynamicImage) -> ScanResult<Box<dyn LuminanceSource>> {
    Ok(Box::new(GrayLuminanceSource::from_image(img)?))
}

/// Factory for readers over an already gray [`GrayImage`].
pub fn gray_image_source(img: &GrayImage) -> ScanResult<Box<dyn LuminanceSource>> {
    Ok(Box::new(GrayLuminanceSource::new(img.clone())?))
}
