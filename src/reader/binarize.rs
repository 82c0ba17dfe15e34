use std::cmp;

use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;

use super::luminance::LuminanceSource;

// Binary image
//------------------------------------------------------------------------------

/// Two tone image handed to decoding engines. `true` is a dark module.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct BinaryImage {
    buffer: Vec<bool>,
    pub w: u32,
    pub h: u32,
}

impl BinaryImage {
    pub fn new(w: u32, h: u32) -> Self {
        Self { buffer: vec![false; (w * h) as usize], w, h }
    }

    /// Pixels less than or equal to `thresh` are dark.
    pub fn from_threshold(img: &GrayImage, thresh: u8) -> Self {
        let (w, h) = img.dimensions();
        let buffer = img.pixels().map(|Luma([p])| *p <= thresh).collect();
        Self { buffer, w, h }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<bool> {
        if x >= self.w || y >= self.h {
            return None;
        }
        Some(self.buffer[(y * self.w + x) as usize])
    }

    pub fn set(&mut self, x: u32, y: u32, dark: bool) {
        if x < self.w && y < self.h {
            self.buffer[(y * self.w + x) as usize] = dark;
        }
    }

    /// Copies out the `w` x `h` region at `(left, top)`. The region is clipped to the image.
    pub fn crop(&self, left: u32, top: u32, w: u32, h: u32) -> Self {
        let left = cmp::min(left, self.w);
        let top = cmp::min(top, self.h);
        let w = cmp::min(w, self.w - left);
        let h = cmp::min(h, self.h - top);

        let mut buffer = Vec::with_capacity((w * h) as usize);
        for y in top..top + h {
            let row_off = (y * self.w) as usize;
            buffer.extend_from_slice(&self.buffer[row_off + left as usize..row_off + (left + w) as usize]);
        }
        Self { buffer, w, h }
    }

    pub fn count_dark(&self) -> usize {
        self.buffer.iter().filter(|&&d| d).count()
    }

    /// Renders dark modules as 0 and light ones as 255.
    pub fn to_luma(&self) -> GrayImage {
        let w = self.w as usize;
        GrayImage::from_fn(self.w, self.h, |x, y| {
            Luma([if self.buffer[y as usize * w + x as usize] { 0 } else { 255 }])
        })
    }
}

// Binarizer
//------------------------------------------------------------------------------

/// Converts a luminance view into a [`BinaryImage`]. The reader calls it once per attempted
/// transform, so every rotation and inversion gets a freshly thresholded image.
pub trait Binarizer: Send {
    fn binarize(&self, src: &dyn LuminanceSource) -> BinaryImage;
}

impl<F> Binarizer for F
where
    F: Fn(&dyn LuminanceSource) -> BinaryImage + Send,
{
    fn binarize(&self, src: &dyn LuminanceSource) -> BinaryImage {
        self(src)
    }
}

// Global threshold picked with Otsu's method
//------------------------------------------------------------------------------

#[derive(Debug, Default, Copy, Clone)]
pub struct OtsuBinarizer;

impl Binarizer for OtsuBinarizer {
    fn binarize(&self, src: &dyn LuminanceSource) -> BinaryImage {
        let img = src.luma();
        BinaryImage::from_threshold(img, otsu_level(img))
    }
}

// Local threshold
// Steps:
// 1. Divides image into blocks of 8x8 pixels. Blocks on the right and bottom edges may be
//    fractional and are averaged over the pixels they actually hold
// 2. Calculates average of each block. Low contrast blocks are assumed to be background
// 3. Calculates the threshold for each block by averaging 5x5 blocks around the current block
// 4. Sets binary pixel as dark if pixel value less than or equal to threshold
// Images narrower or shorter than 5 blocks don't have enough neighbours, so they fall back to
// the global threshold
//------------------------------------------------------------------------------

const BLOCK_SHIFT: u32 = 3;
const MIN_CONTRAST: u8 = 24;
const MIN_BLOCKS: usize = 5;

#[derive(Debug, Default, Copy, Clone)]
pub struct HybridBinarizer;

impl Binarizer for HybridBinarizer {
    fn binarize(&self, src: &dyn LuminanceSource) -> BinaryImage {
        let img = src.luma();
        let (w, h) = img.dimensions();
        let (wsteps, hsteps) = block_steps(w, h);
        if wsteps < MIN_BLOCKS || hsteps < MIN_BLOCKS {
            return OtsuBinarizer.binarize(src);
        }

        let avg = block_average(img, wsteps, hsteps);
        let thresh = block_threshold(&avg, wsteps, hsteps);

        let mut res = BinaryImage::new(w, h);
        for (x, y, Luma([p])) in img.enumerate_pixels() {
            let bi = (y >> BLOCK_SHIFT) as usize * wsteps + (x >> BLOCK_SHIFT) as usize;
            if *p <= thresh[bi] {
                res.set(x, y, true);
            }
        }
        res
    }
}

fn block_steps(w: u32, h: u32) -> (usize, usize) {
    let wsteps = w.div_ceil(1 << BLOCK_SHIFT) as usize;
    let hsteps = h.div_ceil(1 << BLOCK_SHIFT) as usize;
    (wsteps, hsteps)
}

fn block_average(img: &GrayImage, wsteps: usize, hsteps: usize) -> Vec<usize> {
    let len = wsteps * hsteps;
    let mut sum = vec![0usize; len];
    let mut count = vec![0usize; len];
    let mut min_max = vec![(u8::MAX, u8::MIN); len];

    for (x, y, Luma([p])) in img.enumerate_pixels() {
        let i = (y >> BLOCK_SHIFT) as usize * wsteps + (x >> BLOCK_SHIFT) as usize;
        sum[i] += *p as usize;
        count[i] += 1;
        min_max[i].0 = cmp::min(min_max[i].0, *p);
        min_max[i].1 = cmp::max(min_max[i].1, *p);
    }

    // If variance is low, assume the block is background and take half its minimum. Unless
    // the block has top/left neighbours, in which case their average is a better guess.
    let mut avg = vec![0usize; len];
    for by in 0..hsteps {
        for bx in 0..wsteps {
            let i = by * wsteps + bx;
            let (mn, mx) = min_max[i];
            if mx - mn > MIN_CONTRAST {
                avg[i] = sum[i] / count[i];
                continue;
            }

            avg[i] = (mn as usize) / 2;
            if bx > 0 && by > 0 {
                // Average of neighbors (x-1, y), (x, y-1), (x-1, y-1)
                let ng_avg = (2 * avg[i - 1] + avg[i - wsteps] + avg[i - wsteps - 1]) / 4;
                if (mn as usize) < ng_avg {
                    avg[i] = ng_avg;
                }
            }
        }
    }
    avg
}

fn block_threshold(avg: &[usize], wsteps: usize, hsteps: usize) -> Vec<u8> {
    let (maxx, maxy) = (wsteps - 3, hsteps - 3);
    let mut res = vec![0u8; wsteps * hsteps];

    for y in 0..hsteps {
        let cy = y.clamp(2, maxy);
        for x in 0..wsteps {
            let cx = x.clamp(2, maxx);
            let mut sum = 0usize;
            for ny in cy - 2..=cy + 2 {
                let ni = ny * wsteps + cx;
                sum += avg[ni - 2..=ni + 2].iter().sum::<usize>();
            }
            res[y * wsteps + x] = (sum / 25) as u8;
        }
    }
    res
}
