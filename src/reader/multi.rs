use tracing::trace;

use super::{
    binarize::BinaryImage,
    engine::{MultipleReader, Reader},
};
use crate::common::{error::ScanResult, hints::DecodeHints, result::DecodeResult};

// Generic multiple reader
// Decodes one symbol with the wrapped reader, then looks for more in the strips left, above,
// right and below of the found symbol's bounding box. Strips are searched recursively up to
// MAX_DEPTH levels deep. Results are deduplicated by text and their points are mapped back to
// the full image.
//------------------------------------------------------------------------------

const MAX_DEPTH: u32 = 4;
const MIN_DIMENSION_TO_RECUR: f32 = 100.0;

pub struct GenericMultipleReader<'a> {
    reader: &'a mut dyn Reader,
}

impl<'a> GenericMultipleReader<'a> {
    pub fn new(reader: &'a mut dyn Reader) -> Self {
        Self { reader }
    }

    fn decode_region(
        &mut self,
        img: &BinaryImage,
        hints: &DecodeHints,
        offset: (u32, u32),
        depth: u32,
        found: &mut Vec<DecodeResult>,
    ) -> ScanResult<()> {
        if depth > MAX_DEPTH {
            return Ok(());
        }

        let Some(res) = self.reader.decode(img, hints)? else {
            return Ok(());
        };
        trace!(depth, x = offset.0, y = offset.1, text = res.text(), "Found symbol in region");

        let (w, h) = (img.w as f32, img.h as f32);
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (w, h, 0.0f32, 0.0f32);
        for p in res.points() {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        let has_points = !res.points().is_empty();

        if !found.iter().any(|r| r.text() == res.text()) {
            found.push(res.translate_points(offset.0 as f32, offset.1 as f32));
        }

        if !has_points {
            return Ok(());
        }

        let (ox, oy) = offset;
        let depth = depth + 1;

        // Left
        if min_x > MIN_DIMENSION_TO_RECUR {
            let sub = img.crop(0, 0, min_x as u32, img.h);
            self.decode_region(&sub, hints, (ox, oy), depth, found)?;
        }
        // Above
        if min_y > MIN_DIMENSION_TO_RECUR {
            let sub = img.crop(0, 0, img.w, min_y as u32);
            self.decode_region(&sub, hints, (ox, oy), depth, found)?;
        }
        // Right
        if max_x < w - MIN_DIMENSION_TO_RECUR {
            let sub = img.crop(max_x as u32, 0, img.w - max_x as u32, img.h);
            self.decode_region(&sub, hints, (ox + max_x as u32, oy), depth, found)?;
        }
        // Below
        if max_y < h - MIN_DIMENSION_TO_RECUR {
            let sub = img.crop(0, max_y as u32, img.w, img.h - max_y as u32);
            self.decode_region(&sub, hints, (ox, oy + max_y as u32), depth, found)?;
        }
        Ok(())
    }
}

impl MultipleReader for GenericMultipleReader<'_> {
    fn decode_multiple(
        &mut self,
        img: &BinaryImage,
        hints: &DecodeHints,
    ) -> ScanResult<Option<Vec<DecodeResult>>> {
        let mut found = Vec::new();
        self.decode_region(img, hints, (0, 0), 0, &mut found)?;
        Ok(if found.is_empty() { None } else { Some(found) })
    }
}
