use std::collections::BTreeMap;

use super::format::BarcodeFormat;

// Result point
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Copy, Clone, Default)]
pub struct ResultPoint {
    pub x: f32,
    pub y: f32,
}

impl ResultPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn translate(self, dx: f32, dy: f32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }
}

// Metadata
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone)]
pub enum ResultMetadataType {
    /// Rotation in degrees, `[0, 360)`, that brings the symbol upright.
    Orientation,
    ByteSegments,
    ErrorCorrectionLevel,
    SymbologyIdentifier,
    Other,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum MetadataValue {
    Int(i32),
    Text(String),
    Bytes(Vec<u8>),
}

pub type ResultMetadata = BTreeMap<ResultMetadataType, MetadataValue>;

// Decode result
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Clone)]
pub struct DecodeResult {
    text: String,
    raw_bytes: Option<Vec<u8>>,
    format: BarcodeFormat,
    points: Vec<ResultPoint>,
    metadata: Option<ResultMetadata>,
}

impl DecodeResult {
    pub fn new(text: impl Into<String>, format: BarcodeFormat, points: Vec<ResultPoint>) -> Self {
        Self { text: text.into(), raw_bytes: None, format, points, metadata: None }
    }

    pub fn with_raw_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.raw_bytes = Some(bytes);
        self
    }

    pub fn with_metadata(mut self, key: ResultMetadataType, value: MetadataValue) -> Self {
        self.put_metadata(key, value);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn raw_bytes(&self) -> Option<&[u8]> {
        self.raw_bytes.as_deref()
    }

    pub fn format(&self) -> BarcodeFormat {
        self.format
    }

    pub fn points(&self) -> &[ResultPoint] {
        &self.points
    }

    /// `None` when the engine attached no metadata at all.
    pub fn metadata(&self) -> Option<&ResultMetadata> {
        self.metadata.as_ref()
    }

    pub fn orientation(&self) -> Option<i32> {
        match self.metadata.as_ref()?.get(&ResultMetadataType::Orientation)? {
            MetadataValue::Int(deg) => Some(*deg),
            _ => None,
        }
    }

    pub(crate) fn put_metadata(&mut self, key: ResultMetadataType, value: MetadataValue) {
        self.metadata.get_or_insert_with(ResultMetadata::new).insert(key, value);
    }

    /// Shifts points found in a cropped region back into the coordinates of the full image.
    pub(crate) fn translate_points(mut self, dx: f32, dy: f32) -> Self {
        self.points.iter_mut().for_each(|p| *p = p.translate(dx, dy));
        self
    }
}

#[cfg(test)]
mod result_tests {
    use super::{DecodeResult, MetadataValue, ResultMetadataType, ResultPoint};
    use crate::BarcodeFormat;

    #[test]
    fn test_metadata_absent_until_put() {
        let mut res = DecodeResult::new("abc", BarcodeFormat::QrCode, vec![]);
        assert!(res.metadata().is_none());
        assert_eq!(res.orientation(), None);

        res.put_metadata(ResultMetadataType::Orientation, MetadataValue::Int(90));
        assert_eq!(res.orientation(), Some(90));
        assert_eq!(res.metadata().unwrap().len(), 1);
    }

    #[test]
    fn test_non_int_orientation_ignored() {
        let res = DecodeResult::new("abc", BarcodeFormat::QrCode, vec![])
            .with_metadata(ResultMetadataType::Orientation, MetadataValue::Text("up".into()));
        assert_eq!(res.orientation(), None);
    }

    #[test]
    fn test_translate_points() {
        let pts = vec![ResultPoint::new(1.0, 2.0), ResultPoint::new(5.0, 6.0)];
        let res = DecodeResult::new("abc", BarcodeFormat::QrCode, pts).translate_points(10.0, 20.0);
        assert_eq!(res.points(), &[ResultPoint::new(11.0, 22.0), ResultPoint::new(15.0, 26.0)]);
    }
}
