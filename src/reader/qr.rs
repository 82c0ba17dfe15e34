use encoding_rs::{Encoding, WINDOWS_1252};
use rqrr::PreparedImage;
use tracing::{debug, trace};

use super::{
    binarize::BinaryImage,
    engine::{MultipleReader, Reader},
};
use crate::common::{
    error::ScanResult,
    format::BarcodeFormat,
    hints::DecodeHints,
    result::{DecodeResult, MetadataValue, ResultMetadataType, ResultPoint},
};

// QR engine
// Grid detection and payload decoding are done by rqrr. This adapter feeds it the binary image,
// reports grid corners as interest points, and turns payload bytes into text using the
// character set hint, UTF-8, or ISO-8859-1 as the QR default, in that order.
//------------------------------------------------------------------------------

#[derive(Debug, Default, Copy, Clone)]
pub struct RqrrReader;

impl RqrrReader {
    pub fn new() -> Self {
        Self
    }

    fn scan(
        &self,
        img: &BinaryImage,
        hints: &DecodeHints,
        first_only: bool,
    ) -> ScanResult<Vec<DecodeResult>> {
        let mut prepared = PreparedImage::prepare_from_bitmap(img.w as usize, img.h as usize, |x, y| {
            img.get(x as u32, y as u32).unwrap_or(false)
        });
        let grids = prepared.detect_grids();
        trace!(grids = grids.len(), "Detected QR grids");

        let mut found = Vec::new();
        for grid in grids {
            let pts = grid
                .bounds
                .iter()
                .map(|p| ResultPoint::new(p.x as f32, p.y as f32))
                .collect::<Vec<_>>();
            pts.iter().for_each(|p| hints.report_point(*p));

            let mut bytes = Vec::new();
            let meta = match grid.decode_to(&mut bytes) {
                Ok(meta) => meta,
                Err(err) => {
                    // Unreadable grid is a miss, not an engine fault
                    debug!(%err, "QR grid failed to decode");
                    continue;
                }
            };

            let text = decode_payload(&bytes, hints.character_set());
            let res = DecodeResult::new(text, BarcodeFormat::QrCode, pts)
                .with_raw_bytes(bytes)
                .with_metadata(
                    ResultMetadataType::ErrorCorrectionLevel,
                    MetadataValue::Text(ec_level_name(meta.ecc_level).to_string()),
                )
                .with_metadata(
                    ResultMetadataType::SymbologyIdentifier,
                    MetadataValue::Text("]Q1".to_string()),
                );
            found.push(res);

            if first_only {
                break;
            }
        }
        Ok(found)
    }
}

impl Reader for RqrrReader {
    fn decode(&mut self, img: &BinaryImage, hints: &DecodeHints) -> ScanResult<Option<DecodeResult>> {
        Ok(self.scan(img, hints, true)?.into_iter().next())
    }
}

impl MultipleReader for RqrrReader {
    fn decode_multiple(
        &mut self,
        img: &BinaryImage,
        hints: &DecodeHints,
    ) -> ScanResult<Option<Vec<DecodeResult>>> {
        let found = self.scan(img, hints, false)?;
        Ok(if found.is_empty() { None } else { Some(found) })
    }
}

// Format info stores the level as 2 raw bits: 01 L, 00 M, 11 Q, 10 H
fn ec_level_name(bits: u16) -> &'static str {
    match bits & 0b11 {
        0b01 => "L",
        0b00 => "M",
        0b11 => "Q",
        _ => "H",
    }
}

pub(crate) fn decode_payload(bytes: &[u8], charset: Option<&'static Encoding>) -> String {
    if let Some(enc) = charset {
        return enc.decode_without_bom_handling(bytes).0.into_owned();
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned(),
    }
}

#[cfg(test)]
mod qr_tests {
    use encoding_rs::SHIFT_JIS;
    use test_case::test_case;

    use super::{decode_payload, ec_level_name, RqrrReader};
    use crate::{
        reader::{
            binarize::BinaryImage,
            engine::{MultipleReader, Reader},
        },
        DecodeHints,
    };

    #[test]
    fn test_blank_image_has_no_symbol() {
        let img = BinaryImage::new(64, 64);
        let mut reader = RqrrReader::new();
        assert!(reader.decode(&img, &DecodeHints::new()).unwrap().is_none());
        assert!(reader.decode_multiple(&img, &DecodeHints::new()).unwrap().is_none());
    }

    #[test]
    fn test_payload_utf8() {
        assert_eq!(decode_payload("Hello, world!🌎".as_bytes(), None), "Hello, world!🌎");
    }

    #[test]
    fn test_payload_latin1_fallback() {
        assert_eq!(decode_payload(&[0x43, 0x61, 0x66, 0xe9], None), "Café");
    }

    #[test]
    fn test_payload_charset_hint() {
        // "テスト" in Shift_JIS
        let sjis = [0x83, 0x65, 0x83, 0x58, 0x83, 0x67];
        assert_eq!(decode_payload(&sjis, Some(SHIFT_JIS)), "テスト");
    }

    #[test_case(0b01, "L")]
    #[test_case(0b00, "M")]
    #[test_case(0b11, "Q")]
    #[test_case(0b10, "H")]
    fn test_ec_level_name(bits: u16, exp: &str) {
        assert_eq!(ec_level_name(bits), exp);
    }
}
