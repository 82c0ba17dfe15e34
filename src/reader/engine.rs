use super::binarize::BinaryImage;
use crate::common::{error::ScanResult, format::BarcodeFormat, hints::DecodeHints, result::DecodeResult};

// Engines
//------------------------------------------------------------------------------

/// Locates and decodes a single symbol. `Ok(None)` means nothing was found; `Err` is reserved
/// for faults inside the engine and reaches the caller as is.
pub trait Reader: Send {
    fn decode(&mut self, img: &BinaryImage, hints: &DecodeHints) -> ScanResult<Option<DecodeResult>>;

    /// Engines that keep state between calls expose it here.
    fn stateful(&mut self) -> Option<&mut dyn StatefulReader> {
        None
    }

    fn reset(&mut self) {}
}

/// Decoding against state retained by the last [`Reader::decode`] call. Fresh hints can't be
/// passed in; the engine reuses whatever it set up last time.
pub trait StatefulReader {
    fn decode_with_state(&mut self, img: &BinaryImage) -> ScanResult<Option<DecodeResult>>;
}

/// Locates and decodes every symbol in the image. An empty result set counts as nothing found.
pub trait MultipleReader: Send {
    fn decode_multiple(
        &mut self,
        img: &BinaryImage,
        hints: &DecodeHints,
    ) -> ScanResult<Option<Vec<DecodeResult>>>;
}

// Multi symbol engine selection
//------------------------------------------------------------------------------

/// Format served by the dedicated multi symbol engine.
pub const SPECIALIZED_MULTI_FORMAT: BarcodeFormat = BarcodeFormat::QrCode;

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum EngineChoice {
    Specialized,
    Generic,
}

pub fn select_engine(formats: &[BarcodeFormat]) -> EngineChoice {
    match formats {
        [SPECIALIZED_MULTI_FORMAT] => EngineChoice::Specialized,
        _ => EngineChoice::Generic,
    }
}
