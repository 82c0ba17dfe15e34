use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use encoding_rs::Encoding;

use super::{
    error::{ScanError, ScanResult},
    format::BarcodeFormat,
    result::ResultPoint,
};

// Point callback
//------------------------------------------------------------------------------

/// Callback handed to engines through [`DecodeHintType::NeedResultPointCallback`]. Engines call
/// it whenever they come across a finder corner or similar landmark, before any symbol is known.
#[derive(Clone)]
pub struct PointCallback(Arc<dyn Fn(ResultPoint) + Send + Sync>);

impl PointCallback {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(ResultPoint) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn found(&self, pt: ResultPoint) {
        (self.0)(pt)
    }
}

impl Debug for PointCallback {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("PointCallback(..)")
    }
}

// Hints
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Copy, Clone)]
pub enum DecodeHintType {
    PossibleFormats,
    TryHarder,
    // Caller rotates the image itself, engines shouldn't spend time on it
    TryHarderWithoutRotation,
    NeedResultPointCallback,
    CharacterSet,
    PureBarcode,
    AssumeGs1,
}

#[derive(Debug, Clone)]
pub enum HintValue {
    Flag(bool),
    Formats(Vec<BarcodeFormat>),
    CharacterSet(&'static Encoding),
    PointCallback(PointCallback),
}

#[derive(Debug, Clone, Default)]
pub struct DecodeHints {
    hints: BTreeMap<DecodeHintType, HintValue>,
}

impl DecodeHints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: DecodeHintType, value: HintValue) -> Option<HintValue> {
        self.hints.insert(key, value)
    }

    pub fn remove(&mut self, key: DecodeHintType) -> Option<HintValue> {
        self.hints.remove(&key)
    }

    pub fn get(&self, key: DecodeHintType) -> Option<&HintValue> {
        self.hints.get(&key)
    }

    pub fn contains(&self, key: DecodeHintType) -> bool {
        self.hints.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.hints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hints.is_empty()
    }

    /// Sets or clears a boolean hint. Absent and `false` mean the same to engines, so `false`
    /// removes the entry to keep the set minimal.
    pub fn set_flag(&mut self, key: DecodeHintType, on: bool) {
        if on {
            self.hints.insert(key, HintValue::Flag(true));
        } else {
            self.hints.remove(&key);
        }
    }

    pub fn flag(&self, key: DecodeHintType) -> bool {
        matches!(self.hints.get(&key), Some(HintValue::Flag(true)))
    }

    /// Formats to restrict the search to. Empty means every format.
    pub fn possible_formats(&self) -> &[BarcodeFormat] {
        match self.hints.get(&DecodeHintType::PossibleFormats) {
            Some(HintValue::Formats(f)) => f,
            _ => &[],
        }
    }

    pub fn character_set(&self) -> Option<&'static Encoding> {
        match self.hints.get(&DecodeHintType::CharacterSet) {
            Some(HintValue::CharacterSet(enc)) => Some(enc),
            _ => None,
        }
    }

    pub fn point_callback(&self) -> Option<&PointCallback> {
        match self.hints.get(&DecodeHintType::NeedResultPointCallback) {
            Some(HintValue::PointCallback(cb)) => Some(cb),
            _ => None,
        }
    }

    /// Reports a point to the callback hint, if any is installed.
    pub fn report_point(&self, pt: ResultPoint) {
        if let Some(cb) = self.point_callback() {
            cb.found(pt);
        }
    }
}

/// Resolves a WHATWG encoding label such as `"utf-8"`, `"ISO-8859-1"` or `"Shift_JIS"`.
pub fn resolve_character_set(label: &str) -> ScanResult<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ScanError::UnknownCharacterSet(label.to_string()))
}
