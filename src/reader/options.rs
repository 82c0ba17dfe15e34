use crate::common::{
    error::ScanResult,
    format::BarcodeFormat,
    hints::{resolve_character_set, DecodeHintType, DecodeHints, HintValue, PointCallback},
};

// Decode options
//------------------------------------------------------------------------------

/// Everything the reader and its engines are configured with. Engine facing settings live in
/// the hint set; `auto_rotate` and `try_inverted` steer the reader's own retry loop.
///
/// Mutating options through [`BarcodeReader`](super::BarcodeReader) invalidates any engine
/// state retained from earlier decodes.
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    hints: DecodeHints,
    auto_rotate: bool,
    try_inverted: bool,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hints(&self) -> &DecodeHints {
        &self.hints
    }

    pub fn hints_mut(&mut self) -> &mut DecodeHints {
        &mut self.hints
    }

    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    pub fn try_inverted(&self) -> bool {
        self.try_inverted
    }

    pub fn possible_formats(&self) -> &[BarcodeFormat] {
        self.hints.possible_formats()
    }

    pub fn try_harder(&self) -> bool {
        self.hints.flag(DecodeHintType::TryHarder)
    }

    pub fn pure_barcode(&self) -> bool {
        self.hints.flag(DecodeHintType::PureBarcode)
    }

    pub fn assume_gs1(&self) -> bool {
        self.hints.flag(DecodeHintType::AssumeGs1)
    }

    pub fn character_set(&self) -> Option<&'static str> {
        self.hints.character_set().map(|enc| enc.name())
    }

    /// Rotating in the reader makes rotation searches inside engines redundant.
    pub fn set_auto_rotate(&mut self, on: bool) {
        self.auto_rotate = on;
        self.sync_rotation_hint();
    }

    pub fn set_try_inverted(&mut self, on: bool) {
        self.try_inverted = on;
    }

    /// Empty slice lifts the restriction.
    pub fn set_possible_formats(&mut self, formats: &[BarcodeFormat]) {
        if formats.is_empty() {
            self.hints.remove(DecodeHintType::PossibleFormats);
        } else {
            self.hints.insert(DecodeHintType::PossibleFormats, HintValue::Formats(formats.to_vec()));
        }
    }

    pub fn set_try_harder(&mut self, on: bool) {
        self.hints.set_flag(DecodeHintType::TryHarder, on);
    }

    pub fn set_pure_barcode(&mut self, on: bool) {
        self.hints.set_flag(DecodeHintType::PureBarcode, on);
    }

    pub fn set_assume_gs1(&mut self, on: bool) {
        self.hints.set_flag(DecodeHintType::AssumeGs1, on);
    }

    /// Takes an encoding label like `"UTF-8"` or `"Shift_JIS"`; `None` clears the hint.
    pub fn set_character_set(&mut self, label: Option<&str>) -> ScanResult<()> {
        match label {
            Some(label) => {
                let enc = resolve_character_set(label)?;
                self.hints.insert(DecodeHintType::CharacterSet, HintValue::CharacterSet(enc));
            }
            None => {
                self.hints.remove(DecodeHintType::CharacterSet);
            }
        }
        Ok(())
    }

    pub(crate) fn set_point_callback(&mut self, cb: Option<PointCallback>) {
        match cb {
            Some(cb) => {
                self.hints.insert(DecodeHintType::NeedResultPointCallback, HintValue::PointCallback(cb));
            }
            None => {
                self.hints.remove(DecodeHintType::NeedResultPointCallback);
            }
        }
    }

    /// Brings the rotation hint in line with `auto_rotate`. Returns whether the hint set changed.
    /// Without auto rotate the key is absent, whatever value a caller may have put under it.
    pub(crate) fn sync_rotation_hint(&mut self) -> bool {
        let key = DecodeHintType::TryHarderWithoutRotation;
        if self.auto_rotate {
            if self.hints.flag(key) {
                return false;
            }
            self.hints.set_flag(key, true);
            true
        } else {
            self.hints.remove(key).is_some()
        }
    }
}

#[cfg(test)]
mod options_tests {
    use super::DecodeOptions;
    use crate::{BarcodeFormat, DecodeHintType, HintValue, ScanError};

    #[test]
    fn test_auto_rotate_toggles_hint() {
        let mut opts = DecodeOptions::new();
        assert!(!opts.hints().contains(DecodeHintType::TryHarderWithoutRotation));

        opts.set_auto_rotate(true);
        assert!(opts.hints().flag(DecodeHintType::TryHarderWithoutRotation));

        opts.set_auto_rotate(false);
        assert!(!opts.hints().contains(DecodeHintType::TryHarderWithoutRotation));
    }

    #[test]
    fn test_sync_rotation_hint_reports_change() {
        let mut opts = DecodeOptions::new();
        opts.set_auto_rotate(true);
        assert!(!opts.sync_rotation_hint());

        opts.hints_mut().remove(DecodeHintType::TryHarderWithoutRotation);
        assert!(opts.sync_rotation_hint());
        assert!(opts.hints().flag(DecodeHintType::TryHarderWithoutRotation));
    }

    #[test]
    fn test_sync_rotation_hint_drops_stray_flag() {
        let mut opts = DecodeOptions::new();
        opts.hints_mut().insert(DecodeHintType::TryHarderWithoutRotation, HintValue::Flag(false));
        assert!(opts.hints().contains(DecodeHintType::TryHarderWithoutRotation));

        assert!(opts.sync_rotation_hint());
        assert!(!opts.hints().contains(DecodeHintType::TryHarderWithoutRotation));
        assert!(!opts.sync_rotation_hint());

        // Explicit false under auto rotate gets flipped on
        opts.set_auto_rotate(true);
        opts.hints_mut().insert(DecodeHintType::TryHarderWithoutRotation, HintValue::Flag(false));
        assert!(opts.sync_rotation_hint());
        assert!(opts.hints().flag(DecodeHintType::TryHarderWithoutRotation));
    }

    #[test]
    fn test_possible_formats() {
        let mut opts = DecodeOptions::new();
        opts.set_possible_formats(&[BarcodeFormat::QrCode, BarcodeFormat::Ean13]);
        assert_eq!(opts.possible_formats(), &[BarcodeFormat::QrCode, BarcodeFormat::Ean13]);
        opts.set_possible_formats(&[]);
        assert!(!opts.hints().contains(DecodeHintType::PossibleFormats));
    }

    #[test]
    fn test_character_set() {
        let mut opts = DecodeOptions::new();
        opts.set_character_set(Some("utf8")).unwrap();
        assert_eq!(opts.character_set(), Some("UTF-8"));

        let err = opts.set_character_set(Some("no-such-charset")).unwrap_err();
        assert!(matches!(err, ScanError::UnknownCharacterSet(_)));
        // Failed update leaves the previous value
        assert_eq!(opts.character_set(), Some("UTF-8"));

        opts.set_character_set(None).unwrap();
        assert_eq!(opts.character_set(), None);
    }

    #[test]
    fn test_flags() {
        let mut opts = DecodeOptions::new();
        opts.set_try_harder(true);
        opts.set_pure_barcode(true);
        opts.set_assume_gs1(true);
        assert!(opts.try_harder() && opts.pure_barcode() && opts.assume_gs1());
        opts.set_try_harder(false);
        assert!(!opts.try_harder());
    }
}
