use tracing::debug;

use super::{
    binarize::BinaryImage,
    engine::{Reader, StatefulReader},
    qr::RqrrReader,
};
use crate::common::{
    error::ScanResult,
    format::BarcodeFormat,
    hints::{DecodeHintType, DecodeHints},
    result::DecodeResult,
};

// Multi format reader
// Routes a decode to every registered engine serving one of the requested formats, first hit
// wins. The filtered engine list and the hints are kept, so a following decode_with_state skips
// the setup. Linear engines go first unless trying harder, in which case the slower 2D engines
// get the first look.
//------------------------------------------------------------------------------

struct Engine {
    formats: Vec<BarcodeFormat>,
    reader: Box<dyn Reader>,
}

impl Engine {
    fn is_linear(&self) -> bool {
        self.formats.iter().all(|f| f.is_linear())
    }
}

#[derive(Default)]
pub struct MultiFormatReader {
    engines: Vec<Engine>,
    active: Vec<usize>,
    hints: DecodeHints,
    primed: bool,
}

impl MultiFormatReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engines bundled with the crate: QR codes through rqrr.
    pub fn with_default_engines() -> Self {
        Self::new().with_reader(&[BarcodeFormat::QrCode], RqrrReader::new())
    }

    pub fn with_reader<R: Reader + 'static>(mut self, formats: &[BarcodeFormat], reader: R) -> Self {
        self.register(formats, Box::new(reader));
        self
    }

    pub fn register(&mut self, formats: &[BarcodeFormat], reader: Box<dyn Reader>) {
        self.engines.push(Engine { formats: formats.to_vec(), reader });
        self.primed = false;
    }

    pub fn supported_formats(&self) -> Vec<BarcodeFormat> {
        let mut formats = self.engines.iter().flat_map(|e| e.formats.iter().copied()).collect::<Vec<_>>();
        formats.sort();
        formats.dedup();
        formats
    }

    /// Picks the engines for the requested formats and remembers the hints for later stateful
    /// decodes.
    pub fn set_hints(&mut self, hints: &DecodeHints) {
        let wanted = hints.possible_formats();
        let mut active = self
            .engines
            .iter()
            .enumerate()
            .filter(|(_, e)| wanted.is_empty() || e.formats.iter().any(|f| wanted.contains(f)))
            .map(|(i, _)| i)
            .collect::<Vec<_>>();

        let try_harder = hints.flag(DecodeHintType::TryHarder);
        // Stable sort keeps registration order within each group
        active.sort_by_key(|&i| self.engines[i].is_linear() == try_harder);

        debug!(engines = active.len(), try_harder, "Multi format reader set up");
        self.active = active;
        self.hints = hints.clone();
        self.primed = true;
    }

    fn decode_internal(&mut self, img: &BinaryImage) -> ScanResult<Option<DecodeResult>> {
        let Self { engines, active, hints, .. } = self;
        for &i in active.iter() {
            if let Some(res) = engines[i].reader.decode(img, hints)? {
                return Ok(Some(res));
            }
        }
        Ok(None)
    }
}

impl Reader for MultiFormatReader {
    fn decode(&mut self, img: &BinaryImage, hints: &DecodeHints) -> ScanResult<Option<DecodeResult>> {
        self.set_hints(hints);
        self.decode_internal(img)
    }

    fn stateful(&mut self) -> Option<&mut dyn StatefulReader> {
        Some(self)
    }

    /// Forgets the stored hints along with every engine's own state.
    fn reset(&mut self) {
        self.engines.iter_mut().for_each(|e| e.reader.reset());
        self.active.clear();
        self.hints = DecodeHints::new();
        self.primed = false;
    }
}

impl StatefulReader for MultiFormatReader {
    fn decode_with_state(&mut self, img: &BinaryImage) -> ScanResult<Option<DecodeResult>> {
        if !self.primed {
            self.set_hints(&DecodeHints::new());
        }
        self.decode_internal(img)
    }
}

#[cfg(test)]
mod multi_format_tests {
    use std::sync::{Arc, Mutex};

    use super::MultiFormatReader;
    use crate::{
        reader::{binarize::BinaryImage, engine::Reader},
        BarcodeFormat, DecodeHintType, DecodeHints, DecodeResult, HintValue, PointCallback,
        ScanResult,
    };

    // Logs its name on every call and finds a symbol if told to
    struct Named {
        name: &'static str,
        hit: bool,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Reader for Named {
        fn decode(
            &mut self,
            _img: &BinaryImage,
            _hints: &DecodeHints,
        ) -> ScanResult<Option<DecodeResult>> {
            self.log.lock().unwrap().push(self.name);
            Ok(self.hit.then(|| DecodeResult::new(self.name, BarcodeFormat::QrCode, vec![])))
        }
    }

    fn setup(log: &Arc<Mutex<Vec<&'static str>>>) -> MultiFormatReader {
        let named = |name, hit| Named { name, hit, log: Arc::clone(log) };
        MultiFormatReader::new()
            .with_reader(&[BarcodeFormat::QrCode], named("qr", false))
            .with_reader(&[BarcodeFormat::Ean13, BarcodeFormat::UpcA], named("ean", false))
            .with_reader(&[BarcodeFormat::DataMatrix], named("dm", true))
    }

    fn formats(f: &[BarcodeFormat]) -> DecodeHints {
        let mut hints = DecodeHints::new();
        hints.insert(DecodeHintType::PossibleFormats, HintValue::Formats(f.to_vec()));
        hints
    }

    #[test]
    fn test_linear_first_by_default() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut reader = setup(&log);
        let res = reader.decode(&BinaryImage::new(1, 1), &DecodeHints::new()).unwrap();
        assert_eq!(res.unwrap().text(), "dm");
        assert_eq!(*log.lock().unwrap(), vec!["ean", "qr", "dm"]);
    }

    #[test]
    fn test_2d_first_when_trying_harder() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut reader = setup(&log);
        let mut hints = DecodeHints::new();
        hints.set_flag(DecodeHintType::TryHarder, true);
        reader.decode(&BinaryImage::new(1, 1), &hints).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["qr", "dm"]);
    }

    #[test]
    fn test_filters_by_possible_formats() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut reader = setup(&log);
        let res = reader.decode(&BinaryImage::new(1, 1), &formats(&[BarcodeFormat::UpcA])).unwrap();
        assert!(res.is_none());
        assert_eq!(*log.lock().unwrap(), vec!["ean"]);
    }

    #[test]
    fn test_state_reuses_filtered_engines() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut reader = setup(&log);
        let img = BinaryImage::new(1, 1);
        reader.decode(&img, &formats(&[BarcodeFormat::QrCode])).unwrap();

        let stateful = reader.stateful().unwrap();
        stateful.decode_with_state(&img).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["qr", "qr"]);
    }

    #[test]
    fn test_state_without_prior_decode() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut reader = setup(&log);
        let res = reader.stateful().unwrap().decode_with_state(&BinaryImage::new(1, 1)).unwrap();
        assert_eq!(res.unwrap().text(), "dm");
    }

    #[test]
    fn test_reset_drops_stored_hints() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut reader = setup(&log);
        let token = Arc::new(());
        let held = Arc::clone(&token);

        let mut hints = formats(&[BarcodeFormat::QrCode]);
        hints.insert(
            DecodeHintType::NeedResultPointCallback,
            HintValue::PointCallback(PointCallback::new(move |_| {
                let _ = &held;
            })),
        );
        reader.decode(&BinaryImage::new(1, 1), &hints).unwrap();
        drop(hints);
        assert_eq!(Arc::strong_count(&token), 2);

        reader.reset();
        assert_eq!(Arc::strong_count(&token), 1);

        // Stateful decode after a reset sets up for every format again
        log.lock().unwrap().clear();
        let res = reader.stateful().unwrap().decode_with_state(&BinaryImage::new(1, 1)).unwrap();
        assert_eq!(res.unwrap().text(), "dm");
        assert_eq!(*log.lock().unwrap(), vec!["ean", "qr", "dm"]);
    }

    #[test]
    fn test_supported_formats() {
        let log = Arc::new(Mutex::new(Vec::new()));
        assert_eq!(
            setup(&log).supported_formats(),
            vec![BarcodeFormat::DataMatrix, BarcodeFormat::Ean13, BarcodeFormat::QrCode, BarcodeFormat::UpcA]
        );
    }
}
