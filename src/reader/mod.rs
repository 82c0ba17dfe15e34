pub mod binarize;
pub mod engine;
pub mod luminance;
pub mod multi;
pub mod multi_format;
pub mod notify;
pub mod options;
pub mod orientation;
pub mod qr;

use std::sync::Arc;

use image::DynamicImage;
use tracing::{debug, debug_span, trace};

use crate::common::{
    error::{ScanError, ScanResult},
    format::BarcodeFormat,
    hints::PointCallback,
    result::{DecodeResult, ResultPoint},
};
use binarize::{Binarizer, BinaryImage, HybridBinarizer};
use engine::{select_engine, EngineChoice, MultipleReader, Reader};
use luminance::{dynamic_image_source, GrayLuminanceSource, LuminanceSource, RawFormat};
use multi::GenericMultipleReader;
use multi_format::MultiFormatReader;
use notify::{Detached, Registry, SubscriptionId};
use options::DecodeOptions;
use orientation::reconcile_orientation;
use qr::RqrrReader;

pub type LuminanceFactory<I> = Box<dyn Fn(&I) -> ScanResult<Box<dyn LuminanceSource>> + Send>;
type ResultListener = Box<dyn FnMut(&DecodeResult) + Send>;
type PointListener = Arc<dyn Fn(ResultPoint) + Send + Sync>;

const MAX_ROTATIONS: u32 = 4;

// Barcode reader
// Drives an engine through rotations and inversions of the image until a symbol turns up:
//   for each quarter turn (only the first unless auto rotating):
//     binarize -> decode -> if nothing, invert + binarize -> decode
//     stop on a hit, or if the view can't rotate; otherwise rotate 90deg counter-clockwise
// then records the rotation in the result's orientation and notifies listeners.
//
// Engines that keep state may skip their setup on the next decode, but only while nothing in
// the options changed since a fresh decode succeeded. Every mutator below invalidates that.
//------------------------------------------------------------------------------

pub struct BarcodeReader<I = DynamicImage> {
    reader: Box<dyn Reader>,
    multi_reader: Box<dyn MultipleReader>,
    binarizer: Box<dyn Binarizer>,
    create_luminance: Option<LuminanceFactory<I>>,
    options: DecodeOptions,
    state_valid: bool,
    result_listeners: Registry<ResultListener>,
    point_listeners: Registry<PointListener>,
}

impl BarcodeReader<DynamicImage> {
    /// Reader over [`DynamicImage`] with the bundled engines and the hybrid binarizer.
    pub fn new() -> Self {
        Self::builder().luminance(dynamic_image_source).build()
    }
}

impl Default for BarcodeReader<DynamicImage> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> BarcodeReader<I> {
    pub fn builder() -> BarcodeReaderBuilder<I> {
        BarcodeReaderBuilder::new()
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    // Decoding
    //--------------------------------------------------------------------------

    /// Decodes a single symbol. `Ok(None)` if no transform of the image yields one.
    pub fn decode(&mut self, img: &I) -> ScanResult<Option<DecodeResult>> {
        let src = self.create_source(img)?;
        self.decode_source(src)
    }

    pub fn decode_raw(
        &mut self,
        data: &[u8],
        width: u32,
        height: u32,
        format: RawFormat,
    ) -> ScanResult<Option<DecodeResult>> {
        let src = GrayLuminanceSource::from_raw(data, width, height, format)?;
        self.decode_source(Box::new(src))
    }

    pub fn decode_source(
        &mut self,
        src: Box<dyn LuminanceSource>,
    ) -> ScanResult<Option<DecodeResult>> {
        check_dimensions(src.as_ref())?;
        let _span = debug_span!("decode", w = src.width(), h = src.height()).entered();

        let found = self.rotate_and_retry(src, Self::decode_binary)?;
        let Some((mut res, rotation_count)) = found else {
            debug!("No symbol found");
            return Ok(None);
        };

        reconcile_orientation(&mut res, rotation_count);
        debug!(format = %res.format(), rotation_count, "Symbol found");
        self.raise_result_found(&res);
        Ok(Some(res))
    }

    /// Decodes every symbol. `Ok(None)` if no transform of the image yields any.
    pub fn decode_multiple(&mut self, img: &I) -> ScanResult<Option<Vec<DecodeResult>>> {
        let src = self.create_source(img)?;
        self.decode_multiple_source(src)
    }

    pub fn decode_multiple_raw(
        &mut self,
        data: &[u8],
        width: u32,
        height: u32,
        format: RawFormat,
    ) -> ScanResult<Option<Vec<DecodeResult>>> {
        let src = GrayLuminanceSource::from_raw(data, width, height, format)?;
        self.decode_multiple_source(Box::new(src))
    }

    pub fn decode_multiple_source(
        &mut self,
        src: Box<dyn LuminanceSource>,
    ) -> ScanResult<Option<Vec<DecodeResult>>> {
        check_dimensions(src.as_ref())?;
        let _span = debug_span!("decode_multiple", w = src.width(), h = src.height()).entered();

        let found = self.rotate_and_retry(src, Self::decode_multiple_binary)?;
        let Some((mut results, rotation_count)) = found else {
            debug!("No symbols found");
            return Ok(None);
        };

        results.iter_mut().for_each(|res| reconcile_orientation(res, rotation_count));
        debug!(count = results.len(), rotation_count, "Symbols found");
        results.iter().for_each(|res| self.raise_result_found(res));
        Ok(Some(results))
    }

    fn create_source(&self, img: &I) -> ScanResult<Box<dyn LuminanceSource>> {
        let create = self.create_luminance.as_ref().ok_or(ScanError::MissingLuminanceSource)?;
        create(img)
    }

    /// Runs `attempt` over the image, its inversion and, when auto rotating, its quarter turns.
    /// Returns the first hit with the number of rotations applied before it.
    fn rotate_and_retry<T, F>(
        &mut self,
        mut src: Box<dyn LuminanceSource>,
        mut attempt: F,
    ) -> ScanResult<Option<(T, u32)>>
    where
        F: FnMut(&mut Self, &BinaryImage) -> ScanResult<Option<T>>,
    {
        if self.options.sync_rotation_hint() {
            self.invalidate_state();
        }
        let auto_rotate = self.options.auto_rotate();
        let rotation_max = if auto_rotate { MAX_ROTATIONS } else { 1 };

        let mut rotation_count = 0;
        loop {
            trace!(rotation_count, "Decoding");
            let bin = self.binarizer.binarize(src.as_ref());
            let mut found = attempt(self, &bin)?;

            if found.is_none() && self.options.try_inverted() && src.is_inversion_supported() {
                trace!(rotation_count, "Decoding inverted");
                let inverted = src.invert()?;
                let bin = self.binarizer.binarize(inverted.as_ref());
                found = attempt(self, &bin)?;
            }

            if let Some(found) = found {
                return Ok(Some((found, rotation_count)));
            }
            if !auto_rotate || !src.is_rotate_supported() || rotation_count + 1 >= rotation_max {
                return Ok(None);
            }

            src = src.rotate_counter_clockwise()?;
            rotation_count += 1;
        }
    }

    fn decode_binary(&mut self, bin: &BinaryImage) -> ScanResult<Option<DecodeResult>> {
        if self.state_valid {
            if let Some(stateful) = self.reader.stateful() {
                trace!("Reusing engine state");
                return stateful.decode_with_state(bin);
            }
        }

        // State only becomes reusable once a fresh decode succeeds with the current options
        self.state_valid = false;
        let res = self.reader.decode(bin, self.options.hints())?;
        self.state_valid = res.is_some();
        Ok(res)
    }

    fn decode_multiple_binary(&mut self, bin: &BinaryImage) -> ScanResult<Option<Vec<DecodeResult>>> {
        let hints = self.options.hints();
        let results = match select_engine(hints.possible_formats()) {
            EngineChoice::Specialized => self.multi_reader.decode_multiple(bin, hints)?,
            EngineChoice::Generic => {
                GenericMultipleReader::new(self.reader.as_mut()).decode_multiple(bin, hints)?
            }
        };
        Ok(results.filter(|r| !r.is_empty()))
    }

    // Options
    //--------------------------------------------------------------------------

    fn invalidate_state(&mut self) {
        if self.state_valid {
            trace!("Engine state invalidated");
        }
        self.state_valid = false;
    }

    pub fn set_auto_rotate(&mut self, on: bool) {
        self.options.set_auto_rotate(on);
        self.invalidate_state();
    }

    pub fn set_try_inverted(&mut self, on: bool) {
        self.options.set_try_inverted(on);
        self.invalidate_state();
    }

    pub fn set_possible_formats(&mut self, formats: &[BarcodeFormat]) {
        self.options.set_possible_formats(formats);
        self.invalidate_state();
    }

    pub fn set_try_harder(&mut self, on: bool) {
        self.options.set_try_harder(on);
        self.invalidate_state();
    }

    pub fn set_pure_barcode(&mut self, on: bool) {
        self.options.set_pure_barcode(on);
        self.invalidate_state();
    }

    pub fn set_assume_gs1(&mut self, on: bool) {
        self.options.set_assume_gs1(on);
        self.invalidate_state();
    }

    pub fn set_character_set(&mut self, label: Option<&str>) -> ScanResult<()> {
        self.options.set_character_set(label)?;
        self.invalidate_state();
        Ok(())
    }

    /// Arbitrary changes to the options, hints included.
    pub fn configure<F>(&mut self, f: F)
    where
        F: FnOnce(&mut DecodeOptions),
    {
        f(&mut self.options);
        self.invalidate_state();
    }

    /// Drops any state the engine retained.
    pub fn reset(&mut self) {
        self.reader.reset();
        self.invalidate_state();
    }

    // Notifications
    //--------------------------------------------------------------------------

    /// Calls `f` with every decoded result, after its orientation is settled.
    pub fn on_result_found<F>(&mut self, f: F) -> SubscriptionId
    where
        F: FnMut(&DecodeResult) + Send + 'static,
    {
        self.result_listeners.attach(Box::new(f)).0
    }

    pub fn remove_result_found(&mut self, id: SubscriptionId) -> bool {
        self.result_listeners.detach(id) != Detached::Unknown
    }

    /// Calls `f` whenever the engine reports an interest point during a decode.
    pub fn on_result_point<F>(&mut self, f: F) -> SubscriptionId
    where
        F: Fn(ResultPoint) + Send + Sync + 'static,
    {
        let (id, first) = self.point_listeners.attach(Arc::new(f));
        if first {
            debug!("Attaching result point callback");
        }
        self.install_point_dispatcher();
        id
    }

    pub fn remove_result_point(&mut self, id: SubscriptionId) -> bool {
        match self.point_listeners.detach(id) {
            Detached::Unknown => false,
            Detached::Removed => {
                self.install_point_dispatcher();
                true
            }
            Detached::RemovedLast => {
                debug!("Detaching result point callback");
                self.options.set_point_callback(None);
                self.reader.reset();
                self.invalidate_state();
                true
            }
        }
    }

    pub fn has_result_point_listeners(&self) -> bool {
        !self.point_listeners.is_empty()
    }

    // The hint holds a snapshot of the listeners, so it is rebuilt on every change. Engines
    // drop the old hint, and with it any listener removed since.
    fn install_point_dispatcher(&mut self) {
        let listeners = self.point_listeners.iter().cloned().collect::<Vec<_>>();
        let dispatch = PointCallback::new(move |pt| listeners.iter().for_each(|l| l(pt)));
        self.options.set_point_callback(Some(dispatch));
        self.reader.reset();
        self.invalidate_state();
    }

    fn raise_result_found(&mut self, res: &DecodeResult) {
        self.result_listeners.iter_mut().for_each(|l| l(res));
    }
}

fn check_dimensions(src: &dyn LuminanceSource) -> ScanResult<()> {
    if src.width() == 0 || src.height() == 0 {
        return Err(ScanError::EmptyImage);
    }
    Ok(())
}

// Builder
//------------------------------------------------------------------------------

pub struct BarcodeReaderBuilder<I> {
    reader: Option<Box<dyn Reader>>,
    multi_reader: Option<Box<dyn MultipleReader>>,
    binarizer: Option<Box<dyn Binarizer>>,
    create_luminance: Option<LuminanceFactory<I>>,
    options: DecodeOptions,
}

impl<I> Default for BarcodeReaderBuilder<I> {
    fn default() -> Self {
        Self {
            reader: None,
            multi_reader: None,
            binarizer: None,
            create_luminance: None,
            options: DecodeOptions::default(),
        }
    }
}

impl<I> BarcodeReaderBuilder<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single symbol engine. Defaults to [`MultiFormatReader::with_default_engines`].
    pub fn reader<R: Reader + 'static>(mut self, reader: R) -> Self {
        self.reader = Some(Box::new(reader));
        self
    }

    /// Engine for multi symbol decodes restricted to QR codes. Defaults to [`RqrrReader`].
    pub fn multi_reader<R: MultipleReader + 'static>(mut self, reader: R) -> Self {
        self.multi_reader = Some(Box::new(reader));
        self
    }

    /// Defaults to [`HybridBinarizer`].
    pub fn binarizer<B: Binarizer + 'static>(mut self, binarizer: B) -> Self {
        self.binarizer = Some(Box::new(binarizer));
        self
    }

    /// Converts caller images into luminance. Without one, [`BarcodeReader::decode`] fails with
    /// [`ScanError::MissingLuminanceSource`].
    pub fn luminance<F>(mut self, create: F) -> Self
    where
        F: Fn(&I) -> ScanResult<Box<dyn LuminanceSource>> + Send + 'static,
    {
        self.create_luminance = Some(Box::new(create));
        self
    }

    pub fn options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> BarcodeReader<I> {
        let mut options = self.options;
        options.sync_rotation_hint();

        BarcodeReader {
            reader: self.reader.unwrap_or_else(|| Box::new(MultiFormatReader::with_default_engines())),
            multi_reader: self.multi_reader.unwrap_or_else(|| Box::new(RqrrReader::new())),
            binarizer: self.binarizer.unwrap_or_else(|| Box::new(HybridBinarizer)),
            create_luminance: self.create_luminance,
            options,
            state_valid: false,
            result_listeners: Registry::new(),
            point_listeners: Registry::new(),
        }
    }
}
