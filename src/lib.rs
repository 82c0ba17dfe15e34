//! # scanrig
//!
//! Drives barcode decoding engines through rotations and inversions of an image until a symbol
//! is found, reconciles the orientation the symbol was found in, and notifies observers.
//!
//! ## Features
//!
//! - **Retry policy**: Up to four quarter turns and an inverted pass per turn, stopping at the
//!   first hit
//! - **Engine state reuse**: Stateful engines skip their setup while the options are unchanged
//! - **Orientation metadata**: Rotations applied by the reader are composed with any rotation
//!   the engine detected on its own
//! - **Multi symbol decoding**: Dedicated QR engine when only QR codes are wanted, otherwise a
//!   generic engine searching the regions around every found symbol
//! - **Observers**: Result found and interest point found notifications
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scanrig::BarcodeReader;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::open("qr_code.png")?;
//!
//! let mut reader = BarcodeReader::new();
//! reader.set_auto_rotate(true);
//! reader.set_try_inverted(true);
//!
//! if let Some(res) = reader.decode(&img)? {
//!     println!("{}: {} (rotated {:?}deg)", res.format(), res.text(), res.orientation());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Observing decodes
//!
//! ```rust,no_run
//! use scanrig::{BarcodeFormat, BarcodeReader};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::open("shelf.png")?;
//!
//! let mut reader = BarcodeReader::new();
//! reader.set_possible_formats(&[BarcodeFormat::QrCode]);
//! reader.on_result_point(|pt| println!("Interest point at {}, {}", pt.x, pt.y));
//! reader.on_result_found(|res| println!("Found {}", res.text()));
//!
//! let all = reader.decode_multiple(&img)?.unwrap_or_default();
//! println!("{} symbols", all.len());
//! # Ok(())
//! # }
//! ```
//!
//! ### Custom engines
//!
//! Anything implementing [`Reader`] can be plugged in. Engines that retain state between calls
//! also implement [`StatefulReader`] and return themselves from [`Reader::stateful`].
//!
//! ```rust
//! use scanrig::{
//!     BarcodeFormat, BarcodeReader, BinaryImage, DecodeHints, DecodeResult, Reader, ScanResult,
//! };
//!
//! struct AlwaysEmpty;
//!
//! impl Reader for AlwaysEmpty {
//!     fn decode(&mut self, _img: &BinaryImage, _hints: &DecodeHints) -> ScanResult<Option<DecodeResult>> {
//!         Ok(None)
//!     }
//! }
//!
//! let mut reader = BarcodeReader::<image::GrayImage>::builder()
//!     .reader(AlwaysEmpty)
//!     .luminance(scanrig::reader::luminance::gray_image_source)
//!     .build();
//! let img = image::GrayImage::new(16, 16);
//! assert!(reader.decode(&img).unwrap().is_none());
//! ```

pub mod common;
pub mod reader;

pub use common::*;
pub use reader::{
    binarize::{Binarizer, BinaryImage, HybridBinarizer, OtsuBinarizer},
    engine::{select_engine, EngineChoice, MultipleReader, Reader, StatefulReader},
    luminance::{GrayLuminanceSource, LuminanceSource, RawFormat},
    multi::GenericMultipleReader,
    multi_format::MultiFormatReader,
    notify::SubscriptionId,
    options::DecodeOptions,
    orientation::reconcile_orientation,
    qr::RqrrReader,
    BarcodeReader, BarcodeReaderBuilder,
};
