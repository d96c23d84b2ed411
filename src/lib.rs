//! # Labelpress - Label Layout and Raster Pipeline
//!
//! Labelpress turns an ordered list of label items (text, QR codes,
//! barcodes, images, shapes) into a monochrome page sized for a tape
//! cassette, and packs that page into PackBits-compressed raster lines for
//! the printer. It provides:
//!
//! - **Flow layout**: items placed one after another along the tape, centered
//!   across it, text shrunk to fit
//! - **Compositing**: a white page with cached QR, barcode and image rasters
//! - **Monochrome conversion**: threshold, ordered and Floyd-Steinberg
//! - **Batch rendering**: a worker pool that keeps page order and survives
//!   lost contexts
//! - **Protocol boundary**: byte-exact PackBits line encoding
//!
//! ## Quick Start
//!
//! ```
//! use labelpress::{
//!     label::{BarcodeFormat, LabelItem},
//!     printer::{MediaProfile, ResolutionProfile},
//!     protocol::raster,
//!     render::{LabelRenderer, LayoutOptions},
//! };
//!
//! let items = vec![
//!     LabelItem::text("SKU A-17", 24.0),
//!     LabelItem::barcode("A-17", BarcodeFormat::Code128, 120, 40),
//! ];
//!
//! let mut renderer = LabelRenderer::builtin();
//! let page = renderer.render(
//!     &items,
//!     MediaProfile::by_id("tze-12")?,
//!     ResolutionProfile::LOW,
//!     &LayoutOptions::default(),
//! );
//!
//! let lines = raster::encode_page(&page)?;
//! assert_eq!(lines.len(), page.width as usize);
//! # Ok::<(), labelpress::LabelError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`label`] | Item model, parameter substitution, fast-path check |
//! | [`printer`] | Media and resolution catalogs |
//! | [`render`] | Layout, compositing, dithering, caches |
//! | [`protocol`] | PackBits and raster line packing |
//! | [`pool`] | Parallel page rendering |
//! | [`batch`] | Pool vs. single-threaded routing for print jobs |
//! | [`error`] | Error types |

pub mod batch;
pub mod error;
pub mod label;
pub mod pool;
pub mod printer;
pub mod protocol;
pub mod render;

pub use error::LabelError;
