//! # Printer Protocol Boundary
//!
//! The render pipeline ends with a page surface. This module turns that
//! surface into the compressed raster lines a tape printer's wire protocol
//! carries. Command framing and transport live outside this crate.
//!
//! ## Module Structure
//!
//! - [`packbits`]: PackBits run-length encoder (byte-exact)
//! - [`raster`]: page → head-width bit rows → PackBits lines
//!
//! ## Usage Example
//!
//! ```
//! use labelpress::label::LabelItem;
//! use labelpress::printer::{MediaProfile, ResolutionProfile};
//! use labelpress::protocol::raster;
//! use labelpress::render::{LabelRenderer, LayoutOptions};
//!
//! let mut renderer = LabelRenderer::builtin();
//! let page = renderer.render(
//!     &[LabelItem::qr("https://example.com", 60)],
//!     MediaProfile::TZE_12,
//!     ResolutionProfile::LOW,
//!     &LayoutOptions::default(),
//! );
//!
//! let lines = raster::encode_page(&page)?;
//! assert_eq!(lines.len(), page.width as usize);
//! # Ok::<(), labelpress::error::LabelError>(())
//! ```

pub mod packbits;
pub mod raster;
