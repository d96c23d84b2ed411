//! # Label Document Model
//!
//! Items as the editor hands them to the render pipeline. The pipeline
//! reads them immutably per render.
//!
//! ## Modules
//!
//! - [`item`]: `LabelItem` and the per-kind content types
//! - [`params`]: `{{name}}` placeholder substitution for batch printing
//!
//! ## Fast Path
//!
//! Only a restricted subset of labels may be rendered by the parallel
//! worker pool: text, QR and barcode items, flow positioning, no rotation.
//! [`check_fast_path`] enforces that; everything else goes through the
//! single-threaded renderer.

pub mod item;
pub mod params;

pub use item::{
    BarcodeFormat, BarcodeItem, ImageItem, ImageSource, ItemKind, LabelItem, Orientation,
    Positioning, QrEcLevel, QrItem, ShapeItem, ShapeKind, TextItem,
};
pub use params::{ParameterValues, apply_parameters, substitute};

use crate::error::LabelError;

/// Verify that every item is eligible for the parallel fast path.
///
/// ```
/// use labelpress::label::{check_fast_path, LabelItem, ShapeKind};
///
/// assert!(check_fast_path(&[LabelItem::text("ok", 20.0)]).is_ok());
/// assert!(check_fast_path(&[LabelItem::shape(ShapeKind::Rectangle, 10, 10)]).is_err());
/// ```
pub fn check_fast_path(items: &[LabelItem]) -> Result<(), LabelError> {
    for (index, item) in items.iter().enumerate() {
        match item.kind {
            ItemKind::Text(_) | ItemKind::Qr(_) | ItemKind::Barcode(_) => {}
            ref other => {
                return Err(LabelError::UnsupportedLayout(format!(
                    "item {} is {}",
                    index,
                    other.name()
                )));
            }
        }
        if item.position != Positioning::Flow {
            return Err(LabelError::UnsupportedLayout(format!(
                "item {} uses absolute positioning",
                index
            )));
        }
        if item.rotation_degrees != 0.0 {
            return Err(LabelError::UnsupportedLayout(format!(
                "item {} is rotated {} degrees",
                index, item.rotation_degrees
            )));
        }
    }
    Ok(())
}
