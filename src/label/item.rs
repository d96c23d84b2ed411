//! Label item types for the editor document model.
//!
//! All types derive `Serialize + Deserialize` so the same types work for
//! both Rust API construction and the JSON the editor hands over.
//!
//! ```json
//! { "kind": "text", "content": "Hello {{name}}", "font_size": 24, "y_offset": 2 }
//! { "kind": "qr", "data": "https://example.com", "size": 60 }
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::render::dither::DitherOptions;

fn default_font() -> String {
    "spleen".to_string()
}

fn default_font_size() -> f32 {
    24.0
}

fn default_stroke() -> u32 {
    2
}

/// How an item is placed on the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Positioning {
    /// Placed at the flow cursor, offsets are relative to it.
    #[default]
    Flow,
    /// Placed at its offsets from the page origin; does not advance the cursor.
    Absolute,
}

/// Direction items are laid out in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Flow along x (tape feed), cross axis is y.
    #[default]
    Horizontal,
    /// Flow along y, cross axis is x.
    Vertical,
}

/// One placed object on a label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelItem {
    /// Horizontal offset in dots
    #[serde(default)]
    pub x_offset: i32,
    /// Vertical offset in dots
    #[serde(default)]
    pub y_offset: i32,
    /// Clockwise rotation about the item's own center
    #[serde(default)]
    pub rotation_degrees: f32,
    #[serde(default)]
    pub position: Positioning,
    #[serde(flatten)]
    pub kind: ItemKind,
}

/// Kind-specific item content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemKind {
    Text(TextItem),
    Image(ImageItem),
    Qr(QrItem),
    Barcode(BarcodeItem),
    Shape(ShapeItem),
}

impl ItemKind {
    /// Short kind name used in logs and errors.
    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Text(_) => "text",
            ItemKind::Image(_) => "image",
            ItemKind::Qr(_) => "qr",
            ItemKind::Barcode(_) => "barcode",
            ItemKind::Shape(_) => "shape",
        }
    }
}

// ============================================================================
// TEXT
// ============================================================================

/// Text block. Lines are separated by `\n`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextItem {
    pub content: String,
    /// Font family; "spleen" is always available, others must be registered
    /// with the content provider.
    #[serde(default = "default_font")]
    pub font: String,
    /// Requested size in dots (line height). Shrunk to fit, never grown.
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    #[serde(default)]
    pub bold: bool,
    /// Extra dots between lines.
    #[serde(default)]
    pub line_gap: u32,
}

// ============================================================================
// IMAGE
// ============================================================================

/// Where image bytes come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ImageSource {
    File { path: PathBuf },
    Inline { bytes: Vec<u8> },
}

/// Photographic or clip-art image, converted to monochrome on render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageItem {
    pub source: ImageSource,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub dither: DitherOptions,
    /// Smooth scaling (bilinear) instead of nearest neighbour.
    #[serde(default)]
    pub smoothing: bool,
}

// ============================================================================
// CODES
// ============================================================================

/// QR error correction level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QrEcLevel {
    L,
    #[default]
    M,
    Q,
    H,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrItem {
    pub data: String,
    /// Edge length in dots (square)
    pub size: i32,
    #[serde(default)]
    pub ec_level: QrEcLevel,
}

/// Supported 1D symbologies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarcodeFormat {
    #[default]
    Code128,
    Code39,
    Ean13,
    Ean8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarcodeItem {
    pub data: String,
    #[serde(default)]
    pub format: BarcodeFormat,
    pub width: i32,
    pub height: i32,
}

// ============================================================================
// SHAPES
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    #[default]
    Rectangle,
    Ellipse,
    /// Diagonal from the top-left to the bottom-right corner of the box
    /// (a horizontal or vertical rule when one side is 1 dot).
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeItem {
    #[serde(default)]
    pub shape: ShapeKind,
    pub width: i32,
    pub height: i32,
    #[serde(default = "default_stroke")]
    pub stroke: u32,
    #[serde(default)]
    pub fill: bool,
}

// ============================================================================
// CONSTRUCTORS
// ============================================================================

impl LabelItem {
    /// Wrap kind-specific content as a flow item with no offset or rotation.
    pub fn new(kind: ItemKind) -> Self {
        Self {
            x_offset: 0,
            y_offset: 0,
            rotation_degrees: 0.0,
            position: Positioning::Flow,
            kind,
        }
    }

    pub fn text(content: impl Into<String>, font_size: f32) -> Self {
        Self::new(ItemKind::Text(TextItem {
            content: content.into(),
            font: default_font(),
            font_size,
            bold: false,
            line_gap: 0,
        }))
    }

    pub fn qr(data: impl Into<String>, size: i32) -> Self {
        Self::new(ItemKind::Qr(QrItem {
            data: data.into(),
            size,
            ec_level: QrEcLevel::default(),
        }))
    }

    pub fn barcode(data: impl Into<String>, format: BarcodeFormat, width: i32, height: i32) -> Self {
        Self::new(ItemKind::Barcode(BarcodeItem {
            data: data.into(),
            format,
            width,
            height,
        }))
    }

    pub fn shape(shape: ShapeKind, width: i32, height: i32) -> Self {
        Self::new(ItemKind::Shape(ShapeItem {
            shape,
            width,
            height,
            stroke: default_stroke(),
            fill: false,
        }))
    }

    pub fn image(source: ImageSource, width: i32, height: i32) -> Self {
        Self::new(ItemKind::Image(ImageItem {
            source,
            width,
            height,
            dither: DitherOptions::default(),
            smoothing: false,
        }))
    }

    pub fn with_offset(mut self, x: i32, y: i32) -> Self {
        self.x_offset = x;
        self.y_offset = y;
        self
    }

    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    pub fn absolute(mut self) -> Self {
        self.position = Positioning::Absolute;
        self
    }

    /// Offsets split into (flow axis, cross axis) for an orientation.
    pub fn axis_offsets(&self, orientation: Orientation) -> (i32, i32) {
        match orientation {
            Orientation::Horizontal => (self.x_offset, self.y_offset),
            Orientation::Vertical => (self.y_offset, self.x_offset),
        }
    }
}
