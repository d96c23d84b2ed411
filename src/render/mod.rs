//! # Rendering Module
//!
//! Turns an ordered item list into a monochrome page surface.
//!
//! ```text
//! items + profiles ──► layout ──► compositor ──► page surface
//!                        │            │
//!                    provider     provider, caches, dither
//! ```
//!
//! ## Modules
//!
//! - [`layout`]: flow layout (spans, centering, page length)
//! - [`compositor`]: painting blocks onto the page, sub-raster caches
//! - [`pipeline`]: `LabelRenderer`, the shared layout + compositor pair
//! - [`dither`]: threshold, ordered and Floyd-Steinberg monochrome conversion
//! - [`cache`]: bounded LRU cache
//! - [`provider`]: text metrics and QR/barcode rasters
//! - [`surface`]: pixel helpers over `image::RgbaImage`

pub mod cache;
pub mod compositor;
pub mod dither;
pub mod layout;
pub mod pipeline;
pub mod provider;
pub mod surface;

pub use compositor::{CacheCapacities, PageCompositor, RenderCaches};
pub use layout::{FlowBlock, FlowLayoutEngine, LayoutOptions, PageLayout};
pub use pipeline::{LabelRenderer, PageRenderRequest, PageRenderResult, RenderedPage};
pub use provider::{BuiltinProvider, ContentProvider, TextMetrics};
pub use surface::Surface;
