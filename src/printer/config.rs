//! # Media and Resolution Profiles
//!
//! This module defines the fixed catalogs the pipeline sizes its pages from.
//!
//! ## Media Catalog
//!
//! Tape cassettes for a 128-pin, 180 DPI print head. The printable area is
//! centered on the head; the unused pins on either side are the margins.
//!
//! | Id | Tape | Print area (dots) | Margins (dots) |
//! |----|------|-------------------|----------------|
//! | tze-3.5 | 3.5mm | 24 | 52 / 52 |
//! | tze-6 | 6mm | 32 | 48 / 48 |
//! | tze-9 | 9mm | 50 | 39 / 39 |
//! | tze-12 | 12mm | 70 | 29 / 29 |
//! | tze-18 | 18mm | 112 | 8 / 8 |
//! | tze-24 | 24mm | 128 | 0 / 0 |
//!
//! ```text
//! ├─ margin ─┼───── print area ─────┼─ margin ─┤
//! │ 29 dots  │       70 dots        │ 29 dots  │   (12mm tape)
//! └──────────┴──────────────────────┴──────────┘
//!                 128 pins total
//! ```
//!
//! ## Resolution Profiles
//!
//! | Profile | Head DPI (axis 0) | Feed DPI (axis 1) | Min length |
//! |---------|-------------------|-------------------|------------|
//! | LOW | 180 | 180 | 31 dots |
//! | HIGH | 180 | 320 | 62 dots |
//!
//! ## Usage
//!
//! ```
//! use labelpress::printer::{MediaProfile, ResolutionProfile};
//!
//! let media = MediaProfile::by_id("tze-12").unwrap();
//! assert_eq!(media.print_area_dots, 70);
//! assert_eq!(media.head_dots(), 128);
//!
//! let res = ResolutionProfile::HIGH;
//! assert!(res.dots_per_inch_axis1 > res.dots_per_inch_axis0);
//! ```

use serde::Serialize;

use crate::error::LabelError;

/// # Media Profile
///
/// Physical media descriptor. All dot values are at the head resolution
/// (`ResolutionProfile::dots_per_inch_axis0`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MediaProfile {
    /// Catalog id (e.g. "tze-12")
    pub id: &'static str,

    /// Printable cross-axis width in device dots
    pub print_area_dots: u32,

    /// Unprinted pins before the print area
    pub margin_start_dots: u32,

    /// Unprinted pins after the print area
    pub margin_end_dots: u32,

    /// Nominal tape width in millimeters
    pub width_mm: f32,
}

impl MediaProfile {
    pub const TZE_3_5: Self = Self::tape("tze-3.5", 24, 52, 3.5);
    pub const TZE_6: Self = Self::tape("tze-6", 32, 48, 6.0);
    pub const TZE_9: Self = Self::tape("tze-9", 50, 39, 9.0);
    pub const TZE_12: Self = Self::tape("tze-12", 70, 29, 12.0);
    pub const TZE_18: Self = Self::tape("tze-18", 112, 8, 18.0);
    pub const TZE_24: Self = Self::tape("tze-24", 128, 0, 24.0);

    /// Every media profile, in tape-width order.
    pub const CATALOG: [Self; 6] = [
        Self::TZE_3_5,
        Self::TZE_6,
        Self::TZE_9,
        Self::TZE_12,
        Self::TZE_18,
        Self::TZE_24,
    ];

    const fn tape(id: &'static str, print_area_dots: u32, margin: u32, width_mm: f32) -> Self {
        Self {
            id,
            print_area_dots,
            margin_start_dots: margin,
            margin_end_dots: margin,
            width_mm,
        }
    }

    /// Look up a catalog entry by id.
    pub fn by_id(id: &str) -> Result<Self, LabelError> {
        Self::CATALOG
            .iter()
            .find(|m| m.id == id)
            .copied()
            .ok_or_else(|| LabelError::Config(format!("Unknown media id '{}'", id)))
    }

    /// Full head width: margins plus print area.
    #[inline]
    pub fn head_dots(&self) -> u32 {
        self.margin_start_dots + self.print_area_dots + self.margin_end_dots
    }
}

impl Default for MediaProfile {
    fn default() -> Self {
        Self::TZE_12
    }
}

/// # Resolution Profile
///
/// Axis 0 is the head (cross-axis) density, axis 1 the feed density.
/// Layout happens in square axis-0 dots; pages are stretched along the feed
/// axis by `dots_per_inch_axis1 / dots_per_inch_axis0` at the end of
/// compositing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolutionProfile {
    /// Profile name ("low" / "high")
    pub name: &'static str,

    /// Head resolution in dots per inch
    pub dots_per_inch_axis0: u32,

    /// Feed resolution in dots per inch
    pub dots_per_inch_axis1: u32,

    /// Shortest page the printer accepts, in feed dots
    pub min_length_dots: u32,
}

impl ResolutionProfile {
    pub const LOW: Self = Self {
        name: "low",
        dots_per_inch_axis0: 180,
        dots_per_inch_axis1: 180,
        min_length_dots: 31,
    };

    pub const HIGH: Self = Self {
        name: "high",
        dots_per_inch_axis0: 180,
        dots_per_inch_axis1: 320,
        min_length_dots: 62,
    };

    /// Look up a profile by name ("low" or "high", case-insensitive).
    pub fn by_name(name: &str) -> Result<Self, LabelError> {
        match name.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::LOW),
            "high" => Ok(Self::HIGH),
            other => Err(LabelError::Config(format!(
                "Unknown resolution '{}' (expected low or high)",
                other
            ))),
        }
    }

    /// Convert millimeters to feed-axis dots.
    ///
    /// ```
    /// use labelpress::printer::ResolutionProfile;
    ///
    /// // 25.4mm is exactly one inch
    /// assert_eq!(ResolutionProfile::LOW.mm_to_feed_dots(25.4), 180);
    /// assert_eq!(ResolutionProfile::HIGH.mm_to_feed_dots(25.4), 320);
    /// ```
    #[inline]
    pub fn mm_to_feed_dots(&self, mm: f32) -> u32 {
        (mm.max(0.0) * self.dots_per_inch_axis1 as f32 / 25.4).round() as u32
    }
}

impl Default for ResolutionProfile {
    fn default() -> Self {
        Self::LOW
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_fits_head() {
        for media in MediaProfile::CATALOG {
            assert_eq!(media.head_dots(), 128, "{} should span the head", media.id);
        }
    }

    #[test]
    fn test_by_id() {
        assert_eq!(MediaProfile::by_id("tze-24").unwrap().print_area_dots, 128);
        assert!(matches!(
            MediaProfile::by_id("tze-99"),
            Err(LabelError::Config(_))
        ));
    }

    #[test]
    fn test_resolution_by_name() {
        assert_eq!(ResolutionProfile::by_name("HIGH").unwrap(), ResolutionProfile::HIGH);
        assert!(ResolutionProfile::by_name("ultra").is_err());
    }

    #[test]
    fn test_mm_conversion_clamps_negative() {
        assert_eq!(ResolutionProfile::LOW.mm_to_feed_dots(-3.0), 0);
        assert_eq!(ResolutionProfile::LOW.mm_to_feed_dots(12.7), 90);
    }
}
