//! Aspect-ratio buckets used to namespace stored videos.

use std::fmt;
use std::ops::RangeInclusive;

use super::error::{MediaError, MediaResult};

/// Windows around 16:9 (~1.778) and 9:16 (0.5625), tolerant of light cropping.
const LANDSCAPE_RATIOS: RangeInclusive<f64> = 1.70..=1.85;
const PORTRAIT_RATIOS: RangeInclusive<f64> = 0.50..=0.60;

/// Pixel size of the first video stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoDimensions {
    pub width: u32,
    pub height: u32,
}

impl VideoDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect_ratio(&self) -> MediaResult<f64> {
        if self.height == 0 {
            return Err(MediaError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        Ok(f64::from(self.width) / f64::from(self.height))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryCategory {
    Landscape,
    Portrait,
    Other,
}

impl GeometryCategory {
    pub fn from_ratio(ratio: f64) -> Self {
        if LANDSCAPE_RATIOS.contains(&ratio) {
            GeometryCategory::Landscape
        } else if PORTRAIT_RATIOS.contains(&ratio) {
            GeometryCategory::Portrait
        } else {
            GeometryCategory::Other
        }
    }

    pub fn from_dimensions(dimensions: VideoDimensions) -> MediaResult<Self> {
        dimensions.aspect_ratio().map(Self::from_ratio)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryCategory::Landscape => "landscape",
            GeometryCategory::Portrait => "portrait",
            GeometryCategory::Other => "other",
        }
    }
}

impl fmt::Display for GeometryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
