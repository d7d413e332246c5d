//! Edit request parameters for the transformation pipeline

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Trim the video to `[start, end)` seconds. Applied in stream-copy mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Cut {
    #[validate(range(min = 0.0, message = "start must not be negative"))]
    pub start: f64,
    #[validate(range(min = 0.0, message = "end must not be negative"))]
    pub end: f64,
}

/// Crop a region out of the frame. Oversized dimensions are clamped to the
/// source during transformation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Crop {
    #[validate(range(min = 1, message = "crop width must be at least 1"))]
    pub width: u32,
    #[validate(range(min = 1, message = "crop height must be at least 1"))]
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

/// Rotate by the given degrees; normalized to quarter turns. Any degree is
/// acceptable, so there is nothing to validate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotate {
    pub degree: i64,
}

/// Rescale to the given width, preserving aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Quality {
    #[validate(range(min = 1, message = "target width must be at least 1"))]
    pub width: u32,
}

/// The full set of requested edits. Any subset may be present; an entirely
/// empty request is a pass-through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditParams {
    pub cut: Option<Cut>,
    pub crop: Option<Crop>,
    pub rotate: Option<Rotate>,
    pub quality: Option<Quality>,
}

impl EditParams {
    /// Validate all present parameters, including the cross-field cut check.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(cut) = &self.cut {
            Validate::validate(cut)?;
            if cut.end <= cut.start {
                return Err(AppError::Validation(format!(
                    "cut end ({}) must be greater than start ({})",
                    cut.end, cut.start
                )));
            }
        }
        if let Some(crop) = &self.crop {
            Validate::validate(crop)?;
        }
        if let Some(quality) = &self.quality {
            Validate::validate(quality)?;
        }
        Ok(())
    }

    /// True when no edit of any kind was requested.
    pub fn is_empty(&self) -> bool {
        self.cut.is_none() && self.crop.is_none() && self.rotate.is_none() && self.quality.is_none()
    }
}
