//! Configuration types for the image transforms.
//!
//! Two small configs cover the two consumer flows: [`EncodeConfig`] for the
//! capture pipeline (bounded proportional resize + lossy re-encode) and
//! [`CropConfig`] for the profile-photo crops. Both are built via builders
//! that clamp in the setters and validate in `build()`, so a config that
//! exists is a config that is usable.

use crate::error::CaptureError;
use serde::{Deserialize, Serialize};

/// Configuration for the bounded resize-and-encode transform.
///
/// Built via [`EncodeConfig::builder()`] or [`EncodeConfig::default()`].
///
/// # Example
/// ```rust
/// use proofshot::EncodeConfig;
///
/// let config = EncodeConfig::builder()
///     .quality(0.7)
///     .max_width(1920)
///     .max_height(1080)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncodeConfig {
    /// Lossy encode quality in `(0, 1]`. Default: 0.8.
    ///
    /// 0.8 keeps faces and room context recognisable for manual verification
    /// while a 1280x720 frame lands well under 100 KB — small enough to ride
    /// inside a JSON request body as base64 without special handling.
    pub quality: f32,

    /// Maximum output width in pixels. Default: 1280.
    pub max_width: u32,

    /// Maximum output height in pixels. Default: 720.
    ///
    /// 1280x720 matches the preview resolution most front cameras deliver,
    /// so the resize step is a no-op on typical devices and only large
    /// rear-camera frames pay for resampling.
    pub max_height: u32,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            quality: 0.8,
            max_width: 1280,
            max_height: 720,
        }
    }
}

impl EncodeConfig {
    /// Create a new builder for `EncodeConfig`.
    pub fn builder() -> EncodeConfigBuilder {
        EncodeConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`EncodeConfig`].
#[derive(Debug)]
pub struct EncodeConfigBuilder {
    config: EncodeConfig,
}

impl EncodeConfigBuilder {
    pub fn quality(mut self, q: f32) -> Self {
        self.config.quality = q;
        self
    }

    pub fn max_width(mut self, px: u32) -> Self {
        self.config.max_width = px.max(1);
        self
    }

    pub fn max_height(mut self, px: u32) -> Self {
        self.config.max_height = px.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<EncodeConfig, CaptureError> {
        let c = &self.config;
        if !(c.quality > 0.0 && c.quality <= 1.0) {
            return Err(CaptureError::InvalidConfig(format!(
                "quality must be in (0, 1], got {}",
                c.quality
            )));
        }
        Ok(self.config)
    }
}

/// Configuration for the square crop transforms.
///
/// Defaults suit avatar use: an 800px square at quality 0.85 stays sharp on
/// retina profile pages yet typically lands under 60 KB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropConfig {
    /// Edge length of the square output in pixels. Default: 800.
    pub target_size: u32,

    /// Lossy encode quality in `(0, 1]`. Default: 0.85.
    pub quality: f32,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            target_size: 800,
            quality: 0.85,
        }
    }
}

impl CropConfig {
    /// Create a new builder for `CropConfig`.
    pub fn builder() -> CropConfigBuilder {
        CropConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`CropConfig`].
#[derive(Debug)]
pub struct CropConfigBuilder {
    config: CropConfig,
}

impl CropConfigBuilder {
    pub fn target_size(mut self, px: u32) -> Self {
        self.config.target_size = px.max(1);
        self
    }

    pub fn quality(mut self, q: f32) -> Self {
        self.config.quality = q;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<CropConfig, CaptureError> {
        let c = &self.config;
        if !(c.quality > 0.0 && c.quality <= 1.0) {
            return Err(CaptureError::InvalidConfig(format!(
                "quality must be in (0, 1], got {}",
                c.quality
            )));
        }
        Ok(self.config)
    }
}
