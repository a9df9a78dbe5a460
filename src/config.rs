//! Host configuration: size buckets, base URL and display metrics.
//!
//! Field names and defaults follow the Adaptive Cards host config schema, so a
//! host config JSON document can be loaded as-is; unknown keys are ignored.

use serde::Deserialize;

use crate::error::ConfigError;

/// Physical sizes (in dp) for the `small` / `medium` / `large` buckets.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ImageSizesConfig {
    pub small_size: u32,
    pub medium_size: u32,
    pub large_size: u32,
}

impl Default for ImageSizesConfig {
    fn default() -> Self {
        Self {
            small_size: 40,
            medium_size: 80,
            large_size: 160,
        }
    }
}

impl ImageSizesConfig {
    /// Create a bucket table.
    pub const fn new(small_size: u32, medium_size: u32, large_size: u32) -> Self {
        Self {
            small_size,
            medium_size,
            large_size,
        }
    }

    /// Every bucket must be a positive size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("smallSize", self.small_size),
            ("mediumSize", self.medium_size),
            ("largeSize", self.large_size),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroImageSize(name));
            }
        }
        Ok(())
    }
}

/// The subset of the host config the image renderer reads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostConfig {
    pub image_sizes: ImageSizesConfig,
    /// Base for relative image URLs. Resolution happens in the loader.
    pub image_base_url: Option<String>,
}

impl HostConfig {
    /// Parse and validate a host config JSON document.
    ///
    /// ```
    /// use cardimage::HostConfig;
    ///
    /// let host = HostConfig::from_json(r#"{"imageSizes": {"smallSize": 32}}"#).unwrap();
    /// assert_eq!(host.image_sizes.small_size, 32);
    /// assert_eq!(host.image_sizes.large_size, 160);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.image_sizes.validate()
    }

    /// Builder-style base URL setter.
    pub fn with_image_base_url(mut self, url: impl Into<String>) -> Self {
        self.image_base_url = Some(url.into());
        self
    }
}

/// Screen properties of the device the card is rendered on.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DisplayMetrics {
    /// Full display width in device pixels.
    pub width_pixels: u32,
    /// Device pixels per dp.
    pub density: f32,
}

impl DisplayMetrics {
    pub fn new(width_pixels: u32, density: f32) -> Result<Self, ConfigError> {
        if !(density.is_finite() && density > 0.0) {
            return Err(ConfigError::InvalidDensity(density));
        }
        Ok(Self {
            width_pixels,
            density,
        })
    }
}

impl Default for DisplayMetrics {
    /// A 1080px-wide mdpi-scaled screen.
    fn default() -> Self {
        Self {
            width_pixels: 1080,
            density: 1.0,
        }
    }
}
