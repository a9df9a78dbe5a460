//! Size constraints for an image view.
//!
//! Two policies, picked per image:
//!
//! - **Explicit pixels** — the card gives `width` and/or `height` in dp. One
//!   side alone caps that axis and leaves the other free (aspect ratio
//!   preserved); both sides force an exact, distorting box.
//! - **Named bucket** — `small` / `medium` / `large` cap the width at the
//!   host-configured bucket; `stretch` fills the parent; `auto` / `none` leave
//!   the view unconstrained.
//!
//! Pure geometry — no pixel operations.
//!
//! # Example
//!
//! ```
//! use cardimage::{DisplayMetrics, ImageSize, ImageSizesConfig, Size, SizeConstraints};
//!
//! let metrics = DisplayMetrics::new(1080, 2.0).unwrap();
//! let sizes = ImageSizesConfig::default();
//!
//! let c = SizeConstraints::from_named(ImageSize::Medium, &sizes, &metrics);
//! assert_eq!(c.max_width, Some(160));
//! assert!(c.preserves_aspect_ratio());
//!
//! // A 400×200 bitmap is scaled down to the 160px cap, keeping 2:1.
//! assert_eq!(c.measure(Size::new(400, 200), metrics.width_pixels), Size::new(160, 80));
//! ```

use core::str::FromStr;

use num_traits::ToPrimitive;
use serde::Deserialize;

use crate::card::ImageSpec;
use crate::config::{DisplayMetrics, ImageSizesConfig};
use crate::error::CardError;

/// Named size bucket of an image.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ImageSize {
    /// Natural size, capped by the available width.
    #[default]
    Auto,
    /// Host `smallSize`.
    Small,
    /// Host `mediumSize`.
    Medium,
    /// Host `largeSize`.
    Large,
    /// Fill the parent's width.
    Stretch,
    /// No size policy; treated like [`Auto`](Self::Auto).
    None,
}

impl FromStr for ImageSize {
    type Err = CardError;

    /// Case-insensitive. Any other value is a contract violation of the
    /// card document and fails the parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "small" => Ok(Self::Small),
            "medium" => Ok(Self::Medium),
            "large" => Ok(Self::Large),
            "stretch" => Ok(Self::Stretch),
            "none" => Ok(Self::None),
            _ => Err(CardError::UnknownImageSize(s.to_owned())),
        }
    }
}

impl TryFrom<String> for ImageSize {
    type Error = CardError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl ImageSize {
    /// Bucket width in dp, for the three configured buckets.
    pub fn bucket_dp(self, sizes: &ImageSizesConfig) -> Option<u32> {
        match self {
            Self::Small => Some(sizes.small_size),
            Self::Medium => Some(sizes.medium_size),
            Self::Large => Some(sizes.large_size),
            Self::Auto | Self::Stretch | Self::None => None,
        }
    }
}

/// How the host draws the bitmap inside the view bounds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ScaleType {
    /// Center at natural size, no scaling.
    Center,
    /// Center, scaling down (never up) to fit inside the view.
    CenterInside,
    /// Scale up or down to fit inside the view, centered.
    #[default]
    FitCenter,
    /// Scale each axis independently to fill the view exactly.
    FitXy,
}

/// Width × height in device pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Sizing applied to an image view.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SizeConstraints {
    pub scale_type: ScaleType,
    /// Upper bound on view width.
    pub max_width: Option<u32>,
    /// Upper bound on view height.
    pub max_height: Option<u32>,
    /// Let the view bounds follow the bitmap's aspect ratio.
    pub adjust_view_bounds: bool,
    /// The view should span its parent's width.
    pub fill_parent: bool,
    /// Exact layout box. Set only when both explicit dimensions are given.
    pub fixed: Option<Size>,
}

impl SizeConstraints {
    /// Constraints for a named size bucket.
    pub fn from_named(size: ImageSize, sizes: &ImageSizesConfig, metrics: &DisplayMetrics) -> Self {
        let mut c = Self {
            scale_type: ScaleType::Center,
            adjust_view_bounds: true,
            ..Self::default()
        };
        match size {
            ImageSize::Stretch => {
                c.fill_parent = true;
                c.scale_type = ScaleType::CenterInside;
            }
            ImageSize::Small | ImageSize::Medium | ImageSize::Large => {
                c.max_width = size.bucket_dp(sizes).map(|dp| dp_to_pixels(dp, metrics));
            }
            ImageSize::Auto | ImageSize::None => {}
        }
        c
    }

    /// Constraints for explicit dp dimensions (0 = unspecified).
    ///
    /// Returns `None` when both are unspecified, meaning the named bucket
    /// applies instead.
    pub fn from_pixels(width_dp: u32, height_dp: u32, metrics: &DisplayMetrics) -> Option<Self> {
        let width = (width_dp != 0).then(|| dp_to_pixels(width_dp, metrics));
        let height = (height_dp != 0).then(|| dp_to_pixels(height_dp, metrics));
        match (width, height) {
            (None, None) => None,
            (Some(w), Some(h)) => Some(Self {
                scale_type: ScaleType::FitXy,
                max_width: Some(w),
                max_height: Some(h),
                adjust_view_bounds: false,
                fill_parent: false,
                fixed: Some(Size::new(w, h)),
            }),
            (w, h) => Some(Self {
                scale_type: ScaleType::FitCenter,
                max_width: w,
                max_height: h,
                adjust_view_bounds: true,
                fill_parent: false,
                fixed: None,
            }),
        }
    }

    /// Pick the explicit-pixel policy when either dimension is set, otherwise
    /// the named bucket.
    pub fn resolve(spec: &ImageSpec, sizes: &ImageSizesConfig, metrics: &DisplayMetrics) -> Self {
        Self::from_pixels(spec.pixel_width, spec.pixel_height, metrics)
            .unwrap_or_else(|| Self::from_named(spec.size, sizes, metrics))
    }

    /// Whether the host keeps the bitmap's aspect ratio.
    pub fn preserves_aspect_ratio(&self) -> bool {
        self.adjust_view_bounds && self.fixed.is_none()
    }

    /// Content box the host would give a bitmap of `intrinsic` size when the
    /// parent offers `available_width` pixels.
    ///
    /// A fixed box wins outright. Otherwise the bitmap is scaled down (never
    /// up) to fit the width and height caps, keeping its aspect ratio.
    pub fn measure(&self, intrinsic: Size, available_width: u32) -> Size {
        if let Some(fixed) = self.fixed {
            return fixed;
        }
        if intrinsic.width == 0 || intrinsic.height == 0 {
            return Size::default();
        }
        let max_w = self
            .max_width
            .map_or(available_width, |w| w.min(available_width))
            .max(1);
        let max_h = self.max_height.unwrap_or(u32::MAX).max(1);
        if !self.adjust_view_bounds {
            return Size::new(intrinsic.width.min(max_w), intrinsic.height.min(max_h));
        }
        fit_within(intrinsic, max_w, max_h)
    }
}

/// Convert dp to device pixels, truncating toward zero.
pub fn dp_to_pixels(dp: u32, metrics: &DisplayMetrics) -> u32 {
    (f64::from(dp) * f64::from(metrics.density))
        .trunc()
        .to_u32()
        .unwrap_or(u32::MAX)
}

/// Down-sample hint for the decoder, in device pixels.
///
/// The bucket width for `small` / `medium` / `large`, the display width for
/// everything else. Never zero.
pub fn size_limit(size: ImageSize, sizes: &ImageSizesConfig, metrics: &DisplayMetrics) -> u32 {
    size.bucket_dp(sizes)
        .map_or(metrics.width_pixels, |dp| dp_to_pixels(dp, metrics))
        .max(1)
}

/// Scale `src` down to fit `max_w × max_h`, preserving aspect ratio.
/// Sources already inside the box are returned unchanged.
fn fit_within(src: Size, max_w: u32, max_h: u32) -> Size {
    if src.width <= max_w && src.height <= max_h {
        return src;
    }
    // Cross-multiply to pick the constraining axis without float comparison.
    let (sw, sh) = (u64::from(src.width), u64::from(src.height));
    let (tw, th) = (u64::from(max_w), u64::from(max_h));
    if sw * th >= sh * tw {
        Size::new(max_w, proportional(sh, tw, sw))
    } else {
        Size::new(proportional(sw, th, sh), max_h)
    }
}

/// `round(a * b / c)`, at least 1.
fn proportional(a: u64, b: u64, c: u64) -> u32 {
    let v = (a * b + c / 2) / c;
    u32::try_from(v).unwrap_or(u32::MAX).max(1)
}
