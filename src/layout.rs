//! Layout parameters and the stretch-wrapper decision.
//!
//! Maps an image's named size, height mode and horizontal alignment onto
//! linear-layout style parameters:
//!
//! ```text
//!     size      height    width          height         weight
//!     Stretch   Stretch   match parent   match parent   1
//!     Stretch   Auto      match parent   wrap content   0
//!     other     Stretch   wrap content   match parent   1
//!     other     Auto      wrap content   wrap content   0
//! ```
//!
//! A standalone image with stretch height gets a wrapper container that
//! takes these parameters, while the image inside wraps its content. The
//! slot grows, the image's background does not. Inside an image collection
//! the collection owns stretching, so no wrapper is used.

use core::str::FromStr;

use serde::Deserialize;

use crate::constraint::{ImageSize, Size};
use crate::error::CardError;

/// Vertical sizing of an image element.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum HeightMode {
    #[default]
    Auto,
    /// Grow to fill the remaining height of the parent.
    Stretch,
}

/// Horizontal placement requested by the card.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum HorizontalAlignment {
    #[default]
    Left,
    Center,
    Right,
}

impl FromStr for HorizontalAlignment {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "center" => Ok(Self::Center),
            "right" => Ok(Self::Right),
            _ => Err(CardError::UnknownAlignment(s.to_owned())),
        }
    }
}

impl TryFrom<String> for HorizontalAlignment {
    type Error = CardError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Layout gravity along the horizontal axis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum HorizontalGravity {
    #[default]
    Start,
    CenterHorizontal,
    End,
}

impl From<HorizontalAlignment> for HorizontalGravity {
    fn from(alignment: HorizontalAlignment) -> Self {
        match alignment {
            HorizontalAlignment::Left => Self::Start,
            HorizontalAlignment::Center => Self::CenterHorizontal,
            HorizontalAlignment::Right => Self::End,
        }
    }
}

/// One axis of a layout box.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// As large as the parent allows.
    MatchParent,
    /// As large as the content.
    #[default]
    WrapContent,
    /// Exactly this many device pixels.
    Exact(u32),
}

/// Layout parameters for a child of a linear container.
#[derive(Copy, Clone, Debug, Default)]
pub struct LayoutParams {
    pub width: Dimension,
    pub height: Dimension,
    /// Share of the parent's leftover space. 0 = none.
    pub weight: f32,
    pub gravity: HorizontalGravity,
}

impl PartialEq for LayoutParams {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.weight.to_bits() == other.weight.to_bits()
            && self.gravity == other.gravity
    }
}

impl Eq for LayoutParams {}

impl core::hash::Hash for LayoutParams {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.width.hash(state);
        self.height.hash(state);
        self.weight.to_bits().hash(state);
        self.gravity.hash(state);
    }
}

impl LayoutParams {
    /// `wrap_content × wrap_content`, no weight, start gravity.
    pub const WRAP: Self = Self {
        width: Dimension::WrapContent,
        height: Dimension::WrapContent,
        weight: 0.0,
        gravity: HorizontalGravity::Start,
    };

    /// Create params with no weight and start gravity.
    pub const fn new(width: Dimension, height: Dimension) -> Self {
        Self {
            width,
            height,
            weight: 0.0,
            gravity: HorizontalGravity::Start,
        }
    }

    pub const fn weight(mut self, weight: f32) -> Self {
        self.weight = weight;
        self
    }

    pub const fn gravity(mut self, gravity: HorizontalGravity) -> Self {
        self.gravity = gravity;
        self
    }

    /// Replace both axes with an exact pixel box.
    pub const fn fixed(mut self, size: Size) -> Self {
        self.width = Dimension::Exact(size.width);
        self.height = Dimension::Exact(size.height);
        self
    }

    /// Whether this child takes leftover space.
    pub fn is_weighted(&self) -> bool {
        self.weight > 0.0
    }
}

/// Computed parameters plus whether a stretch wrapper is required.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageLayout {
    /// Parameters for whatever is attached to the parent.
    pub params: LayoutParams,
    /// Attach a wrapper container carrying `params` instead of the image.
    pub wrapper: bool,
}

impl ImageLayout {
    /// Split into `(image params, wrapper params)`.
    ///
    /// With a wrapper the image itself wraps its content. An explicit
    /// `fixed` box replaces the image's own width and height.
    pub fn split(self, fixed: Option<Size>) -> (LayoutParams, Option<LayoutParams>) {
        let (image, wrapper) = if self.wrapper {
            (LayoutParams::WRAP, Some(self.params))
        } else {
            (self.params, None)
        };
        let image = match fixed {
            Some(size) => image.fixed(size),
            None => image,
        };
        (image, wrapper)
    }
}

/// Compute layout parameters and the wrapper decision.
///
/// ```
/// use cardimage::{HeightMode, HorizontalAlignment, ImageSize, build_layout};
///
/// let (size, height) = (ImageSize::Stretch, HeightMode::Stretch);
/// let align = HorizontalAlignment::Left;
///
/// let standalone = build_layout(size, height, align, false);
/// assert!(standalone.wrapper);
///
/// let in_set = build_layout(size, height, align, true);
/// assert!(!in_set.wrapper);
/// assert_eq!(standalone.params, in_set.params);
/// ```
pub fn build_layout(
    size: ImageSize,
    height: HeightMode,
    alignment: HorizontalAlignment,
    in_collection: bool,
) -> ImageLayout {
    let width = if size == ImageSize::Stretch {
        Dimension::MatchParent
    } else {
        Dimension::WrapContent
    };
    let params = match height {
        HeightMode::Stretch => LayoutParams::new(width, Dimension::MatchParent).weight(1.0),
        HeightMode::Auto => LayoutParams::new(width, Dimension::WrapContent),
    }
    .gravity(alignment.into());

    ImageLayout {
        params,
        wrapper: !in_collection && height == HeightMode::Stretch,
    }
}
