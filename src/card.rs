//! Card element model.
//!
//! [`CardElement`] is a closed sum over the element kinds a card body can
//! hold, tagged by the JSON `"type"` key. Only images are rendered by this
//! crate; the other kinds exist so a caller can dispatch on one value.
//!
//! # Example
//!
//! ```
//! use cardimage::{CardElement, HeightMode, ImageSize};
//!
//! let el = CardElement::from_json(r#"{
//!     "type": "Image",
//!     "url": "https://example.com/a.png",
//!     "size": "small",
//!     "height": "stretch"
//! }"#).unwrap();
//!
//! let CardElement::Image(image) = el else { panic!() };
//! assert_eq!(image.size, ImageSize::Small);
//! assert_eq!(image.height, HeightMode::Stretch);
//! ```

use serde::Deserialize;

use crate::constraint::ImageSize;
use crate::error::CardError;
use crate::layout::{HeightMode, HorizontalAlignment};
use crate::style::ImageStyle;

/// Vertical gap before an element.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Spacing {
    #[default]
    Default,
    None,
    Small,
    Medium,
    Large,
    ExtraLarge,
    Padding,
}

/// An action to run when the element is tapped. Opaque to this crate.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct SelectAction(pub serde_json::Value);

/// A single image element.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageSpec {
    pub url: String,
    /// Explicit width in dp, 0 = unspecified.
    pub pixel_width: u32,
    /// Explicit height in dp, 0 = unspecified.
    pub pixel_height: u32,
    pub size: ImageSize,
    pub height: HeightMode,
    pub style: ImageStyle,
    pub horizontal_alignment: HorizontalAlignment,
    /// Raw `#AARRGGBB` string; validated at render time.
    pub background_color: Option<String>,
    pub spacing: Spacing,
    pub separator: bool,
    pub is_visible: bool,
    pub select_action: Option<SelectAction>,
}

impl ImageSpec {
    /// An auto-sized, default-styled, visible image.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pixel_width: 0,
            pixel_height: 0,
            size: ImageSize::Auto,
            height: HeightMode::Auto,
            style: ImageStyle::Default,
            horizontal_alignment: HorizontalAlignment::Left,
            background_color: None,
            spacing: Spacing::Default,
            separator: false,
            is_visible: true,
            select_action: None,
        }
    }

    /// Whether explicit dimensions override the named size.
    pub fn has_explicit_size(&self) -> bool {
        self.pixel_width != 0 || self.pixel_height != 0
    }
}

impl<'de> Deserialize<'de> for ImageSpec {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawImage::deserialize(deserializer).map(ImageSpec::from)
    }
}

/// Wire shape of an image; `width` / `height` are strings like `"48px"`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawImage {
    url: String,
    #[serde(default)]
    size: ImageSize,
    #[serde(default)]
    style: ImageStyle,
    #[serde(default)]
    horizontal_alignment: HorizontalAlignment,
    #[serde(default)]
    background_color: Option<String>,
    #[serde(default)]
    width: Option<String>,
    #[serde(default)]
    height: Option<String>,
    #[serde(default)]
    spacing: Spacing,
    #[serde(default)]
    separator: bool,
    #[serde(default = "default_true")]
    is_visible: bool,
    #[serde(default)]
    select_action: Option<SelectAction>,
}

fn default_true() -> bool {
    true
}

impl From<RawImage> for ImageSpec {
    fn from(raw: RawImage) -> Self {
        let pixel_width = raw
            .width
            .as_deref()
            .map_or(0, |w| parse_pixels("width", w).unwrap_or(0));
        let (height, pixel_height) = match raw.height.as_deref() {
            None => (HeightMode::Auto, 0),
            Some(h) if h.eq_ignore_ascii_case("auto") => (HeightMode::Auto, 0),
            Some(h) if h.eq_ignore_ascii_case("stretch") => (HeightMode::Stretch, 0),
            Some(h) => (HeightMode::Auto, parse_pixels("height", h).unwrap_or(0)),
        };
        Self {
            url: raw.url,
            pixel_width,
            pixel_height,
            size: raw.size,
            height,
            style: raw.style,
            horizontal_alignment: raw.horizontal_alignment,
            background_color: raw.background_color,
            spacing: raw.spacing,
            separator: raw.separator,
            is_visible: raw.is_visible,
            select_action: raw.select_action,
        }
    }
}

/// Parse `"<digits>px"`. Anything else is ignored with a warning.
fn parse_pixels(key: &str, value: &str) -> Option<u32> {
    let parsed = value
        .trim()
        .strip_suffix("px")
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse().ok());
    if parsed.is_none() {
        log::warn!("ignoring image {key} {value:?}: expected \"<n>px\"");
    }
    parsed
}

/// A horizontal collection of images sharing one size bucket.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSetSpec {
    pub images: Vec<ImageSpec>,
    #[serde(default = "ImageSetSpec::default_image_size")]
    pub image_size: ImageSize,
    #[serde(default)]
    pub spacing: Spacing,
    #[serde(default)]
    pub separator: bool,
    #[serde(default = "default_true")]
    pub is_visible: bool,
}

impl ImageSetSpec {
    fn default_image_size() -> ImageSize {
        ImageSize::Medium
    }
}

/// Any element that can appear in a card body.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum CardElement {
    Image(ImageSpec),
    ImageSet(ImageSetSpec),
    TextBlock {
        #[serde(default)]
        text: String,
    },
    /// Any element type this crate does not model.
    #[serde(other)]
    Unsupported,
}

impl CardElement {
    /// Parse a single element object.
    pub fn from_json(json: &str) -> Result<Self, CardError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The element's `"type"` name.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Image(_) => "Image",
            Self::ImageSet(_) => "ImageSet",
            Self::TextBlock { .. } => "TextBlock",
            Self::Unsupported => "Unsupported",
        }
    }
}

#[derive(Deserialize)]
struct CardBody {
    #[serde(default)]
    body: Vec<CardElement>,
}

/// Parse the `body` array of a card document.
pub fn parse_body(json: &str) -> Result<Vec<CardElement>, CardError> {
    let card: CardBody = serde_json::from_str(json)?;
    Ok(card.body)
}
