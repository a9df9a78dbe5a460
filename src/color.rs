//! Background color parsing: strict `#AARRGGBB` with a transparent fallback.
//!
//! Card authors write colors by hand, so a bad value must never abort a
//! render. Anything that is not exactly `#` followed by eight hex digits
//! resolves to [`Argb::TRANSPARENT`].
//!
//! # Example
//!
//! ```
//! use cardimage::{Argb, parse_background_color};
//!
//! assert_eq!(parse_background_color(Some("#FF336699")), Argb::from_argb(0xFF, 0x33, 0x66, 0x99));
//! assert_eq!(parse_background_color(Some("#336699")), Argb::TRANSPARENT);
//! assert_eq!(parse_background_color(None), Argb::TRANSPARENT);
//! ```

use image::Rgba;

/// A packed 32-bit color in `0xAARRGGBB` order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Argb(pub u32);

impl Argb {
    /// Transparent black, `0x00000000`.
    pub const TRANSPARENT: Self = Self(0);

    /// Pack four channels.
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self((a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32)
    }

    pub const fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    pub const fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub const fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub const fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Whether the color has zero alpha.
    pub const fn is_transparent(self) -> bool {
        self.alpha() == 0
    }

    /// Convert to an unpremultiplied RGBA pixel.
    pub const fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.red(), self.green(), self.blue(), self.alpha()])
    }
}

impl From<Rgba<u8>> for Argb {
    fn from(px: Rgba<u8>) -> Self {
        let [r, g, b, a] = px.0;
        Self::from_argb(a, r, g, b)
    }
}

/// Parse an optional `#AARRGGBB` background color.
///
/// Empty, missing, wrong-length, `#`-less and non-hex values all yield
/// [`Argb::TRANSPARENT`].
pub fn parse_background_color(hex: Option<&str>) -> Argb {
    let Some(s) = hex.filter(|s| !s.is_empty()) else {
        return Argb::TRANSPARENT;
    };
    match parse_argb(s) {
        Some(c) => c,
        None => {
            log::debug!("ignoring background color {s:?}: expected #AARRGGBB");
            Argb::TRANSPARENT
        }
    }
}

fn parse_argb(s: &str) -> Option<Argb> {
    // Length is measured in bytes; any multi-byte char already fails the hex check.
    if s.len() != 9 {
        return None;
    }
    let hex = s.strip_prefix('#')?.as_bytes();
    let a = parse_byte(&hex[0..2])?;
    let r = parse_byte(&hex[2..4])?;
    let g = parse_byte(&hex[4..6])?;
    let b = parse_byte(&hex[6..8])?;
    Some(Argb::from_argb(a, r, g, b))
}

fn hex_val(ch: u8) -> Option<u8> {
    match ch {
        b'0'..=b'9' => Some(ch - b'0'),
        b'a'..=b'f' => Some(ch - b'a' + 10),
        b'A'..=b'F' => Some(ch - b'A' + 10),
        _ => None,
    }
}

fn parse_byte(pair: &[u8]) -> Option<u8> {
    let hi = hex_val(pair[0])?;
    let lo = hex_val(pair[1])?;
    Some(hi << 4 | lo)
}
