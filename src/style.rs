//! Post-decode bitmap styling.
//!
//! [`ImageStyle::Person`] turns a decoded bitmap into a circular avatar: a
//! circle of the background color with the source drawn through a circular
//! mask on top. The circle is centered on the bitmap and its radius is half
//! the bitmap *width*, so tall sources are clipped top and bottom and wide
//! sources leave the circle spilling past the top and bottom edges.
//!
//! Runs on the loader's worker thread; everything here is pure.

use core::str::FromStr;

use image::{Rgba, RgbaImage};
use serde::Deserialize;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, Paint, PathBuilder, Pattern, Pixmap, SpreadMode, Transform,
};

use crate::color::Argb;
use crate::error::CardError;

/// Visual treatment of an image.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ImageStyle {
    /// Draw the bitmap as decoded.
    #[default]
    Default,
    /// Circular avatar composite.
    Person,
}

impl ImageStyle {
    /// Whether the view's own rectangular background must be left unset.
    ///
    /// The avatar composite already carries the background inside the
    /// circle; a view background would show through the corners.
    pub fn suppresses_view_background(self) -> bool {
        self == Self::Person
    }
}

impl FromStr for ImageStyle {
    type Err = CardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "person" => Ok(Self::Person),
            _ => Err(CardError::UnknownImageStyle(s.to_owned())),
        }
    }
}

impl TryFrom<String> for ImageStyle {
    type Error = CardError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Apply `style` to a decoded bitmap.
///
/// An absent bitmap (failed decode) stays absent.
///
/// ```
/// use cardimage::{Argb, ImageStyle, apply_style};
/// use image::{Rgba, RgbaImage};
///
/// let src = RgbaImage::from_pixel(8, 8, Rgba([200, 10, 10, 255]));
/// let out = apply_style(Some(src), ImageStyle::Person, Argb(0xFF00_00FF)).unwrap();
///
/// assert_eq!(out.dimensions(), (8, 8));
/// assert_eq!(out.get_pixel(4, 4), &Rgba([200, 10, 10, 255]));
/// assert_eq!(out.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
/// ```
pub fn apply_style(
    bitmap: Option<RgbaImage>,
    style: ImageStyle,
    background: Argb,
) -> Option<RgbaImage> {
    let bitmap = bitmap?;
    match style {
        ImageStyle::Default => Some(bitmap),
        ImageStyle::Person => Some(circle_composite(&bitmap, background)),
    }
}

/// Draw `background` then `src` through the same circular mask onto a fresh
/// transparent bitmap of identical dimensions.
///
/// Both fills are aliased: a pixel belongs to the circle when its center
/// does.
fn circle_composite(src: &RgbaImage, background: Argb) -> RgbaImage {
    let (w, h) = src.dimensions();
    let (Some(source), Some(mut canvas)) = (to_pixmap(src), Pixmap::new(w, h)) else {
        return RgbaImage::new(w, h);
    };
    let Some(circle) = PathBuilder::from_circle((w / 2) as f32, (h / 2) as f32, (w / 2) as f32)
    else {
        return RgbaImage::new(w, h);
    };

    let mut paint = Paint::default();
    paint.anti_alias = false;
    paint.set_color_rgba8(
        background.red(),
        background.green(),
        background.blue(),
        background.alpha(),
    );
    canvas.fill_path(&circle, &paint, FillRule::Winding, Transform::identity(), None);

    paint.shader = Pattern::new(
        source.as_ref(),
        SpreadMode::Pad,
        FilterQuality::Nearest,
        1.0,
        Transform::identity(),
    );
    canvas.fill_path(&circle, &paint, FillRule::Winding, Transform::identity(), None);

    from_pixmap(&canvas)
}

/// Premultiplied copy of `img`. `None` for an empty image.
fn to_pixmap(img: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(img.width(), img.height())?;
    for (dst, px) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        *dst = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
    }
    Some(pixmap)
}

fn from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let (w, h) = (pixmap.width(), pixmap.height());
    let mut out = RgbaImage::new(w, h);
    for (dst, px) in out.pixels_mut().zip(pixmap.pixels()) {
        let c = px.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLUE: Argb = Argb::from_argb(0xFF, 0, 0, 0xFF);
    const TRANSPARENT_PX: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| Rgba([x as u8, y as u8, 7, 255]))
    }

    #[test]
    fn absent_bitmap_stays_absent() {
        assert_eq!(apply_style(None, ImageStyle::Person, BLUE), None);
        assert_eq!(apply_style(None, ImageStyle::Default, BLUE), None);
    }

    #[test]
    fn default_style_is_identity() {
        let src = gradient(5, 3);
        let out = apply_style(Some(src.clone()), ImageStyle::Default, BLUE).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn person_square_keeps_dimensions_and_center() {
        let src = gradient(16, 16);
        let out = apply_style(Some(src.clone()), ImageStyle::Person, BLUE).unwrap();
        assert_eq!(out.dimensions(), (16, 16));
        assert_eq!(out.get_pixel(8, 8), src.get_pixel(8, 8));
    }

    #[test]
    fn person_square_corners_are_outside_circle() {
        let out = apply_style(Some(gradient(16, 16)), ImageStyle::Person, BLUE).unwrap();
        for (x, y) in [(0, 0), (15, 0), (0, 15), (15, 15)] {
            assert_eq!(out.get_pixel(x, y), &TRANSPARENT_PX, "corner ({x},{y})");
        }
    }

    #[test]
    fn background_shows_through_transparent_source() {
        let src = RgbaImage::from_pixel(10, 10, TRANSPARENT_PX);
        let out = apply_style(Some(src), ImageStyle::Person, BLUE).unwrap();
        assert_eq!(out.get_pixel(5, 5), &BLUE.to_rgba());
        assert_eq!(out.get_pixel(0, 0), &TRANSPARENT_PX);
    }

    #[test]
    fn radius_follows_width_for_tall_source() {
        // 10 wide, 30 tall: circle centered at (5, 15) with radius 5.
        let src = RgbaImage::from_pixel(10, 30, Rgba([9, 9, 9, 255]));
        let out = apply_style(Some(src), ImageStyle::Person, BLUE).unwrap();
        assert_eq!(out.dimensions(), (10, 30));
        assert_eq!(out.get_pixel(5, 15), &Rgba([9, 9, 9, 255]));
        // Top and bottom bands lie outside the circle.
        assert_eq!(out.get_pixel(5, 2), &TRANSPARENT_PX);
        assert_eq!(out.get_pixel(5, 27), &TRANSPARENT_PX);
    }

    #[test]
    fn radius_follows_width_for_wide_source() {
        // 30 wide, 10 tall: radius 15 spans the full height at the center column.
        let src = RgbaImage::from_pixel(30, 10, Rgba([9, 9, 9, 255]));
        let out = apply_style(Some(src), ImageStyle::Person, BLUE).unwrap();
        assert_eq!(out.get_pixel(15, 0), &Rgba([9, 9, 9, 255]));
        assert_eq!(out.get_pixel(15, 9), &Rgba([9, 9, 9, 255]));
        assert_eq!(out.get_pixel(0, 0), &TRANSPARENT_PX);
    }

    #[test]
    fn half_transparent_source_blends_over_background() {
        let src = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 128]));
        let out = apply_style(Some(src), ImageStyle::Person, BLUE).unwrap();
        let px = out.get_pixel(2, 2);
        assert_eq!(px[3], 255);
        assert!(px[0] > 120 && px[0] < 136, "red {px:?}");
        assert!(px[2] > 120 && px[2] < 136, "blue {px:?}");
    }

    #[test]
    fn coverage_follows_pixel_centers() {
        // Away from the rim, a pixel is kept exactly when its center lies
        // inside the circle at (8, 8) with radius 8.
        let src = RgbaImage::from_pixel(16, 16, Rgba([9, 9, 9, 255]));
        let out = apply_style(Some(src), ImageStyle::Person, BLUE).unwrap();
        for (x, y, px) in out.enumerate_pixels() {
            let dx = f64::from(x) + 0.5 - 8.0;
            let dy = f64::from(y) + 0.5 - 8.0;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < 7.5 {
                assert_eq!(px, &Rgba([9, 9, 9, 255]), "({x},{y})");
            } else if dist > 8.5 {
                assert_eq!(px, &TRANSPARENT_PX, "({x},{y})");
            }
        }
    }

    #[test]
    fn one_pixel_wide_source_is_fully_clipped() {
        let out = apply_style(Some(gradient(1, 5)), ImageStyle::Person, BLUE).unwrap();
        assert_eq!(out.dimensions(), (1, 5));
        assert!(out.pixels().all(|p| *p == TRANSPARENT_PX));
    }

    #[test]
    fn zero_sized_bitmap() {
        let out = apply_style(Some(RgbaImage::new(0, 0)), ImageStyle::Person, BLUE).unwrap();
        assert_eq!(out.dimensions(), (0, 0));
    }

    #[test]
    fn only_person_suppresses_background() {
        assert!(ImageStyle::Person.suppresses_view_background());
        assert!(!ImageStyle::Default.suppresses_view_background());
    }

    #[test]
    fn style_parse() {
        assert_eq!("Person".parse::<ImageStyle>().unwrap(), ImageStyle::Person);
        assert!("round".parse::<ImageStyle>().is_err());
    }
}
