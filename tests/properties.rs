//! Property tests over the pure resolution functions: color parsing, size
//! buckets, measurement, layout, and the avatar mask.

use cardimage::*;
use image::{Rgba, RgbaImage};
use proptest::prelude::*;

fn metrics() -> impl Strategy<Value = DisplayMetrics> {
    (1u32..4000, 0.5f32..4.0).prop_map(|(w, d)| DisplayMetrics::new(w, d).unwrap())
}

fn sorted_buckets() -> impl Strategy<Value = ImageSizesConfig> {
    (1u32..200, 0u32..200, 0u32..200)
        .prop_map(|(s, m, l)| ImageSizesConfig::new(s, s + m, s + m + l))
}

fn named_size() -> impl Strategy<Value = ImageSize> {
    prop_oneof![
        Just(ImageSize::Auto),
        Just(ImageSize::Small),
        Just(ImageSize::Medium),
        Just(ImageSize::Large),
        Just(ImageSize::Stretch),
        Just(ImageSize::None),
    ]
}

fn height_mode() -> impl Strategy<Value = HeightMode> {
    prop_oneof![Just(HeightMode::Auto), Just(HeightMode::Stretch)]
}

fn alignment() -> impl Strategy<Value = HorizontalAlignment> {
    prop_oneof![
        Just(HorizontalAlignment::Left),
        Just(HorizontalAlignment::Center),
        Just(HorizontalAlignment::Right),
    ]
}

proptest! {
    // ── Colors ──────────────────────────────────────────────────────────

    #[test]
    fn well_formed_colors_parse_exactly(v in any::<u32>(), upper in any::<bool>()) {
        let text = if upper { format!("#{v:08X}") } else { format!("#{v:08x}") };
        prop_assert_eq!(parse_background_color(Some(&text)), Argb(v));
    }

    #[test]
    fn wrong_length_colors_are_transparent(v in any::<u32>(), keep in 0usize..8) {
        let text = format!("#{v:08X}");
        let short = &text[..=keep];
        prop_assert_eq!(parse_background_color(Some(short)), Argb::TRANSPARENT);
        let long = format!("{text}0");
        prop_assert_eq!(parse_background_color(Some(&long)), Argb::TRANSPARENT);
    }

    #[test]
    fn arbitrary_input_never_panics(s in ".{0,16}") {
        let _ = parse_background_color(Some(&s));
    }

    // ── Size buckets ────────────────────────────────────────────────────

    #[test]
    fn size_limit_positive_and_ordered(sizes in sorted_buckets(), m in metrics()) {
        let small = size_limit(ImageSize::Small, &sizes, &m);
        let medium = size_limit(ImageSize::Medium, &sizes, &m);
        let large = size_limit(ImageSize::Large, &sizes, &m);
        prop_assert!(small >= 1);
        prop_assert!(small <= medium && medium <= large);
        for other in [ImageSize::Auto, ImageSize::Stretch, ImageSize::None] {
            prop_assert_eq!(size_limit(other, &sizes, &m), m.width_pixels);
        }
    }

    #[test]
    fn dp_conversion_truncates(dp in 0u32..10_000, m in metrics()) {
        let px = dp_to_pixels(dp, &m);
        let exact = f64::from(dp) * f64::from(m.density);
        prop_assert!(f64::from(px) <= exact);
        prop_assert!(exact - f64::from(px) < 1.0);
    }

    // ── Measurement ─────────────────────────────────────────────────────

    #[test]
    fn measure_stays_within_caps_and_keeps_aspect(
        size in named_size(),
        sizes in sorted_buckets(),
        m in metrics(),
        sw in 1u32..5000,
        sh in 1u32..5000,
        available in 1u32..5000,
    ) {
        let c = SizeConstraints::from_named(size, &sizes, &m);
        prop_assert!(c.preserves_aspect_ratio());
        let out = c.measure(Size::new(sw, sh), available);

        let cap = c.max_width.map_or(available, |w| w.min(available)).max(1);
        prop_assert!(out.width <= cap.max(1));
        prop_assert!(out.width <= sw && out.height <= sh);

        let (w, h) = (u64::from(out.width), u64::from(out.height));
        let skew = (w * u64::from(sh)).abs_diff(h * u64::from(sw));
        prop_assert!(skew <= u64::from(sw.max(sh)), "{sw}x{sh} -> {w}x{h}");
    }

    #[test]
    fn fixed_box_measures_to_itself(
        w in 1u32..500,
        h in 1u32..500,
        m in metrics(),
        sw in 0u32..5000,
        sh in 0u32..5000,
    ) {
        let c = SizeConstraints::from_pixels(w, h, &m).unwrap();
        let fixed = c.fixed.unwrap();
        prop_assert_eq!(fixed, Size::new(dp_to_pixels(w, &m), dp_to_pixels(h, &m)));
        prop_assert_eq!(c.measure(Size::new(sw, sh), 100), fixed);
        prop_assert!(!c.preserves_aspect_ratio());
    }

    // ── Layout ──────────────────────────────────────────────────────────

    #[test]
    fn wrapper_only_for_standalone_stretch_height(
        size in named_size(),
        height in height_mode(),
        align in alignment(),
        in_collection in any::<bool>(),
    ) {
        let layout = build_layout(size, height, align, in_collection);
        prop_assert_eq!(layout, build_layout(size, height, align, in_collection));
        prop_assert_eq!(layout.wrapper, !in_collection && height == HeightMode::Stretch);
        prop_assert_eq!(layout.params, build_layout(size, height, align, !in_collection).params);
        prop_assert_eq!(layout.params.gravity, HorizontalGravity::from(align));
        prop_assert_eq!(layout.params.is_weighted(), height == HeightMode::Stretch);
    }

    #[test]
    fn split_puts_fixed_box_on_image(
        size in named_size(),
        height in height_mode(),
        in_collection in any::<bool>(),
        w in 1u32..1000,
        h in 1u32..1000,
    ) {
        let layout = build_layout(size, height, HorizontalAlignment::Left, in_collection);
        let (image, wrapper) = layout.split(Some(Size::new(w, h)));
        prop_assert_eq!(image.width, Dimension::Exact(w));
        prop_assert_eq!(image.height, Dimension::Exact(h));
        prop_assert_eq!(wrapper.is_some(), layout.wrapper);
    }

    // ── Avatar mask ─────────────────────────────────────────────────────

    #[test]
    fn person_mask_keeps_or_clears_each_pixel(
        w in 0u32..40,
        h in 0u32..40,
        rgb in any::<[u8; 3]>(),
        bg in any::<u32>(),
    ) {
        let px = Rgba([rgb[0], rgb[1], rgb[2], 255]);
        let src = RgbaImage::from_pixel(w, h, px);
        let out = apply_style(Some(src), ImageStyle::Person, Argb(bg)).unwrap();
        prop_assert_eq!(out.dimensions(), (w, h));
        for p in out.pixels() {
            prop_assert!(*p == px || *p == Rgba([0, 0, 0, 0]));
        }
    }

    #[test]
    fn square_avatars_have_clear_corners(side in 4u32..64, bg in any::<u32>()) {
        let src = RgbaImage::from_pixel(side, side, Rgba([9, 9, 9, 255]));
        let out = apply_style(Some(src), ImageStyle::Person, Argb(bg)).unwrap();
        let last = side - 1;
        for (x, y) in [(0, 0), (last, 0), (0, last), (last, last)] {
            prop_assert_eq!(out.get_pixel(x, y)[3], 0);
        }
        prop_assert_eq!(out.get_pixel(side / 2, side / 2), &Rgba([9, 9, 9, 255]));
    }
}
