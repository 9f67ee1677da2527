use crate::common::test_utils::{horizontal_ramp, mean_abs_diff, rgb_pattern, solid};
use crate::prelude::*;

const WHITE: [u8; 3] = [255, 255, 255];
const BLACK: [u8; 3] = [0, 0, 0];

fn max_abs_diff(a: &[u8], b: &[u8]) -> u8 {
    a.iter().zip(b).map(|(&x, &y)| x.abs_diff(y)).max().unwrap_or(0)
}

// =============================================================================
// Gray pixel math
// =============================================================================

#[test]
fn gray_pixel_known_value() {
    // wf = 178, wb = 25, alpha = 0.4
    let pixel = GrayMirage::default().pixel(100, 50);
    assert_eq!(pixel, [62, 62, 62, 102]);
}

#[test]
fn gray_pixel_zero_alpha_is_white() {
    // wf = 255, wb = 0: alpha is exactly zero
    let pixel = GrayMirage::default().pixel(254, 0);
    assert_eq!(pixel, [255, 255, 255, 0]);
}

#[test]
fn gray_pixel_channels_match() {
    let mirage = GrayMirage::default();
    for (f, b) in [(0, 0), (0, 255), (255, 255), (37, 211), (200, 10)] {
        let [r, g, b_, _] = mirage.pixel(f, b);
        assert_eq!(r, g);
        assert_eq!(g, b_);
    }
}

#[test]
fn gray_params_reject_non_finite() {
    let mirage = GrayMirage::new(5.0, f64::NAN);
    let result = mirage.composite(&solid(2, 2, &[10]), &solid(2, 2, &[20]));
    assert!(matches!(result, Err(Error::InvalidParameter(_))));

    let mirage = GrayMirage::default().offset(f64::INFINITY);
    assert!(mirage.validate().is_err());
}

// =============================================================================
// Gray reveal
// =============================================================================

fn gray_ramps() -> (Image, Image) {
    let front = horizontal_ramp(256, 4, 0, 255);
    let back = horizontal_ramp(256, 4, 255, 0);
    (front, back)
}

#[test]
fn gray_over_white_shows_scaled_front() {
    let mirage = GrayMirage::default();
    let (front, back) = gray_ramps();

    let output = mirage.composite(&front, &back).unwrap();
    let shown = flatten_over(&output, WHITE).unwrap();

    let expected: Vec<u8> = front
        .bytes()
        .iter()
        .flat_map(|&f| {
            let wf = (f as f64 * mirage.a / 10.0 + mirage.offset).min(255.0);
            [wf.round() as u8; 3]
        })
        .collect();

    assert!(mean_abs_diff(shown.bytes(), &expected) < 2.0);
    assert!(max_abs_diff(shown.bytes(), &expected) <= 2);
}

#[test]
fn gray_over_black_shows_scaled_back() {
    let mirage = GrayMirage::default();
    let (front, back) = gray_ramps();

    let output = mirage.composite(&front, &back).unwrap();
    let shown = flatten_over(&output, BLACK).unwrap();

    let expected: Vec<u8> = back
        .bytes()
        .iter()
        .flat_map(|&b| [(b as f64 * mirage.b / 10.0).round() as u8; 3])
        .collect();

    assert!(mean_abs_diff(shown.bytes(), &expected) < 2.0);
    assert!(max_abs_diff(shown.bytes(), &expected) <= 2);
}

// =============================================================================
// Color pixel math
// =============================================================================

#[test]
fn color_alpha_never_drops_below_one() {
    let mirage = ColorMirage::default();

    let pixel = mirage.pixel([255, 255, 255], [0, 0, 0]);
    assert_eq!(pixel[3], 1);
    assert_eq!(&pixel[..3], &[0, 0, 0]);
}

#[test]
fn color_alpha_stays_in_range() {
    let mirage = ColorMirage::new(2.0, 40.0, 0.5);
    for f in (0..=255).step_by(51) {
        for b in (0..=255).step_by(51) {
            let pixel = mirage.pixel([f as u8, 255 - f as u8, 90], [b as u8, 30, 255 - b as u8]);
            assert!(pixel[3] >= 1);
        }
    }
}

#[test]
fn color_params_validate_weight() {
    assert!(ColorMirage::default().validate().is_ok());
    assert!(ColorMirage::new(0.5, 0.0, 0.0).validate().is_ok());
    assert!(ColorMirage::new(0.5, 0.0, 1.0).validate().is_ok());

    let result = ColorMirage::new(0.5, 0.0, 1.5).composite(&rgb_pattern(2, 2), &rgb_pattern(2, 2));
    assert!(matches!(result, Err(Error::InvalidParameter(_))));
    assert!(ColorMirage::new(0.5, 0.0, -0.1).validate().is_err());
    assert!(ColorMirage::new(f64::NAN, 0.0, 0.2).validate().is_err());
}

// =============================================================================
// Color reveal
// =============================================================================

/// Light gray front and mid-tone colored back. With default parameters no
/// channel clips for these inputs, so both reveals can be compared exactly.
fn color_pair() -> (Image, Image) {
    let size = 16u32;
    let mut front = Vec::new();
    let mut back = Vec::new();
    for y in 0..size {
        for x in 0..size {
            let f = (160 + (x + y) * 40 / 30) as u8;
            front.extend_from_slice(&[f, f, f]);
            back.extend_from_slice(&[
                (100 + x * 40 / 15) as u8,
                (100 + y * 40 / 15) as u8,
                (140 - x * 40 / 15) as u8,
            ]);
        }
    }
    let desc = ImageDesc::new(size, size, ColorFormat::Rgb);
    (
        Image::new_with_data(desc, front).unwrap(),
        Image::new_with_data(desc, back).unwrap(),
    )
}

fn expected_color_reveal(
    mirage: &ColorMirage,
    front: &Image,
    back: &Image,
    over_white: bool,
) -> Vec<u8> {
    front
        .bytes()
        .chunks_exact(3)
        .zip(back.bytes().chunks_exact(3))
        .flat_map(|(f, b)| {
            let f = [f[0] as f64, f[1] as f64, f[2] as f64];
            let b = [b[0] as f64, b[1] as f64, b[2] as f64];
            let front_luma = luma(f[0], f[1], f[2]);
            let back_luma = mirage.a * luma(b[0], b[1], b[2]) + mirage.b;
            (0..3)
                .map(|c| {
                    let base = (1.0 - mirage.w) * f[c] + mirage.w * b[c];
                    let value = if over_white {
                        base
                    } else {
                        base - front_luma + back_luma
                    };
                    value.round().clamp(0.0, 255.0) as u8
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

#[test]
fn color_over_white_shows_blended_base() {
    let mirage = ColorMirage::default();
    let (front, back) = color_pair();

    let output = mirage.composite(&front, &back).unwrap();
    let shown = flatten_over(&output, WHITE).unwrap();
    let expected = expected_color_reveal(&mirage, &front, &back, true);

    assert!(mean_abs_diff(shown.bytes(), &expected) < 1.5);
    assert!(max_abs_diff(shown.bytes(), &expected) <= 3);
}

#[test]
fn color_over_black_shows_back_luma() {
    let mirage = ColorMirage::default();
    let (front, back) = color_pair();

    let output = mirage.composite(&front, &back).unwrap();
    let shown = flatten_over(&output, BLACK).unwrap();
    let expected = expected_color_reveal(&mirage, &front, &back, false);

    assert!(mean_abs_diff(shown.bytes(), &expected) < 1.5);
    assert!(max_abs_diff(shown.bytes(), &expected) <= 3);
}

// =============================================================================
// Shape
// =============================================================================

#[test]
fn output_matches_front_size_for_both_modes() {
    let front = rgb_pattern(8, 6);
    let back = rgb_pattern(3, 11);

    for mode in [MirageMode::Gray, MirageMode::Color] {
        let output = Mirage::with_defaults(mode).composite(&front, &back).unwrap();
        assert_eq!(
            *output.desc(),
            ImageDesc::new(8, 6, ColorFormat::Rgba),
            "{mode} composite has the wrong shape"
        );
        assert_eq!(output.bytes().len(), 8 * 6 * 4);
    }
}

#[test]
fn accepts_inputs_with_alpha() {
    let front = solid(5, 5, &[200, 180, 160, 10]);
    let back = solid(7, 3, &[20, 90]);

    let output = Mirage::with_defaults(MirageMode::Color)
        .composite(&front, &back)
        .unwrap();
    assert_eq!(output.desc().width, 5);
    assert_eq!(output.desc().height, 5);
}

#[test]
fn same_inputs_give_same_output() {
    let front = rgb_pattern(9, 7);
    let back = rgb_pattern(4, 4);
    let mirage = Mirage::with_defaults(MirageMode::Gray);

    let first = mirage.composite(&front, &back).unwrap();
    let second = mirage.composite(&front, &back).unwrap();
    assert_eq!(first.bytes(), second.bytes());
}

#[test]
fn mirage_dispatch_and_mode() {
    let gray: Mirage = GrayMirage::new(4.0, 6.0).into();
    assert_eq!(gray.mode(), MirageMode::Gray);
    let color: Mirage = ColorMirage::default().into();
    assert_eq!(color.mode(), MirageMode::Color);

    assert_eq!(MirageMode::Gray.to_string(), "gray");
    assert_eq!(MirageMode::Color.to_string(), "color");
}

#[test]
fn flatten_opaque_is_identity() {
    let image = solid(3, 3, &[10, 20, 30, 255]);
    let flat = flatten_over(&image, WHITE).unwrap();
    assert!(flat.bytes().chunks_exact(3).all(|px| px == [10, 20, 30]));
}
