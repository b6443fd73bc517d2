//! Appearance descriptors
//!
//! This module turns the image region under a detection into a fixed-length
//! color histogram that can be compared across regions of different size.

use crate::rect::Rect;
use image::{imageops, imageops::FilterType, Rgb, RgbImage};
use nalgebra::SVector;
use tracing::trace;

pub const HUE_BINS: usize = 4;
pub const SATURATION_BINS: usize = 4;
pub const VALUE_BINS: usize = 2;
pub const APPEARANCE_DIM: usize = HUE_BINS * SATURATION_BINS * VALUE_BINS;

/// Canonical patch size every region is resampled to before binning.
pub const CANONICAL_WIDTH: u32 = 16;
pub const CANONICAL_HEIGHT: u32 = 32;

// 8-bit hue range, degrees halved.
const HUE_RANGE: u32 = 180;
const CHANNEL_RANGE: u32 = 256;
const NORM_EPS: f32 = 1e-8;

/// Normalized HSV histogram, flattened hue-major, then saturation, then value.
pub type Appearance = SVector<f32, APPEARANCE_DIM>;

/// Compute the appearance descriptor of `rect` inside `frame`.
///
/// The box is clipped to the frame first. A region that is empty after
/// clipping yields the zero vector; any other region yields non-negative
/// components summing to ~1.
pub fn extract_appearance(frame: &RgbImage, rect: &Rect<f32>) -> Appearance {
    let Some((x, y, width, height)) = rect.clip_to_frame(frame.width(), frame.height())
    else {
        trace!(?rect, "degenerate region, using zero appearance");
        return Appearance::zeros();
    };

    let region = imageops::crop_imm(frame, x, y, width, height).to_image();
    let canonical = imageops::resize(
        &region,
        CANONICAL_WIDTH,
        CANONICAL_HEIGHT,
        FilterType::Triangle,
    );

    let mut hist = Appearance::zeros();
    for pixel in canonical.pixels() {
        hist[histogram_bin(pixel)] += 1.0;
    }

    let total = hist.sum();
    hist / (total + NORM_EPS)
}

/// Whether a descriptor carries no appearance signal at all.
pub fn is_degenerate(appearance: &Appearance) -> bool {
    appearance.iter().all(|&v| v == 0.0)
}

/// Convert an RGB pixel to 8-bit HSV: hue in [0, 180), saturation and value
/// in [0, 255].
///
/// Hue is halved and rounded before wrapping, so hues just below 360 degrees
/// land on 0 together with hues just above it.
pub fn rgb_to_hsv(pixel: &Rgb<u8>) -> (u32, u32, u32) {
    let [r, g, b] = pixel.0.map(|c| c as i32);
    let v = r.max(g).max(b);
    let min = r.min(g).min(b);
    let diff = v - min;

    let s = if v == 0 {
        0
    } else {
        ((255 * diff) as f32 / v as f32).round() as i32
    };

    let h = if diff == 0 {
        0.0
    } else {
        let degrees = if v == r {
            60.0 * (g - b) as f32 / diff as f32
        } else if v == g {
            120.0 + 60.0 * (b - r) as f32 / diff as f32
        } else {
            240.0 + 60.0 * (r - g) as f32 / diff as f32
        };
        if degrees < 0.0 {
            degrees + 360.0
        } else {
            degrees
        }
    };

    ((h / 2.0).round() as u32 % HUE_RANGE, s as u32, v as u32)
}

fn histogram_bin(pixel: &Rgb<u8>) -> usize {
    let (h, s, v) = rgb_to_hsv(pixel);
    let h_bin = ((h * HUE_BINS as u32 / HUE_RANGE) as usize).min(HUE_BINS - 1);
    let s_bin = ((s * SATURATION_BINS as u32 / CHANNEL_RANGE) as usize).min(SATURATION_BINS - 1);
    let v_bin = ((v * VALUE_BINS as u32 / CHANNEL_RANGE) as usize).min(VALUE_BINS - 1);

    (h_bin * SATURATION_BINS + s_bin) * VALUE_BINS + v_bin
}
