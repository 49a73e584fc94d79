//! Fixed fade curves applied to every spliced event
//!
//! Curve lengths assume 44.1 kHz material and are not rescaled for other rates.

use std::sync::LazyLock;

/// Fade-out length: 20 ms at 44.1 kHz
pub const FADE_OUT_LEN: usize = 882;
/// Fade-in length: ~2 ms at 44.1 kHz
pub const FADE_IN_LEN: usize = 88;

static FADE_OUT: LazyLock<Vec<f32>> = LazyLock::new(|| {
    (0..FADE_OUT_LEN)
        .map(|i| {
            let x = i as f64 / FADE_OUT_LEN as f64;
            (1.0 - x.powi(8)) as f32
        })
        .collect()
});

static FADE_IN: LazyLock<Vec<f32>> = LazyLock::new(|| {
    let last = (FADE_IN_LEN - 1) as f64;
    (0..FADE_IN_LEN).map(|i| (i as f64 / last) as f32).collect()
});

/// `1 - (i/882)^8`: flat near 1.0, diving steeply right before the cut.
pub fn fade_out_curve() -> &'static [f32] {
    &FADE_OUT
}

/// Linear ramp from 0.0 to 1.0 inclusive.
pub fn fade_in_curve() -> &'static [f32] {
    &FADE_IN
}

/// Truncate `raw` to `duration` and apply the fade curves.
///
/// The fade-in is applied only when `should_fade_in` is set and the segment is
/// longer than the fade-in curve; the fade-out whenever the segment is longer
/// than the fade-out curve. Short segments can get both fades overlapping.
pub fn apply_fade(raw: &[f32], should_fade_in: bool, duration: usize) -> Vec<f32> {
    let mut out = raw[..raw.len().min(duration)].to_vec();

    let fade_in = fade_in_curve();
    if should_fade_in && out.len() > fade_in.len() {
        for (sample, gain) in out.iter_mut().zip(fade_in) {
            *sample *= gain;
        }
    }

    let fade_out = fade_out_curve();
    if out.len() > fade_out.len() {
        let tail = out.len() - fade_out.len();
        for (sample, gain) in out[tail..].iter_mut().zip(fade_out) {
            *sample *= gain;
        }
    }

    out
}
