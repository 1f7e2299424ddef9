//! Stereo placement of mono voices.
//!
//! Each string gets a fixed position in the stereo field, spread from
//! slightly left (low E) to slightly right (high e):
//!
//!   pan = -0.5 + string_index * 0.2
//!
//!   string   0     1     2     3     4     5
//!   pan    -0.5  -0.3  -0.1  +0.1  +0.3  +0.5
//!
//! The pan value is turned into left/right gains with an equal-power law.
//! Mapping pan ∈ [-1, 1] onto an angle x ∈ [0, 1]:
//!
//!   x     = (pan + 1) / 2
//!   left  = cos(x · π/2)
//!   right = sin(x · π/2)
//!
//! left² + right² = 1 for every pan, so a voice has the same loudness
//! wherever it sits. A centred voice gets 0.707 on each side (-3 dB).

use std::f64::consts::FRAC_PI_2;

/// Pan of the lowest string.
pub const PAN_LOW: f64 = -0.5;
/// Pan added per string index.
pub const PAN_STEP: f64 = 0.2;

/// Constant pan position for a string, `-0.5 + string_index * 0.2`.
#[inline]
pub fn string_pan(string_index: usize) -> f64 {
    PAN_LOW + string_index as f64 * PAN_STEP
}

/// Left/right gains for a mono source at a fixed pan position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StereoGains {
    pub left: f32,
    pub right: f32,
}

impl StereoGains {
    /// Equal-power gains for `pan` in [-1, 1] (values outside are clamped).
    pub fn equal_power(pan: f64) -> Self {
        let x = (pan.clamp(-1.0, 1.0) + 1.0) / 2.0;
        Self {
            left: (x * FRAC_PI_2).cos() as f32,
            right: (x * FRAC_PI_2).sin() as f32,
        }
    }

    /// Gains for a string's fixed position.
    pub fn for_string(string_index: usize) -> Self {
        Self::equal_power(string_pan(string_index))
    }

    pub fn center() -> Self {
        Self::equal_power(0.0)
    }
}
