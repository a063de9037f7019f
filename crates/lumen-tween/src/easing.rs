//! The fixed set of easing curves a tween can use.
//!
//! Every curve maps `0.0 -> 0.0` and `1.0 -> 1.0`. The back and elastic
//! curves overshoot in between.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// An easing curve applied to normalized tween progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ease {
    #[default]
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    SineIn,
    SineOut,
    SineInOut,
    ExpoIn,
    ExpoOut,
    BackIn,
    BackOut,
    ElasticOut,
    BounceOut,
}

const BACK_C1: f32 = 1.701_58;
const BACK_C3: f32 = BACK_C1 + 1.0;

impl Ease {
    /// Every easing variant, in declaration order.
    pub const ALL: [Ease; 16] = [
        Ease::Linear,
        Ease::QuadIn,
        Ease::QuadOut,
        Ease::QuadInOut,
        Ease::CubicIn,
        Ease::CubicOut,
        Ease::CubicInOut,
        Ease::SineIn,
        Ease::SineOut,
        Ease::SineInOut,
        Ease::ExpoIn,
        Ease::ExpoOut,
        Ease::BackIn,
        Ease::BackOut,
        Ease::ElasticOut,
        Ease::BounceOut,
    ];

    /// Map progress `t` (clamped to `[0, 1]`) through the curve.
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            Ease::Linear => t,
            Ease::QuadIn => t * t,
            Ease::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Ease::CubicIn => t * t * t,
            Ease::CubicOut => 1.0 - (1.0 - t).powi(3),
            Ease::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Ease::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Ease::SineOut => (t * PI / 2.0).sin(),
            Ease::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            // Exact endpoints: the exponential forms only approach 0 and 1.
            Ease::ExpoIn => {
                if t == 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * t - 10.0)
                }
            }
            Ease::ExpoOut => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            Ease::BackIn => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Ease::BackOut => {
                let u = t - 1.0;
                1.0 + BACK_C3 * u * u * u + BACK_C1 * u * u
            }
            Ease::ElasticOut => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    let c4 = (2.0 * PI) / 3.0;
                    2f32.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
                }
            }
            Ease::BounceOut => bounce_out(t),
        }
    }
}

fn bounce_out(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}
