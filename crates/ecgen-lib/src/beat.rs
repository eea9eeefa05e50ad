use crate::signal::Sample;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Fixed segment durations of one cardiac cycle (seconds). PR and QRS are
/// configurable; everything else follows the didactic template.
pub const P_WAVE_S: f64 = 0.08;
pub const ST_SEGMENT_S: f64 = 0.08;
pub const T_WAVE_S: f64 = 0.16;
pub const BASELINE_RETURN_S: f64 = 0.04;

/// Parameters of a single synthesized beat. Defaults describe a normal
/// sinus beat. Out-of-range values are clamped during sampling, never
/// rejected: a visually degenerate beat beats a failure to render.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BeatConfig {
    /// Peak R amplitude in pixel units.
    pub amplitude: f64,
    /// PR interval, P onset to QRS onset (seconds).
    pub pr_s: f64,
    /// QRS complex duration (seconds).
    pub qrs_s: f64,
    /// ST segment offset from baseline; positive = elevation.
    pub st_offset: f64,
    /// T wave polarity: +1.0 upright, -1.0 inverted.
    pub t_polarity: f64,
}

impl Default for BeatConfig {
    fn default() -> Self {
        Self {
            amplitude: 22.0,
            pr_s: 0.16,
            qrs_s: 0.08,
            st_offset: 0.0,
            t_polarity: 1.0,
        }
    }
}

impl BeatConfig {
    /// Total duration of the five segments after clamping (seconds).
    pub fn duration_s(&self) -> f64 {
        P_WAVE_S
            + (self.pr_s - P_WAVE_S).max(0.0)
            + self.qrs_s.max(0.0)
            + ST_SEGMENT_S
            + T_WAVE_S
            + BASELINE_RETURN_S
    }
}

/// Stylized Q-R-S morphology by fractional position `f` within the complex:
/// a small initial negative deflection, a dominant positive spike peaking at
/// the configured amplitude, a terminal negative deflection, then baseline.
pub fn qrs_shape(f: f64, amplitude: f64) -> f64 {
    if f < 0.15 {
        -0.2 * amplitude * (f / 0.15)
    } else if f < 0.5 {
        let t = (f - 0.15) / 0.35;
        -0.2 * amplitude + t * 1.2 * amplitude
    } else if f < 0.85 {
        let t = (f - 0.5) / 0.35;
        amplitude - t * 1.3 * amplitude
    } else {
        0.0
    }
}

/// Synthesize one cardiac cycle starting at `start_x`, sampled at one pixel
/// per step. `px_per_s` is the sampling density; composers pass a reduced
/// density to draw visually compressed complexes. The returned samples start
/// exactly at `start_x` and are contiguous through all five segments.
pub fn sample_beat(start_x: f64, px_per_s: f64, cfg: &BeatConfig) -> Vec<Sample> {
    let mut samples = Vec::new();
    let mut cursor = 0usize;

    let mut segment = |duration_s: f64, shape: &mut dyn FnMut(f64) -> f64| {
        let n = (duration_s.max(0.0) * px_per_s).round() as usize;
        for i in 0..n {
            let phase = i as f64 / n as f64;
            samples.push(Sample::new(start_x + cursor as f64, shape(phase)));
            cursor += 1;
        }
    };

    let amp = cfg.amplitude;
    // P wave: raised half-sine lobe.
    segment(P_WAVE_S, &mut |phase| 0.25 * amp * (PI * phase).sin());
    // PR segment: isoelectric; degenerates to nothing for short PR.
    segment((cfg.pr_s - P_WAVE_S).max(0.0), &mut |_| 0.0);
    // QRS complex.
    segment(cfg.qrs_s.max(0.0), &mut |phase| qrs_shape(phase, amp));
    // ST segment: flat at the configured offset.
    segment(ST_SEGMENT_S, &mut |_| cfg.st_offset);
    // T wave: half-sine lobe, signed by polarity.
    segment(T_WAVE_S, &mut |phase| {
        0.4 * amp * cfg.t_polarity * (PI * phase).sin()
    });
    // Return to baseline.
    segment(BASELINE_RETURN_S, &mut |_| 0.0);

    samples
}
