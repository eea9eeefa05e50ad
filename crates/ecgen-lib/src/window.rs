use crate::signal::Sample;
use crate::timebase::TimeBase;
use serde::{Deserialize, Serialize};

/// One drawing command of a connected polyline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "to", rename_all = "snake_case")]
pub enum PathCmd {
    MoveTo([f64; 2]),
    LineTo([f64; 2]),
}

impl PathCmd {
    pub fn point(&self) -> [f64; 2] {
        match self {
            PathCmd::MoveTo(p) | PathCmd::LineTo(p) => *p,
        }
    }
}

/// Retain samples whose x falls in `[start_x, end_x]`, translated so the
/// first retained sample lands exactly at x = 0. Samples are filtered, not
/// resampled: the window keeps whatever density the source had there.
pub fn crop(samples: &[Sample], start_x: f64, end_x: f64) -> Vec<Sample> {
    let mut origin = None;
    samples
        .iter()
        .filter(|s| s.x >= start_x && s.x <= end_x)
        .map(|s| {
            let base = *origin.get_or_insert(s.x);
            Sample::new(s.x - base, s.y)
        })
        .collect()
}

/// Same window expressed in seconds, converted through the explicit
/// timebase so magnified views follow the configured paper speed.
pub fn crop_seconds(samples: &[Sample], start_s: f64, end_s: f64, timebase: &TimeBase) -> Vec<Sample> {
    crop(
        samples,
        timebase.seconds_to_px(start_s),
        timebase.seconds_to_px(end_s),
    )
}

/// Linearize samples into a drawable path: a move to the first sample, a
/// line to each subsequent one. Empty input yields an empty path.
pub fn to_path(samples: &[Sample]) -> Vec<PathCmd> {
    samples
        .iter()
        .enumerate()
        .map(|(i, s)| {
            if i == 0 {
                PathCmd::MoveTo(s.as_point())
            } else {
                PathCmd::LineTo(s.as_point())
            }
        })
        .collect()
}
