use serde::{Deserialize, Serialize};

/// One point of a generated waveform. `x` is elapsed time scaled by the
/// paper speed (pixels), `y` is the amplitude deviation from the isoelectric
/// baseline in the same unit. Positive `y` is above baseline; renderers with
/// a screen-down y axis flip at the edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn as_point(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

/// A full fixed-duration strip of samples for one rhythm. Sample `x` values
/// are non-decreasing. Strips are produced fresh per request and never
/// cached by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strip {
    pub samples: Vec<Sample>,
}

impl Strip {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Horizontal extent covered by the samples, in pixels.
    pub fn width_px(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.x - first.x,
            _ => 0.0,
        }
    }
}
