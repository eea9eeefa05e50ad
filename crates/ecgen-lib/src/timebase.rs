use serde::{Deserialize, Serialize};

/// Shared coordinate system for strip generation and grid rendering.
///
/// Standard ECG paper runs at 25 mm/s; with a minor box of `minor_box` pixels
/// per millimetre the paper speed becomes `25 * minor_box` pixels per second.
/// The struct is immutable after construction and passed explicitly to every
/// component, so alternate paper speeds (e.g. 50 mm/s) only require building
/// a different `TimeBase`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimeBase {
    /// Pixel size of the smallest ruled square (1 mm).
    pub minor_box: f64,
    /// Paper speed in pixels per second.
    pub px_per_second: f64,
    /// Canonical strip duration in seconds.
    pub strip_seconds: f64,
    /// Right-edge gap composers must leave free, in pixels.
    pub trailing_margin: f64,
}

impl Default for TimeBase {
    fn default() -> Self {
        Self {
            minor_box: 6.0,
            px_per_second: 150.0,
            strip_seconds: 6.0,
            trailing_margin: 10.0,
        }
    }
}

/// One ruled paper line. Every 5th line is `major` (small boxes grouped
/// into big boxes, per ECG paper convention).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GridLine {
    pub from: [f64; 2],
    pub to: [f64; 2],
    pub major: bool,
}

impl TimeBase {
    /// Derived canonical strip width in pixels.
    pub fn strip_width(&self) -> f64 {
        self.px_per_second * self.strip_seconds
    }

    /// Convert elapsed seconds to the shared pixel unit.
    pub fn seconds_to_px(&self, seconds: f64) -> f64 {
        seconds * self.px_per_second
    }

    /// Vertical and horizontal ruling for a `width` x `height` area at
    /// `minor_box` spacing. Pure function of its inputs.
    pub fn grid_lines(&self, width: f64, height: f64) -> Vec<GridLine> {
        let mut lines = Vec::new();
        let step = self.minor_box;
        if step <= 0.0 {
            return lines;
        }
        let mut i = 0usize;
        let mut x = 0.0;
        while x <= width {
            lines.push(GridLine {
                from: [x, 0.0],
                to: [x, height],
                major: i % 5 == 0,
            });
            i += 1;
            x = i as f64 * step;
        }
        let mut j = 0usize;
        let mut y = 0.0;
        while y <= height {
            lines.push(GridLine {
                from: [0.0, y],
                to: [width, y],
                major: j % 5 == 0,
            });
            j += 1;
            y = j as f64 * step;
        }
        lines
    }
}
