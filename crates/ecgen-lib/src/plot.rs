use crate::signal::Strip;
use crate::timebase::GridLine;
use crate::window::PathCmd;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axis {
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub width: f32,
    pub color: Color,
}

/// 0xRRGGBB
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Color(pub u32);

/// Paper-like palette shared by renderers.
pub const TRACE_COLOR: Color = Color(0x1A1A1A);
pub const MINOR_GRID_COLOR: Color = Color(0xF2C4C4);
pub const MAJOR_GRID_COLOR: Color = Color(0xE08E8E);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Series {
    Line(LineSeries),
}

/// Backend-neutral drawable figure; the CLI owns the plotters backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    pub series: Vec<Series>,
}

impl Figure {
    pub fn new(title: impl Into<Option<String>>) -> Self {
        Self {
            title: title.into(),
            x: Axis { label: None },
            y: Axis { label: None },
            series: Vec::new(),
        }
    }

    pub fn add_series(&mut self, series: Series) {
        self.series.push(series);
    }
}

pub trait PlotBackend {
    fn draw(&mut self, fig: &Figure) -> anyhow::Result<()>;
}

/// Ruled-paper background as line series, minor and major weights styled
/// separately.
pub fn grid_series(lines: &[GridLine]) -> Vec<Series> {
    lines
        .iter()
        .map(|line| {
            Series::Line(LineSeries {
                name: String::new(),
                points: vec![line.from, line.to],
                style: Style {
                    width: if line.major { 1.2 } else { 0.5 },
                    color: if line.major {
                        MAJOR_GRID_COLOR
                    } else {
                        MINOR_GRID_COLOR
                    },
                },
            })
        })
        .collect()
}

/// A generated strip as a single trace series.
pub fn figure_from_strip(title: &str, strip: &Strip) -> Figure {
    let mut fig = Figure::new(Some(title.into()));
    fig.x = Axis {
        label: Some("px (time)".into()),
    };
    fig.y = Axis {
        label: Some("px (amplitude)".into()),
    };
    fig.add_series(Series::Line(LineSeries {
        name: title.into(),
        points: strip.samples.iter().map(|s| s.as_point()).collect(),
        style: Style {
            width: 1.6,
            color: TRACE_COLOR,
        },
    }));
    fig
}

/// A cropped window, already expressed as path commands, as a trace series.
pub fn figure_from_path(title: &str, path: &[PathCmd]) -> Figure {
    let mut fig = Figure::new(Some(title.into()));
    fig.add_series(Series::Line(LineSeries {
        name: title.into(),
        points: path.iter().map(|c| c.point()).collect(),
        style: Style {
            width: 1.6,
            color: TRACE_COLOR,
        },
    }));
    fig
}
