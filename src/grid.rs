use kurbo::{Point, Size, Vec2};

use crate::config::GridConfig;
use crate::motion::Motion;

/// One dot of the effect.
///
/// `position` is fixed in layout space for the lifetime of a grid build;
/// only `offset` moves, and only through the motion state machine. Resizes
/// rebuild the whole set, so dots carry no identity across rebuilds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Dot {
    /// Home position in layout coordinates.
    pub position: Point,
    /// Current displacement from home.
    pub offset: Vec2,
    /// Displacement animation state.
    pub motion: Motion,
}

impl Dot {
    fn at(position: Point) -> Self {
        Self {
            position,
            ..Dot::default()
        }
    }

    /// Position drawn this frame, before scroll compensation.
    pub fn displaced(&self) -> Point {
        self.position + self.offset
    }
}

/// Compute the dot lattice covering `layout`, row-major.
///
/// Column count is `floor((width + gap) / (dot_size + gap))` and likewise
/// for rows; the tiled block is centered by splitting the leftover space,
/// so positions are dot centers. Degenerate sizes or spacing give an empty
/// lattice rather than an error.
pub fn build_layout(config: &GridConfig, layout: Size) -> Vec<Point> {
    let cell = config.dot_size + config.gap;
    if !(cell.is_finite() && cell > 0.0) {
        return Vec::new();
    }
    if !(layout.width.is_finite() && layout.height.is_finite()) {
        return Vec::new();
    }

    let cols = ((layout.width + config.gap) / cell).floor();
    let rows = ((layout.height + config.gap) / cell).floor();
    if cols < 1.0 || rows < 1.0 {
        return Vec::new();
    }
    let (cols, rows) = (cols as usize, rows as usize);

    let grid_w = cell * cols as f64 - config.gap;
    let grid_h = cell * rows as f64 - config.gap;
    let start_x = (layout.width - grid_w) / 2.0 + config.dot_size / 2.0;
    let start_y = (layout.height - grid_h) / 2.0 + config.dot_size / 2.0;

    let mut points = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            points.push(Point::new(
                start_x + col as f64 * cell,
                start_y + row as f64 * cell,
            ));
        }
    }
    points
}

/// Build the dot set itself, every dot at rest.
pub fn build_dots(config: &GridConfig, layout: Size) -> Vec<Dot> {
    build_layout(config, layout).into_iter().map(Dot::at).collect()
}
