use kurbo::{Point, Size, Vec2};

/// Geometry of the host container, sampled at one instant.
///
/// The effect never holds onto one of these; it re-samples through
/// [`HostView`] at every event and frame so scrolls and resizes that happen
/// between calls are always honored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostGeometry {
    /// Visible canvas size in CSS pixels.
    pub viewport: Size,
    /// Full scrollable content size of the container.
    pub scroll_extent: Size,
    /// Current scroll offset.
    pub scroll_offset: Vec2,
    /// Canvas origin in window coordinates.
    pub origin: Point,
    /// Corner rounding of the host, in pixels.
    pub border_radius: f64,
}

impl HostGeometry {
    /// A stationary host whose content exactly fills the viewport.
    pub fn sized(width: f64, height: f64) -> Self {
        Self {
            viewport: Size::new(width, height),
            scroll_extent: Size::new(width, height),
            scroll_offset: Vec2::ZERO,
            origin: Point::ORIGIN,
            border_radius: 0.0,
        }
    }

    /// Window coordinates relative to the canvas.
    pub fn window_to_viewport(&self, window: Point) -> Point {
        (window - self.origin).to_point()
    }

    /// Window coordinates in layout (scroll-compensated) space.
    pub fn window_to_layout(&self, window: Point) -> Point {
        self.window_to_viewport(window) + self.scroll_offset
    }

    /// Size the dot lattice is laid out over: the scrollable extent, but
    /// never smaller than the rounded viewport.
    pub fn layout_size(&self) -> Size {
        let w = self.viewport.width.round().max(0.0);
        let h = self.viewport.height.round().max(0.0);
        Size::new(self.scroll_extent.width.max(w), self.scroll_extent.height.max(h))
    }

    /// Corner radius clamped so opposite corners cannot overlap.
    pub fn clamped_radius(&self) -> f64 {
        let cap = (self.viewport.width.min(self.viewport.height) / 2.0).max(0.0);
        self.border_radius.clamp(0.0, cap)
    }
}

/// Live view onto the host container.
///
/// `None` means the canvas is unmounted; callers treat the cycle as a no-op
/// and try again on the next trigger.
pub trait HostView {
    fn geometry(&self) -> Option<HostGeometry>;
}

/// In-memory host used by the scene player, demos and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticHost {
    geometry: Option<HostGeometry>,
}

impl StaticHost {
    pub fn new(geometry: HostGeometry) -> Self {
        Self {
            geometry: Some(geometry),
        }
    }

    /// A host with no mounted canvas.
    pub fn unmounted() -> Self {
        Self { geometry: None }
    }

    pub fn set_viewport(&mut self, size: Size) {
        if let Some(g) = self.geometry.as_mut() {
            g.viewport = size;
        }
    }

    pub fn set_scroll(&mut self, offset: Vec2) {
        if let Some(g) = self.geometry.as_mut() {
            g.scroll_offset = offset;
        }
    }

    pub fn unmount(&mut self) {
        self.geometry = None;
    }
}

impl HostView for StaticHost {
    fn geometry(&self) -> Option<HostGeometry> {
        self.geometry
    }
}
