use kurbo::{Affine, Circle, Point, RoundedRect, Shape, Size};

use crate::config::GridConfig;
use crate::foundation::color::Rgb8;
use crate::grid::Dot;
use crate::host::HostGeometry;
use crate::pointer::PointerState;

/// One rasterized frame in RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Fully transparent frame of the given size.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
            premultiplied: true,
        }
    }

    /// Composite the frame over an opaque background color, producing
    /// straight-alpha pixels ready for PNG encoding.
    pub fn over_background(&self, background: Rgb8) -> Vec<u8> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let inv_a = 255 - u16::from(px[3]);
            px[0] = add_sat(px[0], mul_div255(u16::from(background.r), inv_a));
            px[1] = add_sat(px[1], mul_div255(u16::from(background.g), inv_a));
            px[2] = add_sat(px[2], mul_div255(u16::from(background.b), inv_a));
            px[3] = 255;
        }
        out
    }

    /// Convert premultiplied pixels to straight alpha.
    pub fn to_straight_alpha(&self) -> Vec<u8> {
        let mut out = self.data.clone();
        if !self.premultiplied {
            return out;
        }
        for px in out.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a > 0 && a < 255 {
                px[0] = (((u16::from(px[0]) * 255) + a / 2) / a).min(255) as u8;
                px[1] = (((u16::from(px[1]) * 255) + a / 2) / a).min(255) as u8;
                px[2] = (((u16::from(px[2]) * 255) + a / 2) / a).min(255) as u8;
            }
        }
        out
    }
}

/// Render counters, mostly interesting to tests and diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PainterStats {
    /// Frames rasterized so far.
    pub frames: u64,
    /// Corner masks built so far; stays flat while geometry is stable.
    pub mask_builds: u64,
}

struct CornerMask {
    width: u16,
    height: u16,
    radius: f64,
    data: Vec<u8>,
}

/// Rasterizes the dot set into RGBA frames.
///
/// The vello context and the corner mask are cached across frames and
/// rebuilt only when the canvas geometry changes. Construction decides once
/// whether the dot shape is drawable at all; a painter built from a
/// degenerate `dot_size` stays disabled for the instance's lifetime.
pub struct DotPainter {
    base: Rgb8,
    active: Rgb8,
    proximity: f64,
    proximity_sq: f64,
    prototype: Option<vello_cpu::kurbo::BezPath>,
    ctx: Option<vello_cpu::RenderContext>,
    mask: Option<CornerMask>,
    stats: PainterStats,
}

impl DotPainter {
    pub fn new(config: &GridConfig) -> Self {
        Self {
            base: config.base_color,
            active: config.active_color,
            proximity: config.proximity,
            proximity_sq: config.proximity * config.proximity,
            prototype: circle_prototype(config.dot_size),
            ctx: None,
            mask: None,
            stats: PainterStats::default(),
        }
    }

    /// `false` when the dot shape could not be built and the painter
    /// renders nothing.
    pub fn is_enabled(&self) -> bool {
        self.prototype.is_some()
    }

    pub fn stats(&self) -> PainterStats {
        self.stats
    }

    /// Paint one frame of the grid.
    ///
    /// Dot color blends from base to active inside the proximity radius,
    /// measured from the dot's home position to the pointer's layout
    /// position with the scroll sampled now, not at pointer-event time.
    /// Returns `None` for unpaintable canvases (zero-sized viewport or a
    /// disabled painter).
    pub fn paint(
        &mut self,
        dots: &[Dot],
        pointer: PointerState,
        geometry: &HostGeometry,
    ) -> Option<FrameRGBA> {
        let (width, height) = canvas_size(geometry.viewport)?;
        let prototype = self.prototype.as_ref()?;

        let scroll = geometry.scroll_offset;
        let probe = pointer.viewport + scroll;

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        for dot in dots {
            let color = self.dot_color(dot.position, probe);
            let screen = dot.displaced() - scroll;
            ctx.set_transform(affine_to_cpu(Affine::translate(screen.to_vec2())));
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                color.r, color.g, color.b, 255,
            ));
            ctx.fill_path(prototype);
        }
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        pixmap.data_as_u8_slice_mut().fill(0);
        ctx.render_to_pixmap(&mut pixmap);

        let radius = geometry.clamped_radius();
        if radius > 0.0 {
            self.ensure_mask(&mut ctx, width, height, radius);
            if let Some(mask) = &self.mask {
                mask_multiply(pixmap.data_as_u8_slice_mut(), &mask.data);
            }
        }
        self.ctx = Some(ctx);
        self.stats.frames += 1;

        Some(FrameRGBA {
            width: u32::from(width),
            height: u32::from(height),
            data: pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        })
    }

    fn dot_color(&self, position: Point, probe: Point) -> Rgb8 {
        let d_sq = (position - probe).hypot2();
        if self.proximity > 0.0 && d_sq <= self.proximity_sq {
            let t = 1.0 - d_sq.sqrt() / self.proximity;
            self.base.lerp(self.active, t)
        } else {
            self.base
        }
    }

    /// Rebuild the cached rounded-corner mask when the canvas size or
    /// radius changed.
    fn ensure_mask(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        width: u16,
        height: u16,
        radius: f64,
    ) {
        if let Some(mask) = &self.mask
            && mask.width == width
            && mask.height == height
            && mask.radius == radius
        {
            return;
        }

        ctx.reset();
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        let rr = RoundedRect::new(0.0, 0.0, f64::from(width), f64::from(height), radius);
        let mut path = vello_cpu::kurbo::BezPath::new();
        for el in rr.path_elements(0.1) {
            path.push(el);
        }
        ctx.fill_path(&path);
        ctx.flush();

        let mut pixmap = vello_cpu::Pixmap::new(width, height);
        pixmap.data_as_u8_slice_mut().fill(0);
        ctx.render_to_pixmap(&mut pixmap);
        ctx.reset();

        self.mask = Some(CornerMask {
            width,
            height,
            radius,
            data: pixmap.data_as_u8_slice().to_vec(),
        });
        self.stats.mask_builds += 1;
    }
}

/// Canvas pixel size for a viewport: rounded, at least 1x1, capped at the
/// raster ceiling. `None` when the viewport rounds to nothing.
pub(crate) fn canvas_size(viewport: Size) -> Option<(u16, u16)> {
    let w = viewport.width.round();
    let h = viewport.height.round();
    if !(w.is_finite() && h.is_finite()) || w < 1.0 || h < 1.0 {
        return None;
    }
    Some((
        w.min(f64::from(u16::MAX)) as u16,
        h.min(f64::from(u16::MAX)) as u16,
    ))
}

/// Circle of diameter `dot_size` centered at the origin, flattened once and
/// translated per dot. `None` disables the painter.
fn circle_prototype(dot_size: f64) -> Option<vello_cpu::kurbo::BezPath> {
    if !(dot_size.is_finite() && dot_size > 0.0) {
        return None;
    }
    let circle = Circle::new(Point::ORIGIN, dot_size / 2.0);
    let mut path = vello_cpu::kurbo::BezPath::new();
    for el in circle.path_elements(0.1) {
        path.push(el);
    }
    Some(path)
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

/// Multiply premultiplied RGBA pixels by the mask's alpha channel.
fn mask_multiply(dst: &mut [u8], mask: &[u8]) {
    debug_assert_eq!(dst.len(), mask.len());
    for (d, m) in dst.chunks_exact_mut(4).zip(mask.chunks_exact(4)) {
        let w = u16::from(m[3]);
        d[0] = mul_div255(u16::from(d[0]), w);
        d[1] = mul_div255(u16::from(d[1]), w);
        d[2] = mul_div255(u16::from(d[2]), w);
        d[3] = mul_div255(u16::from(d[3]), w);
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    ((x * y + 127) / 255) as u8
}

fn add_sat(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid;
    use kurbo::Vec2;

    fn pixel(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * frame.width + x) * 4) as usize;
        [
            frame.data[i],
            frame.data[i + 1],
            frame.data[i + 2],
            frame.data[i + 3],
        ]
    }

    fn one_dot_config() -> GridConfig {
        GridConfig {
            dot_size: 5.0,
            gap: 6.0,
            base_color: Rgb8::new(82, 39, 255),
            active_color: Rgb8::new(0, 255, 255),
            // Small enough that a pointer parked at the origin does not
            // tint dots across these tiny test canvases.
            proximity: 4.0,
            ..GridConfig::default()
        }
    }

    #[test]
    fn degenerate_dot_size_disables_painting() {
        let config = GridConfig {
            dot_size: 0.0,
            ..GridConfig::default()
        };
        let mut painter = DotPainter::new(&config);
        assert!(!painter.is_enabled());

        let geometry = HostGeometry::sized(64.0, 64.0);
        let dots = grid::build_dots(&GridConfig::default(), geometry.layout_size());
        assert!(
            painter
                .paint(&dots, PointerState::default(), &geometry)
                .is_none()
        );
    }

    #[test]
    fn zero_viewport_paints_nothing() {
        let mut painter = DotPainter::new(&GridConfig::default());
        let geometry = HostGeometry::sized(0.0, 0.0);
        assert!(
            painter
                .paint(&[], PointerState::default(), &geometry)
                .is_none()
        );
    }

    #[test]
    fn dot_centers_are_opaque_base_colored() {
        let config = one_dot_config();
        let geometry = HostGeometry::sized(11.0, 11.0);
        let dots = grid::build_dots(&config, geometry.layout_size());
        assert_eq!(dots.len(), 1);
        assert_eq!(dots[0].position, Point::new(5.5, 5.5));

        let mut painter = DotPainter::new(&config);
        // Pointer far away: the dot keeps its base color.
        let frame = painter
            .paint(&dots, PointerState::default(), &geometry)
            .unwrap();
        let px = pixel(&frame, 5, 5);
        assert_eq!(px, [82, 39, 255, 255]);
        // Outside the dot the canvas is untouched.
        assert_eq!(pixel(&frame, 0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn pointer_on_dot_paints_active_color() {
        let config = one_dot_config();
        let geometry = HostGeometry::sized(11.0, 11.0);
        let dots = grid::build_dots(&config, geometry.layout_size());

        let pointer = PointerState {
            viewport: dots[0].position,
            layout: dots[0].position,
            ..PointerState::default()
        };
        let mut painter = DotPainter::new(&config);
        let frame = painter.paint(&dots, pointer, &geometry).unwrap();
        assert_eq!(pixel(&frame, 5, 5), [0, 255, 255, 255]);
    }

    #[test]
    fn dot_at_the_proximity_edge_keeps_the_base_color() {
        let config = one_dot_config();
        let geometry = HostGeometry::sized(11.0, 11.0);
        let dots = grid::build_dots(&config, geometry.layout_size());

        // Exactly `proximity` away: inside the gate, but the blend sits
        // at zero.
        let probe = dots[0].position + Vec2::new(config.proximity, 0.0);
        let pointer = PointerState {
            viewport: probe,
            layout: probe,
            ..PointerState::default()
        };
        let mut painter = DotPainter::new(&config);
        let frame = painter.paint(&dots, pointer, &geometry).unwrap();
        assert_eq!(pixel(&frame, 5, 5), [82, 39, 255, 255]);
    }

    #[test]
    fn scroll_shifts_dots_on_screen_but_not_their_color_probe() {
        let config = one_dot_config();
        let mut geometry = HostGeometry::sized(11.0, 11.0);
        geometry.scroll_extent = Size::new(22.0, 11.0);
        geometry.scroll_offset = Vec2::new(11.0, 0.0);

        let dots = grid::build_dots(&config, geometry.layout_size());
        assert_eq!(dots.len(), 2);

        // Pointer rests on the second dot in layout space.
        let pointer = PointerState {
            viewport: dots[1].position - geometry.scroll_offset,
            ..PointerState::default()
        };
        let mut painter = DotPainter::new(&config);
        let frame = painter.paint(&dots, pointer, &geometry).unwrap();

        // The scrolled view shows the second dot at the first cell's screen
        // position, in the active color.
        let screen = dots[1].position - geometry.scroll_offset;
        assert_eq!(
            pixel(&frame, screen.x as u32, screen.y as u32),
            [0, 255, 255, 255]
        );
    }

    #[test]
    fn corner_mask_zeroes_corners_and_is_cached() {
        let config = one_dot_config();
        let mut geometry = HostGeometry::sized(11.0, 11.0);
        geometry.border_radius = 5.0;

        // A dot whose offset parks it over the canvas corner.
        let mut dots = grid::build_dots(&config, geometry.layout_size());
        dots[0].offset = Vec2::new(-5.5, -5.5);

        let mut painter = DotPainter::new(&config);
        let frame = painter
            .paint(&dots, PointerState::default(), &geometry)
            .unwrap();
        // Center of the (displaced) dot would be at (0, 0); the rounded
        // corner clips it away entirely.
        assert_eq!(pixel(&frame, 0, 0), [0, 0, 0, 0]);
        assert_eq!(painter.stats().mask_builds, 1);

        painter
            .paint(&dots, PointerState::default(), &geometry)
            .unwrap();
        assert_eq!(painter.stats().mask_builds, 1, "stable geometry reuses the mask");

        geometry.border_radius = 2.0;
        painter
            .paint(&dots, PointerState::default(), &geometry)
            .unwrap();
        assert_eq!(painter.stats().mask_builds, 2, "radius change rebuilds the mask");
    }

    #[test]
    fn identical_input_renders_identical_frames() {
        let config = one_dot_config();
        let geometry = HostGeometry::sized(48.0, 32.0);
        let dots = grid::build_dots(&config, geometry.layout_size());

        let mut a = DotPainter::new(&config);
        let mut b = DotPainter::new(&config);
        let fa = a.paint(&dots, PointerState::default(), &geometry).unwrap();
        let fb = b.paint(&dots, PointerState::default(), &geometry).unwrap();
        assert_eq!(fa, fb);
    }

    #[test]
    fn background_composite_produces_opaque_pixels() {
        let frame = FrameRGBA::transparent(2, 1);
        let out = frame.over_background(Rgb8::new(10, 20, 30));
        assert_eq!(out, vec![10, 20, 30, 255, 10, 20, 30, 255]);
    }
}
