use kurbo::Point;

use crate::config::GridConfig;
use crate::foundation::core::TimeMs;
use crate::grid::{self, Dot};
use crate::host::HostView;
use crate::motion::{self, MotionParams};
use crate::pointer::{PointerState, PointerTracker};
use crate::render::{DotPainter, FrameRGBA};

/// Frame-loop handle for one effect instance.
///
/// `stop` and `start` are idempotent; a stopped loop renders nothing until
/// it is explicitly started again.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderLoop {
    running: bool,
}

impl RenderLoop {
    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// One interactive dot-grid instance.
///
/// Owns every piece of mutable state: the dot set, the pointer tracker,
/// the painter caches and the loop handle. Hosts drive it by forwarding
/// pointer events, resize notifications and frame ticks, always with
/// explicit timestamps; nothing here reads a clock. Instances share no
/// state, so any number can coexist in a process.
pub struct DotGridEffect {
    config: GridConfig,
    params: MotionParams,
    dots: Vec<Dot>,
    tracker: PointerTracker,
    painter: DotPainter,
    render_loop: RenderLoop,
    clock: Option<TimeMs>,
}

impl DotGridEffect {
    pub fn new(config: GridConfig) -> Self {
        let params = MotionParams::from(&config);
        let tracker = PointerTracker::new(config.max_speed);
        let painter = DotPainter::new(&config);
        Self {
            config,
            params,
            dots: Vec::new(),
            tracker,
            painter,
            render_loop: RenderLoop::default(),
            clock: None,
        }
    }

    /// Build the grid for the current host geometry and start the loop.
    pub fn mount(&mut self, host: &dyn HostView) {
        self.rebuild(host);
        self.render_loop.start();
    }

    /// Rebuild the dot lattice after a size change.
    ///
    /// The whole set is replaced, so in-flight displacement is discarded
    /// with it.
    #[tracing::instrument(skip(self, host))]
    pub fn handle_resize(&mut self, host: &dyn HostView) {
        self.rebuild(host);
    }

    fn rebuild(&mut self, host: &dyn HostView) {
        let Some(geometry) = host.geometry() else {
            self.dots.clear();
            return;
        };
        self.dots = grid::build_dots(&self.config, geometry.layout_size());
    }

    /// Advance every dot's motion to `now`. The clock only moves forward;
    /// a stale timestamp advances nothing and leaves the clock alone.
    pub fn advance(&mut self, now: TimeMs) {
        let dt = match self.clock {
            Some(prev) if now.0 > prev.0 => now.since(prev),
            Some(_) => return,
            None => {
                self.clock = Some(now);
                return;
            }
        };
        self.clock = Some(now);
        for dot in &mut self.dots {
            dot.offset = dot.motion.advance(dt, self.params);
        }
    }

    /// Forward a raw pointer-move event in window coordinates.
    ///
    /// Samples are throttled; admitted samples update the shared pointer
    /// state and, above the speed trigger, shove resting dots within the
    /// proximity radius away from the pointer's path.
    pub fn pointer_moved(&mut self, now: TimeMs, window: Point, host: &dyn HostView) {
        let Some(geometry) = host.geometry() else {
            return;
        };
        self.advance(now);
        let Some(state) = self.tracker.track(now, window, &geometry) else {
            return;
        };
        if state.speed <= self.config.speed_trigger {
            return;
        }
        for dot in &mut self.dots {
            if dot.motion.is_active() {
                continue;
            }
            if (dot.position - state.layout).hypot() < self.config.proximity {
                let target = motion::inertia_push(dot.position, state.layout, state.velocity);
                dot.motion.begin_displace(dot.offset, target, self.params);
            }
        }
    }

    /// Forward a click in window coordinates. Clicks are never throttled.
    ///
    /// Resting dots inside the shock radius are pushed away from the click
    /// point with linear falloff.
    pub fn clicked(&mut self, now: TimeMs, window: Point, host: &dyn HostView) {
        let Some(geometry) = host.geometry() else {
            return;
        };
        self.advance(now);
        let click = geometry.window_to_layout(window);
        for dot in &mut self.dots {
            if dot.motion.is_active() {
                continue;
            }
            let distance = (dot.position - click).hypot();
            if distance < self.config.shock_radius {
                let falloff = motion::shock_falloff(distance, self.config.shock_radius);
                let target =
                    motion::shock_push(dot.position, click, self.config.shock_strength, falloff);
                dot.motion.begin_displace(dot.offset, target, self.params);
            }
        }
    }

    /// Rasterize the current state. Does not advance time; the renderer
    /// only reads what events and `advance` have committed.
    ///
    /// `None` when the loop is stopped, the host is unmounted this frame,
    /// or the painter is disabled. An unmounted host skips the frame
    /// without stopping the loop.
    pub fn render_frame(&mut self, host: &dyn HostView) -> Option<FrameRGBA> {
        if !self.render_loop.is_running() {
            return None;
        }
        let geometry = host.geometry()?;
        self.painter.paint(&self.dots, self.tracker.state(), &geometry)
    }

    /// Stop the loop and drop the grid. Safe to call any number of times.
    pub fn teardown(&mut self) {
        self.render_loop.stop();
        self.dots.clear();
        self.clock = None;
    }

    /// The loop handle, for hosts that pause rendering without tearing the
    /// instance down.
    pub fn loop_handle(&mut self) -> &mut RenderLoop {
        &mut self.render_loop
    }

    pub fn is_running(&self) -> bool {
        self.render_loop.is_running()
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    pub fn pointer(&self) -> PointerState {
        self.tracker.state()
    }
}
