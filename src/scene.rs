use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::GridConfig;
use crate::effect::DotGridEffect;
use crate::foundation::core::{Fps, FrameIndex, TimeMs};
use crate::foundation::error::{DotfieldError, DotfieldResult};
use crate::host::{HostGeometry, HostView, StaticHost};
use crate::render::FrameRGBA;

/// Host container description for offline playback.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostSpec {
    /// Viewport width in CSS pixels.
    pub width: f64,
    /// Viewport height in CSS pixels.
    pub height: f64,
    /// Scrollable content width; zero means "same as the viewport".
    pub content_width: f64,
    /// Scrollable content height; zero means "same as the viewport".
    pub content_height: f64,
    /// Corner rounding of the canvas.
    pub border_radius: f64,
}

impl Default for HostSpec {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 360.0,
            content_width: 0.0,
            content_height: 0.0,
            border_radius: 0.0,
        }
    }
}

impl HostSpec {
    fn geometry(&self) -> HostGeometry {
        HostGeometry {
            viewport: Size::new(self.width, self.height),
            scroll_extent: Size::new(self.content_width, self.content_height),
            scroll_offset: Vec2::ZERO,
            origin: Point::ORIGIN,
            border_radius: self.border_radius,
        }
    }

    fn validate(&self) -> DotfieldResult<()> {
        for (name, v) in [
            ("host.width", self.width),
            ("host.height", self.height),
            ("host.content_width", self.content_width),
            ("host.content_height", self.content_height),
            ("host.border_radius", self.border_radius),
        ] {
            if !v.is_finite() {
                return Err(DotfieldError::validation(format!("{name} must be finite")));
            }
        }
        if self.width < 1.0 || self.height < 1.0 {
            return Err(DotfieldError::validation(
                "host viewport must be at least 1x1",
            ));
        }
        if self.content_width < 0.0 || self.content_height < 0.0 || self.border_radius < 0.0 {
            return Err(DotfieldError::validation(
                "host content sizes and border_radius must be >= 0",
            ));
        }
        Ok(())
    }
}

/// One scripted interaction at a fixed timestamp.
///
/// `move` and `click` carry window coordinates; `scroll` sets the absolute
/// scroll offset; `resize` replaces the viewport size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptEvent {
    Move { at_ms: f64, x: f64, y: f64 },
    Click { at_ms: f64, x: f64, y: f64 },
    Scroll { at_ms: f64, x: f64, y: f64 },
    Resize { at_ms: f64, width: f64, height: f64 },
}

impl ScriptEvent {
    pub fn at_ms(&self) -> f64 {
        match *self {
            ScriptEvent::Move { at_ms, .. }
            | ScriptEvent::Click { at_ms, .. }
            | ScriptEvent::Scroll { at_ms, .. }
            | ScriptEvent::Resize { at_ms, .. } => at_ms,
        }
    }

    fn validate(&self, index: usize, duration_ms: f64) -> DotfieldResult<()> {
        let at = self.at_ms();
        if !at.is_finite() || at < 0.0 || at > duration_ms {
            return Err(DotfieldError::validation(format!(
                "event {index}: at_ms {at} outside [0, {duration_ms}]"
            )));
        }
        let fields_ok = match *self {
            ScriptEvent::Move { x, y, .. }
            | ScriptEvent::Click { x, y, .. }
            | ScriptEvent::Scroll { x, y, .. } => x.is_finite() && y.is_finite(),
            ScriptEvent::Resize { width, height, .. } => {
                width.is_finite() && height.is_finite() && width >= 1.0 && height >= 1.0
            }
        };
        if !fields_ok {
            return Err(DotfieldError::validation(format!(
                "event {index}: non-finite or degenerate coordinates"
            )));
        }
        Ok(())
    }
}

/// A replayable interaction script over one grid instance.
///
/// The scene is the crate's stand-in for a browser session: a host, a grid
/// configuration and a timeline of pointer activity, all explicit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub fps: Fps,
    /// Playback length in seconds.
    pub duration_s: f64,
    #[serde(default)]
    pub host: HostSpec,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

impl Scene {
    pub fn from_json(json: &str) -> DotfieldResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| DotfieldError::scene(format!("invalid scene JSON: {e}")))
    }

    pub fn to_json(&self) -> DotfieldResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DotfieldError::scene(format!("cannot serialize scene: {e}")))
    }

    /// Frames the scene plays for.
    pub fn frame_count(&self) -> u64 {
        self.fps.secs_to_frames_floor(self.duration_s)
    }

    pub fn validate(&self) -> DotfieldResult<()> {
        if self.fps.num == 0 || self.fps.den == 0 {
            return Err(DotfieldError::validation("fps must have num>0 and den>0"));
        }
        if !self.duration_s.is_finite() || self.duration_s <= 0.0 {
            return Err(DotfieldError::validation("duration_s must be > 0"));
        }
        if self.frame_count() == 0 {
            return Err(DotfieldError::validation(
                "duration_s is shorter than one frame",
            ));
        }
        self.host.validate()?;
        self.grid.validate()?;

        let duration_ms = self.duration_s * 1000.0;
        let mut prev = 0.0_f64;
        for (i, ev) in self.events.iter().enumerate() {
            ev.validate(i, duration_ms)?;
            if ev.at_ms() < prev {
                return Err(DotfieldError::validation(format!(
                    "event {i}: timestamps must be non-decreasing"
                )));
            }
            prev = ev.at_ms();
        }
        Ok(())
    }
}

/// Replays a scene deterministically, one frame at a time.
///
/// Events are applied at their own timestamps, motion is advanced to each
/// frame's presentation instant, and the frame is rasterized from whatever
/// state that leaves behind. Two players over the same scene produce
/// byte-identical frames.
pub struct ScenePlayer {
    scene: Scene,
    effect: DotGridEffect,
    host: StaticHost,
    next_event: usize,
    frame: FrameIndex,
}

impl ScenePlayer {
    pub fn new(scene: Scene) -> DotfieldResult<Self> {
        scene.validate()?;
        let mut effect = DotGridEffect::new(scene.grid.clone());
        let host = StaticHost::new(scene.host.geometry());
        effect.mount(&host);
        Ok(Self {
            scene,
            effect,
            host,
            next_event: 0,
            frame: FrameIndex(0),
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Render the next frame, or `None` past the end of the scene.
    #[tracing::instrument(skip(self), fields(frame = self.frame.0))]
    pub fn next_frame(&mut self) -> Option<(FrameIndex, FrameRGBA)> {
        if self.frame.0 >= self.scene.frame_count() {
            return None;
        }
        let index = self.frame;
        let present = self.scene.fps.frame_time(index);

        while let Some(ev) = self.scene.events.get(self.next_event).copied() {
            if ev.at_ms() > present.0 {
                break;
            }
            self.next_event += 1;
            self.apply_event(ev);
        }
        self.effect.advance(present);

        let (blank_w, blank_h) = self
            .host
            .geometry()
            .and_then(|g| crate::render::canvas_size(g.viewport))
            .unwrap_or((1, 1));
        let frame = self
            .effect
            .render_frame(&self.host)
            .unwrap_or_else(|| FrameRGBA::transparent(u32::from(blank_w), u32::from(blank_h)));

        self.frame = FrameIndex(index.0 + 1);
        Some((index, frame))
    }

    /// Render every remaining frame through `sink`.
    pub fn render_all(
        &mut self,
        mut sink: impl FnMut(FrameIndex, FrameRGBA) -> DotfieldResult<()>,
    ) -> DotfieldResult<()> {
        while let Some((index, frame)) = self.next_frame() {
            sink(index, frame)?;
        }
        Ok(())
    }

    fn apply_event(&mut self, ev: ScriptEvent) {
        let at = TimeMs(ev.at_ms());
        match ev {
            ScriptEvent::Move { x, y, .. } => {
                self.effect.pointer_moved(at, Point::new(x, y), &self.host);
            }
            ScriptEvent::Click { x, y, .. } => {
                self.effect.clicked(at, Point::new(x, y), &self.host);
            }
            ScriptEvent::Scroll { x, y, .. } => {
                self.effect.advance(at);
                self.host.set_scroll(Vec2::new(x, y));
            }
            ScriptEvent::Resize { width, height, .. } => {
                self.effect.advance(at);
                self.host.set_viewport(Size::new(width, height));
                self.effect.handle_resize(&self.host);
            }
        }
    }
}
