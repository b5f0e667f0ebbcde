#![forbid(unsafe_code)]

//! Interactive dot-grid effect engine.
//!
//! `dotfield` lays a lattice of dots over a scrollable surface, tracks a
//! pointer with throttled velocity estimation, shoves nearby dots around on
//! fast movement and clicks, and rasterizes every frame on the CPU. All
//! inputs are explicit, timestamps included, so the same interaction script
//! always produces the same pixels.

pub mod config;
pub mod ease;
pub mod effect;
pub mod embed;
pub mod foundation;
pub mod grid;
pub mod host;
pub mod motion;
pub mod pointer;
pub mod render;
pub mod scene;

pub use config::GridConfig;
pub use ease::Ease;
pub use effect::{DotGridEffect, RenderLoop};
pub use embed::{EmbedLoader, EmbedState, FailReason, FallbackImage, LoadOutcome};
pub use foundation::color::Rgb8;
pub use foundation::core::{Fps, FrameIndex, TimeMs};
pub use foundation::error::{DotfieldError, DotfieldResult};
pub use grid::Dot;
pub use host::{HostGeometry, HostView, StaticHost};
pub use motion::{Motion, MotionParams};
pub use pointer::{PointerState, PointerTracker, RateLimiter};
pub use render::{DotPainter, FrameRGBA};
pub use scene::{HostSpec, Scene, ScenePlayer, ScriptEvent};
