use crate::foundation::core::TimeMs;

/// Default patience for an embedded preview before falling back.
pub const DEFAULT_TIMEOUT_MS: f64 = 6000.0;

/// Why a preview gave up on its live frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailReason {
    /// The deadline passed without a load signal.
    Timeout,
    /// The frame reported a load error.
    Error,
    /// The frame loaded but served an empty document (the site refused to
    /// be embedded without saying so).
    Blocked,
}

/// What the host could tell about a frame that reported "loaded".
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Document reachable and non-empty.
    Content,
    /// Document reachable but empty.
    EmptyDocument,
    /// Document not inspectable (cross-origin); counts as a success, since
    /// real embeds are opaque to the host.
    Opaque,
}

/// Load state of the static screenshot shown on the fallback card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackImage {
    Pending,
    Shown,
    Broken,
}

/// Observable state of one embedded preview.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EmbedState {
    /// Waiting on the frame, spinner up, deadline armed.
    Pending { deadline: TimeMs },
    /// The live frame is showing.
    Live,
    /// The live frame lost; a screenshot card is showing instead.
    Fallback {
        reason: FailReason,
        image: FallbackImage,
    },
}

/// Deadline-driven loader for one embedded preview.
///
/// Pure state machine: the host forwards load/error signals and polls with
/// timestamps, and reads back what to display. Signals that arrive after
/// the machine settled (a late load racing the timeout, say) are dropped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmbedLoader {
    state: EmbedState,
    timeout_ms: f64,
}

impl EmbedLoader {
    pub fn new(now: TimeMs) -> Self {
        Self::with_timeout(now, DEFAULT_TIMEOUT_MS)
    }

    pub fn with_timeout(now: TimeMs, timeout_ms: f64) -> Self {
        Self {
            state: EmbedState::Pending {
                deadline: TimeMs(now.0 + timeout_ms),
            },
            timeout_ms,
        }
    }

    pub fn state(&self) -> EmbedState {
        self.state
    }

    /// Whether the machine has left the pending phase.
    pub fn is_settled(&self) -> bool {
        !matches!(self.state, EmbedState::Pending { .. })
    }

    /// Check the deadline. At or past it, a still-pending load fails over.
    pub fn poll(&mut self, now: TimeMs) {
        if let EmbedState::Pending { deadline } = self.state
            && now.0 >= deadline.0
        {
            self.fail(FailReason::Timeout);
        }
    }

    /// The frame finished loading, with whatever the host learned about it.
    pub fn frame_loaded(&mut self, outcome: LoadOutcome) {
        if self.is_settled() {
            return;
        }
        match outcome {
            LoadOutcome::Content | LoadOutcome::Opaque => self.state = EmbedState::Live,
            LoadOutcome::EmptyDocument => self.fail(FailReason::Blocked),
        }
    }

    /// The frame reported a hard load error.
    pub fn frame_errored(&mut self) {
        if !self.is_settled() {
            self.fail(FailReason::Error);
        }
    }

    /// The fallback screenshot finished loading.
    pub fn image_shown(&mut self) {
        self.set_image(FallbackImage::Shown);
    }

    /// The fallback screenshot failed; the card shows its placeholder.
    pub fn image_broken(&mut self) {
        self.set_image(FallbackImage::Broken);
    }

    /// Point the loader at a new source: back to pending with a fresh
    /// deadline.
    pub fn restart(&mut self, now: TimeMs) {
        self.state = EmbedState::Pending {
            deadline: TimeMs(now.0 + self.timeout_ms),
        };
    }

    fn fail(&mut self, reason: FailReason) {
        self.state = EmbedState::Fallback {
            reason,
            image: FallbackImage::Pending,
        };
    }

    fn set_image(&mut self, image: FallbackImage) {
        if let EmbedState::Fallback { reason, .. } = self.state {
            self.state = EmbedState::Fallback { reason, image };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_load_goes_live() {
        let mut loader = EmbedLoader::new(TimeMs(0.0));
        assert!(!loader.is_settled());
        loader.poll(TimeMs(3000.0));
        loader.frame_loaded(LoadOutcome::Content);
        assert_eq!(loader.state(), EmbedState::Live);
    }

    #[test]
    fn opaque_frames_count_as_loaded() {
        let mut loader = EmbedLoader::new(TimeMs(0.0));
        loader.frame_loaded(LoadOutcome::Opaque);
        assert_eq!(loader.state(), EmbedState::Live);
    }

    #[test]
    fn empty_document_is_a_blocked_fallback() {
        let mut loader = EmbedLoader::new(TimeMs(0.0));
        loader.frame_loaded(LoadOutcome::EmptyDocument);
        assert_eq!(
            loader.state(),
            EmbedState::Fallback {
                reason: FailReason::Blocked,
                image: FallbackImage::Pending,
            }
        );
    }

    #[test]
    fn deadline_fires_at_the_boundary() {
        let mut loader = EmbedLoader::with_timeout(TimeMs(1000.0), 6000.0);
        loader.poll(TimeMs(6999.9));
        assert!(!loader.is_settled());
        loader.poll(TimeMs(7000.0));
        assert_eq!(
            loader.state(),
            EmbedState::Fallback {
                reason: FailReason::Timeout,
                image: FallbackImage::Pending,
            }
        );
    }

    #[test]
    fn late_signals_after_settling_are_dropped() {
        let mut loader = EmbedLoader::with_timeout(TimeMs(0.0), 100.0);
        loader.poll(TimeMs(100.0));
        let timed_out = loader.state();

        loader.frame_loaded(LoadOutcome::Content);
        assert_eq!(loader.state(), timed_out);
        loader.frame_errored();
        assert_eq!(loader.state(), timed_out);

        // And a live frame is not demoted by a stray poll.
        let mut live = EmbedLoader::new(TimeMs(0.0));
        live.frame_loaded(LoadOutcome::Content);
        live.poll(TimeMs(1e9));
        assert_eq!(live.state(), EmbedState::Live);
    }

    #[test]
    fn fallback_screenshot_tracks_its_own_load() {
        let mut loader = EmbedLoader::with_timeout(TimeMs(0.0), 100.0);
        // Image callbacks before any failure have nothing to update.
        loader.image_shown();
        assert!(!loader.is_settled());

        loader.frame_errored();
        loader.image_shown();
        assert_eq!(
            loader.state(),
            EmbedState::Fallback {
                reason: FailReason::Error,
                image: FallbackImage::Shown,
            }
        );

        loader.image_broken();
        assert_eq!(
            loader.state(),
            EmbedState::Fallback {
                reason: FailReason::Error,
                image: FallbackImage::Broken,
            }
        );
    }

    #[test]
    fn restart_rearms_the_deadline() {
        let mut loader = EmbedLoader::with_timeout(TimeMs(0.0), 100.0);
        loader.poll(TimeMs(100.0));
        assert!(loader.is_settled());

        loader.restart(TimeMs(500.0));
        assert_eq!(
            loader.state(),
            EmbedState::Pending {
                deadline: TimeMs(600.0)
            }
        );
        loader.poll(TimeMs(599.0));
        assert!(!loader.is_settled());
        loader.frame_loaded(LoadOutcome::Content);
        assert_eq!(loader.state(), EmbedState::Live);
    }
}
