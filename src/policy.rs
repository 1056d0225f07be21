//! Frame error policy: decides how each received frame is turned into audio based on how
//! many bit errors it carried.

use log::debug;

use crate::descramble::Bootstrap;
use crate::frame;

/// Values derived from error correction decoding.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameErrors {
    /// Total number of errors corrected in the current frame, ϵ<sub>T</sub> [p45].
    pub total: usize,
    /// Error rate tracking term, ϵ<sub>R</sub> [p45].
    pub rate: f32,
    /// Errors corrected in first (u<sub>0</sub>) Golay-coded chunk, ϵ<sub>0</sub>.
    pub golay_init: usize,
    /// Errors corrected in first (u<sub>4</sub>) Hamming-coded chunk, ϵ<sub>4</sub>.
    pub hamming_init: usize,
}

impl FrameErrors {
    /// Create a new `FrameErrors` from the errors corrected in the current frame,
    /// ϵ<sub>i</sub>, and the previous frame's ϵ<sub>R</sub> value.
    pub fn new(errors: &frame::Errors, prev_rate: f32) -> FrameErrors {
        let total = errors.iter().sum::<usize>();

        FrameErrors {
            total,
            // Compute Eq 96.
            rate: 0.95 * prev_rate + 0.000365 * total as f32,
            golay_init: errors[0],
            hamming_init: errors[4],
        }
    }
}

/// Thresholds used to judge frames.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PolicyConfig {
    /// Frames with fewer total errors than this are synthesized as-is.
    pub good_threshold: usize,
    /// Frames with at least this many total errors are replaced by the previous frame.
    pub repeat_threshold: usize,
    /// Number of consecutive repeats allowed before muting.
    pub max_repeats: usize,
    /// Error rate ϵ<sub>R</sub> above which a degraded frame is muted [p47].
    pub mute_rate: f32,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        PolicyConfig {
            good_threshold: 5,
            repeat_threshold: 12,
            max_repeats: 3,
            mute_rate: 0.0875,
        }
    }
}

/// Current state of the policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PolicyState {
    Normal,
    Smoothing,
    Repeating,
    Muted,
}

/// What to do with a received frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Decode and synthesize the frame.
    Synthesize,
    /// Decode the frame and blend its amplitudes with the previous frame's.
    Smooth,
    /// Resynthesize the previous frame's parameters.
    Repeat,
    /// Output silence because the channel is too degraded.
    Mute,
    /// Output silence because the frame encodes silence.
    Silence,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match *self {
            Disposition::Synthesize => "synthesize",
            Disposition::Smooth => "smooth",
            Disposition::Repeat => "repeat",
            Disposition::Mute => "mute",
            Disposition::Silence => "silence",
        }
    }
}

/// Tracks consecutive bad frames and decides each frame's `Disposition`.
#[derive(Clone, Debug)]
pub struct FramePolicy {
    config: PolicyConfig,
    state: PolicyState,
    /// Consecutive repeated frames.
    repeats: usize,
}

impl FramePolicy {
    /// Create a new `FramePolicy` in the normal state.
    pub fn new(config: PolicyConfig) -> FramePolicy {
        FramePolicy {
            config,
            state: PolicyState::Normal,
            repeats: 0,
        }
    }

    /// Judge the frame with the given error characteristics and pitch decision.
    pub fn judge(&mut self, errors: &FrameErrors, bootstrap: Bootstrap) -> Disposition {
        let good = errors.total < self.config.good_threshold;
        let (state, disp) = self.next(errors, bootstrap, good);

        if state != self.state {
            debug!("frame policy {:?} -> {:?} ({} errors, rate {:.4})",
                   self.state, state, errors.total, errors.rate);
        }

        self.state = state;
        disp
    }

    fn next(&mut self, errors: &FrameErrors, bootstrap: Bootstrap, good: bool)
        -> (PolicyState, Disposition)
    {
        if self.state == PolicyState::Muted && !good {
            return (PolicyState::Muted, Disposition::Mute);
        }

        // The pitch field of u_0 is only trusted after at most one correction.
        let suspect = errors.golay_init >= 2;

        if bootstrap == Bootstrap::Silence && !suspect {
            self.repeats = 0;
            return (PolicyState::Normal, Disposition::Silence);
        }

        // Check the conditions in Eqs 97 and 98.
        let repeat = suspect && errors.total as f32 >= 10.0 + 40.0 * errors.rate;

        let repeat = repeat ||
            errors.total >= self.config.repeat_threshold ||
            !matches!(bootstrap, Bootstrap::Period(_));

        if repeat {
            self.repeats += 1;

            return if self.repeats > self.config.max_repeats {
                (PolicyState::Muted, Disposition::Mute)
            } else {
                (PolicyState::Repeating, Disposition::Repeat)
            };
        }

        if !good && errors.rate > self.config.mute_rate {
            return (PolicyState::Muted, Disposition::Mute);
        }

        self.repeats = 0;

        if good {
            (PolicyState::Normal, Disposition::Synthesize)
        } else {
            (PolicyState::Smoothing, Disposition::Smooth)
        }
    }

    /// Return to the normal state, forgetting any run of bad frames.
    pub fn reset(&mut self) {
        self.state = PolicyState::Normal;
        self.repeats = 0;
    }

    /// Current policy state.
    pub fn state(&self) -> PolicyState { self.state }

    /// Number of consecutive repeated frames.
    pub fn repeats(&self) -> usize { self.repeats }
}

impl Default for FramePolicy {
    fn default() -> Self { FramePolicy::new(PolicyConfig::default()) }
}
