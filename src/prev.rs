//! State carried from one frame to the next.

use crate::params::FrameParams;

/// Saved values from the previously accepted frame.
#[derive(Clone, Debug)]
pub struct PrevFrame {
    /// Parameters used for prediction and for repeating the frame.
    pub params: FrameParams,
    /// Error rate tracking term, ϵ<sub>R</sub>, updated on every frame.
    pub err_rate: f32,
    /// Spectral amplitude threshold τ<sub>M</sub>.
    pub amp_thresh: f32,
}

impl Default for PrevFrame {
    fn default() -> PrevFrame {
        PrevFrame {
            params: FrameParams::default(),
            err_rate: 0.0,
            amp_thresh: 0.0,
        }
    }
}
