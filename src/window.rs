//! Synthesis window w<sub>s</sub>(n).

/// Last nonzero point of the window, so w<sub>s</sub>(n) = 0 for |n| > `SUPPORT`.
pub const SUPPORT: isize = 105;

/// Half-width of the flat top of the window.
const FLAT: isize = 55;

/// Trapezoidal window used for overlap-add between frames.
///
/// The window is flat over |n| ≤ 55 and tapers linearly to zero over the next 50 points,
/// so that w<sub>s</sub>(n) + w<sub>s</sub>(n - 160) = 1 over a frame.
pub struct Window([f32; 2 * SUPPORT as usize + 1]);

impl Window {
    /// Get the window value at the given point.
    pub fn get(&self, n: isize) -> f32 {
        if n < -SUPPORT || n > SUPPORT {
            0.0
        } else {
            self.0[(n + SUPPORT) as usize]
        }
    }
}

/// Create the synthesis window.
pub fn synthesis() -> Window {
    let mut w = [0.0; 2 * SUPPORT as usize + 1];

    for (i, x) in w.iter_mut().enumerate() {
        let n = (i as isize - SUPPORT).abs();

        *x = if n <= FLAT {
            1.0
        } else {
            (SUPPORT - n) as f32 / (SUPPORT - FLAT) as f32
        };
    }

    Window(w)
}
