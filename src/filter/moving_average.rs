/// Fixed window arithmetic mean with circular overwrite
///
/// Unfilled slots count as zero, so the first `N - 1` outputs after a reset
/// are biased low until the window fills.
///
/// A zero sized window is rejected at compile time:
///
/// ```compile_fail
/// use myrtio_rgb_engine::MovingAverage;
///
/// let _ = MovingAverage::<0>::new();
/// ```
#[derive(Debug, Clone)]
pub struct MovingAverage<const N: usize> {
    samples: [u16; N],
    index: usize,
}

impl<const N: usize> Default for MovingAverage<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> MovingAverage<N> {
    pub const fn new() -> Self {
        const { assert!(N > 0, "moving average window must not be empty") };
        Self {
            samples: [0; N],
            index: 0,
        }
    }

    /// Record a sample in place of the oldest one and return the new mean
    pub fn observe(&mut self, value: u16) -> u16 {
        self.samples[self.index] = value;
        self.index = (self.index + 1) % N;
        self.average()
    }

    /// Integer mean over the whole window (truncating)
    #[allow(clippy::cast_possible_truncation)]
    pub fn average(&self) -> u16 {
        let sum: u32 = self.samples.iter().map(|&sample| u32::from(sample)).sum();
        (sum / N as u32) as u16
    }

    pub fn reset(&mut self) {
        self.samples = [0; N];
        self.index = 0;
    }

    /// Window length
    pub const fn window(&self) -> usize {
        N
    }
}
