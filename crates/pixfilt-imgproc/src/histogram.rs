/// Intensity histogram of a square window over an 8-bit channel.
///
/// The histogram is filled once for the first window of a row and then
/// updated one column at a time as the window slides right, see
/// [`crate::filter::median_blur`].
#[derive(Clone)]
pub struct WindowHistogram {
    bins: [u32; 256],
    count: u32,
}

impl Default for WindowHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowHistogram {
    /// Create an empty histogram.
    pub fn new() -> Self {
        Self {
            bins: [0; 256],
            count: 0,
        }
    }

    /// Forget every counted value.
    pub fn clear(&mut self) {
        self.bins = [0; 256];
        self.count = 0;
    }

    /// Count one more occurrence of `val`.
    #[inline]
    pub fn add(&mut self, val: u8) {
        self.bins[val as usize] += 1;
        self.count += 1;
    }

    /// Remove one occurrence of `val`.
    ///
    /// PRECONDITION: `val` was previously added.
    #[inline]
    pub fn remove(&mut self, val: u8) {
        debug_assert!(self.bins[val as usize] > 0, "removing absent value {val}");
        self.bins[val as usize] -= 1;
        self.count -= 1;
    }

    /// Number of values currently counted.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Median of the counted values.
    ///
    /// Walks the bins in order and returns the first one where the running
    /// total exceeds `count / 2`. Square windows always hold an odd count, so
    /// this is the exact middle value there; for an even count it is the
    /// upper of the two middle values. An empty histogram yields 255.
    pub fn median(&self) -> u8 {
        let half = self.count / 2;
        let mut acc = 0;
        for (val, &n) in self.bins.iter().enumerate() {
            acc += n;
            if acc > half {
                return val as u8;
            }
        }
        u8::MAX
    }
}
