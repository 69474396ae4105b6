//! Moving-average smoothing of joint angles

use heapless::Deque;

/// Largest supported smoothing window
pub const MAX_SMOOTHING_WINDOW: usize = 16;

/// Fixed-capacity moving average over the most recent samples
///
/// Holds at most `size` samples; adding to a full window evicts the oldest
/// one. The average is a plain arithmetic mean, so angles straddling the
/// `0/2π` seam average to a value near `π` for a few samples while the
/// window refills.
///
/// # Example
/// ```
/// use arm_pointer::SmoothingWindow;
///
/// let mut window = SmoothingWindow::new(3);
/// window.add(1.0);
/// window.add(2.0);
/// assert_eq!(window.add(3.0), 2.0);
/// assert_eq!(window.add(6.0), 11.0 / 3.0); // 1.0 evicted
/// ```
#[derive(Debug, Clone)]
pub struct SmoothingWindow {
    samples: Deque<f32, MAX_SMOOTHING_WINDOW>,
    size: usize,
}

impl SmoothingWindow {
    /// Create an empty window averaging over `size` samples
    ///
    /// `size` is clamped to `1..=MAX_SMOOTHING_WINDOW`.
    pub fn new(size: usize) -> Self {
        Self {
            samples: Deque::new(),
            size: size.clamp(1, MAX_SMOOTHING_WINDOW),
        }
    }

    /// Add a sample and return the mean of the window contents
    pub fn add(&mut self, sample: f32) -> f32 {
        if self.samples.len() >= self.size {
            self.samples.pop_front();
        }
        // Capacity is at least `size`, so this cannot fail after the eviction
        let _ = self.samples.push_back(sample);
        self.mean()
    }

    /// Mean of the current contents, zero while empty
    pub fn mean(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }

    /// Drop every sample
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Configured window length
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Default for SmoothingWindow {
    fn default() -> Self {
        Self::new(3)
    }
}
