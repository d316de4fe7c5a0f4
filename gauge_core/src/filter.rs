//! Rolling average over recent raw readings.
//!
//! Fuel slosh makes the sender wander by tens of counts; averaging the
//! last N readings trades responsiveness for a steady needle. Window
//! size times sample interval sets the smoothing time constant, so the
//! two are tuned together with the scheduler cadence.

/// Fixed-capacity ring buffer of raw readings with a saturating count of
/// valid entries. Insertion overwrites the oldest entry once full; the
/// average never reads past the valid count.
#[derive(Debug, Clone)]
pub struct SampleFilter {
    buf: Box<[u16]>,
    head: usize,
    len: usize,
}

impl SampleFilter {
    /// Capacity is clamped to at least 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: vec![0u16; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, raw: u16) {
        self.buf[self.head] = raw;
        self.head = (self.head + 1) % self.buf.len();
        self.len = (self.len + 1).min(self.buf.len());
    }

    /// Arithmetic mean of the valid entries. 0.0 while empty; callers in
    /// the control loop always push before they average.
    pub fn average(&self) -> f32 {
        if self.len == 0 {
            return 0.0;
        }
        let sum: u64 = self.buf[..self.len].iter().map(|&v| u64::from(v)).sum();
        sum as f32 / self.len as f32
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// True once every slot holds a real reading and the average has
    /// reached full smoothing depth.
    pub fn is_warm(&self) -> bool {
        self.len == self.buf.len()
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::SampleFilter;

    #[test]
    fn first_reading_is_its_own_average() {
        let mut f = SampleFilter::new(100);
        f.push(243);
        assert_eq!(f.len(), 1);
        assert!((f.average() - 243.0).abs() < f32::EPSILON);
    }

    #[test]
    fn partial_window_averages_only_valid_entries() {
        let mut f = SampleFilter::new(100);
        for v in [10, 20, 30] {
            f.push(v);
        }
        assert_eq!(f.len(), 3);
        assert!((f.average() - 20.0).abs() < 1e-6);
    }

    #[test]
    fn count_saturates_at_capacity() {
        let mut f = SampleFilter::new(4);
        for v in 0..10u16 {
            f.push(v);
        }
        assert_eq!(f.len(), 4);
        assert!(f.is_warm());
    }

    #[test]
    fn overwrites_oldest_once_full() {
        let mut f = SampleFilter::new(3);
        for v in [100, 200, 300] {
            f.push(v);
        }
        assert!((f.average() - 200.0).abs() < 1e-6);
        // Fourth push evicts 100: mean of {200, 300, 400}.
        f.push(400);
        assert!((f.average() - 300.0).abs() < 1e-6);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut f = SampleFilter::new(0);
        assert_eq!(f.capacity(), 1);
        f.push(7);
        f.push(9);
        assert!((f.average() - 9.0).abs() < f32::EPSILON);
    }

    #[test]
    fn clear_resets_to_cold() {
        let mut f = SampleFilter::new(3);
        f.push(500);
        f.push(600);
        f.clear();
        assert!(f.is_empty());
        assert_eq!(f.average(), 0.0);
        f.push(42);
        assert!((f.average() - 42.0).abs() < f32::EPSILON);
    }
}
