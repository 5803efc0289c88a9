//! Fixed capacity ring of recent altitude samples.

/// Ring of the `N` most recent altitude samples.
///
/// All `N` slots exist from construction and start at zero. Inserting overwrites the oldest
/// slot, so the window never grows, shrinks or allocates.
#[derive(Clone, Debug)]
pub struct SampleWindow<const N: usize> {
    data: [f32; N],
    /// Slot the next insertion overwrites, which is also the oldest sample.
    cursor: usize,
    written: usize,
}

impl<const N: usize> SampleWindow<N> {
    pub const fn new() -> Self {
        assert!(N > 0, "a sample window needs at least one slot");
        SampleWindow {
            data: [0.0; N],
            cursor: 0,
            written: 0,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of slots holding real samples, saturating at `N`.
    pub fn len(&self) -> usize {
        self.written
    }

    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    pub fn is_full(&self) -> bool {
        self.written == N
    }

    pub fn insert(&mut self, value: f32) {
        self.data[self.cursor] = value;
        self.cursor = (self.cursor + 1) % N;
        self.written = (self.written + 1).min(N);
    }

    /// All `N` slots, oldest first. Slots never written read as zero.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        (0..N).map(move |i| self.data[(self.cursor + i) % N])
    }

    /// Adjacent `(older, newer)` pairs in insertion order; there are `N - 1` of them.
    pub fn pairs(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.iter().zip(self.iter().skip(1))
    }

    /// Largest sample written so far, or negative infinity before the first insertion.
    pub fn maximum(&self) -> f32 {
        self.written_samples().fold(f32::NEG_INFINITY, f32::max)
    }

    /// Smallest sample written so far, or positive infinity before the first insertion.
    pub fn minimum(&self) -> f32 {
        self.written_samples().fold(f32::INFINITY, f32::min)
    }

    fn written_samples(&self) -> impl Iterator<Item = f32> + '_ {
        self.iter().skip(N - self.written)
    }
}

impl<const N: usize> Default for SampleWindow<N> {
    fn default() -> Self {
        Self::new()
    }
}
