/// Fixed-capacity ring of samples with a single head.
///
/// The capacity is chosen at construction and never changes. Reads and writes
/// happen relative to the head, and every index wraps modulo the capacity.
pub struct RingBuffer {
    buffer: Box<[f32]>,
    head: usize,
}

impl RingBuffer {
    /// Zero-filled ring of `capacity` samples (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)].into_boxed_slice(),
            head: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn head(&self) -> usize {
        self.head
    }

    /// Sample under the head and the one after it (wrapping).
    #[inline]
    pub fn pair(&self) -> (f32, f32) {
        let next = self.wrap(self.head + 1);
        (self.buffer[self.head], self.buffer[next])
    }

    /// Overwrite the sample under the head.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.head] = sample;
    }

    /// Move the head forward one slot. Returns true when it wrapped to 0.
    #[inline]
    pub fn advance(&mut self) -> bool {
        self.head = self.wrap(self.head + 1);
        self.head == 0
    }

    /// Refill every slot from `source` and rewind the head.
    pub fn refill(&mut self, mut source: impl FnMut() -> f32) {
        for sample in self.buffer.iter_mut() {
            *sample = source();
        }
        self.head = 0;
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.buffer
    }

    #[inline]
    fn wrap(&self, index: usize) -> usize {
        if index >= self.buffer.len() {
            index - self.buffer.len()
        } else {
            index
        }
    }
}
