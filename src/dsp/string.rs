use crate::dsp::{noise::NoiseSource, ring::RingBuffer};

/*
Karplus-Strong Plucked String
=============================

A string is modelled as a delay line one period long. Plucking it fills the
line with noise; playing it walks around the line, replacing each sample
with the damped average of itself and its neighbour.

Vocabulary
----------

  line        The ring of samples. Its length N is the period of the note in
              samples, so one trip around the line is one cycle of the
              fundamental.

  head        Where the next output sample is taken from. Advances one slot
              per output sample and wraps at N.

  damping     Coefficient d applied to the two-tap sum. d = 0.5 is a pure
              average (lossless at DC); anything below bleeds energy every
              cycle so the string dies away.


The Update
----------

    pos  = head
    next = (head + 1) mod N

    line[pos] = d * (line[pos] + line[next])
    output    = line[pos]
    head      = next

  line:  [ a ][ b ][ c ][ d ] ...
           ↑    ↑
          pos  next          a' = d·(a + b), emitted, head moves to b

Because `line[next]` still holds last cycle's value when it is read, each
sample is filtered exactly once per trip around the line. The averaging is a
gentle low-pass: high partials of the noise burst die within a few cycles,
the fundamental survives longest. Longer lines (lower notes) lose less per
second, which is why low strings ring longer.


Why Noise
---------

A real pluck is an impulse that excites every mode of the string at once.
Uniform noise in [-0.5, 0.5] has a flat spectrum, so it does the same; the
filter loop then carves it into a tone within a few milliseconds.
*/

/// One delay line plus its averaging filter.
pub struct PluckedString {
    line: RingBuffer,
    damping: f32,
}

impl PluckedString {
    pub fn new(len: usize, damping: f32) -> Self {
        Self {
            line: RingBuffer::new(len),
            damping,
        }
    }

    /// Fill the whole line with noise scaled by `volume` and rewind.
    ///
    /// Whatever the line held before is discarded.
    pub fn pluck(&mut self, volume: f32, noise: &mut NoiseSource) {
        self.line.refill(|| volume * noise.next_sample());
    }

    /// Advance one sample and return it.
    #[inline]
    pub fn average(&mut self) -> f32 {
        let (current, next) = self.line.pair();
        let value = self.damping * (current + next);
        self.line.write(value);
        self.line.advance();
        value
    }

    /// Head position; 0 means a new cycle starts with the next sample.
    #[inline]
    pub fn position(&self) -> usize {
        self.line.head()
    }

    pub fn len(&self) -> usize {
        self.line.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.line.capacity() == 0
    }

    pub fn samples(&self) -> &[f32] {
        self.line.as_slice()
    }
}
