/*
 * // Copyright (c) Radzivon Bartoshyk 12/2025. All rights reserved.
 * //
 * // Redistribution and use in source and binary forms, with or without modification,
 * // are permitted provided that the following conditions are met:
 * //
 * // 1.  Redistributions of source code must retain the above copyright notice, this
 * // list of conditions and the following disclaimer.
 * //
 * // 2.  Redistributions in binary form must reproduce the above copyright notice,
 * // this list of conditions and the following disclaimer in the documentation
 * // and/or other materials provided with the distribution.
 * //
 * // 3.  Neither the name of the copyright holder nor the names of its
 * // contributors may be used to endorse or promote products derived from
 * // this software without specific prior written permission.
 * //
 * // THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * // AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * // IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * // DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * // FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * // DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * // SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * // CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * // OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * // OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */
use crate::err::{StreamError, try_vec};
use crate::numeric::StreamFloat;

/// Fixed-capacity ring buffer holding the most recent `capacity` samples.
///
/// Index `0` is always the newest sample (see [`CircularWindow::get`]);
/// `to_linear_array` returns the oldest-to-newest view every transform's
/// forward kernel actually convolves over.
#[derive(Debug, Clone)]
pub struct CircularWindow<T> {
    buf: Vec<T>,
    capacity: usize,
    head: usize,
    size: usize,
    wrapped: bool,
}

impl<T: StreamFloat> CircularWindow<T> {
    pub fn new(capacity: usize) -> Result<Self, StreamError> {
        if capacity == 0 {
            return Err(StreamError::invalid_argument(
                "circular window capacity must be >= 1",
            ));
        }
        Ok(Self {
            buf: try_vec![T::zero(); capacity],
            capacity,
            head: 0,
            size: 0,
            wrapped: false,
        })
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.size == self.capacity
    }

    #[inline]
    pub fn has_wrapped(&self) -> bool {
        self.wrapped
    }

    pub fn clear(&mut self) {
        for v in self.buf.iter_mut() {
            *v = T::zero();
        }
        self.head = 0;
        self.size = 0;
        self.wrapped = false;
    }

    /// Writes `x` at the head and advances it, overwriting the oldest sample
    /// once the window is full.
    pub fn append_one(&mut self, x: T) {
        if self.size == self.capacity {
            self.wrapped = true;
        }
        self.buf[self.head] = x;
        self.head = (self.head + 1) % self.capacity;
        if self.size < self.capacity {
            self.size += 1;
        }
    }

    /// Appends a batch of samples. Falls back to element-wise writes for
    /// small batches; for `xs.len() >= capacity` only the last `capacity`
    /// elements are materialized via two block copies (prefix / wrap
    /// suffix); otherwise at most two block copies land the batch in the
    /// ring starting at the current head.
    pub fn append_many(&mut self, xs: &[T]) -> Result<(), StreamError> {
        if xs.is_empty() {
            return Ok(());
        }
        let n = xs.len();

        if n < 8 {
            for &x in xs {
                self.append_one(x);
            }
            return Ok(());
        }

        if n >= self.capacity {
            if self.size > 0 {
                self.wrapped = true;
            }
            let tail = &xs[n - self.capacity..];
            self.buf.copy_from_slice(tail);
            self.head = 0;
            self.size = self.capacity;
            self.wrapped = true;
            return Ok(());
        }

        if self.size + n > self.capacity {
            self.wrapped = true;
        }

        let first = self.capacity - self.head;
        if n <= first {
            self.buf[self.head..self.head + n].copy_from_slice(xs);
        } else {
            self.buf[self.head..].copy_from_slice(&xs[..first]);
            self.buf[..n - first].copy_from_slice(&xs[first..]);
        }
        self.head = (self.head + n) % self.capacity;
        self.size = (self.size + n).min(self.capacity);
        Ok(())
    }

    /// Newest-first indexing: `get(0)` is the most recently written sample.
    pub fn get(&self, i: usize) -> Result<T, StreamError> {
        if i >= self.size {
            return Err(StreamError::bounds(format!(
                "index {i} out of bounds for window of size {}",
                self.size
            )));
        }
        let idx = (self.head + self.capacity - 1 - i) % self.capacity;
        Ok(self.buf[idx])
    }

    pub fn get_last(&self) -> Result<T, StreamError> {
        if self.size == 0 {
            return Err(StreamError::illegal_state("window is empty"));
        }
        self.get(0)
    }

    /// Returns `length` samples ending `offset` samples before the newest,
    /// oldest-to-newest, zero-padded on the left where history is short.
    pub fn window(&self, offset: usize, length: usize) -> Result<Vec<T>, StreamError> {
        if length == 0 {
            return Err(StreamError::invalid_argument("window length must be >= 1"));
        }
        let mut out = try_vec![T::zero(); length];
        for (j, slot) in out.iter_mut().enumerate() {
            let distance = offset + (length - 1 - j);
            if distance < self.size {
                *slot = self.get(distance)?;
            }
        }
        Ok(out)
    }

    /// Oldest-to-newest snapshot of everything currently held (length ==
    /// `size`, not `capacity`).
    pub fn to_linear_array(&self) -> Vec<T> {
        if self.size == 0 {
            return Vec::new();
        }
        self.window(0, self.size)
            .expect("size is always a valid window length")
    }

    /// Oldest-to-newest snapshot zero-padded up to `capacity`, the shape
    /// every forward transform kernel actually consumes.
    pub fn to_padded_array(&self) -> Vec<T> {
        self.window(0, self.capacity)
            .expect("capacity is always a valid window length")
    }

    /// Raw physical storage in ring order (not oldest-to-newest). Consumed
    /// by transforms whose incremental step needs a position that stays
    /// fixed across appends — see [`crate::modwt`]'s ring-indexed cache.
    #[inline]
    pub(crate) fn raw_ring(&self) -> &[T] {
        &self.buf
    }

    /// The ring slot the *next* append will write to; equivalently, one
    /// past the slot most recently written (mod capacity).
    #[inline]
    pub(crate) fn head(&self) -> usize {
        self.head
    }

    /// Re-orders a ring-indexed array of the same length as this window
    /// into oldest-to-newest order, using this window's current
    /// head/wrapped state.
    pub(crate) fn ring_to_linear<U: Copy>(&self, ring: &[U]) -> Vec<U> {
        debug_assert_eq!(ring.len(), self.capacity);
        if !self.wrapped {
            ring.to_vec()
        } else {
            let mut out = Vec::with_capacity(ring.len());
            out.extend_from_slice(&ring[self.head..]);
            out.extend_from_slice(&ring[..self.head]);
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_semantics_match_s4() {
        let mut w = CircularWindow::<f64>::new(3).unwrap();
        w.append_one(1.0);
        w.append_one(2.0);
        w.append_one(3.0);
        w.append_one(4.0);
        assert_eq!(w.to_linear_array(), vec![2.0, 3.0, 4.0]);
        assert!(w.has_wrapped());
        assert_eq!(w.size(), 3);
    }

    #[test]
    fn newest_first_indexing() {
        let mut w = CircularWindow::<f64>::new(4).unwrap();
        w.append_many(&[10.0, 20.0, 30.0]).unwrap();
        assert_eq!(w.get(0).unwrap(), 30.0);
        assert_eq!(w.get(2).unwrap(), 10.0);
        assert!(w.get(3).is_err());
    }

    #[test]
    fn window_zero_pads_left() {
        let mut w = CircularWindow::<f64>::new(8).unwrap();
        w.append_many(&[1.0, 2.0, 3.0]).unwrap();
        let got = w.window(0, 5).unwrap();
        assert_eq!(got, vec![0.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn append_many_bulk_matches_elementwise() {
        let xs: Vec<f64> = (0..50).map(|i| i as f64).collect();
        let mut bulk = CircularWindow::<f64>::new(16).unwrap();
        bulk.append_many(&xs).unwrap();

        let mut one_by_one = CircularWindow::<f64>::new(16).unwrap();
        for &x in &xs {
            one_by_one.append_one(x);
        }
        assert_eq!(bulk.to_linear_array(), one_by_one.to_linear_array());
        assert_eq!(bulk.has_wrapped(), one_by_one.has_wrapped());
    }

    #[test]
    fn construction_rejects_zero_capacity() {
        assert!(CircularWindow::<f64>::new(0).is_err());
    }

    #[test]
    fn get_last_on_empty_is_illegal_state() {
        let w = CircularWindow::<f64>::new(4).unwrap();
        match w.get_last() {
            Err(StreamError::IllegalState(_)) => {}
            other => panic!("expected IllegalState, got {other:?}"),
        }
    }
}
