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
//! Streaming Wavelet Packet Transform (spec.md §4.4): the full binary tree
//! of decompositions built from the same single-level primitive as the FWT
//! (`crate::dwt_kernel`), applied recursively to *every* node — not just
//! the approximation chain. Like the FWT, `INCREMENTAL` has no cheaper
//! path than `FULL` here and degrades to it.
use crate::config::{StreamingConfig, UpdateStrategy};
use crate::core::StreamingCore;
use crate::dwt_kernel::forward_level;
use crate::err::StreamError;
use crate::numeric::{StreamFloat, is_pow2, next_pow2};
use crate::observer::{CoefficientSnapshot, StreamObserver};
use crate::wavelets::DiscreteWavelet;
use std::sync::Arc;

pub struct WptStream<T> {
    core: StreamingCore<T>,
    wavelet: Arc<dyn DiscreteWavelet<T>>,
    max_level: usize,
    effective_size: usize,
    /// `packets[level]` holds `2^level` packets of length
    /// `effective_size / 2^level`; `packets[0]` is the single root packet
    /// (the zero-padded window).
    packets: Vec<Vec<Vec<T>>>,
    initialized: bool,
}

impl<T: StreamFloat> WptStream<T> {
    pub fn new(
        wavelet: Arc<dyn DiscreteWavelet<T>>,
        config: StreamingConfig,
    ) -> Result<Self, StreamError> {
        let core = StreamingCore::new(config)?;
        let effective_size = if is_pow2(config.buffer_size()) {
            config.buffer_size()
        } else {
            next_pow2(config.buffer_size())
        };
        let max_level = config
            .effective_max_level()
            .min(effective_size.trailing_zeros() as usize)
            .max(1);
        let mut packets = Vec::with_capacity(max_level + 1);
        for level in 0..=max_level {
            let count = 1usize << level;
            let len = effective_size / count;
            packets.push(vec![vec![T::zero(); len]; count]);
        }
        Ok(Self {
            core,
            wavelet,
            max_level,
            effective_size,
            packets,
            initialized: true,
        })
    }

    pub fn initialize(&mut self, buffer_size: usize, max_level: i32) -> Result<(), StreamError> {
        let config = StreamingConfig::builder(buffer_size)
            .max_level(max_level)
            .update_strategy(self.core.strategy())
            .build()?;
        *self = Self::new(self.wavelet.clone(), config)?;
        Ok(())
    }

    fn require_initialized(&self) -> Result<(), StreamError> {
        if self.initialized {
            Ok(())
        } else {
            Err(StreamError::illegal_state("wpt stream used before initialize"))
        }
    }

    fn recompute_full(&mut self) {
        let window = self.core.window();
        let mut padded = window.to_linear_array();
        padded.resize(self.effective_size, T::zero());
        self.packets[0][0] = padded;
        for level in 1..=self.max_level {
            let (lo, hi) = (self.wavelet.decomposition_low(), self.wavelet.decomposition_high());
            let mut children = Vec::with_capacity(1 << level);
            for parent in &self.packets[level - 1] {
                let (a, d) = forward_level(parent, lo, hi);
                children.push(a);
                children.push(d);
            }
            self.packets[level] = children;
        }
        self.core.mark_computed();
    }

    fn notify(&self, level: usize, new_sample_count: usize) {
        let flat: Vec<T> = self.packets[level].iter().flatten().copied().collect();
        let snapshot = CoefficientSnapshot::Flat(flat);
        self.core.notify_update(&snapshot, new_sample_count);
    }

    pub fn update(&mut self, samples: &[T]) -> Result<(), StreamError> {
        self.require_initialized()?;
        if samples.is_empty() {
            return Ok(());
        }
        self.core.window_mut().append_many(samples)?;
        self.core.mark_dirty();
        match self.core.strategy() {
            UpdateStrategy::Full | UpdateStrategy::Incremental => {
                self.recompute_full();
                self.core.maybe_notify_buffer_full();
                self.notify(self.max_level, samples.len());
            }
            UpdateStrategy::Lazy => {
                self.core.maybe_notify_buffer_full();
            }
        }
        Ok(())
    }

    fn ensure_fresh(&mut self) {
        if self.core.strategy() == UpdateStrategy::Lazy && self.core.is_stale() {
            self.recompute_full();
            self.notify(self.max_level, 0);
        }
    }

    pub fn packet(&mut self, level: usize, index: usize) -> Result<Vec<T>, StreamError> {
        self.require_initialized()?;
        self.validate_level_index(level, index)?;
        self.ensure_fresh();
        Ok(self.packets[level][index].clone())
    }

    pub fn all_packets_at_level(&mut self, level: usize) -> Result<Vec<Vec<T>>, StreamError> {
        self.require_initialized()?;
        self.validate_level(level)?;
        self.ensure_fresh();
        Ok(self.packets[level].clone())
    }

    pub fn packet_energies(&mut self, level: usize) -> Result<Vec<T>, StreamError> {
        self.require_initialized()?;
        self.validate_level(level)?;
        self.ensure_fresh();
        Ok(self.packets[level]
            .iter()
            .map(|p| p.iter().fold(T::zero(), |acc, &x| acc + x * x))
            .collect())
    }

    /// The chain of packet indices (one per level, 1..=max_level)
    /// containing `time_index` in the original (zero-padded) window, under
    /// the natural recursive packet ordering this transform builds
    /// (parent k's children are packets 2k, 2k+1 at the next level).
    pub fn packet_path(&mut self, time_index: usize) -> Result<Vec<usize>, StreamError> {
        self.require_initialized()?;
        if time_index >= self.effective_size {
            return Err(StreamError::bounds(format!(
                "time_index {time_index} out of bounds for effective size {}",
                self.effective_size
            )));
        }
        self.ensure_fresh();
        let mut path = Vec::with_capacity(self.max_level);
        for level in 1..=self.max_level {
            let packet_len = self.effective_size / (1usize << level);
            path.push(time_index / packet_len);
        }
        Ok(path)
    }

    fn validate_level(&self, level: usize) -> Result<(), StreamError> {
        if level == 0 || level > self.max_level {
            return Err(StreamError::invalid_argument(format!(
                "level must be within [1, {}], got {level}",
                self.max_level
            )));
        }
        Ok(())
    }

    fn validate_level_index(&self, level: usize, index: usize) -> Result<(), StreamError> {
        self.validate_level(level)?;
        if index >= (1usize << level) {
            return Err(StreamError::invalid_argument(format!(
                "packet index must be within [0, {}), got {index}",
                1usize << level
            )));
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        for level_packets in self.packets.iter_mut() {
            for p in level_packets.iter_mut() {
                p.iter_mut().for_each(|v| *v = T::zero());
            }
        }
        self.core.reset();
    }

    pub fn add_listener(&mut self, obs: Arc<dyn StreamObserver<T>>) {
        self.core.add_listener(obs);
    }
    pub fn remove_listener(&mut self, obs: &Arc<dyn StreamObserver<T>>) {
        self.core.remove_listener(obs);
    }
    pub fn clear_listeners(&mut self) {
        self.core.clear_listeners();
    }
    pub fn listener_count(&self) -> usize {
        self.core.listener_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wavelets::HaarWavelet;

    fn make(n: usize, max_level: i32) -> WptStream<f64> {
        let cfg = StreamingConfig::builder(n)
            .max_level(max_level)
            .update_strategy(UpdateStrategy::Full)
            .build()
            .unwrap();
        WptStream::new(Arc::new(HaarWavelet::default()), cfg).unwrap()
    }

    fn samples(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / 16.0).sin())
            .collect()
    }

    #[test]
    fn parseval_energy_holds_at_every_level() {
        let xs = samples(64);
        let mut t = make(64, 4);
        t.update(&xs).unwrap();
        let total: f64 = xs.iter().map(|x| x * x).sum();
        for level in 1..=4 {
            let energies = t.packet_energies(level).unwrap();
            let sum: f64 = energies.iter().sum();
            assert!(
                (sum - total).abs() / total <= 0.01,
                "level {level}: sum={sum} total={total}"
            );
        }
    }

    #[test]
    fn packet_index_out_of_range_is_invalid_argument() {
        let mut t = make(64, 4);
        t.update(&samples(64)).unwrap();
        assert!(t.packet(2, 4).is_err());
        assert!(t.packet(5, 0).is_err());
    }

    #[test]
    fn packet_snapshot_is_defensive_copy() {
        let mut t = make(64, 4);
        t.update(&samples(64)).unwrap();
        let mut p = t.packet(1, 0).unwrap();
        p[0] = 999.0;
        let fresh = t.packet(1, 0).unwrap();
        assert_ne!(fresh[0], 999.0);
    }

    #[test]
    fn packet_path_has_one_entry_per_level() {
        let mut t = make(64, 4);
        t.update(&samples(64)).unwrap();
        let path = t.packet_path(10).unwrap();
        assert_eq!(path.len(), 4);
        for (level, &idx) in (1..=4).zip(path.iter()) {
            assert!(idx < (1usize << level));
        }
    }
}
