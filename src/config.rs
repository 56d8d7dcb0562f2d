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
use crate::err::StreamError;
use crate::numeric::{ilog2_floor, is_pow2};

/// Recomputation strategy driving a streaming transform's `update`/
/// `current_coefficients` state machine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UpdateStrategy {
    /// Append, then recompute the whole cache from the window every time.
    Full,
    /// Append, then run the transform's O(window) incremental step if it
    /// has one; otherwise silently behaves like `Full`.
    Incremental,
    /// Append and mark dirty; the next `current_coefficients()` call pays
    /// for a single `Full` recompute.
    Lazy,
}

impl Default for UpdateStrategy {
    fn default() -> Self {
        UpdateStrategy::Incremental
    }
}

/// Immutable, validated streaming-transform configuration (spec.md §3).
#[derive(Debug, Clone, Copy)]
pub struct StreamingConfig {
    buffer_size: usize,
    max_level: i32,
    update_strategy: UpdateStrategy,
    cache_intermediate_results: bool,
    parallel_processing_enabled: bool,
    update_batch_size: usize,
}

impl StreamingConfig {
    pub fn builder(buffer_size: usize) -> StreamingConfigBuilder {
        StreamingConfigBuilder::new(buffer_size)
    }

    #[inline]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Resolves `-1` (auto-detect) to `floor(log2(buffer_size))`; otherwise
    /// returns the validated explicit level.
    #[inline]
    pub fn effective_max_level(&self) -> usize {
        if self.max_level < 0 {
            ilog2_floor(self.buffer_size) as usize
        } else {
            self.max_level as usize
        }
    }

    #[inline]
    pub fn update_strategy(&self) -> UpdateStrategy {
        self.update_strategy
    }

    #[inline]
    pub fn cache_intermediate_results(&self) -> bool {
        self.cache_intermediate_results
    }

    #[inline]
    pub fn parallel_processing_enabled(&self) -> bool {
        self.parallel_processing_enabled
    }

    #[inline]
    pub fn update_batch_size(&self) -> usize {
        self.update_batch_size
    }

    /// Validates `buffer_size` is a power of two, as required by FWT, WPT
    /// and the power-of-two FFT streaming variant. Returns the effective
    /// (rounded-up) buffer size used internally by those transforms.
    pub fn require_power_of_two_buffer(&self) -> Result<usize, StreamError> {
        if is_pow2(self.buffer_size) {
            Ok(self.buffer_size)
        } else {
            Err(StreamError::invalid_argument(format!(
                "buffer_size {} is not a power of two",
                self.buffer_size
            )))
        }
    }
}

pub struct StreamingConfigBuilder {
    buffer_size: usize,
    max_level: i32,
    update_strategy: UpdateStrategy,
    cache_intermediate_results: bool,
    parallel_processing_enabled: bool,
    update_batch_size: usize,
}

impl StreamingConfigBuilder {
    fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            max_level: -1,
            update_strategy: UpdateStrategy::default(),
            cache_intermediate_results: true,
            parallel_processing_enabled: false,
            update_batch_size: 1,
        }
    }

    pub fn max_level(mut self, max_level: i32) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn update_strategy(mut self, strategy: UpdateStrategy) -> Self {
        self.update_strategy = strategy;
        self
    }

    pub fn cache_intermediate_results(mut self, v: bool) -> Self {
        self.cache_intermediate_results = v;
        self
    }

    pub fn parallel_processing_enabled(mut self, v: bool) -> Self {
        self.parallel_processing_enabled = v;
        self
    }

    pub fn update_batch_size(mut self, v: usize) -> Self {
        self.update_batch_size = v;
        self
    }

    pub fn build(self) -> Result<StreamingConfig, StreamError> {
        if self.buffer_size == 0 {
            return Err(StreamError::invalid_argument("buffer_size must be >= 1"));
        }
        let max_possible = ilog2_floor(self.buffer_size) as i32;
        if self.max_level != -1 && (self.max_level < 0 || self.max_level > max_possible) {
            return Err(StreamError::invalid_argument(format!(
                "max_level must be -1 (auto) or within [0, {max_possible}], got {}",
                self.max_level
            )));
        }
        if self.update_batch_size == 0 {
            return Err(StreamError::invalid_argument(
                "update_batch_size must be positive",
            ));
        }
        Ok(StreamingConfig {
            buffer_size: self.buffer_size,
            max_level: self.max_level,
            update_strategy: self.update_strategy,
            cache_intermediate_results: self.cache_intermediate_results,
            parallel_processing_enabled: self.parallel_processing_enabled,
            update_batch_size: self.update_batch_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_detect_max_level() {
        let cfg = StreamingConfig::builder(256).build().unwrap();
        assert_eq!(cfg.effective_max_level(), 8);
    }

    #[test]
    fn rejects_max_level_out_of_range() {
        assert!(StreamingConfig::builder(256).max_level(9).build().is_err());
        assert!(StreamingConfig::builder(256).max_level(3).build().is_ok());
    }

    #[test]
    fn rejects_zero_buffer_size() {
        assert!(StreamingConfig::builder(0).build().is_err());
    }

    #[test]
    fn rejects_zero_batch_size() {
        assert!(
            StreamingConfig::builder(64)
                .update_batch_size(0)
                .build()
                .is_err()
        );
    }

    #[test]
    fn default_strategy_is_incremental() {
        let cfg = StreamingConfig::builder(64).build().unwrap();
        assert_eq!(cfg.update_strategy(), UpdateStrategy::Incremental);
    }
}
