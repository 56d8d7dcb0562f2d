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
//! Streaming sliding-DFT / power-of-two FFT (spec.md §4.6). `INCREMENTAL`
//! is the one genuinely O(window) incremental step outside MODWT: each new
//! sample updates every bin by the algebraic recurrence
//! `X_k <- conj(omega_k) * (X_k + (s_new - s_old))`, with no re-summation,
//! where `omega_k = exp(-j*2*pi*k/N)` is the twiddle `FULL` uses for
//! `X_k = sum_i x[i] * omega_k^i` with the oldest sample at window index 0
//! — shifting every sample one position forward rotates `X_k` by
//! `omega_k^-1 = conj(omega_k)`, not `omega_k` itself. `FULL` always
//! re-derives the spectrum from the window (via the power-of-two FFT
//! engine when `buffer_size` is a power of two, otherwise a direct O(n^2)
//! sum); `LAZY` defers that recompute to the next read. Enabling Hann
//! windowing invalidates the sliding recurrence (it only holds for a
//! rectangular window), so `INCREMENTAL` degrades to `FULL` while Hann is
//! on.
use crate::config::{StreamingConfig, UpdateStrategy};
use crate::core::StreamingCore;
use crate::err::StreamError;
use crate::numeric::{StreamFloat, is_pow2};
use crate::observer::{CoefficientSnapshot, StreamObserver};
use num_complex::Complex;
use std::sync::Arc;
use zaft::FftDirection;

fn build_twiddles<T: StreamFloat>(n: usize) -> Vec<Complex<T>> {
    (0..n)
        .map(|k| {
            let angle = T::TWO_PI * T::from_f64_lossy(k as f64) / T::from_f64_lossy(n as f64);
            let (s, c) = angle.sincos();
            Complex::new(c, -s)
        })
        .collect()
}

fn build_hann<T: StreamFloat>(n: usize, enabled: bool) -> Vec<T> {
    if !enabled || n <= 1 {
        return vec![T::one(); n];
    }
    (0..n)
        .map(|i| {
            let angle =
                T::TWO_PI * T::from_f64_lossy(i as f64) / T::from_f64_lossy((n - 1) as f64);
            let (_, c) = angle.sincos();
            T::from_f64_lossy(0.5) * (T::one() - c)
        })
        .collect()
}

pub struct DftStream<T> {
    core: StreamingCore<T>,
    twiddles: Vec<Complex<T>>,
    hann_coeffs: Vec<T>,
    use_fft: bool,
    use_hann: bool,
    /// True for the `Fft` factory kind (spec.md §4.6's "real-FFT variant"):
    /// every derived spectrum (`frequency_bins`, magnitude/power/phase) is
    /// truncated to the `N/2 + 1` non-redundant bins `0 ..= fs/2`, since a
    /// real-valued input's upper half is the conjugate mirror of the lower.
    /// The internal `spectrum` buffer itself always holds all `N` complex
    /// bins — only the accessors narrow it.
    real_output: bool,
    sampling_rate: T,
    spectrum: Vec<Complex<T>>,
    initialized: bool,
}

impl<T: StreamFloat> DftStream<T> {
    pub fn new(
        config: StreamingConfig,
        sampling_rate: T,
        use_hann: bool,
    ) -> Result<Self, StreamError> {
        Self::new_with_output_shape(config, sampling_rate, use_hann, false)
    }

    /// As [`DftStream::new`], but `real_output` selects the real-FFT half-
    /// spectrum accessor shape (spec.md §4.6) instead of the full-spectrum
    /// DFT shape. Used by [`crate::factory::create_fft`].
    pub fn new_with_output_shape(
        config: StreamingConfig,
        sampling_rate: T,
        use_hann: bool,
        real_output: bool,
    ) -> Result<Self, StreamError> {
        let core = StreamingCore::new(config)?;
        let n = config.buffer_size();
        Ok(Self {
            core,
            twiddles: build_twiddles(n),
            hann_coeffs: build_hann(n, use_hann),
            use_fft: is_pow2(n),
            use_hann,
            real_output,
            sampling_rate,
            spectrum: vec![Complex::new(T::zero(), T::zero()); n],
            initialized: true,
        })
    }

    pub fn initialize(
        &mut self,
        buffer_size: usize,
        sampling_rate: T,
    ) -> Result<(), StreamError> {
        let config = StreamingConfig::builder(buffer_size)
            .update_strategy(self.core.strategy())
            .build()?;
        let use_hann = self.use_hann;
        let real_output = self.real_output;
        *self = Self::new_with_output_shape(config, sampling_rate, use_hann, real_output)?;
        Ok(())
    }

    /// Number of bins exposed through the accessors: `N/2 + 1` for the
    /// real-FFT variant, `N` otherwise.
    fn output_len(&self) -> usize {
        let n = self.core.config().buffer_size();
        if self.real_output { n / 2 + 1 } else { n }
    }

    fn require_initialized(&self) -> Result<(), StreamError> {
        if self.initialized {
            Ok(())
        } else {
            Err(StreamError::illegal_state("dft stream used before initialize"))
        }
    }

    /// Enables/disables the Hann analysis window. Changing it invalidates
    /// the sliding-DFT recurrence (which only holds with no windowing),
    /// forcing the next recompute to take the full path.
    pub fn set_hann_window(&mut self, enabled: bool) {
        if enabled != self.use_hann {
            self.use_hann = enabled;
            let n = self.core.config().buffer_size();
            self.hann_coeffs = build_hann(n, enabled);
            self.core.mark_dirty();
        }
    }

    fn recompute_full(&mut self) -> Result<(), StreamError> {
        let padded = self.core.window().to_padded_array();
        let windowed: Vec<Complex<T>> = padded
            .iter()
            .zip(self.hann_coeffs.iter())
            .map(|(&x, &w)| Complex::new(x * w, T::zero()))
            .collect();
        if self.use_fft {
            let fwd = T::make_fft(windowed.len(), FftDirection::Forward)?;
            let mut buf = windowed;
            fwd.execute(&mut buf)
                .map_err(|e| StreamError::FftError(e.to_string()))?;
            self.spectrum = buf;
        } else {
            let n = windowed.len();
            for k in 0..n {
                let mut acc = Complex::new(T::zero(), T::zero());
                for (i, &x) in windowed.iter().enumerate() {
                    acc += x * self.twiddles[(k * i) % n];
                }
                self.spectrum[k] = acc;
            }
        }
        self.core.mark_computed();
        Ok(())
    }

    /// The O(window) algebraic recurrence: appends one sample and rotates
    /// every bin by its conjugate twiddle (the forward shift's inverse
    /// rotation under `FULL`'s `omega_k^i` convention), adding in the delta
    /// between the entering and leaving samples. Falls back to a full
    /// recompute while the window hasn't filled yet (nothing has been
    /// evicted to subtract).
    fn slide_one(&mut self, sample: T) -> Result<(), StreamError> {
        let cap = self.core.window().capacity();
        let was_full = self.core.window().is_full();
        let old = if was_full {
            self.core.window().get(cap - 1)?
        } else {
            T::zero()
        };
        self.core.window_mut().append_one(sample);
        if was_full {
            let delta = Complex::new(sample - old, T::zero());
            for (k, x) in self.spectrum.iter_mut().enumerate() {
                *x = self.twiddles[k].conj() * (*x + delta);
            }
            self.core.mark_computed();
            Ok(())
        } else {
            self.recompute_full()
        }
    }

    fn notify(&self, new_sample_count: usize) {
        let snapshot = CoefficientSnapshot::Complex(self.spectrum.clone());
        self.core.notify_update(&snapshot, new_sample_count);
    }

    pub fn update(&mut self, samples: &[T]) -> Result<(), StreamError> {
        self.require_initialized()?;
        if samples.is_empty() {
            return Ok(());
        }
        match self.core.strategy() {
            UpdateStrategy::Full => {
                self.core.window_mut().append_many(samples)?;
                self.core.mark_dirty();
                self.recompute_full()?;
                self.core.maybe_notify_buffer_full();
                self.notify(samples.len());
            }
            UpdateStrategy::Incremental => {
                if self.use_hann {
                    self.core.window_mut().append_many(samples)?;
                    self.core.mark_dirty();
                    self.recompute_full()?;
                } else {
                    for &s in samples {
                        self.core.mark_dirty();
                        self.slide_one(s)?;
                    }
                }
                self.core.maybe_notify_buffer_full();
                self.notify(samples.len());
            }
            UpdateStrategy::Lazy => {
                self.core.window_mut().append_many(samples)?;
                self.core.mark_dirty();
                self.core.maybe_notify_buffer_full();
            }
        }
        Ok(())
    }

    fn ensure_fresh(&mut self) -> Result<(), StreamError> {
        if self.core.is_stale() {
            self.recompute_full()?;
            self.notify(0);
        }
        Ok(())
    }

    /// The full `N`-bin complex spectrum, regardless of output shape —
    /// callers who need the redundant upper half (e.g. to feed an inverse
    /// transform) bypass the real-FFT truncation here.
    pub fn current_spectrum(&mut self) -> Result<Vec<Complex<T>>, StreamError> {
        self.require_initialized()?;
        self.ensure_fresh()?;
        Ok(self.spectrum.clone())
    }

    pub fn magnitude_spectrum(&mut self) -> Result<Vec<T>, StreamError> {
        self.require_initialized()?;
        self.ensure_fresh()?;
        let len = self.output_len();
        Ok(self.spectrum[..len]
            .iter()
            .map(|c| (c.re * c.re + c.im * c.im).sqrt())
            .collect())
    }

    pub fn power_spectrum(&mut self) -> Result<Vec<T>, StreamError> {
        self.require_initialized()?;
        self.ensure_fresh()?;
        let len = self.output_len();
        Ok(self.spectrum[..len].iter().map(|c| c.re * c.re + c.im * c.im).collect())
    }

    pub fn phase_spectrum(&mut self) -> Result<Vec<T>, StreamError> {
        self.require_initialized()?;
        self.ensure_fresh()?;
        let len = self.output_len();
        Ok(self.spectrum[..len]
            .iter()
            .map(|c| T::from_f64_lossy(c.im.to_f64_lossy().atan2(c.re.to_f64_lossy())))
            .collect())
    }

    /// Linear bins `0 .. fs*(N-1)/N` over all `N` bins for the plain DFT
    /// shape, or `0 ..= fs/2` over `N/2 + 1` bins for the real-FFT variant
    /// (spec.md §4.6).
    pub fn frequency_bins(&self) -> Vec<T> {
        let n = self.core.config().buffer_size();
        let len = self.output_len();
        (0..len)
            .map(|k| T::from_f64_lossy(k as f64) * self.sampling_rate / T::from_f64_lossy(n as f64))
            .collect()
    }

    /// The non-DC bin (within the first Nyquist half) with the largest
    /// magnitude, and its frequency in Hz.
    pub fn dominant_frequency(&mut self) -> Result<T, StreamError> {
        self.require_initialized()?;
        let n = self.core.config().buffer_size();
        let mags = self.magnitude_spectrum()?;
        if mags.len() < 2 {
            return Ok(T::zero());
        }
        let half = (n / 2).min(mags.len() - 1).max(1);
        let (best_k, _) = mags[1..=half]
            .iter()
            .enumerate()
            .fold((1usize, mags[1]), |(bi, bv), (i, &v)| {
                if v > bv { (i + 1, v) } else { (bi, bv) }
            });
        Ok(self.frequency_bins()[best_k])
    }

    /// The magnitude-weighted mean frequency over the first Nyquist half.
    pub fn spectral_centroid(&mut self) -> Result<T, StreamError> {
        self.require_initialized()?;
        let n = self.core.config().buffer_size();
        let mags = self.magnitude_spectrum()?;
        let freqs = self.frequency_bins();
        let half = ((n / 2) + 1).min(mags.len());
        let mut num = T::zero();
        let mut denom = T::zero();
        for k in 0..half {
            num += freqs[k] * mags[k];
            denom += mags[k];
        }
        if denom == T::zero() {
            Ok(T::zero())
        } else {
            Ok(num / denom)
        }
    }

    pub fn reset(&mut self) {
        for c in self.spectrum.iter_mut() {
            *c = Complex::new(T::zero(), T::zero());
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

    fn make(n: usize, strategy: UpdateStrategy, hann: bool) -> DftStream<f64> {
        let cfg = StreamingConfig::builder(n)
            .update_strategy(strategy)
            .build()
            .unwrap();
        DftStream::new(cfg, 1.0, hann).unwrap()
    }

    fn tone(n: usize, bin: usize, total_len: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * bin as f64 * i as f64 / total_len as f64).sin())
            .collect()
    }

    #[test]
    fn s2_sliding_dft_matches_full_recompute_for_single_tone() {
        let n = 32;
        let bin = 5;
        let xs = tone(64, bin, n);

        let mut sliding = make(n, UpdateStrategy::Incremental, false);
        sliding.update(&xs).unwrap();

        let mut full = make(n, UpdateStrategy::Full, false);
        full.update(&xs).unwrap();

        let a = sliding.magnitude_spectrum().unwrap();
        let b = full.magnitude_spectrum().unwrap();
        for (&x, &y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-6, "{x} vs {y}");
        }
        let dominant = sliding.dominant_frequency().unwrap();
        assert!((dominant - bin as f64 / n as f64).abs() < 1e-6);
    }

    /// A non-bin-aligned, non-periodic drive and a slide count that isn't a
    /// multiple of the window — unlike `s2`'s period-N tone this can't be
    /// accidentally satisfied by a sign error in the twiddle rotation
    /// (`omega^N = 1` would hide it there).
    #[test]
    fn sliding_dft_matches_full_recompute_for_non_periodic_signal() {
        let n = 32;
        let xs: Vec<f64> = (0..n + 7)
            .map(|i| {
                let i = i as f64;
                (0.37 * i).sin() + 0.6 * (1.9 * i).cos() + 0.05 * i
            })
            .collect();

        let mut sliding = make(n, UpdateStrategy::Incremental, false);
        sliding.update(&xs).unwrap();

        let mut full = make(n, UpdateStrategy::Full, false);
        full.update(&xs).unwrap();

        let a = sliding.current_spectrum().unwrap();
        let b = full.current_spectrum().unwrap();
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).norm() < 1e-6, "{x} vs {y}");
        }
    }

    #[test]
    fn s3_hann_window_reduces_off_peak_leakage() {
        let n = 64;
        // Non-integer-period tone (8.37 cycles across the window) so a
        // rectangular window leaks badly.
        let xs: Vec<f64> = (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * 8.37 * i as f64 / n as f64).sin())
            .collect();

        let mut rect = make(n, UpdateStrategy::Full, false);
        rect.update(&xs).unwrap();
        let mut hann = make(n, UpdateStrategy::Full, true);
        hann.update(&xs).unwrap();

        let rect_mag = rect.magnitude_spectrum().unwrap();
        let hann_mag = hann.magnitude_spectrum().unwrap();

        // off-peak bin far from the tone's bin
        let off_peak = 20;
        assert!(
            hann_mag[off_peak] <= rect_mag[off_peak] * 0.5,
            "hann={} rect={}",
            hann_mag[off_peak],
            rect_mag[off_peak]
        );
    }

    #[test]
    fn incremental_with_hann_degrades_to_full() {
        let n = 32;
        let xs = tone(40, 3, n);
        let mut inc = make(n, UpdateStrategy::Incremental, true);
        inc.update(&xs).unwrap();
        let mut full = make(n, UpdateStrategy::Full, true);
        full.update(&xs).unwrap();
        let a = inc.magnitude_spectrum().unwrap();
        let b = full.magnitude_spectrum().unwrap();
        for (&x, &y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn lazy_defers_until_read() {
        let mut t = make(32, UpdateStrategy::Lazy, false);
        t.update(&tone(32, 4, 32)).unwrap();
        assert!(t.core.is_stale());
        let _ = t.magnitude_spectrum().unwrap();
        assert!(!t.core.is_stale());
    }

    #[test]
    fn real_fft_output_shape_is_half_spectrum() {
        let cfg = StreamingConfig::builder(64)
            .update_strategy(UpdateStrategy::Full)
            .build()
            .unwrap();
        let mut t = DftStream::new_with_output_shape(cfg, 8.0, false, true).unwrap();
        t.update(&tone(64, 4, 64)).unwrap();

        let mags = t.magnitude_spectrum().unwrap();
        let bins = t.frequency_bins();
        assert_eq!(mags.len(), 33);
        assert_eq!(bins.len(), 33);
        assert!((bins[0]).abs() < 1e-12);
        assert!((bins[32] - 4.0).abs() < 1e-9, "nyquist should be fs/2");

        let full = t.current_spectrum().unwrap();
        assert_eq!(full.len(), 64, "internal buffer keeps all N complex bins");
    }

    #[test]
    fn reset_zeros_spectrum() {
        let mut t = make(32, UpdateStrategy::Full, false);
        t.update(&tone(32, 4, 32)).unwrap();
        t.reset();
        let spec = t.current_spectrum().unwrap();
        assert!(spec.iter().all(|c| c.re == 0.0 && c.im == 0.0));
    }
}
