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
//! Streaming Continuous Wavelet Transform (spec.md §4.5): a direct
//! time-domain evaluation path used for small windows, and an FFT
//! evaluation path (grounded in the teacher crate's `cwt_executor.rs`
//! forward-FFT-once / per-scale-multiply / inverse-FFT shape) switched on
//! once the buffer is large enough that circular convolution pays for
//! itself. `INCREMENTAL` degrades to a full recompute here too — this
//! transform's 10% overhead allowance is spent simply by not doing less
//! work than `FULL`, rather than by a genuine partial recompute.
use crate::config::{StreamingConfig, UpdateStrategy};
use crate::core::StreamingCore;
use crate::err::StreamError;
use crate::numeric::StreamFloat;
use crate::observer::{CoefficientSnapshot, StreamObserver};
use crate::spectrum_arith::{ArithmeticBackend, SpectrumArithmetic};
use crate::wavelets::ContinuousWavelet;
use num_complex::Complex;
use num_traits::AsPrimitive;
use std::sync::Arc;
use zaft::FftDirection;

/// Minimum buffer size at which the FFT evaluation path is used instead of
/// direct time-domain convolution.
const FFT_THRESHOLD: usize = 64;

/// A linearly spaced scale grid from `min` to `max` inclusive (`count >=
/// 1`; `count == 1` yields just `min`).
pub fn linear_scales<T: StreamFloat>(min: T, max: T, count: usize) -> Vec<T> {
    if count <= 1 {
        return vec![min];
    }
    let step = (max - min) / T::from_f64_lossy((count - 1) as f64);
    (0..count)
        .map(|i| min + step * T::from_f64_lossy(i as f64))
        .collect()
}

/// A log2-spaced scale grid from `min` to `max` inclusive, the conventional
/// grid for wavelet scalograms (equal spacing in octaves).
pub fn log_scales<T: StreamFloat>(min: T, max: T, count: usize) -> Vec<T> {
    if count <= 1 {
        return vec![min];
    }
    let log_min = min.log2();
    let log_max = max.log2();
    let step = (log_max - log_min) / T::from_f64_lossy((count - 1) as f64);
    (0..count)
        .map(|i| (log_min + step * T::from_f64_lossy(i as f64)).exp2())
        .collect()
}

/// Samples `psi(lag/scale)` over the centered-lag indexing an FFT expects:
/// index `m` holds lag `m` for `m <= n/2` and lag `m - n` otherwise, zeroed
/// outside the wavelet's effective support.
fn centered_kernel<T: StreamFloat>(
    wavelet: &dyn ContinuousWavelet<T>,
    scale: T,
    n: usize,
) -> Vec<Complex<T>> {
    let support = wavelet.effective_support() * scale;
    let mut kernel = vec![Complex::new(T::zero(), T::zero()); n];
    for (m, slot) in kernel.iter_mut().enumerate() {
        let lag: isize = if m <= n / 2 {
            m as isize
        } else {
            m as isize - n as isize
        };
        let lag_t = T::from_f64_lossy(lag as f64);
        if lag_t.abs() <= support {
            *slot = wavelet.psi(lag_t / scale);
        }
    }
    kernel
}

/// `W(scale, t) = (1/sqrt(scale)) * sum_t' x[t'] * conj(psi((t'-t)/scale))`,
/// zero-padded at the window edges (not circular — the direct path's
/// boundary behavior intentionally differs from the FFT path's circular
/// wraparound; both are valid evaluation strategies for the same kernel).
fn direct_convolve_at<T: StreamFloat>(
    wavelet: &dyn ContinuousWavelet<T>,
    padded: &[T],
    t: usize,
    scale: T,
) -> Complex<T> {
    let n = padded.len();
    let support = wavelet.effective_support();
    let radius: usize = (support * scale).ceil().as_();
    let lo = t.saturating_sub(radius);
    let hi = (t + radius).min(n.saturating_sub(1));
    let mut acc = Complex::new(T::zero(), T::zero());
    for tp in lo..=hi {
        let dt = T::from_f64_lossy(tp as f64 - t as f64);
        let arg = dt / scale;
        if arg.abs() <= support {
            let psi_val = wavelet.psi(arg);
            acc += psi_val.conj() * Complex::new(padded[tp], T::zero());
        }
    }
    let norm = T::one() / scale.sqrt();
    Complex::new(acc.re * norm, acc.im * norm)
}

pub struct CwtStream<T> {
    core: StreamingCore<T>,
    wavelet: Arc<dyn ContinuousWavelet<T>>,
    scales: Vec<T>,
    sampling_rate: T,
    arithmetic: Box<dyn SpectrumArithmetic<T>>,
    backend: ArithmeticBackend,
    use_fft: bool,
    /// `coefficients[scale_index][time_index]`, time axis oldest-to-newest
    /// over the zero-padded window.
    coefficients: Vec<Vec<Complex<T>>>,
    initialized: bool,
}

impl<T: StreamFloat> CwtStream<T> {
    pub fn new(
        wavelet: Arc<dyn ContinuousWavelet<T>>,
        config: StreamingConfig,
        scales: Vec<T>,
        sampling_rate: T,
        backend: ArithmeticBackend,
    ) -> Result<Self, StreamError> {
        if scales.is_empty() {
            return Err(StreamError::invalid_argument("scales must not be empty"));
        }
        if scales.iter().any(|&s| s <= T::zero()) {
            return Err(StreamError::invalid_argument("scales must all be > 0"));
        }
        let core = StreamingCore::new(config)?;
        let n = config.buffer_size();
        let use_fft = n >= FFT_THRESHOLD;
        let coefficients = vec![vec![Complex::new(T::zero(), T::zero()); n]; scales.len()];
        Ok(Self {
            core,
            wavelet,
            scales,
            sampling_rate,
            arithmetic: backend.build(),
            backend,
            use_fft,
            coefficients,
            initialized: true,
        })
    }

    pub fn initialize(
        &mut self,
        buffer_size: usize,
        scales: Vec<T>,
        sampling_rate: T,
    ) -> Result<(), StreamError> {
        let config = StreamingConfig::builder(buffer_size)
            .update_strategy(self.core.strategy())
            .build()?;
        *self = Self::new(self.wavelet.clone(), config, scales, sampling_rate, self.backend)?;
        Ok(())
    }

    fn require_initialized(&self) -> Result<(), StreamError> {
        if self.initialized {
            Ok(())
        } else {
            Err(StreamError::illegal_state("cwt stream used before initialize"))
        }
    }

    fn recompute_full(&mut self) -> Result<(), StreamError> {
        let n = self.core.config().buffer_size();
        let padded = self.core.window().to_padded_array();
        if self.use_fft {
            self.fft_recompute(n, &padded)?;
        } else {
            self.direct_recompute(n, &padded);
        }
        self.core.mark_computed();
        Ok(())
    }

    fn direct_recompute(&mut self, n: usize, padded: &[T]) {
        for (si, &scale) in self.scales.iter().enumerate() {
            for t in 0..n {
                self.coefficients[si][t] = direct_convolve_at(self.wavelet.as_ref(), padded, t, scale);
            }
        }
    }

    fn fft_recompute(&mut self, n: usize, padded: &[T]) -> Result<(), StreamError> {
        let fwd = T::make_fft(n, FftDirection::Forward)?;
        let inv = T::make_fft(n, FftDirection::Inverse)?;
        let mut xf: Vec<Complex<T>> = padded
            .iter()
            .map(|&v| Complex::new(v, T::zero()))
            .collect();
        fwd.execute(&mut xf)
            .map_err(|e| StreamError::FftError(e.to_string()))?;

        for (si, &scale) in self.scales.iter().enumerate() {
            let mut kf = centered_kernel(self.wavelet.as_ref(), scale, n);
            fwd.execute(&mut kf)
                .map_err(|e| StreamError::FftError(e.to_string()))?;
            let mut conj_kf = vec![Complex::new(T::zero(), T::zero()); n];
            self.arithmetic.conjugate(&mut conj_kf, &kf);
            let mut prod = vec![Complex::new(T::zero(), T::zero()); n];
            self.arithmetic.mul(&mut prod, &xf, &conj_kf);
            inv.execute(&mut prod)
                .map_err(|e| StreamError::FftError(e.to_string()))?;
            let norm = T::one() / (T::from_f64_lossy(n as f64) * scale.sqrt());
            for c in prod.iter_mut() {
                *c = Complex::new(c.re * norm, c.im * norm);
            }
            self.coefficients[si] = prod;
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

    fn notify(&self, new_sample_count: usize) {
        let snapshot = CoefficientSnapshot::ComplexMatrix(self.coefficients.clone());
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
                self.recompute_full()?;
                self.core.maybe_notify_buffer_full();
                self.notify(samples.len());
            }
            UpdateStrategy::Lazy => {
                self.core.maybe_notify_buffer_full();
            }
        }
        Ok(())
    }

    /// Replaces the scale grid; the new grid takes effect on the next
    /// recompute (a deferred full recompute, triggered by the next
    /// `update`/accessor call regardless of strategy).
    pub fn update_scales(&mut self, scales: Vec<T>) -> Result<(), StreamError> {
        self.require_initialized()?;
        if scales.is_empty() {
            return Err(StreamError::invalid_argument("scales must not be empty"));
        }
        if scales.iter().any(|&s| s <= T::zero()) {
            return Err(StreamError::invalid_argument("scales must all be > 0"));
        }
        let n = self.core.config().buffer_size();
        self.scales = scales;
        self.coefficients = vec![vec![Complex::new(T::zero(), T::zero()); n]; self.scales.len()];
        self.core.mark_dirty();
        Ok(())
    }

    pub fn scalogram(&mut self) -> Result<Vec<Vec<T>>, StreamError> {
        self.require_initialized()?;
        self.ensure_fresh()?;
        let mut mags = Vec::with_capacity(self.coefficients.len());
        for row in &self.coefficients {
            let mut out = vec![T::zero(); row.len()];
            self.arithmetic.magnitude(&mut out, row);
            mags.push(out);
        }
        Ok(mags)
    }

    pub fn phase(&mut self) -> Result<Vec<Vec<T>>, StreamError> {
        self.require_initialized()?;
        self.ensure_fresh()?;
        Ok(self
            .coefficients
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| T::from_f64_lossy(c.im.to_f64_lossy().atan2(c.re.to_f64_lossy())))
                    .collect()
            })
            .collect())
    }

    pub fn scale_energies(&mut self) -> Result<Vec<T>, StreamError> {
        self.require_initialized()?;
        self.ensure_fresh()?;
        Ok(self
            .coefficients
            .iter()
            .map(|row| row.iter().fold(T::zero(), |acc, c| acc + c.re * c.re + c.im * c.im))
            .collect())
    }

    pub fn coefficients_at_scale(&mut self, scale_index: usize) -> Result<Vec<Complex<T>>, StreamError> {
        self.require_initialized()?;
        if scale_index >= self.scales.len() {
            return Err(StreamError::invalid_argument(format!(
                "scale_index must be within [0, {}), got {scale_index}",
                self.scales.len()
            )));
        }
        self.ensure_fresh()?;
        Ok(self.coefficients[scale_index].clone())
    }

    pub fn coefficients_at_time(&mut self, time_index: usize) -> Result<Vec<Complex<T>>, StreamError> {
        self.require_initialized()?;
        let n = self.core.config().buffer_size();
        if time_index >= n {
            return Err(StreamError::bounds(format!(
                "time_index {time_index} out of bounds for buffer size {n}"
            )));
        }
        self.ensure_fresh()?;
        Ok(self.coefficients.iter().map(|row| row[time_index]).collect())
    }

    pub fn frequencies(&self) -> Vec<T> {
        let center = self.wavelet.center_frequency();
        self.scales
            .iter()
            .map(|&scale| center * self.sampling_rate / scale)
            .collect()
    }

    pub fn time_axis(&self) -> Vec<T> {
        let n = self.core.config().buffer_size();
        (0..n)
            .map(|i| T::from_f64_lossy(i as f64) / self.sampling_rate)
            .collect()
    }

    pub fn reset(&mut self) {
        for row in self.coefficients.iter_mut() {
            row.iter_mut()
                .for_each(|c| *c = Complex::new(T::zero(), T::zero()));
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
    use crate::wavelets::MorletWavelet;

    fn make(n: usize, scales: Vec<f64>) -> CwtStream<f64> {
        let cfg = StreamingConfig::builder(n)
            .update_strategy(UpdateStrategy::Full)
            .build()
            .unwrap();
        CwtStream::new(
            Arc::new(MorletWavelet::<f64>::default()),
            cfg,
            scales,
            1.0,
            ArithmeticBackend::SplitBuffer,
        )
        .unwrap()
    }

    fn tone(n: usize, period: f64) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * i as f64 / period).sin())
            .collect()
    }

    #[test]
    fn direct_and_fft_paths_agree_away_from_edges() {
        let n = 128;
        let xs = tone(n, 16.0);
        let scales = vec![2.0, 4.0, 8.0];

        let mut direct = make(n, scales.clone());
        direct.use_fft = false;
        direct.update(&xs).unwrap();

        let mut fft = make(n, scales);
        fft.use_fft = true;
        fft.update(&xs).unwrap();

        let a = direct.scalogram().unwrap();
        let b = fft.scalogram().unwrap();
        for (row_a, row_b) in a.iter().zip(b.iter()) {
            for (&x, &y) in row_a[32..96].iter().zip(row_b[32..96].iter()) {
                assert!((x - y).abs() < 0.05, "{x} vs {y}");
            }
        }
    }

    #[test]
    fn scale_index_out_of_range_is_invalid_argument() {
        let mut t = make(128, vec![2.0, 4.0]);
        t.update(&tone(128, 16.0)).unwrap();
        assert!(t.coefficients_at_scale(5).is_err());
    }

    #[test]
    fn rejects_non_positive_scales() {
        let cfg = StreamingConfig::builder(64).build().unwrap();
        let r = CwtStream::new(
            Arc::new(MorletWavelet::<f64>::default()),
            cfg,
            vec![1.0, -2.0],
            1.0,
            ArithmeticBackend::SplitBuffer,
        );
        assert!(r.is_err());
    }

    #[test]
    fn linear_scales_are_evenly_spaced() {
        let s = linear_scales(1.0f64, 9.0, 5);
        assert_eq!(s, vec![1.0, 3.0, 5.0, 7.0, 9.0]);
    }

    #[test]
    fn log_scales_are_monotonic() {
        let s = log_scales(1.0f64, 32.0, 6);
        for w in s.windows(2) {
            assert!(w[1] > w[0]);
        }
        assert!((s[0] - 1.0).abs() < 1e-9);
        assert!((s[5] - 32.0).abs() < 1e-6);
    }

    #[test]
    fn log_scales_form_a_geometric_progression() {
        let s = log_scales(1.0f64, 64.0, 7);
        let ratio = s[1] / s[0];
        for w in s.windows(2) {
            assert!((w[1] / w[0] - ratio).abs() < 1e-14, "{} vs {}", w[1] / w[0], ratio);
        }
    }

    #[test]
    fn s6_dominant_frequency_from_scale_energies_matches_tone() {
        let n = 256;
        let fs = 100.0f64;
        let xs: Vec<f64> = (0..n)
            .map(|i| (2.0 * std::f64::consts::PI * 10.0 * i as f64 / fs).sin())
            .collect();
        let scales = linear_scales(1.0f64, 16.0, 8);
        let mut t = make(n, scales);
        t.sampling_rate = fs;
        t.update(&xs).unwrap();
        let energies = t.scale_energies().unwrap();
        let freqs = t.frequencies();
        let (peak_idx, _) = energies
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap();
        let dominant = freqs[peak_idx];
        assert!(
            (dominant - 10.0).abs() <= fs / n as f64,
            "dominant={dominant}"
        );
    }

    #[test]
    fn lazy_strategy_defers_recompute_until_read() {
        let cfg = StreamingConfig::builder(64)
            .update_strategy(UpdateStrategy::Lazy)
            .build()
            .unwrap();
        let mut t = CwtStream::new(
            Arc::new(MorletWavelet::<f64>::default()),
            cfg,
            vec![2.0, 4.0],
            1.0,
            ArithmeticBackend::SplitBuffer,
        )
        .unwrap();
        t.update(&tone(64, 16.0)).unwrap();
        assert!(t.core.is_stale());
        let _ = t.scalogram().unwrap();
        assert!(!t.core.is_stale());
    }
}
