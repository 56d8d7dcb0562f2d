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
use crate::numeric::StreamFloat;
use num_traits::AsPrimitive;

/// An orthogonal discrete wavelet filter bank: analysis (decomposition)
/// lowpass/highpass and synthesis (reconstruction) lowpass/highpass FIR
/// filters. For the orthogonal families in this catalogue the synthesis
/// filters are the time-reversed analysis filters.
pub trait DiscreteWavelet<T>: Send + Sync {
    fn name(&self) -> &'static str;
    fn decomposition_low(&self) -> &[T];
    fn decomposition_high(&self) -> &[T];
    fn reconstruction_low(&self) -> &[T];
    fn reconstruction_high(&self) -> &[T];

    fn filter_length(&self) -> usize {
        self.decomposition_low().len()
    }
}

/// Builds the QMF highpass and both reconstruction filters from a
/// normalized lowpass analysis filter, the construction every orthogonal
/// wavelet in this catalogue shares: `g[n] = (-1)^n h[L-1-n]`,
/// `f0 = reverse(h)`, `f1 = reverse(g)`.
fn qmf_filter_bank<T: Copy + std::ops::Neg<Output = T>>(low: &[T]) -> (Vec<T>, Vec<T>, Vec<T>) {
    let l = low.len();
    let high: Vec<T> = (0..l)
        .map(|n| {
            let v = low[l - 1 - n];
            if n % 2 == 0 { v } else { -v }
        })
        .collect();
    let rec_low: Vec<T> = low.iter().rev().copied().collect();
    let rec_high: Vec<T> = high.iter().rev().copied().collect();
    (high, rec_low, rec_high)
}

#[derive(Debug, Clone)]
pub struct HaarWavelet<T> {
    low: Vec<T>,
    high: Vec<T>,
    rec_low: Vec<T>,
    rec_high: Vec<T>,
}

impl<T: StreamFloat> Default for HaarWavelet<T>
where
    f64: AsPrimitive<T>,
{
    fn default() -> Self {
        let s: T = std::f64::consts::FRAC_1_SQRT_2.as_();
        let low = vec![s, s];
        let (high, rec_low, rec_high) = qmf_filter_bank(&low);
        Self {
            low,
            high,
            rec_low,
            rec_high,
        }
    }
}

impl<T: StreamFloat> DiscreteWavelet<T> for HaarWavelet<T> {
    fn name(&self) -> &'static str {
        "haar"
    }
    fn decomposition_low(&self) -> &[T] {
        &self.low
    }
    fn decomposition_high(&self) -> &[T] {
        &self.high
    }
    fn reconstruction_low(&self) -> &[T] {
        &self.rec_low
    }
    fn reconstruction_high(&self) -> &[T] {
        &self.rec_high
    }
}

/// Daubechies wavelet with 2 vanishing moments (4 filter taps, "db2" in the
/// common PyWavelets naming).
#[derive(Debug, Clone)]
pub struct Daubechies4Wavelet<T> {
    low: Vec<T>,
    high: Vec<T>,
    rec_low: Vec<T>,
    rec_high: Vec<T>,
}

impl<T: StreamFloat> Default for Daubechies4Wavelet<T>
where
    f64: AsPrimitive<T>,
{
    fn default() -> Self {
        let sqrt3: f64 = 3f64.sqrt();
        let denom = 4.0 * std::f64::consts::SQRT_2;
        let low: Vec<T> = [
            (1.0 + sqrt3) / denom,
            (3.0 + sqrt3) / denom,
            (3.0 - sqrt3) / denom,
            (1.0 - sqrt3) / denom,
        ]
        .into_iter()
        .map(|v: f64| v.as_())
        .collect();
        let (high, rec_low, rec_high) = qmf_filter_bank(&low);
        Self {
            low,
            high,
            rec_low,
            rec_high,
        }
    }
}

impl<T: StreamFloat> DiscreteWavelet<T> for Daubechies4Wavelet<T> {
    fn name(&self) -> &'static str {
        "db2"
    }
    fn decomposition_low(&self) -> &[T] {
        &self.low
    }
    fn decomposition_high(&self) -> &[T] {
        &self.high
    }
    fn reconstruction_low(&self) -> &[T] {
        &self.rec_low
    }
    fn reconstruction_high(&self) -> &[T] {
        &self.rec_high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dot(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn haar_is_normalized_and_orthogonal() {
        let w = HaarWavelet::<f64>::default();
        assert!((dot(w.decomposition_low(), w.decomposition_low()) - 1.0).abs() < 1e-12);
        assert!((dot(w.decomposition_high(), w.decomposition_high()) - 1.0).abs() < 1e-12);
        assert!(dot(w.decomposition_low(), w.decomposition_high()).abs() < 1e-12);
    }

    #[test]
    fn db4_is_normalized_and_orthogonal() {
        let w = Daubechies4Wavelet::<f64>::default();
        assert!((dot(w.decomposition_low(), w.decomposition_low()) - 1.0).abs() < 1e-10);
        assert!((dot(w.decomposition_high(), w.decomposition_high()) - 1.0).abs() < 1e-10);
        assert!(dot(w.decomposition_low(), w.decomposition_high()).abs() < 1e-10);
    }
}
