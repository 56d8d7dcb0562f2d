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
//! Single-level periodic (circular-boundary) orthogonal filter-bank
//! primitive shared by the streaming FWT and WPT (spec.md §4.4): both are
//! full-recompute wrappers built on the same one-level decompose/
//! reconstruct step, applied either along a single pyramid (FWT) or over
//! the full binary tree (WPT).
//!
//! `inverse_level` is the exact matrix transpose of `forward_level`'s
//! circular analysis operator; for the orthonormal filter pairs this
//! catalogue builds (§`wavelets::discrete`), transpose-equals-inverse, so
//! forward/inverse round-trip to machine precision.
use crate::numeric::StreamFloat;

/// Splits `x` (length `m`, `m` even) into approximation/detail halves of
/// length `m/2` using lowpass filter `h` and highpass filter `g`.
pub(crate) fn forward_level<T: StreamFloat>(x: &[T], h: &[T], g: &[T]) -> (Vec<T>, Vec<T>) {
    let m = x.len();
    let half = m / 2;
    let mut a = vec![T::zero(); half];
    let mut d = vec![T::zero(); half];
    for i in 0..half {
        let mut asum = T::zero();
        let mut dsum = T::zero();
        for (k, (&hk, &gk)) in h.iter().zip(g.iter()).enumerate() {
            let idx = (2 * i + k) % m;
            asum += hk * x[idx];
            dsum += gk * x[idx];
        }
        a[i] = asum;
        d[i] = dsum;
    }
    (a, d)
}

/// Reconstructs the length-`m` signal from approximation/detail halves,
/// the exact transpose of [`forward_level`].
pub(crate) fn inverse_level<T: StreamFloat>(a: &[T], d: &[T], h: &[T], g: &[T]) -> Vec<T> {
    let half = a.len();
    let m = half * 2;
    let l = h.len();
    let mut x = vec![T::zero(); m];
    for (n, slot) in x.iter_mut().enumerate() {
        let mut sum = T::zero();
        for i in 0..half {
            let shift = 2 * i;
            let j = ((n + m) - (shift % m)) % m;
            if j < l {
                sum += a[i] * h[j] + d[i] * g[j];
            }
        }
        *slot = sum;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wavelets::{DiscreteWavelet, HaarWavelet};

    #[test]
    fn haar_single_level_round_trips() {
        let w = HaarWavelet::<f64>::default();
        let x = vec![1.0, 2.0, 3.0, 4.0, -1.0, 0.5, 2.5, 6.0];
        let (a, d) = forward_level(&x, w.decomposition_low(), w.decomposition_high());
        let back = inverse_level(&a, &d, w.decomposition_low(), w.decomposition_high());
        for (got, want) in back.iter().zip(x.iter()) {
            assert!((got - want).abs() < 1e-10);
        }
    }

    #[test]
    fn haar_two_sample_matches_hand_derivation() {
        let w = HaarWavelet::<f64>::default();
        let x = vec![1.0, 3.0];
        let (a, d) = forward_level(&x, w.decomposition_low(), w.decomposition_high());
        let s = std::f64::consts::FRAC_1_SQRT_2;
        assert!((a[0] - s * 4.0).abs() < 1e-12);
        assert!((d[0] - s * -2.0).abs() < 1e-12);
    }
}
