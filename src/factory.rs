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
//! Transform-type tagged factory (spec.md §4.7): builds any of the six
//! streaming-transform kinds behind one enum, validates that a wavelet is
//! supplied exactly where its kind requires one, and recommends a buffer
//! size for a desired decomposition depth.
use crate::config::StreamingConfig;
use crate::cwt::CwtStream;
use crate::dft::DftStream;
use crate::err::StreamError;
use crate::fwt::FwtStream;
use crate::modwt::ModwtStream;
use crate::numeric::StreamFloat;
use crate::observer::StreamObserver;
use crate::spectrum_arith::ArithmeticBackend;
use crate::wavelets::{ContinuousWavelet, DiscreteWavelet};
use crate::wpt::WptStream;
use std::sync::Arc;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TransformKind {
    Fwt,
    Wpt,
    Modwt,
    Cwt,
    Fft,
    Dft,
}

impl TransformKind {
    /// True for the dyadic/discrete-wavelet kinds, which require a
    /// [`DiscreteWavelet`] and forbid a continuous one.
    pub fn requires_discrete_wavelet(self) -> bool {
        matches!(self, TransformKind::Fwt | TransformKind::Wpt | TransformKind::Modwt)
    }

    /// True only for `Cwt`, which requires a [`ContinuousWavelet`] and
    /// forbids a discrete one.
    pub fn requires_continuous_wavelet(self) -> bool {
        matches!(self, TransformKind::Cwt)
    }

    /// True for `Fft`, which additionally requires `buffer_size` to be a
    /// power of two (spec.md §4.6's "power-of-two FFT variant").
    pub fn requires_power_of_two_buffer(self) -> bool {
        matches!(self, TransformKind::Fft)
    }
}

/// Validates that a wavelet was (or wasn't) supplied consistently with
/// `kind`'s requirement, before any expensive construction happens.
pub fn validate_wavelet_presence(
    kind: TransformKind,
    discrete_present: bool,
    continuous_present: bool,
) -> Result<(), StreamError> {
    if kind.requires_discrete_wavelet() {
        if !discrete_present {
            return Err(StreamError::invalid_argument(format!(
                "{kind:?} requires a discrete wavelet"
            )));
        }
        if continuous_present {
            return Err(StreamError::invalid_argument(format!(
                "{kind:?} does not accept a continuous wavelet"
            )));
        }
    } else if kind.requires_continuous_wavelet() {
        if !continuous_present {
            return Err(StreamError::invalid_argument(format!(
                "{kind:?} requires a continuous wavelet"
            )));
        }
        if discrete_present {
            return Err(StreamError::invalid_argument(format!(
                "{kind:?} does not accept a discrete wavelet"
            )));
        }
    } else if discrete_present || continuous_present {
        return Err(StreamError::invalid_argument(format!(
            "{kind:?} does not accept a wavelet"
        )));
    }
    Ok(())
}

/// Recommends a `buffer_size` for a desired decomposition depth, following
/// spec.md §4.7's table exactly (`desired_level == -1` means "auto",
/// treated as depth 4):
///
/// | Kind | Formula |
/// |---|---|
/// | FWT / WPT | `2^max(level + 3, 8)`, capped at `2^30` |
/// | MODWT | `max(level * 128, 512)` |
/// | CWT | `max(level * 64, 256)` |
/// | FFT / DFT | `2^max(level, 10)`, capped at `2^30` |
///
/// Bit-shift arguments are clamped to 30 before use so the shift itself
/// never overflows `usize`, regardless of how large `desired_level` is.
pub fn recommended_buffer_size(kind: TransformKind, desired_level: i32) -> Result<usize, StreamError> {
    if desired_level < -1 {
        return Err(StreamError::invalid_argument(
            "desired_level must be -1 (auto) or >= 0",
        ));
    }
    let level: u32 = if desired_level == -1 {
        4
    } else {
        desired_level as u32
    };
    let size = match kind {
        TransformKind::Fwt | TransformKind::Wpt => {
            let shift = level.saturating_add(3).max(8).min(30);
            1usize << shift
        }
        TransformKind::Modwt => (level as usize).saturating_mul(128).max(512),
        TransformKind::Cwt => (level as usize).saturating_mul(64).max(256),
        TransformKind::Fft | TransformKind::Dft => {
            let shift = level.max(10).min(30);
            1usize << shift
        }
    };
    Ok(size)
}

/// A constructed streaming transform of any kind, dispatched behind one
/// type so callers that only know the kind at runtime (e.g. a config file
/// or CLI flag) can drive it uniformly.
pub enum StreamingTransform<T> {
    Fwt(FwtStream<T>),
    Wpt(WptStream<T>),
    Modwt(ModwtStream<T>),
    Cwt(CwtStream<T>),
    Dft(DftStream<T>),
}

impl<T: StreamFloat> StreamingTransform<T> {
    pub fn update(&mut self, samples: &[T]) -> Result<(), StreamError> {
        match self {
            StreamingTransform::Fwt(s) => s.update(samples).map(|_| ()),
            StreamingTransform::Wpt(s) => s.update(samples),
            StreamingTransform::Modwt(s) => s.update(samples).map(|_| ()),
            StreamingTransform::Cwt(s) => s.update(samples),
            StreamingTransform::Dft(s) => s.update(samples),
        }
    }

    pub fn reset(&mut self) {
        match self {
            StreamingTransform::Fwt(s) => s.reset(),
            StreamingTransform::Wpt(s) => s.reset(),
            StreamingTransform::Modwt(s) => s.reset(),
            StreamingTransform::Cwt(s) => s.reset(),
            StreamingTransform::Dft(s) => s.reset(),
        }
    }

    pub fn add_listener(&mut self, obs: Arc<dyn StreamObserver<T>>) {
        match self {
            StreamingTransform::Fwt(s) => s.add_listener(obs),
            StreamingTransform::Wpt(s) => s.add_listener(obs),
            StreamingTransform::Modwt(s) => s.add_listener(obs),
            StreamingTransform::Cwt(s) => s.add_listener(obs),
            StreamingTransform::Dft(s) => s.add_listener(obs),
        }
    }

    pub fn listener_count(&self) -> usize {
        match self {
            StreamingTransform::Fwt(s) => s.listener_count(),
            StreamingTransform::Wpt(s) => s.listener_count(),
            StreamingTransform::Modwt(s) => s.listener_count(),
            StreamingTransform::Cwt(s) => s.listener_count(),
            StreamingTransform::Dft(s) => s.listener_count(),
        }
    }
}

pub fn create_fwt<T: StreamFloat>(
    wavelet: Arc<dyn DiscreteWavelet<T>>,
    config: StreamingConfig,
) -> Result<StreamingTransform<T>, StreamError> {
    Ok(StreamingTransform::Fwt(FwtStream::new(wavelet, config)?))
}

pub fn create_wpt<T: StreamFloat>(
    wavelet: Arc<dyn DiscreteWavelet<T>>,
    config: StreamingConfig,
) -> Result<StreamingTransform<T>, StreamError> {
    Ok(StreamingTransform::Wpt(WptStream::new(wavelet, config)?))
}

pub fn create_modwt<T: StreamFloat>(
    wavelet: Arc<dyn DiscreteWavelet<T>>,
    config: StreamingConfig,
) -> Result<StreamingTransform<T>, StreamError> {
    Ok(StreamingTransform::Modwt(ModwtStream::new(wavelet, config)?))
}

#[allow(clippy::too_many_arguments)]
pub fn create_cwt<T: StreamFloat>(
    wavelet: Arc<dyn ContinuousWavelet<T>>,
    config: StreamingConfig,
    scales: Vec<T>,
    sampling_rate: T,
    backend: ArithmeticBackend,
) -> Result<StreamingTransform<T>, StreamError> {
    Ok(StreamingTransform::Cwt(CwtStream::new(
        wavelet,
        config,
        scales,
        sampling_rate,
        backend,
    )?))
}

pub fn create_dft<T: StreamFloat>(
    config: StreamingConfig,
    sampling_rate: T,
    use_hann: bool,
) -> Result<StreamingTransform<T>, StreamError> {
    Ok(StreamingTransform::Dft(DftStream::new(
        config,
        sampling_rate,
        use_hann,
    )?))
}

/// Builds the `Fft` kind: the same [`DftStream`] engine, with the
/// power-of-two buffer requirement enforced up front and the real-FFT
/// half-spectrum accessor shape (spec.md §4.6) selected.
pub fn create_fft<T: StreamFloat>(
    config: StreamingConfig,
    sampling_rate: T,
    use_hann: bool,
) -> Result<StreamingTransform<T>, StreamError> {
    config.require_power_of_two_buffer()?;
    Ok(StreamingTransform::Dft(DftStream::new_with_output_shape(
        config,
        sampling_rate,
        use_hann,
        true,
    )?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wavelets::HaarWavelet;

    #[test]
    fn recommended_buffer_size_grows_with_level_and_is_pow2() {
        let small = recommended_buffer_size(TransformKind::Fwt, 2).unwrap();
        let large = recommended_buffer_size(TransformKind::Fwt, 6).unwrap();
        assert!(large > small);
        assert_eq!(small & (small - 1), 0);
        assert_eq!(large & (large - 1), 0);
    }

    #[test]
    fn recommended_buffer_size_clamps_extreme_levels() {
        let size = recommended_buffer_size(TransformKind::Dft, i32::MAX - 1).unwrap();
        assert_eq!(size, 1usize << 30);
    }

    #[test]
    fn recommended_buffer_size_rejects_levels_below_auto() {
        assert!(recommended_buffer_size(TransformKind::Fwt, -2).is_err());
    }

    #[test]
    fn wavelet_presence_validation_matches_kind() {
        assert!(validate_wavelet_presence(TransformKind::Fwt, true, false).is_ok());
        assert!(validate_wavelet_presence(TransformKind::Fwt, false, false).is_err());
        assert!(validate_wavelet_presence(TransformKind::Fwt, true, true).is_err());
        assert!(validate_wavelet_presence(TransformKind::Cwt, false, true).is_ok());
        assert!(validate_wavelet_presence(TransformKind::Dft, false, false).is_ok());
        assert!(validate_wavelet_presence(TransformKind::Dft, true, false).is_err());
    }

    #[test]
    fn factory_built_fwt_dispatches_through_enum() {
        let cfg = StreamingConfig::builder(32).max_level(2).build().unwrap();
        let mut t = create_fwt(Arc::new(HaarWavelet::<f64>::default()), cfg).unwrap();
        assert_eq!(t.listener_count(), 0);
        t.update(&[1.0; 32]).unwrap();
        t.reset();
    }

    #[test]
    fn fft_kind_rejects_non_power_of_two_buffer() {
        let cfg = StreamingConfig::builder(100).build().unwrap();
        assert!(create_fft::<f64>(cfg, 1.0, false).is_err());
    }
}
