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
//! Streaming multiresolution signal analysis over a live sample window.
//!
//! A [`config::StreamingConfig`] fixes a circular window's capacity and the
//! [`config::UpdateStrategy`] (`Full`/`Incremental`/`Lazy`) driving how
//! expensive each `update()` call is willing to be; every transform below
//! embeds a [`core::StreamingCore`] built from one, and keeps its own
//! coefficient cache coherent against it via a dirty/computed-at counter
//! pair. Five transform families are provided:
//!
//! - [`modwt::ModwtStream`] — Maximal-Overlap DWT, the one family with a
//!   true O(window) incremental step (ring-indexed coefficient storage).
//! - [`fwt::FwtStream`] — Fast (pyramid) DWT, full recompute only.
//! - [`wpt::WptStream`] — Wavelet Packet Transform, full recompute only.
//! - [`cwt::CwtStream`] — Continuous Wavelet Transform, direct convolution
//!   or FFT-accelerated circular convolution depending on window size.
//! - [`dft::DftStream`] — sliding DFT (O(window) incremental recurrence)
//!   and the power-of-two FFT variant, with optional Hann windowing.
//!
//! [`factory`] ties all five behind one [`factory::TransformKind`]-tagged
//! entry point for callers that only know the desired kind at runtime.
//! [`observer`] carries coefficient-update/buffer-full/reset/error
//! notifications out to registered listeners.

pub mod config;
pub mod core;
pub mod cwt;
pub mod dft;
mod dwt_kernel;
pub mod err;
pub mod factory;
pub mod fwt;
pub mod modwt;
pub mod numeric;
pub mod observer;
pub mod spectrum_arith;
pub mod wavelets;
pub mod window;
pub mod wpt;

pub use config::{StreamingConfig, StreamingConfigBuilder, UpdateStrategy};
pub use core::StreamingCore;
pub use cwt::CwtStream;
pub use dft::DftStream;
pub use err::{OptimizedImplKind, StreamError};
pub use factory::{StreamingTransform, TransformKind};
pub use fwt::FwtStream;
pub use modwt::ModwtStream;
pub use numeric::StreamFloat;
pub use observer::{CoefficientSnapshot, StreamObserver};
pub use spectrum_arith::{ArithmeticBackend, SpectrumArithmetic};
pub use wavelets::{
    ContinuousWavelet, Daubechies4Wavelet, DiscreteWavelet, HaarWavelet, MexicanHatWavelet,
    MorletWavelet,
};
pub use window::CircularWindow;
pub use wpt::WptStream;
