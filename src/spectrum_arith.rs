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
//! Element-wise complex bulk operations (spec.md §4.8) with two
//! back-ends: a straightforward array-of-`Complex<T>` implementation, and
//! a split real/imaginary-array implementation backed by a per-thread
//! scratch arena (spec.md §3, "complex-operation scratch arenas"). The
//! teacher crate picks between hand-vectorized AVX/SSE/NEON kernels behind
//! the same trait shape (`spetrum_arith.rs`); this crate keeps the trait
//! and the split-buffer strategy but does not carry the architecture
//! intrinsics forward (see DESIGN.md).
use crate::numeric::StreamFloat;
use num_complex::Complex;
use std::cell::RefCell;

/// Selects which [`SpectrumArithmetic`] implementation a caller wants.
/// Default is `SplitBuffer`, matching the ambient default described in
/// spec.md §6 ("one optional switch selects the complex-ops back-end...
/// default is split-buffer").
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum ArithmeticBackend {
    Standard,
    #[default]
    SplitBuffer,
}

impl ArithmeticBackend {
    pub fn build<T: StreamFloat>(self) -> Box<dyn SpectrumArithmetic<T>> {
        match self {
            ArithmeticBackend::Standard => Box::new(StandardArithmetic),
            ArithmeticBackend::SplitBuffer => Box::new(SplitBufferArithmetic),
        }
    }
}

pub trait SpectrumArithmetic<T>: Send + Sync {
    fn add(&self, dst: &mut [Complex<T>], a: &[Complex<T>], b: &[Complex<T>]);
    fn sub(&self, dst: &mut [Complex<T>], a: &[Complex<T>], b: &[Complex<T>]);
    fn mul(&self, dst: &mut [Complex<T>], a: &[Complex<T>], b: &[Complex<T>]);
    fn scalar_mul(&self, dst: &mut [Complex<T>], a: &[Complex<T>], scalar: T);
    fn conjugate(&self, dst: &mut [Complex<T>], a: &[Complex<T>]);
    fn magnitude(&self, dst: &mut [T], a: &[Complex<T>]);
    /// `dst += a * b`, element-wise.
    fn mul_accumulate(&self, dst: &mut [Complex<T>], a: &[Complex<T>], b: &[Complex<T>]);
}

/// Plain array-of-struct `Complex<T>` arithmetic; no scratch arena.
#[derive(Debug, Default)]
pub(crate) struct StandardArithmetic;

impl<T: StreamFloat> SpectrumArithmetic<T> for StandardArithmetic {
    fn add(&self, dst: &mut [Complex<T>], a: &[Complex<T>], b: &[Complex<T>]) {
        for ((d, &x), &y) in dst.iter_mut().zip(a.iter()).zip(b.iter()) {
            *d = x + y;
        }
    }

    fn sub(&self, dst: &mut [Complex<T>], a: &[Complex<T>], b: &[Complex<T>]) {
        for ((d, &x), &y) in dst.iter_mut().zip(a.iter()).zip(b.iter()) {
            *d = x - y;
        }
    }

    fn mul(&self, dst: &mut [Complex<T>], a: &[Complex<T>], b: &[Complex<T>]) {
        for ((d, &x), &y) in dst.iter_mut().zip(a.iter()).zip(b.iter()) {
            *d = x * y;
        }
    }

    fn scalar_mul(&self, dst: &mut [Complex<T>], a: &[Complex<T>], scalar: T) {
        for (d, &x) in dst.iter_mut().zip(a.iter()) {
            *d = x * scalar;
        }
    }

    fn conjugate(&self, dst: &mut [Complex<T>], a: &[Complex<T>]) {
        for (d, &x) in dst.iter_mut().zip(a.iter()) {
            *d = x.conj();
        }
    }

    fn magnitude(&self, dst: &mut [T], a: &[Complex<T>]) {
        for (d, &x) in dst.iter_mut().zip(a.iter()) {
            *d = (x.re * x.re + x.im * x.im).sqrt();
        }
    }

    fn mul_accumulate(&self, dst: &mut [Complex<T>], a: &[Complex<T>], b: &[Complex<T>]) {
        for ((d, &x), &y) in dst.iter_mut().zip(a.iter()).zip(b.iter()) {
            *d += x * y;
        }
    }
}

const ARENA_CAP: usize = 65_536;
const ARENA_SHRINK_FLOOR: usize = 4_096;

struct SplitArena {
    re: Vec<f64>,
    im: Vec<f64>,
}

impl SplitArena {
    const fn new() -> Self {
        Self {
            re: Vec::new(),
            im: Vec::new(),
        }
    }
}

thread_local! {
    static ARENA: RefCell<SplitArena> = const { RefCell::new(SplitArena::new()) };
}

/// Releases this thread's scratch arena. Long-running pooled threads
/// should call this when finished with split-buffer arithmetic (spec.md
/// §5: "long-running pooled threads must call the arena-clear hook").
pub fn clear_thread_buffers() {
    ARENA.with(|cell| {
        let mut arena = cell.borrow_mut();
        arena.re = Vec::new();
        arena.im = Vec::new();
    });
}

/// Lends out `len`-element `(re, im)` scratch slices, growing the
/// thread-local arena by 1.5x (capped at 65536 elements) on a miss and
/// shrinking it when the request is under a quarter of its current size
/// and the arena is itself larger than 4096 elements. Requests above the
/// cap bypass the arena with a transient per-call allocation.
fn with_scratch<R>(len: usize, f: impl FnOnce(&mut [f64], &mut [f64]) -> R) -> R {
    if len > ARENA_CAP {
        let mut re = vec![0f64; len];
        let mut im = vec![0f64; len];
        return f(&mut re, &mut im);
    }
    ARENA.with(|cell| {
        let mut arena = cell.borrow_mut();
        if arena.re.len() < len {
            let grown = (((arena.re.len() as f64) * 1.5) as usize)
                .max(len)
                .min(ARENA_CAP);
            log::trace!("spectrum arithmetic scratch arena grown to {grown} elements");
            arena.re.resize(grown, 0.0);
            arena.im.resize(grown, 0.0);
        } else if len < arena.re.len() / 4 && arena.re.len() > ARENA_SHRINK_FLOOR {
            arena.re.truncate(len.max(1));
            arena.re.shrink_to_fit();
            arena.im.truncate(len.max(1));
            arena.im.shrink_to_fit();
        }
        f(&mut arena.re[..len], &mut arena.im[..len])
    })
}

/// Split real/imaginary-array arithmetic over a per-thread scratch arena;
/// the representation a auto-vectorizing compiler has the easiest time
/// with (spec.md §3).
#[derive(Debug, Default)]
pub(crate) struct SplitBufferArithmetic;

impl<T: StreamFloat> SpectrumArithmetic<T> for SplitBufferArithmetic {
    fn add(&self, dst: &mut [Complex<T>], a: &[Complex<T>], b: &[Complex<T>]) {
        let n = dst.len();
        with_scratch(n, |re, im| {
            for i in 0..n {
                re[i] = a[i].re.to_f64_lossy() + b[i].re.to_f64_lossy();
                im[i] = a[i].im.to_f64_lossy() + b[i].im.to_f64_lossy();
            }
            for i in 0..n {
                dst[i] = Complex::new(T::from_f64_lossy(re[i]), T::from_f64_lossy(im[i]));
            }
        });
    }

    fn sub(&self, dst: &mut [Complex<T>], a: &[Complex<T>], b: &[Complex<T>]) {
        let n = dst.len();
        with_scratch(n, |re, im| {
            for i in 0..n {
                re[i] = a[i].re.to_f64_lossy() - b[i].re.to_f64_lossy();
                im[i] = a[i].im.to_f64_lossy() - b[i].im.to_f64_lossy();
            }
            for i in 0..n {
                dst[i] = Complex::new(T::from_f64_lossy(re[i]), T::from_f64_lossy(im[i]));
            }
        });
    }

    fn mul(&self, dst: &mut [Complex<T>], a: &[Complex<T>], b: &[Complex<T>]) {
        let n = dst.len();
        with_scratch(n, |re, im| {
            for i in 0..n {
                let (ar, ai) = (a[i].re.to_f64_lossy(), a[i].im.to_f64_lossy());
                let (br, bi) = (b[i].re.to_f64_lossy(), b[i].im.to_f64_lossy());
                re[i] = ar * br - ai * bi;
                im[i] = ar * bi + ai * br;
            }
            for i in 0..n {
                dst[i] = Complex::new(T::from_f64_lossy(re[i]), T::from_f64_lossy(im[i]));
            }
        });
    }

    fn scalar_mul(&self, dst: &mut [Complex<T>], a: &[Complex<T>], scalar: T) {
        let n = dst.len();
        let s = scalar.to_f64_lossy();
        with_scratch(n, |re, im| {
            for i in 0..n {
                re[i] = a[i].re.to_f64_lossy() * s;
                im[i] = a[i].im.to_f64_lossy() * s;
            }
            for i in 0..n {
                dst[i] = Complex::new(T::from_f64_lossy(re[i]), T::from_f64_lossy(im[i]));
            }
        });
    }

    fn conjugate(&self, dst: &mut [Complex<T>], a: &[Complex<T>]) {
        let n = dst.len();
        with_scratch(n, |re, im| {
            for i in 0..n {
                re[i] = a[i].re.to_f64_lossy();
                im[i] = -a[i].im.to_f64_lossy();
            }
            for i in 0..n {
                dst[i] = Complex::new(T::from_f64_lossy(re[i]), T::from_f64_lossy(im[i]));
            }
        });
    }

    fn magnitude(&self, dst: &mut [T], a: &[Complex<T>]) {
        let n = dst.len();
        with_scratch(n, |re, im| {
            for i in 0..n {
                re[i] = a[i].re.to_f64_lossy();
                im[i] = a[i].im.to_f64_lossy();
            }
            for (d, (&r, &m)) in dst.iter_mut().zip(re.iter().zip(im.iter())) {
                *d = T::from_f64_lossy((r * r + m * m).sqrt());
            }
        });
    }

    fn mul_accumulate(&self, dst: &mut [Complex<T>], a: &[Complex<T>], b: &[Complex<T>]) {
        let n = dst.len();
        with_scratch(n, |re, im| {
            for i in 0..n {
                let (ar, ai) = (a[i].re.to_f64_lossy(), a[i].im.to_f64_lossy());
                let (br, bi) = (b[i].re.to_f64_lossy(), b[i].im.to_f64_lossy());
                re[i] = ar * br - ai * bi;
                im[i] = ar * bi + ai * br;
            }
            for i in 0..n {
                dst[i] += Complex::new(T::from_f64_lossy(re[i]), T::from_f64_lossy(im[i]));
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Vec<Complex<f64>>, Vec<Complex<f64>>) {
        let a = vec![Complex::new(1.0, 2.0), Complex::new(-3.0, 0.5)];
        let b = vec![Complex::new(0.5, -1.0), Complex::new(2.0, 2.0)];
        (a, b)
    }

    #[test]
    fn standard_and_split_buffer_agree() {
        let (a, b) = sample();
        let std_backend = StandardArithmetic;
        let split_backend = SplitBufferArithmetic;

        let mut dst_std = vec![Complex::new(0.0, 0.0); a.len()];
        let mut dst_split = dst_std.clone();

        SpectrumArithmetic::<f64>::mul(&std_backend, &mut dst_std, &a, &b);
        SpectrumArithmetic::<f64>::mul(&split_backend, &mut dst_split, &a, &b);
        for (x, y) in dst_std.iter().zip(dst_split.iter()) {
            assert!((x.re - y.re).abs() < 1e-12);
            assert!((x.im - y.im).abs() < 1e-12);
        }
    }

    #[test]
    fn magnitude_matches_hypot() {
        let (a, _) = sample();
        let backend = SplitBufferArithmetic;
        let mut mags = vec![0.0; a.len()];
        backend.magnitude(&mut mags, &a);
        assert!((mags[0] - 5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn arena_clear_resets_thread_local_state() {
        let backend = SplitBufferArithmetic;
        let a = vec![Complex::new(1.0, 1.0); 128];
        let mut dst = a.clone();
        backend.conjugate(&mut dst, &a);
        clear_thread_buffers();
        // Arena must still work correctly after being cleared.
        backend.conjugate(&mut dst, &a);
        assert_eq!(dst[0], Complex::new(1.0, -1.0));
    }
}
