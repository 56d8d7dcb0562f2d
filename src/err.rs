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
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Sub-kinds of [`StreamError::OptimizedImplementationUnavailable`].
///
/// There is no runtime reflection in this crate (see DESIGN.md), so these
/// only arise from the handful of compile-time-known unavailable
/// combinations a factory can refuse up front.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum OptimizedImplKind {
    ClassNotFound,
    IncompatibleInterface,
    InstantiationFailed,
    AccessDenied,
    MissingConstructor,
    InitializationFailed,
    Unknown,
}

impl OptimizedImplKind {
    /// True only for the two sub-kinds for which falling back to the
    /// portable implementation is recommended.
    pub fn fallback_recommended(self) -> bool {
        matches!(
            self,
            OptimizedImplKind::ClassNotFound | OptimizedImplKind::IncompatibleInterface
        )
    }
}

/// Errors produced by the streaming core.
///
/// Invalid arguments and illegal states surface synchronously from the
/// offending call; observer-callback failures never reach here (see
/// [`crate::observer`], which converts them into `on_error` deliveries).
#[derive(Debug)]
pub enum StreamError {
    /// Out-of-range size, level, scale, time/packet index; non-power-of-two
    /// where one is required; malformed scale range; null/absent input.
    InvalidArgument(String),
    /// Operation attempted on an uninitialized transform, or `get_last` on
    /// an empty window.
    IllegalState(String),
    /// Index overflow in a window/packet accessor.
    BoundsViolation(String),
    /// A factory request names a transform kind that is deliberately
    /// unimplemented.
    Unsupported(String),
    /// A requested execution back-end could not be produced.
    OptimizedImplementationUnavailable {
        kind: OptimizedImplKind,
        missing: Vec<String>,
    },
    /// Failure to allocate the memory required for an internal buffer.
    Allocation(usize),
    FftError(String),
    /// Wraps an underlying cause: the "optional caused-by link" in the
    /// error taxonomy.
    Caused(Box<StreamError>, String),
}

impl StreamError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        StreamError::InvalidArgument(msg.into())
    }

    pub fn illegal_state(msg: impl Into<String>) -> Self {
        StreamError::IllegalState(msg.into())
    }

    pub fn bounds(msg: impl Into<String>) -> Self {
        StreamError::BoundsViolation(msg.into())
    }

    /// True only for [`OptimizedImplKind::ClassNotFound`] and
    /// [`OptimizedImplKind::IncompatibleInterface`].
    pub fn fallback_recommended(&self) -> bool {
        match self {
            StreamError::OptimizedImplementationUnavailable { kind, .. } => {
                kind.fallback_recommended()
            }
            _ => false,
        }
    }

    pub fn with_cause(self, context: impl Into<String>) -> Self {
        StreamError::Caused(Box::new(self), context.into())
    }
}

impl Display for StreamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamError::InvalidArgument(msg) => {
                f.write_fmt(format_args!("invalid argument: {msg}"))
            }
            StreamError::IllegalState(msg) => f.write_fmt(format_args!("illegal state: {msg}")),
            StreamError::BoundsViolation(msg) => {
                f.write_fmt(format_args!("bounds violation: {msg}"))
            }
            StreamError::Unsupported(msg) => f.write_fmt(format_args!("unsupported: {msg}")),
            StreamError::OptimizedImplementationUnavailable { kind, missing } => f.write_fmt(
                format_args!("optimized implementation unavailable ({kind:?}): {missing:?}"),
            ),
            StreamError::Allocation(size) => {
                f.write_fmt(format_args!("failed to allocate buffer with size {size}"))
            }
            StreamError::FftError(msg) => f.write_str(msg),
            StreamError::Caused(inner, context) => {
                f.write_fmt(format_args!("{context}: caused by {inner}"))
            }
        }
    }
}

impl Error for StreamError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StreamError::Caused(inner, _) => Some(inner.as_ref()),
            _ => None,
        }
    }
}

macro_rules! try_vec {
    () => {
        Vec::new()
    };
    ($elem:expr; $n:expr) => {{
        let mut v = Vec::new();
        v.try_reserve_exact($n)
            .map_err(|_| crate::err::StreamError::Allocation($n))?;
        v.resize($n, $elem);
        v
    }};
}

pub(crate) use try_vec;
