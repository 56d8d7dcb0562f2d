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
use num_complex::Complex;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// A defensive-copy view of whatever a transform's cache currently holds,
/// handed to observers on every notification. Variants mirror the cache
/// shapes in spec.md §3 (flat vector / matrix-of-levels / complex vector /
/// complex matrix).
#[derive(Debug, Clone)]
pub enum CoefficientSnapshot<T> {
    Flat(Vec<T>),
    Levels(Vec<Vec<T>>),
    Complex(Vec<Complex<T>>),
    ComplexMatrix(Vec<Vec<Complex<T>>>),
}

/// Callback surface a streaming transform dispatches to. Default no-op
/// bodies let an observer implement only what it cares about.
pub trait StreamObserver<T>: Send + Sync {
    fn on_coefficients_updated(&self, _snapshot: &CoefficientSnapshot<T>, _new_sample_count: usize) {
    }
    fn on_buffer_full(&self) {}
    fn on_reset(&self) {}
    fn on_error(&self, _error: &StreamError, _recoverable: bool) {}
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "observer panicked with a non-string payload".to_string()
    }
}

/// Snapshot-then-iterate dispatcher: observers are notified in
/// registration order over a cloned `Vec`, so an observer calling
/// `remove_listener` on itself mid-dispatch is legal (spec.md §4.2, §5).
pub(crate) struct ObserverList<T> {
    observers: Vec<Arc<dyn StreamObserver<T>>>,
}

impl<T> Default for ObserverList<T> {
    fn default() -> Self {
        Self {
            observers: Vec::new(),
        }
    }
}

impl<T> ObserverList<T> {
    pub(crate) fn add(&mut self, obs: Arc<dyn StreamObserver<T>>) {
        self.observers.push(obs);
    }

    pub(crate) fn remove(&mut self, obs: &Arc<dyn StreamObserver<T>>) {
        self.observers.retain(|o| !Arc::ptr_eq(o, obs));
    }

    pub(crate) fn clear(&mut self) {
        self.observers.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    fn snapshot(&self) -> Vec<Arc<dyn StreamObserver<T>>> {
        self.observers.clone()
    }

    pub(crate) fn notify_update(&self, snapshot: &CoefficientSnapshot<T>, new_sample_count: usize) {
        for obs in self.snapshot() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                obs.on_coefficients_updated(snapshot, new_sample_count);
            }));
            if let Err(payload) = result {
                let msg = panic_message(payload.as_ref());
                let _ = panic::catch_unwind(AssertUnwindSafe(|| {
                    obs.on_error(&StreamError::illegal_state(msg), true);
                }));
            }
        }
    }

    pub(crate) fn notify_buffer_full(&self) {
        for obs in self.snapshot() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| obs.on_buffer_full()));
            if let Err(payload) = result {
                let msg = panic_message(payload.as_ref());
                let _ = panic::catch_unwind(AssertUnwindSafe(|| {
                    obs.on_error(&StreamError::illegal_state(msg), true);
                }));
            }
        }
    }

    pub(crate) fn notify_reset(&self) {
        for obs in self.snapshot() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| obs.on_reset()));
            if let Err(payload) = result {
                let msg = panic_message(payload.as_ref());
                let _ = panic::catch_unwind(AssertUnwindSafe(|| {
                    obs.on_error(&StreamError::illegal_state(msg), true);
                }));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingObserver {
        updates: AtomicUsize,
        buffer_fulls: AtomicUsize,
        resets: AtomicUsize,
    }

    impl StreamObserver<f64> for CountingObserver {
        fn on_coefficients_updated(&self, _s: &CoefficientSnapshot<f64>, _n: usize) {
            self.updates.fetch_add(1, Ordering::SeqCst);
        }
        fn on_buffer_full(&self) {
            self.buffer_fulls.fetch_add(1, Ordering::SeqCst);
        }
        fn on_reset(&self) {
            self.resets.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn dispatch_order_and_counts() {
        let mut list = ObserverList::<f64>::default();
        let obs = Arc::new(CountingObserver {
            updates: AtomicUsize::new(0),
            buffer_fulls: AtomicUsize::new(0),
            resets: AtomicUsize::new(0),
        });
        list.add(obs.clone());
        for _ in 0..5 {
            list.notify_update(&CoefficientSnapshot::Flat(vec![1.0]), 1);
        }
        list.notify_buffer_full();
        list.notify_reset();
        assert_eq!(obs.updates.load(Ordering::SeqCst), 5);
        assert_eq!(obs.buffer_fulls.load(Ordering::SeqCst), 1);
        assert_eq!(obs.resets.load(Ordering::SeqCst), 1);
    }

    struct SelfRemoving {
        removed: std::sync::Mutex<bool>,
    }

    impl StreamObserver<f64> for SelfRemoving {
        fn on_reset(&self) {
            *self.removed.lock().unwrap() = true;
        }
    }

    #[test]
    fn self_removal_during_dispatch_is_safe() {
        let mut list = ObserverList::<f64>::default();
        let obs = Arc::new(SelfRemoving {
            removed: std::sync::Mutex::new(false),
        });
        list.add(obs.clone());
        // Simulate self-removal happening from within a callback by
        // removing directly after taking the dispatch snapshot; the
        // dispatcher must not panic or skip remaining observers.
        list.notify_reset();
        list.remove(&(obs.clone() as Arc<dyn StreamObserver<f64>>));
        assert_eq!(list.len(), 0);
        assert!(*obs.removed.lock().unwrap());
    }

    struct PanickingObserver;
    impl StreamObserver<f64> for PanickingObserver {
        fn on_coefficients_updated(&self, _s: &CoefficientSnapshot<f64>, _n: usize) {
            panic!("boom");
        }
    }

    struct TrailingObserver {
        hit: AtomicUsize,
    }
    impl StreamObserver<f64> for TrailingObserver {
        fn on_coefficients_updated(&self, _s: &CoefficientSnapshot<f64>, _n: usize) {
            self.hit.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn panicking_observer_does_not_stop_remaining_observers() {
        let mut list = ObserverList::<f64>::default();
        list.add(Arc::new(PanickingObserver));
        let trailing = Arc::new(TrailingObserver {
            hit: AtomicUsize::new(0),
        });
        list.add(trailing.clone());
        let prev_hook = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        list.notify_update(&CoefficientSnapshot::Flat(vec![1.0]), 1);
        panic::set_hook(prev_hook);
        assert_eq!(trailing.hit.load(Ordering::SeqCst), 1);
    }
}
