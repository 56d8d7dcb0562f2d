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
use crate::config::{StreamingConfig, UpdateStrategy};
use crate::err::StreamError;
use crate::numeric::StreamFloat;
use crate::observer::{CoefficientSnapshot, ObserverList, StreamObserver};
use crate::window::CircularWindow;
use std::sync::Arc;

/// Reusable pieces every streaming-transform kind is built from: the
/// window, the strategy gate, the dirty/computed-at cache-versioning
/// counters, and the observer dispatcher (spec.md §9, "base's reusable
/// pieces"). Each transform embeds one of these and drives it from its own
/// `update`/`current_coefficients`/`reset`.
pub struct StreamingCore<T> {
    window: CircularWindow<T>,
    config: StreamingConfig,
    observers: ObserverList<T>,
    dirty: u64,
    computed_at: u64,
    buffer_full_fired: bool,
}

impl<T: StreamFloat> StreamingCore<T> {
    pub fn new(config: StreamingConfig) -> Result<Self, StreamError> {
        let window = CircularWindow::new(config.buffer_size())?;
        Ok(Self {
            window,
            config,
            observers: ObserverList::default(),
            dirty: 0,
            computed_at: 0,
            buffer_full_fired: false,
        })
    }

    #[inline]
    pub fn window(&self) -> &CircularWindow<T> {
        &self.window
    }

    #[inline]
    pub fn window_mut(&mut self) -> &mut CircularWindow<T> {
        &mut self.window
    }

    #[inline]
    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }

    #[inline]
    pub fn strategy(&self) -> UpdateStrategy {
        self.config.update_strategy()
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.dirty += 1;
    }

    #[inline]
    pub fn mark_computed(&mut self) {
        self.computed_at = self.dirty;
    }

    #[inline]
    pub fn is_stale(&self) -> bool {
        self.dirty > self.computed_at
    }

    pub fn add_listener(&mut self, obs: Arc<dyn StreamObserver<T>>) {
        self.observers.add(obs);
    }

    pub fn remove_listener(&mut self, obs: &Arc<dyn StreamObserver<T>>) {
        self.observers.remove(obs);
    }

    pub fn clear_listeners(&mut self) {
        self.observers.clear();
    }

    pub fn listener_count(&self) -> usize {
        self.observers.len()
    }

    pub fn notify_update(&self, snapshot: &CoefficientSnapshot<T>, new_sample_count: usize) {
        self.observers.notify_update(snapshot, new_sample_count);
    }

    pub fn notify_reset(&self) {
        self.observers.notify_reset();
    }

    /// Fires `on_buffer_full` exactly once per lifetime, on the window's
    /// first transition to full capacity; `reset()` re-arms it.
    pub fn maybe_notify_buffer_full(&mut self) {
        if !self.buffer_full_fired && self.window.is_full() {
            self.buffer_full_fired = true;
            self.observers.notify_buffer_full();
        }
    }

    /// Clears window and cache-versioning state and fires `on_reset`. The
    /// owning transform is responsible for zeroing its own coefficient
    /// cache before/after calling this.
    pub fn reset(&mut self) {
        self.window.clear();
        self.dirty = 0;
        self.computed_at = 0;
        self.buffer_full_fired = false;
        self.notify_reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StreamingConfig;
    use crate::observer::CoefficientSnapshot;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingObserver {
        buffer_full: AtomicUsize,
    }

    impl StreamObserver<f64> for CountingObserver {
        fn on_buffer_full(&self) {
            self.buffer_full.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn core(capacity: usize) -> StreamingCore<f64> {
        let cfg = StreamingConfig::builder(capacity).build().unwrap();
        StreamingCore::new(cfg).unwrap()
    }

    #[test]
    fn dirty_and_computed_at_track_staleness() {
        let mut c = core(4);
        assert!(!c.is_stale());
        c.mark_dirty();
        assert!(c.is_stale());
        c.mark_computed();
        assert!(!c.is_stale());
        c.mark_dirty();
        c.mark_dirty();
        assert!(c.is_stale());
        c.mark_computed();
        assert!(!c.is_stale());
    }

    #[test]
    fn buffer_full_fires_once_per_lifetime_and_reset_rearms_it() {
        let mut c = core(2);
        let obs = Arc::new(CountingObserver {
            buffer_full: AtomicUsize::new(0),
        });
        c.add_listener(obs.clone());

        c.window_mut().append_one(1.0);
        c.maybe_notify_buffer_full();
        assert_eq!(obs.buffer_full.load(Ordering::SeqCst), 0);

        c.window_mut().append_one(2.0);
        c.maybe_notify_buffer_full();
        assert_eq!(obs.buffer_full.load(Ordering::SeqCst), 1);

        c.window_mut().append_one(3.0);
        c.maybe_notify_buffer_full();
        assert_eq!(obs.buffer_full.load(Ordering::SeqCst), 1, "fires at most once per lifetime");

        c.reset();
        c.window_mut().append_one(1.0);
        c.maybe_notify_buffer_full();
        assert_eq!(obs.buffer_full.load(Ordering::SeqCst), 1);
        c.window_mut().append_one(2.0);
        c.maybe_notify_buffer_full();
        assert_eq!(obs.buffer_full.load(Ordering::SeqCst), 2, "reset re-arms the latch");
    }

    #[test]
    fn reset_clears_window_and_fires_on_reset() {
        struct ResetObserver {
            fired: AtomicUsize,
        }
        impl StreamObserver<f64> for ResetObserver {
            fn on_reset(&self) {
                self.fired.fetch_add(1, Ordering::SeqCst);
            }
        }

        let mut c = core(4);
        let obs = Arc::new(ResetObserver {
            fired: AtomicUsize::new(0),
        });
        c.add_listener(obs.clone());
        c.window_mut().append_many(&[1.0, 2.0, 3.0]).unwrap();
        c.mark_dirty();
        c.mark_computed();

        c.reset();

        assert_eq!(obs.fired.load(Ordering::SeqCst), 1);
        assert_eq!(c.window().size(), 0);
        assert!(!c.is_stale());
    }

    #[test]
    fn listener_add_remove_clear_tracks_count() {
        let mut c = core(4);
        let obs: Arc<dyn StreamObserver<f64>> = Arc::new(CountingObserver {
            buffer_full: AtomicUsize::new(0),
        });
        assert_eq!(c.listener_count(), 0);
        c.add_listener(obs.clone());
        assert_eq!(c.listener_count(), 1);
        c.remove_listener(&obs);
        assert_eq!(c.listener_count(), 0);
        c.add_listener(obs);
        c.clear_listeners();
        assert_eq!(c.listener_count(), 0);
    }

    #[test]
    fn notify_update_reaches_listener_snapshot() {
        struct UpdateObserver {
            count: AtomicUsize,
        }
        impl StreamObserver<f64> for UpdateObserver {
            fn on_coefficients_updated(&self, _snapshot: &CoefficientSnapshot<f64>, new_sample_count: usize) {
                self.count.fetch_add(new_sample_count, Ordering::SeqCst);
            }
        }

        let mut c = core(4);
        let obs = Arc::new(UpdateObserver {
            count: AtomicUsize::new(0),
        });
        c.add_listener(obs.clone());
        let snapshot = CoefficientSnapshot::Flat(vec![0.0; 4]);
        c.notify_update(&snapshot, 3);
        assert_eq!(obs.count.load(Ordering::SeqCst), 3);
    }
}
