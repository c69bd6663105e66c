//! Feature automation loops.
//!
//! Every feature runs the same loop shape on its own thread:
//!
//! 1. check the cancellation token
//! 2. skip the iteration if the target window is not focused
//! 3. take a settings snapshot and tick the feature
//! 4. sleep for the poll interval (interruptible)
//!
//! Errors and panics inside a tick are logged and the loop carries on. Only
//! [`FeatureRunner::stop`], the shutdown token or a failed
//! [`Feature::initialize`] ends it. A stopped runner can be started again.

mod bunnyhop;
mod cancel;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use strum::{Display, FromRepr};
use tracing::{debug, error, info, warn};

pub use bunnyhop::{Bunnyhop, BunnyhopSettings, FORCE_JUMP_ACTIVE, FORCE_JUMP_INACTIVE};
pub use cancel::CancellationToken;

use crate::config::ConfigHandle;
use crate::error::{Error, Result};
use crate::input::WindowFocus;

/// Timing constants for feature loops
pub mod timing {
    use std::time::Duration;

    /// Sleep between loop iterations
    pub const POLL_INTERVAL: Duration = Duration::from_millis(1);

    /// Consecutive write failures before a warning is logged (about 5s of polling)
    pub const FAILURE_WARN_THRESHOLD: u32 = 5000;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromRepr)]
#[repr(u8)]
pub enum FeatureStatus {
    Stopped = 0,
    Initializing = 1,
    Running = 2,
}

/// A polling feature driven by [`FeatureRunner`]
pub trait Feature: Send {
    type Settings: Send + Sync;

    const NAME: &'static str;

    /// Establish the target address. Failure keeps the feature stopped.
    fn initialize(&mut self) -> Result<()>;

    /// One loop iteration. Memory I/O errors should be handled inside.
    fn tick(&mut self, settings: &Self::Settings, now: Instant) -> Result<()>;

    /// Best-effort cleanup on stop, e.g. clearing an active state.
    fn release(&mut self);
}

/// Local state a feature keeps independently of the target process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureRuntimeState {
    pub action_active: bool,
    pub last_action: Option<Instant>,
    pub consecutive_failures: u32,
}

impl FeatureRuntimeState {
    /// Whether `delay` has passed since the last transition
    pub fn delay_elapsed(&self, now: Instant, delay: Duration) -> bool {
        match self.last_action {
            Some(last) => now.saturating_duration_since(last) >= delay,
            None => true,
        }
    }

    pub fn record_success(&mut self) {
        if self.consecutive_failures >= timing::FAILURE_WARN_THRESHOLD {
            info!(
                "Memory writes recovered after {} failures",
                self.consecutive_failures
            );
        }
        self.consecutive_failures = 0;
    }

    /// Returns `true` exactly when the failure streak reaches the warn threshold
    pub fn record_failure(&mut self) -> bool {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_failures == timing::FAILURE_WARN_THRESHOLD
    }
}

/// Owns one feature and drives its loop.
///
/// `shutdown` ends every run for good. Each [`start`](Self::start) gets its
/// own run token, which [`stop`](Self::stop) cancels.
pub struct FeatureRunner<F: Feature, W> {
    feature: Mutex<F>,
    settings: ConfigHandle<F::Settings>,
    focus: W,
    shutdown: CancellationToken,
    run: ArcSwap<CancellationToken>,
    status: AtomicU8,
    poll_interval: Duration,
}

impl<F: Feature, W: WindowFocus> FeatureRunner<F, W> {
    pub fn new(feature: F, settings: F::Settings, focus: W, shutdown: CancellationToken) -> Self {
        Self {
            feature: Mutex::new(feature),
            settings: ConfigHandle::new(settings),
            focus,
            shutdown,
            run: ArcSwap::from_pointee(CancellationToken::new()),
            status: AtomicU8::new(FeatureStatus::Stopped as u8),
            poll_interval: timing::POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn status(&self) -> FeatureStatus {
        FeatureStatus::from_repr(self.status.load(Ordering::SeqCst))
            .unwrap_or(FeatureStatus::Stopped)
    }

    pub fn is_running(&self) -> bool {
        self.status() == FeatureStatus::Running
    }

    pub fn is_stop_requested(&self) -> bool {
        self.shutdown.is_cancelled() || self.run.load().is_cancelled()
    }

    /// Replace the settings; the loop picks them up on its next iteration.
    pub fn update_config(&self, settings: F::Settings) {
        self.settings.store(settings);
        debug!("{} configuration updated.", F::NAME);
    }

    pub fn settings(&self) -> Arc<F::Settings> {
        self.settings.load_full()
    }

    /// Run the loop on the calling thread until stopped.
    pub fn start(&self) -> Result<()> {
        if self
            .status
            .compare_exchange(
                FeatureStatus::Stopped as u8,
                FeatureStatus::Initializing as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            warn!("{} is already running", F::NAME);
            return Err(Error::NotStartable(format!("{} already running", F::NAME)));
        }

        let run = CancellationToken::new();
        let initialized = {
            let mut feature = self.lock_feature();
            self.run.store(Arc::new(run.clone()));
            match panic::catch_unwind(AssertUnwindSafe(|| feature.initialize())) {
                Ok(result) => result,
                Err(payload) => Err(Error::NotStartable(format!(
                    "{} initialization panicked: {}",
                    F::NAME,
                    panic_message(payload.as_ref())
                ))),
            }
        };
        if let Err(e) = initialized {
            error!(feature = F::NAME, "Failed to initialize {}: {}", F::NAME, e);
            self.set_status(FeatureStatus::Stopped);
            return Err(e);
        }

        self.set_status(FeatureStatus::Running);
        info!(feature = F::NAME, "{} started", F::NAME);

        self.run_loop(&run);

        // Covers a shutdown that bypassed stop(); a no-op once released
        self.lock_feature().release();
        self.set_status(FeatureStatus::Stopped);
        debug!(feature = F::NAME, "{} loop exited", F::NAME);
        Ok(())
    }

    /// End the current run and release any active state immediately.
    pub fn stop(&self) {
        let mut feature = self.lock_feature();
        self.run.load().cancel();
        feature.release();
        debug!(feature = F::NAME, "{} stopped.", F::NAME);
    }

    fn is_cancelled(&self, run: &CancellationToken) -> bool {
        run.is_cancelled() || self.shutdown.is_cancelled()
    }

    fn run_loop(&self, run: &CancellationToken) {
        while !self.is_cancelled(run) {
            if !self.focus.is_target_window_active() {
                run.wait(self.poll_interval);
                continue;
            }

            let settings = self.settings.load_full();
            let now = Instant::now();
            {
                let mut feature = self.lock_feature();
                // stop() may have released state while we waited for the lock
                if self.is_cancelled(run) {
                    break;
                }
                match panic::catch_unwind(AssertUnwindSafe(|| feature.tick(&settings, now))) {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) if e.is_transient() => warn!("{} tick failed: {}", F::NAME, e),
                    Ok(Err(e)) => error!("Unexpected error in {} loop: {}", F::NAME, e),
                    Err(payload) => error!(
                        "{} loop iteration panicked: {}",
                        F::NAME,
                        panic_message(payload.as_ref())
                    ),
                }
            }

            run.wait(self.poll_interval);
        }
    }

    fn lock_feature(&self) -> MutexGuard<'_, F> {
        // Panics in initialize and tick are caught before the guard drops, so
        // poisoning only happens on a panic in release; keep going either way.
        self.feature
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_status(&self, status: FeatureStatus) {
        self.status.store(status as u8, Ordering::SeqCst);
    }
}

impl<F, W> FeatureRunner<F, W>
where
    F: Feature + 'static,
    W: WindowFocus + 'static,
{
    /// Run [`start`](Self::start) on a dedicated, named thread.
    pub fn spawn(self: &Arc<Self>) -> Result<JoinHandle<Result<()>>> {
        let runner = Arc::clone(self);
        let handle = thread::Builder::new()
            .name(format!("{}-loop", F::NAME.to_lowercase()))
            .spawn(move || runner.start())?;
        Ok(handle)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::FixedFocus;
    use crate::input::mock::MockFocus;
    use std::sync::atomic::AtomicU32;

    /// Counts ticks; panics on the second one and errors on the third
    struct FlakyFeature {
        ticks: Arc<AtomicU32>,
        fail_init: bool,
    }

    impl Feature for FlakyFeature {
        type Settings = ();
        const NAME: &'static str = "Flaky";

        fn initialize(&mut self) -> Result<()> {
            if self.fail_init {
                return Err(Error::NotStartable("no target".to_string()));
            }
            Ok(())
        }

        fn tick(&mut self, _settings: &(), _now: Instant) -> Result<()> {
            match self.ticks.fetch_add(1, Ordering::SeqCst) {
                1 => panic!("bad iteration"),
                2 => Err(Error::InvalidConfig("bad settings".to_string())),
                _ => Ok(()),
            }
        }

        fn release(&mut self) {}
    }

    /// Panics on its first initialize, succeeds afterwards
    struct PanickyInit {
        attempts: u32,
    }

    impl Feature for PanickyInit {
        type Settings = ();
        const NAME: &'static str = "PanickyInit";

        fn initialize(&mut self) -> Result<()> {
            self.attempts += 1;
            if self.attempts == 1 {
                panic!("attempt to add with overflow");
            }
            Ok(())
        }

        fn tick(&mut self, _settings: &(), _now: Instant) -> Result<()> {
            Ok(())
        }

        fn release(&mut self) {}
    }

    fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(1));
        }
        false
    }

    #[test]
    fn test_runtime_state_delay() {
        let start = Instant::now();
        let mut state = FeatureRuntimeState::default();
        assert!(state.delay_elapsed(start, Duration::from_secs(1)));

        state.last_action = Some(start);
        assert!(!state.delay_elapsed(start + Duration::from_millis(999), Duration::from_secs(1)));
        assert!(state.delay_elapsed(start + Duration::from_secs(1), Duration::from_secs(1)));
    }

    #[test]
    fn test_failure_threshold_fires_once() {
        let mut state = FeatureRuntimeState::default();
        let fired = (0..timing::FAILURE_WARN_THRESHOLD * 2)
            .filter(|_| state.record_failure())
            .count();
        assert_eq!(fired, 1);

        state.record_success();
        assert_eq!(state.consecutive_failures, 0);
    }

    #[test]
    fn test_loop_survives_panics_and_errors() {
        let ticks = Arc::new(AtomicU32::new(0));
        let feature = FlakyFeature {
            ticks: Arc::clone(&ticks),
            fail_init: false,
        };
        let runner = Arc::new(FeatureRunner::new(
            feature,
            (),
            FixedFocus(true),
            CancellationToken::new(),
        ));

        let handle = runner.spawn().unwrap();
        assert!(wait_until(|| ticks.load(Ordering::SeqCst) >= 5));
        assert!(runner.is_running());

        runner.stop();
        handle.join().unwrap().unwrap();
        assert_eq!(runner.status(), FeatureStatus::Stopped);
    }

    #[test]
    fn test_failed_initialize_stays_stopped() {
        let ticks = Arc::new(AtomicU32::new(0));
        let feature = FlakyFeature {
            ticks: Arc::clone(&ticks),
            fail_init: true,
        };
        let runner = FeatureRunner::new(feature, (), FixedFocus(true), CancellationToken::new());

        assert!(runner.start().is_err());
        assert_eq!(runner.status(), FeatureStatus::Stopped);
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_precancelled_token_exits_without_ticking() {
        let ticks = Arc::new(AtomicU32::new(0));
        let feature = FlakyFeature {
            ticks: Arc::clone(&ticks),
            fail_init: false,
        };
        let runner = FeatureRunner::new(feature, (), FixedFocus(true), CancellationToken::cancelled());

        runner.start().unwrap();
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
        assert_eq!(runner.status(), FeatureStatus::Stopped);
        assert!(runner.is_stop_requested());
    }

    #[test]
    fn test_unfocused_window_skips_ticks() {
        let ticks = Arc::new(AtomicU32::new(0));
        let focus = Arc::new(MockFocus::new(false));
        let feature = FlakyFeature {
            ticks: Arc::clone(&ticks),
            fail_init: false,
        };
        let runner = Arc::new(FeatureRunner::new(
            feature,
            (),
            Arc::clone(&focus),
            CancellationToken::new(),
        ));

        let handle = runner.spawn().unwrap();
        assert!(wait_until(|| runner.is_running()));
        thread::sleep(Duration::from_millis(20));
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        focus.set(true);
        assert!(wait_until(|| ticks.load(Ordering::SeqCst) > 0));

        runner.stop();
        handle.join().unwrap().unwrap();
    }

    #[test]
    fn test_second_start_rejected_while_running() {
        let ticks = Arc::new(AtomicU32::new(0));
        let feature = FlakyFeature {
            ticks: Arc::clone(&ticks),
            fail_init: false,
        };
        let runner = Arc::new(FeatureRunner::new(
            feature,
            (),
            FixedFocus(true),
            CancellationToken::new(),
        ));

        let handle = runner.spawn().unwrap();
        assert!(wait_until(|| runner.is_running()));
        assert!(matches!(runner.start(), Err(Error::NotStartable(_))));

        runner.stop();
        handle.join().unwrap().unwrap();
    }

    #[test]
    fn test_panicking_initialize_returns_to_stopped() {
        let runner = Arc::new(FeatureRunner::new(
            PanickyInit { attempts: 0 },
            (),
            FixedFocus(true),
            CancellationToken::new(),
        ));

        assert!(matches!(runner.start(), Err(Error::NotStartable(_))));
        assert_eq!(runner.status(), FeatureStatus::Stopped);

        // The failed attempt must not leave the runner looking busy
        let handle = runner.spawn().unwrap();
        assert!(wait_until(|| runner.is_running()));
        runner.stop();
        handle.join().unwrap().unwrap();
        assert_eq!(runner.status(), FeatureStatus::Stopped);
    }

    #[test]
    fn test_restart_after_stop_ticks_again() {
        let ticks = Arc::new(AtomicU32::new(0));
        let feature = FlakyFeature {
            ticks: Arc::clone(&ticks),
            fail_init: false,
        };
        let runner = Arc::new(FeatureRunner::new(
            feature,
            (),
            FixedFocus(true),
            CancellationToken::new(),
        ));

        let handle = runner.spawn().unwrap();
        assert!(wait_until(|| ticks.load(Ordering::SeqCst) >= 5));
        runner.stop();
        handle.join().unwrap().unwrap();
        let before = ticks.load(Ordering::SeqCst);

        let handle = runner.spawn().unwrap();
        assert!(wait_until(|| ticks.load(Ordering::SeqCst) > before));
        assert!(runner.is_running());
        assert!(!runner.is_stop_requested());

        runner.stop();
        handle.join().unwrap().unwrap();
        assert_eq!(runner.status(), FeatureStatus::Stopped);
    }

    #[test]
    fn test_cancelled_shutdown_token_ends_run() {
        let shutdown = CancellationToken::new();
        let runner = FeatureRunner::new(
            PanickyInit { attempts: 1 },
            (),
            FixedFocus(true),
            shutdown.clone(),
        );

        shutdown.cancel();
        runner.start().unwrap();
        assert_eq!(runner.status(), FeatureStatus::Stopped);
        assert!(runner.is_stop_requested());
    }
}
