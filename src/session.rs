//! Per-run session state: progress, cancellation, and the run state machine.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{Error, Result};

/// Cooperative cancellation token.
///
/// Workers check it at entry boundaries only; an in-flight single-file copy
/// is never preempted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Thread-safe progress handle: workers write, the interactive loop polls.
#[derive(Debug, Default)]
pub struct Progress {
    /// Overall progress in hundredths of a percent (0..=10_000).
    basis: AtomicU32,
    label: Mutex<String>,
}

impl Progress {
    pub fn set_fraction(&self, fraction: f64) {
        let clamped = fraction.clamp(0.0, 1.0);
        self.basis
            .store((clamped * 10_000.0) as u32, Ordering::SeqCst);
    }

    pub fn fraction(&self) -> f64 {
        f64::from(self.basis.load(Ordering::SeqCst)) / 10_000.0
    }

    /// Whole percentage points, for rendering.
    pub fn percent(&self) -> u32 {
        self.basis.load(Ordering::SeqCst) / 100
    }

    pub fn set_label(&self, label: impl Into<String>) {
        let mut guard = self.label.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = label.into();
    }

    pub fn label(&self) -> String {
        self.label
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Maps one phase's local 0..1 range onto a sub-range of overall progress
/// (packaging occupies roughly the first 40%, embedding the remainder).
pub struct Phase<'a> {
    progress: &'a Progress,
    lo: f64,
    hi: f64,
}

impl<'a> Phase<'a> {
    pub fn new(progress: &'a Progress, lo: f64, hi: f64) -> Self {
        Self { progress, lo, hi }
    }

    pub fn update(&self, fraction: f64) {
        let fraction = fraction.clamp(0.0, 1.0);
        self.progress
            .set_fraction(self.lo + (self.hi - self.lo) * fraction);
    }

    /// Creep toward the top of the range. For streamed work with no
    /// deterministic total, such as compiler log lines.
    pub fn nudge(&self, step: f64) {
        let current = self.progress.fraction();
        if current < self.hi {
            self.progress.set_fraction((current + step).min(self.hi));
        }
    }

    pub fn set_label(&self, label: impl Into<String>) {
        self.progress.set_label(label);
    }
}

/// Session lifecycle. Terminal states are final: no retry, no resume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Pending,
    Running,
    Completed,
    Cancelled,
    Failed(String),
}

/// One extraction run: state machine plus progress and cancellation handles.
#[derive(Debug)]
pub struct Session {
    state: Mutex<SessionState>,
    pub progress: Progress,
    cancel: CancelToken,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            state: Mutex::new(SessionState::Pending),
            progress: Progress::default(),
            cancel: CancelToken::new(),
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    fn set_state(&self, state: SessionState) {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *guard = state;
    }

    /// Drive the state machine around `job`: `Pending → Running`, then one of
    /// `Completed`, `Cancelled` (on `Error::Cancelled`), or `Failed` with the
    /// error message attached.
    pub fn run<T>(&self, job: impl FnOnce(&Session) -> Result<T>) -> Result<T> {
        self.set_state(SessionState::Running);
        let outcome = job(self);
        match &outcome {
            Ok(_) => self.set_state(SessionState::Completed),
            Err(Error::Cancelled) => self.set_state(SessionState::Cancelled),
            Err(e) => self.set_state(SessionState::Failed(e.to_string())),
        }
        outcome
    }
}
