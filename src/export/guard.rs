use std::sync::atomic::{AtomicBool, Ordering};

/// Result of an export action that may be rejected while another one runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExportOutcome<T> {
    /// The action ran to completion.
    Done(T),
    /// An earlier invocation of the same action is still running; nothing was started.
    Busy,
}

impl<T> ExportOutcome<T> {
    /// Completed value, if the action ran.
    pub fn done(self) -> Option<T> {
        match self {
            Self::Done(v) => Some(v),
            Self::Busy => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }
}

/// Single-flight flag for one export action.
#[derive(Debug, Default)]
pub struct InFlight {
    busy: AtomicBool,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the flag. Returns `None` if the action is already running.
    pub fn try_begin(&self) -> Option<InFlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightGuard { flag: &self.busy })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the [`InFlight`] flag on drop, including on error paths.
#[derive(Debug)]
pub struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
