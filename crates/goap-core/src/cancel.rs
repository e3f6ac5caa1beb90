use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared flag a caller flips to stop a running search from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Cooperative stop conditions polled once per node expansion.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Option<CancelFlag>,
    deadline: Option<Instant>,
}

impl Cancellation {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn flag(flag: CancelFlag) -> Self {
        Self {
            flag: Some(flag),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn should_stop(&self) -> bool {
        if self.flag.as_ref().is_some_and(CancelFlag::is_cancelled) {
            return true;
        }
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_never_stops() {
        assert!(!Cancellation::none().should_stop());
    }

    #[test]
    fn flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let cancel = Cancellation::flag(flag.clone());
        assert!(!cancel.should_stop());
        flag.cancel();
        assert!(cancel.should_stop());
    }

    #[test]
    fn past_deadline_stops() {
        let cancel = Cancellation::none().with_deadline(Instant::now());
        assert!(cancel.should_stop());
    }
}
