use std::time::Duration;

use tokio::time::Instant;

/// The caller's deadline for a single request.
///
/// Threaded from the request handler through every repository call and
/// combined with the per-call timeout, whichever is sooner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No caller deadline; only the per-call timeout applies.
    pub fn none() -> Self {
        Self(None)
    }

    pub fn after(timeout: Duration) -> Self {
        Self(Some(Instant::now() + timeout))
    }

    /// Time left before the deadline, `None` when unbounded.
    pub fn remaining(&self) -> Option<Duration> {
        self.0
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|left| left.is_zero())
    }

    /// Effective budget for one backend call.
    pub fn budget(&self, per_call: Duration) -> Duration {
        match self.remaining() {
            Some(left) => left.min(per_call),
            None => per_call,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_uses_per_call_timeout() {
        let deadline = Deadline::none();
        assert_eq!(deadline.budget(Duration::from_secs(5)), Duration::from_secs(5));
        assert!(!deadline.is_expired());
    }

    #[tokio::test(start_paused = true)]
    async fn test_caller_deadline_shrinks_budget() {
        let deadline = Deadline::after(Duration::from_millis(200));
        assert_eq!(
            deadline.budget(Duration::from_secs(5)),
            Duration::from_millis(200)
        );

        tokio::time::advance(Duration::from_millis(150)).await;
        assert_eq!(
            deadline.budget(Duration::from_secs(5)),
            Duration::from_millis(50)
        );

        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(deadline.is_expired());
        assert_eq!(deadline.budget(Duration::from_secs(5)), Duration::ZERO);
    }
}
