//! Local rate-limit floor shared by every refresh caller. The floor only
//! ever moves forward; remote cooldowns raise it further, never lower it.

use parking_lot::Mutex;
use std::time::Duration;
use tokio::time::Instant;

pub struct RateGate {
    next_allowed: Mutex<Option<Instant>>,
}

impl RateGate {
    pub fn new() -> Self {
        Self {
            next_allowed: Mutex::new(None),
        }
    }

    /// Admit an attempt and arm the floor `gap` ahead, or report how long
    /// the caller still has to wait. A rejected attempt does not advance
    /// the floor.
    pub fn try_begin(&self, gap: Duration) -> Result<(), Duration> {
        let now = Instant::now();
        let mut slot = self.next_allowed.lock();
        if let Some(at) = *slot {
            if now < at {
                return Err(at - now);
            }
        }
        *slot = Some(now + gap);
        Ok(())
    }

    /// Raise the floor to at least `deadline`. Lower values are ignored.
    pub fn raise_to(&self, deadline: Instant) {
        let mut slot = self.next_allowed.lock();
        match *slot {
            Some(current) if current >= deadline => {}
            _ => *slot = Some(deadline),
        }
    }

    /// Time remaining until the next attempt is admitted, if any.
    pub fn remaining(&self) -> Option<Duration> {
        let now = Instant::now();
        let slot = self.next_allowed.lock();
        slot.filter(|at| *at > now).map(|at| at - now)
    }
}

impl Default for RateGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    const GAP: Duration = Duration::from_millis(2500);

    #[tokio::test(start_paused = true)]
    async fn test_second_attempt_within_gap_rejected() {
        let gate = RateGate::new();
        assert!(gate.try_begin(GAP).is_ok());
        let wait = gate.try_begin(GAP).unwrap_err();
        assert!(wait <= GAP);
        advance(GAP).await;
        assert!(gate.try_begin(GAP).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejection_does_not_advance_floor() {
        let gate = RateGate::new();
        assert!(gate.try_begin(GAP).is_ok());
        let first = gate.remaining().unwrap();
        let _ = gate.try_begin(GAP);
        let _ = gate.try_begin(GAP);
        assert!(gate.remaining().unwrap() <= first);
    }

    #[tokio::test(start_paused = true)]
    async fn test_raise_to_is_monotonic() {
        let gate = RateGate::new();
        let far = Instant::now() + Duration::from_secs(65);
        gate.raise_to(far);
        // an earlier deadline must not lower the floor
        gate.raise_to(Instant::now() + Duration::from_secs(1));
        assert!(gate.remaining().unwrap() > Duration::from_secs(60));
    }

    #[tokio::test(start_paused = true)]
    async fn test_floor_expires_with_time() {
        let gate = RateGate::new();
        gate.raise_to(Instant::now() + Duration::from_secs(5));
        advance(Duration::from_secs(6)).await;
        assert!(gate.remaining().is_none());
        assert!(gate.try_begin(GAP).is_ok());
    }
}
