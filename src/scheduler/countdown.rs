use std::sync::atomic::{AtomicI64, Ordering};

/// Display-only seconds-until-next-fetch counter.
///
/// Runs on its own 10-second tick and is reset by each fetch cycle. It is
/// not derived from the fetch timer's actual remaining time and may drift
/// relative to it; that drift is part of the observable behavior.
pub struct Countdown {
    remaining: AtomicI64,
    full: i64,
}

impl Countdown {
    pub fn new(full_secs: i64) -> Self {
        Self {
            remaining: AtomicI64::new(full_secs),
            full: full_secs,
        }
    }

    pub fn remaining(&self) -> i64 {
        self.remaining.load(Ordering::Relaxed)
    }

    /// Back to the full interval, called at the start of every cycle.
    pub fn reset(&self) {
        self.remaining.store(self.full, Ordering::Relaxed);
    }

    /// One display tick: down by ten seconds, wrapping to the full interval
    /// instead of going negative.
    pub fn advance(&self) {
        let next = self.remaining.load(Ordering::Relaxed) - 10;
        let next = if next < 0 { self.full } else { next };
        self.remaining.store(next, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_down_in_tens() {
        let countdown = Countdown::new(301);
        assert_eq!(countdown.remaining(), 301);

        countdown.advance();
        assert_eq!(countdown.remaining(), 291);
    }

    #[test]
    fn test_wraps_instead_of_going_negative() {
        let countdown = Countdown::new(15);
        countdown.advance();
        assert_eq!(countdown.remaining(), 5);

        // 5 - 10 would be negative, wrap to the full interval
        countdown.advance();
        assert_eq!(countdown.remaining(), 15);
    }

    #[test]
    fn test_reset_restores_full_interval() {
        let countdown = Countdown::new(301);
        countdown.advance();
        countdown.advance();
        countdown.reset();
        assert_eq!(countdown.remaining(), 301);
    }
}
