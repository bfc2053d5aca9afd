use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Identity of a conversation, message or document.
///
/// Ordering follows generation order, so ids double as a tie-breaking sort key
/// for entities created within the same clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id {
    seq: u64,
    sub: u32,
}

impl Id {
    pub const fn new(seq: u64) -> Self {
        Self { seq, sub: 0 }
    }

    /// Id for the reply to the entity carrying this id.
    ///
    /// Derived rather than generated, so it never races a coarse clock: it
    /// sorts directly after `self` and before anything generated later.
    pub const fn reply(self) -> Self {
        Self {
            seq: self.seq,
            sub: self.sub + 1,
        }
    }

    pub const fn seq(self) -> u64 {
        self.seq
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sub == 0 {
            write!(f, "{}", self.seq)
        } else {
            write!(f, "{}.{}", self.seq, self.sub)
        }
    }
}

/// Produces strictly increasing ids seeded from the wall clock in milliseconds.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> Id {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.next_at(now)
    }

    fn next_at(&self, now_millis: u64) -> Id {
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now_millis.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return Id::new(candidate),
                Err(actual) => last = actual,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_strictly_increase() {
        let ids = IdGenerator::new();
        let mut prev = ids.next_id();
        for _ in 0..1000 {
            let next = ids.next_id();
            assert!(next > prev);
            prev = next;
        }
    }

    #[test]
    fn test_same_tick_does_not_collide() {
        let ids = IdGenerator::new();
        let a = ids.next_at(5000);
        let b = ids.next_at(5000);
        let c = ids.next_at(4000);
        assert_eq!(a, Id::new(5000));
        assert_eq!(b, Id::new(5001));
        assert_eq!(c, Id::new(5002));
    }

    #[test]
    fn test_reply_sorts_between_trigger_and_successor() {
        let ids = IdGenerator::new();
        let user = ids.next_at(10);
        let later = ids.next_at(10);
        let reply = user.reply();

        assert!(user < reply);
        assert!(reply < later);
        assert_ne!(reply, later);
        assert_eq!(user.reply(), reply);
    }

    #[test]
    fn test_display() {
        assert_eq!(Id::new(42).to_string(), "42");
        assert_eq!(Id::new(42).reply().to_string(), "42.1");
    }
}
