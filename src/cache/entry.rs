//! Cache Entry Module
//!
//! Defines individual cache items and the expiration sentinels callers pass in.

use std::time::{Duration, Instant};

use crate::cache::Value;

// == Expiration ==
/// Lifetime requested for an entry at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// Use the cache's configured default expiration
    Default,
    /// The entry never expires
    Never,
    /// The entry expires after this duration; zero means `Default`
    After(Duration),
}

impl From<Duration> for Expiration {
    fn from(ttl: Duration) -> Self {
        if ttl.is_zero() {
            Expiration::Default
        } else {
            Expiration::After(ttl)
        }
    }
}

impl Expiration {
    /// Resolves to the absolute expiration instant.
    ///
    /// `default_ttl` is the cache's default; `None` there means entries set
    /// with `Default` never expire. A deadline past the representable range
    /// of `Instant` also resolves to `None`.
    pub fn deadline(self, default_ttl: Option<Duration>, now: Instant) -> Option<Instant> {
        let ttl = match self {
            Expiration::Never => None,
            Expiration::After(ttl) if !ttl.is_zero() => Some(ttl),
            Expiration::After(_) | Expiration::Default => default_ttl,
        };
        ttl.and_then(|ttl| now.checked_add(ttl))
    }

    /// Duration this resolves to when used as a cache default.
    pub(crate) fn as_default_ttl(self) -> Option<Duration> {
        match self {
            Expiration::After(ttl) if !ttl.is_zero() => Some(ttl),
            _ => None,
        }
    }
}

// == Item ==
/// A stored value with its absolute expiration.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// The stored value
    pub value: Value,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl Item {
    // == Constructor ==
    pub fn new(value: Value, expires_at: Option<Instant>) -> Self {
        Self { value, expires_at }
    }

    // == Is Expired ==
    /// Checks whether the item is expired at `now`.
    ///
    /// An item is expired once `now >= expires_at`; items without an
    /// expiration never expire.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    /// Checks whether the item is expired right now.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    // == Time To Live ==
    /// Returns remaining lifetime, or None if no expiration is set.
    ///
    /// Expired items report `Duration::ZERO`.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_item_no_expiration() {
        let item = Item::new(Value::from("test_value"), None);

        assert_eq!(item.value, Value::from("test_value"));
        assert!(!item.is_expired());
        assert!(item.ttl_remaining().is_none());
    }

    #[test]
    fn test_item_expiration() {
        let item = Item::new(
            Value::Int(1),
            Some(Instant::now() + Duration::from_millis(50)),
        );

        assert!(!item.is_expired());

        sleep(Duration::from_millis(80));

        assert!(item.is_expired());
        assert_eq!(item.ttl_remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let now = Instant::now();
        let deadline = now + Duration::from_secs(1);
        let item = Item::new(Value::Int(1), Some(deadline));

        // Expired at exactly the deadline, live just before it
        assert!(!item.is_expired_at(now));
        assert!(!item.is_expired_at(deadline - Duration::from_nanos(1)));
        assert!(item.is_expired_at(deadline));
    }

    #[test]
    fn test_deadline_resolution() {
        let now = Instant::now();
        let default_ttl = Some(Duration::from_secs(60));

        assert_eq!(Expiration::Never.deadline(default_ttl, now), None);
        assert_eq!(
            Expiration::Default.deadline(default_ttl, now),
            Some(now + Duration::from_secs(60))
        );
        assert_eq!(Expiration::Default.deadline(None, now), None);
        assert_eq!(
            Expiration::After(Duration::from_secs(5)).deadline(default_ttl, now),
            Some(now + Duration::from_secs(5))
        );
        assert_eq!(
            Expiration::After(Duration::ZERO).deadline(default_ttl, now),
            Some(now + Duration::from_secs(60))
        );
    }

    #[test]
    fn test_deadline_overflow_never_expires() {
        let now = Instant::now();

        assert_eq!(Expiration::After(Duration::MAX).deadline(None, now), None);
        assert_eq!(
            Expiration::Default.deadline(Some(Duration::MAX), now),
            None
        );
    }

    #[test]
    fn test_from_duration() {
        assert_eq!(Expiration::from(Duration::ZERO), Expiration::Default);
        assert_eq!(
            Expiration::from(Duration::from_secs(1)),
            Expiration::After(Duration::from_secs(1))
        );
    }

    #[test]
    fn test_as_default_ttl() {
        assert_eq!(Expiration::Default.as_default_ttl(), None);
        assert_eq!(Expiration::Never.as_default_ttl(), None);
        assert_eq!(Expiration::After(Duration::ZERO).as_default_ttl(), None);
        assert_eq!(
            Expiration::After(Duration::from_secs(3)).as_default_ttl(),
            Some(Duration::from_secs(3))
        );
    }
}
