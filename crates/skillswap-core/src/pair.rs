// Canonical key for an unordered pair of users
//
// "The pair (A, B)" and "the pair (B, A)" must address the same sessions.
// PairKey sorts the two ids once so every lookup, count and uniqueness check
// uses the same (low, high) ordering.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::{Result, SessionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairKey {
    low: Uuid,
    high: Uuid,
}

impl PairKey {
    /// Build the key for two distinct users, in either order
    pub fn new(a: Uuid, b: Uuid) -> Result<Self> {
        if a == b {
            return Err(SessionError::invalid(
                "A pair needs two different users",
            ));
        }
        let (low, high) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { low, high })
    }

    pub fn low(&self) -> Uuid {
        self.low
    }

    pub fn high(&self) -> Uuid {
        self.high
    }

    pub fn contains(&self, user_id: Uuid) -> bool {
        self.low == user_id || self.high == user_id
    }

    /// The member of the pair that is not `user_id`
    pub fn other(&self, user_id: Uuid) -> Option<Uuid> {
        if user_id == self.low {
            Some(self.high)
        } else if user_id == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.low, self.high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_key_is_order_independent() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        assert_eq!(PairKey::new(a, b).unwrap(), PairKey::new(b, a).unwrap());
    }

    #[test]
    fn test_pair_key_sorted() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let key = PairKey::new(b, a).unwrap();
        assert!(key.low() < key.high());
    }

    #[test]
    fn test_pair_key_rejects_same_user() {
        let a = Uuid::now_v7();
        let err = PairKey::new(a, a).unwrap_err();
        assert!(matches!(err, SessionError::InvalidRequest(_)));
    }

    #[test]
    fn test_other_member() {
        let a = Uuid::now_v7();
        let b = Uuid::now_v7();
        let key = PairKey::new(a, b).unwrap();
        assert_eq!(key.other(a), Some(b));
        assert_eq!(key.other(b), Some(a));
        assert_eq!(key.other(Uuid::now_v7()), None);
        assert!(key.contains(a));
    }
}
