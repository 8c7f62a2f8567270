use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Durable record pairing exactly two users for chat purposes.
///
/// Members are stored as a canonically ordered column pair
/// (`member_a < member_b`) with a unique index, so any unordered pair maps
/// to at most one row and lookup never needs a table scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub member_a: Uuid,
    pub member_b: Uuid,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn members(&self) -> [Uuid; 2] {
        [self.member_a, self.member_b]
    }

    pub fn has_member(&self, user_id: Uuid) -> bool {
        self.member_a == user_id || self.member_b == user_id
    }
}

/// Canonical ordering for an unordered member pair.
///
/// `canonical_pair(a, b) == canonical_pair(b, a)` holds for all inputs, which
/// is what makes the `(member_a, member_b)` unique index enforce the
/// one-conversation-per-pair invariant.
pub fn canonical_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_pair_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(canonical_pair(a, b), canonical_pair(b, a));
    }

    #[test]
    fn test_canonical_pair_is_sorted() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (first, second) = canonical_pair(a, b);
        assert!(first <= second);
    }

    #[test]
    fn test_has_member() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let (member_a, member_b) = canonical_pair(a, b);
        let conversation = Conversation {
            id: Uuid::new_v4(),
            member_a,
            member_b,
            last_message: None,
            last_message_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(conversation.has_member(a));
        assert!(conversation.has_member(b));
        assert!(!conversation.has_member(Uuid::new_v4()));
    }
}
