//! # Private Connections
//!
//! A connection row is directional (owner added peer), but friendship
//! is symmetric at query time: either direction counts. Duplicate rows
//! in the same direction are rejected; the reverse direction is a
//! distinct row, and friend listings collapse the pair keeping the
//! earliest timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PrivateError;

/// A directional connection between two private accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateConnection {
    /// Unique id.
    pub id: Uuid,
    /// Account that initiated the connection.
    pub owner_id: Uuid,
    /// Account that was connected to (by invite code).
    pub peer_id: Uuid,
    /// When the connection was created.
    pub created_at: DateTime<Utc>,
}

impl PrivateConnection {
    /// Connect `owner_id` to `peer_id`, checking against the owner's
    /// existing connections.
    pub fn connect<'a, I>(
        owner_id: Uuid,
        peer_id: Uuid,
        existing: I,
        now: DateTime<Utc>,
    ) -> Result<Self, PrivateError>
    where
        I: IntoIterator<Item = &'a PrivateConnection>,
    {
        if owner_id == peer_id {
            return Err(PrivateError::SelfTarget);
        }
        let duplicate = existing
            .into_iter()
            .any(|c| c.owner_id == owner_id && c.peer_id == peer_id);
        if duplicate {
            return Err(PrivateError::AlreadyConnected);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            peer_id,
            created_at: now,
        })
    }
}

/// Whether two accounts are connected in either direction.
pub fn are_friends<'a, I>(a: Uuid, b: Uuid, connections: I) -> bool
where
    I: IntoIterator<Item = &'a PrivateConnection>,
{
    connections.into_iter().any(|c| {
        (c.owner_id == a && c.peer_id == b) || (c.owner_id == b && c.peer_id == a)
    })
}

/// One row in a friend listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Friend {
    /// The other account.
    pub account_id: Uuid,
    /// Earliest connection timestamp across both directions.
    pub connected_at: DateTime<Utc>,
}

/// All friends of `account_id`, both directions collapsed, keeping the
/// earliest `connected_at` per friend. First-seen order.
pub fn friends_of<'a, I>(account_id: Uuid, connections: I) -> Vec<Friend>
where
    I: IntoIterator<Item = &'a PrivateConnection>,
{
    let mut friends: Vec<Friend> = Vec::new();
    for conn in connections {
        let other = if conn.owner_id == account_id {
            conn.peer_id
        } else if conn.peer_id == account_id {
            conn.owner_id
        } else {
            continue;
        };
        match friends.iter_mut().find(|f| f.account_id == other) {
            Some(friend) => {
                if conn.created_at < friend.connected_at {
                    friend.connected_at = conn.created_at;
                }
            }
            None => friends.push(Friend {
                account_id: other,
                connected_at: conn.created_at,
            }),
        }
    }
    friends
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn self_connection_rejected() {
        let me = Uuid::new_v4();
        let err = PrivateConnection::connect(me, me, [], Utc::now()).unwrap_err();
        assert_eq!(err, PrivateError::SelfTarget);
    }

    #[test]
    fn duplicate_same_direction_rejected() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let existing = PrivateConnection::connect(a, b, [], Utc::now()).unwrap();
        let err = PrivateConnection::connect(a, b, [&existing], Utc::now()).unwrap_err();
        assert_eq!(err, PrivateError::AlreadyConnected);
    }

    #[test]
    fn reverse_direction_is_a_distinct_row() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let forward = PrivateConnection::connect(a, b, [], Utc::now()).unwrap();
        assert!(PrivateConnection::connect(b, a, [&forward], Utc::now()).is_ok());
    }

    #[test]
    fn friendship_is_symmetric() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let conn = PrivateConnection::connect(a, b, [], Utc::now()).unwrap();
        let all = [&conn];
        assert!(are_friends(a, b, all));
        assert!(are_friends(b, a, all));
        assert!(!are_friends(a, c, all));
    }

    #[test]
    fn friends_of_collapses_pairs_keeping_earliest() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut forward = PrivateConnection::connect(a, b, [], at(5)).unwrap();
        forward.created_at = at(5);
        let mut backward = PrivateConnection::connect(b, a, [], at(2)).unwrap();
        backward.created_at = at(2);
        let friends = friends_of(a, [&forward, &backward]);
        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].account_id, b);
        assert_eq!(friends[0].connected_at, at(2));
    }
}
