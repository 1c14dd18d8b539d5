//! # khata-private
//!
//! Peer-to-peer features for private accounts: invite-code
//! connections with symmetric friendship, admin-managed groups, and
//! item loans with read-time reminder computation.
//!
//! Every rule here is pure over the domain values; stores and access
//! control live in the API layer.

#![deny(missing_docs)]

pub mod connection;
pub mod error;
pub mod group;
pub mod items;

pub use connection::{are_friends, friends_of, Friend, PrivateConnection};
pub use error::PrivateError;
pub use group::{Group, GroupMember, MemberRole};
pub use items::{
    ItemLoan, LoanStatus, NewItemLoan, DEFAULT_REMINDER_INTERVAL_DAYS,
};
