//! Errors shared by the private-account features.

use thiserror::Error;

use khata_core::ValidationError;

/// Errors raised by connection, group, and item-loan operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrivateError {
    /// An account tried to connect to or lend to itself.
    #[error("cannot target your own account")]
    SelfTarget,
    /// The connection already exists.
    #[error("connection already exists")]
    AlreadyConnected,
    /// A group action requires admin role.
    #[error("admin only")]
    AdminOnly,
    /// The actor is not a member of the group.
    #[error("not a group member")]
    NotMember,
    /// The target is already a member of the group.
    #[error("user already in group")]
    AlreadyMember,
    /// Members may only be added by an admin they are friends with.
    #[error("user must be your friend")]
    MustBeFriend,
    /// The group owner cannot be removed.
    #[error("cannot remove owner")]
    CannotRemoveOwner,
    /// The item loan is already returned.
    #[error("item is already returned")]
    AlreadyReturned,
    /// A submitted field failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
