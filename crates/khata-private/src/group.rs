//! # Groups
//!
//! A group owns its member list. The creator joins as ADMIN; admins
//! add and remove members; the owner can never be removed. Adding a
//! member requires the admin and the target to be friends, which the
//! caller checks against the connection set and passes in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use khata_core::ValidationError;

use crate::error::PrivateError;

/// Role of a member inside a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    /// May add and remove members.
    Admin,
    /// Regular member.
    Member,
}

/// One membership row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMember {
    /// The member account.
    pub account_id: Uuid,
    /// The member's role.
    pub role: MemberRole,
    /// When the member joined.
    pub joined_at: DateTime<Utc>,
}

/// A private group and its members.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    /// Unique id.
    pub id: Uuid,
    /// Creating account. Always a member, never removable.
    pub owner_id: Uuid,
    /// Display name.
    pub name: String,
    /// Membership rows, in join order.
    pub members: Vec<GroupMember>,
    /// When the group was created.
    pub created_at: DateTime<Utc>,
}

impl Group {
    /// Create a group; the owner joins immediately as ADMIN.
    pub fn new(owner_id: Uuid, name: &str, now: DateTime<Utc>) -> Result<Self, PrivateError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required { field: "name" }.into());
        }
        Ok(Self {
            id: Uuid::new_v4(),
            owner_id,
            name: name.to_owned(),
            members: vec![GroupMember {
                account_id: owner_id,
                role: MemberRole::Admin,
                joined_at: now,
            }],
            created_at: now,
        })
    }

    /// The role `account_id` holds in this group, if a member.
    pub fn role_of(&self, account_id: Uuid) -> Option<MemberRole> {
        self.members
            .iter()
            .find(|m| m.account_id == account_id)
            .map(|m| m.role)
    }

    /// Number of members.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    fn require_admin(&self, actor: Uuid) -> Result<(), PrivateError> {
        match self.role_of(actor) {
            Some(MemberRole::Admin) => Ok(()),
            Some(MemberRole::Member) => Err(PrivateError::AdminOnly),
            None => Err(PrivateError::NotMember),
        }
    }

    /// Add `target` as a MEMBER, acting as `actor`.
    ///
    /// `is_friend` is the caller's answer to "are actor and target
    /// connected" from the connection set.
    pub fn add_member(
        &mut self,
        actor: Uuid,
        target: Uuid,
        is_friend: bool,
        now: DateTime<Utc>,
    ) -> Result<(), PrivateError> {
        self.require_admin(actor)?;
        if self.role_of(target).is_some() {
            return Err(PrivateError::AlreadyMember);
        }
        if !is_friend {
            return Err(PrivateError::MustBeFriend);
        }
        self.members.push(GroupMember {
            account_id: target,
            role: MemberRole::Member,
            joined_at: now,
        });
        Ok(())
    }

    /// Remove `target` from the group, acting as `actor`.
    pub fn remove_member(&mut self, actor: Uuid, target: Uuid) -> Result<(), PrivateError> {
        self.require_admin(actor)?;
        if target == self.owner_id {
            return Err(PrivateError::CannotRemoveOwner);
        }
        let before = self.members.len();
        self.members.retain(|m| m.account_id != target);
        if self.members.len() == before {
            return Err(PrivateError::NotMember);
        }
        Ok(())
    }
}
