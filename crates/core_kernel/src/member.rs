//! Member identity within a shared-expense group
//!
//! A group member is either a registered user or an unregistered "friend"
//! placeholder. On the wire both are strings, `u_<uuid>` and `f_<uuid>`;
//! inside the engine they are a proper tagged union, parsed and validated
//! exactly once at the boundary. Any other string shape is rejected loudly
//! rather than treated as a member.

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::identifiers::{FriendId, UserId};

/// Errors raised while parsing member identifiers
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemberIdError {
    /// The string does not start with a known `u_` / `f_` prefix
    #[error("Unknown member id shape: {0:?} (expected u_<id> or f_<id>)")]
    UnknownShape(String),

    /// The prefix was recognized but the id part is not a UUID
    #[error("Invalid member id {0:?}: the id part is not a valid UUID")]
    InvalidId(String),
}

/// Identity of a group member
///
/// `Ord` follows the wire-string ordering (`f_…` sorts before `u_…`), so
/// "sorted by member id" means the same thing in memory and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberId {
    /// A registered user account
    User(UserId),
    /// An unregistered friend placeholder local to a group
    Friend(FriendId),
}

impl MemberId {
    const USER_PREFIX: &'static str = "u_";
    const FRIEND_PREFIX: &'static str = "f_";

    /// Wraps a registered user id
    pub fn user(id: UserId) -> Self {
        MemberId::User(id)
    }

    /// Wraps a friend placeholder id
    pub fn friend(id: FriendId) -> Self {
        MemberId::Friend(id)
    }

    /// Creates a new random registered-user member (mostly for tests)
    pub fn new_user() -> Self {
        MemberId::User(UserId::new())
    }

    /// Creates a new random friend-placeholder member (mostly for tests)
    pub fn new_friend() -> Self {
        MemberId::Friend(FriendId::new())
    }

    /// Returns true for registered users, false for friend placeholders
    pub fn is_registered(&self) -> bool {
        matches!(self, MemberId::User(_))
    }

    fn sort_key(&self) -> (u8, &Uuid) {
        match self {
            MemberId::Friend(id) => (b'f', id.as_uuid()),
            MemberId::User(id) => (b'u', id.as_uuid()),
        }
    }
}

impl Ord for MemberId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for MemberId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberId::User(id) => write!(f, "{}{}", Self::USER_PREFIX, id),
            MemberId::Friend(id) => write!(f, "{}{}", Self::FRIEND_PREFIX, id),
        }
    }
}

impl FromStr for MemberId {
    type Err = MemberIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(raw) = s.strip_prefix(Self::USER_PREFIX) {
            let id = raw
                .parse::<UserId>()
                .map_err(|_| MemberIdError::InvalidId(s.to_string()))?;
            return Ok(MemberId::User(id));
        }
        if let Some(raw) = s.strip_prefix(Self::FRIEND_PREFIX) {
            let id = raw
                .parse::<FriendId>()
                .map_err(|_| MemberIdError::InvalidId(s.to_string()))?;
            return Ok(MemberId::Friend(id));
        }
        Err(MemberIdError::UnknownShape(s.to_string()))
    }
}

impl Serialize for MemberId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MemberId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
