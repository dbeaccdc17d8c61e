use std::{num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};
use teloxide::types::{ChatId as TgChatId, Recipient, UserId as TgUserId};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

macro_rules! cast {
    ($($from:ty => $to:ty : $value:ident => $convert:expr),* $(,)?) => {
        $(impl From<$from> for $to {
            fn from($value: $from) -> Self {
                $convert
            }
        })*
    };
}

cast!(
    u64 => UserId: v => Self(v),

    UserId => Recipient: v => Recipient::Id(v.into()),

    UserId => TgUserId: v => Self(v.0),
    TgUserId => UserId: v => Self(v.0),

    UserId => TgChatId: v => Self(v.0 as _),
    TgChatId => UserId: v => Self(v.0 as _),
);

/// Simple [`std::fmt::Display`] implementation
macro_rules! display {
    ($($from:ty : $self:ident => $value:expr),* $(,)?) => {
        $(impl ::std::fmt::Display for $from {
            fn fmt(&$self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                $value.fmt(f)
            }
        })*
    };
}

display!(
    UserId: self => self.0,
);

impl FromStr for UserId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

/// Who is paying: identity plus the names shown to the admin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub user_id: UserId,
    pub username: Option<String>,
    pub first_name: String,
}

impl Customer {
    pub fn new(user_id: impl Into<UserId>, username: Option<String>, first_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username,
            first_name: first_name.into(),
        }
    }
    /// `@username` if known, first name otherwise
    pub fn handle(&self) -> String {
        match &self.username {
            Some(u) => format!("@{u}"),
            None => self.first_name.clone(),
        }
    }
}

impl From<&teloxide::types::User> for Customer {
    fn from(u: &teloxide::types::User) -> Self {
        Self::new(u.id, u.username.clone(), u.first_name.clone())
    }
}
