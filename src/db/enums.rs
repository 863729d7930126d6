use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Protocol family a relay node speaks. Stored as the integer code the panel has always used.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum NodeSort {
    #[default]
    #[sea_orm(num_value = 0)]
    Shadowsocks,
    #[sea_orm(num_value = 1)]
    Shadowsocks2022,
    #[sea_orm(num_value = 2)]
    Tuic,
    #[sea_orm(num_value = 11)]
    Vmess,
    #[sea_orm(num_value = 14)]
    Trojan,
}

impl NodeSort {
    pub fn code(self) -> i32 {
        self.to_value()
    }

    /// Maps a stored or submitted code back to a sort, `None` for codes the panel does not know.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::try_from_value(&code).ok()
    }
}

impl fmt::Display for NodeSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Result of a single login attempt. `0` is success, `1` is failure in the `login_ip` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
#[serde(rename_all = "lowercase")]
pub enum LoginOutcome {
    #[sea_orm(num_value = 0)]
    Success,
    #[sea_orm(num_value = 1)]
    Failure,
}

impl fmt::Display for LoginOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginOutcome::Success => write!(f, "success"),
            LoginOutcome::Failure => write!(f, "failure"),
        }
    }
}
