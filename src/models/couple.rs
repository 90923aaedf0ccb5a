use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One of the two families an account, category, or guest belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "couple_side", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Bride,
    Groom,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bride => "BRIDE",
            Self::Groom => "GROOM",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BRIDE" => Ok(Self::Bride),
            "GROOM" => Ok(Self::Groom),
            other => Err(format!("Unknown side '{other}', expected BRIDE or GROOM")),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Couple {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub side: Side,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCouple {
    pub name: String,
    pub email: String,
    pub side: Side,
}
