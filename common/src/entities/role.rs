use serde::{Deserialize, Serialize};

use crate::error::{self, AddCode};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(alias = "developer")]
    Developer,
    #[serde(alias = "manager")]
    Manager,
    #[serde(alias = "admin")]
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> error::Result<Role> {
        match s.to_lowercase().as_str() {
            "developer" => Ok(Role::Developer),
            "manager" => Ok(Role::Manager),
            "admin" => Ok(Role::Admin),
            _ => Err(anyhow::anyhow!("Invalid role: {}", s).code(400)),
        }
    }

    pub fn stringify(&self) -> &'static str {
        match self {
            Role::Developer => "Developer",
            Role::Manager => "Manager",
            Role::Admin => "Admin",
        }
    }
}
