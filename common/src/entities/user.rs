use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::repository::{Entity, HasLastModified};

use super::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User<Id> {
    pub id: Id,
    pub name: String,
    pub email: String,
    pub password: String,
    pub salt: String,
    pub role: Role,
    pub is_active: bool,
    #[serde(default)]
    pub failed_attempts: u32,
    pub locked_until: Option<i64>,
    pub created_at: i64,
    pub last_modified: i64,
}

impl User<String> {
    pub fn parse(self) -> User<ObjectId> {
        User {
            id: self.id.parse().unwrap(),
            name: self.name,
            email: self.email,
            password: self.password,
            salt: self.salt,
            role: self.role,
            is_active: self.is_active,
            failed_attempts: self.failed_attempts,
            locked_until: self.locked_until,
            created_at: self.created_at,
            last_modified: self.last_modified,
        }
    }
}

impl User<ObjectId> {
    pub fn stringify(self) -> User<String> {
        User {
            id: self.id.to_hex(),
            name: self.name,
            email: self.email,
            password: self.password,
            salt: self.salt,
            role: self.role,
            is_active: self.is_active,
            failed_attempts: self.failed_attempts,
            locked_until: self.locked_until,
            created_at: self.created_at,
            last_modified: self.last_modified,
        }
    }
}

impl Entity for User<ObjectId> {
    fn id(&self) -> ObjectId {
        self.id
    }
}

impl HasLastModified for User<ObjectId> {
    fn last_modified(&self) -> i64 {
        self.last_modified
    }

    fn set_last_modified(&mut self, timestamp: i64) {
        self.last_modified = timestamp;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PublicUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub is_active: bool,
}

impl From<User<ObjectId>> for PublicUser {
    fn from(user: User<ObjectId>) -> Self {
        Self {
            id: user.id.to_hex(),
            name: user.name,
            email: user.email,
            role: user.role,
            is_active: user.is_active,
        }
    }
}
