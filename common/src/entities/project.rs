use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::{
    access_rules::Relation,
    auth::Auth,
    repository::{Entity, HasLastModified},
};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project<Id> {
    pub id: Id,
    pub name: String,
    pub description: String,
    pub created_by: Id,
    pub is_archived: bool,
    pub created_at: i64,
    pub last_modified: i64,
}

impl Project<String> {
    pub fn parse(self) -> Project<ObjectId> {
        Project {
            id: self.id.parse().unwrap(),
            name: self.name,
            description: self.description,
            created_by: self.created_by.parse().unwrap(),
            is_archived: self.is_archived,
            created_at: self.created_at,
            last_modified: self.last_modified,
        }
    }
}

impl Project<ObjectId> {
    pub fn stringify(self) -> Project<String> {
        Project {
            id: self.id.to_hex(),
            name: self.name,
            description: self.description,
            created_by: self.created_by.to_hex(),
            is_archived: self.is_archived,
            created_at: self.created_at,
            last_modified: self.last_modified,
        }
    }

    pub fn relations(&self, auth: &Auth) -> Vec<Relation> {
        match auth.id() {
            Some(id) if id == &self.created_by => vec![Relation::Owner],
            _ => Vec::new(),
        }
    }
}

impl Entity for Project<ObjectId> {
    fn id(&self) -> ObjectId {
        self.id
    }
}

impl HasLastModified for Project<ObjectId> {
    fn last_modified(&self) -> i64 {
        self.last_modified
    }

    fn set_last_modified(&mut self, timestamp: i64) {
        self.last_modified = timestamp;
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicProject {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_by: String,
    pub is_archived: bool,
    pub created_at: i64,
}

impl From<Project<ObjectId>> for PublicProject {
    fn from(project: Project<ObjectId>) -> Self {
        Self {
            id: project.id.to_hex(),
            name: project.name,
            description: project.description,
            created_by: project.created_by.to_hex(),
            is_archived: project.is_archived,
            created_at: project.created_at,
        }
    }
}
