use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::{
    access_rules::Relation,
    auth::Auth,
    repository::{Entity, HasLastModified},
};

/// Comments carry no delete path anywhere in the API: the discussion
/// history on an issue is append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment<Id> {
    pub id: Id,
    pub issue_id: Id,
    pub author: Id,
    pub content: String,
    pub created_at: i64,
    pub last_modified: i64,
}

impl Comment<String> {
    pub fn parse(self) -> Comment<ObjectId> {
        Comment {
            id: self.id.parse().unwrap(),
            issue_id: self.issue_id.parse().unwrap(),
            author: self.author.parse().unwrap(),
            content: self.content,
            created_at: self.created_at,
            last_modified: self.last_modified,
        }
    }
}

impl Comment<ObjectId> {
    pub fn stringify(self) -> Comment<String> {
        Comment {
            id: self.id.to_hex(),
            issue_id: self.issue_id.to_hex(),
            author: self.author.to_hex(),
            content: self.content,
            created_at: self.created_at,
            last_modified: self.last_modified,
        }
    }

    pub fn relations(&self, auth: &Auth) -> Vec<Relation> {
        match auth.id() {
            Some(id) if id == &self.author => vec![Relation::Author],
            _ => Vec::new(),
        }
    }
}

impl Entity for Comment<ObjectId> {
    fn id(&self) -> ObjectId {
        self.id
    }
}

impl HasLastModified for Comment<ObjectId> {
    fn last_modified(&self) -> i64 {
        self.last_modified
    }

    fn set_last_modified(&mut self, timestamp: i64) {
        self.last_modified = timestamp;
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicComment {
    pub id: String,
    pub issue_id: String,
    pub author: String,
    pub content: String,
    pub created_at: i64,
    pub is_edited: bool,
}

impl From<Comment<ObjectId>> for PublicComment {
    fn from(comment: Comment<ObjectId>) -> Self {
        // Micros; anything beyond a second after creation counts as an edit.
        let is_edited = comment.last_modified - comment.created_at * 1_000_000 > 1_000_000;
        Self {
            id: comment.id.to_hex(),
            issue_id: comment.issue_id.to_hex(),
            author: comment.author.to_hex(),
            content: comment.content,
            created_at: comment.created_at,
            is_edited,
        }
    }
}
