pub mod mongo_repository;
pub mod test_repository;

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};

use crate::error;

pub trait Entity {
    fn id(&self) -> ObjectId;
}

pub trait HasLastModified {
    fn last_modified(&self) -> i64;
    fn set_last_modified(&mut self, timestamp: i64);
}

#[async_trait]
pub trait Repository<T> {
    async fn insert(&self, item: &T) -> error::Result<bool>;
    async fn find(&self, field: &str, value: &Bson) -> error::Result<Option<T>>;
    async fn delete(&self, field: &str, id: &ObjectId) -> error::Result<Option<T>>;
    async fn update_one(&self, old: Document, update: &T) -> error::Result<bool>;
    async fn find_many(&self, field: &str, value: &Bson) -> error::Result<Vec<T>>;
    async fn find_all(&self, skip: u32, limit: u32) -> error::Result<Vec<T>>;
    async fn find_many_limit(
        &self,
        field: &str,
        value: &Bson,
        skip: u32,
        limit: u32,
    ) -> error::Result<(Vec<T>, u64)>;
}

pub type RepositoryObject<T> = Arc<dyn Repository<T> + Send + Sync>;
