use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::{self, oid::ObjectId, Bson, Document};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{self, AddCode};

use super::{Entity, HasLastModified, Repository};

pub struct TestRepository<T> {
    _t: std::marker::PhantomData<T>,
    pub db: Mutex<Vec<Bson>>,
}

impl<T> TestRepository<T> {
    pub fn new() -> Self {
        Self {
            _t: std::marker::PhantomData,
            db: Mutex::new(Vec::new()),
        }
    }
}

impl<T> Default for TestRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T> Repository<T> for TestRepository<T>
where
    T: Entity + HasLastModified + Clone + PartialEq + Send + Sync + Serialize + DeserializeOwned,
{
    async fn insert(&self, item: &T) -> error::Result<bool> {
        let mut db = self.db.lock().unwrap();

        let contains = db
            .iter()
            .any(|x| x.as_document().unwrap().get_object_id("id").unwrap() == item.id());
        if !contains {
            db.push(bson::to_bson(&item).unwrap());
        }
        Ok(!contains)
    }

    async fn find(&self, field: &str, value: &Bson) -> error::Result<Option<T>> {
        let db = self.db.lock().unwrap();
        Ok(db
            .iter()
            .find(|x| x.as_document().unwrap().get(field) == Some(value))
            .cloned()
            .map(|x| bson::from_bson(x).unwrap()))
    }

    async fn delete(&self, field: &str, id: &ObjectId) -> error::Result<Option<T>> {
        let mut db = self.db.lock().unwrap();
        let pos = db
            .iter()
            .position(|x| &x.as_document().unwrap().get_object_id(field).unwrap() == id);

        Ok(pos.map(|pos| bson::from_bson(db.remove(pos)).unwrap()))
    }

    async fn update_one(&self, old: Document, update: &T) -> error::Result<bool> {
        let mut db = self.db.lock().unwrap();
        let id = old.get_object_id("id")?;

        let pos = db
            .iter()
            .position(|x| x.as_document().unwrap().get_object_id("id").unwrap() == id);

        let Some(pos) = pos else {
            return Err(anyhow::anyhow!("Failed to save changes").code(409));
        };

        let stored: T = bson::from_bson(db[pos].clone()).unwrap();
        if stored.last_modified() != update.last_modified() {
            return Err(anyhow::anyhow!("Failed to save changes").code(409));
        }

        let mut update = update.clone();
        update.set_last_modified(Utc::now().timestamp_micros());
        db[pos] = bson::to_bson(&update).unwrap();

        Ok(true)
    }

    async fn find_many(&self, field: &str, value: &Bson) -> error::Result<Vec<T>> {
        let db = self.db.lock().unwrap();
        Ok(db
            .iter()
            .filter(|x| x.as_document().unwrap().get(field) == Some(value))
            .map(|x| bson::from_bson(x.clone()).unwrap())
            .collect())
    }

    async fn find_all(&self, skip: u32, limit: u32) -> error::Result<Vec<T>> {
        let db = self.db.lock().unwrap();
        Ok(db
            .iter()
            .skip(skip as usize)
            .take(limit as usize)
            .map(|x| bson::from_bson(x.clone()).unwrap())
            .collect())
    }

    async fn find_many_limit(
        &self,
        field: &str,
        value: &Bson,
        skip: u32,
        limit: u32,
    ) -> error::Result<(Vec<T>, u64)> {
        let db = self.db.lock().unwrap();
        let matching: Vec<&Bson> = db
            .iter()
            .filter(|x| x.as_document().unwrap().get(field) == Some(value))
            .collect();
        let total = matching.len() as u64;

        Ok((
            matching
                .into_iter()
                .skip(skip as usize)
                .take(limit as usize)
                .map(|x| bson::from_bson(x.clone()).unwrap())
                .collect(),
            total,
        ))
    }
}
