//! Record persistence behind one CRUD trait.
//!
//! Backends: [`LocalStore`] over a [`KeyValueStore`] (durable file or
//! in-memory), [`RemoteStore`](crate::remote::RemoteStore) over the HTTP
//! API, and [`FallbackStore`] which routes between the two.

use crate::errors::StoreError;
use crate::remote::Session;
use crate::resource::Resource;
use crate::storage::KeyValueStore;
use async_trait::async_trait;
use std::{marker::PhantomData, sync::Arc};
use tracing::{info, warn};
use uuid::Uuid;

#[async_trait]
pub trait RecordStore<R: Resource>: Send + Sync {
    async fn get_all(&self) -> Result<Vec<R>, StoreError>;

    async fn create(&self, fields: R::Fields) -> Result<R, StoreError>;

    /// Replaces every field of `id`; the identifier itself never changes.
    async fn update(&self, id: &str, fields: R::Fields) -> Result<R, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

/// Record array kept under `R::STORAGE_KEY` in a key-value store.
/// Identifiers are generated here as random UUIDs.
pub struct LocalStore<R> {
    kv: Arc<KeyValueStore>,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for LocalStore<R> {
    fn clone(&self) -> Self {
        Self {
            kv: Arc::clone(&self.kv),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> LocalStore<R> {
    pub fn new(kv: Arc<KeyValueStore>) -> Self {
        Self {
            kv,
            _resource: PhantomData,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(KeyValueStore::in_memory()))
    }

    /// Overwrites the cached array, used to mirror a successful remote read.
    pub async fn replace_all(&self, records: &[R]) -> Result<(), StoreError> {
        self.kv.put(R::STORAGE_KEY, records).await
    }

    /// Inserts or replaces one record by id without generating a new one.
    pub async fn upsert(&self, record: R) -> Result<(), StoreError> {
        self.kv
            .modify(R::STORAGE_KEY, |records: &mut Vec<R>| {
                match records.iter_mut().find(|existing| existing.id() == record.id()) {
                    Some(existing) => *existing = record,
                    None => records.push(record),
                }
                Ok(())
            })
            .await
    }

    pub async fn remove(&self, id: &str) -> Result<(), StoreError> {
        self.kv
            .modify(R::STORAGE_KEY, |records: &mut Vec<R>| {
                records.retain(|record| record.id() != id);
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl<R: Resource> RecordStore<R> for LocalStore<R> {
    async fn get_all(&self) -> Result<Vec<R>, StoreError> {
        self.kv.get(R::STORAGE_KEY).await
    }

    async fn create(&self, fields: R::Fields) -> Result<R, StoreError> {
        let record = R::from_fields(Uuid::new_v4().to_string(), fields);
        let created = record.clone();
        self.kv
            .modify(R::STORAGE_KEY, move |records: &mut Vec<R>| {
                records.push(record);
                Ok(())
            })
            .await?;
        info!(resource = R::LABEL, id = created.id(), "record created");
        Ok(created)
    }

    async fn update(&self, id: &str, fields: R::Fields) -> Result<R, StoreError> {
        let updated = self
            .kv
            .modify(R::STORAGE_KEY, |records: &mut Vec<R>| {
                let existing = records
                    .iter_mut()
                    .find(|record| record.id() == id)
                    .ok_or_else(|| not_found::<R>(id))?;
                *existing = R::from_fields(id.to_string(), fields);
                Ok(existing.clone())
            })
            .await?;
        info!(resource = R::LABEL, id, "record updated");
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.kv
            .modify(R::STORAGE_KEY, |records: &mut Vec<R>| {
                let before = records.len();
                records.retain(|record| record.id() != id);
                if records.len() == before {
                    return Err(not_found::<R>(id));
                }
                Ok(())
            })
            .await?;
        info!(resource = R::LABEL, id, "record deleted");
        Ok(())
    }
}

pub(crate) fn not_found<R: Resource>(id: &str) -> StoreError {
    StoreError::NotFound {
        resource: R::LABEL,
        id: id.to_string(),
    }
}

/// Routes calls to the remote API while it is configured and the session
/// holds a token, otherwise to the local cache.
///
/// Only reads fail over: a remote `getAll` that hits a transport error is
/// answered from the cache. Remote write failures are returned to the
/// caller so the two sides never drift apart silently. Successful remote
/// results are mirrored into the cache.
pub struct FallbackStore<R: Resource> {
    remote: Option<Arc<dyn RecordStore<R>>>,
    local: LocalStore<R>,
    session: Session,
}

impl<R: Resource> FallbackStore<R> {
    pub fn new(
        remote: Option<Arc<dyn RecordStore<R>>>,
        local: LocalStore<R>,
        session: Session,
    ) -> Self {
        Self {
            remote,
            local,
            session,
        }
    }

    pub fn local_only(local: LocalStore<R>) -> Self {
        Self::new(None, local, Session::default())
    }

    async fn active_remote(&self) -> Option<&Arc<dyn RecordStore<R>>> {
        let remote = self.remote.as_ref()?;
        if self.session.is_authenticated().await {
            Some(remote)
        } else {
            None
        }
    }

    fn mirror(&self, result: Result<(), StoreError>) {
        if let Err(err) = result {
            warn!(resource = R::LABEL, "failed to update local cache: {err}");
        }
    }
}

#[async_trait]
impl<R: Resource> RecordStore<R> for FallbackStore<R> {
    async fn get_all(&self) -> Result<Vec<R>, StoreError> {
        let Some(remote) = self.active_remote().await else {
            return self.local.get_all().await;
        };
        match remote.get_all().await {
            Ok(records) => {
                self.mirror(self.local.replace_all(&records).await);
                Ok(records)
            }
            Err(err) if err.is_transport() => {
                warn!(resource = R::LABEL, "remote read failed, serving local cache: {err}");
                self.local.get_all().await
            }
            Err(err) => Err(err),
        }
    }

    async fn create(&self, fields: R::Fields) -> Result<R, StoreError> {
        let Some(remote) = self.active_remote().await else {
            return self.local.create(fields).await;
        };
        let record = remote.create(fields).await?;
        self.mirror(self.local.upsert(record.clone()).await);
        Ok(record)
    }

    async fn update(&self, id: &str, fields: R::Fields) -> Result<R, StoreError> {
        let Some(remote) = self.active_remote().await else {
            return self.local.update(id, fields).await;
        };
        let record = remote.update(id, fields).await?;
        self.mirror(self.local.upsert(record.clone()).await);
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let Some(remote) = self.active_remote().await else {
            return self.local.delete(id).await;
        };
        remote.delete(id).await?;
        self.mirror(self.local.remove(id).await);
        Ok(())
    }
}
