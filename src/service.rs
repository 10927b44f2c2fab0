use crate::errors::StoreError;
use crate::models::{BonusRecord, WeeklyRecord};
use crate::resource::Resource;
use crate::store::RecordStore;
use std::sync::Arc;
use tracing::debug;

/// Typed façade over whichever store the composition root injected.
/// Input is validated here so malformed fields never reach a backend.
pub struct ResourceService<R: Resource> {
    store: Arc<dyn RecordStore<R>>,
}

pub type WeeklyDataService = ResourceService<WeeklyRecord>;
pub type BonusesService = ResourceService<BonusRecord>;

impl<R: Resource> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<R: Resource> ResourceService<R> {
    pub fn new(store: Arc<dyn RecordStore<R>>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Result<Vec<R>, StoreError> {
        let records = self.store.get_all().await?;
        debug!(resource = R::LABEL, count = records.len(), "records loaded");
        Ok(records)
    }

    pub async fn create(&self, fields: R::Fields) -> Result<R, StoreError> {
        R::validate(&fields)?;
        self.store.create(fields).await
    }

    pub async fn update(&self, id: &str, fields: R::Fields) -> Result<R, StoreError> {
        R::validate(&fields)?;
        self.store.update(id, fields).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.store.delete(id).await
    }
}
