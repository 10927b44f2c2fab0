//! Client-side copy of one resource's full record set.
//!
//! A [`Dataset`] owns the records a view renders from. Mutations go through
//! the service first and are applied locally only once the call succeeds.
//! Handles are cheap to clone; overlapping calls are not sequenced, so the
//! call that settles last decides the local state.

use crate::errors::StoreError;
use crate::models::{BonusRecord, WeeklyRecord};
use crate::resource::Resource;
use crate::service::ResourceService;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::{broadcast, RwLock};
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Loading,
    Ready,
    /// Last load failed; records loaded earlier are kept.
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Message for the UI notification layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

struct State<R> {
    status: Status,
    records: Vec<R>,
    loaded: bool,
}

pub struct Dataset<R: Resource> {
    service: ResourceService<R>,
    state: Arc<RwLock<State<R>>>,
    mounted: Arc<AtomicBool>,
    notices: broadcast::Sender<Notice>,
}

pub type WeeklyDataset = Dataset<WeeklyRecord>;
pub type BonusDataset = Dataset<BonusRecord>;

impl<R: Resource> Clone for Dataset<R> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            state: Arc::clone(&self.state),
            mounted: Arc::clone(&self.mounted),
            notices: self.notices.clone(),
        }
    }
}

impl<R: Resource> Dataset<R> {
    const NOTICE_CAPACITY: usize = 32;

    /// New dataset in `Loading` with nothing fetched yet.
    pub fn new(service: ResourceService<R>) -> Self {
        let (notices, _) = broadcast::channel(Self::NOTICE_CAPACITY);
        Self {
            service,
            state: Arc::new(RwLock::new(State {
                status: Status::Loading,
                records: Vec::new(),
                loaded: false,
            })),
            mounted: Arc::new(AtomicBool::new(true)),
            notices,
        }
    }

    /// Creates the dataset and runs the initial load. A failed load leaves
    /// the dataset in `Error` rather than failing construction.
    pub async fn mount(service: ResourceService<R>) -> Self {
        let dataset = Self::new(service);
        let _ = dataset.refetch().await;
        dataset
    }

    /// Detaches the dataset from its view; calls still in flight will not
    /// touch the records when they settle.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    pub async fn status(&self) -> Status {
        self.state.read().await.status.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.status == Status::Loading
    }

    pub async fn records(&self) -> Vec<R> {
        self.state.read().await.records.clone()
    }

    pub async fn refetch(&self) -> Result<(), StoreError> {
        if !self.is_mounted() {
            return Ok(());
        }
        self.state.write().await.status = Status::Loading;

        let result = self.service.get_all().await;
        if !self.is_mounted() {
            return result.map(|_| ());
        }

        let mut state = self.state.write().await;
        match result {
            Ok(records) => {
                state.records = records;
                state.loaded = true;
                state.status = Status::Ready;
                Ok(())
            }
            Err(err) => {
                let message = err.to_string();
                if !state.loaded {
                    state.records.clear();
                }
                state.status = Status::Error(message.clone());
                drop(state);
                self.notify(NoticeKind::Error, message);
                Err(err)
            }
        }
    }

    /// New records go to the front, matching the newest-first listing.
    pub async fn create(&self, fields: R::Fields) -> Result<R, StoreError> {
        let created = self.settle(self.service.create(fields).await)?;
        if self.is_mounted() {
            self.state.write().await.records.insert(0, created.clone());
            self.notify(NoticeKind::Success, format!("{} added", R::LABEL));
        }
        Ok(created)
    }

    pub async fn update(&self, id: &str, fields: R::Fields) -> Result<R, StoreError> {
        let updated = self.settle(self.service.update(id, fields).await)?;
        if self.is_mounted() {
            let mut state = self.state.write().await;
            if let Some(slot) = state.records.iter_mut().find(|record| record.id() == id) {
                *slot = updated.clone();
            }
            drop(state);
            self.notify(NoticeKind::Success, format!("{} updated", R::LABEL));
        }
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.settle(self.service.delete(id).await)?;
        if self.is_mounted() {
            self.state
                .write()
                .await
                .records
                .retain(|record| record.id() != id);
            self.notify(NoticeKind::Success, format!("{} deleted", R::LABEL));
        }
        info!(resource = R::LABEL, id, "record removed from dataset");
        Ok(())
    }

    /// Reports a failed mutation and hands it back to the caller. The
    /// overall status stays as it was.
    fn settle<T>(&self, result: Result<T, StoreError>) -> Result<T, StoreError> {
        result.inspect_err(|err| {
            error!(resource = R::LABEL, "operation failed: {err}");
            if self.is_mounted() {
                self.notify(NoticeKind::Error, err.to_string());
            }
        })
    }

    fn notify(&self, kind: NoticeKind, message: String) {
        // No subscriber is fine: nobody is showing notifications.
        let _ = self.notices.send(Notice { kind, message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BonusFields;
    use crate::service::BonusesService;
    use crate::store::{LocalStore, RecordStore};
    use async_trait::async_trait;
    use tokio::sync::Notify;

    fn fields(rep: &str, amount: f64) -> BonusFields {
        BonusFields {
            date: "2025-05-01".to_string(),
            rep_name: rep.to_string(),
            bonus_amount: amount,
            notes: String::new(),
        }
    }

    /// Local store whose reads and writes can be switched to fail.
    struct Flaky {
        inner: LocalStore<BonusRecord>,
        failing: AtomicBool,
    }

    impl Flaky {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                inner: LocalStore::in_memory(),
                failing: AtomicBool::new(false),
            })
        }

        fn fail(&self, on: bool) {
            self.failing.store(on, Ordering::SeqCst);
        }

        fn check(&self) -> Result<(), StoreError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(StoreError::Transport("offline".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RecordStore<BonusRecord> for Flaky {
        async fn get_all(&self) -> Result<Vec<BonusRecord>, StoreError> {
            self.check()?;
            self.inner.get_all().await
        }

        async fn create(&self, fields: BonusFields) -> Result<BonusRecord, StoreError> {
            self.check()?;
            self.inner.create(fields).await
        }

        async fn update(&self, id: &str, fields: BonusFields) -> Result<BonusRecord, StoreError> {
            self.check()?;
            self.inner.update(id, fields).await
        }

        async fn delete(&self, id: &str) -> Result<(), StoreError> {
            self.check()?;
            self.inner.delete(id).await
        }
    }

    /// Store whose `create` blocks until released, to model a call that
    /// settles after its view went away.
    struct Gated {
        inner: LocalStore<BonusRecord>,
        release: Notify,
    }

    #[async_trait]
    impl RecordStore<BonusRecord> for Gated {
        async fn get_all(&self) -> Result<Vec<BonusRecord>, StoreError> {
            self.inner.get_all().await
        }

        async fn create(&self, fields: BonusFields) -> Result<BonusRecord, StoreError> {
            self.release.notified().await;
            self.inner.create(fields).await
        }

        async fn update(&self, id: &str, fields: BonusFields) -> Result<BonusRecord, StoreError> {
            self.inner.update(id, fields).await
        }

        async fn delete(&self, id: &str) -> Result<(), StoreError> {
            self.inner.delete(id).await
        }
    }

    #[tokio::test]
    async fn mount_loads_existing_records() {
        let store = Flaky::new();
        store.inner.create(fields("Dana", 10.0)).await.unwrap();
        let dataset = BonusDataset::mount(BonusesService::new(store)).await;
        assert_eq!(dataset.status().await, Status::Ready);
        assert_eq!(dataset.records().await.len(), 1);
    }

    #[tokio::test]
    async fn first_load_failure_enters_error_with_empty_data() {
        let store = Flaky::new();
        store.fail(true);
        let dataset = BonusDataset::new(BonusesService::new(store));
        let mut notices = dataset.subscribe();
        assert!(dataset.is_loading().await);

        assert!(dataset.refetch().await.is_err());
        assert!(matches!(dataset.status().await, Status::Error(_)));
        assert!(dataset.records().await.is_empty());
        assert_eq!(notices.recv().await.unwrap().kind, NoticeKind::Error);
    }

    #[tokio::test]
    async fn later_load_failure_keeps_previous_records() {
        let store = Flaky::new();
        store.inner.create(fields("Dana", 10.0)).await.unwrap();
        let dataset = BonusDataset::mount(BonusesService::new(store.clone())).await;

        store.fail(true);
        assert!(dataset.refetch().await.is_err());
        assert!(matches!(dataset.status().await, Status::Error(_)));
        assert_eq!(dataset.records().await.len(), 1);

        store.fail(false);
        dataset.refetch().await.unwrap();
        assert_eq!(dataset.status().await, Status::Ready);
    }

    #[tokio::test]
    async fn mutations_patch_local_records() {
        let store = Flaky::new();
        let dataset = BonusDataset::mount(BonusesService::new(store)).await;

        let first = dataset.create(fields("A", 1.0)).await.unwrap();
        let second = dataset.create(fields("B", 2.0)).await.unwrap();
        let ids: Vec<_> = dataset.records().await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id.clone(), first.id.clone()]);

        let updated = dataset.update(&first.id, fields("A", 9.0)).await.unwrap();
        assert_eq!(updated.id, first.id);
        let records = dataset.records().await;
        assert_eq!(records[1].bonus_amount, 9.0);

        dataset.delete(&second.id).await.unwrap();
        let records = dataset.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, first.id);
    }

    #[tokio::test]
    async fn failed_mutation_keeps_records_and_status() {
        let store = Flaky::new();
        let dataset = BonusDataset::mount(BonusesService::new(store.clone())).await;
        let kept = dataset.create(fields("A", 1.0)).await.unwrap();
        let mut notices = dataset.subscribe();

        store.fail(true);
        assert!(dataset.create(fields("B", 2.0)).await.is_err());
        assert!(dataset.update(&kept.id, fields("A", 5.0)).await.is_err());
        assert!(dataset.delete(&kept.id).await.is_err());

        assert_eq!(dataset.status().await, Status::Ready);
        assert_eq!(dataset.records().await, vec![kept]);
        assert_eq!(notices.recv().await.unwrap().kind, NoticeKind::Error);
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_without_changing_state() {
        let dataset = BonusDataset::mount(BonusesService::new(Flaky::new())).await;
        let result = dataset.create(fields("", 1.0)).await;
        assert!(matches!(result, Err(StoreError::Validation(_))));
        assert!(dataset.records().await.is_empty());
    }

    #[tokio::test]
    async fn unmounted_dataset_ignores_settled_calls() {
        let store = Arc::new(Gated {
            inner: LocalStore::in_memory(),
            release: Notify::new(),
        });
        let dataset = BonusDataset::mount(BonusesService::new(store.clone())).await;

        let pending = {
            let dataset = dataset.clone();
            tokio::spawn(async move { dataset.create(fields("Late", 3.0)).await })
        };
        tokio::task::yield_now().await;
        dataset.unmount();
        store.release.notify_one();

        let created = pending.await.unwrap().unwrap();
        assert_eq!(created.rep_name, "Late");
        assert!(dataset.records().await.is_empty());
        assert_eq!(store.inner.get_all().await.unwrap().len(), 1);
    }
}
