use crate::auth::TokenRegistry;
use crate::config::AdminAccount;
use crate::models::{BonusRecord, WeeklyRecord};
use crate::store::{LocalStore, RecordStore};
use crate::storage::KeyValueStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub weekly: Arc<dyn RecordStore<WeeklyRecord>>,
    pub bonuses: Arc<dyn RecordStore<BonusRecord>>,
    pub admin: Arc<AdminAccount>,
    pub tokens: Arc<TokenRegistry>,
}

impl AppState {
    /// Both resources persisted side by side in one key-value document.
    pub fn new(kv: Arc<KeyValueStore>, admin: AdminAccount) -> Self {
        Self::with_stores(
            Arc::new(LocalStore::<WeeklyRecord>::new(Arc::clone(&kv))),
            Arc::new(LocalStore::<BonusRecord>::new(kv)),
            admin,
        )
    }

    pub fn with_stores(
        weekly: Arc<dyn RecordStore<WeeklyRecord>>,
        bonuses: Arc<dyn RecordStore<BonusRecord>>,
        admin: AdminAccount,
    ) -> Self {
        Self {
            weekly,
            bonuses,
            admin: Arc::new(admin),
            tokens: Arc::new(TokenRegistry::default()),
        }
    }
}
