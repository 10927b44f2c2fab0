//! Composition root for the client side: one session, one local cache and
//! one fallback store per resource, wired explicitly instead of through
//! globals so tests can swap any piece.

use crate::config::ClientConfig;
use crate::dataset::{BonusDataset, Dataset, WeeklyDataset};
use crate::errors::StoreError;
use crate::models::User;
use crate::remote::{AuthClient, RemoteStore, Session};
use crate::resource::Resource;
use crate::service::{BonusesService, ResourceService, WeeklyDataService};
use crate::storage::KeyValueStore;
use crate::store::{FallbackStore, LocalStore, RecordStore};
use std::sync::Arc;
use tracing::info;

pub struct LedgerClient {
    session: Session,
    auth: Option<AuthClient>,
    weekly_data: WeeklyDataService,
    bonuses: BonusesService,
}

impl LedgerClient {
    pub async fn connect(config: &ClientConfig) -> Self {
        let kv = match &config.cache_path {
            Some(path) => KeyValueStore::open(path).await,
            None => KeyValueStore::in_memory(),
        };
        let kv = Arc::new(kv);
        let session = Session::default();
        let http = reqwest::Client::new();
        let base_url = config.api_base_url.as_deref();

        info!(
            offline = config.is_offline(),
            durable_cache = kv.is_durable(),
            "client configured"
        );

        Self {
            auth: base_url.map(|url| AuthClient::new(http.clone(), url, session.clone())),
            weekly_data: ResourceService::new(fallback_store(base_url, &http, &kv, &session)),
            bonuses: ResourceService::new(fallback_store(base_url, &http, &kv, &session)),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, StoreError> {
        match &self.auth {
            Some(auth) => auth.login(email, password).await,
            None => Err(StoreError::Transport(
                "API not available - working in offline mode".to_string(),
            )),
        }
    }

    pub async fn logout(&self) {
        match &self.auth {
            Some(auth) => auth.logout().await,
            None => self.session.clear().await,
        }
    }

    pub fn weekly_data(&self) -> &WeeklyDataService {
        &self.weekly_data
    }

    pub fn bonuses(&self) -> &BonusesService {
        &self.bonuses
    }

    pub async fn weekly_dataset(&self) -> WeeklyDataset {
        Dataset::mount(self.weekly_data.clone()).await
    }

    pub async fn bonus_dataset(&self) -> BonusDataset {
        Dataset::mount(self.bonuses.clone()).await
    }
}

fn fallback_store<R: Resource>(
    base_url: Option<&str>,
    http: &reqwest::Client,
    kv: &Arc<KeyValueStore>,
    session: &Session,
) -> Arc<dyn RecordStore<R>> {
    let remote = base_url.map(|url| {
        let store = RemoteStore::<R>::new(http.clone(), url, session.clone());
        Arc::new(store) as Arc<dyn RecordStore<R>>
    });
    Arc::new(FallbackStore::new(
        remote,
        LocalStore::new(Arc::clone(kv)),
        session.clone(),
    ))
}
