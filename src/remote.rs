use crate::errors::StoreError;
use crate::models::{ErrorResponse, LoginRequest, LoginResponse, User};
use crate::resource::Resource;
use crate::store::{not_found, RecordStore};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::{marker::PhantomData, sync::Arc};
use tokio::sync::RwLock;
use tracing::{info, warn};

#[derive(Debug, Clone)]
struct SignedIn {
    token: String,
    user: Option<User>,
}

/// Bearer token shared by every remote store of one client. Cleared when
/// the API answers 401, which sends the user back to the login screen.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<Option<SignedIn>>>,
}

impl Session {
    pub async fn set_token(&self, token: impl Into<String>) {
        *self.inner.write().await = Some(SignedIn {
            token: token.into(),
            user: None,
        });
    }

    pub async fn sign_in(&self, response: LoginResponse) {
        *self.inner.write().await = Some(SignedIn {
            token: response.token,
            user: Some(response.user),
        });
    }

    pub async fn clear(&self) {
        *self.inner.write().await = None;
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.read().await.as_ref().map(|state| state.token.clone())
    }

    pub async fn user(&self) -> Option<User> {
        self.inner
            .read()
            .await
            .as_ref()
            .and_then(|state| state.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_some()
    }
}

/// CRUD over `{base_url}{R::PATH}` with snake_case rows on the wire.
pub struct RemoteStore<R> {
    client: Client,
    base_url: String,
    session: Session,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> RemoteStore<R> {
    pub fn new(client: Client, base_url: &str, session: Session) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
            _resource: PhantomData,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}{}", self.base_url, R::PATH)
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url(), id)
    }

    async fn send(
        &self,
        request: RequestBuilder,
        id: Option<&str>,
    ) -> Result<Response, StoreError> {
        let token = self
            .session
            .token()
            .await
            .ok_or_else(|| StoreError::Auth("not signed in".to_string()))?;
        let response = request.bearer_auth(token).send().await.map_err(|err| {
            warn!(resource = R::LABEL, "API request failed: {err}");
            StoreError::Transport(err.to_string())
        })?;
        check_status(response, &self.session, |message| match id {
            Some(id) => not_found::<R>(id),
            None => StoreError::Transport(message),
        })
        .await
    }
}

async fn check_status(
    response: Response,
    session: &Session,
    on_not_found: impl FnOnce(String) -> StoreError,
) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        session.clear().await;
        warn!("API rejected the session token, signing out");
        return Err(StoreError::Auth("Authentication required".to_string()));
    }

    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => format!("HTTP error! status: {status}"),
    };
    Err(match status {
        StatusCode::NOT_FOUND => on_not_found(message),
        StatusCode::BAD_REQUEST => StoreError::Validation(message),
        _ => StoreError::Transport(message),
    })
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    response
        .json()
        .await
        .map_err(|err| StoreError::Transport(err.to_string()))
}

#[async_trait]
impl<R: Resource> RecordStore<R> for RemoteStore<R> {
    async fn get_all(&self) -> Result<Vec<R>, StoreError> {
        let response = self
            .send(self.client.get(self.collection_url()), None)
            .await?;
        let rows: Vec<R::Row> = decode(response).await?;
        Ok(rows.into_iter().map(R::from_row).collect())
    }

    async fn create(&self, fields: R::Fields) -> Result<R, StoreError> {
        let body = R::fields_to_row(fields);
        let response = self
            .send(self.client.post(self.collection_url()).json(&body), None)
            .await?;
        Ok(R::from_row(decode(response).await?))
    }

    async fn update(&self, id: &str, fields: R::Fields) -> Result<R, StoreError> {
        let body = R::fields_to_row(fields);
        let response = self
            .send(self.client.put(self.item_url(id)).json(&body), Some(id))
            .await?;
        Ok(R::from_row(decode(response).await?))
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.send(self.client.delete(self.item_url(id)), Some(id))
            .await?;
        Ok(())
    }
}

/// Login/logout against `/auth/*`, writing the outcome into the session.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    base_url: String,
    session: Session,
}

impl AuthClient {
    pub fn new(client: Client, base_url: &str, session: Session) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, StoreError> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .post(format!("{}/auth/login", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<ErrorResponse>().await {
                Ok(body) => body.error,
                Err(_) => format!("HTTP error! status: {status}"),
            };
            return Err(match status {
                StatusCode::BAD_REQUEST => StoreError::Validation(message),
                StatusCode::UNAUTHORIZED => StoreError::Auth(message),
                _ => StoreError::Transport(message),
            });
        }

        let login: LoginResponse = decode(response).await?;
        let user = login.user.clone();
        self.session.sign_in(login).await;
        info!(email = %user.email, "signed in");
        Ok(user)
    }

    /// Revokes the token server-side when possible; the local session is
    /// cleared either way.
    pub async fn logout(&self) {
        if let Some(token) = self.session.token().await {
            let result = self
                .client
                .post(format!("{}/auth/logout", self.base_url))
                .bearer_auth(token)
                .send()
                .await;
            if let Err(err) = result {
                warn!("logout request failed: {err}");
            }
        }
        self.session.clear().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeeklyRecord;

    #[tokio::test]
    async fn session_tracks_sign_in_and_clear() {
        let session = Session::default();
        assert!(!session.is_authenticated().await);

        session
            .sign_in(LoginResponse {
                token: "abc".to_string(),
                user: User {
                    id: "1".to_string(),
                    email: "admin@company.com".to_string(),
                    name: "Administrator".to_string(),
                },
            })
            .await;
        assert_eq!(session.token().await.as_deref(), Some("abc"));
        assert_eq!(
            session.user().await.map(|user| user.name).as_deref(),
            Some("Administrator")
        );

        let shared = session.clone();
        shared.clear().await;
        assert!(!session.is_authenticated().await);
    }

    #[tokio::test]
    async fn remote_without_token_fails_before_network() {
        let store: RemoteStore<WeeklyRecord> =
            RemoteStore::new(Client::new(), "http://127.0.0.1:9/", Session::default());
        assert_eq!(store.collection_url(), "http://127.0.0.1:9/weekly-data");
        assert_eq!(store.item_url("x1"), "http://127.0.0.1:9/weekly-data/x1");
        assert!(matches!(store.get_all().await, Err(StoreError::Auth(_))));
    }
}
