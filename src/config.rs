use std::{env, path::PathBuf};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/state.json";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub data_path: PathBuf,
    pub admin: AdminAccount,
}

/// The single account allowed to sign in.
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl Default for AdminAccount {
    fn default() -> Self {
        Self {
            email: "admin@company.com".to_string(),
            password: "Admin123!".to_string(),
            name: "Administrator".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let defaults = AdminAccount::default();
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|value| value.parse::<u16>().ok())
                .unwrap_or(DEFAULT_PORT),
            data_path: resolve_data_path(),
            admin: AdminAccount {
                email: non_empty_var("APP_ADMIN_EMAIL").unwrap_or(defaults.email),
                password: non_empty_var("APP_ADMIN_PASSWORD").unwrap_or(defaults.password),
                name: non_empty_var("APP_ADMIN_NAME").unwrap_or(defaults.name),
            },
        }
    }
}

pub fn resolve_data_path() -> PathBuf {
    non_empty_var("APP_DATA_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH))
}

/// Client side: no API URL means offline mode, no cache path means the
/// local tier only lives in memory.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub api_base_url: Option<String>,
    pub cache_path: Option<PathBuf>,
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self {
            api_base_url: non_empty_var("APP_API_URL"),
            cache_path: non_empty_var("APP_CACHE_PATH").map(PathBuf::from),
        }
    }

    pub fn is_offline(&self) -> bool {
        self.api_base_url.is_none()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
