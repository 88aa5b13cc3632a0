use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::users::{MemoryUserStore, UserStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub keys: JwtKeys,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let users = Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>;
        Ok(Self::from_parts(config, users))
    }

    pub fn from_parts(config: AppConfig, users: Arc<dyn UserStore>) -> Self {
        let keys = JwtKeys::new(&config.jwt);
        Self {
            config: Arc::new(config),
            users,
            keys,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{JwtConfig, DEFAULT_ISSUER, DEFAULT_MAX_AGE_MONTHS};

        let config = AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: DEFAULT_ISSUER.into(),
                max_age_months: DEFAULT_MAX_AGE_MONTHS,
            },
        };
        Self::from_parts(config, Arc::new(MemoryUserStore::new()))
    }
}
