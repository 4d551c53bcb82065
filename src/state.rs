use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{MemoryCache, TtlCache};
use crate::config::Config;
use crate::db::{Store, UserRepository};
use crate::facade::{AuthFacade, CatalogFacade, UserFacade};
use crate::mail::{self, MailNotifier, MailTemplates, MailTransport};
use crate::security::{Argon2Hasher, JwtTokenIssuer, PasswordHasher, TokenIssuer};
use crate::services::{
    CacheOtpService, SeaOrmAuthService, SeaOrmAuthorService, SeaOrmBookService,
    SeaOrmUserService, UserService,
};

/// Everything a request handler can reach, built once at startup.
pub struct SharedState {
    pub config: Config,

    pub store: Store,

    pub otp_cache: Arc<dyn TtlCache>,

    pub tokens: Arc<dyn TokenIssuer>,

    pub user_service: Arc<dyn UserService>,

    pub auth_facade: AuthFacade,

    pub user_facade: UserFacade,

    pub catalog_facade: CatalogFacade,
}

impl SharedState {
    pub async fn new(config: Config) -> Result<Self> {
        let transport = mail::transport_from_config(&config.mail)?;
        Self::with_transport(config, transport).await
    }

    /// Same as [`SharedState::new`] but delivers mail through `transport`.
    pub async fn with_transport(config: Config, transport: Arc<dyn MailTransport>) -> Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await
        .context("Failed to open database")?;

        let users: Arc<dyn UserRepository> = Arc::new(store.users());
        let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new(&config.security)?);
        let tokens: Arc<dyn TokenIssuer> = Arc::new(JwtTokenIssuer::new(
            &config.auth.jwt_secret,
            Duration::from_secs(config.auth.token_duration_seconds),
        ));
        let otp_cache: Arc<dyn TtlCache> = Arc::new(MemoryCache::new());

        let mail = Arc::new(MailNotifier::new(
            transport,
            MailTemplates::load()?,
            &config.mail.domain,
        ));

        let user_service: Arc<dyn UserService> =
            Arc::new(SeaOrmUserService::new(users.clone(), hasher.clone()));

        let auth_facade = AuthFacade::new(
            Arc::new(SeaOrmAuthService::new(users, hasher, tokens.clone())),
            Arc::new(CacheOtpService::new(otp_cache.clone(), &config.auth)),
            user_service.clone(),
            mail,
        );
        let user_facade = UserFacade::new(user_service.clone());
        let catalog_facade = CatalogFacade::new(
            Arc::new(SeaOrmAuthorService::new(store.clone())),
            Arc::new(SeaOrmBookService::new(store.clone())),
        );

        Ok(Self {
            config,
            store,
            otp_cache,
            tokens,
            user_service,
            auth_facade,
            user_facade,
            catalog_facade,
        })
    }
}
