//! Business logic services

pub mod auth;
pub mod catalog;
pub mod loans;
pub mod session;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    renewal::RenewalPolicy,
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub sessions: session::SessionService,
}

impl Services {
    /// Create all services with the given repository and session store
    pub fn new(
        repository: Repository,
        config: &AppConfig,
        session_store: Arc<dyn session::SessionStore>,
    ) -> AppResult<Self> {
        let policy = RenewalPolicy::from_config(&config.loans)
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(Arc::new(repository.loans.clone()), policy),
            sessions: session::SessionService::new(session_store),
        })
    }
}
