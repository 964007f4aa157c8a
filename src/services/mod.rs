//! Business logic services

pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod transactions;
pub mod users;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub transactions: transactions::TransactionsService,
    pub dashboard: dashboard::DashboardService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            users: users::UsersService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            transactions: transactions::TransactionsService::new(repository.clone()),
            dashboard: dashboard::DashboardService::new(repository),
        }
    }
}
