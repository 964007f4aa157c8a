//! Dashboard aggregation service

use chrono::{Duration, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, models::transaction::TransactionStatus, repository::Repository};

/// Window used to decide whether a member is active
const ACTIVE_MEMBER_DAYS: i64 = 30;

/// Aggregate library figures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_books: i64,
    /// Transactions currently in status borrowed
    pub borrowed_books: i64,
    /// Transactions currently in status reserved
    pub reserved_books: i64,
    pub total_users: i64,
    /// Distinct users with a transaction in the last 30 days
    pub active_members: i64,
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
}

impl DashboardService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn get_metrics(&self) -> AppResult<DashboardMetrics> {
        let since = Utc::now() - Duration::days(ACTIVE_MEMBER_DAYS);
        let transactions = &self.repository.transactions;

        let (total_books, borrowed_books, reserved_books, total_users, active_members) = tokio::try_join!(
            self.repository.books.count(),
            transactions.count_by_status(TransactionStatus::Borrowed),
            transactions.count_by_status(TransactionStatus::Reserved),
            self.repository.users.count(),
            transactions.count_distinct_users_since(since),
        )?;

        Ok(DashboardMetrics {
            total_books,
            borrowed_books,
            reserved_books,
            total_users,
            active_members,
        })
    }
}
