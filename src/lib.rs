pub mod auth;
pub mod db;
pub mod errors;
pub mod filter;
pub mod models;
pub mod notify;
pub mod repo;
pub mod store;
pub mod view;

use std::path::Path;
use std::sync::{Arc, OnceLock};

use tracing_appender::non_blocking::WorkerGuard;

use crate::db::Database;
use crate::store::CaseStore;

pub use crate::auth::{IdentityProvider, Principal, StaticIdentity};
pub use crate::errors::{AppError, AppResult};
pub use crate::models::{CaseDraft, CaseRecord, CaseStats, CaseStatus, StatusFilter};
pub use crate::notify::{Notifier, Severity, TracingNotifier};
pub use crate::repo::{CaseRepository, DocumentCaseRepository};
pub use crate::view::{CaseListView, DashboardView, LaunchAction, LoadState, Modal};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Clone)]
pub struct CaseApp {
    repo: Arc<DocumentCaseRepository>,
    notifier: Arc<dyn Notifier>,
    identity: Arc<dyn IdentityProvider>,
}

impl CaseApp {
    pub fn new(
        data_dir: &Path,
        notifier: Arc<dyn Notifier>,
        identity: Arc<dyn IdentityProvider>,
    ) -> AppResult<Self> {
        let db = Arc::new(Database::new(&data_dir.join("cases.sqlite"))?);
        let repo = Arc::new(DocumentCaseRepository::new(CaseStore::new(db)));
        Ok(Self {
            repo,
            notifier,
            identity,
        })
    }

    pub fn case_list_view(&self) -> CaseListView<DocumentCaseRepository> {
        CaseListView::new(self.repo.clone(), self.notifier.clone())
    }

    pub fn dashboard_view(&self) -> DashboardView<DocumentCaseRepository> {
        DashboardView::new(self.repo.clone(), self.notifier.clone())
    }

    pub fn repository(&self) -> Arc<DocumentCaseRepository> {
        self.repo.clone()
    }

    pub fn current_principal(&self) -> Option<Principal> {
        self.identity.current_principal()
    }

    pub fn sign_out(&self) {
        self.identity.sign_out()
    }
}

pub fn init_tracing(data_dir: &Path) -> AppResult<()> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "casedesk.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| AppError::Internal(error.to_string()))
}
