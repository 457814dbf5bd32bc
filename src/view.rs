use std::future::Future;
use std::sync::Arc;

use tokio::time::{timeout, Duration};

use crate::errors::{AppError, AppResult};
use crate::filter::{case_stats, visible_cases};
use crate::models::{CaseDraft, CaseRecord, CaseStats, StatusFilter};
use crate::notify::{Notifier, Severity};
use crate::repo::CaseRepository;

pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(30);

const RECENT_CASE_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    None,
    Create,
    Edit(CaseRecord),
    View(CaseRecord),
    ConfirmDelete(CaseRecord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchAction {
    OpenCreate,
}

pub fn launch_action(query: &str) -> Option<LaunchAction> {
    query
        .trim_start_matches('?')
        .split('&')
        .any(|pair| pair == "action=add")
        .then_some(LaunchAction::OpenCreate)
}

async fn run_with_timeout<T>(
    op_timeout: Duration,
    operation: &str,
    fut: impl Future<Output = AppResult<T>>,
) -> AppResult<T> {
    match timeout(op_timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::Timeout(format!(
            "{} did not complete within {:?}",
            operation, op_timeout
        ))),
    }
}

// ─── Case List ──────────────────────────────────────────────────────────────

pub struct CaseListView<R> {
    repo: Arc<R>,
    notifier: Arc<dyn Notifier>,
    op_timeout: Duration,
    load_state: LoadState,
    cases: Vec<CaseRecord>,
    visible: Vec<CaseRecord>,
    search_term: String,
    status_filter: StatusFilter,
    modal: Modal,
    submitting: bool,
}

impl<R: CaseRepository> CaseListView<R> {
    pub fn new(repo: Arc<R>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repo,
            notifier,
            op_timeout: DEFAULT_OP_TIMEOUT,
            load_state: LoadState::Loading,
            cases: Vec::new(),
            visible: Vec::new(),
            search_term: String::new(),
            status_filter: StatusFilter::All,
            modal: Modal::None,
            submitting: false,
        }
    }

    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    // The query-string signal is consumed here once; it is never re-applied.
    pub async fn mount(&mut self, query: &str) {
        if launch_action(query) == Some(LaunchAction::OpenCreate) {
            self.modal = Modal::Create;
        }
        self.reload().await;
    }

    pub async fn reload(&mut self) {
        self.load_state = LoadState::Loading;
        let repo = self.repo.clone();
        let result = run_with_timeout(self.op_timeout, "load cases", repo.get_all()).await;
        match result {
            Ok(cases) => self.cases = cases,
            Err(error) => {
                tracing::warn!(error = %error, "case load failed");
                self.cases = Vec::new();
                self.notifier.notify("Failed to load cases", Severity::Error);
            }
        }
        self.load_state = LoadState::Ready;
        self.refresh_visible();
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.refresh_visible();
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        self.status_filter = filter;
        self.refresh_visible();
    }

    pub fn open_create(&mut self) {
        self.modal = Modal::Create;
    }

    pub fn open_edit(&mut self, case: CaseRecord) {
        self.modal = Modal::Edit(case);
    }

    pub fn open_view(&mut self, case: CaseRecord) {
        self.modal = Modal::View(case);
    }

    // First of the two distinct actions a delete requires.
    pub fn request_delete(&mut self, case: CaseRecord) {
        self.modal = Modal::ConfirmDelete(case);
    }

    pub fn close_modal(&mut self) {
        self.modal = Modal::None;
    }

    pub async fn submit_create(&mut self, draft: CaseDraft) {
        if self.submitting {
            return;
        }
        self.submitting = true;

        let repo = self.repo.clone();
        let result =
            run_with_timeout(self.op_timeout, "create case", repo.create(&draft)).await;
        match result {
            Ok(_) => {
                self.notifier
                    .notify("Case created successfully", Severity::Success);
                self.modal = Modal::None;
                self.reload().await;
            }
            Err(error) => {
                tracing::warn!(error = %error, "case create failed");
                self.notifier.notify("Failed to create case", Severity::Error);
            }
        }
        self.submitting = false;
    }

    pub async fn submit_update(&mut self, draft: CaseDraft) {
        if self.submitting {
            return;
        }
        let Modal::Edit(selected) = &self.modal else {
            return;
        };
        let id = selected.id.clone();
        self.submitting = true;

        let repo = self.repo.clone();
        let result =
            run_with_timeout(self.op_timeout, "update case", repo.update(&id, &draft)).await;
        match result {
            Ok(()) => {
                self.notifier
                    .notify("Case updated successfully", Severity::Success);
                self.modal = Modal::None;
                self.reload().await;
            }
            Err(error) => {
                tracing::warn!(error = %error, case_id = %id, "case update failed");
                self.notifier.notify("Failed to update case", Severity::Error);
            }
        }
        self.submitting = false;
    }

    // Only fires from the confirm modal.
    pub async fn confirm_delete(&mut self) {
        if self.submitting {
            return;
        }
        let Modal::ConfirmDelete(selected) = &self.modal else {
            return;
        };
        let id = selected.id.clone();
        self.submitting = true;

        let repo = self.repo.clone();
        let result = run_with_timeout(self.op_timeout, "delete case", repo.delete(&id)).await;
        match result {
            Ok(()) => {
                self.notifier
                    .notify("Case deleted successfully", Severity::Success);
                self.modal = Modal::None;
                self.reload().await;
            }
            Err(error) => {
                tracing::warn!(error = %error, case_id = %id, "case delete failed");
                self.notifier.notify("Failed to delete case", Severity::Error);
            }
        }
        self.submitting = false;
    }

    fn refresh_visible(&mut self) {
        self.visible = visible_cases(&self.cases, &self.search_term, self.status_filter);
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn cases(&self) -> &[CaseRecord] {
        &self.cases
    }

    pub fn visible(&self) -> &[CaseRecord] {
        &self.visible
    }

    pub fn total_count(&self) -> usize {
        self.cases.len()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn status_filter(&self) -> StatusFilter {
        self.status_filter
    }

    pub fn modal(&self) -> &Modal {
        &self.modal
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }
}

// ─── Dashboard ──────────────────────────────────────────────────────────────

pub struct DashboardView<R> {
    repo: Arc<R>,
    notifier: Arc<dyn Notifier>,
    op_timeout: Duration,
    load_state: LoadState,
    cases: Vec<CaseRecord>,
    stats: CaseStats,
}

impl<R: CaseRepository> DashboardView<R> {
    pub fn new(repo: Arc<R>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repo,
            notifier,
            op_timeout: DEFAULT_OP_TIMEOUT,
            load_state: LoadState::Loading,
            cases: Vec::new(),
            stats: CaseStats::default(),
        }
    }

    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    pub async fn reload(&mut self) {
        self.load_state = LoadState::Loading;
        let repo = self.repo.clone();
        let result = run_with_timeout(self.op_timeout, "load dashboard", repo.get_all()).await;
        match result {
            Ok(cases) => self.cases = cases,
            Err(error) => {
                tracing::warn!(error = %error, "dashboard load failed");
                self.cases = Vec::new();
                self.notifier.notify("Failed to load cases", Severity::Error);
            }
        }
        self.stats = case_stats(&self.cases);
        self.load_state = LoadState::Ready;
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn cases(&self) -> &[CaseRecord] {
        &self.cases
    }

    pub fn stats(&self) -> CaseStats {
        self.stats
    }

    pub fn recent(&self) -> &[CaseRecord] {
        let end = self.cases.len().min(RECENT_CASE_LIMIT);
        &self.cases[..end]
    }
}
