use async_trait::async_trait;
use chrono::NaiveDate;

use crate::db::Document;
use crate::errors::AppResult;
use crate::models::{CaseDraft, CaseRecord, CaseStatus};
use crate::store::CaseStore;

#[async_trait]
pub trait CaseRepository: Send + Sync {
    async fn create(&self, draft: &CaseDraft) -> AppResult<String>;
    async fn get_all(&self) -> AppResult<Vec<CaseRecord>>;
    async fn get_one(&self, id: &str) -> AppResult<CaseRecord>;
    async fn update(&self, id: &str, draft: &CaseDraft) -> AppResult<()>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn find_by_title_substring(&self, text: &str) -> AppResult<Vec<CaseRecord>>;
    async fn find_by_status(&self, status: CaseStatus) -> AppResult<Vec<CaseRecord>>;
}

#[derive(Debug, Clone)]
pub struct DocumentCaseRepository {
    store: CaseStore,
}

impl DocumentCaseRepository {
    pub fn new(store: CaseStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CaseRepository for DocumentCaseRepository {
    async fn create(&self, draft: &CaseDraft) -> AppResult<String> {
        draft.validate()?;
        self.store.create(draft)
    }

    async fn get_all(&self) -> AppResult<Vec<CaseRecord>> {
        let docs = self.store.get_all()?;
        Ok(docs.into_iter().map(normalize).collect())
    }

    async fn get_one(&self, id: &str) -> AppResult<CaseRecord> {
        self.store.get_one(id).map(normalize)
    }

    async fn update(&self, id: &str, draft: &CaseDraft) -> AppResult<()> {
        draft.validate()?;
        self.store.update(id, draft)?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.store.delete(id)
    }

    async fn find_by_title_substring(&self, text: &str) -> AppResult<Vec<CaseRecord>> {
        let docs = self.store.find_by_title_substring(text)?;
        Ok(docs.into_iter().map(normalize).collect())
    }

    async fn find_by_status(&self, status: CaseStatus) -> AppResult<Vec<CaseRecord>> {
        let docs = self.store.find_by_status(status)?;
        Ok(docs.into_iter().map(normalize).collect())
    }
}

// Raw documents may predate the current shape; missing or malformed fields
// degrade instead of failing the whole read.
fn normalize(doc: Document) -> CaseRecord {
    CaseRecord {
        id: doc.id,
        title: text_field(&doc.body, "title"),
        description: text_field(&doc.body, "description"),
        status: doc.body["status"]
            .as_str()
            .map(CaseStatus::parse_or_default)
            .unwrap_or_default(),
        start_date: date_field(&doc.body, "startDate"),
        end_date: date_field(&doc.body, "endDate"),
        remark: optional_text(&doc.body, "remark"),
        created_at: doc.created_at,
        updated_at: doc.updated_at,
    }
}

fn text_field(body: &serde_json::Value, key: &str) -> String {
    body[key].as_str().unwrap_or_default().to_string()
}

fn optional_text(body: &serde_json::Value, key: &str) -> Option<String> {
    body[key]
        .as_str()
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

fn date_field(body: &serde_json::Value, key: &str) -> Option<NaiveDate> {
    body[key]
        .as_str()
        .and_then(|value| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::{CaseRepository, DocumentCaseRepository};
    use crate::db::Database;
    use crate::errors::AppError;
    use crate::models::{CaseDraft, CaseStatus};
    use crate::store::{CaseStore, CASES_COLLECTION};
    use chrono::NaiveDate;
    use serde_json::json;
    use std::sync::Arc;

    fn open_repo(dir: &tempfile::TempDir) -> (Arc<Database>, DocumentCaseRepository) {
        let db = Arc::new(Database::new(&dir.path().join("test.db")).expect("db"));
        let repo = DocumentCaseRepository::new(CaseStore::new(db.clone()));
        (db, repo)
    }

    fn sample_draft() -> CaseDraft {
        CaseDraft {
            title: "Invoice #42".to_string(),
            description: "Chase the missing invoice".to_string(),
            status: CaseStatus::Processing,
            start_date: NaiveDate::from_ymd_opt(2026, 3, 1),
            end_date: None,
            remark: Some("client called twice".to_string()),
        }
    }

    #[tokio::test]
    async fn create_then_read_round_trips_every_field() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_db, repo) = open_repo(&dir);

        let draft = sample_draft();
        let id = repo.create(&draft).await.expect("create");
        let record = repo.get_one(&id).await.expect("read back");

        assert_eq!(record.id, id);
        assert_eq!(record.title, draft.title);
        assert_eq!(record.description, draft.description);
        assert_eq!(record.status, draft.status);
        assert_eq!(record.start_date, draft.start_date);
        assert_eq!(record.end_date, draft.end_date);
        assert_eq!(record.remark, draft.remark);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[tokio::test]
    async fn update_with_current_values_only_advances_updated_at() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_db, repo) = open_repo(&dir);

        let id = repo.create(&sample_draft()).await.expect("create");
        let before = repo.get_one(&id).await.expect("read");

        std::thread::sleep(std::time::Duration::from_millis(2));
        repo.update(&id, &CaseDraft::from(&before))
            .await
            .expect("update");
        let after = repo.get_one(&id).await.expect("read again");

        assert_eq!(after.title, before.title);
        assert_eq!(after.description, before.description);
        assert_eq!(after.status, before.status);
        assert_eq!(after.start_date, before.start_date);
        assert_eq!(after.end_date, before.end_date);
        assert_eq!(after.remark, before.remark);
        assert_eq!(after.created_at, before.created_at);
        assert!(after.updated_at > before.updated_at);
    }

    #[tokio::test]
    async fn delete_is_terminal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_db, repo) = open_repo(&dir);

        let id = repo.create(&sample_draft()).await.expect("create");
        repo.delete(&id).await.expect("delete");

        let err = repo.get_one(&id).await.expect_err("should be gone");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn create_rejects_blank_title() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (_db, repo) = open_repo(&dir);

        let draft = CaseDraft {
            title: "   ".to_string(),
            description: "details".to_string(),
            ..CaseDraft::default()
        };
        let err = repo.create(&draft).await.expect_err("should fail");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn malformed_documents_degrade_instead_of_failing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (db, repo) = open_repo(&dir);

        db.insert_document(
            CASES_COLLECTION,
            &json!({
                "title": "legacy",
                "description": "imported from the old tracker",
                "status": "Archived",
                "startDate": "",
                "endDate": "not-a-date",
                "remark": ""
            }),
        )
        .expect("insert raw document");

        let cases = repo.get_all().await.expect("get all");
        assert_eq!(cases.len(), 1);
        assert_eq!(cases[0].status, CaseStatus::Pending);
        assert_eq!(cases[0].start_date, None);
        assert_eq!(cases[0].end_date, None);
        assert_eq!(cases[0].remark, None);
    }
}
