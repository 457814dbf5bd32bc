use std::sync::Arc;

use crate::db::{Database, Document};
use crate::errors::{AppError, AppResult};
use crate::models::{CaseDraft, CaseStatus};

pub const CASES_COLLECTION: &str = "cases";

#[derive(Debug, Clone)]
pub struct CaseStore {
    db: Arc<Database>,
}

impl CaseStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn create(&self, draft: &CaseDraft) -> AppResult<String> {
        let body = serde_json::to_value(draft)?;
        let doc = self.db.insert_document(CASES_COLLECTION, &body)?;
        Ok(doc.id)
    }

    pub fn get_all(&self) -> AppResult<Vec<Document>> {
        self.db.list_documents(CASES_COLLECTION)
    }

    pub fn get_one(&self, id: &str) -> AppResult<Document> {
        self.db
            .get_document(CASES_COLLECTION, id)?
            .ok_or_else(|| AppError::NotFound(format!("Case {} not found", id)))
    }

    pub fn update(&self, id: &str, draft: &CaseDraft) -> AppResult<Document> {
        let fields = serde_json::to_value(draft)?;
        self.db.update_document(CASES_COLLECTION, id, &fields)
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        self.db.delete_document(CASES_COLLECTION, id)
    }

    // Linear scan over the full set.
    pub fn find_by_title_substring(&self, text: &str) -> AppResult<Vec<Document>> {
        let needle = text.to_lowercase();
        let docs = self.get_all()?;
        Ok(docs
            .into_iter()
            .filter(|doc| {
                doc.body["title"]
                    .as_str()
                    .is_some_and(|title| title.to_lowercase().contains(&needle))
            })
            .collect())
    }

    pub fn find_by_status(&self, status: CaseStatus) -> AppResult<Vec<Document>> {
        self.db
            .query_equal(CASES_COLLECTION, "status", status.as_str())
    }
}
