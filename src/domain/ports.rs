use crate::domain::model::{
    DeleteOutcome, RecordId, SaveReport, StoreCriteria, Vacancy, VacancyRecord,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Source of raw vacancy records for a search keyword.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, keyword: &str) -> Result<Vec<serde_json::Value>>;
}

/// Durable collection of vacancies keyed by `(name, url)`.
///
/// Implementations assume a single writer per backing location.
pub trait VacancyStore: Send + Sync {
    /// Appends vacancies whose natural key is not stored yet.
    fn save(&self, items: &[Vacancy]) -> Result<SaveReport> {
        let records: Vec<VacancyRecord> = items.iter().map(Vacancy::to_record).collect();
        self.save_records(records)
    }

    fn save_records(&self, records: Vec<VacancyRecord>) -> Result<SaveReport>;

    fn get(&self, criteria: &StoreCriteria) -> Result<Vec<VacancyRecord>>;

    /// Removes records carrying `id`, or everything when `id` is `None`.
    fn delete(&self, id: Option<&RecordId>) -> Result<DeleteOutcome>;

    fn path(&self) -> &Path;
}
