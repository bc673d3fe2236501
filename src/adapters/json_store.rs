use crate::core::filter::{name_matches, salary_at_least, salary_at_most};
use crate::domain::model::{
    DeleteOutcome, RecordId, SaveReport, StoreCriteria, StoreDocument, VacancyRecord,
};
use crate::domain::ports::VacancyStore;
use crate::utils::error::{Result, VacancyError};
use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_STORE_PATH: &str = "data/vacancies.json";

/// Vacancy store backed by a single pretty-printed JSON file.
///
/// Every write replaces the file through a sibling temporary file and a
/// rename, so readers see either the old or the new document. Concurrent
/// writers on the same path are not coordinated.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads the document, or `None` when the file does not exist.
    fn load(&self) -> Result<Option<StoreDocument>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(VacancyError::store_io(&self.path, e)),
        };

        if content.trim().is_empty() {
            return Ok(Some(StoreDocument::default()));
        }

        let document: StoreDocument = serde_json::from_str(&content)?;
        Ok(Some(document))
    }

    fn write(&self, document: &StoreDocument) -> Result<()> {
        let json = serde_json::to_string_pretty(document)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| VacancyError::store_io(parent, e))?;
            }
        }

        let tmp = self.temp_path();
        let written = fs::File::create(&tmp).and_then(|mut file| {
            file.write_all(json.as_bytes())?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|_| fs::rename(&tmp, &self.path)) {
            let _ = fs::remove_file(&tmp);
            return Err(VacancyError::store_io(&self.path, e));
        }

        tracing::debug!(
            "Wrote {} vacancies to {}",
            document.items.len(),
            self.path.display()
        );
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "vacancies.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Default for JsonStore {
    fn default() -> Self {
        Self::new(DEFAULT_STORE_PATH)
    }
}

fn matches_criteria(record: &VacancyRecord, criteria: &StoreCriteria) -> bool {
    if let Some(needle) = &criteria.name {
        if !name_matches(&record.name, needle) {
            return false;
        }
    }
    if let Some(min) = criteria.salary_from {
        if !salary_at_least(record.salary_from, min) {
            return false;
        }
    }
    if let Some(max) = criteria.salary_to {
        if !salary_at_most(record.salary_to, max) {
            return false;
        }
    }
    true
}

impl VacancyStore for JsonStore {
    fn save_records(&self, records: Vec<VacancyRecord>) -> Result<SaveReport> {
        let mut document = self.load()?.unwrap_or_default();

        let mut keys: HashSet<(String, String)> = document
            .items
            .iter()
            .map(|item| (item.name.clone(), item.url.clone()))
            .collect();

        let mut added = 0;
        let mut duplicates = 0;
        for record in records {
            let (name, url) = record.natural_key();
            if keys.insert((name.to_string(), url.to_string())) {
                document.items.push(record);
                added += 1;
            } else {
                tracing::debug!("Skipping duplicate vacancy '{}' ({})", name, url);
                duplicates += 1;
            }
        }

        self.write(&document)?;

        tracing::info!(
            "💾 Saved {} new vacancies to {} ({} duplicates, {} total)",
            added,
            self.path.display(),
            duplicates,
            document.items.len()
        );

        Ok(SaveReport {
            added,
            duplicates,
            total: document.items.len(),
        })
    }

    fn get(&self, criteria: &StoreCriteria) -> Result<Vec<VacancyRecord>> {
        let items = self.load()?.unwrap_or_default().items;
        if criteria.is_empty() {
            return Ok(items);
        }

        let matched: Vec<VacancyRecord> = items
            .into_iter()
            .filter(|record| matches_criteria(record, criteria))
            .collect();
        tracing::info!("Found {} stored vacancies matching criteria", matched.len());
        Ok(matched)
    }

    fn delete(&self, id: Option<&RecordId>) -> Result<DeleteOutcome> {
        let Some(mut document) = self.load()? else {
            tracing::debug!("No store at {}, nothing to delete", self.path.display());
            return Ok(DeleteOutcome::NoStore);
        };

        let Some(id) = id else {
            document.items.clear();
            self.write(&document)?;
            tracing::info!("🗑️ Removed all vacancies from {}", self.path.display());
            return Ok(DeleteOutcome::Cleared);
        };

        let before = document.items.len();
        document
            .items
            .retain(|item| !item.id.as_ref().is_some_and(|stored| stored.matches(id)));
        let removed = before - document.items.len();

        if removed == 0 {
            tracing::info!("Vacancy with id {} not found in {}", id, self.path.display());
            return Ok(DeleteOutcome::NotFound);
        }

        self.write(&document)?;
        tracing::info!(
            "🗑️ Removed vacancy with id {} from {}",
            id,
            self.path.display()
        );
        Ok(DeleteOutcome::Removed(removed))
    }

    fn path(&self) -> &Path {
        &self.path
    }
}
