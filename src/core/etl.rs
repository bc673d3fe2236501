use crate::core::filter::{FilterPipeline, ParamDiagnostic};
use crate::core::normalizer::normalize_records;
use crate::domain::model::Vacancy;
use crate::domain::ports::{Fetcher, VacancyStore};
use crate::utils::error::Result;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub fetched: usize,
    pub normalized: usize,
    pub skipped: usize,
    pub selected: Vec<Vacancy>,
    pub diagnostics: Vec<ParamDiagnostic>,
    pub added: usize,
    pub duplicates: usize,
    pub store_path: PathBuf,
}

pub struct VacancyEngine<F: Fetcher, S: VacancyStore> {
    fetcher: F,
    store: S,
}

impl<F: Fetcher, S: VacancyStore> VacancyEngine<F, S> {
    pub fn new(fetcher: F, store: S) -> Self {
        Self { fetcher, store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn run(&self, keyword: &str, pipeline: &FilterPipeline) -> Result<RunSummary> {
        tracing::info!("🚀 Searching vacancies for '{}'", keyword);

        // Extract
        let raw = self.fetcher.fetch(keyword).await?;

        // Transform
        let normalized = normalize_records(&raw);
        if normalized.skipped_count() > 0 {
            tracing::warn!(
                "Skipped {} of {} records that failed validation",
                normalized.skipped_count(),
                normalized.total
            );
        }
        let outcome = pipeline.apply(&normalized.vacancies);
        tracing::info!(
            "🔎 {} vacancies selected from {} normalized",
            outcome.vacancies.len(),
            normalized.vacancies.len()
        );

        // Load
        let report = self.store.save(&outcome.vacancies)?;

        Ok(RunSummary {
            fetched: raw.len(),
            normalized: normalized.vacancies.len(),
            skipped: normalized.skipped_count(),
            selected: outcome.vacancies,
            diagnostics: outcome.diagnostics,
            added: report.added,
            duplicates: report.duplicates,
            store_path: self.store.path().to_path_buf(),
        })
    }
}
