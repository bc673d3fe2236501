pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::AppConfig;

pub use adapters::{HhFetcher, JsonStore};
pub use core::{
    etl::{RunSummary, VacancyEngine},
    filter::{FilterOutcome, FilterParams, FilterPipeline, ParamDiagnostic},
    normalizer::{normalize, normalize_records, Normalized, SkippedRecord},
};
pub use domain::model::{
    DeleteOutcome, RecordId, SaveReport, StoreCriteria, Vacancy, VacancyDraft, VacancyRecord,
};
pub use domain::ports::{Fetcher, VacancyStore};
pub use utils::error::{Result, VacancyError};
