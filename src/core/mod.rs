pub mod etl;
pub mod filter;
pub mod normalizer;

pub use crate::domain::model::{Vacancy, VacancyDraft, VacancyRecord};
pub use crate::domain::ports::{Fetcher, VacancyStore};
pub use crate::utils::error::Result;
