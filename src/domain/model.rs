use crate::utils::error::{Result, VacancyError};
use crate::utils::validation::validate_link;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub const DEFAULT_CURRENCY: &str = "RUB";
pub const NO_NAME: &str = "Название не указано";
pub const NO_DESCRIPTION: &str = "Описание отсутствует";
pub const NO_REQUIREMENT: &str = "Информация отсутствует";

/// Unvalidated vacancy fields, as extracted from a raw feed record or a
/// stored record. Salaries are signed so that negative feed values reach
/// validation instead of failing extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VacancyDraft {
    pub name: String,
    pub description: String,
    pub salary_from: Option<i64>,
    pub salary_to: Option<i64>,
    pub currency: String,
    pub url: String,
    pub requirement: String,
}

/// One normalized job posting. Fields are checked once in [`Vacancy::new`]
/// and cannot change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Vacancy {
    name: String,
    description: String,
    salary_from: Option<u64>,
    salary_to: Option<u64>,
    currency: String,
    url: String,
    requirement: String,
}

impl Vacancy {
    pub fn new(draft: VacancyDraft) -> Result<Self> {
        if draft.name.trim().is_empty() {
            return Err(VacancyError::validation("name", "vacancy name must not be empty"));
        }

        let salary_from = non_negative("salary_from", draft.salary_from)?;
        let salary_to = non_negative("salary_to", draft.salary_to)?;
        if let (Some(from), Some(to)) = (salary_from, salary_to) {
            if from > to {
                return Err(VacancyError::validation(
                    "salary_from",
                    format!("salary_from ({}) must not exceed salary_to ({})", from, to),
                ));
            }
        }

        validate_link("url", &draft.url)?;

        Ok(Self {
            name: draft.name,
            description: or_placeholder(draft.description, NO_DESCRIPTION),
            salary_from,
            salary_to,
            currency: or_placeholder(draft.currency, DEFAULT_CURRENCY),
            url: draft.url,
            requirement: or_placeholder(draft.requirement, NO_REQUIREMENT),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn salary_from(&self) -> Option<u64> {
        self.salary_from
    }

    pub fn salary_to(&self) -> Option<u64> {
        self.salary_to
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requirement(&self) -> &str {
        &self.requirement
    }

    /// Mean of both bounds, or the single bound that is present.
    pub fn average_salary(&self) -> Option<f64> {
        match (self.salary_from, self.salary_to) {
            (Some(from), Some(to)) => Some((from as f64 + to as f64) / 2.0),
            (Some(bound), None) | (None, Some(bound)) => Some(bound as f64),
            (None, None) => None,
        }
    }

    pub fn salary_range(&self) -> String {
        match (self.salary_from, self.salary_to) {
            (Some(from), Some(to)) => format!("{} - {} {}", from, to, self.currency),
            (Some(from), None) => format!("От {} {}", from, self.currency),
            (None, Some(to)) => format!("До {} {}", to, self.currency),
            (None, None) => "Не указана".to_string(),
        }
    }

    /// Natural key used by the store for deduplication.
    pub fn natural_key(&self) -> (&str, &str) {
        (&self.name, &self.url)
    }

    pub fn to_record(&self) -> VacancyRecord {
        VacancyRecord {
            id: None,
            name: self.name.clone(),
            description: self.description.clone(),
            salary_from: self.salary_from,
            salary_to: self.salary_to,
            currency: self.currency.clone(),
            url: self.url.clone(),
            requirement: self.requirement.clone(),
            extra: Map::new(),
        }
    }

    /// Rebuilds an entity from a stored record, re-running validation.
    pub fn from_record(record: &VacancyRecord) -> Result<Self> {
        Self::new(VacancyDraft {
            name: record.name.clone(),
            description: record.description.clone(),
            salary_from: record.salary_from.map(to_signed).transpose()?,
            salary_to: record.salary_to.map(to_signed).transpose()?,
            currency: record.currency.clone(),
            url: record.url.clone(),
            requirement: record.requirement.clone(),
        })
    }
}

impl fmt::Display for Vacancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Description: {}", self.description)?;
        writeln!(f, "Salary: {}", self.salary_range())?;
        writeln!(f, "URL: {}", self.url)?;
        write!(f, "Requirement: {}", self.requirement)
    }
}

fn non_negative(field: &str, value: Option<i64>) -> Result<Option<u64>> {
    match value {
        Some(v) if v < 0 => Err(VacancyError::validation(
            field,
            format!("{} must not be negative, got {}", field, v),
        )),
        Some(v) => Ok(Some(v as u64)),
        None => Ok(None),
    }
}

fn to_signed(value: u64) -> Result<i64> {
    i64::try_from(value).map_err(|_| VacancyError::validation("salary", "salary out of range"))
}

fn or_placeholder(value: String, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        value
    }
}

/// Identifier attached to a stored record by an outside collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl RecordId {
    /// Integers are addressed as integers, anything else as text.
    pub fn parse(raw: &str) -> Self {
        raw.parse::<i64>()
            .map(RecordId::Int)
            .unwrap_or_else(|_| RecordId::Text(raw.to_string()))
    }

    /// Ids match on their rendered form, so `12` and `"12"` address the
    /// same record.
    pub fn matches(&self, other: &RecordId) -> bool {
        match (self, other) {
            (RecordId::Int(a), RecordId::Int(b)) => a == b,
            (RecordId::Text(a), RecordId::Text(b)) => a == b,
            (RecordId::Int(n), RecordId::Text(t)) | (RecordId::Text(t), RecordId::Int(n)) => {
                n.to_string() == *t
            }
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

/// Flat stored form of a vacancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VacancyRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(rename = "desc", default)]
    pub description: String,
    #[serde(default)]
    pub salary_from: Option<u64>,
    #[serde(default)]
    pub salary_to: Option<u64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub requirement: String,
    /// Keys written by other tools, carried through rewrites untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VacancyRecord {
    pub fn natural_key(&self) -> (&str, &str) {
        (&self.name, &self.url)
    }

    pub fn with_id(mut self, id: RecordId) -> Self {
        self.id = Some(id);
        self
    }
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Whole store file: `{"items": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub items: Vec<VacancyRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stage 1-3 criteria applied to stored records by `VacancyStore::get`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreCriteria {
    pub name: Option<String>,
    pub salary_from: Option<u64>,
    pub salary_to: Option<u64>,
}

impl StoreCriteria {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.salary_from.is_none() && self.salary_to.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    pub added: usize,
    pub duplicates: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// Matching records were removed.
    Removed(usize),
    /// No record carried the requested id; the store is unchanged.
    NotFound,
    /// Every record was removed.
    Cleared,
    /// There was no store file to delete from.
    NoStore,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> VacancyDraft {
        VacancyDraft {
            name: "Python Developer".to_string(),
            description: "Moscow".to_string(),
            salary_from: Some(100_000),
            salary_to: Some(150_000),
            currency: "RUB".to_string(),
            url: "https://hh.ru/vacancy/123456".to_string(),
            requirement: "3+ years of experience".to_string(),
        }
    }

    #[test]
    fn test_valid_vacancy_keeps_fields() {
        let vacancy = Vacancy::new(draft()).unwrap();
        assert_eq!(vacancy.name(), "Python Developer");
        assert_eq!(vacancy.description(), "Moscow");
        assert_eq!(vacancy.salary_from(), Some(100_000));
        assert_eq!(vacancy.salary_to(), Some(150_000));
        assert_eq!(vacancy.currency(), "RUB");
        assert_eq!(vacancy.url(), "https://hh.ru/vacancy/123456");
        assert_eq!(vacancy.requirement(), "3+ years of experience");
    }

    #[test]
    fn test_empty_optional_fields_get_placeholders() {
        let vacancy = Vacancy::new(VacancyDraft {
            name: "Junior Developer".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(vacancy.description(), NO_DESCRIPTION);
        assert_eq!(vacancy.requirement(), NO_REQUIREMENT);
        assert_eq!(vacancy.currency(), "RUB");
        assert_eq!(vacancy.url(), "");
        assert_eq!(vacancy.salary_from(), None);
        assert_eq!(vacancy.salary_to(), None);
    }

    #[test]
    fn test_rejects_invalid_fields() {
        let cases = [
            VacancyDraft { name: String::new(), ..draft() },
            VacancyDraft { salary_from: Some(-1), ..draft() },
            VacancyDraft { salary_to: Some(-150_000), ..draft() },
            VacancyDraft { salary_from: Some(200_000), salary_to: Some(150_000), ..draft() },
            VacancyDraft { url: "ftp://x".to_string(), ..draft() },
        ];
        for case in cases {
            let err = Vacancy::new(case.clone()).unwrap_err();
            assert!(
                matches!(err, VacancyError::Validation { .. }),
                "expected validation error for {:?}",
                case
            );
        }
    }

    #[test]
    fn test_equal_bounds_are_allowed() {
        let vacancy = Vacancy::new(VacancyDraft {
            salary_from: Some(150_000),
            salary_to: Some(150_000),
            ..draft()
        })
        .unwrap();
        assert_eq!(vacancy.average_salary(), Some(150_000.0));
    }

    #[test]
    fn test_average_salary() {
        let both = Vacancy::new(draft()).unwrap();
        assert_eq!(both.average_salary(), Some(125_000.0));

        let from_only = Vacancy::new(VacancyDraft { salary_to: None, ..draft() }).unwrap();
        assert_eq!(from_only.average_salary(), Some(100_000.0));

        let to_only = Vacancy::new(VacancyDraft { salary_from: None, ..draft() }).unwrap();
        assert_eq!(to_only.average_salary(), Some(150_000.0));

        let none = Vacancy::new(VacancyDraft {
            salary_from: None,
            salary_to: None,
            ..draft()
        })
        .unwrap();
        assert_eq!(none.average_salary(), None);
    }

    #[test]
    fn test_salary_range_text() {
        assert_eq!(Vacancy::new(draft()).unwrap().salary_range(), "100000 - 150000 RUB");
        let from_only = Vacancy::new(VacancyDraft { salary_to: None, ..draft() }).unwrap();
        assert_eq!(from_only.salary_range(), "От 100000 RUB");
        let to_only = Vacancy::new(VacancyDraft { salary_from: None, ..draft() }).unwrap();
        assert_eq!(to_only.salary_range(), "До 150000 RUB");
        let none = Vacancy::new(VacancyDraft {
            salary_from: None,
            salary_to: None,
            ..draft()
        })
        .unwrap();
        assert_eq!(none.salary_range(), "Не указана");
    }

    #[test]
    fn test_record_round_trip() {
        let vacancy = Vacancy::new(VacancyDraft { salary_to: None, ..draft() }).unwrap();
        let record = vacancy.to_record();
        assert_eq!(record.id, None);
        assert_eq!(Vacancy::from_record(&record).unwrap(), vacancy);
    }

    #[test]
    fn test_record_json_shape() {
        let record = Vacancy::new(VacancyDraft { salary_to: None, ..draft() })
            .unwrap()
            .to_record();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["desc"], "Moscow");
        assert!(json["salary_to"].is_null());
        assert!(json.get("id").is_none());

        let with_id = record.with_id(RecordId::Int(7));
        let json = serde_json::to_value(&with_id).unwrap();
        assert_eq!(json["id"], 7);
    }

    #[test]
    fn test_record_id_parse() {
        assert_eq!(RecordId::parse("42"), RecordId::Int(42));
        assert_eq!(RecordId::parse("abc-1"), RecordId::Text("abc-1".to_string()));
    }

    #[test]
    fn test_record_id_matches_across_variants() {
        let stored = RecordId::Text("93353083".to_string());
        assert!(stored.matches(&RecordId::parse("93353083")));
        assert!(RecordId::Int(7).matches(&RecordId::Int(7)));
        assert!(!stored.matches(&RecordId::Int(93353084)));
        assert!(!RecordId::Text("007".to_string()).matches(&RecordId::Int(7)));
    }

    #[test]
    fn test_record_keeps_unknown_keys() {
        let raw = r#"{"id":"5","name":"A","url":"","employer":"ACME","area":{"id":1}}"#;
        let record: VacancyRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.extra["employer"], "ACME");
        assert!(!record.extra.contains_key("name"));

        let written = serde_json::to_value(&record).unwrap();
        assert_eq!(written["employer"], "ACME");
        assert_eq!(written["area"]["id"], 1);
        assert_eq!(written["id"], "5");
    }
}
