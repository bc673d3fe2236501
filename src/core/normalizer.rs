use crate::domain::model::{Vacancy, VacancyDraft, NO_NAME};
use crate::utils::error::{Result, VacancyError};
use serde_json::{Map, Value};

/// A raw record that could not become a [`Vacancy`].
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    pub index: usize,
    pub reason: String,
    pub raw: Value,
}

#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub vacancies: Vec<Vacancy>,
    pub skipped: Vec<SkippedRecord>,
    pub total: usize,
}

impl Normalized {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Normalizes a raw feed payload, which must be a JSON array.
pub fn normalize(input: &Value) -> Result<Normalized> {
    match input {
        Value::Array(records) => Ok(normalize_records(records)),
        other => Err(VacancyError::MalformedInput {
            message: format!("expected a list of vacancy records, got {}", kind_of(other)),
        }),
    }
}

/// Converts every record it can; bad records are reported in
/// [`Normalized::skipped`] and never abort the batch.
pub fn normalize_records(records: &[Value]) -> Normalized {
    let mut vacancies = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();

    for (index, raw) in records.iter().enumerate() {
        match normalize_record(raw) {
            Ok(vacancy) => vacancies.push(vacancy),
            Err(e) => {
                tracing::warn!("⚠️ Skipping vacancy record #{}: {}", index, e);
                tracing::debug!("Skipped record #{} content: {}", index, raw);
                skipped.push(SkippedRecord {
                    index,
                    reason: e.to_string(),
                    raw: raw.clone(),
                });
            }
        }
    }

    tracing::debug!(
        "Normalized {} of {} records ({} skipped)",
        vacancies.len(),
        records.len(),
        skipped.len()
    );

    Normalized {
        vacancies,
        skipped,
        total: records.len(),
    }
}

pub fn normalize_record(raw: &Value) -> Result<Vacancy> {
    Vacancy::new(extract_draft(raw)?)
}

fn extract_draft(raw: &Value) -> Result<VacancyDraft> {
    let item = raw.as_object().ok_or_else(|| {
        VacancyError::validation("record", format!("expected an object, got {}", kind_of(raw)))
    })?;

    let name = optional_str(item, "name")?.unwrap_or_else(|| NO_NAME.to_string());

    let description = match optional_object(item, "area")? {
        Some(area) => optional_str(area, "name")?,
        None => None,
    };

    let (salary_from, salary_to, currency) = match optional_object(item, "salary")? {
        Some(salary) => (
            optional_int(salary, "from")?,
            optional_int(salary, "to")?,
            optional_str(salary, "currency")?,
        ),
        None => (None, None, None),
    };

    let requirement = match optional_object(item, "snippet")? {
        Some(snippet) => optional_str(snippet, "requirement")?,
        None => None,
    };

    let url = optional_str(item, "url")?;

    // Empty strings are replaced with placeholders by `Vacancy::new`.
    Ok(VacancyDraft {
        name,
        description: description.unwrap_or_default(),
        salary_from,
        salary_to,
        currency: currency.unwrap_or_default(),
        url: url.unwrap_or_default(),
        requirement: requirement.unwrap_or_default(),
    })
}

fn optional_object<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<Option<&'a Map<String, Value>>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(inner)) => Ok(Some(inner)),
        Some(other) => Err(VacancyError::validation(
            key,
            format!("expected an object, got {}", kind_of(other)),
        )),
    }
}

fn optional_str(obj: &Map<String, Value>, key: &str) -> Result<Option<String>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(VacancyError::validation(
            key,
            format!("expected a string, got {}", kind_of(other)),
        )),
    }
}

fn optional_int(obj: &Map<String, Value>, key: &str) -> Result<Option<i64>> {
    match obj.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(|| {
            VacancyError::validation(key, format!("expected an integer, got {}", n))
        }),
        Some(other) => Err(VacancyError::validation(
            key,
            format!("expected an integer, got {}", kind_of(other)),
        )),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
