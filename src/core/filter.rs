use crate::domain::model::Vacancy;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::fmt;

/// Query parameters recognized by the filter pipeline.
///
/// Numeric values are kept signed so that bad query input can be reported
/// and skipped by the stage that would use it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterParams {
    pub name: Option<String>,
    pub salary_from: Option<i64>,
    pub salary_to: Option<i64>,
    pub sorted_salary_from: bool,
    pub sorted_salary_to: bool,
    pub sorted_avg_salary_asc: bool,
    pub sorted_avg_salary_desc: bool,
    pub top_n: Option<i64>,
}

impl FilterParams {
    /// Reads the recognized keys from a parameter mapping. Unknown keys are
    /// ignored; values of the wrong type are dropped with a diagnostic.
    pub fn from_map(map: &Map<String, Value>) -> (Self, Vec<ParamDiagnostic>) {
        let mut diagnostics = Vec::new();
        let mut params = FilterParams::default();

        for (key, value) in map {
            if value.is_null() {
                continue;
            }
            match key.as_str() {
                "name" => match value.as_str() {
                    Some(name) => params.name = Some(name.to_string()),
                    None => diagnostics.push(ParamDiagnostic::new(key, "expected a string")),
                },
                "salary_from" => params.salary_from = read_int(key, value, &mut diagnostics),
                "salary_to" => params.salary_to = read_int(key, value, &mut diagnostics),
                "top_n" => params.top_n = read_int(key, value, &mut diagnostics),
                "sorted_salary_from" => {
                    params.sorted_salary_from = read_flag(key, value, &mut diagnostics)
                }
                "sorted_salary_to" => params.sorted_salary_to = read_flag(key, value, &mut diagnostics),
                "sorted_avg_salary_asc" => {
                    params.sorted_avg_salary_asc = read_flag(key, value, &mut diagnostics)
                }
                "sorted_avg_salary_desc" => {
                    params.sorted_avg_salary_desc = read_flag(key, value, &mut diagnostics)
                }
                _ => tracing::debug!("Ignoring unrecognized filter parameter `{}`", key),
            }
        }

        (params, diagnostics)
    }

    /// Fills every unset parameter of `self` from `defaults`.
    pub fn or(self, defaults: FilterParams) -> FilterParams {
        FilterParams {
            name: self.name.or(defaults.name),
            salary_from: self.salary_from.or(defaults.salary_from),
            salary_to: self.salary_to.or(defaults.salary_to),
            sorted_salary_from: self.sorted_salary_from || defaults.sorted_salary_from,
            sorted_salary_to: self.sorted_salary_to || defaults.sorted_salary_to,
            sorted_avg_salary_asc: self.sorted_avg_salary_asc || defaults.sorted_avg_salary_asc,
            sorted_avg_salary_desc: self.sorted_avg_salary_desc || defaults.sorted_avg_salary_desc,
            top_n: self.top_n.or(defaults.top_n),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == FilterParams::default()
    }
}

fn read_int(key: &str, value: &Value, diagnostics: &mut Vec<ParamDiagnostic>) -> Option<i64> {
    let parsed = value.as_i64();
    if parsed.is_none() {
        diagnostics.push(ParamDiagnostic::new(
            key,
            format!("expected an integer, got {}", value),
        ));
    }
    parsed
}

fn read_flag(key: &str, value: &Value, diagnostics: &mut Vec<ParamDiagnostic>) -> bool {
    match value.as_bool() {
        Some(flag) => flag,
        None => {
            diagnostics.push(ParamDiagnostic::new(
                key,
                format!("expected a boolean, got {}", value),
            ));
            false
        }
    }
}

/// A rejected query parameter. The stage that would have used it is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamDiagnostic {
    pub key: String,
    pub reason: String,
}

impl ParamDiagnostic {
    pub fn new(key: impl Into<String>, reason: impl Into<String>) -> Self {
        let diagnostic = Self {
            key: key.into(),
            reason: reason.into(),
        };
        tracing::warn!("⚠️ Ignoring filter parameter {}", diagnostic);
        diagnostic
    }
}

impl fmt::Display for ParamDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}`: {}", self.key, self.reason)
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterOutcome {
    pub vacancies: Vec<Vacancy>,
    pub diagnostics: Vec<ParamDiagnostic>,
}

type Stage = fn(&FilterParams, Vec<Vacancy>, &mut Vec<ParamDiagnostic>) -> Vec<Vacancy>;

/// Stages in execution order. Each sort stage that runs replaces the order
/// left by earlier stages, so the last one to run decides the final order.
const STAGES: [(&str, Stage); 8] = [
    ("name", filter_by_name),
    ("salary_from", filter_by_salary_from),
    ("salary_to", filter_by_salary_to),
    ("sorted_salary_from", sort_by_salary_from),
    ("sorted_salary_to", sort_by_salary_to),
    ("sorted_avg_salary_asc", sort_by_average_asc),
    ("sorted_avg_salary_desc", sort_by_average_desc),
    ("top_n", take_top_n),
];

#[derive(Debug, Clone, Default)]
pub struct FilterPipeline {
    params: FilterParams,
    parse_diagnostics: Vec<ParamDiagnostic>,
}

impl FilterPipeline {
    pub fn new(params: FilterParams) -> Self {
        Self {
            params,
            parse_diagnostics: Vec::new(),
        }
    }

    pub fn from_map(map: &Map<String, Value>) -> Self {
        let (params, parse_diagnostics) = FilterParams::from_map(map);
        Self {
            params,
            parse_diagnostics,
        }
    }

    pub fn params(&self) -> &FilterParams {
        &self.params
    }

    /// Runs every enabled stage over a copy of `items`.
    pub fn apply(&self, items: &[Vacancy]) -> FilterOutcome {
        let mut diagnostics = self.parse_diagnostics.clone();

        let vacancies = STAGES
            .iter()
            .fold(items.to_vec(), |current, (stage_name, stage)| {
                let before = current.len();
                let next = stage(&self.params, current, &mut diagnostics);
                tracing::trace!("Stage {}: {} -> {} vacancies", stage_name, before, next.len());
                next
            });

        tracing::debug!(
            "Filter pipeline kept {} of {} vacancies",
            vacancies.len(),
            items.len()
        );

        FilterOutcome {
            vacancies,
            diagnostics,
        }
    }
}

/// Case-insensitive substring match on the vacancy name.
pub(crate) fn name_matches(name: &str, needle: &str) -> bool {
    name.to_lowercase().contains(&needle.trim().to_lowercase())
}

/// A missing bound never satisfies a salary filter.
pub(crate) fn salary_at_least(value: Option<u64>, min: u64) -> bool {
    value.is_some_and(|v| v >= min)
}

pub(crate) fn salary_at_most(value: Option<u64>, max: u64) -> bool {
    value.is_some_and(|v| v <= max)
}

/// Orders by average salary; vacancies without one sort lowest.
pub fn compare_average_salary(a: &Vacancy, b: &Vacancy) -> Ordering {
    a.average_salary()
        .partial_cmp(&b.average_salary())
        .unwrap_or(Ordering::Equal)
}

fn filter_by_name(
    params: &FilterParams,
    items: Vec<Vacancy>,
    _: &mut Vec<ParamDiagnostic>,
) -> Vec<Vacancy> {
    match &params.name {
        Some(needle) => items
            .into_iter()
            .filter(|v| name_matches(v.name(), needle))
            .collect(),
        None => items,
    }
}

/// Checks a salary bound, returning it only when the stage may run.
fn usable_bound(
    key: &str,
    params: &FilterParams,
    value: Option<i64>,
    diagnostics: &mut Vec<ParamDiagnostic>,
) -> Option<u64> {
    let value = value?;
    if value < 0 {
        diagnostics.push(ParamDiagnostic::new(
            key,
            format!("must not be negative, got {}", value),
        ));
        return None;
    }
    // An invalid opposite bound is reported by its own stage; it cannot
    // invert the range.
    if let (Some(from), Some(to)) = (params.salary_from, params.salary_to) {
        if from >= 0 && to >= 0 && from > to {
            diagnostics.push(ParamDiagnostic::new(
                key,
                format!("salary_from ({}) exceeds salary_to ({})", from, to),
            ));
            return None;
        }
    }
    Some(value as u64)
}

fn filter_by_salary_from(
    params: &FilterParams,
    items: Vec<Vacancy>,
    diagnostics: &mut Vec<ParamDiagnostic>,
) -> Vec<Vacancy> {
    match usable_bound("salary_from", params, params.salary_from, diagnostics) {
        Some(min) => items
            .into_iter()
            .filter(|v| salary_at_least(v.salary_from(), min))
            .collect(),
        None => items,
    }
}

fn filter_by_salary_to(
    params: &FilterParams,
    items: Vec<Vacancy>,
    diagnostics: &mut Vec<ParamDiagnostic>,
) -> Vec<Vacancy> {
    match usable_bound("salary_to", params, params.salary_to, diagnostics) {
        Some(max) => items
            .into_iter()
            .filter(|v| salary_at_most(v.salary_to(), max))
            .collect(),
        None => items,
    }
}

fn sort_by_salary_from(
    params: &FilterParams,
    mut items: Vec<Vacancy>,
    _: &mut Vec<ParamDiagnostic>,
) -> Vec<Vacancy> {
    if params.sorted_salary_from {
        items.sort_by_key(|v| std::cmp::Reverse(v.salary_from().unwrap_or(0)));
    }
    items
}

fn sort_by_salary_to(
    params: &FilterParams,
    mut items: Vec<Vacancy>,
    _: &mut Vec<ParamDiagnostic>,
) -> Vec<Vacancy> {
    if params.sorted_salary_to {
        items.sort_by_key(|v| std::cmp::Reverse(v.salary_to().unwrap_or(0)));
    }
    items
}

fn sort_by_average_asc(
    params: &FilterParams,
    mut items: Vec<Vacancy>,
    _: &mut Vec<ParamDiagnostic>,
) -> Vec<Vacancy> {
    if params.sorted_avg_salary_asc {
        items.sort_by(compare_average_salary);
    }
    items
}

fn sort_by_average_desc(
    params: &FilterParams,
    mut items: Vec<Vacancy>,
    _: &mut Vec<ParamDiagnostic>,
) -> Vec<Vacancy> {
    if params.sorted_avg_salary_desc {
        items.sort_by(|a, b| compare_average_salary(b, a));
    }
    items
}

fn take_top_n(
    params: &FilterParams,
    mut items: Vec<Vacancy>,
    diagnostics: &mut Vec<ParamDiagnostic>,
) -> Vec<Vacancy> {
    match params.top_n {
        Some(n) if n > 0 => {
            items.truncate(usize::try_from(n).unwrap_or(usize::MAX));
            items
        }
        Some(n) => {
            diagnostics.push(ParamDiagnostic::new(
                "top_n",
                format!("must be a positive integer, got {}", n),
            ));
            items
        }
        None => items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::VacancyDraft;
    use serde_json::json;

    fn vacancy(name: &str, from: Option<i64>, to: Option<i64>) -> Vacancy {
        Vacancy::new(VacancyDraft {
            name: name.to_string(),
            salary_from: from,
            salary_to: to,
            url: format!("https://hh.ru/vacancy/{}", name.replace(' ', "-")),
            ..Default::default()
        })
        .unwrap()
    }

    fn names(outcome: &FilterOutcome) -> Vec<&str> {
        outcome.vacancies.iter().map(|v| v.name()).collect()
    }

    fn run(items: &[Vacancy], params: Value) -> FilterOutcome {
        let map = params.as_object().cloned().unwrap_or_default();
        FilterPipeline::from_map(&map).apply(items)
    }

    #[test]
    fn test_no_params_keeps_everything_in_order() {
        let items = vec![vacancy("b", None, None), vacancy("a", Some(1), Some(2))];
        let outcome = run(&items, json!({}));
        assert_eq!(names(&outcome), vec!["b", "a"]);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_name_filter_is_case_insensitive() {
        let items = vec![
            vacancy("Senior PYTHON Developer", None, None),
            vacancy("Java Developer", None, None),
            vacancy("python intern", None, None),
        ];
        let outcome = run(&items, json!({"name": "Python"}));
        assert_eq!(names(&outcome), vec!["Senior PYTHON Developer", "python intern"]);
    }

    #[test]
    fn test_salary_from_filter_excludes_missing() {
        let items = vec![
            vacancy("none", None, None),
            vacancy("90k", Some(90_000), None),
            vacancy("120k", Some(120_000), None),
            vacancy("150k", Some(150_000), None),
        ];
        let outcome = run(&items, json!({"salary_from": 100000}));
        assert_eq!(names(&outcome), vec!["120k", "150k"]);
    }

    #[test]
    fn test_salary_to_filter_excludes_missing() {
        let items = vec![
            vacancy("none", Some(10), None),
            vacancy("140k", None, Some(140_000)),
            vacancy("200k", None, Some(200_000)),
        ];
        let outcome = run(&items, json!({"salary_to": 150000}));
        assert_eq!(names(&outcome), vec!["140k"]);
    }

    #[test]
    fn test_sort_by_salary_to_puts_missing_last() {
        let items = vec![
            vacancy("none", None, None),
            vacancy("140k", None, Some(140_000)),
            vacancy("150k", None, Some(150_000)),
            vacancy("200k", None, Some(200_000)),
        ];
        let outcome = run(&items, json!({"sorted_salary_to": true}));
        assert_eq!(names(&outcome), vec!["200k", "150k", "140k", "none"]);
    }

    #[test]
    fn test_sort_by_salary_from_is_stable() {
        let items = vec![
            vacancy("first 100", Some(100), None),
            vacancy("missing", None, None),
            vacancy("second 100", Some(100), None),
            vacancy("300", Some(300), None),
        ];
        let outcome = run(&items, json!({"sorted_salary_from": true}));
        assert_eq!(names(&outcome), vec!["300", "first 100", "second 100", "missing"]);
    }

    #[test]
    fn test_average_sorts_treat_missing_as_lowest() {
        let items = vec![
            vacancy("avg 150", Some(100), Some(200)),
            vacancy("no salary", None, None),
            vacancy("avg 50", None, Some(50)),
        ];
        let asc = run(&items, json!({"sorted_avg_salary_asc": true}));
        assert_eq!(names(&asc), vec!["no salary", "avg 50", "avg 150"]);

        let desc = run(&items, json!({"sorted_avg_salary_desc": true}));
        assert_eq!(names(&desc), vec!["avg 150", "avg 50", "no salary"]);
    }

    #[test]
    fn test_last_sort_stage_wins() {
        // Multiple sort flags do not compose into a multi-key sort: the
        // later stage re-sorts, breaking ties by the order it received.
        let items = vec![
            vacancy("a", Some(300), Some(300)),
            vacancy("b", Some(100), Some(500)),
            vacancy("c", Some(200), Some(500)),
        ];
        let outcome = run(
            &items,
            json!({"sorted_salary_from": true, "sorted_salary_to": true}),
        );
        assert_eq!(names(&outcome), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_top_n_truncates_current_order() {
        let items = vec![
            vacancy("low", Some(1), None),
            vacancy("high", Some(3), None),
            vacancy("mid", Some(2), None),
        ];
        let outcome = run(&items, json!({"sorted_salary_from": true, "top_n": 2}));
        assert_eq!(names(&outcome), vec!["high", "mid"]);

        let larger = run(&items, json!({"top_n": 10}));
        assert_eq!(larger.vacancies.len(), 3);
    }

    #[test]
    fn test_non_positive_top_n_is_a_no_op() {
        let items = vec![vacancy("a", None, None), vacancy("b", None, None)];
        for top_n in [json!(0), json!(-3), json!("2"), json!(1.5)] {
            let outcome = run(&items, json!({ "top_n": top_n }));
            assert_eq!(outcome.vacancies.len(), 2);
            assert_eq!(outcome.diagnostics.len(), 1);
            assert_eq!(outcome.diagnostics[0].key, "top_n");
        }
    }

    #[test]
    fn test_invalid_salary_params_skip_their_stage() {
        let items = vec![
            vacancy("none", None, None),
            vacancy("100-200", Some(100), Some(200)),
        ];

        let negative = run(&items, json!({"salary_from": -1}));
        assert_eq!(negative.vacancies.len(), 2);
        assert_eq!(negative.diagnostics[0].key, "salary_from");

        let not_int = run(&items, json!({"salary_to": "lots"}));
        assert_eq!(not_int.vacancies.len(), 2);
        assert_eq!(not_int.diagnostics[0].key, "salary_to");

        let inverted = run(&items, json!({"salary_from": 500, "salary_to": 100}));
        assert_eq!(inverted.vacancies.len(), 2);
        assert_eq!(inverted.diagnostics.len(), 2);
    }

    #[test]
    fn test_negative_bound_does_not_invert_the_other() {
        let items = vec![
            vacancy("none", None, None),
            vacancy("50-80", Some(50), Some(80)),
            vacancy("100-200", Some(100), Some(200)),
        ];

        let outcome = run(&items, json!({"salary_from": 100, "salary_to": -1}));
        assert_eq!(names(&outcome), vec!["100-200"]);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].key, "salary_to");

        let outcome = run(&items, json!({"salary_from": -5, "salary_to": 80}));
        assert_eq!(names(&outcome), vec!["50-80"]);
        assert_eq!(outcome.diagnostics.len(), 1);
        assert_eq!(outcome.diagnostics[0].key, "salary_from");
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let items = vec![vacancy("a", None, None)];
        let outcome = run(&items, json!({"filter_words": ["x"], "colour": "red"}));
        assert_eq!(outcome.vacancies.len(), 1);
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_input_is_not_mutated() {
        let items = vec![vacancy("b", Some(1), None), vacancy("a", Some(2), None)];
        let snapshot = items.clone();
        let _ = run(&items, json!({"sorted_salary_from": true, "top_n": 1}));
        assert_eq!(items, snapshot);
    }

    #[test]
    fn test_params_or_fills_unset_values() {
        let cli = FilterParams {
            name: Some("rust".to_string()),
            ..Default::default()
        };
        let defaults = FilterParams {
            name: Some("python".to_string()),
            top_n: Some(5),
            sorted_salary_to: true,
            ..Default::default()
        };
        let merged = cli.or(defaults);
        assert_eq!(merged.name.as_deref(), Some("rust"));
        assert_eq!(merged.top_n, Some(5));
        assert!(merged.sorted_salary_to);
    }
}
