use crate::core::filter::FilterParams;

/// Human-readable labels for the recognized filter parameters, in pipeline
/// order.
pub const PARAM_LABELS: [(&str, &str); 8] = [
    ("name", "Название вакансии"),
    ("salary_from", "Зарплата от"),
    ("salary_to", "Зарплата до"),
    ("sorted_salary_from", "Сортировка по зарплате от"),
    ("sorted_salary_to", "Сортировка по зарплате до"),
    ("sorted_avg_salary_asc", "Сортировка по средней зарплате (по возрастанию)"),
    ("sorted_avg_salary_desc", "Сортировка по средней зарплате (по убыванию)"),
    ("top_n", "Топ N вакансий"),
];

pub fn label_for(key: &str) -> Option<&'static str> {
    PARAM_LABELS
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, label)| *label)
}

/// One line per active parameter: `"<label>: <value>"`, or the bare label
/// for flags.
pub fn describe_params(params: &FilterParams) -> Vec<String> {
    let valued = |key: &str, value: String| format!("{}: {}", label_for(key).unwrap_or(key), value);
    let flag = |key: &str| label_for(key).unwrap_or(key).to_string();

    let mut lines = Vec::new();
    if let Some(name) = &params.name {
        lines.push(valued("name", name.clone()));
    }
    if let Some(from) = params.salary_from {
        lines.push(valued("salary_from", from.to_string()));
    }
    if let Some(to) = params.salary_to {
        lines.push(valued("salary_to", to.to_string()));
    }
    if params.sorted_salary_from {
        lines.push(flag("sorted_salary_from"));
    }
    if params.sorted_salary_to {
        lines.push(flag("sorted_salary_to"));
    }
    if params.sorted_avg_salary_asc {
        lines.push(flag("sorted_avg_salary_asc"));
    }
    if params.sorted_avg_salary_desc {
        lines.push(flag("sorted_avg_salary_desc"));
    }
    if let Some(top_n) = params.top_n {
        lines.push(valued("top_n", top_n.to_string()));
    }
    lines
}
