use serde_json::{Map, Value};

/// Key output fields in order of priority.
const PRIORITY_KEYS: [&str; 9] = [
    "smm",
    "cpr",
    "current_cpr",
    "current_trend",
    "weighted_average_life",
    "average_health_score",
    "hhi_score",
    "avg_pool_factor",
    "status",
];

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields at the top of the result object, then
/// one level down (e.g. `summary.weighted_average_life`), then falls back to
/// the first field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        if let Some(val) = find_priority(map) {
            println!("{}", format_minimal(val));
            return;
        }
        for nested in map.values() {
            if let Value::Object(inner) = nested {
                if let Some(val) = find_priority(inner) {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn find_priority(map: &Map<String, Value>) -> Option<&Value> {
    PRIORITY_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .find(|val| !val.is_null())
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
