use serde_json::{Map, Value};
use std::io;

/// Write output as CSV to stdout.
///
/// Results carrying a row array (cash-flow periods, pool weights, per-pool
/// health, factor history) are written one row per element; everything else
/// is written as field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => {
            if let Some(Value::Object(result)) = map.get("result") {
                if let Some(rows) = first_row_set(result) {
                    write_array_csv(&mut wtr, rows);
                } else {
                    write_fields(&mut wtr, result);
                }
            } else {
                write_fields(&mut wtr, map);
            }
        }
        Value::Array(arr) => {
            write_array_csv(&mut wtr, arr);
        }
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn first_row_set(result: &Map<String, Value>) -> Option<&Vec<Value>> {
    result.values().find_map(|v| match v {
        Value::Array(rows) if rows.first().is_some_and(Value::is_object) => Some(rows),
        _ => None,
    })
}

fn write_fields(wtr: &mut csv::Writer<io::StdoutLock<'_>>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
    }
}

fn write_array_csv(wtr: &mut csv::Writer<io::StdoutLock<'_>>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_row_set_detection() {
        let result = json!({
            "projected_smm": "0.005",
            "periods": [{ "month": 1, "total_payment": "100" }],
            "summary": { "total_payments": "100" }
        });
        let rows = first_row_set(result.as_object().unwrap()).unwrap();
        assert_eq!(rows.len(), 1);

        let scalar_only = json!({ "hhi_score": "2500", "monthly_changes": ["-1.2"] });
        assert!(first_row_set(scalar_only.as_object().unwrap()).is_none());
    }
}
