use serde_json::Value;
use std::io;

/// Arrays worth exporting row by row, in preference order.
const TABULAR_KEYS: [&str; 5] = ["pnl", "cashflows", "results", "lines", "matrix"];

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let body = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match body {
        Value::Object(map) => {
            if let Some(Value::Array(rows)) = TABULAR_KEYS.iter().find_map(|k| map.get(*k)) {
                write_array_csv(&mut wtr, rows);
            } else {
                let _ = wtr.write_record(["field", "value"]);
                for (key, val) in map {
                    let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
                }
            }
        }
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_csv_value(body)]);
        }
    }

    let _ = wtr.flush();
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    match arr.first() {
        None => {}
        Some(Value::Object(first)) => {
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
        }
        // grid matrix rows
        Some(Value::Array(_)) => {
            for item in arr {
                if let Value::Array(cells) = item {
                    let row: Vec<String> = cells.iter().map(format_csv_value).collect();
                    let _ = wtr.write_record(&row);
                }
            }
        }
        Some(_) => {
            for item in arr {
                let _ = wtr.write_record([&format_csv_value(item)]);
            }
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

    fn render(arr: &[Value]) -> String {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        write_array_csv(&mut wtr, arr);
        String::from_utf8(wtr.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_object_rows_share_first_headers() {
        let rows = [json!({ "year": 1, "npv": "5" }), json!({ "year": 2, "npv": null })];
        assert_eq!(render(&rows), "npv,year\n5,1\n,2\n");
    }

    #[test]
    fn test_matrix_rows() {
        let rows = [json!(["1", null]), json!(["3", "4"])];
        assert_eq!(render(&rows), "1,\n3,4\n");
    }
}
