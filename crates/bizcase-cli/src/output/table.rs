use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// Scalar fields of the result go into one Field/Value table; every array
/// of objects (P&L years, cashflows, quote lines, sensitivity runs) gets
/// its own titled table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result(result);
                print_envelope_notes(map);
            } else {
                print_result(value);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result(result: &Value) {
    let Value::Object(res_map) = result else {
        println!("{}", format_value(result));
        return;
    };

    let mut scalars = Vec::new();
    flatten_scalars("", res_map, &mut scalars);
    if !scalars.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in &scalars {
            builder.push_record([key.as_str(), val.as_str()]);
        }
        println!("{}", Table::from(builder));
    }

    for (key, val) in res_map {
        if let Value::Array(arr) = val {
            if arr.first().is_some_and(Value::is_object) {
                println!("\n{}:", key);
                print_array_table(arr);
            }
        }
    }
}

/// Flatten nested objects into dotted keys; arrays of objects are skipped.
fn flatten_scalars(prefix: &str, map: &Map<String, Value>, out: &mut Vec<(String, String)>) {
    for (key, val) in map {
        let name = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match val {
            Value::Object(inner) => flatten_scalars(&name, inner, out),
            Value::Array(arr) if arr.first().is_some_and(Value::is_object) => {}
            other => out.push((name, format_value(other))),
        }
    }
}

fn print_envelope_notes(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => arr.iter().map(format_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
