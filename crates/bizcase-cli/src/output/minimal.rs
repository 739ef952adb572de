use serde_json::Value;

/// Print just the headline number from the output.
///
/// Looks for the well-known answer fields of each command in priority
/// order, descending into `returns` and `totals`, then falls back to the
/// first field of the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Some(found) = headline(result_obj) {
        println!("{}", format_minimal(found));
        return;
    }

    if let Value::Object(map) = result_obj {
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

const PRIORITY_KEYS: [&str; 7] = [
    "npv",
    "probability_weighted_npv",
    "base_case_value",
    "factor",
    "valid",
    "avg_unit_price",
    "irr",
];

const NESTED: [&str; 2] = ["returns", "totals"];

fn headline(result: &Value) -> Option<&Value> {
    let map = result.as_object()?;
    for key in PRIORITY_KEYS {
        if let Some(val) = map.get(key) {
            if !val.is_null() {
                return Some(val);
            }
        }
    }
    NESTED
        .iter()
        .filter_map(|k| map.get(*k))
        .find_map(headline)
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
