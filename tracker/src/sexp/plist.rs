//! Property-list helpers over `lexpr` values and event formatting.

use lexpr::Value;

/// Value following `:key` in a plist.
///
/// Accepts both `Value::Keyword("key")` (elisp-style parser) and
/// `Value::Symbol(":key")` (default parser).
pub fn get_value<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let prefixed = format!(":{}", key);
    let mut current = value;
    while let Value::Cons(pair) = current {
        let is_key = match pair.car() {
            Value::Keyword(k) => k.as_ref() == key,
            Value::Symbol(s) => s.as_ref() == prefixed,
            _ => false,
        };
        if is_key {
            return match pair.cdr() {
                Value::Cons(next) => Some(next.car()),
                _ => None,
            };
        }
        current = pair.cdr();
    }
    None
}

/// Value of `:key` rendered as a bare string: keywords lose their colon,
/// nil-like values become `"nil"`.
pub fn get_keyword(value: &Value, key: &str) -> Option<String> {
    let val = get_value(value, key)?;
    Some(match val {
        Value::Keyword(v) => v.to_string(),
        Value::Symbol(v) => {
            let s = v.to_string();
            s.strip_prefix(':').unwrap_or(&s).to_string()
        }
        Value::String(v) => v.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "t".to_string(),
        Value::Bool(false) => "nil".to_string(),
        Value::Null | Value::Nil => "nil".to_string(),
        _ => val.to_string(),
    })
}

pub fn get_float(value: &Value, key: &str) -> Option<f64> {
    get_value(value, key).and_then(as_f64)
}

pub fn get_int(value: &Value, key: &str) -> Option<i64> {
    match get_value(value, key)? {
        Value::Number(n) => n.as_i64(),
        _ => None,
    }
}

/// Numeric value as `f64`, integers included.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// True for the empty list and the symbols/values read as nil.
pub fn is_nil(value: &Value) -> bool {
    match value {
        Value::Null | Value::Nil => true,
        Value::Bool(b) => !*b,
        Value::Symbol(s) => s.as_ref() == "nil",
        _ => false,
    }
}

/// Elements of a proper list.  `None` for improper lists and atoms other
/// than the empty list.
pub fn list_items(value: &Value) -> Option<Vec<&Value>> {
    let mut items = Vec::new();
    let mut current = value;
    loop {
        match current {
            Value::Cons(pair) => {
                items.push(pair.car());
                current = pair.cdr();
            }
            Value::Null => return Some(items),
            _ => return None,
        }
    }
}

/// Format an event s-expression.
pub fn format_event(event_type: &str, fields: &[(&str, &str)]) -> String {
    let mut s = format!("(:type :event :event :{}", event_type);
    for (key, val) in fields {
        s.push_str(&format!(" :{} {}", key, val));
    }
    s.push(')');
    s
}
