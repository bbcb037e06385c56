//! Default-on-missing nested lookup.

use serde_json::Value;

/// Reads the value at `segments` inside `record`, or returns `default`.
///
/// Objects are walked by key and arrays by numeric index. The default is
/// returned when:
/// - `segments` is empty
/// - a segment is missing
/// - an intermediate value is `null` or not indexable (a string, number, ...)
///
/// A `null` stored at the terminal position is returned as-is.
pub fn path_or<'a, S: AsRef<str>>(
    default: &'a Value,
    segments: &[S],
    record: &'a Value,
) -> &'a Value {
    if segments.is_empty() {
        return default;
    }

    let mut current = record;
    for segment in segments {
        let segment = segment.as_ref();
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return default,
        }
    }
    current
}
