use serde_json::Value;

/// A traversal path into the state tree.
///
/// Built from a dot-separated string (`"countries.data.country"`) or from
/// explicit segments; explicit segments containing dots are flattened the
/// same way.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path(Vec<String>);

impl Path {
    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl From<&str> for Path {
    fn from(path: &str) -> Self {
        Path(split_segment(path).collect())
    }
}

impl From<String> for Path {
    fn from(path: String) -> Self {
        Path::from(path.as_str())
    }
}

impl From<&[&str]> for Path {
    fn from(parts: &[&str]) -> Self {
        Path(parts.iter().flat_map(|part| split_segment(part)).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Path {
    fn from(parts: [&str; N]) -> Self {
        Path::from(&parts[..])
    }
}

fn split_segment(part: &str) -> impl Iterator<Item = String> + '_ {
    part.split('.')
        .filter(|key| !key.is_empty())
        .map(str::to_owned)
}

/// Gets the value at `path` of `state`, or `default`.
///
/// Object segments look up keys, array segments parse as indices. Any missing
/// or js-falsy intermediate short-circuits to the default, and a js-falsy
/// final value is replaced by the default as well.
pub fn get(state: &Value, path: impl Into<Path>, default: Value) -> Value {
    let path = path.into();
    let mut current = state;
    for segment in path.segments() {
        if is_falsy(current) {
            return default;
        }
        current = match current {
            Value::Object(map) => map.get(segment).unwrap_or(&Value::Null),
            Value::Array(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index))
                .unwrap_or(&Value::Null),
            _ => &Value::Null,
        };
    }
    if is_falsy(current) {
        default
    } else {
        current.clone()
    }
}

/// Javascript falsiness for json values: null, false, zero and the empty
/// string. Missing keys surface as null and land here too.
pub(crate) fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}
