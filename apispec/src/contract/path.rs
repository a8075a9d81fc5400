//! Field paths into JSON bodies.
//!
//! Paths use dot/bracket notation: `total`, `products[].quantity`,
//! `items[0].name`, `['a.b'].c`, `*.href`. `[]` visits every array
//! element, `[n]` one element and `*` every value of an object.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;

use crate::errors::InvalidContractError;

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathSegment {
    /// Object member.
    Key(String),
    /// Every element of an array.
    AnyIndex,
    /// A single array element.
    Index(usize),
    /// Every value of an object.
    AnyKey,
}

/// A parsed field path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    /// Parses a dot/bracket path.
    pub fn parse(input: &str) -> Result<Self, InvalidContractError> {
        let err = |reason: &str| InvalidContractError::new(format!("field path '{input}': {reason}"));

        if input.trim().is_empty() {
            return Err(err("path is empty"));
        }

        let chars: Vec<char> = input.chars().collect();
        let mut segments = Vec::new();
        let mut i = 0;
        let mut expect_key = true;

        while i < chars.len() {
            match chars[i] {
                '[' => {
                    let close = chars[i..]
                        .iter()
                        .position(|c| *c == ']')
                        .map(|p| p + i)
                        .ok_or_else(|| err("unclosed '['"))?;
                    let inner: String = chars[i + 1..close].iter().collect();
                    segments.push(parse_bracket(&inner).ok_or_else(|| err("invalid bracket segment"))?);
                    i = close + 1;
                    expect_key = false;
                }
                '.' => {
                    if expect_key {
                        return Err(err("empty segment"));
                    }
                    i += 1;
                    expect_key = true;
                    if i == chars.len() {
                        return Err(err("trailing '.'"));
                    }
                }
                _ => {
                    if !expect_key {
                        return Err(err("missing '.' between segments"));
                    }
                    let start = i;
                    while i < chars.len() && chars[i] != '.' && chars[i] != '[' {
                        if chars[i] == ']' {
                            return Err(err("unexpected ']'"));
                        }
                        i += 1;
                    }
                    let key: String = chars[start..i].iter().collect();
                    if key == "*" {
                        segments.push(PathSegment::AnyKey);
                    } else {
                        segments.push(PathSegment::Key(key));
                    }
                    expect_key = false;
                }
            }
        }

        Ok(Self { segments })
    }

    /// Creates a path from already parsed segments.
    #[must_use]
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// The parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Returns every value this path selects in `root`, in document order.
    #[must_use]
    pub fn resolve<'a>(&self, root: &'a Value) -> Vec<&'a Value> {
        let mut current = vec![root];
        for segment in &self.segments {
            let mut next = Vec::new();
            for value in current {
                match (segment, value) {
                    (PathSegment::Key(key), Value::Object(map)) => next.extend(map.get(key)),
                    (PathSegment::AnyKey, Value::Object(map)) => next.extend(map.values()),
                    (PathSegment::AnyIndex, Value::Array(items)) => next.extend(items.iter()),
                    (PathSegment::Index(idx), Value::Array(items)) => next.extend(items.get(*idx)),
                    _ => {}
                }
            }
            if next.is_empty() {
                return next;
            }
            current = next;
        }
        current
    }

    /// True when the path selects at least one value in `root`.
    #[must_use]
    pub fn is_present(&self, root: &Value) -> bool {
        !self.resolve(root).is_empty()
    }

    /// True when this (declared) path documents the concrete `leaf` path.
    ///
    /// With `subtree` set, every descendant of a matched prefix counts too.
    #[must_use]
    pub fn covers(&self, leaf: &FieldPath, subtree: bool) -> bool {
        if self.segments.len() > leaf.segments.len() {
            return false;
        }
        if !subtree && self.segments.len() != leaf.segments.len() {
            return false;
        }
        self.segments
            .iter()
            .zip(&leaf.segments)
            .all(|(declared, concrete)| match (declared, concrete) {
                (PathSegment::Key(a), PathSegment::Key(b)) => a == b,
                (PathSegment::AnyKey, PathSegment::Key(_)) => true,
                (PathSegment::AnyIndex | PathSegment::Index(_), PathSegment::AnyIndex) => true,
                (a, b) => a == b,
            })
    }
}

fn parse_bracket(inner: &str) -> Option<PathSegment> {
    if inner.is_empty() {
        return Some(PathSegment::AnyIndex);
    }
    if inner == "*" {
        return Some(PathSegment::AnyKey);
    }
    for quote in ['\'', '"'] {
        if inner.len() >= 2 && inner.starts_with(quote) && inner.ends_with(quote) {
            return Some(PathSegment::Key(inner[1..inner.len() - 1].to_string()));
        }
    }
    inner.parse().ok().map(PathSegment::Index)
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Key(key) => {
                    let plain = !key.is_empty()
                        && key != "*"
                        && !key.contains(['.', '[', ']', '\'']);
                    if !plain {
                        write!(f, "['{key}']")?;
                    } else if i == 0 {
                        write!(f, "{key}")?;
                    } else {
                        write!(f, ".{key}")?;
                    }
                }
                PathSegment::AnyKey if i == 0 => write!(f, "*")?,
                PathSegment::AnyKey => write!(f, ".*")?,
                PathSegment::AnyIndex => write!(f, "[]")?,
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

/// Lists the leaf paths of a JSON document, arrays collapsed to `[]`.
///
/// Scalars, empty objects and empty arrays are leaves.
#[must_use]
pub fn leaf_paths(root: &Value) -> BTreeSet<FieldPath> {
    fn walk(value: &Value, prefix: &mut Vec<PathSegment>, out: &mut BTreeSet<FieldPath>) {
        match value {
            Value::Object(map) if !map.is_empty() => {
                for (key, child) in map {
                    prefix.push(PathSegment::Key(key.clone()));
                    walk(child, prefix, out);
                    prefix.pop();
                }
            }
            Value::Array(items) if !items.is_empty() => {
                prefix.push(PathSegment::AnyIndex);
                for child in items {
                    walk(child, prefix, out);
                }
                prefix.pop();
            }
            _ => {
                if !prefix.is_empty() {
                    out.insert(FieldPath::from_segments(prefix.clone()));
                }
            }
        }
    }

    let mut out = BTreeSet::new();
    walk(root, &mut Vec::new(), &mut out);
    out
}

/// JSON type of a documented field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// JSON object.
    Object,
    /// JSON array.
    Array,
    /// JSON string.
    String,
    /// JSON number.
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON null.
    Null,
    /// Any type.
    Varies,
}

impl FieldType {
    /// The type of a concrete value.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Null => Self::Null,
        }
    }

    /// True when `value` is acceptable for this declared type. Nulls always are.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        self == Self::Varies || value.is_null() || Self::of(value) == self
    }

    /// The name used in documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Varies => "varies",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cart() -> Value {
        json!({
            "total": 10.5,
            "products": [
                {"quantity": 1, "product": {"name": "Fancy pants", "price": 10.5},
                 "_links": {"product": {"href": "http://localhost/products/1"}}}
            ],
            "_links": {"self": {"href": "http://localhost/carts/1"}}
        })
    }

    #[test]
    fn test_parse_round_trips_display() {
        for input in ["total", "products[].quantity", "items[0].name", "['a.b'].c", "*.href", "[].id"] {
            let path = FieldPath::parse(input).unwrap();
            assert_eq!(path.to_string(), input);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in ["", "a..b", "a.", ".a", "a[", "a[x]", "a]b", "a[]b"] {
            assert!(FieldPath::parse(input).is_err(), "{input} should not parse");
        }
    }

    #[test]
    fn test_resolve_nested_array_member() {
        let body = cart();
        let path = FieldPath::parse("products[].product.name").unwrap();
        assert_eq!(path.resolve(&body), vec![&json!("Fancy pants")]);
        assert!(FieldPath::parse("products[0].quantity").unwrap().is_present(&body));
        assert!(!FieldPath::parse("products[3].quantity").unwrap().is_present(&body));
    }

    #[test]
    fn test_resolve_keeps_null_values() {
        let body = json!({"note": null});
        assert!(FieldPath::parse("note").unwrap().is_present(&body));
        assert!(!FieldPath::parse("missing").unwrap().is_present(&body));
    }

    #[test]
    fn test_wildcard_key() {
        let body = cart();
        let hrefs = FieldPath::parse("_links.*.href").unwrap().resolve(&body);
        assert_eq!(hrefs.len(), 1);
    }

    #[test]
    fn test_leaf_paths_collapse_arrays() {
        let leaves: Vec<String> = leaf_paths(&cart()).iter().map(ToString::to_string).collect();
        assert_eq!(
            leaves,
            vec![
                "_links.self.href",
                "products[]._links.product.href",
                "products[].product.name",
                "products[].product.price",
                "products[].quantity",
                "total",
            ]
        );
    }

    #[test]
    fn test_covers_exact_and_subtree() {
        let leaf = FieldPath::parse("products[].product.name").unwrap();
        assert!(FieldPath::parse("products[].product").unwrap().covers(&leaf, true));
        assert!(!FieldPath::parse("products[].product").unwrap().covers(&leaf, false));
        assert!(FieldPath::parse("products[0].product.name").unwrap().covers(&leaf, false));
        assert!(!FieldPath::parse("total").unwrap().covers(&leaf, true));
    }

    #[test]
    fn test_field_type_accepts() {
        assert_eq!(FieldType::of(&json!([1])), FieldType::Array);
        assert!(FieldType::Number.accepts(&json!(1.5)));
        assert!(FieldType::Number.accepts(&Value::Null));
        assert!(!FieldType::Number.accepts(&json!("1.5")));
        assert!(FieldType::Varies.accepts(&json!({})));
    }
}
