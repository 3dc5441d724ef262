//! Filters and updates evaluated against stored documents.
//!
//! Paths are dotted (`address.city`) and walk nested objects. A path that does
//! not resolve never matches a filter.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::error::StoreError;

/// A stored document: a JSON object.
pub type Document = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    /// Exact match on a text field, ignoring case.
    EqIgnoreCase(String, String),
    Gte(String, Value),
    Lte(String, Value),
    /// Inclusive on both ends.
    Range { path: String, min: Value, max: Value },
    Or(Vec<Filter>),
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(path.into(), value.into())
    }

    pub fn eq_ignore_case(path: impl Into<String>, text: impl Into<String>) -> Self {
        Filter::EqIgnoreCase(path.into(), text.into())
    }

    pub fn gte(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gte(path.into(), value.into())
    }

    pub fn lte(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lte(path.into(), value.into())
    }

    pub fn range(path: impl Into<String>, min: impl Into<Value>, max: impl Into<Value>) -> Self {
        Filter::Range {
            path: path.into(),
            min: min.into(),
            max: max.into(),
        }
    }

    /// Exact match of `path` against any of `values`.
    pub fn any_of(path: &str, values: impl IntoIterator<Item = String>) -> Self {
        Filter::Or(values.into_iter().map(|v| Filter::eq(path, v)).collect())
    }

    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::Eq(path, expected) => lookup(doc, path).is_some_and(|v| values_equal(v, expected)),
            Filter::EqIgnoreCase(path, text) => lookup(doc, path)
                .and_then(Value::as_str)
                .is_some_and(|s| s.to_lowercase() == text.to_lowercase()),
            Filter::Gte(path, bound) => lookup(doc, path)
                .and_then(|v| compare(v, bound))
                .is_some_and(|o| o != Ordering::Less),
            Filter::Lte(path, bound) => lookup(doc, path)
                .and_then(|v| compare(v, bound))
                .is_some_and(|o| o != Ordering::Greater),
            Filter::Range { path, min, max } => lookup(doc, path).is_some_and(|v| {
                matches!(compare(v, min), Some(Ordering::Greater | Ordering::Equal))
                    && matches!(compare(v, max), Some(Ordering::Less | Ordering::Equal))
            }),
            Filter::Or(filters) => filters.iter().any(|f| f.matches(doc)),
            Filter::And(filters) => filters.iter().all(|f| f.matches(doc)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    Set(String, Value),
    Inc(String, i64),
}

impl Update {
    pub fn set(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Update::Set(path.into(), value.into())
    }

    pub fn inc(path: impl Into<String>, delta: i64) -> Self {
        Update::Inc(path.into(), delta)
    }

    /// Applies the update in place. Returns whether the document changed.
    pub fn apply(&self, doc: &mut Document) -> Result<bool, StoreError> {
        match self {
            Update::Set(path, value) => {
                let (parent, leaf) = parent_mut(doc, path)?;
                if parent.get(leaf) == Some(value) {
                    return Ok(false);
                }
                parent.insert(leaf.to_string(), value.clone());
                Ok(true)
            }
            Update::Inc(path, delta) => {
                let (parent, leaf) = parent_mut(doc, path)?;
                let current = match parent.get(leaf) {
                    None | Some(Value::Null) => 0,
                    Some(v) => v.as_i64().ok_or_else(|| StoreError::InvalidUpdate {
                        path: path.clone(),
                        reason: format!("cannot increment non-integer value {}", v),
                    })?,
                };
                let next = current.checked_add(*delta).ok_or_else(|| StoreError::InvalidUpdate {
                    path: path.clone(),
                    reason: "integer overflow".to_string(),
                })?;
                parent.insert(leaf.to_string(), Value::from(next));
                Ok(*delta != 0)
            }
        }
    }
}

/// Counts reported by an update, mirroring what a document database returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateResult {
    pub matched: u64,
    pub modified: u64,
}

fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Resolves the object holding the last segment of `path`, creating parent
/// objects as needed.
fn parent_mut<'a, 'p>(doc: &'a mut Document, path: &'p str) -> Result<(&'a mut Document, &'p str), StoreError> {
    let mut segments: Vec<&str> = path.split('.').collect();
    let leaf = segments.pop().filter(|s| !s.is_empty()).ok_or_else(|| StoreError::InvalidUpdate {
        path: path.to_string(),
        reason: "empty path".to_string(),
    })?;

    let mut parent = doc;
    for segment in segments {
        let entry = parent
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if entry.is_null() {
            *entry = Value::Object(Map::new());
        }
        parent = entry.as_object_mut().ok_or_else(|| StoreError::InvalidUpdate {
            path: path.to_string(),
            reason: format!("'{}' is not an object", segment),
        })?;
    }
    Ok((parent, leaf))
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => compare(a, b) == Some(Ordering::Equal),
        _ => a == b,
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => x.as_f64()?.partial_cmp(&y.as_f64()?),
        },
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
