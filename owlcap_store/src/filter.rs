//! Typed filter tree.
//!
//! Expressions compile to this tree. The Elasticsearch store serializes it
//! into a bool query; the in-memory store evaluates it directly against the
//! serialized document.

use serde_json::{json, Value};

#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// Exact field match.
    Term { field: String, value: Value },
    /// Field matches any of the listed values.
    Terms { field: String, values: Vec<Value> },
    /// Numeric range. Bounds are milliseconds for packet-time fields.
    Range {
        field: String,
        gte: Option<i64>,
        lt: Option<i64>,
        lte: Option<i64>,
    },
    /// Glob match, `*` and `?` wildcards.
    Wildcard { field: String, pattern: String },
    /// Field is present.
    Exists { field: String },
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    MatchAll,
}

impl Filter {
    /// Renders the tree as an Elasticsearch query body fragment.
    pub fn to_es_query(&self) -> Value {
        match self {
            Filter::Term { field, value } => json!({ "term": { field.as_str(): value } }),
            Filter::Terms { field, values } => json!({ "terms": { field.as_str(): values } }),
            Filter::Range { field, gte, lt, lte } => {
                let mut bounds = serde_json::Map::new();
                if let Some(gte) = gte {
                    bounds.insert("gte".to_string(), json!(gte));
                }
                if let Some(lt) = lt {
                    bounds.insert("lt".to_string(), json!(lt));
                }
                if let Some(lte) = lte {
                    bounds.insert("lte".to_string(), json!(lte));
                }
                json!({ "range": { field.as_str(): Value::Object(bounds) } })
            }
            Filter::Wildcard { field, pattern } => json!({ "wildcard": { field.as_str(): pattern } }),
            Filter::Exists { field } => json!({ "exists": { "field": field } }),
            Filter::And(parts) => {
                let parts: Vec<Value> = parts.iter().map(|f| f.to_es_query()).collect();
                json!({ "bool": { "filter": parts } })
            }
            Filter::Or(parts) => {
                let parts: Vec<Value> = parts.iter().map(|f| f.to_es_query()).collect();
                json!({ "bool": { "should": parts, "minimum_should_match": 1 } })
            }
            Filter::Not(inner) => json!({ "bool": { "must_not": [inner.to_es_query()] } }),
            Filter::MatchAll => json!({ "match_all": {} }),
        }
    }

    /// Evaluates the tree against a serialized document. Only used by the
    /// in-memory store.
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            Filter::Term { field, value } => field_values(doc, field)
                .iter()
                .any(|v| loose_eq(v, value)),
            Filter::Terms { field, values } => field_values(doc, field)
                .iter()
                .any(|v| values.iter().any(|want| loose_eq(v, want))),
            Filter::Range { field, gte, lt, lte } => {
                field_values(doc, field).iter().any(|v| {
                    let Some(n) = v.as_i64() else { return false };
                    if let Some(gte) = gte {
                        if n < *gte {
                            return false;
                        }
                    }
                    if let Some(lt) = lt {
                        if n >= *lt {
                            return false;
                        }
                    }
                    if let Some(lte) = lte {
                        if n > *lte {
                            return false;
                        }
                    }
                    true
                })
            }
            Filter::Wildcard { field, pattern } => field_values(doc, field)
                .iter()
                .any(|v| v.as_str().map(|s| glob_match(pattern, s)).unwrap_or(false)),
            Filter::Exists { field } => !field_values(doc, field).is_empty(),
            Filter::And(parts) => parts.iter().all(|f| f.matches(doc)),
            Filter::Or(parts) => parts.iter().any(|f| f.matches(doc)),
            Filter::Not(inner) => !inner.matches(doc),
            Filter::MatchAll => true,
        }
    }
}

/// A field may hold a scalar or an array; either way we compare per-element.
fn field_values<'a>(doc: &'a Value, field: &str) -> Vec<&'a Value> {
    match doc.get(field) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().collect(),
        Some(v) => vec![v],
    }
}

/// Terms arriving from an expression are strings even when the document
/// field is numeric, so compare across the string/number divide.
fn loose_eq(have: &Value, want: &Value) -> bool {
    if have == want {
        return true;
    }
    match (have, want) {
        (Value::Number(n), Value::String(s)) | (Value::String(s), Value::Number(n)) => {
            s.parse::<f64>().map(|p| Some(p) == n.as_f64()).unwrap_or(false)
        }
        _ => false,
    }
}

fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    glob_inner(&p, &t)
}

fn glob_inner(p: &[char], t: &[char]) -> bool {
    match (p.first(), t.first()) {
        (None, None) => true,
        (Some('*'), _) => {
            glob_inner(&p[1..], t) || (!t.is_empty() && glob_inner(p, &t[1..]))
        }
        (Some('?'), Some(_)) => glob_inner(&p[1..], &t[1..]),
        (Some(pc), Some(tc)) if pc == tc => glob_inner(&p[1..], &t[1..]),
        _ => false,
    }
}
