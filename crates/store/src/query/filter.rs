//! Typed filter expressions.
//!
//! The `where` parameter arrives as duck-typed JSON. Rather than pass that
//! untyped mapping through to the backend, it is lifted into a tagged
//! expression tree here, validated once, then evaluated (or translated)
//! by backends.
//!
//! Supported shapes, following document-store convention:
//!
//! ```json
//! {"completed": false}                          // equality
//! {"deadline": {"$lt": "2026-01-01T00:00:00Z"}} // comparison
//! {"_id": {"$in": ["a", "b"]}}                  // membership
//! {"$or": [{"completed": true}, {"name": "x"}]} // disjunction
//! ```
//!
//! Multiple top-level fields combine as a conjunction.

use std::cmp::Ordering;

use serde_json::Value;

/// Comparison operators usable inside a field condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `$gt`
    Gt,
    /// `$gte`
    Gte,
    /// `$lt`
    Lt,
    /// `$lte`
    Lte,
    /// `$ne`
    Ne,
}

impl CompareOp {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "$gt" => Some(CompareOp::Gt),
            "$gte" => Some(CompareOp::Gte),
            "$lt" => Some(CompareOp::Lt),
            "$lte" => Some(CompareOp::Lte),
            "$ne" => Some(CompareOp::Ne),
            _ => None,
        }
    }
}

/// A validated filter expression over document fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// Matches every document.
    All,
    /// Field equals value. For array fields this matches when any element
    /// equals the value (so `{"pendingTasks": "t-1"}` works).
    Eq {
        field: String,
        value: Value,
    },
    /// Field compares against value with the given operator.
    Compare {
        field: String,
        op: CompareOp,
        value: Value,
    },
    /// Field value is one of the listed values.
    In {
        field: String,
        values: Vec<Value>,
    },
    /// Field value is none of the listed values.
    Nin {
        field: String,
        values: Vec<Value>,
    },
    /// All sub-expressions match.
    And(Vec<FilterExpr>),
    /// At least one sub-expression matches.
    Or(Vec<FilterExpr>),
}

impl FilterExpr {
    /// Builds a filter tree from a decoded `where` value.
    ///
    /// Returns a human-readable detail string on failure; the caller wraps
    /// it into a `MalformedParameter` error naming the parameter.
    pub fn from_value(value: &Value) -> Result<FilterExpr, String> {
        let map = value
            .as_object()
            .ok_or_else(|| "expected a JSON object".to_string())?;
        if map.is_empty() {
            return Ok(FilterExpr::All);
        }

        let mut clauses = Vec::with_capacity(map.len());
        for (key, entry) in map {
            match key.as_str() {
                "$or" => clauses.push(FilterExpr::Or(Self::branch_list(entry, "$or")?)),
                "$and" => clauses.push(FilterExpr::And(Self::branch_list(entry, "$and")?)),
                field => clauses.push(Self::field_condition(field, entry)?),
            }
        }
        Ok(if clauses.len() == 1 {
            clauses.remove(0)
        } else {
            FilterExpr::And(clauses)
        })
    }

    fn branch_list(value: &Value, op: &str) -> Result<Vec<FilterExpr>, String> {
        let entries = value
            .as_array()
            .ok_or_else(|| format!("{} expects an array of objects", op))?;
        entries.iter().map(Self::from_value).collect()
    }

    /// Parses a single `field: condition` entry. An object whose keys all
    /// start with `$` is an operator condition; anything else is a literal
    /// equality match.
    fn field_condition(field: &str, condition: &Value) -> Result<FilterExpr, String> {
        let operators = match condition.as_object() {
            Some(map) if !map.is_empty() && map.keys().all(|k| k.starts_with('$')) => map,
            _ => {
                return Ok(FilterExpr::Eq {
                    field: field.to_string(),
                    value: condition.clone(),
                });
            }
        };

        let mut clauses = Vec::with_capacity(operators.len());
        for (op, operand) in operators {
            let clause = match op.as_str() {
                "$eq" => FilterExpr::Eq {
                    field: field.to_string(),
                    value: operand.clone(),
                },
                "$in" => FilterExpr::In {
                    field: field.to_string(),
                    values: operand_list(op, operand)?,
                },
                "$nin" => FilterExpr::Nin {
                    field: field.to_string(),
                    values: operand_list(op, operand)?,
                },
                other => match CompareOp::parse(other) {
                    Some(compare) => FilterExpr::Compare {
                        field: field.to_string(),
                        op: compare,
                        value: operand.clone(),
                    },
                    None => return Err(format!("unknown operator \"{}\"", other)),
                },
            };
            clauses.push(clause);
        }
        Ok(if clauses.len() == 1 {
            clauses.remove(0)
        } else {
            FilterExpr::And(clauses)
        })
    }

    /// Evaluates the expression against a document.
    pub fn matches(&self, doc: &Value) -> bool {
        match self {
            FilterExpr::All => true,
            FilterExpr::Eq { field, value } => {
                value_eq(lookup(doc, field), value)
            }
            FilterExpr::Compare { field, op, value } => {
                let Some(actual) = lookup(doc, field) else {
                    // Missing fields only satisfy $ne.
                    return *op == CompareOp::Ne;
                };
                match op {
                    CompareOp::Ne => !value_eq(Some(actual), value),
                    _ => match compare_values(actual, value) {
                        Some(Ordering::Greater) => matches!(op, CompareOp::Gt | CompareOp::Gte),
                        Some(Ordering::Less) => matches!(op, CompareOp::Lt | CompareOp::Lte),
                        Some(Ordering::Equal) => matches!(op, CompareOp::Gte | CompareOp::Lte),
                        None => false,
                    },
                }
            }
            FilterExpr::In { field, values } => {
                let actual = lookup(doc, field);
                values.iter().any(|v| value_eq(actual, v))
            }
            FilterExpr::Nin { field, values } => {
                let actual = lookup(doc, field);
                !values.iter().any(|v| value_eq(actual, v))
            }
            FilterExpr::And(clauses) => clauses.iter().all(|c| c.matches(doc)),
            FilterExpr::Or(clauses) => clauses.iter().any(|c| c.matches(doc)),
        }
    }
}

fn operand_list(op: &str, operand: &Value) -> Result<Vec<Value>, String> {
    operand
        .as_array()
        .map(|v| v.to_vec())
        .ok_or_else(|| format!("{} expects an array", op))
}

/// Resolves a possibly dotted field path against a document.
pub fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

/// Equality with array-containment semantics on the document side.
fn value_eq(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        None => expected.is_null(),
        Some(Value::Array(items)) if !expected.is_array() => {
            items.iter().any(|item| item == expected)
        }
        Some(actual) => actual == expected,
    }
}

/// Orders two values the way the store sorts them: numbers numerically,
/// strings lexically (RFC 3339 timestamps order correctly), bools
/// false-before-true. Mixed types do not compare.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn filter(v: Value) -> FilterExpr {
        FilterExpr::from_value(&v).unwrap()
    }

    #[test]
    fn empty_object_matches_everything() {
        assert_eq!(filter(json!({})), FilterExpr::All);
        assert!(FilterExpr::All.matches(&json!({"anything": 1})));
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(FilterExpr::from_value(&json!([1, 2])).is_err());
        assert!(FilterExpr::from_value(&json!("completed")).is_err());
    }

    #[test]
    fn equality_on_scalar_fields() {
        let f = filter(json!({"completed": false}));
        assert!(f.matches(&json!({"completed": false})));
        assert!(!f.matches(&json!({"completed": true})));
        assert!(!f.matches(&json!({})));
    }

    #[test]
    fn equality_matches_array_membership() {
        let f = filter(json!({"pendingTasks": "t-1"}));
        assert!(f.matches(&json!({"pendingTasks": ["t-0", "t-1"]})));
        assert!(!f.matches(&json!({"pendingTasks": []})));
    }

    #[test]
    fn comparison_operators() {
        let f = filter(json!({"deadline": {"$lt": "2026-06-01T00:00:00Z"}}));
        assert!(f.matches(&json!({"deadline": "2026-01-01T00:00:00Z"})));
        assert!(!f.matches(&json!({"deadline": "2026-07-01T00:00:00Z"})));
        assert!(!f.matches(&json!({})));

        let f = filter(json!({"priority": {"$gte": 3}}));
        assert!(f.matches(&json!({"priority": 3})));
        assert!(f.matches(&json!({"priority": 5})));
        assert!(!f.matches(&json!({"priority": 2})));
    }

    #[test]
    fn ne_matches_missing_fields() {
        let f = filter(json!({"assignedUser": {"$ne": "u-1"}}));
        assert!(f.matches(&json!({"assignedUser": "u-2"})));
        assert!(f.matches(&json!({})));
        assert!(!f.matches(&json!({"assignedUser": "u-1"})));
    }

    #[test]
    fn membership_operators() {
        let f = filter(json!({"_id": {"$in": ["a", "b"]}}));
        assert!(f.matches(&json!({"_id": "a"})));
        assert!(!f.matches(&json!({"_id": "c"})));

        let f = filter(json!({"_id": {"$nin": ["a", "b"]}}));
        assert!(!f.matches(&json!({"_id": "a"})));
        assert!(f.matches(&json!({"_id": "c"})));
    }

    #[test]
    fn top_level_fields_are_a_conjunction() {
        let f = filter(json!({"completed": false, "assignedUser": "u-1"}));
        assert!(f.matches(&json!({"completed": false, "assignedUser": "u-1"})));
        assert!(!f.matches(&json!({"completed": false, "assignedUser": "u-2"})));
    }

    #[test]
    fn or_branches() {
        let f = filter(json!({"$or": [{"completed": true}, {"name": "urgent"}]}));
        assert!(f.matches(&json!({"completed": true, "name": "x"})));
        assert!(f.matches(&json!({"completed": false, "name": "urgent"})));
        assert!(!f.matches(&json!({"completed": false, "name": "x"})));
    }

    #[test]
    fn unknown_operator_is_rejected() {
        let err = FilterExpr::from_value(&json!({"name": {"$regex": "x"}})).unwrap_err();
        assert!(err.contains("$regex"));
    }

    #[test]
    fn or_requires_an_array() {
        assert!(FilterExpr::from_value(&json!({"$or": {"a": 1}})).is_err());
    }

    #[test]
    fn dotted_paths_resolve_nested_fields() {
        let f = filter(json!({"meta.priority": 2}));
        assert!(f.matches(&json!({"meta": {"priority": 2}})));
        assert!(!f.matches(&json!({"meta": {}})));
    }
}
