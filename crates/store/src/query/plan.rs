//! Deferred query plans.
//!
//! [`QueryPlan::build`] composes a store-native plan from a [`ParsedQuery`]
//! for a given collection. Building never executes anything; execution and
//! error translation stay with the caller and the backend.

use serde_json::{Map, Value};

use crate::core::Collection;
use crate::query::params::ParsedQuery;
use crate::query::FilterExpr;

/// Ceiling applied to Task listings when the caller supplies no `limit`.
///
/// User listings deliberately have no such default: task collections grow
/// without bound while the user collection stays small, and existing
/// clients rely on an unqualified `/api/users` returning everything.
pub const DEFAULT_TASK_LIMIT: u64 = 100;

/// Sort direction for a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Direction value `1`.
    Ascending,
    /// Direction value `-1`.
    Descending,
}

/// An ordered list of sort directives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortSpec {
    /// Field/direction pairs, applied in order.
    pub fields: Vec<(String, SortOrder)>,
}

impl SortSpec {
    /// Builds a sort spec from a decoded `sort` value.
    ///
    /// Directions must be non-zero numbers: positive ascending, negative
    /// descending.
    pub fn from_value(value: &Value) -> Result<SortSpec, String> {
        let map = value
            .as_object()
            .ok_or_else(|| "expected a JSON object".to_string())?;
        let mut fields = Vec::with_capacity(map.len());
        for (field, direction) in map {
            let direction = direction
                .as_f64()
                .filter(|d| *d != 0.0)
                .ok_or_else(|| {
                    format!("sort direction for \"{}\" must be a non-zero number", field)
                })?;
            let order = if direction > 0.0 {
                SortOrder::Ascending
            } else {
                SortOrder::Descending
            };
            fields.push((field.clone(), order));
        }
        Ok(SortSpec { fields })
    }
}

/// A field projection decoded from `select`.
///
/// Follows document-store convention: if any field is marked `1` the
/// projection is inclusive (and `_id` stays unless explicitly excluded);
/// otherwise it is exclusive.
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    /// Keep only the listed fields. `with_id` keeps `_id` too.
    Include {
        fields: Vec<String>,
        with_id: bool,
    },
    /// Keep everything except the listed fields.
    Exclude {
        fields: Vec<String>,
    },
}

impl Projection {
    /// Builds a projection from a decoded `select` value.
    pub fn from_value(value: &Value) -> Result<Projection, String> {
        let map = value
            .as_object()
            .ok_or_else(|| "expected a JSON object".to_string())?;
        let mut included = Vec::new();
        let mut excluded = Vec::new();
        let mut id_excluded = false;
        for (field, flag) in map {
            let include = match flag {
                Value::Number(n) => n.as_f64().unwrap_or(0.0) != 0.0,
                Value::Bool(b) => *b,
                _ => {
                    return Err(format!(
                        "projection value for \"{}\" must be 0 or 1",
                        field
                    ));
                }
            };
            if include {
                if field != "_id" {
                    included.push(field.clone());
                }
            } else if field == "_id" {
                id_excluded = true;
            } else {
                excluded.push(field.clone());
            }
        }
        if !included.is_empty() {
            return Ok(Projection::Include {
                fields: included,
                with_id: !id_excluded,
            });
        }
        // Exclusion mode; an empty map degenerates to the identity.
        let mut fields = excluded;
        if id_excluded {
            fields.push("_id".to_string());
        }
        Ok(Projection::Exclude { fields })
    }

    /// Applies the projection to a single document.
    ///
    /// Non-object values pass through unchanged.
    pub fn apply(&self, doc: &Value) -> Value {
        let Some(map) = doc.as_object() else {
            return doc.clone();
        };
        match self {
            Projection::Include { fields, with_id } => {
                let mut out = Map::new();
                if *with_id {
                    if let Some(id) = map.get("_id") {
                        out.insert("_id".to_string(), id.clone());
                    }
                }
                for field in fields {
                    if let Some(value) = map.get(field) {
                        out.insert(field.clone(), value.clone());
                    }
                }
                Value::Object(out)
            }
            Projection::Exclude { fields } => {
                let mut out = map.clone();
                for field in fields {
                    out.remove(field);
                }
                Value::Object(out)
            }
        }
    }
}

/// A deferred, bounded query over one collection.
///
/// Built once from validated input; backends execute it without re-parsing
/// anything client-supplied.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    /// The collection to query.
    pub collection: Collection,
    /// The base filter; `FilterExpr::All` when the caller sent none.
    pub filter: FilterExpr,
    /// Optional sort directives.
    pub sort: Option<SortSpec>,
    /// Optional projection.
    pub projection: Option<Projection>,
    /// Documents to skip, applied before `limit`.
    pub skip: u64,
    /// Maximum documents to return.
    pub limit: Option<u64>,
    /// When set, the plan is a count over the filter; sort, projection,
    /// skip and limit are accepted but not meaningful.
    pub count_only: bool,
}

impl QueryPlan {
    /// Composes a plan from parsed query parameters.
    pub fn build(collection: Collection, parsed: ParsedQuery) -> QueryPlan {
        let limit = parsed.limit.or(match collection {
            Collection::Tasks => Some(DEFAULT_TASK_LIMIT),
            Collection::Users => None,
        });
        QueryPlan {
            collection,
            filter: parsed.filter.unwrap_or(FilterExpr::All),
            sort: parsed.sort,
            projection: parsed.projection,
            skip: parsed.skip.unwrap_or(0),
            limit,
            count_only: parsed.count,
        }
    }

    /// A match-everything plan over a collection, for internal callers.
    pub fn all(collection: Collection) -> QueryPlan {
        QueryPlan {
            collection,
            filter: FilterExpr::All,
            sort: None,
            projection: None,
            skip: 0,
            limit: None,
            count_only: false,
        }
    }
}
