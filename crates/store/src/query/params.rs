//! Query-string parameter parsing.
//!
//! Turns the raw key/value map from a list endpoint's query string into a
//! typed [`ParsedQuery`]. Parsing is pure; nothing here touches the store.
//!
//! Parsing policy:
//!
//! - `where`, `sort`, `select` are JSON-encoded. A decode failure (or a
//!   decoded value of the wrong shape) fails the whole request with a
//!   [`QueryError::MalformedParameter`] naming the parameter.
//! - `skip` and `limit` are plain integers. Values that do not parse are
//!   silently ignored; a cosmetic typo on pagination should not reject
//!   the request. This leniency is deliberate.
//! - `count` is true only for the exact string `"true"`.
//! - Unknown keys are ignored.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::QueryError;
use crate::query::filter::FilterExpr;
use crate::query::plan::{Projection, SortSpec};

/// The validated, typed form of a list endpoint's query string.
#[derive(Debug, Clone, Default)]
pub struct ParsedQuery {
    /// Filter from `where`, when present.
    pub filter: Option<FilterExpr>,
    /// Sort directives from `sort`, when present.
    pub sort: Option<SortSpec>,
    /// Projection from `select`, when present.
    pub projection: Option<Projection>,
    /// Documents to skip, from `skip`.
    pub skip: Option<u64>,
    /// Maximum documents to return, from `limit`.
    pub limit: Option<u64>,
    /// Whether the caller asked for a count instead of documents.
    pub count: bool,
}

impl ParsedQuery {
    /// Parses and validates the raw query-string map.
    pub fn from_raw(raw: &HashMap<String, String>) -> Result<ParsedQuery, QueryError> {
        let filter = decode_json_param(raw, "where")?
            .map(|v| FilterExpr::from_value(&v).map_err(|detail| malformed("where", detail)))
            .transpose()?;
        let sort = decode_json_param(raw, "sort")?
            .map(|v| SortSpec::from_value(&v).map_err(|detail| malformed("sort", detail)))
            .transpose()?;
        let projection = decode_json_param(raw, "select")?
            .map(|v| Projection::from_value(&v).map_err(|detail| malformed("select", detail)))
            .transpose()?;

        Ok(ParsedQuery {
            filter,
            sort,
            projection,
            skip: lenient_integer(raw.get("skip")),
            limit: lenient_integer(raw.get("limit")),
            count: raw.get("count").map(String::as_str) == Some("true"),
        })
    }
}

/// Parses just the `select` parameter, for single-document reads.
pub fn parse_select(raw: &HashMap<String, String>) -> Result<Option<Projection>, QueryError> {
    decode_json_param(raw, "select")?
        .map(|v| Projection::from_value(&v).map_err(|detail| malformed("select", detail)))
        .transpose()
}

fn decode_json_param(
    raw: &HashMap<String, String>,
    param: &'static str,
) -> Result<Option<Value>, QueryError> {
    match raw.get(param) {
        None => Ok(None),
        Some(text) => serde_json::from_str(text)
            .map(Some)
            .map_err(|e| malformed(param, e.to_string())),
    }
}

fn malformed(param: &'static str, detail: impl Into<String>) -> QueryError {
    QueryError::MalformedParameter {
        param,
        detail: detail.into(),
    }
}

fn lenient_integer(raw: Option<&String>) -> Option<u64> {
    raw.and_then(|s| s.parse().ok())
}
