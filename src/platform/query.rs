//! Query builder for list endpoints
//!
//! A query accumulates field selection, search predicates, sort order and
//! pagination, then flattens into request parameters. Each resource carries a
//! static allowlist of fields. Searching on a field outside the allowlist is
//! an error; selecting or sorting on one is ignored.

use std::marker::PhantomData;

use crate::error::{PlatformError, Result};

/// Resource a query targets
pub trait QueryResource {
    /// Name used in error messages
    const NAME: &'static str;
    /// Fields the server accepts for selection, search and sort
    const SUPPORTED_FIELDS: &'static [&'static str];
}

#[derive(Debug, Clone, Copy)]
pub struct DataResource;

#[derive(Debug, Clone, Copy)]
pub struct JobsResource;

#[derive(Debug, Clone, Copy)]
pub struct AnalyticsResource;

impl QueryResource for DataResource {
    const NAME: &'static str = "data";
    const SUPPORTED_FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "encoding",
        "type",
        "size",
        "upload_date",
        "expiration_date",
    ];
}

impl QueryResource for JobsResource {
    const NAME: &'static str = "jobs";
    const SUPPORTED_FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "state",
        "archived",
        "upload_date",
        "analytic_id",
        "auto_start",
        "compute_mode",
        "start_date",
        "completion_date",
        "fail_date",
        "failure_type",
    ];
}

impl QueryResource for AnalyticsResource {
    const NAME: &'static str = "analytics";
    const SUPPORTED_FIELDS: &'static [&'static str] = &[
        "id",
        "name",
        "version",
        "upload_date",
        "description",
        "scope",
        "supports_cpu",
        "supports_gpu",
        "pending",
    ];
}

pub type DataQuery = Query<DataResource>;
pub type JobsQuery = Query<JobsResource>;
pub type AnalyticsQuery = Query<AnalyticsResource>;

/// Fluent query over a resource's records
#[derive(Debug, Clone)]
pub struct Query<R> {
    fields: Vec<String>,
    search: Vec<String>,
    sort: Option<String>,
    offset: Option<u64>,
    limit: Option<u64>,
    all_versions: bool,
    _resource: PhantomData<R>,
}

impl<R: QueryResource> Default for Query<R> {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            search: Vec::new(),
            sort: None,
            offset: None,
            limit: None,
            all_versions: false,
            _resource: PhantomData,
        }
    }
}

impl<R: QueryResource> Query<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_supported(field: &str) -> bool {
        R::SUPPORTED_FIELDS.contains(&field)
    }

    /// Select a field; unsupported fields are ignored
    pub fn add_field(mut self, field: &str) -> Self {
        if Self::is_supported(field) && !self.fields.iter().any(|f| f == field) {
            self.fields.push(field.to_string());
        }
        self
    }

    pub fn add_fields<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        fields
            .into_iter()
            .fold(self, |query, field| query.add_field(field.as_ref()))
    }

    pub fn add_all_fields(self) -> Self {
        self.add_fields(R::SUPPORTED_FIELDS.iter().copied())
    }

    /// Add a `field:value` search predicate
    pub fn add_search(mut self, field: &str, value: &str) -> Result<Self> {
        if !Self::is_supported(field) {
            return Err(PlatformError::UnsupportedField {
                resource: R::NAME.to_string(),
                field: field.to_string(),
            });
        }
        self.search.push(format!("{}:{}", field, value));
        Ok(self)
    }

    /// Add a search matching any of `values`
    pub fn add_search_or<I, S>(self, field: &str, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>()
            .join("|");
        self.add_search(field, &joined)
    }

    /// Add a predicate verbatim, as typed by a user (`[FIELD:]STR`)
    pub fn add_raw_search(mut self, predicate: &str) -> Self {
        if !predicate.is_empty() {
            self.search.push(predicate.to_string());
        }
        self
    }

    /// Sort on a field; unsupported fields are ignored
    pub fn sort_by(mut self, field: &str, descending: bool) -> Self {
        if Self::is_supported(field) {
            let order = if descending { "desc" } else { "asc" };
            self.sort = Some(format!("{}:{}", field, order));
        }
        self
    }

    /// Negative offsets are ignored
    pub fn set_offset(mut self, offset: i64) -> Self {
        if let Ok(offset) = u64::try_from(offset) {
            self.offset = Some(offset);
        }
        self
    }

    /// Non-positive limits are ignored
    pub fn set_limit(mut self, limit: i64) -> Self {
        if limit > 0 {
            self.limit = Some(limit as u64);
        }
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn search(&self) -> &[String] {
        &self.search
    }

    pub fn sort(&self) -> Option<&str> {
        self.sort.as_deref()
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Flatten into request parameters
    ///
    /// Empty values are omitted. Fields are comma-joined; every search
    /// predicate becomes its own `search` pair.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if !self.fields.is_empty() {
            params.push(("fields".to_string(), self.fields.join(",")));
        }
        for predicate in &self.search {
            params.push(("search".to_string(), predicate.clone()));
        }
        if let Some(sort) = &self.sort {
            params.push(("sort".to_string(), sort.clone()));
        }
        if let Some(offset) = self.offset.filter(|o| *o > 0) {
            params.push(("offset".to_string(), offset.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if self.all_versions {
            params.push(("all_versions".to_string(), "true".to_string()));
        }
        params
    }

    /// URL-encoded query string
    pub fn to_query_string(&self) -> String {
        self.to_params()
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl Query<AnalyticsResource> {
    /// Include every version of each analytic
    pub fn set_all_versions(mut self, all_versions: bool) -> Self {
        self.all_versions = all_versions;
        self
    }
}
