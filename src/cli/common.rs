//! Common CLI types shared across commands

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Args, ValueEnum};

use crate::config::defaults;
use crate::platform::query::{Query, QueryResource};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain table (default)
    Table,
    /// Pretty-printed JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse an expiration date given as RFC 3339 or as a plain `YYYY-MM-DD` (midnight UTC)
pub fn parse_ttl(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| format!("invalid date '{}', expected YYYY-MM-DD or RFC 3339", value))
}

/// Listing flags shared by data, jobs and analytics
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Maximum number of records to list (0 for all)
    #[arg(short = 'n', long, default_value_t = defaults::LIST_LIMIT)]
    pub limit: i64,

    /// Search predicate to limit results, as [FIELD:]STR (repeatable)
    #[arg(long, value_name = "[FIELD:]STR")]
    pub search: Vec<String>,

    /// Field to sort by
    #[arg(long, value_name = "FIELD", default_value = "upload_date")]
    pub sort_by: String,

    /// Sort in ascending order
    #[arg(long, default_value_t = false)]
    pub ascending: bool,

    /// Print the number of records listed
    #[arg(short = 'c', long, default_value_t = false)]
    pub count: bool,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,
}

impl ListArgs {
    /// Query selecting every field, with the search, sort and limit flags applied
    pub fn to_query<R: QueryResource>(&self) -> Query<R> {
        let query = self
            .search
            .iter()
            .fold(Query::<R>::new().add_all_fields(), |query, predicate| {
                query.add_raw_search(predicate)
            });
        query
            .sort_by(&self.sort_by, !self.ascending)
            .set_limit(self.limit)
    }
}
