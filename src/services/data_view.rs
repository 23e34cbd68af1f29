use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::core::{
    error::FetchError,
    evaluator,
    schema::{infer_from_rows, rows_from_payload},
    ConditionSet, FieldDescriptor, Record,
};
use crate::services::source::RecordSource;

/// The one message surfaced to the user when a fetch fails
pub const FETCH_ERROR_MESSAGE: &str = "Failed to fetch data. Please try again later.";

/// Token tying an in-flight fetch to the URL adoption that started it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
    url: String,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// What `complete_fetch` did with a result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchApplied {
    /// Rows and columns replaced
    Loaded { rows: usize },
    /// Error message set, previous rows kept
    Failed,
    /// A newer URL was adopted meanwhile; result dropped
    Stale,
    /// Empty URL, nothing fetched
    Skipped,
}

/// Fetch/filter orchestrator.
///
/// This owns the fetch lifecycle state:
/// - the adopted source URL and its generation counter
/// - the fetched rows and the columns inferred from them
/// - the loading flag and the user-facing error message
///
/// The filtered view is never stored; it is derived from the rows and the
/// caller's condition set on every read.
#[derive(Debug, Default)]
pub struct DataView {
    url: String,
    generation: u64,
    rows: Vec<Record>,
    columns: Vec<FieldDescriptor>,
    loading: bool,
    error: String,
}

/// Everything the presentation layer observes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub api_data: Vec<Record>,
    pub columns: Vec<FieldDescriptor>,
    pub loading: bool,
    pub error: String,
    pub filtered_data: Vec<Record>,
}

impl DataView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn columns(&self) -> &[FieldDescriptor] {
        &self.columns
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Empty when the last fetch succeeded (or none ran)
    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn has_error(&self) -> bool {
        !self.error.is_empty()
    }

    /// Adopt a source URL and start a fetch for it.
    ///
    /// Every call supersedes any fetch still in flight. An empty URL starts
    /// nothing and returns `None`.
    pub fn begin_fetch(&mut self, url: &str) -> Option<FetchTicket> {
        self.generation += 1;
        self.url = url.to_string();
        if url.is_empty() {
            self.loading = false;
            return None;
        }
        self.loading = true;
        info!("fetching records from {} (generation {})", url, self.generation);
        Some(FetchTicket {
            generation: self.generation,
            url: self.url.clone(),
        })
    }

    /// Apply the outcome of a fetch, unless a newer URL has been adopted since.
    pub fn complete_fetch(&mut self, ticket: FetchTicket, result: Result<Value, FetchError>) -> FetchApplied {
        if ticket.generation != self.generation {
            warn!(
                "dropping stale response for {} (generation {}, current {})",
                ticket.url, ticket.generation, self.generation
            );
            return FetchApplied::Stale;
        }
        self.loading = false;
        match result {
            Ok(payload) => {
                if !payload.is_array() {
                    warn!("payload from {} is not an array; treating as empty", ticket.url);
                }
                self.rows = rows_from_payload(payload);
                self.columns = infer_from_rows(&self.rows);
                self.error.clear();
                info!("loaded {} rows with {} columns from {}", self.rows.len(), self.columns.len(), ticket.url);
                FetchApplied::Loaded { rows: self.rows.len() }
            }
            Err(e) => {
                error!("Error getting API info from {}: {}", ticket.url, e);
                self.error = FETCH_ERROR_MESSAGE.to_string();
                FetchApplied::Failed
            }
        }
    }

    /// Adopt `url`, fetch it from `source` and apply the result
    pub async fn load(&mut self, source: &dyn RecordSource, url: &str) -> FetchApplied {
        let Some(ticket) = self.begin_fetch(url) else {
            return FetchApplied::Skipped;
        };
        let result = source.fetch(ticket.url()).await;
        self.complete_fetch(ticket, result)
    }

    /// Rows passing `conditions`, recomputed on every call
    pub fn filtered(&self, conditions: &ConditionSet) -> Vec<Record> {
        evaluator::filter(&self.rows, conditions)
    }

    pub fn snapshot(&self, conditions: &ConditionSet) -> ViewSnapshot {
        ViewSnapshot {
            api_data: self.rows.clone(),
            columns: self.columns.clone(),
            loading: self.loading,
            error: self.error.clone(),
            filtered_data: self.filtered(conditions),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Condition;
    use crate::core::ConditionGroup;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parse_failure() -> FetchError {
        FetchError::InvalidJson(serde_json::from_str::<Value>("<html>").unwrap_err())
    }

    #[test]
    fn test_successful_fetch_replaces_rows_and_columns() {
        let mut view = DataView::new();
        let ticket = view.begin_fetch("http://a").unwrap();
        assert!(view.is_loading());

        let applied = view.complete_fetch(ticket, Ok(json!([{"id": 1, "name": "John"}])));
        assert_eq!(applied, FetchApplied::Loaded { rows: 1 });
        assert!(!view.is_loading());
        assert!(!view.has_error());
        let fields: Vec<_> = view.columns().iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["id", "name"]);
    }

    #[test]
    fn test_failure_keeps_previous_rows() {
        let mut view = DataView::new();
        let t1 = view.begin_fetch("http://a").unwrap();
        view.complete_fetch(t1, Ok(json!([{"id": 1}])));

        let t2 = view.begin_fetch("http://b").unwrap();
        assert_eq!(view.complete_fetch(t2, Err(parse_failure())), FetchApplied::Failed);
        assert_eq!(view.error(), FETCH_ERROR_MESSAGE);
        assert!(!view.is_loading());
        assert_eq!(view.rows().len(), 1);
        assert_eq!(view.columns().len(), 1);

        let t3 = view.begin_fetch("http://c").unwrap();
        view.complete_fetch(t3, Ok(json!([])));
        assert!(!view.has_error());
    }

    #[test]
    fn test_empty_or_non_array_payload_clears_schema() {
        let mut view = DataView::new();
        let t1 = view.begin_fetch("http://a").unwrap();
        view.complete_fetch(t1, Ok(json!([{"id": 1}])));

        let t2 = view.begin_fetch("http://b").unwrap();
        assert_eq!(view.complete_fetch(t2, Ok(json!([]))), FetchApplied::Loaded { rows: 0 });
        assert!(view.columns().is_empty());
        assert!(view.rows().is_empty());

        let t3 = view.begin_fetch("http://c").unwrap();
        assert_eq!(view.complete_fetch(t3, Ok(json!({"id": 1}))), FetchApplied::Loaded { rows: 0 });
        assert!(view.columns().is_empty());
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut view = DataView::new();
        let old = view.begin_fetch("http://old").unwrap();
        let new = view.begin_fetch("http://new").unwrap();

        assert_eq!(view.complete_fetch(new, Ok(json!([{"fresh": true}]))), FetchApplied::Loaded { rows: 1 });
        assert_eq!(view.complete_fetch(old, Ok(json!([{"stale": true}]))), FetchApplied::Stale);
        assert_eq!(view.columns()[0].field, "fresh");
        assert_eq!(view.url(), "http://new");
    }

    #[test]
    fn test_stale_completion_leaves_loading_for_current() {
        let mut view = DataView::new();
        let old = view.begin_fetch("http://old").unwrap();
        let _current = view.begin_fetch("http://new").unwrap();
        view.complete_fetch(old, Err(parse_failure()));
        assert!(view.is_loading());
        assert!(!view.has_error());
    }

    #[test]
    fn test_blank_url_skips_and_invalidates() {
        let mut view = DataView::new();
        let pending = view.begin_fetch("http://a").unwrap();
        assert!(view.begin_fetch("").is_none());
        assert!(!view.is_loading());
        assert_eq!(view.complete_fetch(pending, Ok(json!([{"id": 1}]))), FetchApplied::Stale);
        assert!(view.rows().is_empty());
    }

    #[test]
    fn test_whitespace_url_is_fetched_as_is() {
        let mut view = DataView::new();
        let ticket = view.begin_fetch("  ").unwrap();
        assert_eq!(ticket.url(), "  ");
        assert!(view.is_loading());
    }

    #[test]
    fn test_snapshot_derives_filtered_data() {
        let mut view = DataView::new();
        let t = view.begin_fetch("http://a").unwrap();
        view.complete_fetch(t, Ok(json!([{"id": 1, "name": "John"}, {"id": 2, "name": "Jane"}])));

        let set = ConditionSet::from_groups(vec![ConditionGroup::new(vec![Condition::new("name", "contain", "Ja")])]);
        let snapshot = view.snapshot(&set);
        assert_eq!(snapshot.api_data.len(), 2);
        assert_eq!(snapshot.filtered_data.len(), 1);
        assert_eq!(snapshot.filtered_data[0]["name"], "Jane");

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("filteredData").is_some());
        assert!(json.get("apiData").is_some());
    }
}
