use serde_json::Value;
use tracing::debug;

use crate::action::{EditAction, EditOutcome};
use crate::core::{error::FetchError, ConditionError, ConditionSet, Record};
use crate::services::data_view::{DataView, FetchApplied, FetchTicket, ViewSnapshot};
use crate::services::source::RecordSource;

/// One user's filtering session: the fetched data plus the conditions being
/// edited against it.
#[derive(Debug, Default)]
pub struct FilterSession {
    pub view: DataView,
    pub conditions: ConditionSet,
}

impl FilterSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to a new source URL.
    ///
    /// Conditions go back to a single blank condition and a fetch starts for
    /// any non-blank URL.
    pub fn adopt_url(&mut self, url: &str) -> Option<FetchTicket> {
        debug!("adopting source url '{}'", url);
        self.conditions.reset();
        self.view.begin_fetch(url)
    }

    pub fn complete_fetch(&mut self, ticket: FetchTicket, result: Result<Value, FetchError>) -> FetchApplied {
        self.view.complete_fetch(ticket, result)
    }

    /// Adopt `url` and load it from `source` in one step
    pub async fn load(&mut self, source: &dyn RecordSource, url: &str) -> FetchApplied {
        let Some(ticket) = self.adopt_url(url) else {
            return FetchApplied::Skipped;
        };
        let result = source.fetch(ticket.url()).await;
        self.complete_fetch(ticket, result)
    }

    pub fn apply(&mut self, action: EditAction) -> Result<EditOutcome, ConditionError> {
        debug!("applying edit {}", action);
        self.conditions.apply(action)
    }

    pub fn filtered_data(&self) -> Vec<Record> {
        self.view.filtered(&self.conditions)
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.view.snapshot(&self.conditions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn adopting_a_url_resets_conditions() {
        let mut session = FilterSession::new();
        session.apply(EditAction::AddGroup).unwrap();
        assert_eq!(session.conditions.len(), 2);

        let ticket = session.adopt_url("http://example.test/data").unwrap();
        assert_eq!(session.conditions.len(), 1);
        let only = &session.conditions.groups()[0].conditions()[0];
        assert!(only.left.is_empty() && only.value.is_empty());
        assert_eq!(only.operator.to_string(), "equals");
        assert!(session.snapshot().loading);

        session.complete_fetch(ticket, Ok(json!([{"id": 1}])));
        assert_eq!(session.filtered_data().len(), 1);
    }
}
