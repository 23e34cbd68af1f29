pub mod data_view;
pub mod session;
pub mod source;

pub use data_view::{DataView, FetchApplied, FetchTicket, ViewSnapshot, FETCH_ERROR_MESSAGE};
pub use session::FilterSession;
pub use source::{HttpSource, RecordSource};
