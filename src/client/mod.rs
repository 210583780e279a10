//! Access layer: typed API clients plus the reusable call plumbing
//! (retry engine, call-state container, caching wrappers)

pub mod boletines;
pub mod call_state;
pub mod news;
pub mod retry;
pub mod sources;

pub use boletines::{BoletinApi, BoletinClient};
pub use call_state::{CallSnapshot, CallState};
pub use news::{
    date_months_before, search_window, CachedNewsClient, NewsApi, NewsClient,
};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use sources::{SourceCategory, SourceSelection, Trend};
