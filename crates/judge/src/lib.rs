//! Judge-side client: results are written to a local outbox first and
//! delivered to the API whenever it can be reached.

pub mod client;
pub mod error;
pub mod outbox;
pub mod retry;
pub mod sink;

pub use client::ApiClient;
pub use error::{JudgeError, Result};
pub use outbox::{FlushReport, Outbox, PendingResult};
pub use retry::RetryPolicy;
pub use sink::ResultSink;
