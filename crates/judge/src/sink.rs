use async_trait::async_trait;
use storage::dto::result::{RecordResultRequest, RecordResultResponse};

use crate::Result;

/// Somewhere results can be delivered to.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn submit(&self, request: &RecordResultRequest) -> Result<RecordResultResponse>;
}
