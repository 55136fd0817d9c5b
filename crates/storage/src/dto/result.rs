use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::models::{AthleteResult, ResultStatus};

/// A result as typed in by a judge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct RecordResultRequest {
    pub athlete_id: Uuid,

    pub competition_id: Uuid,

    /// Accepts `.` or `,` as decimal separator. Ignored unless status is active.
    #[serde(default)]
    #[validate(length(max = 32))]
    pub value: String,

    #[serde(default)]
    pub status: ResultStatus,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,

    /// Generated by the client so retried submissions are recognised.
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecordResultResponse {
    pub result: AthleteResult,
    /// A previous result for the same athlete and competition was replaced.
    pub superseded: bool,
    /// The client id had already been recorded; nothing was written.
    pub duplicate: bool,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ResultFilter {
    pub event_id: Option<Uuid>,
    pub competition_id: Option<Uuid>,
    pub athlete_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let req: RecordResultRequest = serde_json::from_value(serde_json::json!({
            "athlete_id": Uuid::nil(),
            "competition_id": Uuid::nil(),
            "status": "dns"
        }))
        .unwrap();

        assert_eq!(req.value, "");
        assert_eq!(req.status, ResultStatus::Dns);
        assert_eq!(req.client_id, None);
        assert!(req.validate().is_ok());
    }
}
