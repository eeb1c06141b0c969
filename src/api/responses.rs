use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LotSuccessResponse {
    pub count: u32,
    pub capacity: u32,
    pub is_full: bool,
    pub remaining: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_entry_at: Option<String>,
    pub entry_gate_open: bool,
    pub exit_gate_open: bool,
    pub feed_connected: bool,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct LotErrorResponse {
    pub error_code: LotErrorCode,
    pub error_message: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LotErrorCode {
    InternalError,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Ko,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthSuccessResponse {
    pub status: HealthStatus,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthErrorResponse {
    pub error_code: HealthErrorCode,
    pub error_message: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthErrorCode {
    InternalError,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ResetStatus {
    Accepted,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ResetSuccessResponse {
    pub status: ResetStatus,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ResetErrorResponse {
    pub error_code: ResetErrorCode,
    pub error_message: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResetErrorCode {
    TrackerUnavailable,
    InternalError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lot_response_omits_last_entry_when_absent() {
        let response = LotSuccessResponse {
            count: 0,
            capacity: 20,
            is_full: false,
            remaining: 20,
            last_entry_at: None,
            entry_gate_open: false,
            exit_gate_open: false,
            feed_connected: true,
            timestamp: "2026-08-26T12:30:00Z".to_string(),
        };

        let value = serde_json::to_value(response).expect("serialize lot response");
        assert_eq!(
            value,
            json!({
                "count": 0,
                "capacity": 20,
                "is_full": false,
                "remaining": 20,
                "entry_gate_open": false,
                "exit_gate_open": false,
                "feed_connected": true,
                "timestamp": "2026-08-26T12:30:00Z"
            })
        );
    }

    #[test]
    fn lot_response_includes_last_entry_when_present() {
        let response = LotSuccessResponse {
            count: 5,
            capacity: 20,
            is_full: false,
            remaining: 15,
            last_entry_at: Some("2026-08-26T12:15:00Z".to_string()),
            entry_gate_open: true,
            exit_gate_open: false,
            feed_connected: true,
            timestamp: "2026-08-26T12:30:00Z".to_string(),
        };

        let value = serde_json::to_value(response).expect("serialize lot response");
        assert_eq!(value["count"], 5);
        assert_eq!(value["last_entry_at"], "2026-08-26T12:15:00Z");
        assert_eq!(value["entry_gate_open"], true);
    }

    #[test]
    fn error_response_uses_screaming_snake_case_code() {
        let response = ResetErrorResponse {
            error_code: ResetErrorCode::TrackerUnavailable,
            error_message: "tracker queue full".to_string(),
            timestamp: "2026-08-26T12:32:00Z".to_string(),
        };

        let value = serde_json::to_value(response).expect("serialize error response");
        assert_eq!(
            value,
            json!({
                "error_code": "TRACKER_UNAVAILABLE",
                "error_message": "tracker queue full",
                "timestamp": "2026-08-26T12:32:00Z"
            })
        );
    }

    #[test]
    fn health_response_serializes_status_lowercase() {
        let response = HealthSuccessResponse {
            status: HealthStatus::Ko,
            timestamp: "2026-08-26T12:33:00Z".to_string(),
        };

        let value = serde_json::to_value(response).expect("serialize health response");
        assert_eq!(value["status"], "ko");
    }

    #[test]
    fn reset_response_serializes_accepted_status() {
        let response = ResetSuccessResponse {
            status: ResetStatus::Accepted,
            timestamp: "2026-08-26T12:34:00Z".to_string(),
        };

        let value = serde_json::to_value(response).expect("serialize reset response");
        assert_eq!(
            value,
            json!({
                "status": "accepted",
                "timestamp": "2026-08-26T12:34:00Z"
            })
        );
    }
}
