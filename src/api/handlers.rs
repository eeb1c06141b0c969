use crate::api::ApiContext;
use crate::api::responses::{
    HealthErrorCode, HealthErrorResponse, HealthStatus, HealthSuccessResponse, LotErrorCode,
    LotErrorResponse, LotSuccessResponse, ResetErrorCode, ResetErrorResponse, ResetStatus,
    ResetSuccessResponse,
};
use crate::state::AppState;
use crate::tracker::TrackerCommand;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::sync::{Arc, RwLock};
use std::time::SystemTime;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::mpsc;
use tracing::error;

const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

pub enum LotResponse {
    Success(LotSuccessResponse),
    Error {
        status: StatusCode,
        body: LotErrorResponse,
    },
}

impl IntoResponse for LotResponse {
    fn into_response(self) -> Response {
        match self {
            LotResponse::Success(body) => (StatusCode::OK, Json(body)).into_response(),
            LotResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub async fn get_lot(State(context): State<ApiContext>) -> impl IntoResponse {
    build_lot_response(context.state, SystemTime::now())
}

pub enum HealthResponse {
    Success {
        status: StatusCode,
        body: HealthSuccessResponse,
    },
    Error {
        status: StatusCode,
        body: HealthErrorResponse,
    },
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        match self {
            HealthResponse::Success { status, body } => (status, Json(body)).into_response(),
            HealthResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub async fn get_health(State(context): State<ApiContext>) -> impl IntoResponse {
    build_health_response(context.state, SystemTime::now())
}

pub enum ResetResponse {
    Accepted(ResetSuccessResponse),
    Error {
        status: StatusCode,
        body: ResetErrorResponse,
    },
}

impl IntoResponse for ResetResponse {
    fn into_response(self) -> Response {
        match self {
            ResetResponse::Accepted(body) => (StatusCode::ACCEPTED, Json(body)).into_response(),
            ResetResponse::Error { status, body } => (status, Json(body)).into_response(),
        }
    }
}

pub async fn post_reset(State(context): State<ApiContext>) -> impl IntoResponse {
    build_reset_response(&context.commands, SystemTime::now())
}

fn build_lot_response(state: Arc<RwLock<AppState>>, now: SystemTime) -> LotResponse {
    let guard = match state.read() {
        Ok(guard) => guard,
        Err(_) => {
            return lot_internal_error("state lock poisoned while reading snapshot");
        }
    };
    let snapshot = guard.snapshot().clone();
    let feed_connected = guard.feed_connected();
    drop(guard);

    let timestamp = match format_timestamp(now) {
        Some(formatted) => formatted,
        None => {
            return lot_internal_error("timestamp formatting failure");
        }
    };

    let last_entry_at = match snapshot.last_entry_at {
        Some(at) => match format_timestamp(at) {
            Some(formatted) => Some(formatted),
            None => {
                return lot_internal_error("last-entry timestamp formatting failure");
            }
        },
        None => None,
    };

    LotResponse::Success(LotSuccessResponse {
        count: snapshot.count,
        capacity: snapshot.capacity,
        is_full: snapshot.is_full,
        remaining: snapshot.capacity.saturating_sub(snapshot.count),
        last_entry_at,
        entry_gate_open: snapshot.entry_gate_open,
        exit_gate_open: snapshot.exit_gate_open,
        feed_connected,
        timestamp,
    })
}

fn build_health_response(state: Arc<RwLock<AppState>>, now: SystemTime) -> HealthResponse {
    let feed_connected = match state.read() {
        Ok(guard) => guard.feed_connected(),
        Err(_) => {
            return health_internal_error("state lock poisoned while reading connectivity");
        }
    };

    let timestamp = match format_timestamp(now) {
        Some(formatted) => formatted,
        None => {
            return health_internal_error("timestamp formatting failure");
        }
    };

    let (status_code, status) = if feed_connected {
        (StatusCode::OK, HealthStatus::Ok)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::Ko)
    };

    HealthResponse::Success {
        status: status_code,
        body: HealthSuccessResponse { status, timestamp },
    }
}

fn build_reset_response(
    commands: &mpsc::Sender<TrackerCommand>,
    now: SystemTime,
) -> ResetResponse {
    let timestamp = match format_timestamp(now) {
        Some(formatted) => formatted,
        None => {
            return reset_internal_error("timestamp formatting failure");
        }
    };

    match commands.try_send(TrackerCommand::Reset) {
        Ok(()) => ResetResponse::Accepted(ResetSuccessResponse {
            status: ResetStatus::Accepted,
            timestamp,
        }),
        Err(err) => {
            error!(error = %err, "Failed to enqueue reset command");
            ResetResponse::Error {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: ResetErrorResponse {
                    error_code: ResetErrorCode::TrackerUnavailable,
                    error_message: "Tracker is not accepting commands".to_string(),
                    timestamp,
                },
            }
        }
    }
}

fn format_timestamp(timestamp: SystemTime) -> Option<String> {
    OffsetDateTime::from(timestamp).format(&Rfc3339).ok()
}

fn fallback_timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

fn lot_internal_error(message: &str) -> LotResponse {
    error!(message = message, "Internal error while handling /api/lot");
    LotResponse::Error {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: LotErrorResponse {
            error_code: LotErrorCode::InternalError,
            error_message: INTERNAL_ERROR_MESSAGE.to_string(),
            timestamp: fallback_timestamp(),
        },
    }
}

fn health_internal_error(message: &str) -> HealthResponse {
    error!(message = message, "Internal error while handling /api/health");
    HealthResponse::Error {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: HealthErrorResponse {
            error_code: HealthErrorCode::InternalError,
            error_message: INTERNAL_ERROR_MESSAGE.to_string(),
            timestamp: fallback_timestamp(),
        },
    }
}

fn reset_internal_error(message: &str) -> ResetResponse {
    error!(message = message, "Internal error while handling /api/reset");
    ResetResponse::Error {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        body: ResetErrorResponse {
            error_code: ResetErrorCode::InternalError,
            error_message: INTERNAL_ERROR_MESSAGE.to_string(),
            timestamp: fallback_timestamp(),
        },
    }
}
