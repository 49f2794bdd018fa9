use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::env;
use std::fmt::{self, Debug, Display};

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

pub const ENV_VAR_ERROR: i32 = 1;
pub const REQWEST_ERROR: i32 = 3;
pub const UPSTREAM_ERROR: i32 = 4;
pub const UNEXPECTED_ERROR: i32 = 5;
pub const INVALID_STATE_ERROR: i32 = 100;
pub const INVALID_INPUT_ERROR: i32 = 101;
pub const ADDRESS_NOT_FOUND_ERROR: i32 = 102;
pub const NO_ROUTE_AVAILABLE_ERROR: i32 = 103;
pub const PERMISSION_DENIED_ERROR: i32 = 104;

impl Error {
    pub fn is_address_not_found(&self) -> bool {
        self.code == ADDRESS_NOT_FOUND_ERROR
    }

    pub fn is_no_route_available(&self) -> bool {
        self.code == NO_ROUTE_AVAILABLE_ERROR
    }

    pub fn is_permission_denied(&self) -> bool {
        self.code == PERMISSION_DENIED_ERROR
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.code {
            1..=99 => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
            _ => (StatusCode::BAD_REQUEST, self.message.as_str()),
        };

        let body = Json(json!({
            "code": self.code,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub fn invalid_state_error() -> Error {
    Error {
        code: INVALID_STATE_ERROR,
        message: "invalid state".into(),
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        code: INVALID_INPUT_ERROR,
        message: "invalid input".into(),
    }
}

pub fn incomplete_route_error() -> Error {
    Error {
        code: INVALID_INPUT_ERROR,
        message: "Please enter a valid starting point and at least one destination".into(),
    }
}

pub fn address_not_found_error() -> Error {
    Error {
        code: ADDRESS_NOT_FOUND_ERROR,
        message: "Address not found".into(),
    }
}

pub fn no_route_available_error() -> Error {
    Error {
        code: NO_ROUTE_AVAILABLE_ERROR,
        message: "Directions not available.".into(),
    }
}

pub fn permission_denied_error() -> Error {
    Error {
        code: PERMISSION_DENIED_ERROR,
        message: "location permission denied".into(),
    }
}

pub fn env_var_error(err: env::VarError) -> Error {
    tracing::error!("environment variable error: {}", err);

    Error {
        code: ENV_VAR_ERROR,
        message: "environment variable error".into(),
    }
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    tracing::warn!("request failed: {}", err);

    Error {
        code: REQWEST_ERROR,
        message: "reqwest error".into(),
    }
}

pub fn upstream_error() -> Error {
    Error {
        code: UPSTREAM_ERROR,
        message: "upstream error".into(),
    }
}

pub fn unexpected_error<T: Debug>(err: T) -> Error {
    tracing::error!("unexpected error: {:?}", err);

    Error {
        code: UNEXPECTED_ERROR,
        message: "unexpected error".into(),
    }
}

#[test]
fn internal_errors_hide_their_message() {
    let response = upstream_error().into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = address_not_found_error().into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn error_kinds_are_distinguishable() {
    assert!(address_not_found_error().is_address_not_found());
    assert!(no_route_available_error().is_no_route_available());
    assert!(permission_denied_error().is_permission_denied());
    assert!(!incomplete_route_error().is_no_route_available());
    assert_eq!(incomplete_route_error().code, INVALID_INPUT_ERROR);
}
