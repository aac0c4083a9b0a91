use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum StatsError {
    #[error("stats provider unavailable: {0}")]
    Upstream(String),
    #[error("bad input: {0}")]
    BadInput(String),
    #[error("no data: {0}")]
    NoData(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for StatsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Upstream(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StatsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

impl From<csv::Error> for StatsError {
    fn from(err: csv::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<std::io::Error> for StatsError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for StatsError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}

impl From<&str> for StatsError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl ResponseError for StatsError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadInput(_) => StatusCode::BAD_REQUEST,
            Self::NoData(_) => StatusCode::NOT_FOUND,
            Self::Parse(_) => StatusCode::BAD_GATEWAY,
            Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": self.to_string(),
        }))
    }
}
