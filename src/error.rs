use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

use crate::views;

#[derive(Debug, ThisError)]
pub enum TrackletError {
    #[error("Config file already exists.")]
    AlreadyInstalled,

    #[error("Tracklet is already installed with prefix `{0}`.")]
    InstalledWithPrefix(String),

    #[error("Installation session missing or expired")]
    MissingInstallSession,

    #[error("Database connection name '{0}' already initiated")]
    DuplicateConnection(String),

    #[error("Database connection '{0}' has not been opened")]
    UnknownConnection(String),

    #[error("SQL statement failed: {source}")]
    SchemaExecution {
        statement: String,
        #[source]
        source: SqlxError,
    },

    #[error("Database error: {0}")]
    DatabaseError(#[from] SqlxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("You don't have permission to access this page")]
    NoPermission,

    #[error("Not found")]
    NotFound,
}

impl TrackletError {
    pub fn schema(statement: impl Into<String>, source: SqlxError) -> Self {
        TrackletError::SchemaExecution {
            statement: statement.into(),
            source,
        }
    }
}

impl IntoResponse for TrackletError {
    fn into_response(self) -> Response {
        let (status, page) = match &self {
            TrackletError::AlreadyInstalled => (
                StatusCode::CONFLICT,
                views::halt("Error", "Config file already exists."),
            ),
            TrackletError::InstalledWithPrefix(_) => (
                StatusCode::CONFLICT,
                views::halt("Error", "Tracklet is already installed."),
            ),
            TrackletError::MissingInstallSession => (
                StatusCode::BAD_REQUEST,
                views::halt(
                    "Error",
                    "The installation session has expired, please start again.",
                ),
            ),
            TrackletError::SchemaExecution { statement, .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                views::halt_with_code("The following SQL query failed", statement),
            ),
            TrackletError::NoPermission => (
                StatusCode::FORBIDDEN,
                views::halt("No Permission", "You don't have permission to access this page."),
            ),
            TrackletError::NotFound => (
                StatusCode::NOT_FOUND,
                views::halt("Not Found", "The requested page could not be found."),
            ),
            TrackletError::DuplicateConnection(_)
            | TrackletError::UnknownConnection(_)
            | TrackletError::DatabaseError(_)
            | TrackletError::Io(_)
            | TrackletError::TomlSer(_)
            | TrackletError::TomlDe(_)
            | TrackletError::UrlParse(_)
            | TrackletError::Json(_)
            | TrackletError::InvalidConfig(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                views::halt("Error", "An internal server error occurred."),
            ),
        };
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, page).into_response()
    }
}
