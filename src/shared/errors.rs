use thiserror::Error;
use validator::ValidationErrors;

/// Errors surfaced by calls against the remote backend.
///
/// Each variant corresponds to a class of HTTP response the backend can
/// return; `Network` covers transport failures where no response arrived
/// at all. The carried message is the backend's `detail` field, absent
/// when the response did not include one. Callers that observe
/// `Unauthorized` are expected to report it to the session manager so
/// the stored session is discarded.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication rejected{}", detail_suffix(.0))]
    Unauthorized(Option<String>),

    #[error("Access denied{}", detail_suffix(.0))]
    Forbidden(Option<String>),

    #[error("Not found{}", detail_suffix(.0))]
    NotFound(Option<String>),

    #[error("No longer available{}", detail_suffix(.0))]
    Gone(Option<String>),

    #[error("Bad request{}", detail_suffix(.0))]
    BadRequest(Option<String>),

    #[error("Validation failed{}", detail_suffix(.0))]
    Validation(Option<String>),

    #[error("Too many requests{}", detail_suffix(.0))]
    RateLimited(Option<String>),

    #[error("Server error ({status}){}", detail_suffix(message))]
    Server { status: u16, message: Option<String> },

    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
}

fn detail_suffix(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(": {}", m),
        None => String::new(),
    }
}

impl ApiError {
    /// Map a non-success status and the backend's optional `detail`
    /// message onto the taxonomy.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 => ApiError::Unauthorized(message),
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            410 => ApiError::Gone(message),
            400 => ApiError::BadRequest(message),
            422 => ApiError::Validation(message),
            429 => ApiError::RateLimited(message),
            s => ApiError::Server { status: s, message },
        }
    }

    /// Local field-level validation failures, flattened into one
    /// user-visible message.
    pub fn from_validation(errors: &ValidationErrors) -> Self {
        ApiError::Validation(Some(validation_message(errors)))
    }

    /// The backend-provided message, when the response carried one.
    /// `None` for transport failures and for responses without `detail`.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized(m)
            | ApiError::Forbidden(m)
            | ApiError::NotFound(m)
            | ApiError::Gone(m)
            | ApiError::BadRequest(m)
            | ApiError::Validation(m)
            | ApiError::RateLimited(m) => m.as_deref(),
            ApiError::Server { message, .. } => message.as_deref(),
            ApiError::Network(_) => None,
        }
    }

    /// Whether this error means the session token was rejected and the
    /// local session must be discarded.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

fn validation_message(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            match &error.message {
                Some(message) => parts.push(message.to_string()),
                None => parts.push(format!("Invalid value for {}", field)),
            }
        }
    }
    parts.sort();
    parts.join("; ")
}
