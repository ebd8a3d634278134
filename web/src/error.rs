use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use ::sse::error::{Error as SseError, ErrorKind as SseErrorKind};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// The addressed client is not connected.
    NotFound,
    Sse(SseError),
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::NotFound => None,
            Error::Sse(err) => Some(err),
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => (StatusCode::NOT_FOUND, "NOT FOUND").into_response(),
            Error::Sse(err) => match err.error_kind {
                SseErrorKind::Encode(_) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE ENTITY").into_response()
                }
                SseErrorKind::Write(_) => (StatusCode::BAD_GATEWAY, "BAD GATEWAY").into_response(),
            },
        }
    }
}

impl From<SseError> for Error {
    fn from(err: SseError) -> Self {
        Error::Sse(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::sse::error::{EncodeErrorKind, WriteErrorKind};

    #[test]
    fn test_status_codes() {
        assert_eq!(
            Error::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            Error::from(SseError::new(SseErrorKind::Encode(EncodeErrorKind::MultilineData)))
                .into_response()
                .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            Error::from(SseError::new(SseErrorKind::Write(WriteErrorKind::Closed)))
                .into_response()
                .status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
