use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("HTTP error {status}: {body}")]
    HttpError { status: u16, body: String },
    #[error("Response error: {0}")]
    ResponseError(String),
    #[error("Request error: {0}")]
    RequestError(String),
    #[error("Empty result: {0}")]
    EmptyResult(String),
    #[error("Decode error: {0}")]
    DecodeError(String),
    #[error("Presentation error: {0}")]
    PresentationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Coarse classification used when reporting a failed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileNotFound,
    Http,
    EmptyResult,
    Other,
}

impl BatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BatchError::FileNotFound(_) => ErrorKind::FileNotFound,
            BatchError::HttpError { .. }
            | BatchError::ResponseError(_)
            | BatchError::RequestError(_) => ErrorKind::Http,
            BatchError::EmptyResult(_) => ErrorKind::EmptyResult,
            _ => ErrorKind::Other,
        }
    }
}

impl From<reqwest::Error> for BatchError {
    fn from(e: reqwest::Error) -> Self {
        BatchError::RequestError(e.to_string())
    }
}

impl From<zip::result::ZipError> for BatchError {
    fn from(e: zip::result::ZipError) -> Self {
        BatchError::PresentationError(e.to_string())
    }
}

impl From<quick_xml::Error> for BatchError {
    fn from(e: quick_xml::Error) -> Self {
        BatchError::PresentationError(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_family_shares_a_kind() {
        let status = BatchError::HttpError {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(status.kind(), ErrorKind::Http);
        assert_eq!(BatchError::ResponseError("x".into()).kind(), ErrorKind::Http);
        assert_eq!(BatchError::EmptyResult("x".into()).kind(), ErrorKind::EmptyResult);
        assert_eq!(
            BatchError::FileNotFound(PathBuf::from("a.png")).kind(),
            ErrorKind::FileNotFound
        );
    }

    #[test]
    fn display_includes_status_and_body() {
        let err = BatchError::HttpError {
            status: 404,
            body: "no route".into(),
        };
        assert_eq!(err.to_string(), "HTTP error 404: no route");
    }
}
