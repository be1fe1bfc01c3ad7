use rust_i18n::t;
use thiserror::Error;

/// Failures surfaced by command handling.
///
/// `Display` renders the short snake_case code that ends up in logs and in
/// the error UI; `user_message` is what the marker screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkerError {
    #[error("invalid_json")]
    InvalidJson,
    #[error("unknown_action:{0}")]
    UnknownAction(String),
    #[error("missing_binding:{0}")]
    MissingBinding(&'static str),
    #[error("missing_source")]
    MissingSource,
    #[error("invalid_fd")]
    InvalidFd,
    #[error("read_failed:{0}")]
    ReadFailed(String),
    #[error("invalid_file_type")]
    InvalidFileType,
    #[error("pdf_parse_failed:{0}")]
    PdfParseFailed(String),
    #[error("pdf_has_no_pages")]
    NoPages,
    #[error("export_empty_log")]
    EmptyLog,
    #[error("export_failed:{0}")]
    ExportFailed(String),
    #[error("host_error:{0}")]
    Host(String),
}

impl MarkerError {
    /// Localized message for the UI.
    pub fn user_message(&self) -> String {
        match self {
            // Every rejection of the picked file reads the same to the user.
            MarkerError::InvalidFileType
            | MarkerError::PdfParseFailed(_)
            | MarkerError::NoPages => t!("error.invalid_pdf").into_owned(),
            MarkerError::MissingSource | MarkerError::InvalidFd => {
                t!("error.missing_source").into_owned()
            }
            MarkerError::ReadFailed(detail) => t!("error.read_failed", detail = detail).into_owned(),
            MarkerError::ExportFailed(detail) => {
                t!("error.export_failed", detail = detail).into_owned()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_a_stable_code() {
        assert_eq!(MarkerError::InvalidFileType.to_string(), "invalid_file_type");
        assert_eq!(
            MarkerError::MissingBinding("placeholder_id").to_string(),
            "missing_binding:placeholder_id"
        );
        assert_eq!(
            MarkerError::PdfParseFailed("eof".into()).to_string(),
            "pdf_parse_failed:eof"
        );
    }

    #[test]
    fn file_rejections_share_one_user_message() {
        let expected = MarkerError::InvalidFileType.user_message();
        assert_eq!(expected, "Please select a valid PDF file");
        assert_eq!(MarkerError::NoPages.user_message(), expected);
        assert_eq!(MarkerError::PdfParseFailed("x".into()).user_message(), expected);
    }
}
