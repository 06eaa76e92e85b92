//! Client-side checks that run before any request leaves the machine.

use std::fmt;
use std::path::Path;

/// Every PDF starts with this signature.
pub const PDF_MAGIC: &[u8] = b"%PDF-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MissingFields,
    MissingRoomFields,
    NotPdf,
    PasswordMismatch,
    MissingResetToken,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingFields => write!(f, "All fields are required."),
            ValidationError::MissingRoomFields => write!(f, "Title and PDF file are required."),
            ValidationError::NotPdf => write!(f, "Please select a PDF file."),
            ValidationError::PasswordMismatch => write!(f, "Passwords do not match."),
            ValidationError::MissingResetToken => write!(f, "Password reset token is missing."),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Fails if any field is blank.
pub fn require_all(fields: &[&str]) -> Result<(), ValidationError> {
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(ValidationError::MissingFields);
    }
    Ok(())
}

/// Title and file path for a new room: both present, file named `*.pdf`.
pub fn check_new_room(title: &str, path: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() || path.trim().is_empty() {
        return Err(ValidationError::MissingRoomFields);
    }
    if !has_pdf_extension(Path::new(path.trim())) {
        return Err(ValidationError::NotPdf);
    }
    Ok(())
}

pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Content check, applied after the file is read.
pub fn check_pdf_bytes(bytes: &[u8]) -> Result<(), ValidationError> {
    if bytes.starts_with(PDF_MAGIC) {
        Ok(())
    } else {
        Err(ValidationError::NotPdf)
    }
}

pub fn check_new_password(
    password: &str,
    confirm: &str,
    reset_token: Option<&str>,
) -> Result<(), ValidationError> {
    require_all(&[password, confirm])?;
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    if reset_token.is_none_or(|t| t.is_empty()) {
        return Err(ValidationError::MissingResetToken);
    }
    Ok(())
}
