//! Validation of an uploaded document before the pipeline starts. Rejections
//! here are synchronous and happen before any state transition or network
//! call.

use crate::error::UploadError;

pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

pub const ACCEPTED_MIME_TYPES: [&str; 4] = [
    "application/pdf",
    "image/png",
    "image/jpeg",
    "image/webp",
];

/// Checks the declared MIME type and the document size, returning the
/// normalized MIME essence (lowercased, parameters stripped) on success.
pub fn validate(mime_type: &str, size: usize) -> Result<String, UploadError> {
    let essence = mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if !ACCEPTED_MIME_TYPES.contains(&essence.as_str()) {
        return Err(UploadError::UnsupportedType(mime_type.to_string()));
    }

    if size > MAX_DOCUMENT_BYTES {
        return Err(UploadError::TooLarge {
            size,
            limit: MAX_DOCUMENT_BYTES,
        });
    }

    Ok(essence)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepted_types_pass() {
        for mime in ACCEPTED_MIME_TYPES {
            assert_eq!(validate(mime, 1024).unwrap(), mime);
        }
    }

    #[test]
    fn essence_is_normalized() {
        assert_eq!(
            validate("Application/PDF; name=\"syllabus.pdf\"", 1024).unwrap(),
            "application/pdf"
        );
    }

    #[test]
    fn other_types_are_rejected() {
        for mime in ["text/plain", "image/gif", "application/zip", ""] {
            assert!(matches!(
                validate(mime, 1024),
                Err(UploadError::UnsupportedType(_))
            ));
        }
    }

    #[test]
    fn oversized_documents_are_rejected() {
        assert!(validate("application/pdf", MAX_DOCUMENT_BYTES).is_ok());
        assert!(matches!(
            validate("application/pdf", MAX_DOCUMENT_BYTES + 1),
            Err(UploadError::TooLarge { .. })
        ));
    }

    #[test]
    fn rejection_messages_are_descriptive() {
        let err = validate("text/plain", 10).unwrap_err();
        assert!(err.to_string().contains("text/plain"));

        let err = validate("application/pdf", MAX_DOCUMENT_BYTES + 1).unwrap_err();
        assert!(err.to_string().contains("limit"));
    }
}
