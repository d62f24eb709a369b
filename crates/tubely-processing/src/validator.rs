use tubely_core::models::AssetClass;

/// Media validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid content type: {content_type} (allowed: {allowed:?})")]
    InvalidContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Missing content type")]
    MissingContentType,
}

/// Whether `media_type` is on the allow-list for `class`.
///
/// Exact string comparison against the declared type; the payload is never sniffed.
pub fn validate(media_type: &str, class: AssetClass) -> bool {
    !media_type.is_empty() && class.allowed_media_types().contains(&media_type)
}

/// Media type validator for one asset class
pub struct MediaValidator {
    class: AssetClass,
}

impl MediaValidator {
    pub fn new(class: AssetClass) -> Self {
        Self { class }
    }

    /// Validate a declared content type
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), ValidationError> {
        if content_type.is_empty() {
            return Err(ValidationError::MissingContentType);
        }

        if !validate(content_type, self.class) {
            return Err(ValidationError::InvalidContentType {
                content_type: content_type.to_string(),
                allowed: self
                    .class
                    .allowed_media_types()
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            });
        }

        Ok(())
    }
}
