/// Domain-level error shared by every layer above the store.
///
/// The HTTP surface maps each variant onto a status code; see
/// `concert_api::error::AppError`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// `id` is kept as text so that identifiers which are not even valid
    /// UUIDs can still be reported as missing.
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// The store or the notification broker failed or timed out.
    #[error("Dependency failure ({dependency}): {message}")]
    Dependency {
        dependency: &'static str,
        message: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn dependency(dependency: &'static str, message: impl Into<String>) -> Self {
        Self::Dependency {
            dependency,
            message: message.into(),
        }
    }
}
