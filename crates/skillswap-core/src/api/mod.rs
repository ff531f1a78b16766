pub mod appointment;
pub mod match_response;
pub mod user;

use thiserror::Error;

/// Shape-level rejection raised by request DTO validators before a request
/// reaches the matching or scheduling rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvalidRequest(pub String);

pub(crate) fn require_len_max(
    value: Option<&str>,
    max: usize,
    what: &str,
) -> Result<(), InvalidRequest> {
    match value {
        Some(text) if text.chars().count() > max => Err(InvalidRequest(format!(
            "{what} must be less than {max} characters"
        ))),
        _ => Ok(()),
    }
}
