/// Result of a repository operation that reached the backend.
///
/// A missing key is a normal outcome, never an error, so callers can tell it
/// apart from a failed call when deciding whether to retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success(T),
    NotFound,
}

impl<T> Outcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }
}

impl<T> From<Option<T>> for Outcome<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Outcome::Success(v),
            None => Outcome::NotFound,
        }
    }
}
