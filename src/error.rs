use std::error::Error;

use thiserror::Error;

/// Failure type of a publisher that cannot fail.
///
/// Uninhabited, so a `Completion::Failed(never)` arm is `match never {}`.
pub type Never = std::convert::Infallible;

/// Catch-all failure produced by [`try_map`](crate::PublisherExt::try_map).
///
/// Narrow it back to a concrete error with [`downcast`](AnyError::downcast),
/// usually inside a `map_error`.
#[derive(Error, Debug)]
#[error("{0}")]
pub struct AnyError(#[source] Box<dyn Error + Send + Sync + 'static>);

impl AnyError {
    /// Box `error`. An `AnyError` passed in is returned as is, not nested.
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        let boxed: Box<dyn Error + Send + Sync + 'static> = Box::new(error);

        match boxed.downcast::<AnyError>() {
            Ok(error) => *error,
            Err(boxed) => AnyError(boxed),
        }
    }

    pub fn is<E>(&self) -> bool
    where
        E: Error + 'static,
    {
        self.0.is::<E>()
    }

    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Error + 'static,
    {
        self.0.downcast_ref::<E>()
    }

    /// Recover the concrete error, or get `self` back if it is another kind.
    pub fn downcast<E>(self) -> Result<E, Self>
    where
        E: Error + 'static,
    {
        self.0.downcast::<E>().map(|error| *error).map_err(AnyError)
    }
}

impl From<Box<dyn Error + Send + Sync + 'static>> for AnyError {
    fn from(error: Box<dyn Error + Send + Sync + 'static>) -> Self {
        AnyError(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Error, Debug, PartialEq)]
    enum NameError {
        #[error("{0} is too short")]
        TooShort(String),
    }

    #[derive(Error, Debug)]
    #[error("other")]
    struct Other;

    #[test]
    fn test_downcast_recovers_concrete_error() {
        let error = AnyError::new(NameError::TooShort("Shai".into()));

        assert!(error.is::<NameError>());
        assert_eq!(error.to_string(), "Shai is too short");
        assert_eq!(
            error.downcast::<NameError>().ok(),
            Some(NameError::TooShort("Shai".into()))
        );
    }

    #[test]
    fn test_wrapping_twice_does_not_nest() {
        let error = AnyError::new(AnyError::new(NameError::TooShort("Shai".into())));

        assert!(error.is::<NameError>());
    }

    #[test]
    fn test_downcast_to_wrong_kind_returns_self() {
        let error = AnyError::new(Other);

        let error = error.downcast::<NameError>().unwrap_err();

        assert!(error.downcast_ref::<Other>().is_some());
    }
}
