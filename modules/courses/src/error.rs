use skillstack_http::ApiClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoursesError {
    /// The operation acts on behalf of a user and nobody is signed in.
    #[error("not signed in")]
    NotSignedIn,

    #[error("course {0} has no seats left")]
    NoSeatsLeft(String),

    #[error("invalid course: {0}")]
    InvalidCourse(String),

    #[error(transparent)]
    Api(#[from] ApiClientError),
}
