// vim: tw=80
//! Verification errors.

use thiserror::Error;

/// Every way a stubbing or verification request can fail.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// The wanted call never happened.
    #[error("Wanted but not invoked: {call}")]
    WantedButNotInvoked {
        call: String,
    },

    /// A call happened that was explicitly forbidden.
    #[error("Never wanted but invoked: {call} was called {actual} time(s)")]
    NeverWantedButInvoked {
        call: String,
        actual: usize,
    },

    #[error("Too little actual invocations of {call}: wanted {wanted} but was {actual}")]
    TooLittleActualInvocations {
        call: String,
        wanted: usize,
        actual: usize,
    },

    #[error("Too many actual invocations of {call}: wanted {wanted} but was {actual}")]
    TooManyActualInvocations {
        call: String,
        wanted: usize,
        actual: usize,
    },

    /// A spy had calls that no verification accounted for.
    #[error("No interactions wanted on {spy}, but found: {}", .calls.join(", "))]
    NoInteractionWanted {
        spy: String,
        calls: Vec<String>,
    },

    /// A call wasn't found where an in-order session expected it.
    #[error("Verification in order failure at {call}")]
    VerificationInOrderFailure {
        call: String,
        #[source]
        source: Box<Error>,
    },

    /// The first verification of an in-order session found the right method
    /// called with the wrong arguments.
    #[error("Arguments are different: wanted {wanted} but was {actual}")]
    ArgumentsAreDifferent {
        wanted: String,
        actual: String,
    },

    /// The library was used incorrectly.
    #[error("{0}")]
    MocksException(String),
}

impl Error {
    /// Was this error produced by a [`Times`](crate::Times) predicate?
    pub fn is_count_violation(&self) -> bool {
        matches!(self,
            Error::WantedButNotInvoked{..} |
            Error::NeverWantedButInvoked{..} |
            Error::TooLittleActualInvocations{..} |
            Error::TooManyActualInvocations{..})
    }
}
