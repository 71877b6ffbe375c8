// vim: tw=80
//! Call count predicates.

use crate::{CallPattern, Error};

/// How many times a call must have happened.
///
/// A `Times` has an optional lower and an optional upper bound.  When both
/// are present the lower one never exceeds the upper one.  Use the
/// constructors [`times`](crate::times), [`never`](crate::never),
/// [`at_most`](crate::at_most), [`at_least`](crate::at_least) and
/// [`at_least_once`](crate::at_least_once).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Times {
    minimum: Option<usize>,
    maximum: Option<usize>,
}

impl Times {
    /// Exactly once.  The default for every verification.
    pub const ONCE: Times = Times{minimum: Some(1), maximum: Some(1)};

    pub const NEVER: Times = Times{minimum: None, maximum: Some(0)};

    pub const AT_LEAST_ONCE: Times = Times{minimum: Some(1), maximum: None};

    pub fn exactly(n: usize) -> Self {
        if n == 1 {
            Times::ONCE
        } else {
            Times{minimum: Some(n), maximum: Some(n)}
        }
    }

    pub fn at_most(n: usize) -> Self {
        Times{minimum: None, maximum: Some(n)}
    }

    pub fn at_least(n: usize) -> Self {
        Times{minimum: Some(n), maximum: None}
    }

    pub fn minimum(&self) -> Option<usize> {
        self.minimum
    }

    pub fn maximum(&self) -> Option<usize> {
        self.maximum
    }

    /// Check that `pattern` was observed an acceptable number of times.
    ///
    /// `pattern` is only used to describe the failure.
    pub fn verify(&self, pattern: &CallPattern, actual: usize)
        -> Result<(), Error>
    {
        let call = || pattern.to_string();
        match self.maximum {
            Some(0) if actual != 0 => {
                Err(Error::NeverWantedButInvoked{call: call(), actual})
            },
            Some(max) if max > 0 => {
                if actual == 0 {
                    return Err(Error::WantedButNotInvoked{call: call()});
                }
                self.verify_minimum(pattern, actual)?;
                if actual > max {
                    return Err(Error::TooManyActualInvocations {
                        call: call(),
                        wanted: max,
                        actual
                    });
                }
                Ok(())
            },
            Some(_) => Ok(()),
            None => self.verify_minimum(pattern, actual)
        }
    }

    fn verify_minimum(&self, pattern: &CallPattern, actual: usize)
        -> Result<(), Error>
    {
        match self.minimum {
            Some(min) if actual < min => {
                Err(Error::TooLittleActualInvocations {
                    call: pattern.to_string(),
                    wanted: min,
                    actual
                })
            },
            _ => Ok(())
        }
    }
}

impl Default for Times {
    fn default() -> Self {
        Times::ONCE
    }
}
