// vim: tw=80
//! Call count verification for a single spy.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::{
    Call,
    CallPattern,
    Error,
    Recordable,
    Spy,
    Times
};

/// Returned by [`verify`](crate::verify).
pub struct Verifier<'a> {
    spy: &'a Spy,
    times: Times,
}

impl<'a> Verifier<'a> {
    pub(crate) fn new(spy: &'a Spy) -> Self {
        Verifier{spy, times: Times::ONCE}
    }

    /// Replace the default [`Times::ONCE`] requirement.
    pub fn with(mut self, times: Times) -> Self {
        self.times = times;
        self
    }

    /// Verify how many times the spy was called with something matching
    /// `pattern`, in any order.
    ///
    /// On success the matching calls count as verified for
    /// [`verify_no_more_interactions`](crate::verify_no_more_interactions).
    pub fn had_called_with(&self, pattern: CallPattern) -> Result<(), Error> {
        let pattern = Arc::new(self.spy.qualify(pattern));
        let count = self.spy.invocations()
            .iter()
            .filter(|i| pattern.matches(&i.call))
            .count();
        let r = self.times.verify(&pattern, count);
        debug!(spy = %self.spy.name(), pattern = %pattern, count,
               times = ?self.times, ok = r.is_ok(), "verified");
        r?;
        self.spy.mark_verified(&pattern, count);
        Ok(())
    }
}

/// Fail unless `spy` has never been called.
pub fn verify_zero_interaction<R>(spy: &R) -> Result<(), Error>
    where R: Recordable + ?Sized
{
    let spy = spy.spy();
    let calls = spy.calls();
    if calls.is_empty() {
        Ok(())
    } else {
        Err(no_interaction_wanted(spy.name(), &calls))
    }
}

/// Fail if any of `spies` has a call that no verification accounted for.
///
/// # Examples
/// ```
/// # use tattle::*;
/// let spy = Spy::new();
/// spy.record(Call::new("clear"));
/// spy.record(Call::new("add").arg("x"));
///
/// verify(&spy).had_called_with(call!(clear())).unwrap();
/// assert!(verify_no_more_interactions(&[&spy]).is_err());
///
/// verify(&spy).had_called_with(call!(add("x"))).unwrap();
/// verify_no_more_interactions(&[&spy]).unwrap();
/// ```
pub fn verify_no_more_interactions(spies: &[&dyn Recordable])
    -> Result<(), Error>
{
    for r in spies {
        let spy = r.spy();
        let calls = unverified(spy.name(), spy.calls(), &spy.ledger())?;
        if !calls.is_empty() {
            return Err(no_interaction_wanted(spy.name(), &calls));
        }
    }
    Ok(())
}

/// Remove one matching call from `calls` for every entry of `ledger`, and
/// return what is left.
pub(crate) fn unverified<C>(name: String, mut calls: Vec<C>,
                            ledger: &[Arc<CallPattern>])
    -> Result<Vec<C>, Error>
    where C: AsRef<Call>
{
    for verified in ledger {
        match calls.iter().position(|c| verified.matches(c.as_ref())) {
            Some(i) => {
                calls.remove(i);
            },
            None => {
                warn!(spy = %name, pattern = %verified,
                      "verified call is missing from the log");
                return Err(Error::NoInteractionWanted {
                    spy: name,
                    calls: vec![verified.to_string()]
                });
            }
        }
    }
    Ok(calls)
}

pub(crate) fn no_interaction_wanted<C>(spy: String, calls: &[C]) -> Error
    where C: AsRef<Call>
{
    Error::NoInteractionWanted {
        spy,
        calls: calls.iter().map(|c| c.as_ref().to_string()).collect()
    }
}
