// vim: tw=80
//! Stubbing: canned answers for calls that match a pattern.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex}
};
use tracing::{debug, trace};

use crate::{
    Call,
    CallPattern,
    Spy,
    answer::{self, AnswerQueue},
    lock
};

struct Stub {
    pattern: CallPattern,
    answers: Arc<Mutex<AnswerQueue>>,
}

/// Every stub of one spy, grouped by the (qualified) name they match.
#[derive(Default)]
pub(crate) struct StubRegistry {
    stubs: HashMap<String, Vec<Stub>>
}

impl StubRegistry {
    /// Add a new stub.  It shadows every older stub for the same name.
    pub(crate) fn register(&mut self, pattern: CallPattern)
        -> Arc<Mutex<AnswerQueue>>
    {
        let answers = Arc::new(Mutex::new(AnswerQueue::default()));
        self.stubs.entry(pattern.name().to_owned())
            .or_default()
            .push(Stub{pattern, answers: answers.clone()});
        answers
    }

    /// Find the answers of the newest stub that matches `call`.
    pub(crate) fn lookup(&self, call: &Call)
        -> Option<Arc<Mutex<AnswerQueue>>>
    {
        let stubs = self.stubs.get(call.name())?;
        let found = stubs.iter()
            .rev()
            .find(|stub| stub.pattern.matches(call));
        match found {
            Some(stub) => {
                trace!(%call, pattern = %stub.pattern, "matched stub");
                Some(stub.answers.clone())
            },
            None => {
                trace!(%call, candidates = stubs.len(), "no stub matched");
                None
            }
        }
    }

    /// Forget every stub whose name satisfies `f`.
    pub(crate) fn clear<F: Fn(&str) -> bool>(&mut self, f: F) {
        self.stubs.retain(|name, _| !f(name));
    }
}

/// Returned by [`when`](crate::when).
pub struct When<'a> {
    spy: &'a Spy,
}

impl<'a> When<'a> {
    pub(crate) fn new(spy: &'a Spy) -> Self {
        When{spy}
    }

    /// Start stubbing calls that match `pattern`.
    ///
    /// Declaring a stub is not an interaction with the spy: nothing is
    /// recorded.  If more than one stub matches a call, the one declared last
    /// wins.
    pub fn has_a_call(self, pattern: CallPattern) -> AnswerChain {
        let pattern = self.spy.qualify(pattern);
        let description = pattern.to_string();
        debug!(spy = %self.spy.name(), pattern = %description, "stubbed");
        let answers = self.spy.stub(pattern);
        AnswerChain{pattern: description, answers}
    }
}

/// The answers to give for one stubbed pattern.
///
/// Each `then_*` method appends one answer.  Consecutive matching calls
/// consume the answers in the order they were declared, and the last answer
/// is repeated forever after.
///
/// # Examples
/// ```
/// # use tattle::*;
/// let spy = Spy::named("conn");
/// when(&spy).has_a_call(call!(read()))
///     .then_return(1u8)
///     .then_return(2u8);
///
/// let read = || spy.record(Call::new("read")).returning::<u8>("read()");
/// assert_eq!(1, read());
/// assert_eq!(2, read());
/// assert_eq!(2, read());
/// ```
pub struct AnswerChain {
    pattern: String,
    answers: Arc<Mutex<AnswerQueue>>,
}

impl AnswerChain {
    /// Answer with a clone of `value`.
    pub fn then_return<T>(&mut self, value: T) -> &mut Self
        where T: Clone + Send + 'static
    {
        self.push(answer::constant(value))
    }

    /// Make the call fail with `error`.
    ///
    /// Spy methods that return `Result<_, E>` turn it into `Err(error)`; any
    /// other method panics.
    pub fn then_raise<E>(&mut self, error: E) -> &mut Self
        where E: Clone + fmt::Debug + Send + 'static
    {
        self.push(answer::raise(error))
    }

    /// Compute the answer from the actual call.
    pub fn then_answer<T, F>(&mut self, f: F) -> &mut Self
        where T: Send + 'static, F: FnMut(&Call) -> T + Send + 'static
    {
        self.push(answer::computed(f))
    }

    /// Single-threaded version of [`then_answer`](#method.then_answer), for
    /// closures that aren't `Send`.
    ///
    /// It is a runtime error to call the spy from a different thread than the
    /// one that declared this answer.
    pub fn then_answer_st<T, F>(&mut self, f: F) -> &mut Self
        where T: Send + 'static, F: FnMut(&Call) -> T + 'static
    {
        self.push(answer::computed_st(f))
    }

    fn push(&mut self, rfunc: answer::Rfunc) -> &mut Self {
        let mut answers = lock(&self.answers);
        answers.push(rfunc);
        trace!(pattern = %self.pattern, answers = answers.len(),
               "added answer");
        drop(answers);
        self
    }
}
