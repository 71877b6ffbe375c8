// vim: tw=80
//! Stubbing and behavior verification for recording test spies.
//!
//! Tattle works the other way around from expectation-based mocking: a spy
//! records every call made to it, and the test asserts afterwards what
//! happened.  Using Tattle is a four-step process:
//!
//! * Create a spy, either by hand with [`Spy`] and [`Recordable`], or with the
//!   [`#[spy]`](macro@spy) attribute on a trait.
//! * Optionally stub some of its calls with [`when`].
//! * Hand it to the code under test.
//! * Verify the calls it received with [`verify`], [`in_order`],
//!   [`verify_zero_interaction`] and [`verify_no_more_interactions`].
//!
//! ```
//! use tattle::*;
//!
//! #[spy]
//! pub trait Store {
//!     fn put(&self, key: &str, value: u32) -> bool;
//!     fn flush(&self);
//! }
//!
//! fn save_all(store: &dyn Store, values: &[u32]) {
//!     for (i, v) in values.iter().enumerate() {
//!         store.put(&format!("k{}", i), *v);
//!     }
//!     store.flush();
//! }
//!
//! let store = SpyStore::new();
//! let any_put = call!(put(instance_of::<String>(), instance_of::<u32>()));
//! when(&store).has_a_call(any_put).then_return(true);
//!
//! save_all(&store, &[7, 8]);
//!
//! verify(&store).had_called_with(call!(put("k0", 7u32))).unwrap();
//! verify(&store).had_called_with(call!(put("k1", 8u32))).unwrap();
//! verify(&store).had_called_with(call!(flush())).unwrap();
//! verify_no_more_interactions(&[&store]).unwrap();
//! ```
//!
//! # Call patterns
//!
//! Both stubbing and verification take a [`CallPattern`], usually written
//! with the [`call!`] macro.  Each argument of a pattern is one of
//!
//! * A literal value, matched with `PartialEq`.  String literals also match
//!   `String` arguments.
//! * [`instance_of::<T>()`](instance_of), which matches any value of type `T`.
//! * [`matching(p)`](matching), which matches values satisfying a
//!   [`Predicate`].
//!
//! Keyword arguments, for hand-written spies that record them, are added with
//! [`CallPattern::kwarg`].
//!
//! # Stubbing
//!
//! [`when`] declares what a spy should answer to calls that match a pattern.
//! Nothing is recorded while stubbing, so stubs never count as interactions.
//! If several stubs match one call, the one declared last wins.
//!
//! ```
//! # use tattle::*;
//! #[spy]
//! trait Scorer {
//!     fn score(&self, x: i32) -> i32;
//! }
//!
//! let scorer = SpyScorer::new();
//! when(&scorer).has_a_call(call!(score(instance_of::<i32>())))
//!     .then_return(100);
//! when(&scorer).has_a_call(call!(score(200))).then_return(200);
//!
//! assert_eq!(200, scorer.score(200));
//! assert_eq!(100, scorer.score(666));
//! ```
//!
//! A stub may have several answers.  Consecutive matching calls get them in
//! order, and the last one is repeated forever.  An answer may also be an
//! error: methods returning `Result` turn it into `Err`.
//!
//! ```
//! # use tattle::*;
//! #[spy]
//! trait Fetcher {
//!     fn fetch(&self, url: &str) -> Result<String, String>;
//! }
//!
//! let fetcher = SpyFetcher::new();
//! when(&fetcher).has_a_call(call!(fetch("a")))
//!     .then_raise(String::from("timeout"))
//!     .then_return(String::from("body"));
//!
//! assert_eq!(Err(String::from("timeout")), fetcher.fetch("a"));
//! assert_eq!(Ok(String::from("body")), fetcher.fetch("a"));
//! assert_eq!(Ok(String::from("body")), fetcher.fetch("a"));
//! ```
//!
//! Calls that no stub answers return the default value of the method's return
//! type, or `Ok` of the default for methods that return `Result`.  Spies
//! generated by `#[spy]` do that for any type that implements `Default`, and
//! panic for types that don't.  Hand-written spies that convert an
//! [`Outcome`] generically only get `()` on stable Rust; other `Default`
//! types require the **nightly** feature.
//!
//! # Verification
//!
//! [`verify`] counts the calls that match a pattern, in any order, and checks
//! the count against a [`Times`]: exactly once by default, or whatever
//! [`times`], [`never`], [`at_most`], [`at_least`] or [`at_least_once`] say.
//! Failures are reported as [`Error`]s.
//!
//! ```
//! # use tattle::*;
//! let spy = Spy::new();
//! spy.record(Call::new("clear"));
//!
//! verify(&spy).had_called_with(call!(clear())).unwrap();
//! assert!(matches!(
//!     verify(&spy).with(times(2)).had_called_with(call!(clear())),
//!     Err(Error::TooLittleActualInvocations{wanted: 2, actual: 1, ..})
//! ));
//! verify(&spy).with(never()).had_called_with(call!(add(1))).unwrap();
//! ```
//!
//! Every successful verification marks the calls it counted as verified.
//! [`verify_no_more_interactions`] then fails if a spy has any calls left that
//! were never verified, and [`verify_zero_interaction`] fails if a spy was
//! called at all.  [`Spy::reset`] forgets both the calls and their
//! verification.
//!
//! # In-order verification
//!
//! [`in_order`] creates an [`InOrder`] session over one or more spies.  The
//! session sees all of its spies' calls on one timeline, in the order they
//! were made, and scans it with a cursor that only moves forward.  Each
//! verification must match calls right at the cursor.
//!
//! ```
//! # use tattle::*;
//! let a = Spy::named("a");
//! let b = Spy::named("b");
//! let mut session = in_order(&[&a, &b]).unwrap();
//!
//! a.record(Call::new("f").arg(1));
//! b.record(Call::new("g").arg(2));
//! b.record(Call::new("g").arg(2));
//!
//! session.verify(&a).had_called_with(call!(f(1))).unwrap();
//! session.verify(&b).with(times(2)).had_called_with(call!(g(2))).unwrap();
//! assert!(matches!(
//!     session.verify(&a).had_called_with(call!(f(1))),
//!     Err(Error::VerificationInOrderFailure{..})
//! ));
//! ```
//!
//! # Logging
//!
//! Tattle emits [`tracing`](https://docs.rs/tracing) events for every recorded
//! call, stub and verification.  Install a subscriber in the test to see them.
//!
//! # Threads
//!
//! Spies are `Send + Sync`, so they can implement traits that require it, but
//! Tattle is designed for one thread driving stubbing, exercising and
//! verification in sequence.  Answers declared with
//! [`then_answer_st`](AnswerChain::then_answer_st) may only be used from the
//! thread that declared them.

#![cfg_attr(feature = "nightly", feature(specialization))]

use std::sync::{Mutex, MutexGuard};

mod answer;
mod call;
mod error;
mod in_order;
mod spy;
mod stub;
mod times;
mod value;
mod verify;

pub use answer::{
    AnswerDefault,
    AnswerFallback,
    DefaultAnswer,
    DefaultReturner,
    Outcome,
    Raised,
    ReturnDefault
};
pub use call::{Call, CallPattern};
pub use error::Error;
pub use in_order::{InOrder, InOrderVerifier, Participant};
pub use spy::{Recordable, Spy};
pub use stub::{AnswerChain, When};
pub use times::Times;
pub use value::{Arg, Value};
pub use verify::{
    Verifier,
    verify_no_more_interactions,
    verify_zero_interaction
};

pub use tattle_derive::spy;
pub use predicates::prelude::{Predicate, predicate};

/// Lock a spy's state.  A panic while the lock was held (a failing answer
/// closure, usually) doesn't make the spy unusable.
pub(crate) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Start stubbing calls of `spy`.
pub fn when<R: Recordable + ?Sized>(spy: &R) -> When<'_> {
    When::new(spy.spy())
}

/// Exactly `n` times.
pub fn times(n: usize) -> Times {
    Times::exactly(n)
}

pub fn never() -> Times {
    Times::NEVER
}

/// At most `n` times, but at least once unless `n` is 0.
pub fn at_most(n: usize) -> Times {
    Times::at_most(n)
}

pub fn at_least(n: usize) -> Times {
    Times::at_least(n)
}

pub fn at_least_once() -> Times {
    Times::AT_LEAST_ONCE
}

/// Start verifying calls of `spy`.  By default, a verification requires
/// exactly one matching call; use [`Verifier::with`] to change that.
pub fn verify<R: Recordable + ?Sized>(spy: &R) -> Verifier<'_> {
    Verifier::new(spy.spy())
}

/// Start an in-order verification session over `participants`.
///
/// # Errors
///
/// [`Error::MocksException`] if `participants` is empty, if any of them is
/// `None`, or if two of them record the same calls.
///
/// ```
/// # use tattle::*;
/// let a = Spy::new();
/// assert!(matches!(in_order(&[&a, &None::<&Spy>]),
///                  Err(Error::MocksException(_))));
/// ```
pub fn in_order(participants: &[&dyn Participant]) -> Result<InOrder, Error> {
    InOrder::new(participants)
}

/// An argument matcher that accepts any value of type `T`.
pub fn instance_of<T: Value>() -> Arg {
    Arg::instance_of::<T>()
}

/// An argument matcher that accepts values of type `T` satisfying `p`.
///
/// ```
/// # use tattle::*;
/// let spy = Spy::new();
/// spy.record(Call::new("sleep").arg(250u64));
/// verify(&spy)
///     .had_called_with(call!(sleep(matching::<u64, _>(predicate::ge(100)))))
///     .unwrap();
/// ```
pub fn matching<T, P>(p: P) -> Arg
    where T: Value, P: Predicate<T> + Send + Sync + 'static
{
    Arg::matching(p)
}
