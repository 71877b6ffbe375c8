// vim: tw=80
//! Stubbed answers and the outcome of a recorded call.

use cfg_if::cfg_if;
use fragile::Fragile;
use std::{
    any::{self, Any},
    collections::VecDeque,
    fmt,
    marker::PhantomData
};

use crate::Call;

/// A type-erased error configured with
/// [`then_raise`](crate::AnswerChain::then_raise).
pub struct Raised {
    error: Box<dyn Any + Send>,
    description: String,
}

impl Raised {
    pub(crate) fn new<E: fmt::Debug + Send + 'static>(e: E) -> Self {
        let description = format!("{:?}", e);
        Raised{error: Box::new(e), description}
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// What a spy answered to a recorded call.
pub enum Outcome {
    /// No stub matched, or the matching stub had no answers.
    Default,
    Returned(Box<dyn Any + Send>),
    Raised(Raised),
}

impl Outcome {
    pub fn is_default(&self) -> bool {
        matches!(self, Outcome::Default)
    }

    /// Convert the outcome to a method's return value.
    ///
    /// # Panics
    ///
    /// * If a stub raised an error.  Methods that return `Result` should use
    ///   [`returning_result`](#method.returning_result) instead.
    /// * If the stubbed value has some type other than `O`.
    /// * If no stub answered and `O` has no default value.
    pub fn returning<O: 'static>(self, call: &str) -> O {
        match self {
            Outcome::Default => DefaultReturner::<O>::return_default(call),
            Outcome::Returned(v) => downcast_answer(v, call),
            Outcome::Raised(r) => panic!("{}: raised {}", call, r.description),
        }
    }

    /// Like [`returning`](#method.returning), but an error configured with
    /// `then_raise` becomes `Err`.  Stubs may return either a bare `T` or a
    /// whole `Result<T, E>`.  Unanswered calls return `Ok` of `T`'s default.
    pub fn returning_result<T, E>(self, call: &str) -> Result<T, E>
        where T: 'static, E: 'static
    {
        match self {
            Outcome::Default => {
                Ok(DefaultReturner::<T>::return_default(call))
            },
            Outcome::Returned(v) => {
                match v.downcast::<Result<T, E>>() {
                    Ok(r) => *r,
                    Err(v) => Ok(downcast_answer(v, call))
                }
            },
            Outcome::Raised(r) => {
                match r.error.downcast::<E>() {
                    Ok(e) => Err(*e),
                    Err(_) => panic!("{}: raised {}, which is not a {}",
                                     call, r.description, any::type_name::<E>())
                }
            }
        }
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outcome::Default => write!(f, "Default"),
            Outcome::Returned(_) => write!(f, "Returned(..)"),
            Outcome::Raised(r) => write!(f, "Raised({})", r.description),
        }
    }
}

fn downcast_answer<O: 'static>(v: Box<dyn Any + Send>, call: &str) -> O {
    match v.downcast::<O>() {
        Ok(o) => *o,
        Err(_) => panic!("{}: stubbed answer is not a {}", call,
                         any::type_name::<O>())
    }
}

#[doc(hidden)]
pub trait ReturnDefault<O> {
    fn return_default(call: &str) -> O;
}

#[derive(Default)]
#[doc(hidden)]
pub struct DefaultReturner<O: 'static>(PhantomData<O>);

const NOT_DEFAULT: &str =
    "Can only return default values for types that impl std::Default";

/// Unit is the one default available on every compiler.
fn unit_or_panic<O: 'static>(call: &str, why: &str) -> O {
    let unit: Box<dyn Any> = Box::new(());
    match unit.downcast::<O>() {
        Ok(o) => *o,
        Err(_) => panic!("{}: no stub matched.  {}", call, why)
    }
}

cfg_if! {
    if #[cfg(feature = "nightly")] {
        impl<O: 'static> ReturnDefault<O> for DefaultReturner<O> {
            default fn return_default(call: &str) -> O {
                unit_or_panic(call, NOT_DEFAULT)
            }
        }

        impl<O: Default + 'static> ReturnDefault<O> for DefaultReturner<O> {
            fn return_default(_call: &str) -> O {
                O::default()
            }
        }
    } else {
        impl<O: 'static> ReturnDefault<O> for DefaultReturner<O> {
            fn return_default(call: &str) -> O {
                unit_or_panic(call,
                    "Returning default values requires the \"nightly\" feature")
            }
        }
    }
}

/// Picks the default answer of a concrete return type on any compiler.
///
/// Code generated by `#[spy]` calls `(&&DefaultAnswer::<O>::new())
/// .default_answer(..)` with both [`AnswerDefault`] and [`AnswerFallback`]
/// in scope.  Method resolution then prefers `O::default()` when `O: Default`
/// and panics otherwise.
#[doc(hidden)]
pub struct DefaultAnswer<O>(PhantomData<O>);

impl<O> DefaultAnswer<O> {
    pub fn new() -> Self {
        DefaultAnswer(PhantomData)
    }
}

impl<O> Default for DefaultAnswer<O> {
    fn default() -> Self {
        Self::new()
    }
}

#[doc(hidden)]
pub trait AnswerDefault<O> {
    fn default_answer(&self, call: &str) -> O;
}

impl<O: Default> AnswerDefault<O> for &DefaultAnswer<O> {
    fn default_answer(&self, _call: &str) -> O {
        O::default()
    }
}

#[doc(hidden)]
pub trait AnswerFallback<O> {
    fn default_answer(&self, call: &str) -> O;
}

impl<O: 'static> AnswerFallback<O> for DefaultAnswer<O> {
    fn default_answer(&self, call: &str) -> O {
        unit_or_panic(call, NOT_DEFAULT)
    }
}

/// Produces one answer for a matched call.
pub(crate) type Rfunc = Box<dyn FnMut(&Call) -> Outcome + Send>;

pub(crate) fn constant<T>(value: T) -> Rfunc
    where T: Clone + Send + 'static
{
    Box::new(move |_| Outcome::Returned(Box::new(value.clone())))
}

pub(crate) fn raise<E>(error: E) -> Rfunc
    where E: Clone + fmt::Debug + Send + 'static
{
    Box::new(move |_| Outcome::Raised(Raised::new(error.clone())))
}

pub(crate) fn computed<T, F>(mut f: F) -> Rfunc
    where T: Send + 'static, F: FnMut(&Call) -> T + Send + 'static
{
    Box::new(move |call| Outcome::Returned(Box::new(f(call))))
}

/// Like `computed`, but for closures that aren't `Send`.  It is a runtime
/// error to answer from a different thread than the one that configured the
/// stub.
pub(crate) fn computed_st<T, F>(f: F) -> Rfunc
    where T: Send + 'static, F: FnMut(&Call) -> T + 'static
{
    let mut fragile = Fragile::new(f);
    Box::new(move |call| {
        Outcome::Returned(Box::new((fragile.get_mut())(call)))
    })
}

/// The answers configured for one stubbed pattern, in declaration order.
#[derive(Default)]
pub(crate) struct AnswerQueue(VecDeque<Rfunc>);

impl AnswerQueue {
    pub(crate) fn push(&mut self, rfunc: Rfunc) {
        self.0.push_back(rfunc);
    }

    /// Answer `call`.  Answers are consumed in order, except that the last one
    /// is kept and reused for every later call.
    pub(crate) fn answer(&mut self, call: &Call) -> Outcome {
        if self.0.len() > 1 {
            match self.0.pop_front() {
                Some(mut rfunc) => rfunc(call),
                None => unreachable!()
            }
        } else if let Some(rfunc) = self.0.front_mut() {
            rfunc(call)
        } else {
            Outcome::Default
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

#[cfg(test)]
mod t {
    use super::*;

    fn dummy() -> Call {
        Call::new("dummy")
    }

    #[test]
    fn last_answer_is_sticky() {
        let mut q = AnswerQueue::default();
        q.push(constant(1u32));
        q.push(constant(2u32));
        assert_eq!(1u32, q.answer(&dummy()).returning("dummy()"));
        assert_eq!(2u32, q.answer(&dummy()).returning("dummy()"));
        assert_eq!(2u32, q.answer(&dummy()).returning("dummy()"));
        assert_eq!(1, q.len());
    }

    #[test]
    fn empty_queue_answers_default() {
        let mut q = AnswerQueue::default();
        assert!(q.answer(&dummy()).is_default());
    }

    #[test]
    fn unit_default() {
        Outcome::Default.returning::<()>("dummy()");
    }

    #[test]
    fn unanswered_result_is_ok_default() {
        let r = Outcome::Default.returning_result::<(), String>("dummy()");
        assert_eq!(Ok(()), r);
    }

    #[test]
    fn default_answer_of_concrete_types() {
        let o: Option<u32> =
            (&&DefaultAnswer::<Option<u32>>::new()).default_answer("dummy()");
        assert_eq!(None, o);
        let b: bool = (&&DefaultAnswer::<bool>::new()).default_answer("dummy()");
        assert!(!b);
        let s: &'static str =
            (&&DefaultAnswer::<&'static str>::new()).default_answer("dummy()");
        assert_eq!("", s);
    }

    #[test]
    #[should_panic(expected = "dummy(): no stub matched.  Can only return")]
    fn default_answer_without_default() {
        struct NoDefault;
        let _: NoDefault =
            (&&DefaultAnswer::<NoDefault>::new()).default_answer("dummy()");
    }

    #[test]
    #[should_panic(expected = "dummy(): stubbed answer is not a u32")]
    fn wrong_type() {
        let mut q = AnswerQueue::default();
        q.push(constant(1i64));
        let _: u32 = q.answer(&dummy()).returning("dummy()");
    }

    #[test]
    #[should_panic(expected = "dummy(): raised \"boom\"")]
    fn raise_from_plain_method() {
        let mut q = AnswerQueue::default();
        q.push(raise("boom"));
        let _: u32 = q.answer(&dummy()).returning("dummy()");
    }

    #[test]
    fn raise_from_result_method() {
        let mut q = AnswerQueue::default();
        q.push(raise(String::from("boom")));
        q.push(constant(5u32));
        let r: Result<u32, String> =
            q.answer(&dummy()).returning_result("dummy()");
        assert_eq!(Err(String::from("boom")), r);
        let r: Result<u32, String> =
            q.answer(&dummy()).returning_result("dummy()");
        assert_eq!(Ok(5), r);
    }

    #[test]
    fn computed_sees_the_call() {
        let mut q = AnswerQueue::default();
        q.push(computed(|c: &Call| c.name().len()));
        assert_eq!(5usize, q.answer(&dummy()).returning("dummy()"));
    }
}
