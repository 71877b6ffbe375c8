// vim: tw=80
//! Type-erased argument values and the matchers used in call patterns.

use downcast::*;
use predicates::prelude::Predicate;
use std::fmt;

/// A value that can be recorded as a call argument.
///
/// Implemented for every `'static` type that is
/// `PartialEq + Debug + Send + Sync`.
/// Recorded values are compared with each other dynamically: two values are
/// equal only if they have the same concrete type and that type's
/// `PartialEq` says so.
pub trait Value: Any + fmt::Debug + Send + Sync {
    #[doc(hidden)]
    fn eq_value(&self, other: &dyn Value) -> bool;
}
downcast!(dyn Value);

impl<T> Value for T
    where T: PartialEq + fmt::Debug + Send + Sync + 'static
{
    fn eq_value(&self, other: &dyn Value) -> bool {
        other.downcast_ref::<T>()
            .map_or(false, |o| self == o)
    }
}

/// Store string literals as `String`s, so that a pattern written as
/// `call!(add("foo"))` matches a call recorded from a `&str` argument.
pub(crate) fn normalize(v: Box<dyn Value>) -> Box<dyn Value> {
    let owned = v.downcast_ref::<&'static str>()
        .ok()
        .map(|s| String::from(*s));
    match owned {
        Some(s) => Box::new(s),
        None => v
    }
}

fn is_instance<T: Value>(v: &dyn Value) -> bool {
    v.is::<T>()
}

/// One argument slot of a [`CallPattern`](crate::CallPattern).
///
/// Any [`Value`] converts into an `Arg` that matches by equality.  Use
/// [`instance_of`](crate::instance_of) to match any value of a type, or
/// [`matching`](crate::matching) to match with a
/// [`Predicate`](crate::Predicate).
pub enum Arg {
    Eq(Box<dyn Value>),
    InstanceOf {
        type_name: &'static str,
        check: fn(&dyn Value) -> bool,
    },
    Matches {
        description: String,
        check: Box<dyn Fn(&dyn Value) -> bool + Send + Sync>,
    },
}

impl Arg {
    /// Match values of type `T`, whatever their contents.
    pub fn instance_of<T: Value>() -> Self {
        Arg::InstanceOf {
            type_name: std::any::type_name::<T>(),
            check: is_instance::<T>
        }
    }

    /// Match values of type `T` that satisfy `p`.
    pub fn matching<T, P>(p: P) -> Self
        where T: Value, P: Predicate<T> + Send + Sync + 'static
    {
        let description = p.to_string();
        let check = move |v: &dyn Value| {
            v.downcast_ref::<T>()
                .map_or(false, |t| p.eval(t))
        };
        Arg::Matches{description, check: Box::new(check)}
    }

    /// Does the recorded value `v` fit this slot?
    pub fn matches(&self, v: &dyn Value) -> bool {
        match self {
            Arg::Eq(expected) => expected.eq_value(v),
            Arg::InstanceOf{check, ..} => check(v),
            Arg::Matches{check, ..} => check(v),
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Arg::Eq(v) => write!(f, "{:?}", v),
            Arg::InstanceOf{type_name, ..} => {
                write!(f, "<type: {}>", type_name)
            },
            Arg::Matches{description, ..} => write!(f, "<{}>", description),
        }
    }
}

impl<T: Value> From<T> for Arg {
    fn from(v: T) -> Self {
        Arg::Eq(normalize(Box::new(v)))
    }
}
