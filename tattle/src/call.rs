// vim: tw=80
//! Recorded calls and the patterns that match them.

use std::{
    collections::BTreeMap,
    fmt
};

use crate::value::{Arg, Value, normalize};

/// One recorded invocation of a spy.
///
/// A `Call` has a dotted name (like `"foo.bar"` for a method `bar` of a spy's
/// `foo` attribute), positional arguments and keyword arguments.  Two calls
/// are equal if all three are equal.
pub struct Call {
    name: String,
    args: Vec<Box<dyn Value>>,
    kwargs: BTreeMap<String, Box<dyn Value>>,
}

impl Call {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Call {
            name: name.into(),
            args: Vec::new(),
            kwargs: BTreeMap::new()
        }
    }

    /// Append a positional argument.
    pub fn arg<T: Value>(mut self, value: T) -> Self {
        self.args.push(normalize(Box::new(value)));
        self
    }

    /// Add a keyword argument.
    pub fn kwarg<K, T>(mut self, key: K, value: T) -> Self
        where K: Into<String>, T: Value
    {
        self.kwargs.insert(key.into(), normalize(Box::new(value)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Box<dyn Value>] {
        &self.args
    }

    pub fn kwargs(&self) -> &BTreeMap<String, Box<dyn Value>> {
        &self.kwargs
    }

    /// Downcast the `i`th positional argument.
    pub fn arg_as<T: Value>(&self, i: usize) -> Option<&T> {
        self.args.get(i)?
            .downcast_ref::<T>()
            .ok()
    }

    /// Downcast a keyword argument.
    pub fn kwarg_as<T: Value>(&self, key: &str) -> Option<&T> {
        self.kwargs.get(key)?
            .downcast_ref::<T>()
            .ok()
    }

    pub(crate) fn qualified(mut self, prefix: Option<&str>) -> Self {
        if let Some(p) = prefix {
            self.name = format!("{}.{}", p, self.name);
        }
        self
    }
}

impl PartialEq for Call {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name &&
            self.args.len() == other.args.len() &&
            self.args.iter()
                .zip(other.args.iter())
                .all(|(l, r)| l.eq_value(r.as_ref())) &&
            self.kwargs.len() == other.kwargs.len() &&
            self.kwargs.iter()
                .all(|(k, l)| other.kwargs.get(k)
                     .map_or(false, |r| l.eq_value(r.as_ref())))
    }
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_call(f, &self.name, &self.args, &self.kwargs)
    }
}

/// A [`Call`]-shaped pattern, used both for stubbing and for verification.
///
/// Each argument slot is an [`Arg`]: a literal value compared by equality, a
/// type predicate from [`instance_of`](crate::instance_of), or a
/// [`Predicate`](crate::Predicate) from [`matching`](crate::matching).  The
/// [`call!`](crate::call) macro is the usual way to build one.
///
/// # Examples
/// ```
/// # use tattle::*;
/// let pattern = CallPattern::new("send")
///     .arg("hello")
///     .kwarg("retries", instance_of::<u32>());
/// let call = Call::new("send").arg("hello").kwarg("retries", 3u32);
/// assert!(pattern.matches(&call));
/// ```
#[derive(Debug)]
pub struct CallPattern {
    name: String,
    args: Vec<Arg>,
    kwargs: BTreeMap<String, Arg>,
}

impl CallPattern {
    pub fn new<S: Into<String>>(name: S) -> Self {
        CallPattern {
            name: name.into(),
            args: Vec::new(),
            kwargs: BTreeMap::new()
        }
    }

    /// Append a positional argument slot.
    pub fn arg<A: Into<Arg>>(mut self, arg: A) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add a keyword argument slot.
    pub fn kwarg<K, A>(mut self, key: K, arg: A) -> Self
        where K: Into<String>, A: Into<Arg>
    {
        self.kwargs.insert(key.into(), arg.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Does this pattern match the recorded `call`?
    pub fn matches(&self, call: &Call) -> bool {
        self.name == call.name &&
            self.args.len() == call.args.len() &&
            self.args.iter()
                .zip(call.args.iter())
                .all(|(a, v)| a.matches(v.as_ref())) &&
            self.kwargs.len() == call.kwargs.len() &&
            self.kwargs.iter()
                .all(|(k, a)| call.kwargs.get(k)
                     .map_or(false, |v| a.matches(v.as_ref())))
    }

    pub(crate) fn qualified(mut self, prefix: Option<&str>) -> Self {
        if let Some(p) = prefix {
            self.name = format!("{}.{}", p, self.name);
        }
        self
    }
}

impl fmt::Display for CallPattern {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt_call(f, &self.name, &self.args, &self.kwargs)
    }
}

fn fmt_call<A, K>(f: &mut fmt::Formatter, name: &str, args: &[A],
                  kwargs: &BTreeMap<String, K>) -> fmt::Result
    where A: fmt::Debug, K: fmt::Debug
{
    write!(f, "{}(", name)?;
    let mut first = true;
    for a in args {
        if !first {
            write!(f, ", ")?;
        }
        first = false;
        write!(f, "{:?}", a)?;
    }
    for (k, v) in kwargs {
        if !first {
            write!(f, ", ")?;
        }
        first = false;
        write!(f, "{}={:?}", k, v)?;
    }
    write!(f, ")")
}

/// Build a [`CallPattern`] from something that looks like a method call.
///
/// The name may be a dotted attribute path.  Every argument is converted with
/// `Into<Arg>`, so literals, [`instance_of`](crate::instance_of) and
/// [`matching`](crate::matching) can be mixed freely.  Keyword arguments can
/// be added afterwards with [`CallPattern::kwarg`].
///
/// # Examples
/// ```
/// # use tattle::*;
/// let p = call!(store.put("key", instance_of::<Vec<u8>>()));
/// assert_eq!("store.put", p.name());
/// assert!(p.matches(&Call::new("store.put").arg("key").arg(vec![1u8, 2])));
/// ```
#[macro_export]
macro_rules! call {
    ($($name:ident).+ ( $( $arg:expr ),* $(,)? )) => {
        $crate::CallPattern::new([$( stringify!($name) ),+].join("."))
            $( .arg($arg) )*
    };
}
