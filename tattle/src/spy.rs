// vim: tw=80
//! The recording test double that stubs and verifications operate on.

use std::{
    fmt,
    sync::{
        Arc,
        Mutex,
        TryLockError,
        atomic::{AtomicUsize, Ordering}
    }
};
use tracing::trace;

use crate::{
    Call,
    CallPattern,
    Outcome,
    answer::AnswerQueue,
    lock,
    stub::StubRegistry
};

/// Orders calls across every spy in the process.
static CLOCK: AtomicUsize = AtomicUsize::new(0);

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

/// One entry of a spy's call log.
#[derive(Clone)]
pub(crate) struct Invocation {
    /// Position on the process-wide timeline
    pub(crate) seq: usize,
    pub(crate) call: Arc<Call>,
}

#[derive(Default)]
struct State {
    log: Vec<Invocation>,
    stubs: StubRegistry,
    /// Patterns already claimed by verifications, once per claimed call
    ledger: Vec<Arc<CallPattern>>,
}

struct Inner {
    id: usize,
    name: String,
    state: Mutex<State>,
}

/// A recording test double.
///
/// Every call [`record`](#method.record)ed on a spy is appended to its call
/// log and answered from its stubs.  `Spy` is a handle: clones share the same
/// log, stubs and verification ledger.
///
/// Attributes of the spied-on object are modelled with
/// [`attr`](#method.attr), which returns a view of the same spy whose calls
/// are named `"<attr>.<method>"`.
///
/// # Examples
/// ```
/// # use tattle::*;
/// let spy = Spy::named("list");
/// spy.record(Call::new("add").arg(1));
/// spy.attr("inner").record(Call::new("clear"));
///
/// let names: Vec<String> = spy.calls()
///     .iter()
///     .map(|c| c.name().to_owned())
///     .collect();
/// assert_eq!(vec!["add", "inner.clear"], names);
/// ```
#[derive(Clone)]
pub struct Spy {
    inner: Arc<Inner>,
    prefix: Option<String>,
}

impl Spy {
    pub fn new() -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self::with_id(id, format!("spy#{}", id))
    }

    pub fn named<S: Into<String>>(name: S) -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self::with_id(id, name.into())
    }

    fn with_id(id: usize, name: String) -> Self {
        let state = Mutex::new(State::default());
        Spy {
            inner: Arc::new(Inner{id, name, state}),
            prefix: None
        }
    }

    /// The spy's name, including the attribute path of a view.
    pub fn name(&self) -> String {
        match &self.prefix {
            Some(p) => format!("{}.{}", self.inner.name, p),
            None => self.inner.name.clone()
        }
    }

    /// A view of the attribute `name`.
    ///
    /// Calls recorded through the view are logged by this spy as
    /// `"name.<method>"`.  Patterns given to `when` or `verify` for the view
    /// are qualified the same way.
    pub fn attr(&self, name: &str) -> Spy {
        let prefix = match &self.prefix {
            Some(p) => format!("{}.{}", p, name),
            None => name.to_owned()
        };
        Spy{inner: self.inner.clone(), prefix: Some(prefix)}
    }

    /// Log `call` and answer it from the newest matching stub.
    pub fn record(&self, call: Call) -> Outcome {
        let call = Arc::new(call.qualified(self.prefix.as_deref()));
        let answers = {
            let mut state = lock(&self.inner.state);
            let seq = CLOCK.fetch_add(1, Ordering::Relaxed);
            state.log.push(Invocation{seq, call: call.clone()});
            trace!(spy = %self.inner.name, seq, %call, "recorded");
            state.stubs.lookup(&call)
        };
        // Answers may call back into the spy, but not into the stub that is
        // answering.
        let answers = match answers {
            Some(answers) => answers,
            None => return Outcome::Default
        };
        let mut queue = match answers.try_lock() {
            Ok(queue) => queue,
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            Err(TryLockError::WouldBlock) => {
                panic!("{}: re-entrant answer for {}", self.inner.name, call)
            }
        };
        queue.answer(&call)
    }

    /// Every call logged through this spy (or view), oldest first.
    pub fn calls(&self) -> Vec<Arc<Call>> {
        self.invocations()
            .into_iter()
            .map(|i| i.call)
            .collect()
    }

    /// Forget every recorded call, and every verification of them.
    ///
    /// Stubs are kept.  On a view, only the view's calls are forgotten.
    pub fn reset(&self) {
        let mut state = lock(&self.inner.state);
        state.log.retain(|i| !self.in_view(i.call.name()));
        state.ledger.retain(|p| !self.in_view(p.name()));
        trace!(spy = %self.name(), "reset");
    }

    /// Forget every stub.  On a view, only the view's stubs are forgotten.
    pub fn clear_stubs(&self) {
        let mut state = lock(&self.inner.state);
        state.stubs.clear(|name| self.in_view(name));
    }

    /// Do both spies refer to the same recorded calls, at least partly?
    pub(crate) fn overlaps(&self, other: &Spy) -> bool {
        if !Arc::ptr_eq(&self.inner, &other.inner) {
            return false;
        }
        match (&self.prefix, &other.prefix) {
            (Some(a), Some(b)) => {
                a == b || self.in_view(b) || other.in_view(a)
            },
            _ => true
        }
    }

    fn in_view(&self, name: &str) -> bool {
        match &self.prefix {
            Some(p) => name.len() > p.len() &&
                name.starts_with(p.as_str()) &&
                name.as_bytes()[p.len()] == b'.',
            None => true
        }
    }

    pub(crate) fn qualify(&self, pattern: CallPattern) -> CallPattern {
        pattern.qualified(self.prefix.as_deref())
    }

    pub(crate) fn stub(&self, pattern: CallPattern) -> Arc<Mutex<AnswerQueue>> {
        lock(&self.inner.state).stubs.register(pattern)
    }

    pub(crate) fn invocations(&self) -> Vec<Invocation> {
        lock(&self.inner.state).log
            .iter()
            .filter(|i| self.in_view(i.call.name()))
            .cloned()
            .collect()
    }

    pub(crate) fn ledger(&self) -> Vec<Arc<CallPattern>> {
        lock(&self.inner.state).ledger
            .iter()
            .filter(|p| self.in_view(p.name()))
            .cloned()
            .collect()
    }

    /// Record that `count` calls matching `pattern` have been verified.
    pub(crate) fn mark_verified(&self, pattern: &Arc<CallPattern>, count: usize)
    {
        let mut state = lock(&self.inner.state);
        state.ledger.extend(std::iter::repeat(pattern).cloned().take(count));
    }
}

impl Default for Spy {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Spy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Spy")
            .field("id", &self.inner.id)
            .field("name", &self.name())
            .finish()
    }
}

/// Anything that records its calls with a [`Spy`].
///
/// Hand-written test doubles implement this by exposing their spy; types
/// generated by [`#[spy]`](crate::spy) implement it automatically.  Every
/// stubbing and verification function accepts a `Recordable`.
///
/// # Examples
/// ```
/// # use tattle::*;
/// trait Cache {
///     fn get(&self, key: &str) -> Option<u32>;
/// }
///
/// struct FakeCache(Spy);
///
/// impl Recordable for FakeCache {
///     fn spy(&self) -> &Spy {
///         &self.0
///     }
/// }
///
/// impl Cache for FakeCache {
///     fn get(&self, key: &str) -> Option<u32> {
///         self.record(Call::new("get").arg(key.to_owned()))
///             .returning("get")
///     }
/// }
///
/// let cache = FakeCache(Spy::named("cache"));
/// when(&cache).has_a_call(call!(get("a"))).then_return(Some(1u32));
/// assert_eq!(Some(1), cache.get("a"));
/// verify(&cache).had_called_with(call!(get("a"))).unwrap();
/// ```
pub trait Recordable {
    fn spy(&self) -> &Spy;

    fn record(&self, call: Call) -> Outcome {
        self.spy().record(call)
    }
}

impl Recordable for Spy {
    fn spy(&self) -> &Spy {
        self
    }
}
