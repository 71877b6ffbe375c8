// vim: tw=80
//! Verifying the relative order of calls across several spies.

use std::sync::Arc;
use tracing::debug;

use crate::{
    Call,
    CallPattern,
    Error,
    Recordable,
    Spy,
    Times,
    verify::no_interaction_wanted
};

/// Something that may take part in an [`InOrder`] session.
///
/// Every [`Recordable`] does.  `None` stands for a missing participant and
/// makes [`in_order`](crate::in_order) fail.
pub trait Participant {
    fn participant(&self) -> Option<&Spy>;
}

impl<R: Recordable + ?Sized> Participant for R {
    fn participant(&self) -> Option<&Spy> {
        Some(self.spy())
    }
}

impl<R: Recordable + ?Sized> Participant for Option<&R> {
    fn participant(&self) -> Option<&Spy> {
        self.map(|r| r.spy())
    }
}

/// One call on the merged timeline of a session.
struct Entry {
    participant: usize,
    call: Arc<Call>,
}

impl AsRef<Call> for Entry {
    fn as_ref(&self) -> &Call {
        &self.call
    }
}

/// A session for verifying calls in the order they happened, possibly across
/// several spies.
///
/// The session scans one merged timeline of all its participants' calls.  Each
/// successful verification moves the session's cursor past the calls it
/// matched, and later verifications can only match calls after the cursor.
///
/// # Examples
/// ```
/// # use tattle::*;
/// let db = Spy::named("db");
/// let log = Spy::named("log");
/// let mut session = in_order(&[&db, &log]).unwrap();
///
/// db.record(Call::new("begin"));
/// log.record(Call::new("info").arg("saving"));
/// db.record(Call::new("commit"));
///
/// session.verify(&db).had_called_with(call!(begin())).unwrap();
/// session.verify(&log).had_called_with(call!(info("saving"))).unwrap();
/// session.verify(&db).had_called_with(call!(commit())).unwrap();
///
/// // begin() is behind the cursor now
/// assert!(session.verify(&db).had_called_with(call!(begin())).is_err());
/// ```
pub struct InOrder {
    participants: Vec<Spy>,
    /// Where the next verification starts scanning.  `None` until the first
    /// verification of the session.
    next_index: Option<usize>,
    /// Every call matched by this session, as (participant, pattern)
    verified: Vec<(usize, Arc<CallPattern>)>,
}

impl InOrder {
    pub(crate) fn new(participants: &[&dyn Participant]) -> Result<Self, Error>
    {
        if participants.is_empty() {
            return Err(Error::MocksException(
                "in_order requires at least one spy".to_owned()));
        }
        let mut spies: Vec<Spy> = Vec::with_capacity(participants.len());
        for (i, p) in participants.iter().enumerate() {
            let spy = p.participant()
                .ok_or_else(|| Error::MocksException(
                    format!("in_order participant {} is missing", i)))?;
            if let Some(other) = spies.iter().find(|s| s.overlaps(spy)) {
                return Err(Error::MocksException(format!(
                    "{} and {} record the same calls", other.name(),
                    spy.name())));
            }
            spies.push(spy.clone());
        }
        Ok(InOrder{participants: spies, next_index: None, verified: Vec::new()})
    }

    /// Start verifying a call of `spy`, which must be one of the session's
    /// participants.
    pub fn verify<R>(&mut self, spy: &R) -> InOrderVerifier<'_>
        where R: Recordable + ?Sized
    {
        let spy = spy.spy();
        let participant = self.participants.iter()
            .position(|p| p.overlaps(spy) && p.name() == spy.name());
        InOrderVerifier {
            session: self,
            participant,
            name: spy.name(),
            times: Times::ONCE
        }
    }

    /// Fail if any call of any participant was not matched by this session.
    pub fn verify_no_more_interactions(&self) -> Result<(), Error> {
        let mut left = self.timeline();
        for (participant, pattern) in &self.verified {
            let pos = left.iter()
                .position(|e| e.participant == *participant &&
                          pattern.matches(&e.call));
            match pos {
                Some(i) => {
                    left.remove(i);
                },
                None => return Err(Error::NoInteractionWanted {
                    spy: self.name(),
                    calls: vec![pattern.to_string()]
                })
            }
        }
        if left.is_empty() {
            Ok(())
        } else {
            Err(no_interaction_wanted(self.name(), &left))
        }
    }

    /// The cursor position, once the first verification has set it.
    pub fn next_index(&self) -> Option<usize> {
        self.next_index
    }

    fn name(&self) -> String {
        let names: Vec<String> = self.participants.iter()
            .map(Spy::name)
            .collect();
        format!("in_order({})", names.join(", "))
    }

    /// Every participant's calls, in the order they happened.
    fn timeline(&self) -> Vec<Entry> {
        let mut entries: Vec<(usize, Entry)> = self.participants.iter()
            .enumerate()
            .flat_map(|(participant, spy)| {
                spy.invocations()
                    .into_iter()
                    .map(move |i| (i.seq, Entry{participant, call: i.call}))
            }).collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter()
            .map(|(_, e)| e)
            .collect()
    }
}

/// Returned by [`InOrder::verify`].
pub struct InOrderVerifier<'s> {
    session: &'s mut InOrder,
    participant: Option<usize>,
    name: String,
    times: Times,
}

impl<'s> InOrderVerifier<'s> {
    /// Replace the default [`Times::ONCE`] requirement.
    pub fn with(mut self, times: Times) -> Self {
        self.times = times;
        self
    }

    /// Verify that the calls at the session's cursor match `pattern` the
    /// wanted number of times.
    ///
    /// The matching calls must be contiguous on the session's timeline and
    /// start exactly at the cursor.  The first verification of a session
    /// instead starts at the first call that matches `pattern` anywhere.
    ///
    /// # Errors
    ///
    /// * [`Error::ArgumentsAreDifferent`] if nothing matched at the start of
    ///   the timeline, but the call there has the wanted name.
    /// * [`Error::WantedButNotInvoked`] if nothing matched at the start of the
    ///   timeline, and the call there is something else.
    /// * [`Error::VerificationInOrderFailure`] for every other failure.
    pub fn had_called_with(self, pattern: CallPattern) -> Result<(), Error> {
        let idx = self.participant.ok_or_else(|| Error::MocksException(
            format!("{} is not part of this in_order session", self.name)))?;
        let session = self.session;
        let pattern = Arc::new(session.participants[idx].qualify(pattern));
        let timeline = session.timeline();
        let is_match = |e: &Entry| e.participant == idx &&
            pattern.matches(&e.call);

        let start = match session.next_index {
            Some(i) => i,
            None => timeline.iter().position(is_match).unwrap_or(0)
        };
        let count = timeline[start.min(timeline.len())..].iter()
            .take_while(|e| is_match(*e))
            .count();
        let end = start + count;
        debug!(session = %session.name(), pattern = %pattern, start, count,
               times = ?self.times, "verifying in order");

        if let Err(e) = self.times.verify(&pattern, count) {
            return Err(match e {
                Error::WantedButNotInvoked{..} if start == 0 => {
                    match timeline.first() {
                        Some(first) if first.participant == idx &&
                            first.call.name() == pattern.name() =>
                        {
                            Error::ArgumentsAreDifferent {
                                wanted: pattern.to_string(),
                                actual: first.call.to_string()
                            }
                        },
                        _ => e
                    }
                },
                e => Error::VerificationInOrderFailure {
                    call: pattern.to_string(),
                    source: Box::new(e)
                }
            });
        }

        session.next_index = Some(end);
        session.verified.extend(
            std::iter::repeat((idx, pattern.clone())).take(count));
        session.participants[idx].mark_verified(&pattern, count);
        Ok(())
    }
}
