use crate::Result;
use std::{
    any::type_name,
    borrow::Cow,
    fmt::{self, Debug, Formatter},
};
use trillium::{Conn, Status};

/**
A conditional request rule, such as the entity tag protocol or the
modification time protocol.

Validators are shared by every request that passes through a
[`Conditional`](crate::Conditional) gate, so they must not hold any
per-request state: everything they need is read from the conn.

The gate calls the methods in this order:

1. [`Validator::evaluate`] decides whether the validator applies to
   the request at all.
2. [`Validator::is_valid`] is only called when `evaluate` returned true.
3. [`Validator::invalid_status`] is only called when `is_valid`
   returned false.
4. [`Validator::update_response`] is always called, after the wrapped
   handler has run or the request has been rejected.
*/
pub trait Validator: Send + Sync + 'static {
    /// returns true if the request carries a conditional header that
    /// this validator understands. This must only depend on the
    /// request headers.
    fn evaluate(&self, conn: &Conn) -> bool;

    /// returns true if the request should be processed normally.
    ///
    /// A validator that cannot decide, because a header does not parse
    /// or the resource has no metadata, returns `Ok(true)`. An `Err` is
    /// reserved for a validator that evaluated the request but cannot
    /// find what it evaluated.
    fn is_valid(&self, conn: &Conn) -> Result<bool>;

    /// the status to respond with when this validator rejects the
    /// request
    fn invalid_status(&self, conn: &Conn) -> Status;

    /// sets the response header that lets a client make its next
    /// request conditional. Implementations must not replace a header
    /// that is already present, and must not set anything for a request
    /// with a querystring.
    fn update_response(&self, conn: &mut Conn);

    /// a human readable name for this validator, used in logs
    fn name(&self) -> Cow<'static, str> {
        type_name::<Self>().into()
    }
}

impl<V: Validator + ?Sized> Validator for Box<V> {
    fn evaluate(&self, conn: &Conn) -> bool {
        (**self).evaluate(conn)
    }

    fn is_valid(&self, conn: &Conn) -> Result<bool> {
        (**self).is_valid(conn)
    }

    fn invalid_status(&self, conn: &Conn) -> Status {
        (**self).invalid_status(conn)
    }

    fn update_response(&self, conn: &mut Conn) {
        (**self).update_response(conn)
    }

    fn name(&self) -> Cow<'static, str> {
        (**self).name()
    }
}

/// The outcome of running every validator against a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The wrapped handler should run
    Proceed,

    /// Every applicable validator declared the request invalid. The
    /// contained status is the one chosen by the last of them.
    Reject(Status),
}

impl Verdict {
    /// returns true if this is [`Verdict::Reject`]
    pub fn is_reject(&self) -> bool {
        matches!(self, Verdict::Reject(_))
    }
}

/**
An ordered list of [`Validator`]s.

Order only matters when several validators reject a request: the
status of the *last* rejecting validator is used.
*/
#[derive(Default)]
pub struct Validators(Vec<Box<dyn Validator>>);

impl Debug for Validators {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.0.iter().map(|validator| validator.name()))
            .finish()
    }
}

impl Validators {
    /// constructs an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// appends a validator to the end of this list
    pub fn push(&mut self, validator: impl Validator) {
        self.0.push(Box::new(validator));
    }

    /// chainable method to append a validator and return self
    pub fn with(mut self, validator: impl Validator) -> Self {
        self.push(validator);
        self
    }

    /// the number of validators in this list
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// returns true if there are no validators in this list
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// iterate over the validators in order
    pub fn iter(&self) -> impl Iterator<Item = &(dyn Validator + 'static)> {
        self.0.iter().map(|validator| &**validator)
    }

    /**
    Decide whether a request should be processed.

    A request is rejected only when at least one validator applies to
    it and every applicable validator declares it invalid. A mix of
    valid and invalid answers lets the request through, as does a
    request that none of the validators apply to.
    */
    pub fn verdict(&self, conn: &Conn) -> Result<Verdict> {
        let mut evaluated = 0;
        let mut invalid = 0;
        let mut invalid_status = None;

        for validator in &self.0 {
            if !validator.evaluate(conn) {
                continue;
            }

            evaluated += 1;
            if !validator.is_valid(conn)? {
                invalid += 1;
                invalid_status = Some(validator.invalid_status(conn));
                log::trace!("{} declared the request invalid", validator.name());
            }
        }

        match invalid_status {
            Some(status) if evaluated > 0 && evaluated == invalid => Ok(Verdict::Reject(status)),
            _ => Ok(Verdict::Proceed),
        }
    }

    /// lets every validator set its response header, in order
    pub fn update_response(&self, conn: &mut Conn) {
        for validator in &self.0 {
            validator.update_response(conn);
        }
    }
}

impl<V: Validator> Extend<V> for Validators {
    fn extend<T: IntoIterator<Item = V>>(&mut self, iter: T) {
        for validator in iter {
            self.push(validator);
        }
    }
}

impl<V: Validator> FromIterator<V> for Validators {
    fn from_iter<T: IntoIterator<Item = V>>(iter: T) -> Self {
        let mut validators = Self::new();
        validators.extend(iter);
        validators
    }
}
