use crate::{EntityTagValidator, ModificationValidator, Validator, Validators, Verdict};
use trillium::{Conn, Handler, Status};
use trillium_macros::Handler;

/**
# Conditional request gate

Wraps a [`Handler`] and only runs it if the request's conditional
headers allow it.

Each request is checked against an ordered list of [`Validator`]s. The
wrapped handler is skipped only when at least one validator applies to
the request and *every* applicable validator declares the request
invalid. In that case the conn is halted with the status of the last
rejecting validator and an empty body. Otherwise the wrapped handler is
run exactly once.

Whether or not the handler ran, every validator then gets a chance to
set its response header (such as `ETag` or `Last-Modified`), so that
`304` responses still carry caching metadata.

```
use trillium::Conn;
use trillium_conditional::{Conditional, ConditionalConnExt, EntityTagDescriptor};
use trillium_testing::prelude::*;

let app = (
    |conn: Conn| async move { conn.with_current_etag(EntityTagDescriptor::strong("v1")) },
    Conditional::with_default_validators("the body"),
);

assert_ok!(get("/").on(&app), "the body", "etag" => "\"v1\"");

let conn = get("/").with_request_header("if-none-match", "\"v1\"").on(&app);
assert_status!(&conn, 304);
assert_headers!(&conn, "etag" => "\"v1\"");
```

If a validator reports that it applies to a request but then cannot
find the headers it applied to, the gate logs an error, halts with a
`500 Internal Server Error`, and neither the wrapped handler nor the
validators' response headers are run.
*/
#[derive(Handler, Debug)]
pub struct Conditional<H> {
    #[handler(except = run)]
    handler: H,
    validators: Validators,
}

impl<H: Handler> Conditional<H> {
    /// Constructs a new gate around the provided handler with no
    /// validators. Until validators are added with
    /// [`Conditional::with_validator`], every request is passed through.
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            validators: Validators::new(),
        }
    }

    /// Constructs a new gate around the provided handler with an
    /// [`EntityTagValidator`] and a [`ModificationValidator`], both of
    /// which read their descriptors from conn state.
    pub fn with_default_validators(handler: H) -> Self {
        Self::new(handler)
            .with_validator(EntityTagValidator::from_state())
            .with_validator(ModificationValidator::from_state())
    }

    /// chainable method to append a validator to the end of the list
    pub fn with_validator(mut self, validator: impl Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// chainable method to append several validators, in order
    pub fn with_validators<V: Validator>(mut self, validators: impl IntoIterator<Item = V>) -> Self {
        self.validators.extend(validators);
        self
    }

    /// the validators consulted by this gate, in order
    pub fn validators(&self) -> &Validators {
        &self.validators
    }

    /// borrow the wrapped handler
    pub fn handler(&self) -> &H {
        &self.handler
    }

    async fn run(&self, conn: Conn) -> Conn {
        let verdict = match self.validators.verdict(&conn) {
            Ok(verdict) => verdict,
            Err(e) => {
                log::error!("{}:{} {}", file!(), line!(), e);
                return conn.with_status(Status::InternalServerError).halt();
            }
        };

        let mut conn = match verdict {
            Verdict::Reject(status) => {
                log::debug!("conditional request rejected with {status:?}");
                conn.with_status(status).halt()
            }

            Verdict::Proceed => self.handler.run(conn).await,
        };

        self.validators.update_response(&mut conn);
        conn
    }
}

/// Alias for [`Conditional::with_default_validators`]
pub fn conditional<H: Handler>(handler: H) -> Conditional<H> {
    Conditional::with_default_validators(handler)
}
