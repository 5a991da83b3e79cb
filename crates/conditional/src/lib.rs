/*!
# Trillium handler for conditional requests

This crate answers the
[`If-Match`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/If-Match),
[`If-None-Match`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/If-None-Match),
[`If-Modified-Since`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/If-Modified-Since),
and
[`If-Unmodified-Since`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/If-Unmodified-Since)
request headers on behalf of a wrapped handler, responding with `304
Not Modified` or `412 Precondition Failed` without running that handler
when the client's copy is still current.

The [`Conditional`] handler drives an ordered list of [`Validator`]s.
Two are provided: [`EntityTagValidator`] and [`ModificationValidator`].
Each one asks a source ([`EntityTagSource`] or [`LastModifiedSource`])
for the current metadata of the requested resource. By default these
sources read an [`EntityTagDescriptor`] or a
[`ModificationDescriptor`] from conn state, which an earlier handler
can put there with [`ConditionalConnExt`]. The conditional request
headers themselves can be read from a conn or from
[`Headers`](trillium::Headers) with [`ConditionalHeadersExt`].

```
use std::time::{Duration, SystemTime};
use trillium::Conn;
use trillium_conditional::{conditional, ConditionalConnExt, EntityTagDescriptor};
use trillium_testing::prelude::*;

let last_modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_168_087_332);

let app = (
    move |conn: Conn| async move {
        conn.with_current_etag(EntityTagDescriptor::weak("rev-7"))
            .with_current_modification(last_modified)
    },
    conditional("the representation"),
);

assert_ok!(
    get("/").on(&app),
    "the representation",
    "etag" => "W/\"rev-7\"",
    "last-modified" => "Sat, 06 Jan 2007 12:42:12 GMT"
);

assert_status!(
    get("/").with_request_header("if-none-match", "\"rev-7\"").on(&app),
    304
);

assert_status!(
    post("/").with_request_header("if-match", "\"rev-6\"").on(&app),
    412
);
```

Requests with a querystring are treated as unconditional, since the
metadata of a resource does not describe a form submission or a
negotiated representation of it.
*/
#![forbid(unsafe_code)]
#![deny(
    missing_copy_implementations,
    rustdoc::missing_crate_level_docs,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    unused_qualifications
)]

mod error;
pub use error::{Error, Result};

mod match_list;
pub use match_list::{parse_match_list, MatchList};

mod source;
pub use source::{
    EntityTagSource, FromResource, FromState, LastModifiedSource, NullResource, Resource,
};

mod conditional_conn_ext;
pub use conditional_conn_ext::{ConditionalConnExt, ConditionalHeadersExt};

mod validators;
pub use validators::{Validator, Validators, Verdict};

mod etag;
pub use crate::etag::{EntityTagDescriptor, EntityTagValidator};
pub use ::etag::EntityTag;

mod modified;
pub use modified::{ModificationDescriptor, ModificationValidator};

mod conditional;
pub use conditional::{conditional, Conditional};
