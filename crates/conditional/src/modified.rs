use crate::{
    ConditionalConnExt, ConditionalHeadersExt, Error, FromState, LastModifiedSource, Result,
    Validator,
};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use trillium::{Conn, KnownHeaderName, Status};

// 9999-12-31T23:59:59Z, the last second an http date can express
const LAST_HTTP_DATE: i64 = 253_402_300_799;

/// The current modification time of a resource, as reported by a
/// [`LastModifiedSource`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModificationDescriptor {
    /// the time the resource last changed, if known
    pub last_modified: Option<SystemTime>,
}

impl ModificationDescriptor {
    /// constructs a new descriptor
    pub fn new(last_modified: Option<SystemTime>) -> Self {
        Self { last_modified }
    }

    /// Formats the modification time as an http date for a
    /// `Last-Modified` header. Returns None if there is no time or if
    /// it is outside of the years an http date can represent.
    pub fn header_value(&self) -> Option<String> {
        let last_modified = self.last_modified?;
        let seconds = unix_seconds(last_modified);
        if (0..=LAST_HTTP_DATE).contains(&seconds) {
            Some(httpdate::fmt_http_date(last_modified))
        } else {
            log::warn!("not sending last-modified for {last_modified:?}, out of range");
            None
        }
    }
}

impl From<SystemTime> for ModificationDescriptor {
    fn from(last_modified: SystemTime) -> Self {
        Self::new(Some(last_modified))
    }
}

/// whole seconds since the epoch, rounded toward the past
fn unix_seconds(time: SystemTime) -> i64 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(duration) => i64::try_from(duration.as_secs()).unwrap_or(i64::MAX),
        Err(e) => {
            let duration: Duration = e.duration();
            let seconds = i64::try_from(duration.as_secs()).unwrap_or(i64::MAX);
            -seconds - i64::from(duration.subsec_nanos() > 0)
        }
    }
}

/**
# If-Modified-Since and If-Unmodified-Since validator

Implements the
[`If-Modified-Since`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/If-Modified-Since)
and
[`If-Unmodified-Since`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/If-Unmodified-Since)
protocol against the modification time reported by a
[`LastModifiedSource`], and advertises that time in a
[`Last-Modified`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/Last-Modified)
response header.

Times are compared at a resolution of one second, since that is all an
http date carries. A date that does not parse is treated as though the
resource was modified, which lets the request through. Anything after a
`;` in the header is ignored.

Rejected requests always receive `304 Not Modified`, including a failed
`If-Unmodified-Since` on an unsafe method.

Requests with a querystring are always valid and never receive a
`Last-Modified` header.
*/
#[derive(Debug, Clone, Copy, Default)]
pub struct ModificationValidator<S = FromState> {
    source: S,
}

impl ModificationValidator {
    /// constructs a validator that reads a [`ModificationDescriptor`]
    /// from conn state
    pub fn from_state() -> Self {
        Self::default()
    }
}

impl<S: LastModifiedSource> ModificationValidator<S> {
    /// constructs a validator that asks the provided source for the
    /// current modification time
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// the current modification time of the requested resource
    pub fn current_modification(&self, conn: &Conn) -> Option<ModificationDescriptor> {
        self.source.last_modified(conn)
    }

    /// Returns true if `resource_time` is at least one whole second
    /// later than the http date in `header_value`, or if the header
    /// value cannot be parsed.
    pub fn was_modified_since(resource_time: SystemTime, header_value: &str) -> bool {
        let date = header_value
            .split_once(';')
            .map_or(header_value, |(date, _)| date)
            .trim();

        match httpdate::parse_http_date(date) {
            Ok(since) => unix_seconds(resource_time) > unix_seconds(since),
            Err(e) => {
                log::trace!("could not parse {header_value:?} as an http date: {e}");
                true
            }
        }
    }
}

impl<S: LastModifiedSource> Validator for ModificationValidator<S> {
    fn evaluate(&self, conn: &Conn) -> bool {
        conn.if_modified_since_str().is_some() || conn.if_unmodified_since_str().is_some()
    }

    fn is_valid(&self, conn: &Conn) -> Result<bool> {
        if conn.has_querystring() {
            return Ok(true);
        }

        let Some(last_modified) = self
            .current_modification(conn)
            .and_then(|descriptor| descriptor.last_modified)
        else {
            return Ok(true);
        };

        if let Some(if_modified_since) = conn.if_modified_since_str() {
            return Ok(Self::was_modified_since(last_modified, if_modified_since));
        }

        if let Some(if_unmodified_since) = conn.if_unmodified_since_str() {
            return Ok(!Self::was_modified_since(
                last_modified,
                if_unmodified_since,
            ));
        }

        Err(Error::MissingConditionalHeader {
            validator: "ModificationValidator",
        })
    }

    fn invalid_status(&self, _conn: &Conn) -> Status {
        Status::NotModified
    }

    fn update_response(&self, conn: &mut Conn) {
        if conn.has_querystring()
            || conn
                .inner()
                .response_headers()
                .has_header(KnownHeaderName::LastModified)
        {
            return;
        }

        if let Some(last_modified) = self
            .current_modification(conn)
            .and_then(|descriptor| descriptor.header_value())
        {
            conn.inner_mut()
                .response_headers_mut()
                .insert(KnownHeaderName::LastModified, last_modified);
        }
    }

    fn name(&self) -> std::borrow::Cow<'static, str> {
        "ModificationValidator".into()
    }
}
