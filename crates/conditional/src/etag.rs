use crate::{
    ConditionalConnExt, ConditionalHeadersExt, EntityTagSource, FromState, MatchList, Result,
    Validator,
};
use etag::EntityTag;
use trillium::{Conn, KnownHeaderName, Method, Status};

/// The current entity tag of a resource, as reported by an
/// [`EntityTagSource`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityTagDescriptor {
    /// the opaque tag value, without quotes or a weak marker
    pub etag: Option<String>,

    /// whether the tag should be advertised as a weak validator
    pub weak: bool,
}

impl EntityTagDescriptor {
    /// constructs a new descriptor
    pub fn new(etag: Option<String>, weak: bool) -> Self {
        Self { etag, weak }
    }

    /// constructs a descriptor for a strong tag
    pub fn strong(etag: impl Into<String>) -> Self {
        Self::new(Some(etag.into()), false)
    }

    /// constructs a descriptor for a weak tag
    pub fn weak(etag: impl Into<String>) -> Self {
        Self::new(Some(etag.into()), true)
    }

    /// the tag value, if there is one
    pub fn tag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    /// Formats this descriptor as an `ETag` header value: `"tag"`, or
    /// `W/"tag"` when weak. Returns None if there is no tag, if the tag
    /// is empty, or if it contains a double quote, a space, or a
    /// control character. Non-ascii tags are sent as is.
    pub fn header_value(&self) -> Option<String> {
        let tag = self.tag().filter(|tag| !tag.is_empty())?;
        if !tag.bytes().all(is_etagc) {
            log::warn!("not sending etag for {tag:?}, it contains characters an etag cannot");
            return None;
        }

        let prefix = if self.weak { "W/" } else { "" };
        Some(format!("{prefix}\"{tag}\""))
    }
}

// etagc = %x21 / %x23-7E / obs-text
fn is_etagc(byte: u8) -> bool {
    byte == 0x21 || (0x23..=0x7e).contains(&byte) || byte >= 0x80
}

impl From<EntityTag> for EntityTagDescriptor {
    fn from(entity_tag: EntityTag) -> Self {
        Self::new(Some(entity_tag.tag().to_string()), entity_tag.weak)
    }
}

impl From<&EntityTag> for EntityTagDescriptor {
    fn from(entity_tag: &EntityTag) -> Self {
        Self::new(Some(entity_tag.tag().to_string()), entity_tag.weak)
    }
}

/**
# If-Match and If-None-Match validator

Implements the
[`If-None-Match`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/If-None-Match)
and
[`If-Match`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/If-Match)
protocol against the entity tag reported by an [`EntityTagSource`],
and advertises that tag in an
[`ETag`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Headers/ETag)
response header.

When both headers are present, only `If-None-Match` is considered.
Rejected `GET` and `HEAD` requests receive
[`304 Not Modified`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Status/304),
any other method receives
[`412 Precondition Failed`](https://developer.mozilla.org/en-US/docs/Web/HTTP/Status/412).

## Comparison

Tags are compared by their value alone. A weak marker on either side
is ignored when matching and only affects how the outbound header is
formatted.

## Querystrings

The entity tag of a resource does not describe a response to a request
with a querystring. For such requests, only a wildcard can match, and
no `ETag` header is set.
*/
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityTagValidator<S = FromState> {
    source: S,
}

impl EntityTagValidator {
    /// constructs a validator that reads an
    /// [`EntityTagDescriptor`] from conn state
    pub fn from_state() -> Self {
        Self::default()
    }
}

impl<S: EntityTagSource> EntityTagValidator<S> {
    /// constructs a validator that asks the provided source for the
    /// current entity tag
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// the current entity tag of the requested resource
    pub fn current_tag(&self, conn: &Conn) -> Option<EntityTagDescriptor> {
        self.source.entity_tag(conn)
    }

    /// Returns true if the match list matches the current tag.
    ///
    /// A wildcard matches every existing resource, and never matches a
    /// [`NullResource`](crate::NullResource). Otherwise the tag must be
    /// present in the list and the request must not have a
    /// querystring.
    pub fn matches(&self, conn: &Conn, tag: Option<&str>, match_list: &MatchList) -> bool {
        if match_list.is_wildcard() {
            return !conn.is_null_resource();
        }

        !conn.has_querystring() && tag.map_or(false, |tag| match_list.contains_tag(tag))
    }
}

impl<S: EntityTagSource> Validator for EntityTagValidator<S> {
    fn evaluate(&self, conn: &Conn) -> bool {
        conn.if_none_match_str().is_some() || conn.if_match_str().is_some()
    }

    fn is_valid(&self, conn: &Conn) -> Result<bool> {
        let current = self.current_tag(conn);
        let tag = current.as_ref().and_then(EntityTagDescriptor::tag);

        let if_none_match = conn.if_none_match();
        if !if_none_match.is_empty() {
            let matched = self.matches(conn, tag, &if_none_match);
            log::trace!("if-none-match {if_none_match:?} against {tag:?}: matched={matched}");
            return Ok(!matched);
        }

        let if_match = conn.if_match();
        if !if_match.is_empty() {
            let matched = self.matches(conn, tag, &if_match);
            log::trace!("if-match {if_match:?} against {tag:?}: matched={matched}");
            return Ok(matched);
        }

        Ok(true)
    }

    fn invalid_status(&self, conn: &Conn) -> Status {
        match conn.method() {
            Method::Get | Method::Head => Status::NotModified,
            _ => Status::PreconditionFailed,
        }
    }

    fn update_response(&self, conn: &mut Conn) {
        if conn.has_querystring()
            || conn
                .inner()
                .response_headers()
                .has_header(KnownHeaderName::Etag)
        {
            return;
        }

        if let Some(etag) = self
            .current_tag(conn)
            .and_then(|descriptor| descriptor.header_value())
        {
            conn.inner_mut()
                .response_headers_mut()
                .insert(KnownHeaderName::Etag, etag);
        }
    }

    fn name(&self) -> std::borrow::Cow<'static, str> {
        "EntityTagValidator".into()
    }
}
