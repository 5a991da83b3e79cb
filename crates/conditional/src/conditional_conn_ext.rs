use crate::{EntityTagDescriptor, MatchList, ModificationDescriptor, NullResource};
use std::borrow::Cow;
use trillium::Conn;
use trillium_http::{HeaderValue, Headers, KnownHeaderName};

/// Provides an extension trait for both [`trillium::Headers`] and
/// also [`trillium::Conn`] for reading the conditional request headers.
/// When called on a [`Conn`], these read the request headers.
///
/// Header values that are not valid utf-8 are treated as absent.
/// `If-Match` and `If-None-Match` are lists, so a header sent on
/// several lines is read as though its values had been joined with a
/// comma.
pub trait ConditionalHeadersExt {
    /// returns the parsed `If-Match` header. Absent or entirely
    /// malformed headers produce an empty list.
    fn if_match(&self) -> MatchList {
        MatchList::parse(self.if_match_str().as_deref())
    }

    /// returns the parsed `If-None-Match` header. Absent or entirely
    /// malformed headers produce an empty list.
    fn if_none_match(&self) -> MatchList {
        MatchList::parse(self.if_none_match_str().as_deref())
    }

    /// returns the unparsed `If-Match` header
    fn if_match_str(&self) -> Option<Cow<'_, str>>;
    /// returns the unparsed `If-None-Match` header
    fn if_none_match_str(&self) -> Option<Cow<'_, str>>;

    /// returns the unparsed `If-Modified-Since` header
    fn if_modified_since_str(&self) -> Option<&str>;
    /// returns the unparsed `If-Unmodified-Since` header
    fn if_unmodified_since_str(&self) -> Option<&str>;
}

impl ConditionalHeadersExt for Headers {
    fn if_match_str(&self) -> Option<Cow<'_, str>> {
        joined(self, KnownHeaderName::IfMatch)
    }

    fn if_none_match_str(&self) -> Option<Cow<'_, str>> {
        joined(self, KnownHeaderName::IfNoneMatch)
    }

    fn if_modified_since_str(&self) -> Option<&str> {
        self.get_str(KnownHeaderName::IfModifiedSince)
    }

    fn if_unmodified_since_str(&self) -> Option<&str> {
        self.get_str(KnownHeaderName::IfUnmodifiedSince)
    }
}

impl ConditionalHeadersExt for Conn {
    fn if_match_str(&self) -> Option<Cow<'_, str>> {
        self.inner().request_headers().if_match_str()
    }

    fn if_none_match_str(&self) -> Option<Cow<'_, str>> {
        self.inner().request_headers().if_none_match_str()
    }

    fn if_modified_since_str(&self) -> Option<&str> {
        self.inner().request_headers().if_modified_since_str()
    }

    fn if_unmodified_since_str(&self) -> Option<&str> {
        self.inner().request_headers().if_unmodified_since_str()
    }
}

fn joined(headers: &Headers, name: KnownHeaderName) -> Option<Cow<'_, str>> {
    let values = headers
        .get_values(name)?
        .iter()
        .filter_map(HeaderValue::as_str)
        .collect::<Vec<_>>();

    match values.as_slice() {
        [] => None,
        [value] => Some(Cow::Borrowed(*value)),
        values => Some(Cow::Owned(values.join(", "))),
    }
}

/// Provides an extension trait for [`trillium::Conn`] for describing
/// the current state of the requested resource to the validators.
///
/// The `set_*` and `with_*` methods place values in conn state, which
/// is where [`FromState`](crate::FromState) looks for them. They are
/// meant to be called by a handler that runs before the
/// [`Conditional`](crate::Conditional) gate, since validation happens
/// before the wrapped handler is run.
pub trait ConditionalConnExt: Sized {
    /// returns true if the request includes a non-empty querystring.
    ///
    /// Resource metadata does not describe the response to a request
    /// with a querystring (a form submission or a negotiated
    /// representation), so validators treat such requests as
    /// unconditional and do not advertise caching headers for them.
    fn has_querystring(&self) -> bool;

    /// returns true if a [`NullResource`] marker has been set
    fn is_null_resource(&self) -> bool;
    /// marks the requested resource as not yet existing
    fn set_null_resource(&mut self);

    /// stores the resource's current entity tag in conn state
    fn set_current_etag(&mut self, descriptor: impl Into<EntityTagDescriptor>);
    /// stores the resource's current modification time in conn state
    fn set_current_modification(&mut self, descriptor: impl Into<ModificationDescriptor>);

    /// chainable method to mark the resource as not yet existing
    fn with_null_resource(mut self) -> Self {
        self.set_null_resource();
        self
    }

    /// chainable method to set the current entity tag and return self
    fn with_current_etag(mut self, descriptor: impl Into<EntityTagDescriptor>) -> Self {
        self.set_current_etag(descriptor);
        self
    }

    /// chainable method to set the current modification time and return self
    fn with_current_modification(mut self, descriptor: impl Into<ModificationDescriptor>) -> Self {
        self.set_current_modification(descriptor);
        self
    }
}

impl ConditionalConnExt for Conn {
    fn has_querystring(&self) -> bool {
        !self.querystring().is_empty()
    }

    fn is_null_resource(&self) -> bool {
        self.state::<NullResource>().is_some()
    }

    fn set_null_resource(&mut self) {
        self.insert_state(NullResource);
    }

    fn set_current_etag(&mut self, descriptor: impl Into<EntityTagDescriptor>) {
        self.insert_state(descriptor.into());
    }

    fn set_current_modification(&mut self, descriptor: impl Into<ModificationDescriptor>) {
        self.insert_state(descriptor.into());
    }
}
