use crate::{EntityTagDescriptor, ModificationDescriptor};
use std::{fmt::Debug, marker::PhantomData, time::SystemTime};
use trillium::Conn;

/// Looks up the current entity tag of the resource a conn is
/// requesting.
///
/// Returning `None` means "no opinion", and the
/// [`EntityTagValidator`](crate::EntityTagValidator) lets the request
/// proceed. A source is consulted on every validation and again when
/// the response headers are written, so implementations that are
/// expensive should memoize, for example in conn state.
///
/// This is implemented for closures that take a `&Conn`:
///
/// ```
/// use trillium_conditional::{EntityTagDescriptor, EntityTagValidator};
/// let validator = EntityTagValidator::new(|conn: &trillium::Conn| {
///     (conn.path() == "/").then(|| EntityTagDescriptor::strong("v1"))
/// });
/// ```
pub trait EntityTagSource: Send + Sync + 'static {
    /// returns the current entity tag, if it is known
    fn entity_tag(&self, conn: &Conn) -> Option<EntityTagDescriptor>;
}

/// Looks up the current modification time of the resource a conn is
/// requesting. See [`EntityTagSource`] for the lookup contract.
pub trait LastModifiedSource: Send + Sync + 'static {
    /// returns the current modification time, if it is known
    fn last_modified(&self, conn: &Conn) -> Option<ModificationDescriptor>;
}

impl<F> EntityTagSource for F
where
    F: Fn(&Conn) -> Option<EntityTagDescriptor> + Send + Sync + 'static,
{
    fn entity_tag(&self, conn: &Conn) -> Option<EntityTagDescriptor> {
        self(conn)
    }
}

impl<F> LastModifiedSource for F
where
    F: Fn(&Conn) -> Option<ModificationDescriptor> + Send + Sync + 'static,
{
    fn last_modified(&self, conn: &Conn) -> Option<ModificationDescriptor> {
        self(conn)
    }
}

/**
A source that reads descriptors that an earlier handler stored in conn
state, usually through
[`ConditionalConnExt`](crate::ConditionalConnExt).

This is the default source for both validators.
*/
#[derive(Debug, Clone, Copy, Default)]
pub struct FromState;

impl EntityTagSource for FromState {
    fn entity_tag(&self, conn: &Conn) -> Option<EntityTagDescriptor> {
        conn.state::<EntityTagDescriptor>().cloned()
    }
}

impl LastModifiedSource for FromState {
    fn last_modified(&self, conn: &Conn) -> Option<ModificationDescriptor> {
        conn.state::<ModificationDescriptor>().copied()
    }
}

/// An application resource that can describe its own freshness.
///
/// Both methods default to `None`, so a type only needs to provide the
/// metadata it actually tracks.
pub trait Resource: Send + Sync + 'static {
    /// the current entity tag of this resource
    fn entity_tag(&self) -> Option<EntityTagDescriptor> {
        None
    }

    /// the time this resource last changed
    fn last_modified(&self) -> Option<SystemTime> {
        None
    }
}

/**
A source that reads a [`Resource`] of type `T` from conn state and asks
it for its metadata.

```
use std::time::SystemTime;
use trillium_conditional::{FromResource, ModificationValidator, Resource};

struct Document {
    updated_at: SystemTime,
}

impl Resource for Document {
    fn last_modified(&self) -> Option<SystemTime> {
        Some(self.updated_at)
    }
}

let validator = ModificationValidator::new(FromResource::<Document>::new());
```
*/
pub struct FromResource<T>(PhantomData<fn() -> T>);

impl<T> FromResource<T> {
    /// constructs a new FromResource source
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for FromResource<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for FromResource<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Copy for FromResource<T> {}

impl<T> Debug for FromResource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FromResource")
            .field(&std::any::type_name::<T>())
            .finish()
    }
}

impl<T: Resource> EntityTagSource for FromResource<T> {
    fn entity_tag(&self, conn: &Conn) -> Option<EntityTagDescriptor> {
        conn.state::<T>().and_then(Resource::entity_tag)
    }
}

impl<T: Resource> LastModifiedSource for FromResource<T> {
    fn last_modified(&self, conn: &Conn) -> Option<ModificationDescriptor> {
        conn.state::<T>()
            .and_then(Resource::last_modified)
            .map(ModificationDescriptor::from)
    }
}

/// A marker placed in conn state when the requested resource does not
/// exist yet, such as the target of a `PUT` that would create it.
///
/// A wildcard `If-Match: *` does not match a null resource and a
/// wildcard `If-None-Match: *` does not fail for one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NullResource;
