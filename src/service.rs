//! Service-layer contract and the caching decorator over it.
//!
//! [`ResourceService`] is the operation set of a per-type data-access
//! service: read by id, create, full update, partial update and delete.
//! [`Cached`] implements the same trait over any service and routes every
//! call through a [`CachingInterceptor`], so callers swap a plain service for
//! a cached one without changing call sites.
//!
//! Operations outside the five (attaching a related entity, say) go through
//! [`Cached::mutate_with`], which gives them the mutate behaviour.
//!
//! ```
//! use std::collections::HashMap;
//! use std::num::NonZeroUsize;
//!
//! use house_cache::builder::{CacheFactory, CachePolicy};
//! use house_cache::service::{Cached, ResourceService};
//! use house_cache::traits::Identified;
//! use parking_lot::Mutex;
//!
//! #[derive(Clone)]
//! struct Person {
//!     id: u32,
//!     name: String,
//! }
//!
//! impl Identified<u32> for Person {
//!     fn id(&self) -> u32 {
//!         self.id
//!     }
//! }
//!
//! #[derive(Default)]
//! struct People(Mutex<HashMap<u32, Person>>);
//!
//! impl ResourceService for People {
//!     type Id = u32;
//!     type Snapshot = Person;
//!     type Input = Person;
//!     type Changes = String;
//!     type Error = &'static str;
//!
//!     fn get(&self, id: &u32) -> Result<Person, Self::Error> {
//!         self.0.lock().get(id).cloned().ok_or("not found")
//!     }
//!
//!     fn create(&self, input: Person) -> Result<Person, Self::Error> {
//!         self.0.lock().insert(input.id, input.clone());
//!         Ok(input)
//!     }
//!
//!     fn update(&self, id: &u32, name: String) -> Result<Person, Self::Error> {
//!         let mut people = self.0.lock();
//!         let person = people.get_mut(id).ok_or("not found")?;
//!         person.name = name;
//!         Ok(person.clone())
//!     }
//!
//!     fn patch(&self, id: &u32, name: String) -> Result<Person, Self::Error> {
//!         self.update(id, name)
//!     }
//!
//!     fn delete(&self, id: &u32) -> Result<(), Self::Error> {
//!         self.0.lock().remove(id).map(|_| ()).ok_or("not found")
//!     }
//! }
//!
//! let factory = CacheFactory::new(NonZeroUsize::new(8).unwrap(), CachePolicy::Lru);
//! let people = Cached::new("person", People::default(), &factory);
//!
//! people.create(Person { id: 1, name: "Ada".into() }).unwrap();
//! people.update(&1, "Grace".into()).unwrap();
//! assert_eq!(people.get(&1).unwrap().name, "Grace");
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use crate::builder::CacheFactory;
use crate::interceptor::CachingInterceptor;
use crate::traits::Identified;

/// Operation contract of a per-type data-access service.
pub trait ResourceService {
    type Id: Eq + Hash + Clone + fmt::Debug;
    /// Immutable value returned by every state-producing operation.
    type Snapshot: Identified<Self::Id>;
    type Input;
    type Changes;
    type Error;

    fn get(&self, id: &Self::Id) -> Result<Self::Snapshot, Self::Error>;

    /// Creates a resource; the returned snapshot carries the assigned id.
    fn create(&self, input: Self::Input) -> Result<Self::Snapshot, Self::Error>;

    /// Replaces the resource's mutable fields.
    fn update(&self, id: &Self::Id, changes: Self::Changes) -> Result<Self::Snapshot, Self::Error>;

    /// Applies only the fields present in `changes`.
    fn patch(&self, id: &Self::Id, changes: Self::Changes) -> Result<Self::Snapshot, Self::Error>;

    fn delete(&self, id: &Self::Id) -> Result<(), Self::Error>;
}

/// A [`ResourceService`] whose results are cached per resource type.
pub struct Cached<S>
where
    S: ResourceService,
{
    inner: S,
    interceptor: CachingInterceptor<S::Id, S::Snapshot>,
}

impl<S> Cached<S>
where
    S: ResourceService,
{
    /// Decorates `inner` with a fresh cache built by `factory`.
    pub fn new(resource: &'static str, inner: S, factory: &CacheFactory) -> Self {
        Self {
            inner,
            interceptor: CachingInterceptor::from_factory(resource, factory),
        }
    }

    /// Runs an extra state-changing operation with mutate semantics: the
    /// cached entry for `id` is replaced by the snapshot `op` returns.
    pub fn mutate_with<F>(&self, id: &S::Id, op: F) -> Result<Arc<S::Snapshot>, S::Error>
    where
        F: FnOnce(&S, &S::Id) -> Result<S::Snapshot, S::Error>,
    {
        self.interceptor.mutate(id, |id| op(&self.inner, id))
    }

    /// The undecorated service. Calls made through it bypass the cache.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn interceptor(&self) -> &CachingInterceptor<S::Id, S::Snapshot> {
        &self.interceptor
    }
}

impl<S> ResourceService for Cached<S>
where
    S: ResourceService,
{
    type Id = S::Id;
    type Snapshot = Arc<S::Snapshot>;
    type Input = S::Input;
    type Changes = S::Changes;
    type Error = S::Error;

    fn get(&self, id: &S::Id) -> Result<Self::Snapshot, S::Error> {
        self.interceptor.read(id, |id| self.inner.get(id))
    }

    fn create(&self, input: S::Input) -> Result<Self::Snapshot, S::Error> {
        self.interceptor.create(|| self.inner.create(input))
    }

    fn update(&self, id: &S::Id, changes: S::Changes) -> Result<Self::Snapshot, S::Error> {
        self.interceptor.mutate(id, |id| self.inner.update(id, changes))
    }

    fn patch(&self, id: &S::Id, changes: S::Changes) -> Result<Self::Snapshot, S::Error> {
        self.interceptor.mutate(id, |id| self.inner.patch(id, changes))
    }

    fn delete(&self, id: &S::Id) -> Result<(), S::Error> {
        self.interceptor.delete(id, |id| self.inner.delete(id))
    }
}

impl<S> fmt::Debug for Cached<S>
where
    S: ResourceService + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cached")
            .field("inner", &self.inner)
            .field("interceptor", &self.interceptor)
            .finish()
    }
}
