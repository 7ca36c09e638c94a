//! The shared action registry.
//!
//! [`ActionRegistry`] maps each `(method, path pattern)` key to the
//! descriptor of the action serving it and a weak handle to the action
//! itself. A single lock guards the route map, the name index and the
//! generation counter; it is only held for the duration of an update or a
//! copy, never while a caller iterates a [`Snapshot`].
//!
//! The registry is generic over the dispatch handle type so that runtimes
//! can store `Weak<dyn TheirActionTrait>` without this crate knowing about
//! HTTP request handling.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Weak};

use http::Method;
use parking_lot::RwLock;

use crate::descriptor::{normalize_method, ActionDescriptor};
use crate::error::{Error, Result};

/// Opaque id returned by [`ActionRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegistrationId(u64);

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Uniqueness key of a route: exact path pattern plus uppercase method.
///
/// Field order gives the derived ordering "by path, then by method".
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteKey {
    path: String,
    method: String,
}

impl RouteKey {
    /// Build a key; the method is normalized to uppercase.
    #[must_use]
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            path: path.to_string(),
            method: method.trim().to_ascii_uppercase(),
        }
    }

    /// Path pattern of the key.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Uppercase method of the key.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Immutable, ordered copy of the registry contents.
///
/// Actions are ordered lexicographically by path pattern, then by method,
/// then by name. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct Snapshot {
    generation: u64,
    actions: Arc<[Arc<ActionDescriptor>]>,
}

impl Snapshot {
    /// Build a snapshot from descriptors, applying the canonical order.
    ///
    /// No uniqueness check is made; registries produce unique snapshots,
    /// hand-built ones may not.
    #[must_use]
    pub fn new(generation: u64, actions: impl IntoIterator<Item = ActionDescriptor>) -> Self {
        Self::from_shared(generation, actions.into_iter().map(Arc::new).collect())
    }

    fn from_shared(generation: u64, mut actions: Vec<Arc<ActionDescriptor>>) -> Self {
        actions.sort_by(|a, b| snapshot_order(a).cmp(&snapshot_order(b)));
        Self {
            generation,
            actions: actions.into(),
        }
    }

    /// Registry generation the copy was taken at.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Descriptors in canonical order.
    #[must_use]
    pub fn actions(&self) -> &[Arc<ActionDescriptor>] {
        &self.actions
    }

    /// Number of actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the snapshot holds no actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

fn snapshot_order(d: &ActionDescriptor) -> (&str, &str, &str) {
    let first_method = d.methods().first().map_or("", Method::as_str);
    (d.path().as_str(), first_method, d.name())
}

/// A request matched to a live action.
#[derive(Debug)]
pub struct Resolved<H: ?Sized> {
    /// Registration the route belongs to.
    pub id: RegistrationId,
    /// Descriptor of the matched action.
    pub descriptor: Arc<ActionDescriptor>,
    /// Upgraded dispatch handle.
    pub handle: Arc<H>,
    /// Values captured from the path placeholders.
    pub params: BTreeMap<String, String>,
}

/// Outcome of [`ActionRegistry::resolve`].
#[derive(Debug)]
pub enum Resolution<H: ?Sized> {
    /// A live action serves the request.
    Found(Resolved<H>),
    /// The route is registered but its handler has been dropped.
    Gone(Arc<ActionDescriptor>),
    /// The path matches, but not for this method.
    MethodNotAllowed(Vec<Method>),
    /// Nothing matches the path.
    NoRoute,
}

/// Registration capability handed to action modules.
///
/// Modules that want to be discoverable call [`register`](Self::register)
/// at initialization and [`unregister`](Self::unregister) at teardown.
pub trait Registrable<H: ?Sized> {
    /// Register `descriptor`, dispatching to `handle`.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::DuplicateKey`] or [`Error::DuplicateName`] when
    /// the registration collides with an existing one.
    fn register(&self, descriptor: ActionDescriptor, handle: Weak<H>) -> Result<RegistrationId>;

    /// Remove a registration.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::NotFound`] when `id` is unknown.
    fn unregister(&self, id: RegistrationId) -> Result<()>;
}

/// Read access needed to document the registry.
pub trait SnapshotSource: Send + Sync {
    /// Current mutation epoch.
    fn current_generation(&self) -> u64;

    /// Ordered copy of the current contents.
    fn snapshot(&self) -> Snapshot;
}

struct Entry<H: ?Sized> {
    descriptor: Arc<ActionDescriptor>,
    handle: Weak<H>,
}

struct Inner<H: ?Sized> {
    routes: BTreeMap<RouteKey, RegistrationId>,
    entries: HashMap<RegistrationId, Entry<H>>,
    names: HashMap<String, RegistrationId>,
    next_id: u64,
    generation: u64,
}

/// Directory of installed actions, keyed by `(method, path pattern)`.
///
/// Construct one per server and share it via [`Arc`] with everything that
/// registers into it or reads from it.
pub struct ActionRegistry<H: ?Sized> {
    inner: RwLock<Inner<H>>,
}

impl<H: ?Sized> Default for ActionRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ?Sized> fmt::Debug for ActionRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("ActionRegistry")
            .field("routes", &inner.routes.keys().collect::<Vec<_>>())
            .field("generation", &inner.generation)
            .finish()
    }
}

impl<H: ?Sized> ActionRegistry<H> {
    /// Create an empty registry at generation 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                routes: BTreeMap::new(),
                entries: HashMap::new(),
                names: HashMap::new(),
                next_id: 1,
                generation: 0,
            }),
        }
    }

    /// Register `descriptor` under every one of its methods.
    ///
    /// All-or-nothing: if any key or the name collides, nothing is inserted
    /// and the generation is unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::DuplicateKey`] on a `(method, path)` collision,
    /// [`Error::DuplicateName`] on a name collision.
    pub fn register(&self, descriptor: ActionDescriptor, handle: Weak<H>) -> Result<RegistrationId> {
        let keys: Vec<RouteKey> = descriptor
            .methods()
            .iter()
            .map(|m| RouteKey::new(m.as_str(), descriptor.path().as_str()))
            .collect();

        let mut inner = self.inner.write();

        for key in &keys {
            if let Some(existing) = inner.routes.get(key) {
                let existing = inner
                    .entries
                    .get(existing)
                    .map(|e| e.descriptor.name().to_string())
                    .unwrap_or_default();
                return Err(Error::DuplicateKey {
                    method: key.method.clone(),
                    path: key.path.clone(),
                    existing,
                });
            }
        }
        if inner.names.contains_key(descriptor.name()) {
            return Err(Error::DuplicateName {
                name: descriptor.name().to_string(),
            });
        }

        let id = RegistrationId(inner.next_id);
        inner.next_id += 1;
        for key in keys {
            inner.routes.insert(key, id);
        }
        inner.names.insert(descriptor.name().to_string(), id);
        let name = descriptor.name().to_string();
        inner.entries.insert(
            id,
            Entry {
                descriptor: Arc::new(descriptor),
                handle,
            },
        );
        inner.generation += 1;
        let generation = inner.generation;
        drop(inner);

        tracing::debug!(action = %name, %id, generation, "registered action");
        Ok(id)
    }

    /// Remove every route of a registration.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when `id` is unknown; the registry is untouched.
    pub fn unregister(&self, id: RegistrationId) -> Result<()> {
        let mut inner = self.inner.write();
        let Some(entry) = inner.entries.remove(&id) else {
            drop(inner);
            tracing::debug!(%id, "unregister of unknown registration");
            return Err(Error::NotFound { id });
        };
        inner.routes.retain(|_, owner| *owner != id);
        inner.names.remove(entry.descriptor.name());
        inner.generation += 1;
        let generation = inner.generation;
        drop(inner);

        tracing::debug!(action = %entry.descriptor.name(), %id, generation, "unregistered action");
        Ok(())
    }

    /// Ordered copy of the registered descriptors.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let (generation, actions) = {
            let inner = self.inner.read();
            let actions: Vec<Arc<ActionDescriptor>> = inner
                .entries
                .values()
                .map(|e| Arc::clone(&e.descriptor))
                .collect();
            (inner.generation, actions)
        };
        Snapshot::from_shared(generation, actions)
    }

    /// Current mutation epoch; starts at 0 and grows by one per mutation.
    #[must_use]
    pub fn current_generation(&self) -> u64 {
        self.inner.read().generation
    }

    /// Descriptor registered under the exact `(method, path pattern)` key.
    #[must_use]
    pub fn lookup(&self, method: &str, path: &str) -> Option<Arc<ActionDescriptor>> {
        let key = RouteKey::new(method, path);
        let inner = self.inner.read();
        let id = inner.routes.get(&key)?;
        inner.entries.get(id).map(|e| Arc::clone(&e.descriptor))
    }

    /// Number of registrations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().entries.is_empty()
    }

    /// Match a concrete request against the registered patterns.
    ///
    /// When several patterns match, the one with the most literal segments
    /// wins; remaining ties go to the lexicographically smallest pattern.
    /// `HEAD` falls back to the `GET` route when no `HEAD` route matches.
    #[must_use]
    pub fn resolve(&self, method: &str, request_path: &str) -> Resolution<H> {
        let Some(method) = normalize_method(method) else {
            return Resolution::NoRoute;
        };
        let head = method == Method::HEAD;

        let inner = self.inner.read();
        let mut best: Option<(usize, &RegistrationId, BTreeMap<String, String>)> = None;
        let mut get_fallback: Option<(usize, &RegistrationId, BTreeMap<String, String>)> = None;
        let mut allowed: Vec<Method> = Vec::new();

        for (key, id) in &inner.routes {
            let Some(entry) = inner.entries.get(id) else {
                continue;
            };
            let Some(params) = entry.descriptor.path().captures(request_path) else {
                continue;
            };
            let slot = if key.method == method.as_str() {
                &mut best
            } else if head && key.method == Method::GET.as_str() {
                &mut get_fallback
            } else {
                if let Some(m) = normalize_method(&key.method) {
                    if !allowed.contains(&m) {
                        allowed.push(m);
                    }
                }
                continue;
            };
            let specificity = entry.descriptor.path().specificity();
            if slot.as_ref().is_none_or(|(s, _, _)| specificity > *s) {
                *slot = Some((specificity, id, params));
            }
        }

        let Some((_, id, params)) = best.or(get_fallback) else {
            if allowed.is_empty() {
                return Resolution::NoRoute;
            }
            allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
            return Resolution::MethodNotAllowed(allowed);
        };

        let id = *id;
        let Some(entry) = inner.entries.get(&id) else {
            return Resolution::NoRoute;
        };
        let descriptor = Arc::clone(&entry.descriptor);
        match entry.handle.upgrade() {
            Some(handle) => Resolution::Found(Resolved {
                id,
                descriptor,
                handle,
                params,
            }),
            None => Resolution::Gone(descriptor),
        }
    }
}

impl<H: ?Sized> Registrable<H> for ActionRegistry<H> {
    fn register(&self, descriptor: ActionDescriptor, handle: Weak<H>) -> Result<RegistrationId> {
        ActionRegistry::register(self, descriptor, handle)
    }

    fn unregister(&self, id: RegistrationId) -> Result<()> {
        ActionRegistry::unregister(self, id)
    }
}

impl<H: ?Sized + Send + Sync> SnapshotSource for ActionRegistry<H> {
    fn current_generation(&self) -> u64 {
        ActionRegistry::current_generation(self)
    }

    fn snapshot(&self) -> Snapshot {
        ActionRegistry::snapshot(self)
    }
}
