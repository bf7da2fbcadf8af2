// File: rescue-rules/src/registry.rs
// Purpose: Named predicate table shared by every validator

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::predicates;
use crate::value::{FieldValue, ValueKind};

/// A named boolean check applied to a field value
///
/// `test` returns `Err` only when the parameters themselves are unusable
/// (a range bound that is not a number, a pattern that does not compile).
/// The engine never calls `test` with a value whose kind `accepts` rejects.
pub trait Predicate: Send + Sync {
    /// Value kinds this predicate understands. Empty means any kind.
    fn kinds(&self) -> &[ValueKind] {
        &[]
    }

    fn accepts(&self, kind: ValueKind) -> bool {
        let kinds = self.kinds();
        kinds.is_empty() || kinds.contains(&kind)
    }

    /// Validate parameters once, when a record spec is built
    fn check_params(&self, _params: &[String]) -> Result<(), String> {
        Ok(())
    }

    fn test(&self, value: &FieldValue<'_>, params: &[String]) -> Result<bool, String>;

    /// Evaluate under a validator's configuration
    ///
    /// Predicates whose behavior depends on engine settings read them from
    /// `config` here; everything else falls through to [`Predicate::test`].
    fn test_with_config(
        &self,
        value: &FieldValue<'_>,
        params: &[String],
        _config: &EngineConfig,
    ) -> Result<bool, String> {
        self.test(value, params)
    }
}

/// Adapter that turns a closure into a [`Predicate`]
pub struct FnPredicate<F> {
    kinds: Vec<ValueKind>,
    f: F,
}

impl<F> FnPredicate<F>
where
    F: Fn(&FieldValue<'_>, &[String]) -> bool + Send + Sync,
{
    pub fn new(kinds: &[ValueKind], f: F) -> Self {
        Self {
            kinds: kinds.to_vec(),
            f,
        }
    }
}

impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&FieldValue<'_>, &[String]) -> bool + Send + Sync,
{
    fn kinds(&self) -> &[ValueKind] {
        &self.kinds
    }

    fn test(&self, value: &FieldValue<'_>, params: &[String]) -> Result<bool, String> {
        Ok((self.f)(value, params))
    }
}

/// Describe the kinds a predicate expects, for mismatch errors
pub fn expected_kinds(predicate: &dyn Predicate) -> String {
    let kinds = predicate.kinds();
    if kinds.is_empty() {
        return "any value".to_string();
    }
    kinds
        .iter()
        .map(ValueKind::as_str)
        .collect::<Vec<_>>()
        .join(" or ")
}

/// Process-wide registry with the built-ins installed under default config
static GLOBAL_REGISTRY: Lazy<Arc<Registry>> = Lazy::new(|| {
    let registry = Registry::with_builtins(&EngineConfig::default());
    tracing::debug!("Global predicate registry initialized with {} predicates", registry.len());
    Arc::new(registry)
});

/// Table mapping predicate names to predicates
///
/// Registration replaces any previous predicate under the same name.
/// Lookups take a read lock, so a registry can be shared across threads
/// once startup registration is done.
#[derive(Default)]
pub struct Registry {
    predicates: RwLock<HashMap<String, Arc<dyn Predicate>>>,
}

impl Registry {
    /// An empty registry, without built-ins
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins(config: &EngineConfig) -> Self {
        let registry = Self::new();
        registry.install_builtins(config);
        registry
    }

    /// The shared process-wide registry
    pub fn global() -> Arc<Registry> {
        Arc::clone(&GLOBAL_REGISTRY)
    }

    /// (Re)install the built-in predicates. Running it twice is harmless.
    pub fn install_builtins(&self, config: &EngineConfig) {
        let mut table = self.write();
        for (name, predicate) in predicates::builtins(config) {
            table.insert(name.to_string(), predicate);
        }
    }

    /// Install `predicate` under `name`, returning the one it replaced
    pub fn register<P>(&self, name: impl Into<String>, predicate: P) -> Option<Arc<dyn Predicate>>
    where
        P: Predicate + 'static,
    {
        let name = name.into();
        let previous = self.write().insert(name.clone(), Arc::new(predicate));
        if previous.is_some() {
            tracing::debug!("Replaced predicate '{}'", name);
        } else {
            tracing::trace!("Registered predicate '{}'", name);
        }
        previous
    }

    /// Register a closure accepting the given value kinds (empty = any)
    pub fn register_fn<F>(&self, name: impl Into<String>, kinds: &[ValueKind], f: F)
    where
        F: Fn(&FieldValue<'_>, &[String]) -> bool + Send + Sync + 'static,
    {
        self.register(name, FnPredicate::new(kinds, f));
    }

    pub fn lookup(&self, name: &str) -> EngineResult<Arc<dyn Predicate>> {
        self.read()
            .get(name)
            .cloned()
            .ok_or_else(|| EngineError::unknown_predicate(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Arc<dyn Predicate>>> {
        self.predicates.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Arc<dyn Predicate>>> {
        self.predicates.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("predicates", &self.names())
            .finish()
    }
}
