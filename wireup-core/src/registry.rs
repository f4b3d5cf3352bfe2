// Service registry: name-keyed lookup with real and mock resolution modes

use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::factory::{Injectable, Instance, Services, ValueFactory, create_value, init_factories};
use crate::mock::MockFn;
use crate::mock_factory::{MockCtor, MockFactory};
use crate::mocker::Mocked;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::{debug, trace, warn};

struct RegistryInner {
    config: RegistryConfig,
    factories: BTreeMap<String, ValueFactory>,
}

impl RegistryInner {
    fn new(config: RegistryConfig, services: Services) -> Self {
        let factories = init_factories(services);
        debug!(
            registry = %config.name,
            services = factories.len(),
            mocking = config.allow_mocking,
            "Registry created"
        );
        Self { config, factories }
    }

    fn factory(&self, name: &str) -> Result<&ValueFactory> {
        self.factories.get(name).ok_or_else(|| {
            debug!(registry = %self.config.name, service = name, "Service not registered");
            Error::ServiceNotFound(name.to_string())
        })
    }

    fn typed_factory<T: Injectable>(&self, name: &str) -> Result<&ValueFactory> {
        let factory = self.factory(name)?;
        if !factory.produces::<T>() {
            return Err(Error::TypeMismatch {
                service: name.to_string(),
                expected: std::any::type_name::<T>(),
                actual: factory.type_name(),
            });
        }
        Ok(factory)
    }

    fn resolve<T: Injectable>(&self, name: &str) -> Result<T> {
        let factory = self.typed_factory::<T>(name)?;
        let value = downcast(factory, create_value(factory))?;

        trace!(
            registry = %self.config.name,
            service = name,
            mocked = factory.is_mocked(),
            "Service resolved"
        );
        Ok(value)
    }

    fn resolve_mocked<T: Injectable>(&self, name: &str, ctor: MockCtor) -> Result<Mocked<T>> {
        let factory = self.typed_factory::<T>(name)?;

        if !self.config.allow_mocking {
            warn!(registry = %self.config.name, service = name, "Mock request refused");
            return Err(Error::MockingDisabled {
                registry: self.config.name.clone(),
                service: name.to_string(),
            });
        }

        let mocks = MockFactory::from_ctor(ctor);
        factory.set_mock_factory(mocks.clone());
        debug!(registry = %self.config.name, service = name, "Mock factory attached");

        let value = downcast(factory, create_value(factory))?;
        Ok(Mocked::new(name, value, mocks))
    }
}

fn downcast<T: Injectable>(factory: &ValueFactory, value: Instance) -> Result<T> {
    value
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| Error::TypeMismatch {
            service: factory.name().to_string(),
            expected: std::any::type_name::<T>(),
            actual: factory.type_name(),
        })
}

/// A set of named services resolved lazily, with optional mock substitution.
///
/// Cloning is cheap and every clone sees the same value factories.
///
/// ```
/// use serde_json::json;
/// use std::sync::Arc;
/// use wireup_core::{MockFn, Object, Registry, RegistryConfig, Reply, Services, singleton};
///
/// let registry = Registry::with_config(
///     Services::new().service(
///         "Counter",
///         singleton(|| {
///             Arc::new(Object::new().with_method("inc", |_, _| Ok(Reply::default())))
///         }),
///     ),
///     RegistryConfig::for_tests(),
/// );
///
/// let counter = registry.resolve_mocked::<Arc<Object>, _>("Counter", MockFn::new).unwrap();
/// counter.mock("inc").unwrap().mock_return_value(json!(5));
/// assert_eq!(counter.call("inc", &[]).unwrap(), json!(5));
/// ```
#[derive(Clone)]
pub struct Registry {
    inner: Arc<RegistryInner>,
}

impl Registry {
    /// Build a registry with default configuration (mocking disabled).
    pub fn provide(services: Services) -> Self {
        Self::with_config(services, RegistryConfig::default())
    }

    pub fn with_config(services: Services, config: RegistryConfig) -> Self {
        Self {
            inner: Arc::new(RegistryInner::new(config, services)),
        }
    }

    /// Build a registry whose factories resolve their own dependencies
    /// through the [`Injector`] handed to `build`.
    ///
    /// Factories must not run inside `build`; the injector only becomes live
    /// once the registry exists.
    pub fn provide_cyclic<F>(config: RegistryConfig, build: F) -> Self
    where
        F: FnOnce(&Injector) -> Services,
    {
        let inner = Arc::new_cyclic(|weak| {
            let injector = Injector {
                inner: Weak::clone(weak),
            };
            RegistryInner::new(config, build(&injector))
        });
        Self { inner }
    }

    /// Real mode: construct or reuse the service and return it as-is.
    pub fn resolve<T: Injectable>(&self, name: &str) -> Result<T> {
        self.inner.resolve(name)
    }

    /// Mock mode: attach a fresh mock factory to the service, replacing any
    /// earlier one, and return the structurally mocked value.
    pub fn resolve_mocked<T, C>(&self, name: &str, ctor: C) -> Result<Mocked<T>>
    where
        T: Injectable,
        C: Fn() -> MockFn + Send + Sync + 'static,
    {
        self.inner.resolve_mocked(name, Arc::new(ctor))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.factories.contains_key(name)
    }

    /// Registered service names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.inner.factories.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.factories.is_empty()
    }

    /// Whether mock mode has been requested for `name`.
    pub fn is_mocked(&self, name: &str) -> Result<bool> {
        Ok(self.inner.factory(name)?.is_mocked())
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    /// A weak lookup handle onto this registry.
    pub fn injector(&self) -> Injector {
        Injector {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.inner.config)
            .field("factories", &self.inner.factories.values().collect::<Vec<_>>())
            .finish()
    }
}

/// Weak lookup handle used inside service factories.
#[derive(Clone)]
pub struct Injector {
    inner: Weak<RegistryInner>,
}

impl Injector {
    fn upgrade(&self) -> Result<Arc<RegistryInner>> {
        self.inner.upgrade().ok_or(Error::RegistryDropped)
    }

    pub fn resolve<T: Injectable>(&self, name: &str) -> Result<T> {
        self.upgrade()?.resolve(name)
    }

    pub fn resolve_mocked<T, C>(&self, name: &str, ctor: C) -> Result<Mocked<T>>
    where
        T: Injectable,
        C: Fn() -> MockFn + Send + Sync + 'static,
    {
        self.upgrade()?.resolve_mocked(name, Arc::new(ctor))
    }

    pub fn is_live(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl fmt::Debug for Injector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Injector")
            .field("live", &self.is_live())
            .finish()
    }
}
