// Test registry with mocking enabled

use wireup_core::{
    DummyObjects, Injectable, MockFn, Mocked, Registry, RegistryConfig, Result, Services,
    Structural, create_mock_factory, dummy_object_factory,
};

/// Registry wrapper for tests: mock mode is always allowed and every mock
/// request uses plain [`MockFn`] handles.
#[derive(Debug, Clone)]
pub struct TestRegistry {
    registry: Registry,
}

impl TestRegistry {
    /// Create a test registry over `services`
    pub fn new(services: Services) -> Self {
        Self::from_registry(Registry::with_config(services, RegistryConfig::for_tests()))
    }

    /// Wrap an existing registry. Mock requests fail unless it allows mocking.
    pub fn from_registry(registry: Registry) -> Self {
        Self { registry }
    }

    /// Resolve in real mode
    pub fn resolve<T: Injectable>(&self, name: &str) -> Result<T> {
        self.registry.resolve(name)
    }

    /// Resolve in mock mode with fresh default handles
    pub fn mock<T: Injectable>(&self, name: &str) -> Result<Mocked<T>> {
        self.registry.resolve_mocked(name, MockFn::new)
    }

    /// Get the underlying registry
    pub fn inner(&self) -> &Registry {
        &self.registry
    }
}

/// Dummy-object builder using default handles.
pub fn dummy_objects() -> DummyObjects {
    dummy_object_factory(|| create_mock_factory(MockFn::new))
}

/// Build a value and mock every callable member on it.
pub fn dummy_object<T, F>(factory: F) -> Mocked<T>
where
    T: Structural,
    F: FnOnce() -> T,
{
    dummy_objects().create(factory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use wireup_core::{Object, Reply, singleton};

    fn registry() -> TestRegistry {
        TestRegistry::new(Services::new().service(
            "Clock",
            singleton(|| {
                Arc::new(Object::new().with_method("now", |_, _| Ok(json!(1_700_000_000).into())))
            }),
        ))
    }

    #[test]
    fn test_real_resolution() {
        let clock = registry().resolve::<Arc<Object>>("Clock").unwrap();
        assert_eq!(clock.call("now", &[]).unwrap(), json!(1_700_000_000));
    }

    #[test]
    fn test_mock_resolution() {
        let registry = registry();
        let clock = registry.mock::<Arc<Object>>("Clock").unwrap();
        clock.mock("now").unwrap().mock_return_value(json!(0));

        let real = registry.resolve::<Arc<Object>>("Clock").unwrap();
        assert_eq!(real.call("now", &[]).unwrap(), json!(0));
        assert!(registry.inner().is_mocked("Clock").unwrap());
    }

    #[test]
    fn test_wrapped_registry_keeps_its_config() {
        let wrapped = TestRegistry::from_registry(Registry::provide(Services::new()));
        assert!(!wrapped.inner().config().allow_mocking);
    }

    #[test]
    fn test_dummy_object() {
        let file = dummy_object(|| {
            Object::new()
                .with_field("name", json!("a.txt"))
                .with_method("delete", |_, _| Ok(Reply::default()))
        });

        file.mock("delete").unwrap().mock_resolved_value(json!(true));
        let deleted = tokio_test::block_on(file.call_async("delete", &[])).unwrap();
        assert_eq!(deleted, json!(true));
        assert!(file.mock("name").is_err());
    }
}
