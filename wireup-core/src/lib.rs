// Core library for wireup
// Lazily constructed named services, singleton combinators, and in-place
// structural test doubles built from each service's declared member table.

pub mod config;
pub mod error;
pub mod factory;
pub mod logging;
pub mod mock;
pub mod mock_factory;
pub mod mocker;
pub mod object;
pub mod registry;
pub mod shape;
pub mod singleton;

pub use config::RegistryConfig;
pub use error::{Error, Result};
pub use factory::{Injectable, Instance, ServiceDefinition, Services, ValueFactory, create_value, init_factories};
pub use mock::{MockFn, MockImpl, MockResult};
pub use mock_factory::{MockCtor, MockFactory, create_mock_factory};
pub use mocker::{Mocked, mock_object};
pub use object::{Class, Method, Object, PROTOCOL_MEMBERS, Reply, Structural, is_protocol_member, method};
pub use registry::{Injector, Registry};
pub use shape::{DummyObjects, FunctionsFactory, dummy_object_factory, init_functions_factory};
pub use singleton::{getter, singleton};

/// Dynamic argument and return currency of callable members.
pub use serde_json::Value;
