// Value factories: service constructors carrying an optional mock factory slot

use crate::mock_factory::MockFactory;
use crate::mocker::mock_object;
use crate::object::{Object, Structural};
use futures_util::future::Shared;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::{trace, warn};

/// A constructed service value with its type erased.
pub type Instance = Box<dyn Any + Send + Sync>;

/// Anything a service factory may produce.
///
/// Values that report a structure can be mocked; the rest pass through mock
/// mode untouched.
pub trait Injectable: Any + Send + Sync {
    fn as_structural(&self) -> Option<&dyn Structural> {
        None
    }
}

macro_rules! opaque_injectable {
    ($($ty:ty),* $(,)?) => {
        $(impl Injectable for $ty {})*
    };
}

opaque_injectable!(
    (),
    bool,
    char,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    f32,
    f64,
    String,
    &'static str,
    serde_json::Value,
);

impl Injectable for Object {
    fn as_structural(&self) -> Option<&dyn Structural> {
        Some(self)
    }
}

impl<T: Structural + ?Sized + 'static> Injectable for Arc<T> {
    fn as_structural(&self) -> Option<&dyn Structural> {
        Some(self)
    }
}

// Pending construction is carried as the value itself and never awaited here.
impl<F> Injectable for Shared<F>
where
    F: Future + Send + 'static,
    F::Output: Clone + Send + Sync + 'static,
{
}

fn structure_of<'a, T: Injectable>(
    value: &'a (dyn Any + Send + Sync + 'static),
) -> Option<&'a dyn Structural> {
    value.downcast_ref::<T>().and_then(Injectable::as_structural)
}

/// A raw, type-erased service constructor.
pub struct ServiceDefinition {
    construct: Box<dyn Fn() -> Instance + Send + Sync>,
    structure: for<'a> fn(&'a (dyn Any + Send + Sync + 'static)) -> Option<&'a dyn Structural>,
    type_id: TypeId,
    type_name: &'static str,
}

impl ServiceDefinition {
    pub fn new<T, F>(factory: F) -> Self
    where
        T: Injectable,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            construct: Box::new(move || Box::new(factory()) as Instance),
            structure: structure_of::<T>,
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for ServiceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDefinition")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Mapping of service name to constructor, handed to the registry once.
#[derive(Debug, Default)]
pub struct Services {
    definitions: BTreeMap<String, ServiceDefinition>,
}

impl Services {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `factory` under `name`. A repeated name replaces the earlier entry.
    pub fn service<T, F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        T: Injectable,
        F: Fn() -> T + Send + Sync + 'static,
    {
        let name = name.into();
        let definition = ServiceDefinition::new(factory);
        trace!(service = %name, produces = definition.type_name(), "Service defined");

        if self.definitions.insert(name.clone(), definition).is_some() {
            warn!(service = %name, "Service redefined; earlier factory replaced");
        }
        self
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }
}

/// A service constructor plus its mock factory slot.
pub struct ValueFactory {
    name: String,
    definition: ServiceDefinition,
    mock_factory: RwLock<Option<MockFactory>>,
}

impl ValueFactory {
    fn new(name: String, definition: ServiceDefinition) -> Self {
        Self {
            name,
            definition,
            mock_factory: RwLock::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &'static str {
        self.definition.type_name
    }

    /// Whether the constructor's product is a `T`.
    pub fn produces<T: Any>(&self) -> bool {
        self.definition.type_id == TypeId::of::<T>()
    }

    /// The attached mock factory, if mock mode was requested.
    pub fn mock_factory(&self) -> Option<MockFactory> {
        self.mock_factory.read().clone()
    }

    /// Attach `factory`, replacing any earlier one.
    pub fn set_mock_factory(&self, factory: MockFactory) {
        let previous = self.mock_factory.write().replace(factory);
        if previous.is_some() {
            trace!(service = %self.name, "Mock factory replaced");
        }
    }

    pub fn is_mocked(&self) -> bool {
        self.mock_factory.read().is_some()
    }

    fn construct(&self) -> Instance {
        (self.definition.construct)()
    }

    fn structure<'a>(
        &self,
        value: &'a (dyn Any + Send + Sync + 'static),
    ) -> Option<&'a dyn Structural> {
        (self.definition.structure)(value)
    }
}

impl fmt::Debug for ValueFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueFactory")
            .field("name", &self.name)
            .field("type_name", &self.type_name())
            .field("mocked", &self.is_mocked())
            .finish()
    }
}

/// Wrap each service definition with an empty mock factory slot.
pub fn init_factories(services: Services) -> BTreeMap<String, ValueFactory> {
    services
        .definitions
        .into_iter()
        .map(|(name, definition)| (name.clone(), ValueFactory::new(name, definition)))
        .collect()
}

/// Build a value; when a mock factory is attached and the value has
/// structure, mock it in place before handing it back.
pub fn create_value(factory: &ValueFactory) -> Instance {
    let value = factory.construct();

    let Some(structure) = factory.structure(&*value) else {
        trace!(service = factory.name(), "Opaque value; returned as-is");
        return value;
    };

    if let Some(mock_factory) = factory.mock_factory() {
        mock_object(structure, &mock_factory);
    }

    value
}
