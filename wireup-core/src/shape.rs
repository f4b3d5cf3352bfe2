// Capability-shaped surrogates and fully mocked dummy objects

use crate::error::Error;
use crate::mock_factory::MockFactory;
use crate::mocker::{Mocked, mock_object};
use crate::object::{Object, Structural, is_protocol_member, method};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Fills in required methods that a partial object lacks.
///
/// Each missing method is replaced by a stub failing with
/// [`Error::Unimplemented`] when called, so a surrogate for an external
/// collaborator only needs the members a test actually exercises.
#[derive(Debug, Clone)]
pub struct FunctionsFactory {
    required: Arc<[String]>,
}

impl FunctionsFactory {
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Complete `partial` in place and return it.
    pub fn apply<'a>(&self, partial: &'a Object) -> &'a Object {
        for name in self.required.iter() {
            // Protocol members are always present on an object.
            if partial.has(name) || is_protocol_member(name) {
                continue;
            }

            trace!(member = %name, "Stubbing unimplemented member");
            let missing = name.clone();
            partial.set_method(
                name.clone(),
                method(move |_, _| Err(Error::Unimplemented(missing.clone()))),
            );
        }
        partial
    }

    /// Complete `partial` and hand it back by value.
    pub fn build(&self, partial: Object) -> Object {
        self.apply(&partial);
        partial
    }

    /// Complete an empty object.
    pub fn build_empty(&self) -> Object {
        self.build(Object::new())
    }
}

/// Declare the methods a capability shape must provide.
pub fn init_functions_factory<I, S>(required: I) -> FunctionsFactory
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    FunctionsFactory {
        required: required.into_iter().map(Into::into).collect(),
    }
}

/// Builds objects and mocks them immediately, each with its own mock factory.
#[derive(Clone)]
pub struct DummyObjects {
    mock_factory: Arc<dyn Fn() -> MockFactory + Send + Sync>,
}

impl DummyObjects {
    /// Construct via `factory` and run the structural mocker over the result.
    pub fn create<T, F>(&self, factory: F) -> Mocked<T>
    where
        T: Structural,
        F: FnOnce() -> T,
    {
        let mocks = (self.mock_factory)();
        let value = factory();
        mock_object(&value, &mocks);
        Mocked::new(std::any::type_name::<T>(), value, mocks)
    }
}

impl fmt::Debug for DummyObjects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyObjects").finish_non_exhaustive()
    }
}

/// Bind a mock-factory constructor for building dummy objects.
pub fn dummy_object_factory<F>(mock_factory: F) -> DummyObjects
where
    F: Fn() -> MockFactory + Send + Sync + 'static,
{
    DummyObjects {
        mock_factory: Arc::new(mock_factory),
    }
}
