// Wireup - a service locator with structural test doubles
//
// Services are registered by name and built lazily. In tests, any service
// can be mocked in place: every callable member of the live instance is
// swapped for a recording, configurable mock handle.

// Re-export core functionality
pub use wireup_core::*;

// Re-export optional crates
#[cfg(feature = "testing")]
pub use wireup_testing;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Class,
        Error,
        Injectable,
        Injector,
        MockFactory,
        MockFn,
        Mocked,
        Object,
        Registry,
        RegistryConfig,
        Reply,
        Services,
        Structural,
        Value,
        dummy_object_factory,
        getter,
        init_functions_factory,
        singleton,
    };
}
