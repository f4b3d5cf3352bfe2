//! Testing utilities for wireup.
//!
//! ## Features
//!
//! - 🧪 **TestRegistry** - Registry with mock mode enabled
//! - 🎭 **Dummy Objects** - Fully mocked stand-ins for collaborators
//! - ✅ **Assertions** - Call assertions on mock handles
//!
//! ## Quick Start
//!
//! ```
//! use serde_json::json;
//! use std::sync::Arc;
//! use wireup_core::{Object, Reply, Services, singleton};
//! use wireup_testing::*;
//!
//! let registry = TestRegistry::new(Services::new().service(
//!     "Mailer",
//!     singleton(|| Arc::new(Object::new().with_method("send", |_, _| Ok(Reply::default())))),
//! ));
//!
//! let mailer = registry.mock::<Arc<Object>>("Mailer").unwrap();
//! let send = mailer.mock("send").unwrap();
//! send.mock_resolved_value(json!({ "id": "m1" }));
//!
//! // Code under test resolves the same live instance.
//! let live = registry.resolve::<Arc<Object>>("Mailer").unwrap();
//! live.call("send", &[json!("hello")]).unwrap();
//!
//! assert_called_times(&send, 1);
//! assert_last_called_with(&send, &[json!("hello")]);
//! ```
//!
//! ## Dummy Objects
//!
//! ```
//! use serde_json::json;
//! use wireup_core::init_functions_factory;
//! use wireup_testing::*;
//!
//! let file_shape = init_functions_factory(["getMetadata", "delete"]);
//! let file = dummy_object(|| file_shape.build_empty());
//!
//! file.mock("getMetadata").unwrap().mock_return_value(json!({ "size": 3 }));
//! assert_eq!(file.call("getMetadata", &[]).unwrap(), json!({ "size": 3 }));
//! assert_not_called(&file.mock("delete").unwrap());
//! ```

mod assertions;
mod test_registry;

pub use assertions::{
    assert_called, assert_called_times, assert_called_with, assert_last_called_with,
    assert_not_called, assert_nth_called_with,
};
pub use test_registry::{TestRegistry, dummy_object, dummy_objects};
