// Singleton combinators

use crate::error::Result;
use crate::object::{Object, Reply};
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tracing::trace;

/// Wrap `factory` so its value is built at most once and cloned out on
/// every later call.
///
/// For `Arc` values the clones share identity, which is what lets mock mode
/// rewrite the one live instance in place.
pub fn singleton<T, F>(factory: F) -> impl Fn() -> T + Send + Sync + 'static
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> T + Send + Sync + 'static,
{
    let cell = OnceLock::new();
    move || {
        cell.get_or_init(|| {
            trace!(value = std::any::type_name::<T>(), "Constructing singleton");
            factory()
        })
        .clone()
    }
}

/// A singleton service exposing one callable member, `get`, that delegates
/// to `f`. Lets a free function be injected and mocked like any service.
pub fn getter<F>(f: F) -> impl Fn() -> Arc<Object> + Send + Sync + 'static
where
    F: Fn(&[Value]) -> Result<Reply> + Send + Sync + 'static,
{
    let f = Arc::new(f);
    singleton(move || {
        let f = Arc::clone(&f);
        Arc::new(Object::new().with_method("get", move |_, args| f(args)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_builds_once() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let make = singleton(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(Object::new())
        });

        let a = make();
        let b = make();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_value_is_cached() {
        let built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&built);
        let make = singleton(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            0u32
        });

        assert_eq!(make(), 0);
        assert_eq!(make(), 0);
        assert_eq!(built.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_getter_delegates() {
        let make = getter(|args| {
            let name = args.first().and_then(Value::as_str).unwrap_or_default();
            Ok(Reply::Resolve(json!({ "name": name })))
        });

        let service = make();
        assert!(Arc::ptr_eq(&service, &make()));
        let bucket = tokio_test::block_on(service.call_async("get", &[json!("b1")])).unwrap();
        assert_eq!(bucket, json!({"name": "b1"}));
    }
}
