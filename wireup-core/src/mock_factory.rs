// Per-object cache of mock handles keyed by member name

use crate::mock::MockFn;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Zero-argument constructor for mock handles.
pub type MockCtor = Arc<dyn Fn() -> MockFn + Send + Sync>;

/// Maps a member name to a mock handle, building each handle once.
///
/// Two factories never share handles, even for identical keys.
#[derive(Clone)]
pub struct MockFactory {
    ctor: MockCtor,
    mocks: Arc<Mutex<HashMap<String, MockFn>>>,
}

impl MockFactory {
    pub fn new<F>(ctor: F) -> Self
    where
        F: Fn() -> MockFn + Send + Sync + 'static,
    {
        Self::from_ctor(Arc::new(ctor))
    }

    pub fn from_ctor(ctor: MockCtor) -> Self {
        Self {
            ctor,
            mocks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Return the handle for `key`, constructing it on first request.
    pub fn get(&self, key: &str) -> MockFn {
        let mut mocks = self.mocks.lock();
        if let Some(handle) = mocks.get(key) {
            return handle.clone();
        }

        trace!(member = key, "Constructing mock handle");
        let handle = (self.ctor)();
        mocks.insert(key.to_string(), handle.clone());
        handle
    }

    /// Return the handle for `key` only if one was already built.
    pub fn peek(&self, key: &str) -> Option<MockFn> {
        self.mocks.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.mocks.lock().contains_key(key)
    }

    /// Keys with a handle, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.mocks.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.mocks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether two factories share the same cache.
    pub fn ptr_eq(a: &MockFactory, b: &MockFactory) -> bool {
        Arc::ptr_eq(&a.mocks, &b.mocks)
    }
}

impl fmt::Debug for MockFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockFactory")
            .field("keys", &self.keys())
            .finish()
    }
}

/// Build a fresh [`MockFactory`] around a handle constructor.
pub fn create_mock_factory<F>(ctor: F) -> MockFactory
where
    F: Fn() -> MockFn + Send + Sync + 'static,
{
    MockFactory::new(ctor)
}
