// Mock handles: configurable, inspectable stand-ins for one function

use crate::error::{Error, Result};
use crate::object::Reply;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Delegate implementation run by a mock handle.
pub type MockImpl = Arc<dyn Fn(&[Value]) -> Result<Reply> + Send + Sync>;

#[derive(Clone)]
enum Behavior {
    Reply(Reply),
    Implementation(MockImpl),
}

/// What a single invocation produced.
#[derive(Debug, Clone, PartialEq)]
pub enum MockResult {
    Replied(Reply),
    Failed(String),
}

#[derive(Default)]
struct MockState {
    calls: Vec<Vec<Value>>,
    results: Vec<MockResult>,
    original: Option<MockImpl>,
    base: Option<Behavior>,
    once: VecDeque<Behavior>,
}

/// A callable test double.
///
/// Clones share state, so a handle kept by a test observes every call made
/// through the copy installed on a mocked object.
///
/// ```
/// use serde_json::json;
/// use wireup_core::MockFn;
///
/// let handle = MockFn::new();
/// handle.mock_return_value_once(json!(1));
/// handle.mock_return_value(json!(2));
///
/// assert_eq!(handle.call(&[]).unwrap(), json!(1));
/// assert_eq!(handle.call(&[json!("x")]).unwrap(), json!(2));
/// assert_eq!(handle.call_count(), 2);
/// ```
#[derive(Clone, Default)]
pub struct MockFn {
    state: Arc<Mutex<MockState>>,
}

impl MockFn {
    /// A handle with no behaviour; calls return `Null`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle whose original implementation is `f`. `mock_restore` returns to it.
    pub fn wrapping<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Reply> + Send + Sync + 'static,
    {
        let original: MockImpl = Arc::new(f);
        let state = MockState {
            original: Some(Arc::clone(&original)),
            base: Some(Behavior::Implementation(original)),
            ..MockState::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Whether two handles share the same state.
    pub fn ptr_eq(a: &MockFn, b: &MockFn) -> bool {
        Arc::ptr_eq(&a.state, &b.state)
    }

    /// Record the call and produce the configured reply.
    pub fn invoke(&self, args: &[Value]) -> Result<Reply> {
        let behavior = {
            let mut state = self.state.lock();
            state.calls.push(args.to_vec());
            state.once.pop_front().or_else(|| state.base.clone())
        };

        trace!(args = args.len(), "Mock handle invoked");

        // The lock is released before a delegate runs, so it may re-enter.
        let outcome = match behavior {
            Some(Behavior::Reply(reply)) => Ok(reply),
            Some(Behavior::Implementation(f)) => f(args),
            None => Ok(Reply::default()),
        };

        let recorded = match &outcome {
            Ok(reply) => MockResult::Replied(reply.clone()),
            Err(err) => MockResult::Failed(err.to_string()),
        };
        self.state.lock().results.push(recorded);

        outcome
    }

    /// Invoke and collapse the reply into a value.
    pub fn call(&self, args: &[Value]) -> Result<Value> {
        self.invoke(args)?.into_result()
    }

    /// Invoke and settle the reply.
    pub async fn call_async(&self, args: &[Value]) -> Result<Value> {
        self.invoke(args)?.settle().await
    }

    fn set_base(&self, behavior: Behavior) {
        self.state.lock().base = Some(behavior);
    }

    fn push_once(&self, behavior: Behavior) {
        self.state.lock().once.push_back(behavior);
    }

    pub fn mock_implementation<F>(&self, f: F) -> &Self
    where
        F: Fn(&[Value]) -> Result<Reply> + Send + Sync + 'static,
    {
        self.set_base(Behavior::Implementation(Arc::new(f)));
        self
    }

    pub fn mock_implementation_once<F>(&self, f: F) -> &Self
    where
        F: Fn(&[Value]) -> Result<Reply> + Send + Sync + 'static,
    {
        self.push_once(Behavior::Implementation(Arc::new(f)));
        self
    }

    pub fn mock_return_value(&self, value: Value) -> &Self {
        self.set_base(Behavior::Reply(Reply::Return(value)));
        self
    }

    pub fn mock_return_value_once(&self, value: Value) -> &Self {
        self.push_once(Behavior::Reply(Reply::Return(value)));
        self
    }

    pub fn mock_resolved_value(&self, value: Value) -> &Self {
        self.set_base(Behavior::Reply(Reply::Resolve(value)));
        self
    }

    pub fn mock_resolved_value_once(&self, value: Value) -> &Self {
        self.push_once(Behavior::Reply(Reply::Resolve(value)));
        self
    }

    pub fn mock_rejected_value(&self, value: Value) -> &Self {
        self.set_base(Behavior::Reply(Reply::Reject(value)));
        self
    }

    pub fn mock_rejected_value_once(&self, value: Value) -> &Self {
        self.push_once(Behavior::Reply(Reply::Reject(value)));
        self
    }

    /// Make every call fail with `message`.
    pub fn mock_failure(&self, message: impl Into<String>) -> &Self {
        let message = message.into();
        self.mock_implementation(move |_| Err(Error::Failed(message.clone())))
    }

    /// Forget recorded calls and results.
    pub fn mock_clear(&self) {
        let mut state = self.state.lock();
        state.calls.clear();
        state.results.clear();
    }

    /// Forget calls and every behaviour, the original implementation included.
    pub fn mock_reset(&self) {
        let mut state = self.state.lock();
        state.calls.clear();
        state.results.clear();
        state.once.clear();
        state.base = None;
    }

    /// Forget calls and configured behaviour; reinstate the original implementation.
    pub fn mock_restore(&self) {
        let mut state = self.state.lock();
        state.calls.clear();
        state.results.clear();
        state.once.clear();
        state.base = state.original.clone().map(Behavior::Implementation);
    }

    pub fn calls(&self) -> Vec<Vec<Value>> {
        self.state.lock().calls.clone()
    }

    pub fn results(&self) -> Vec<MockResult> {
        self.state.lock().results.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().calls.len()
    }

    pub fn was_called(&self) -> bool {
        self.call_count() > 0
    }

    pub fn last_call(&self) -> Option<Vec<Value>> {
        self.state.lock().calls.last().cloned()
    }

    /// Arguments of the call at zero-based `index`.
    pub fn nth_call(&self, index: usize) -> Option<Vec<Value>> {
        self.state.lock().calls.get(index).cloned()
    }
}

impl fmt::Debug for MockFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("MockFn")
            .field("calls", &state.calls.len())
            .field("queued", &state.once.len())
            .field("configured", &state.base.is_some())
            .finish()
    }
}
