// Test assertions for mock handles

use serde_json::Value;
use wireup_core::MockFn;

/// Assert that a handle was called at least once
pub fn assert_called(handle: &MockFn) {
    assert!(
        handle.was_called(),
        "Expected mock to have been called, but it was not"
    );
}

/// Assert that a handle was never called
pub fn assert_not_called(handle: &MockFn) {
    let calls = handle.calls();
    assert!(
        calls.is_empty(),
        "Expected mock not to have been called, but it was called {} time(s): {:?}",
        calls.len(),
        calls
    );
}

/// Assert that a handle was called exactly `expected` times
pub fn assert_called_times(handle: &MockFn, expected: usize) {
    let actual = handle.call_count();
    assert_eq!(
        actual, expected,
        "Expected mock to have been called {} time(s), got {}",
        expected, actual
    );
}

/// Assert that some call received exactly `args`
pub fn assert_called_with(handle: &MockFn, args: &[Value]) {
    let calls = handle.calls();
    assert!(
        calls.iter().any(|call| call.as_slice() == args),
        "Expected mock to have been called with {:?}. Calls: {:?}",
        args,
        calls
    );
}

/// Assert the arguments of the `n`th call, counting from 1
pub fn assert_nth_called_with(handle: &MockFn, n: usize, args: &[Value]) {
    assert!(n > 0, "Call numbers start at 1");
    let actual = handle.nth_call(n - 1);
    assert_eq!(
        actual.as_deref(),
        Some(args),
        "Expected call #{} to receive {:?}, got {:?}",
        n,
        args,
        actual
    );
}

/// Assert the arguments of the most recent call
pub fn assert_last_called_with(handle: &MockFn, args: &[Value]) {
    let actual = handle.last_call();
    assert_eq!(
        actual.as_deref(),
        Some(args),
        "Expected last call to receive {:?}, got {:?}",
        args,
        actual
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn called_twice() -> MockFn {
        let handle = MockFn::new();
        handle.call(&[json!("a")]).unwrap();
        handle.call(&[json!("b"), json!(2)]).unwrap();
        handle
    }

    #[test]
    fn test_call_assertions_pass() {
        let handle = called_twice();
        assert_called(&handle);
        assert_called_times(&handle, 2);
        assert_called_with(&handle, &[json!("a")]);
        assert_nth_called_with(&handle, 1, &[json!("a")]);
        assert_last_called_with(&handle, &[json!("b"), json!(2)]);
    }

    #[test]
    fn test_not_called() {
        assert_not_called(&MockFn::new());
    }

    #[test]
    #[should_panic(expected = "Expected mock to have been called")]
    fn test_assert_called_panics() {
        assert_called(&MockFn::new());
    }

    #[test]
    #[should_panic(expected = "Expected mock not to have been called")]
    fn test_assert_not_called_panics() {
        assert_not_called(&called_twice());
    }

    #[test]
    #[should_panic(expected = "Expected call #3")]
    fn test_nth_out_of_range_panics() {
        assert_nth_called_with(&called_twice(), 3, &[]);
    }

    #[test]
    #[should_panic(expected = "Expected mock to have been called with")]
    fn test_called_with_panics() {
        assert_called_with(&called_twice(), &[json!("c")]);
    }
}
