// Structural mocking: rewrite callable members in place with mock handles

use crate::error::{Error, Result};
use crate::mock::MockFn;
use crate::mock_factory::MockFactory;
use crate::object::{Structural, is_protocol_member};
use std::ops::Deref;
use tracing::debug;

/// Replace every callable member of `object` with the handle `factory` holds
/// for that name, then hand the same object back.
///
/// Protocol members are never touched. The pass is shallow: nested objects
/// stored as data are left alone. Running it again with another factory
/// rebinds the members to the new factory's handles.
pub fn mock_object<'a, T>(object: &'a T, factory: &MockFactory) -> &'a T
where
    T: Structural + ?Sized,
{
    let mut replaced = 0usize;
    for name in object.member_names() {
        if is_protocol_member(&name) || !object.is_callable(&name) {
            continue;
        }
        object.install(&name, factory.get(&name));
        replaced += 1;
    }

    debug!(members = replaced, "Object mocked in place");
    object
}

/// A value whose callable members are backed by a [`MockFactory`].
///
/// Derefs to the value, so production code paths see the same type.
#[derive(Debug, Clone)]
pub struct Mocked<T> {
    label: String,
    value: T,
    mocks: MockFactory,
}

impl<T> Mocked<T> {
    pub(crate) fn new(label: impl Into<String>, value: T, mocks: MockFactory) -> Self {
        Self {
            label: label.into(),
            value,
            mocks,
        }
    }

    /// The handle installed for `member`.
    pub fn mock(&self, member: &str) -> Result<MockFn> {
        self.mocks.peek(member).ok_or_else(|| Error::NotMocked {
            service: self.label.clone(),
            member: member.to_string(),
        })
    }

    pub fn mocks(&self) -> &MockFactory {
        &self.mocks
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Deref for Mocked<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_factory::create_mock_factory;
    use crate::object::{Class, Object, Reply};
    use serde_json::json;
    use std::sync::Arc;

    fn bucket_class() -> Arc<Class> {
        Class::new("Bucket")
            .method("upload", |_, _| Ok(json!("real upload").into()))
            .method("file", |_, _| Ok(json!("real file").into()))
            .method("toString", |_, _| Ok(json!("bucket!").into()))
            .build()
    }

    #[test]
    fn test_returns_same_object() {
        let obj = Object::of(&bucket_class());
        let factory = create_mock_factory(MockFn::new);
        let mocked = mock_object(&obj, &factory);
        assert!(std::ptr::eq(mocked, &obj));
    }

    #[test]
    fn test_replaces_inherited_and_own_methods() {
        let obj = Object::of(&bucket_class()).with_method("own", |_, _| Ok(json!("own").into()));
        let factory = create_mock_factory(MockFn::new);
        mock_object(&obj, &factory);

        assert_eq!(obj.call("upload", &[]).unwrap(), serde_json::Value::Null);
        assert_eq!(obj.call("own", &[]).unwrap(), serde_json::Value::Null);
        assert_eq!(factory.keys(), vec!["file", "own", "upload"]);
        assert_eq!(factory.get("upload").call_count(), 1);
    }

    #[test]
    fn test_protocol_members_survive() {
        let obj = Object::of(&bucket_class()).with_field("name", json!("b"));
        let factory = create_mock_factory(MockFn::new);
        mock_object(&obj, &factory);

        assert!(!factory.contains("toString"));
        assert_eq!(obj.call("toString", &[]).unwrap(), json!("bucket!"));
        assert_eq!(obj.call("hasOwnProperty", &[json!("name")]).unwrap(), json!(true));
    }

    #[test]
    fn test_data_members_untouched() {
        let nested = json!({"inner": true});
        let obj = Object::new()
            .with_field("name", json!("n"))
            .with_field("nested", nested.clone());
        let factory = create_mock_factory(MockFn::new);
        mock_object(&obj, &factory);

        assert!(factory.is_empty());
        assert_eq!(obj.get("nested"), Some(nested));
    }

    #[test]
    fn test_field_shadowing_class_method_is_kept() {
        let class = Class::new("Bucket")
            .method("name", |_, _| Ok(json!("class name").into()))
            .method("upload", |_, _| Ok(json!("real upload").into()))
            .build();
        let obj = Object::of(&class).with_field("name", json!("b1"));
        assert!(!obj.is_callable("name"));

        let factory = create_mock_factory(MockFn::new);
        mock_object(&obj, &factory);

        assert_eq!(obj.get("name"), Some(json!("b1")));
        assert_eq!(factory.keys(), vec!["upload"]);
        assert!(matches!(obj.call("name", &[]), Err(Error::NotCallable(_))));
    }

    #[test]
    fn test_second_factory_wins() {
        let obj = Object::of(&bucket_class());
        let first = create_mock_factory(MockFn::new);
        let second = create_mock_factory(MockFn::new);

        mock_object(&obj, &first);
        mock_object(&obj, &second);

        second.get("upload").mock_return_value(json!("second"));
        first.get("upload").mock_return_value(json!("first"));

        assert_eq!(obj.call("upload", &[]).unwrap(), json!("second"));
        assert_eq!(first.get("upload").call_count(), 0);
        assert_eq!(second.get("upload").call_count(), 1);
    }

    #[test]
    fn test_works_through_arc() {
        let obj = Arc::new(Object::of(&bucket_class()));
        let factory = create_mock_factory(MockFn::new);
        mock_object(&obj, &factory);

        factory.get("file").mock_return_value(json!("mocked"));
        assert_eq!(obj.call("file", &[json!("a.txt")]).unwrap(), json!("mocked"));
        assert_eq!(factory.get("file").last_call(), Some(vec![json!("a.txt")]));
    }

    #[test]
    fn test_mocked_accessor() {
        let factory = create_mock_factory(MockFn::new);
        let obj = Object::of(&bucket_class());
        mock_object(&obj, &factory);

        let mocked = Mocked::new("Bucket", obj, factory);
        assert!(mocked.mock("upload").is_ok());
        assert!(matches!(
            mocked.mock("missing"),
            Err(Error::NotMocked { member, .. }) if member == "missing"
        ));
        assert_eq!(mocked.class_name(), "Bucket");

        let reply = mocked.invoke("upload", &[]).unwrap();
        assert_eq!(reply, Reply::default());
    }
}
