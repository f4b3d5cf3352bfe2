//! Dynamic object model for services that can be structurally mocked.
//!
//! A service that wants to take part in mock mode exposes its callable surface
//! through [`Structural`]. [`Object`] is the stock implementation: data members
//! and own methods live on the instance, shared methods live on an optional
//! [`Class`], which is the single inherited level enumerated when mocking.
//!
//! ```
//! use serde_json::json;
//! use wireup_core::{Object, Reply};
//!
//! let counter = Object::new()
//!     .with_field("value", json!(0))
//!     .with_method("inc", |this, _args| {
//!         let next = this.get("value").and_then(|v| v.as_i64()).unwrap_or(0) + 1;
//!         this.set("value", json!(next));
//!         Ok(Reply::default())
//!     });
//!
//! counter.call("inc", &[]).unwrap();
//! assert_eq!(counter.get("value"), Some(json!(1)));
//! ```

use crate::error::{Error, Result};
use crate::mock::MockFn;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Universal object-protocol members. Structural mocking never replaces these.
pub const PROTOCOL_MEMBERS: &[&str] = &[
    "constructor",
    "__defineGetter__",
    "__defineSetter__",
    "hasOwnProperty",
    "__lookupGetter__",
    "__lookupSetter__",
    "isPrototypeOf",
    "propertyIsEnumerable",
    "toString",
    "valueOf",
    "__proto__",
    "toLocaleString",
];

/// Returns true when `name` belongs to the protocol exclusion set.
pub fn is_protocol_member(name: &str) -> bool {
    PROTOCOL_MEMBERS.contains(&name)
}

/// Outcome of invoking a member.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// Synchronous return value
    Return(Value),
    /// Asynchronous success
    Resolve(Value),
    /// Asynchronous failure
    Reject(Value),
}

impl Reply {
    /// Borrow the carried value regardless of variant.
    pub fn value(&self) -> &Value {
        match self {
            Reply::Return(v) | Reply::Resolve(v) | Reply::Reject(v) => v,
        }
    }

    pub fn is_async(&self) -> bool {
        !matches!(self, Reply::Return(_))
    }

    /// Collapse into a plain result. Rejections become [`Error::Rejected`].
    pub fn into_result(self) -> Result<Value> {
        match self {
            Reply::Return(v) | Reply::Resolve(v) => Ok(v),
            Reply::Reject(v) => Err(Error::Rejected(v)),
        }
    }

    /// Async counterpart of [`Reply::into_result`]. A synchronous return is
    /// treated as an already settled computation.
    pub async fn settle(self) -> Result<Value> {
        self.into_result()
    }
}

impl Default for Reply {
    fn default() -> Self {
        Reply::Return(Value::Null)
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Reply::Return(value)
    }
}

/// A callable member. The first argument is the receiver.
pub type Method = Arc<dyn Fn(&Object, &[Value]) -> Result<Reply> + Send + Sync>;

/// Wrap a closure as a [`Method`].
pub fn method<F>(f: F) -> Method
where
    F: Fn(&Object, &[Value]) -> Result<Reply> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The declared mockable surface of a value.
pub trait Structural: Send + Sync {
    /// Own data and method names plus the names inherited one level up.
    fn member_names(&self) -> Vec<String>;

    /// Whether the member currently held under `name` can be invoked.
    fn is_callable(&self, name: &str) -> bool;

    /// Overwrite `name` on the value itself with a mock handle.
    fn install(&self, name: &str, handle: MockFn);
}

impl<T: Structural + ?Sized> Structural for Arc<T> {
    fn member_names(&self) -> Vec<String> {
        (**self).member_names()
    }

    fn is_callable(&self, name: &str) -> bool {
        (**self).is_callable(name)
    }

    fn install(&self, name: &str, handle: MockFn) {
        (**self).install(name, handle)
    }
}

/// Methods shared by every instance built from it.
pub struct Class {
    name: String,
    methods: BTreeMap<String, Method>,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: BTreeMap::new(),
        }
    }

    /// Add a method to the class table.
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> Result<Reply> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), method(f));
        self
    }

    pub fn build(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    fn lookup(&self, name: &str) -> Option<Method> {
        self.methods.get(name).cloned()
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.name)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A dynamically shaped object with interior mutability.
#[derive(Default)]
pub struct Object {
    class: Option<Arc<Class>>,
    fields: RwLock<BTreeMap<String, Value>>,
    methods: RwLock<BTreeMap<String, Method>>,
}

impl Object {
    /// Create an object without a class.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an instance of `class`.
    pub fn of(class: &Arc<Class>) -> Self {
        Self {
            class: Some(Arc::clone(class)),
            ..Self::default()
        }
    }

    pub fn with_field(self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_method<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Object, &[Value]) -> Result<Reply> + Send + Sync + 'static,
    {
        self.set_method(name, method(f));
        self
    }

    pub fn class(&self) -> Option<&Arc<Class>> {
        self.class.as_ref()
    }

    pub fn class_name(&self) -> &str {
        self.class.as_ref().map_or("Object", |c| c.name())
    }

    /// Read a data member.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.fields.read().get(name).cloned()
    }

    /// Write a data member, dropping any own method of the same name.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        let name = name.into();
        self.methods.write().remove(&name);
        self.fields.write().insert(name, value);
    }

    /// Write an own method, dropping any data member of the same name.
    pub fn set_method(&self, name: impl Into<String>, method: Method) {
        let name = name.into();
        self.fields.write().remove(&name);
        self.methods.write().insert(name, method);
    }

    /// Whether `name` is an own data member or own method.
    pub fn has_own(&self, name: &str) -> bool {
        self.fields.read().contains_key(name) || self.methods.read().contains_key(name)
    }

    /// Whether `name` resolves to anything on the instance or its class.
    pub fn has(&self, name: &str) -> bool {
        self.has_own(name) || self.class.as_ref().is_some_and(|c| c.lookup(name).is_some())
    }

    /// Own member names, data and methods together, sorted.
    pub fn own_keys(&self) -> Vec<String> {
        let mut keys: BTreeSet<String> = self.fields.read().keys().cloned().collect();
        keys.extend(self.methods.read().keys().cloned());
        keys.into_iter().collect()
    }

    fn lookup(&self, name: &str) -> Option<Method> {
        if let Some(m) = self.methods.read().get(name) {
            return Some(Arc::clone(m));
        }
        // Own data shadows class methods.
        if self.fields.read().contains_key(name) {
            return None;
        }
        self.class.as_ref().and_then(|c| c.lookup(name))
    }

    /// Invoke a member and return its raw [`Reply`].
    pub fn invoke(&self, name: &str, args: &[Value]) -> Result<Reply> {
        // Clone the method out so its body may touch our locks.
        match self.lookup(name) {
            Some(m) => m(self, args),
            None if self.fields.read().contains_key(name) => {
                Err(Error::NotCallable(name.to_string()))
            }
            None => self.invoke_protocol(name, args),
        }
    }

    /// Invoke a member and collapse the reply into a value.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        self.invoke(name, args)?.into_result()
    }

    /// Invoke a member and settle its reply.
    pub async fn call_async(&self, name: &str, args: &[Value]) -> Result<Value> {
        self.invoke(name, args)?.settle().await
    }

    fn invoke_protocol(&self, name: &str, args: &[Value]) -> Result<Reply> {
        match name {
            "hasOwnProperty" => {
                let key = args.first().and_then(Value::as_str).unwrap_or_default();
                Ok(Reply::Return(Value::Bool(self.has_own(key))))
            }
            "toString" => Ok(Reply::Return(Value::String(format!(
                "[object {}]",
                self.class_name()
            )))),
            "valueOf" => Ok(Reply::Return(Value::Object(self.to_map()))),
            _ => Err(Error::NotCallable(name.to_string())),
        }
    }

    /// Data members as a JSON object.
    pub fn to_map(&self) -> Map<String, Value> {
        self.fields
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl Structural for Object {
    fn member_names(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self.own_keys().into_iter().collect();
        if let Some(class) = &self.class {
            names.extend(class.method_names().map(str::to_string));
        }
        names.into_iter().collect()
    }

    fn is_callable(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    fn install(&self, name: &str, handle: MockFn) {
        self.set_method(name, method(move |_, args| handle.invoke(args)));
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("class", &self.class_name())
            .field("fields", &*self.fields.read())
            .field("methods", &self.methods.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn counter() -> Object {
        Object::new()
            .with_field("value", json!(0))
            .with_method("inc", |this, _| {
                let next = this.get("value").and_then(|v| v.as_i64()).unwrap_or(0) + 1;
                this.set("value", json!(next));
                Ok(Reply::default())
            })
    }

    #[test]
    fn test_method_mutates_receiver() {
        let obj = counter();
        obj.call("inc", &[]).unwrap();
        obj.call("inc", &[]).unwrap();
        assert_eq!(obj.get("value"), Some(json!(2)));
    }

    #[test]
    fn test_class_methods_are_inherited() {
        let greeter = Class::new("Greeter")
            .method("greet", |this, args| {
                let who = args.first().and_then(Value::as_str).unwrap_or("world");
                let prefix = this.get("prefix").unwrap_or(json!("hello"));
                Ok(json!(format!("{} {}", prefix.as_str().unwrap_or_default(), who)).into())
            })
            .build();

        let obj = Object::of(&greeter).with_field("prefix", json!("hi"));
        assert_eq!(obj.call("greet", &[json!("bob")]).unwrap(), json!("hi bob"));
        assert!(obj.has("greet"));
        assert!(!obj.has_own("greet"));
    }

    #[test]
    fn test_own_method_shadows_class() {
        let class = Class::new("Thing")
            .method("name", |_, _| Ok(json!("class").into()))
            .build();
        let obj = Object::of(&class).with_method("name", |_, _| Ok(json!("own").into()));
        assert_eq!(obj.call("name", &[]).unwrap(), json!("own"));
    }

    #[test]
    fn test_field_and_method_names_are_exclusive() {
        let obj = counter();
        obj.set("inc", json!(5));
        assert!(!obj.is_callable("inc"));
        assert_eq!(obj.get("inc"), Some(json!(5)));

        obj.set_method("value", method(|_, _| Ok(Reply::default())));
        assert_eq!(obj.get("value"), None);
        assert!(obj.is_callable("value"));
    }

    #[test]
    fn test_protocol_members() {
        let class = Class::new("Bucket").build();
        let obj = Object::of(&class).with_field("name", json!("b1"));

        assert_eq!(obj.call("toString", &[]).unwrap(), json!("[object Bucket]"));
        assert_eq!(obj.call("hasOwnProperty", &[json!("name")]).unwrap(), json!(true));
        assert_eq!(obj.call("hasOwnProperty", &[json!("nope")]).unwrap(), json!(false));
        assert_eq!(obj.call("valueOf", &[]).unwrap(), json!({"name": "b1"}));
    }

    #[test]
    fn test_missing_member_is_not_callable() {
        let obj = Object::new();
        let err = obj.call("missing", &[]).unwrap_err();
        assert!(matches!(err, Error::NotCallable(name) if name == "missing"));
    }

    #[test]
    fn test_member_names_union() {
        let class = Class::new("C")
            .method("a", |_, _| Ok(Reply::default()))
            .method("b", |_, _| Ok(Reply::default()))
            .build();
        let obj = Object::of(&class)
            .with_field("x", json!(1))
            .with_method("a", |_, _| Ok(Reply::default()));
        assert_eq!(obj.member_names(), vec!["a", "b", "x"]);
    }

    #[test]
    fn test_reply_into_result() {
        assert_eq!(Reply::Return(json!(1)).into_result().unwrap(), json!(1));
        assert_eq!(Reply::Resolve(json!(2)).into_result().unwrap(), json!(2));
        assert!(matches!(
            Reply::Reject(json!("boom")).into_result(),
            Err(Error::Rejected(v)) if v == json!("boom")
        ));
    }

    #[test]
    fn test_call_async_settles() {
        let obj = Object::new().with_method("fetch", |_, _| Ok(Reply::Resolve(json!("data"))));
        let value = tokio_test::block_on(obj.call_async("fetch", &[])).unwrap();
        assert_eq!(value, json!("data"));
    }

    #[test]
    fn test_protocol_member_set() {
        assert!(is_protocol_member("toString"));
        assert!(is_protocol_member("constructor"));
        assert!(!is_protocol_member("upload"));
        assert_eq!(PROTOCOL_MEMBERS.len(), 12);
    }
}
