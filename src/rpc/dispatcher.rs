//! Method table resolving wire method names to handlers
//!
//! Wire names are declared explicitly as `"{service}.{method}"` when the table is
//! built; the table is immutable afterwards and shared behind an `Arc`.

use std::{collections::BTreeMap, marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::rpc::envelope::{ErrorObject, Params};

#[async_trait]
pub trait RpcMethod: Send + Sync {
    async fn call(&self, params: Params) -> Result<Value, ErrorObject>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("method {0} is registered more than once")]
    DuplicateMethod(String),
    #[error("method name must not be empty")]
    EmptyName,
}

/// Adapts a synchronous function over serde types into an [`RpcMethod`].
pub struct TypedMethod<F, A, R> {
    func: F,
    _types: PhantomData<fn(A) -> R>,
}

pub fn typed_method<F, A, R>(func: F) -> TypedMethod<F, A, R>
where
    F: Fn(A) -> Result<R, ErrorObject> + Send + Sync + 'static,
    A: DeserializeOwned + Send + 'static,
    R: Serialize + Send + 'static,
{
    TypedMethod {
        func,
        _types: PhantomData,
    }
}

#[async_trait]
impl<F, A, R> RpcMethod for TypedMethod<F, A, R>
where
    F: Fn(A) -> Result<R, ErrorObject> + Send + Sync + 'static,
    A: DeserializeOwned + Send + 'static,
    R: Serialize + Send + 'static,
{
    async fn call(&self, params: Params) -> Result<Value, ErrorObject> {
        let args = params.parse::<A>()?;
        let reply = (self.func)(args)?;
        serde_json::to_value(reply).map_err(|err| {
            tracing::error!(error = %err, "method reply serialization failed");
            ErrorObject::internal_error()
        })
    }
}

#[derive(Default)]
pub struct DispatcherBuilder {
    entries: Vec<(String, Arc<dyn RpcMethod>)>,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `handler` under the wire name `"{service}.{method}"`.
    pub fn service(
        self,
        service: &str,
        method: &str,
        handler: impl RpcMethod + 'static,
    ) -> Self {
        self.method(format!("{service}.{method}"), handler)
    }

    pub fn method(mut self, name: impl Into<String>, handler: impl RpcMethod + 'static) -> Self {
        self.entries.push((name.into(), Arc::new(handler)));
        self
    }

    pub fn build(self) -> Result<Dispatcher, DispatchError> {
        let mut methods = BTreeMap::new();
        for (name, handler) in self.entries {
            if name.trim().is_empty() || name.starts_with('.') || name.ends_with('.') {
                return Err(DispatchError::EmptyName);
            }
            if methods.insert(name.clone(), handler).is_some() {
                return Err(DispatchError::DuplicateMethod(name));
            }
        }

        Ok(Dispatcher { methods })
    }
}

pub struct Dispatcher {
    methods: BTreeMap<String, Arc<dyn RpcMethod>>,
}

impl Dispatcher {
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    pub fn resolve(&self, name: &str) -> Option<Arc<dyn RpcMethod>> {
        self.methods.get(name).cloned()
    }

    pub fn methods(&self) -> Vec<&str> {
        self.methods.keys().map(String::as_str).collect()
    }

    pub async fn call(&self, name: &str, params: Params) -> Result<Value, ErrorObject> {
        let handler = self
            .resolve(name)
            .ok_or_else(ErrorObject::method_not_found)?;
        handler.call(params).await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("methods", &self.methods())
            .finish()
    }
}
