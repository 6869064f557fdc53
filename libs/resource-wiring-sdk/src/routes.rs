//! Route tables produced by providers.
//!
//! The registry hands each provider a [`RoutesBuilder`] already filled with
//! the resource name, its parent context (nested routers only), and a
//! [`ProvideFn`] for pulling request-scoped values by type. The provider adds
//! its handlers and returns the built [`RouteTable`].

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::Method;
use http::request::Parts;
use serde_json::Value;

use crate::types::TypeRef;

/// Type-erased request-scoped value.
pub type Provided = Arc<dyn Any + Send + Sync>;

/// Resolves a request-scoped value of the given type for one request.
pub type ProvideFn = Arc<dyn Fn(&Parts, &TypeRef) -> Option<Provided> + Send + Sync>;

/// Operation handler registered by a provider.
pub type Handler = Arc<dyn Fn(&Invocation<'_>) -> anyhow::Result<Value> + Send + Sync>;

/// One operation exposed by a resolved route table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operation {
    pub method: Method,
    /// Stable operation name, e.g. `blog-postings/comments/create`.
    pub name: String,
    /// Path template, e.g. `/blog-postings/{id}/comments`.
    pub path: String,
    /// Whether the operation acts on a collection rather than a single item.
    pub collection: bool,
}

/// The enclosing resource of a nested collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParentContext {
    pub name: String,
    pub identifier_type: TypeRef,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Scope {
    Collection,
    Item,
    Nested,
}

/// Arguments passed to a handler when an operation is invoked.
pub struct Invocation<'a> {
    request: &'a Parts,
    id: Option<&'a str>,
    body: Option<&'a Value>,
    provide: &'a ProvideFn,
}

impl<'a> Invocation<'a> {
    #[must_use]
    pub fn request(&self) -> &'a Parts {
        self.request
    }

    /// Item id for item operations, parent id for nested operations.
    #[must_use]
    pub fn id(&self) -> Option<&'a str> {
        self.id
    }

    #[must_use]
    pub fn body(&self) -> Option<&'a Value> {
        self.body
    }

    /// Pull a request-scoped value by type.
    #[must_use]
    pub fn provide<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.provide_ref(&TypeRef::of::<T>())?.downcast::<T>().ok()
    }

    #[must_use]
    pub fn provide_ref(&self, type_ref: &TypeRef) -> Option<Provided> {
        (self.provide)(self.request, type_ref)
    }
}

/// Pre-populated builder handed to a provider's route callback.
pub struct RoutesBuilder {
    scope: Scope,
    model_type: TypeRef,
    name: String,
    identifier_type: Option<TypeRef>,
    parent: Option<ParentContext>,
    provide: ProvideFn,
    operations: Vec<Operation>,
    handlers: HashMap<Method, Handler>,
}

impl RoutesBuilder {
    #[must_use]
    pub fn collection(
        model_type: TypeRef,
        name: impl Into<String>,
        identifier_type: TypeRef,
        provide: ProvideFn,
    ) -> Self {
        Self::with_scope(
            Scope::Collection,
            model_type,
            name.into(),
            Some(identifier_type),
            None,
            provide,
        )
    }

    #[must_use]
    pub fn item(
        model_type: TypeRef,
        name: impl Into<String>,
        identifier_type: TypeRef,
        provide: ProvideFn,
    ) -> Self {
        Self::with_scope(
            Scope::Item,
            model_type,
            name.into(),
            Some(identifier_type),
            None,
            provide,
        )
    }

    #[must_use]
    pub fn nested(
        model_type: TypeRef,
        name: impl Into<String>,
        parent: ParentContext,
        provide: ProvideFn,
    ) -> Self {
        Self::with_scope(
            Scope::Nested,
            model_type,
            name.into(),
            None,
            Some(parent),
            provide,
        )
    }

    fn with_scope(
        scope: Scope,
        model_type: TypeRef,
        name: String,
        identifier_type: Option<TypeRef>,
        parent: Option<ParentContext>,
        provide: ProvideFn,
    ) -> Self {
        Self {
            scope,
            model_type,
            name,
            identifier_type,
            parent,
            provide,
            operations: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    #[must_use]
    pub fn model_type(&self) -> &TypeRef {
        &self.model_type
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn identifier_type(&self) -> Option<&TypeRef> {
        self.identifier_type.as_ref()
    }

    #[must_use]
    pub fn parent(&self) -> Option<&ParentContext> {
        self.parent.as_ref()
    }

    #[must_use]
    pub fn provide_fn(&self) -> &ProvideFn {
        &self.provide
    }

    #[must_use]
    pub fn add_getter<F>(self, handler: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.add(Method::GET, "retrieve", Arc::new(handler))
    }

    #[must_use]
    pub fn add_creator<F>(self, handler: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.add(Method::POST, "create", Arc::new(handler))
    }

    #[must_use]
    pub fn add_updater<F>(self, handler: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.add(Method::PUT, "update", Arc::new(handler))
    }

    #[must_use]
    pub fn add_remover<F>(self, handler: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.add(Method::DELETE, "delete", Arc::new(handler))
    }

    fn add(mut self, method: Method, action: &str, handler: Handler) -> Self {
        let base = match &self.parent {
            Some(parent) => format!("{}/{}", parent.name, self.name),
            None => self.name.clone(),
        };
        let path = match self.scope {
            Scope::Collection => format!("/{}", self.name),
            Scope::Item => format!("/{}/{{id}}", self.name),
            Scope::Nested => match &self.parent {
                Some(parent) => format!("/{}/{{id}}/{}", parent.name, self.name),
                None => format!("/{}", self.name),
            },
        };
        let operation = Operation {
            method: method.clone(),
            name: format!("{base}/{action}"),
            path,
            collection: self.scope != Scope::Item,
        };

        // one handler per verb; re-adding replaces the earlier one
        self.operations.retain(|op| op.method != method);
        self.operations.push(operation);
        self.handlers.insert(method, handler);
        self
    }

    #[must_use]
    pub fn build(self) -> RouteTable {
        RouteTable {
            name: self.name,
            model_type: self.model_type,
            identifier_type: self.identifier_type,
            parent: self.parent,
            provide: self.provide,
            operations: self.operations,
            handlers: self.handlers,
        }
    }
}

/// Ordered operations a provider exposes for one (model, parent) context.
pub struct RouteTable {
    name: String,
    model_type: TypeRef,
    identifier_type: Option<TypeRef>,
    parent: Option<ParentContext>,
    provide: ProvideFn,
    operations: Vec<Operation>,
    handlers: HashMap<Method, Handler>,
}

impl RouteTable {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn model_type(&self) -> &TypeRef {
        &self.model_type
    }

    #[must_use]
    pub fn identifier_type(&self) -> Option<&TypeRef> {
        self.identifier_type.as_ref()
    }

    #[must_use]
    pub fn parent(&self) -> Option<&ParentContext> {
        self.parent.as_ref()
    }

    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    #[must_use]
    pub fn into_operations(self) -> Vec<Operation> {
        self.operations
    }

    /// Call the handler registered for `method`, or `None` if there is none.
    #[must_use]
    pub fn invoke(
        &self,
        method: &Method,
        request: &Parts,
        id: Option<&str>,
        body: Option<&Value>,
    ) -> Option<anyhow::Result<Value>> {
        let handler = self.handlers.get(method)?;
        let invocation = Invocation {
            request,
            id,
            body,
            provide: &self.provide,
        };
        Some(handler(&invocation))
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("name", &self.name)
            .field("model_type", &self.model_type)
            .field("identifier_type", &self.identifier_type)
            .field("parent", &self.parent)
            .field("operations", &self.operations)
            .finish_non_exhaustive()
    }
}
