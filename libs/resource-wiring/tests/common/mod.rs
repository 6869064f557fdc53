#![allow(dead_code)]

//! Blog fixtures shared by the integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use resource_wiring::{DynamicRegistry, ProviderHub, RouteResolver};
use resource_wiring_sdk::{
    CollectionResource, NestedCollectionRouter, Properties, ProviderHandle, Representable,
    RouteTable, RoutesBuilder, TypeArguments,
};
use serde_json::json;

pub struct BlogPost;
pub struct Comment;
pub struct Article;

/// Request-scoped value supplied through the provider hub.
pub struct Locale(pub &'static str);

pub struct BlogPostings;

impl CollectionResource for BlogPostings {
    fn type_arguments(&self) -> TypeArguments {
        TypeArguments::new().bind::<BlogPost>().bind::<i64>()
    }

    fn name(&self) -> &str {
        "blog-postings"
    }

    fn collection_routes(&self, builder: RoutesBuilder) -> RouteTable {
        builder.add_getter(|_| Ok(json!([]))).build()
    }

    fn item_routes(&self, builder: RoutesBuilder) -> RouteTable {
        builder.add_getter(|inv| Ok(json!({ "id": inv.id() }))).build()
    }
}

pub struct Comments;

impl Representable for Comments {
    fn type_arguments(&self) -> TypeArguments {
        TypeArguments::new().bind::<Comment>().bind::<i64>()
    }

    fn name(&self) -> &str {
        "comments"
    }
}

pub struct Articles;

impl Representable for Articles {
    fn type_arguments(&self) -> TypeArguments {
        TypeArguments::new().bind::<Article>().bind::<u64>()
    }

    fn name(&self) -> &str {
        "articles"
    }
}

/// Nested comments router that counts how often its callback runs.
pub struct CommentsRouter {
    pub tag: &'static str,
    pub calls: Arc<AtomicUsize>,
    pub args: TypeArguments,
}

impl CommentsRouter {
    pub fn under_blog_posts(tag: &'static str) -> Self {
        Self {
            tag,
            calls: Arc::new(AtomicUsize::new(0)),
            args: TypeArguments::new()
                .bind::<Comment>()
                .bind::<BlogPost>()
                .bind::<i64>(),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl NestedCollectionRouter for CommentsRouter {
    fn type_arguments(&self) -> TypeArguments {
        self.args.clone()
    }

    fn collection_routes(&self, builder: RoutesBuilder) -> RouteTable {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let tag = self.tag;
        builder
            .add_getter(move |_| Ok(json!({ "provider": tag })))
            .add_creator(move |inv| {
                let locale = inv.provide::<Locale>().map(|l| l.0);
                Ok(json!({ "provider": tag, "parent": inv.id(), "locale": locale }))
            })
            .build()
    }
}

/// Router that never binds its parent types.
pub struct GenericCommentsRouter;

impl NestedCollectionRouter for GenericCommentsRouter {
    fn type_arguments(&self) -> TypeArguments {
        TypeArguments::new()
            .bind::<Comment>()
            .unbound("P")
            .unbound("I")
    }

    fn collection_routes(&self, builder: RoutesBuilder) -> RouteTable {
        builder.build()
    }
}

/// Registry with the blog-postings resource and the comments representable.
pub fn blog_registry() -> Arc<DynamicRegistry> {
    let registry = Arc::new(DynamicRegistry::new());
    registry.on_appeared(
        &ProviderHandle::collection_resource(Arc::new(BlogPostings)),
        &Properties::new(),
    );
    registry.on_appeared(
        &ProviderHandle::representable(Arc::new(Comments)),
        &Properties::new(),
    );
    registry
}

pub fn resolver_for(registry: &Arc<DynamicRegistry>) -> RouteResolver {
    RouteResolver::from_registry(Arc::clone(registry), Arc::new(ProviderHub::new()))
}

pub fn request() -> http::request::Parts {
    http::Request::builder()
        .uri("/blog-postings/7/comments")
        .body(())
        .unwrap()
        .into_parts()
        .0
}
