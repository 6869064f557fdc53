#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end resolution of nested routes through the dynamic registry.

mod common;

use std::sync::Arc;

use common::{
    Article, Articles, BlogPost, Comment, CommentsRouter, GenericCommentsRouter, Locale,
    blog_registry, request, resolver_for,
};
use http::Method;
use resource_wiring::{ProviderHub, RouteResolver, ServiceTracker};
use resource_wiring_sdk::{Properties, ProviderHandle, TypeArguments, TypeRef, property_keys};
use serde_json::json;
use tokio_util::sync::CancellationToken;

// =============================================================================
// Registration and replacement
// =============================================================================

#[test]
fn registered_pair_resolves_to_the_providers_routes() {
    let registry = blog_registry();
    let router = Arc::new(CommentsRouter::under_blog_posts("p1"));
    registry.on_appeared(
        &ProviderHandle::nested_collection_router(router.clone()),
        &Properties::new(),
    );
    let resolver = resolver_for(&registry);

    let table = resolver
        .nested_collection_routes("blog-postings", "comments")
        .unwrap()
        .expect("comments under blog-postings should resolve");

    let out = table
        .invoke(&Method::GET, &request(), Some("7"), None)
        .unwrap()
        .unwrap();
    assert_eq!(out, json!({ "provider": "p1" }));
    assert_eq!(table.parent().unwrap().identifier_type, TypeRef::of::<i64>());
}

#[test]
fn unregistered_provider_no_longer_resolves() {
    let registry = blog_registry();
    let handle = ProviderHandle::nested_collection_router(Arc::new(
        CommentsRouter::under_blog_posts("p1"),
    ));
    registry.on_appeared(&handle, &Properties::new());
    let resolver = resolver_for(&registry);
    assert!(resolver
        .nested_collection_routes("blog-postings", "comments")
        .unwrap()
        .is_some());

    registry.on_disappeared(&handle);

    assert!(resolver
        .nested_collection_routes("blog-postings", "comments")
        .unwrap()
        .is_none());
}

#[test]
fn second_registration_for_the_same_pair_wins() {
    let registry = blog_registry();
    let first = Arc::new(CommentsRouter::under_blog_posts("p1"));
    let second = Arc::new(CommentsRouter::under_blog_posts("p2"));
    registry.on_appeared(
        &ProviderHandle::nested_collection_router(first.clone()),
        &Properties::new(),
    );
    registry.on_appeared(
        &ProviderHandle::nested_collection_router(second.clone()),
        &Properties::new(),
    );
    let resolver = resolver_for(&registry);

    let table = resolver
        .nested_collection_routes("blog-postings", "comments")
        .unwrap()
        .unwrap();

    let out = table
        .invoke(&Method::GET, &request(), Some("7"), None)
        .unwrap()
        .unwrap();
    assert_eq!(out, json!({ "provider": "p2" }));
    assert_eq!(first.calls(), 0);
    assert_eq!(second.calls(), 1);
}

#[test]
fn parent_override_beats_the_declared_parent() {
    let registry = blog_registry();
    registry.on_appeared(
        &ProviderHandle::representable(Arc::new(Articles)),
        &Properties::new(),
    );

    // declares Article as its parent, metadata says BlogPost
    let mut router = CommentsRouter::under_blog_posts("override");
    router.args = TypeArguments::new()
        .bind::<Comment>()
        .bind::<Article>()
        .bind::<u64>();
    let props =
        Properties::new().with(property_keys::PARENT_MODEL_TYPE, TypeRef::of::<BlogPost>());
    registry.on_appeared(
        &ProviderHandle::nested_collection_router(Arc::new(router)),
        &props,
    );
    let resolver = resolver_for(&registry);

    assert!(resolver
        .nested_collection_routes("blog-postings", "comments")
        .unwrap()
        .is_some());
    assert!(resolver
        .nested_collection_routes("articles", "comments")
        .unwrap()
        .is_none());
}

// =============================================================================
// Resolution properties
// =============================================================================

#[test]
fn each_resolution_invokes_the_callback_exactly_once() {
    let registry = blog_registry();
    let router = Arc::new(CommentsRouter::under_blog_posts("p1"));
    registry.on_appeared(
        &ProviderHandle::nested_collection_router(router.clone()),
        &Properties::new(),
    );
    let resolver = resolver_for(&registry);

    for expected in 1..=3 {
        resolver
            .nested_collection_routes("blog-postings", "comments")
            .unwrap()
            .unwrap();
        assert_eq!(router.calls(), expected);
    }

    let ops = resolver
        .operations_for(&TypeRef::of::<Comment>(), TypeRef::of::<BlogPost>().name())
        .unwrap();
    assert_eq!(ops.len(), 2);
    assert_eq!(router.calls(), 4);
}

#[test]
fn unknown_names_resolve_to_nothing() {
    let registry = blog_registry();
    let resolver = resolver_for(&registry);

    assert!(resolver
        .nested_collection_routes("blog-postings", "comments")
        .unwrap()
        .is_none());
    assert!(resolver
        .nested_collection_routes("nope", "comments")
        .unwrap()
        .is_none());
    assert!(resolver
        .nested_collection_routes("blog-postings", "nope")
        .unwrap()
        .is_none());
    assert!(resolver
        .operations_for(&TypeRef::named("x::Y"), "x::Z")
        .unwrap()
        .is_empty());
}

#[test]
fn malformed_provider_does_not_block_later_ones() {
    let registry = blog_registry();
    registry.on_appeared(
        &ProviderHandle::nested_collection_router(Arc::new(GenericCommentsRouter)),
        &Properties::new(),
    );
    registry.on_appeared(
        &ProviderHandle::nested_collection_router(Arc::new(CommentsRouter::under_blog_posts(
            "ok",
        ))),
        &Properties::new(),
    );
    let resolver = resolver_for(&registry);

    assert!(resolver
        .nested_collection_routes("blog-postings", "comments")
        .unwrap()
        .is_some());
}

#[test]
fn handlers_pull_request_scoped_values_from_the_hub() {
    let registry = blog_registry();
    registry.on_appeared(
        &ProviderHandle::nested_collection_router(Arc::new(CommentsRouter::under_blog_posts(
            "p1",
        ))),
        &Properties::new(),
    );
    let hub = Arc::new(ProviderHub::new());
    hub.register_shared(Arc::new(Locale("en-US")));
    let resolver = RouteResolver::from_registry(Arc::clone(&registry), hub);

    let collection = resolver.collection_routes("blog-postings").unwrap().unwrap();
    let out = collection
        .invoke(&Method::GET, &request(), None, None)
        .unwrap()
        .unwrap();
    assert_eq!(out, json!([]));

    let table = resolver
        .nested_collection_routes("blog-postings", "comments")
        .unwrap()
        .unwrap();
    let out = table
        .invoke(&Method::POST, &request(), Some("7"), Some(&json!({})))
        .unwrap()
        .unwrap();
    assert_eq!(
        out,
        json!({ "provider": "p1", "parent": "7", "locale": "en-US" })
    );
}

// =============================================================================
// Lifecycle feed
// =============================================================================

#[tokio::test]
async fn tracker_feeds_the_resolver() {
    let registry = blog_registry();
    let cancel = CancellationToken::new();
    let (tracker, task) = ServiceTracker::open(Arc::clone(&registry), cancel.clone());
    let resolver = resolver_for(&registry);
    let handle = ProviderHandle::nested_collection_router(Arc::new(
        CommentsRouter::under_blog_posts("tracked"),
    ));

    tracker.appeared(handle, Properties::new()).await.unwrap();
    tracker.sync().await.unwrap();
    assert!(resolver
        .nested_collection_routes("blog-postings", "comments")
        .unwrap()
        .is_some());

    cancel.cancel();
    task.await.unwrap();

    assert!(resolver
        .nested_collection_routes("blog-postings", "comments")
        .unwrap()
        .is_none());
    // resources registered outside the tracker are untouched
    assert!(resolver.collection_routes("blog-postings").unwrap().is_some());
}
