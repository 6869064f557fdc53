//! Demo blog resources published into the registry at startup.
//!
//! `blog-postings` is a full collection resource; `comments` is nested
//! under it with statically declared types; `tags` is nested through
//! lifecycle properties because its router stays generic over the parent.

use std::sync::Arc;

use resource_wiring::{ProviderHub, ServiceTracker, TrackerError};
use resource_wiring_sdk::{
    CollectionResource, Invocation, NestedCollectionRouter, Properties, ProviderHandle,
    Representable, RouteTable, RoutesBuilder, TypeArguments, TypeRef, property_keys,
};
use serde_json::{Value, json};

pub struct BlogPost;
pub struct Comment;
pub struct Tag;

/// Request-scoped locale handed to every handler.
pub struct Locale(pub &'static str);

fn locale(inv: &Invocation<'_>) -> Value {
    inv.provide::<Locale>()
        .map_or(Value::Null, |l| Value::from(l.0))
}

struct BlogPostings;

impl CollectionResource for BlogPostings {
    fn type_arguments(&self) -> TypeArguments {
        TypeArguments::new().bind::<BlogPost>().bind::<i64>()
    }

    fn name(&self) -> &str {
        "blog-postings"
    }

    fn collection_routes(&self, builder: RoutesBuilder) -> RouteTable {
        builder
            .add_getter(|inv| Ok(json!({ "items": [], "locale": locale(inv) })))
            .add_creator(|inv| Ok(json!({ "created": inv.body().cloned() })))
            .build()
    }

    fn item_routes(&self, builder: RoutesBuilder) -> RouteTable {
        builder
            .add_getter(|inv| Ok(json!({ "id": inv.id(), "locale": locale(inv) })))
            .add_updater(|inv| Ok(json!({ "id": inv.id(), "updated": inv.body().cloned() })))
            .add_remover(|inv| Ok(json!({ "deleted": inv.id() })))
            .build()
    }
}

struct CommentsRouter;

impl NestedCollectionRouter for CommentsRouter {
    fn type_arguments(&self) -> TypeArguments {
        TypeArguments::new()
            .bind::<Comment>()
            .bind::<BlogPost>()
            .bind::<i64>()
    }

    fn collection_routes(&self, builder: RoutesBuilder) -> RouteTable {
        let parent = builder.parent().map(|p| p.name.clone());
        builder
            .add_getter(move |inv| {
                Ok(json!({ "parent": parent, "parent_id": inv.id(), "items": [] }))
            })
            .add_creator(|inv| {
                Ok(json!({
                    "parent_id": inv.id(),
                    "created": inv.body().cloned(),
                    "locale": locale(inv),
                }))
            })
            .build()
    }
}

struct Comments;

impl Representable for Comments {
    fn type_arguments(&self) -> TypeArguments {
        TypeArguments::new().bind::<Comment>().bind::<i64>()
    }

    fn name(&self) -> &str {
        "comments"
    }
}

/// Generic over its parent; the parent types arrive as properties.
struct TagsRouter;

impl NestedCollectionRouter for TagsRouter {
    fn type_arguments(&self) -> TypeArguments {
        TypeArguments::new()
            .bind::<Tag>()
            .unbound("Parent")
            .unbound("ParentId")
    }

    fn collection_routes(&self, builder: RoutesBuilder) -> RouteTable {
        builder
            .add_getter(|inv| Ok(json!({ "parent_id": inv.id(), "tags": [] })))
            .build()
    }
}

struct Tags;

impl Representable for Tags {
    fn type_arguments(&self) -> TypeArguments {
        TypeArguments::new().bind::<Tag>().bind::<String>()
    }

    fn name(&self) -> &str {
        "tags"
    }
}

/// Announce every demo provider to the tracker.
///
/// # Errors
/// Returns `TrackerError::Closed` if the tracker stopped.
pub async fn publish(tracker: &ServiceTracker) -> Result<(), TrackerError> {
    let none = Properties::new;

    tracker
        .appeared(ProviderHandle::collection_resource(Arc::new(BlogPostings)), none())
        .await?;
    tracker
        .appeared(ProviderHandle::representable(Arc::new(Comments)), none())
        .await?;
    tracker
        .appeared(
            ProviderHandle::nested_collection_router(Arc::new(CommentsRouter)),
            none(),
        )
        .await?;
    tracker
        .appeared(ProviderHandle::representable(Arc::new(Tags)), none())
        .await?;
    tracker
        .appeared(
            ProviderHandle::nested_collection_router(Arc::new(TagsRouter)),
            Properties::new()
                .with(property_keys::PARENT_MODEL_TYPE, TypeRef::of::<BlogPost>())
                .with(property_keys::PARENT_IDENTIFIER_TYPE, TypeRef::of::<i64>()),
        )
        .await
}

pub fn register_request_values(hub: &ProviderHub) {
    hub.register_shared(Arc::new(Locale("en-US")));
}
