//! Create/read/update/delete over any record type.
//!
//! The handlers here are generic over [`Resource`]; the router instantiates
//! them once for [`Lists`] and once for [`Items`].

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, FromRequest, Path, Query, Request, State},
    http::{header, Method, StatusCode},
    Json,
};
use lists_api::{Id, Item, ItemChanges, List, ListChanges, NewItem, NewList, Payload, WriteMode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::ApiError;
use crate::routes::AppState;
use crate::store::{ItemFilter, ListFilter, ListRow, Store};

/// A record type served under `/api/{PREFIX}/`
pub trait Resource: Send + Sync + 'static {
    /// Name used in not-found messages
    const NAME: &'static str;
    /// Path segment under `/api/`
    const PREFIX: &'static str;

    type Repr: Serialize + Send + 'static;
    type Filter: DeserializeOwned + Send + 'static;

    fn exists(store: &Store, id: Id) -> Result<bool, ApiError>;
    fn list_all(store: &Store, filter: &Self::Filter) -> Result<Vec<Self::Repr>, ApiError>;
    fn retrieve(store: &Store, id: Id) -> Result<Option<Self::Repr>, ApiError>;
    fn create(store: &Store, payload: &Payload) -> Result<Self::Repr, ApiError>;
    fn update(
        store: &Store,
        id: Id,
        payload: &Payload,
        mode: WriteMode,
    ) -> Result<Option<Self::Repr>, ApiError>;
    /// `false` when there was nothing to delete
    fn destroy(store: &Store, id: Id) -> Result<bool, ApiError>;
}

pub struct Lists;

impl Resource for Lists {
    const NAME: &'static str = "List";
    const PREFIX: &'static str = "lists";

    type Repr = List;
    type Filter = ListFilter;

    fn exists(store: &Store, id: Id) -> Result<bool, ApiError> {
        Ok(store.list_exists(id)?)
    }

    fn list_all(store: &Store, filter: &ListFilter) -> Result<Vec<List>, ApiError> {
        store
            .lists(filter)?
            .into_iter()
            .map(|row| with_items(store, row))
            .collect()
    }

    fn retrieve(store: &Store, id: Id) -> Result<Option<List>, ApiError> {
        store.list(id)?.map(|row| with_items(store, row)).transpose()
    }

    fn create(store: &Store, payload: &Payload) -> Result<List, ApiError> {
        let new = NewList::from_payload(payload)?;
        let list = store.insert_list(&new)?.into_list(vec![]);
        tracing::info!(list_id = %list.id, list = %list, "created list");
        Ok(list)
    }

    fn update(
        store: &Store,
        id: Id,
        payload: &Payload,
        mode: WriteMode,
    ) -> Result<Option<List>, ApiError> {
        let changes = ListChanges::from_payload(payload, mode)?;
        let list = store
            .update_list(id, &changes)?
            .map(|row| with_items(store, row))
            .transpose()?;
        if let Some(list) = &list {
            tracing::info!(list_id = %list.id, list = %list, ?mode, "updated list");
        }
        Ok(list)
    }

    fn destroy(store: &Store, id: Id) -> Result<bool, ApiError> {
        let deleted = store.delete_list(id)?;
        if deleted {
            tracing::info!(list_id = %id, "deleted list and its items");
        }
        Ok(deleted)
    }
}

fn with_items(store: &Store, row: ListRow) -> Result<List, ApiError> {
    let items = store.list_items(row.id)?;
    Ok(row.into_list(items))
}

pub struct Items;

impl Items {
    fn list_exists(store: &Store) -> impl Fn(Id) -> Result<bool, ApiError> + '_ {
        move |id| Ok(store.list_exists(id)?)
    }
}

impl Resource for Items {
    const NAME: &'static str = "Item";
    const PREFIX: &'static str = "items";

    type Repr = Item;
    type Filter = ItemFilter;

    fn exists(store: &Store, id: Id) -> Result<bool, ApiError> {
        Ok(store.item(id)?.is_some())
    }

    fn list_all(store: &Store, filter: &ItemFilter) -> Result<Vec<Item>, ApiError> {
        Ok(store.items(filter)?)
    }

    fn retrieve(store: &Store, id: Id) -> Result<Option<Item>, ApiError> {
        Ok(store.item(id)?)
    }

    fn create(store: &Store, payload: &Payload) -> Result<Item, ApiError> {
        let new = NewItem::from_payload(payload, Self::list_exists(store))?;
        let item = store.insert_item(&new)?;
        tracing::info!(item_id = %item.id, list_id = %item.list, item = %item, "created item");
        Ok(item)
    }

    fn update(
        store: &Store,
        id: Id,
        payload: &Payload,
        mode: WriteMode,
    ) -> Result<Option<Item>, ApiError> {
        let changes = ItemChanges::from_payload(payload, mode, Self::list_exists(store))?;
        let item = store.update_item(id, &changes)?;
        if let Some(item) = &item {
            tracing::info!(item_id = %item.id, item = %item, ?mode, "updated item");
        }
        Ok(item)
    }

    fn destroy(store: &Store, id: Id) -> Result<bool, ApiError> {
        let deleted = store.delete_item(id)?;
        if deleted {
            tracing::info!(item_id = %id, "deleted item");
        }
        Ok(deleted)
    }
}

/// A JSON request body
///
/// A request without a body or a content type reads as an empty object, so a
/// bare PATCH is a no-op and a bare POST reports the missing fields.
pub struct JsonBody(Value);

impl<S: Send + Sync> FromRequest<S> for JsonBody {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, ApiError> {
        if req.headers().contains_key(header::CONTENT_TYPE) {
            let Json(body) = Json::<Value>::from_request(req, state).await?;
            return Ok(JsonBody(body));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::MalformedBody(rejection.body_text()))?;
        if bytes.is_empty() {
            Ok(JsonBody(Value::Object(Payload::new())))
        } else {
            Err(ApiError::UnsupportedMediaType)
        }
    }
}

/// Path segments that are not identifiers cannot name a record
fn parse_id<R: Resource>(raw: &str) -> Result<Id, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound(R::NAME))
}

pub async fn list_all<R: Resource>(
    State(state): State<AppState>,
    filter: Result<Query<R::Filter>, QueryRejection>,
) -> Result<Json<Vec<R::Repr>>, ApiError> {
    let Query(filter) = filter?;
    let store = state.store().lock().await;
    Ok(Json(R::list_all(&store, &filter)?))
}

pub async fn create<R: Resource>(
    State(state): State<AppState>,
    body: Result<JsonBody, ApiError>,
) -> Result<(StatusCode, Json<R::Repr>), ApiError> {
    let JsonBody(body) = body?;
    let payload = lists_api::payload(&body)?;
    let store = state.store().lock().await;
    let created = R::create(&store, payload)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn retrieve<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<R::Repr>, ApiError> {
    let id = parse_id::<R>(&id)?;
    let store = state.store().lock().await;
    R::retrieve(&store, id)?
        .map(Json)
        .ok_or(ApiError::NotFound(R::NAME))
}

pub async fn update<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<JsonBody, ApiError>,
) -> Result<Json<R::Repr>, ApiError> {
    write::<R>(state, &id, body, WriteMode::Replace).await
}

pub async fn partial_update<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<JsonBody, ApiError>,
) -> Result<Json<R::Repr>, ApiError> {
    write::<R>(state, &id, body, WriteMode::Partial).await
}

async fn write<R: Resource>(
    state: AppState,
    id: &str,
    body: Result<JsonBody, ApiError>,
    mode: WriteMode,
) -> Result<Json<R::Repr>, ApiError> {
    let id = parse_id::<R>(id)?;
    let store = state.store().lock().await;
    if !R::exists(&store, id)? {
        return Err(ApiError::NotFound(R::NAME));
    }

    let JsonBody(body) = body?;
    let payload = lists_api::payload(&body)?;
    R::update(&store, id, payload, mode)?
        .map(Json)
        .ok_or(ApiError::NotFound(R::NAME))
}

pub async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method)
}

pub async fn destroy<R: Resource>(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id::<R>(&id)?;
    let store = state.store().lock().await;
    if R::destroy(&store, id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(R::NAME))
    }
}
