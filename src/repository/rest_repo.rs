//! REST Repository Implementation
//!
//! Talks to the hosted store's PostgREST endpoint. Owner scoping is done with
//! `eq.` filters on the entity's owner column; row level security on the
//! store side enforces the same rule.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use tracing::debug;

use super::traits::Repository;
use crate::config::StoreConfig;
use crate::domain::{DomainError, DomainResult, Entity, Session};
use crate::remote::check_response;

pub struct RestRepository<T> {
    client: Client,
    config: StoreConfig,
    _entity: PhantomData<fn() -> T>,
}

impl<T> RestRepository<T> {
    pub fn new(client: Client, config: StoreConfig) -> Self {
        Self {
            client,
            config,
            _entity: PhantomData,
        }
    }
}

impl<T: Entity> RestRepository<T> {
    fn request(&self, method: Method, scope: &Session) -> RequestBuilder {
        self.client
            .request(method, self.config.rest_url(T::TABLE))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&scope.access_token)
    }

    fn owner_filter(scope: &Session) -> (&'static str, String) {
        (T::OWNER_COLUMN, format!("eq.{}", scope.owner()))
    }

    fn row_filter(scope: &Session, id: &T::Id) -> [(&'static str, String); 2] {
        [("id", format!("eq.{}", id)), Self::owner_filter(scope)]
    }
}

async fn read_rows<T: DeserializeOwned>(builder: RequestBuilder) -> DomainResult<Vec<T>> {
    let response = check_response(builder.send().await?).await?;
    Ok(response.json::<Vec<T>>().await?)
}

/// Serialize `value` into a JSON object so columns can be added or dropped.
fn to_object<S: Serialize>(value: &S) -> DomainResult<serde_json::Map<String, Value>> {
    match serde_json::to_value(value).map_err(DomainError::store)? {
        Value::Object(map) => Ok(map),
        other => Err(DomainError::Store(format!("expected a JSON object, got {}", other))),
    }
}

#[async_trait]
impl<T> Repository<T> for RestRepository<T>
where
    T: Entity + Serialize + DeserializeOwned,
{
    async fn create(&self, scope: &Session, draft: &T::Draft) -> DomainResult<T> {
        let mut row = to_object(draft)?;
        row.insert(
            T::OWNER_COLUMN.to_string(),
            Value::String(scope.owner().to_string()),
        );
        debug!(table = T::TABLE, owner = %scope.owner(), "insert");

        let rows: Vec<T> = read_rows(
            self.request(Method::POST, scope)
                .header("Prefer", "return=representation")
                .json(&[Value::Object(row)]),
        )
        .await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| DomainError::Store(format!("insert into {} returned no row", T::TABLE)))
    }

    async fn find_by_id(&self, scope: &Session, id: &T::Id) -> DomainResult<Option<T>> {
        debug!(table = T::TABLE, %id, "select one");
        let rows: Vec<T> = read_rows(
            self.request(Method::GET, scope)
                .query(&[("select", "*")])
                .query(&Self::row_filter(scope, id)),
        )
        .await?;
        Ok(rows.into_iter().next())
    }

    async fn list(&self, scope: &Session) -> DomainResult<Vec<T>> {
        debug!(table = T::TABLE, owner = %scope.owner(), "select");
        let mut builder = self
            .request(Method::GET, scope)
            .query(&[("select", "*")])
            .query(&[Self::owner_filter(scope)]);
        if let Some(order) = T::ORDER_BY {
            builder = builder.query(&[("order", order)]);
        }
        read_rows(builder).await
    }

    async fn update(
        &self,
        scope: &Session,
        id: &T::Id,
        patch: &T::Patch,
    ) -> DomainResult<Option<T>> {
        let mut body = to_object(patch)?;
        // Ownership never moves
        body.remove(T::OWNER_COLUMN);
        if body.is_empty() {
            return Err(DomainError::Validation("nothing to update".to_string()));
        }
        debug!(table = T::TABLE, %id, "update");

        let rows: Vec<T> = read_rows(
            self.request(Method::PATCH, scope)
                .query(&Self::row_filter(scope, id))
                .header("Prefer", "return=representation")
                .json(&Value::Object(body)),
        )
        .await?;
        Ok(rows.into_iter().next())
    }

    async fn delete(&self, scope: &Session, id: &T::Id) -> DomainResult<bool> {
        debug!(table = T::TABLE, %id, "delete");
        let rows: Vec<Value> = read_rows(
            self.request(Method::DELETE, scope)
                .query(&Self::row_filter(scope, id))
                .header("Prefer", "return=representation"),
        )
        .await?;
        Ok(!rows.is_empty())
    }
}
