//! Firebase Realtime Database backend (REST API)
//!
//! Documents live at `<collection>/<key>`. Filtered reads use the server-side
//! `orderBy`/`equalTo` query (falling back to a client-side filter when the
//! rules declare no index), bulk deletes are a single multi-path PATCH at the
//! root, and id counters are advanced with ETag-conditional writes.

pub mod auth;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde_json::{Map, Value};
use url::Url;

use crate::config::FirebaseSettings;

use super::{
    BackendKind, Collection, RecordKey, Result, Store, StoreError, as_id, field_matches,
    next_id_after,
};
pub use auth::{ServiceAccount, TokenSource};

/// Node holding one id counter per collection.
const COUNTERS_NODE: &str = "counters";

/// Conditional writes attempted before the counter gives up.
const COUNTER_ATTEMPTS: usize = 5;

/// Start of the 400 body returned for a query on a child without `.indexOn`.
const MISSING_INDEX: &str = "Index not defined";

/// How requests are authorized against the database.
pub enum Auth {
    /// No credentials (local emulator); `namespace` selects the database.
    Emulator { namespace: String },
    /// Legacy database secret sent as the `auth` query parameter.
    Secret(String),
    /// OAuth2 bearer token minted from a service account.
    ServiceAccount(Box<TokenSource>),
}

pub struct FirebaseStore {
    http: reqwest::Client,
    base: Url,
    auth: Auth,
}

impl FirebaseStore {
    pub fn new(database_url: &str, auth: Auth) -> Result<Self> {
        let normalized = if database_url.ends_with('/') {
            database_url.to_string()
        } else {
            format!("{}/", database_url)
        };

        let base = Url::parse(&normalized)
            .map_err(|e| StoreError::Config(format!("invalid database URL '{}': {}", database_url, e)))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base,
            auth,
        })
    }

    /// Picks credentials from the settings in order of precedence:
    /// emulator, combined service-account JSON, individual fields, legacy secret.
    pub fn from_settings(settings: &FirebaseSettings) -> Result<Self> {
        if let Some(host) = &settings.emulator_host {
            let namespace = settings.project_id.clone().ok_or_else(|| {
                StoreError::Config("FIREBASE_PROJECT_ID is required with the emulator".to_string())
            })?;
            return Self::new(&format!("http://{}", host), Auth::Emulator { namespace });
        }

        let account = match (
            &settings.service_account,
            &settings.project_id,
            &settings.client_email,
            &settings.private_key,
        ) {
            (Some(raw), _, _, _) => Some(ServiceAccount::from_json(raw)?),
            (None, Some(project), Some(email), Some(key)) => {
                Some(ServiceAccount::from_parts(project, email, key))
            }
            _ => None,
        };

        if let Some(account) = account {
            let database_url = settings
                .database_url
                .clone()
                .unwrap_or_else(|| default_database_url(&account.project_id));
            let tokens = TokenSource::new(account)?;
            return Self::new(&database_url, Auth::ServiceAccount(Box::new(tokens)));
        }

        match (&settings.database_secret, &settings.database_url) {
            (Some(secret), Some(url)) => Self::new(url, Auth::Secret(secret.clone())),
            _ => Err(StoreError::Config("no Firebase credentials configured".to_string())),
        }
    }

    pub fn database_url(&self) -> &Url {
        &self.base
    }

    /// REST URL of the node at `path`. Each segment is percent-encoded on its
    /// own and only the last one carries the `.json` suffix.
    fn url(&self, path: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                StoreError::Config(format!("database URL '{}' cannot carry a path", self.base))
            })?;
            segments.pop_if_empty();

            match path.split_last() {
                Some((last, parents)) => {
                    segments.extend(parents);
                    segments.push(&format!("{}.json", last));
                }
                None => {
                    segments.push(".json");
                }
            }
        }

        match &self.auth {
            Auth::Emulator { namespace } => {
                url.query_pairs_mut().append_pair("ns", namespace);
            }
            Auth::Secret(secret) => {
                url.query_pairs_mut().append_pair("auth", secret);
            }
            Auth::ServiceAccount(_) => {}
        }

        Ok(url)
    }

    async fn request(&self, method: Method, path: &[&str]) -> Result<RequestBuilder> {
        let builder = self.http.request(method, self.url(path)?);

        match &self.auth {
            Auth::ServiceAccount(tokens) => Ok(builder.bearer_auth(tokens.token(&self.http).await?)),
            _ => Ok(builder),
        }
    }

    async fn read(&self, path: &[&str]) -> Result<Value> {
        let response = send(self.request(Method::GET, path).await?).await?;
        Ok(response.json().await?)
    }

    /// Reads a node together with its ETag for a conditional write.
    async fn read_with_etag(&self, path: &[&str]) -> Result<(Value, String)> {
        let response = send(
            self.request(Method::GET, path)
                .await?
                .header("X-Firebase-ETag", "true"),
        )
        .await?;

        let etag = etag_of(&response)?;
        Ok((response.json().await?, etag))
    }

    /// Children whose `field` equals `value`, using the server-side index.
    ///
    /// Without an `.indexOn` rule for `field` the server refuses the query;
    /// the whole collection is then read and filtered here.
    async fn query_equal(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<(String, Value)>> {
        let order_by = serde_json::to_string(field)?;
        let equal_to = serde_json::to_string(value)?;

        let result = send(
            self.request(Method::GET, &[collection.name()])
                .await?
                .query(&[("orderBy", order_by), ("equalTo", equal_to)]),
        )
        .await;

        match result {
            Ok(response) => Ok(children(response.json().await?)),
            Err(StoreError::Remote { status: 400, body }) if body.contains(MISSING_INDEX) => {
                tracing::warn!(
                    "No index on {}/{}, filtering on the client (add it to database.rules.json)",
                    collection,
                    field
                );
                let tree = self.read(&[collection.name()]).await?;
                Ok(children(tree)
                    .into_iter()
                    .filter(|(_, doc)| field_matches(doc, field, value))
                    .collect())
            }
            Err(e) => Err(e),
        }
    }

    async fn write(&self, method: Method, path: &[&str], body: &Value) -> Result<()> {
        send(self.request(method, path).await?.json(body)).await?;
        Ok(())
    }

    async fn scan_next_id(&self, collection: Collection) -> Result<i64> {
        let docs = self.list(collection).await?;
        Ok(next_id_after(docs.iter()))
    }

    /// Compare-and-swap increment of the collection counter.
    /// Returns `None` when every attempt lost the race.
    async fn increment_counter(&self, collection: Collection) -> Result<Option<i64>> {
        let path = [COUNTERS_NODE, collection.name()];
        let (mut current, mut etag) = self.read_with_etag(&path).await?;

        for attempt in 1..=COUNTER_ATTEMPTS {
            // An absent counter starts after the highest existing id.
            let next = match as_id(&current) {
                Some(value) => value + 1,
                None => self.scan_next_id(collection).await?,
            };

            let response = self
                .request(Method::PUT, &path)
                .await?
                .header("if-match", etag.as_str())
                .json(&next)
                .send()
                .await?;

            match response.status() {
                status if status.is_success() => return Ok(Some(next)),
                StatusCode::PRECONDITION_FAILED => {
                    tracing::debug!("Counter for {} changed concurrently (attempt {})", collection, attempt);
                    etag = etag_of(&response)?;
                    current = response.json().await?;
                }
                status => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(StoreError::Remote {
                        status: status.as_u16(),
                        body,
                    });
                }
            }
        }

        Ok(None)
    }
}

#[async_trait]
impl Store for FirebaseStore {
    fn kind(&self) -> BackendKind {
        BackendKind::Firebase
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Value>> {
        let tree = self.read(&[collection.name()]).await?;
        Ok(children(tree).into_iter().map(|(_, doc)| doc).collect())
    }

    async fn get(&self, collection: Collection, key: &dyn RecordKey) -> Result<Option<Value>> {
        let key = key.storage_key();
        let doc = self.read(&[collection.name(), key.as_str()]).await?;
        Ok(Some(doc).filter(|doc| !doc.is_null()))
    }

    async fn find_by(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>> {
        let matched = self.query_equal(collection, field, value).await?;
        Ok(matched.into_iter().map(|(_, doc)| doc).collect())
    }

    async fn put(&self, collection: Collection, key: &dyn RecordKey, doc: Value) -> Result<()> {
        let key = key.storage_key();
        self.write(Method::PUT, &[collection.name(), key.as_str()], &doc).await
    }

    async fn merge(
        &self,
        collection: Collection,
        key: &dyn RecordKey,
        fields: Map<String, Value>,
    ) -> Result<Option<Value>> {
        // PATCH on a missing node would create a partial record.
        if self.get(collection, key).await?.is_none() {
            return Ok(None);
        }

        if !fields.is_empty() {
            let path = key.storage_key();
            self.write(Method::PATCH, &[collection.name(), path.as_str()], &Value::Object(fields))
                .await?;
        }

        self.get(collection, key).await
    }

    async fn remove(&self, collection: Collection, key: &dyn RecordKey) -> Result<bool> {
        if self.get(collection, key).await?.is_none() {
            return Ok(false);
        }

        let path = key.storage_key();
        send(self.request(Method::DELETE, &[collection.name(), path.as_str()]).await?).await?;
        Ok(true)
    }

    async fn remove_where(
        &self,
        collection: Collection,
        field: &str,
        value: &Value,
    ) -> Result<usize> {
        let matched = self.query_equal(collection, field, value).await?;
        if matched.is_empty() {
            return Ok(0);
        }

        let updates: Map<String, Value> = matched
            .iter()
            .map(|(key, _)| (format!("{}/{}", collection.name(), key), Value::Null))
            .collect();

        self.write(Method::PATCH, &[], &Value::Object(updates)).await?;
        tracing::debug!("Removed {} {} where {} = {}", matched.len(), collection, field, value);
        Ok(matched.len())
    }

    async fn next_id(&self, collection: Collection) -> Result<i64> {
        match self.increment_counter(collection).await {
            Ok(Some(id)) => Ok(id),
            Ok(None) => {
                tracing::warn!(
                    "Counter for {} still contended after {} attempts, falling back to scan",
                    collection,
                    COUNTER_ATTEMPTS
                );
                self.scan_next_id(collection).await
            }
            Err(e) => {
                tracing::warn!("Counter for {} failed ({}), falling back to scan", collection, e);
                self.scan_next_id(collection).await
            }
        }
    }

    async fn clear(&self) -> Result<()> {
        send(self.request(Method::DELETE, &[]).await?).await?;
        Ok(())
    }
}

fn default_database_url(project_id: &str) -> String {
    format!("https://{}-default-rtdb.firebaseio.com", project_id)
}

async fn send(builder: RequestBuilder) -> Result<Response> {
    let response = builder.send().await?;
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(StoreError::Remote {
        status: status.as_u16(),
        body,
    })
}

fn etag_of(response: &Response) -> Result<String> {
    response
        .headers()
        .get(reqwest::header::ETAG)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| StoreError::Remote {
            status: response.status().as_u16(),
            body: "response carried no ETag".to_string(),
        })
}

/// Children of a node as `(key, value)` pairs.
///
/// Nodes whose keys are all small integers come back as JSON arrays with
/// `null` holes; those are turned back into keyed children.
fn children(node: Value) -> Vec<(String, Value)> {
    match node {
        Value::Object(map) => map.into_iter().filter(|(_, doc)| !doc.is_null()).collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, doc)| !doc.is_null())
            .map(|(index, doc)| (index.to_string(), doc))
            .collect(),
        _ => Vec::new(),
    }
}
