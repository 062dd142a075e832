use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http::Uri;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::model::ModelDefinition;
use crate::telemetry::{DataPoint, Timestamp, ValueSample};
use crate::types::{ApiKey, AssetId, EntryId, ModelId, PropertyId, ResourceStatus};
use crate::util::uri::{make_uri, UriError};

use super::http::{Auth, Client, ClientError, StatusCode};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid endpoint URI: {0}")]
    Endpoint(#[from] UriError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("history sample timestamp is outside the representable range")]
    InvalidTimestamp,
}

impl ApiError {
    /// Whether a retry has a chance of succeeding: transport failures,
    /// throttling and server-side errors. Anything else is permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Client(ClientError::Transport(_)) => true,
            ApiError::Client(ClientError::Status { status, .. }) => {
                status.is_server_error()
                    || *status == StatusCode::REQUEST_TIMEOUT
                    || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

// List summaries also carry a status field; only the name lookup and the
// id are consumed here so the rest of the payload is ignored.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub id: ModelId,
    pub name: String,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PropertyRole {
    Measurement,
    Transform,
    Metric,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PropertySummary {
    pub id: PropertyId,
    pub name: String,
    pub kind: PropertyRole,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescription {
    pub id: ModelId,
    pub name: String,
    pub status: ResourceStatus,
    pub properties: Vec<PropertySummary>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssetSummary {
    pub id: AssetId,
    pub name: String,
}

// Describe also returns the asset's id, name and bound model; the
// lifecycle polls only consume the status.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AssetDescription {
    pub status: ResourceStatus,
}

/// One entry of a batched write: a page of points addressed to a single
/// asset property, tagged with a fresh idempotency identifier.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BatchEntry {
    pub entry: EntryId,
    pub asset: AssetId,
    pub property: PropertyId,
    pub values: Vec<DataPoint>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct BatchPutRequest {
    pub entries: Vec<BatchEntry>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EntryFailure {
    pub entry: EntryId,
    pub code: String,
    pub message: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchPutResponse {
    #[serde(default)]
    pub failures: Vec<EntryFailure>,
}

#[derive(Deserialize, Debug)]
struct ModelList {
    models: Vec<ModelSummary>,
}

#[derive(Deserialize, Debug)]
struct AssetList {
    assets: Vec<AssetSummary>,
}

#[derive(Deserialize, Debug)]
struct Created {
    id: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CreateAsset<'a> {
    name: &'a str,
    model: &'a ModelId,
}

#[derive(Deserialize, Debug)]
struct History {
    values: Vec<TimedValue>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct TimedValue {
    timestamp: Timestamp,
    value: f64,
}

/// Operations the remote telemetry service exposes.
///
/// Describe calls return `Ok(None)` when the resource does not exist:
/// absence is data here, not an error, because deletion completion is
/// only observable as a describe that stops finding the resource.
/// Delete calls are idempotent and treat an already-absent target as
/// success for the same reason.
#[async_trait]
pub trait AssetApi {
    async fn list_models(&self) -> Result<Vec<ModelSummary>, ApiError>;

    async fn create_model(&self, definition: &ModelDefinition) -> Result<ModelId, ApiError>;

    async fn describe_model(&self, id: &ModelId) -> Result<Option<ModelDescription>, ApiError>;

    async fn delete_model(&self, id: &ModelId) -> Result<(), ApiError>;

    async fn list_assets(&self, model: &ModelId) -> Result<Vec<AssetSummary>, ApiError>;

    async fn create_asset(&self, name: &str, model: &ModelId) -> Result<AssetId, ApiError>;

    async fn describe_asset(&self, id: &AssetId) -> Result<Option<AssetDescription>, ApiError>;

    async fn delete_asset(&self, id: &AssetId) -> Result<(), ApiError>;

    async fn put_batch(&self, batch: &BatchPutRequest) -> Result<BatchPutResponse, ApiError>;

    async fn history(
        &self,
        asset: &AssetId,
        property: &PropertyId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<ValueSample>, ApiError>;
}

/// [AssetApi] implementation speaking the remote's REST surface.
pub struct HttpApi {
    client: Client,
    endpoint: Uri,
}

impl HttpApi {
    pub fn new(endpoint: Uri, timeout: Duration, api_key: Option<ApiKey>) -> Self {
        let client = Client::new(timeout).auth(api_key.map(|key| Auth::Bearer {
            token: key.to_string(),
        }));
        Self { client, endpoint }
    }

    fn uri(&self, path: &str) -> Result<Uri, ApiError> {
        Ok(make_uri(self.endpoint.clone(), path, None)?)
    }

    fn uri_with_query(&self, path: &str, query: &str) -> Result<Uri, ApiError> {
        Ok(make_uri(self.endpoint.clone(), path, Some(query))?)
    }
}

fn absent_on_not_found<T>(result: Result<T, ClientError>) -> Result<Option<T>, ApiError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(ClientError::Status {
            status: StatusCode::NOT_FOUND,
            ..
        }) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn done_on_not_found(result: Result<(), ClientError>) -> Result<(), ApiError> {
    match result {
        Ok(())
        | Err(ClientError::Status {
            status: StatusCode::NOT_FOUND,
            ..
        }) => Ok(()),
        Err(err) => Err(err.into()),
    }
}

#[async_trait]
impl AssetApi for HttpApi {
    async fn list_models(&self) -> Result<Vec<ModelSummary>, ApiError> {
        let uri = self.uri("/v1/models")?;
        let list: ModelList = self.client.get(&uri).await?;
        Ok(list.models)
    }

    async fn create_model(&self, definition: &ModelDefinition) -> Result<ModelId, ApiError> {
        let uri = self.uri("/v1/models")?;
        let created: Created = self.client.post(&uri, definition).await?;
        Ok(created.id.into())
    }

    async fn describe_model(&self, id: &ModelId) -> Result<Option<ModelDescription>, ApiError> {
        let uri = self.uri(&format!("/v1/models/{id}"))?;
        absent_on_not_found(self.client.get(&uri).await)
    }

    async fn delete_model(&self, id: &ModelId) -> Result<(), ApiError> {
        let uri = self.uri(&format!("/v1/models/{id}"))?;
        done_on_not_found(self.client.delete(&uri).await)
    }

    async fn list_assets(&self, model: &ModelId) -> Result<Vec<AssetSummary>, ApiError> {
        let uri = self.uri_with_query("/v1/assets", &format!("model={model}"))?;
        let list: AssetList = self.client.get(&uri).await?;
        Ok(list.assets)
    }

    async fn create_asset(&self, name: &str, model: &ModelId) -> Result<AssetId, ApiError> {
        let uri = self.uri("/v1/assets")?;
        let created: Created = self.client.post(&uri, &CreateAsset { name, model }).await?;
        Ok(created.id.into())
    }

    async fn describe_asset(&self, id: &AssetId) -> Result<Option<AssetDescription>, ApiError> {
        let uri = self.uri(&format!("/v1/assets/{id}"))?;
        absent_on_not_found(self.client.get(&uri).await)
    }

    async fn delete_asset(&self, id: &AssetId) -> Result<(), ApiError> {
        let uri = self.uri(&format!("/v1/assets/{id}"))?;
        done_on_not_found(self.client.delete(&uri).await)
    }

    async fn put_batch(&self, batch: &BatchPutRequest) -> Result<BatchPutResponse, ApiError> {
        let uri = self.uri("/v1/telemetry")?;
        Ok(self.client.post(&uri, batch).await?)
    }

    async fn history(
        &self,
        asset: &AssetId,
        property: &PropertyId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<ValueSample>, ApiError> {
        let uri = self.uri_with_query(
            &format!("/v1/assets/{asset}/properties/{property}/history"),
            &format!(
                "start={}&end={}&limit={limit}",
                start.timestamp(),
                end.timestamp()
            ),
        )?;
        let history: History = self.client.get(&uri).await?;

        history
            .values
            .into_iter()
            .map(|sample| {
                sample
                    .timestamp
                    .to_utc()
                    .map(|timestamp| ValueSample {
                        timestamp,
                        value: sample.value,
                    })
                    .ok_or(ApiError::InvalidTimestamp)
            })
            .collect()
    }
}
