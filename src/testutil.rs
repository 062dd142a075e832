use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http::Uri;

use crate::config::Config;
use crate::ingest::IngestPolicy;
use crate::lifecycle::PollPolicy;
use crate::model::ModelDefinition;
use crate::remote::{
    ApiError, AssetApi, AssetDescription, AssetSummary, BatchPutRequest, BatchPutResponse,
    ClientError, ModelDescription, ModelSummary, StatusCode,
};
use crate::telemetry::ValueSample;
use crate::types::{AssetId, ModelId, PropertyId, ResourceStatus};

/// Configuration for tests, with a zero-width history window so the
/// watch loop exits immediately.
pub fn test_config() -> Config {
    Config {
        api_endpoint: Uri::from_static("http://localhost:8080"),
        api_key: None,
        model_name: "demo-model".to_string(),
        asset_name: "demo-asset".to_string(),
        request_timeout: Duration::from_secs(10),
        lifecycle: PollPolicy::default(),
        ingest: IngestPolicy::default(),
        history_poll_interval: Duration::from_secs(10),
        history_window: Duration::ZERO,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListModels,
    CreateModel,
    DescribeModel(ModelId),
    DeleteModel(ModelId),
    ListAssets(ModelId),
    CreateAsset(String),
    DescribeAsset(AssetId),
    DeleteAsset(AssetId),
    PutBatch,
    History(PropertyId),
}

/// Scripted in-memory stand-in for the remote service.
///
/// Describe responses are popped from per-resource queues; once a queue
/// runs dry the steady-state value is returned instead. Every call is
/// recorded so tests can assert on ordering.
#[derive(Default)]
pub struct FakeApi {
    pub models: Mutex<Vec<ModelSummary>>,
    pub assets: Mutex<Vec<AssetSummary>>,
    pub model_describes: Mutex<VecDeque<Result<Option<ModelDescription>, ApiError>>>,
    pub model_steady: Mutex<Option<ModelDescription>>,
    pub asset_describes: Mutex<VecDeque<Result<Option<AssetDescription>, ApiError>>>,
    pub asset_steady: Mutex<Option<AssetDescription>>,
    pub batch_responses: Mutex<VecDeque<BatchPutResponse>>,
    pub history_responses: Mutex<VecDeque<Vec<ValueSample>>>,
    pub batches: Mutex<Vec<BatchPutRequest>>,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeApi {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn transient_error() -> ApiError {
        ClientError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: "try again later".to_string(),
        }
        .into()
    }

    pub fn permanent_error() -> ApiError {
        ClientError::Status {
            status: StatusCode::BAD_REQUEST,
            body: "malformed request".to_string(),
        }
        .into()
    }

    pub fn model_summary(id: &str, name: &str) -> ModelSummary {
        ModelSummary {
            id: id.into(),
            name: name.to_string(),
        }
    }

    pub fn model_description(id: &str, status: ResourceStatus) -> ModelDescription {
        ModelDescription {
            id: id.into(),
            name: "demo-model".to_string(),
            status,
            properties: Vec::new(),
        }
    }

    pub fn asset_summary(id: &str) -> AssetSummary {
        AssetSummary {
            id: id.into(),
            name: "demo-asset".to_string(),
        }
    }

    pub fn asset_description(status: ResourceStatus) -> AssetDescription {
        AssetDescription { status }
    }
}

#[async_trait]
impl AssetApi for FakeApi {
    async fn list_models(&self) -> Result<Vec<ModelSummary>, ApiError> {
        self.record(Call::ListModels);
        Ok(self.models.lock().unwrap().clone())
    }

    async fn create_model(&self, _definition: &ModelDefinition) -> Result<ModelId, ApiError> {
        self.record(Call::CreateModel);
        Ok("m-1".into())
    }

    async fn describe_model(&self, id: &ModelId) -> Result<Option<ModelDescription>, ApiError> {
        self.record(Call::DescribeModel(id.clone()));
        if let Some(scripted) = self.model_describes.lock().unwrap().pop_front() {
            return scripted;
        }
        Ok(self.model_steady.lock().unwrap().clone())
    }

    async fn delete_model(&self, id: &ModelId) -> Result<(), ApiError> {
        self.record(Call::DeleteModel(id.clone()));
        Ok(())
    }

    async fn list_assets(&self, model: &ModelId) -> Result<Vec<AssetSummary>, ApiError> {
        self.record(Call::ListAssets(model.clone()));
        Ok(self.assets.lock().unwrap().clone())
    }

    async fn create_asset(&self, name: &str, _model: &ModelId) -> Result<AssetId, ApiError> {
        self.record(Call::CreateAsset(name.to_string()));
        Ok("a-1".into())
    }

    async fn describe_asset(&self, id: &AssetId) -> Result<Option<AssetDescription>, ApiError> {
        self.record(Call::DescribeAsset(id.clone()));
        if let Some(scripted) = self.asset_describes.lock().unwrap().pop_front() {
            return scripted;
        }
        Ok(self.asset_steady.lock().unwrap().clone())
    }

    async fn delete_asset(&self, id: &AssetId) -> Result<(), ApiError> {
        self.record(Call::DeleteAsset(id.clone()));
        Ok(())
    }

    async fn put_batch(&self, batch: &BatchPutRequest) -> Result<BatchPutResponse, ApiError> {
        self.record(Call::PutBatch);
        self.batches.lock().unwrap().push(batch.clone());
        Ok(self
            .batch_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }

    async fn history(
        &self,
        _asset: &AssetId,
        property: &PropertyId,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
        _limit: u32,
    ) -> Result<Vec<ValueSample>, ApiError> {
        self.record(Call::History(property.clone()));
        Ok(self
            .history_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}
