use std::fmt::Display;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument, warn};

use crate::model::ModelDefinition;
use crate::remote::{ApiError, AssetApi};
use crate::types::{AssetId, ModelId, ResourceStatus};

/// How lifecycle transitions are waited on.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Pause between consecutive status probes.
    pub interval: Duration,
    /// Hard deadline for any single transition wait.
    pub max_wait: Duration,
    /// Consecutive transient probe failures tolerated before giving up.
    pub max_transient_retries: u32,
    /// Upper bound for the exponential backoff applied between retries.
    pub max_backoff: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            max_wait: Duration::from_secs(300),
            max_transient_retries: 5,
            max_backoff: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("timed out waiting for {resource} to become {goal} after {max_wait:?}")]
    Timeout {
        resource: String,
        goal: &'static str,
        max_wait: Duration,
    },

    #[error("{resource} entered the FAILED state")]
    Failed { resource: String },
}

/// Outcome of one describe probe.
///
/// The remote signals deletion completion by the describe call no longer
/// finding the resource, so absence is a first-class result rather than
/// an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    Found(ResourceStatus),
    Absent,
}

impl Display for Probe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Probe::Found(status) => status.fmt(f),
            Probe::Absent => f.write_str("ABSENT"),
        }
    }
}

enum Resource<'a> {
    Model(&'a ModelId),
    Asset(&'a AssetId),
}

impl Display for Resource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resource::Model(id) => write!(f, "model {id}"),
            Resource::Asset(id) => write!(f, "asset {id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Goal {
    Active,
    Absent,
}

impl Goal {
    fn name(self) -> &'static str {
        match self {
            Goal::Active => "active",
            Goal::Absent => "absent",
        }
    }
}

async fn probe<A: AssetApi + ?Sized>(
    api: &A,
    resource: &Resource<'_>,
) -> Result<Probe, ApiError> {
    let status = match resource {
        Resource::Model(id) => api.describe_model(id).await?.map(|d| d.status),
        Resource::Asset(id) => api.describe_asset(id).await?.map(|d| d.status),
    };
    Ok(status.map(Probe::Found).unwrap_or(Probe::Absent))
}

/// Poll a resource until it reaches the goal state.
///
/// Transient probe failures are retried with exponential backoff and
/// jitter up to the policy's retry budget; every wait is bounded by the
/// policy's hard deadline.
async fn await_goal<A: AssetApi + ?Sized>(
    api: &A,
    resource: Resource<'_>,
    goal: Goal,
    policy: &PollPolicy,
) -> Result<(), LifecycleError> {
    let deadline = Instant::now() + policy.max_wait;
    let mut retries = 0u32;
    let mut backoff = policy.interval;

    loop {
        let delay = match probe(api, &resource).await {
            Ok(state) => {
                retries = 0;
                backoff = policy.interval;
                match (goal, state) {
                    (Goal::Active, Probe::Found(ResourceStatus::Active)) => return Ok(()),
                    (Goal::Active, Probe::Found(ResourceStatus::Failed)) => {
                        return Err(LifecycleError::Failed {
                            resource: resource.to_string(),
                        })
                    }
                    (Goal::Absent, Probe::Absent) => return Ok(()),
                    (_, state) => {
                        debug!("{resource} is {state}, waiting to become {}", goal.name());
                        policy.interval
                    }
                }
            }
            Err(err) if err.is_transient() && retries < policy.max_transient_retries => {
                retries += 1;
                let jitter = Duration::from_millis(rand::random_range(0..=250));
                let delay = backoff + jitter;
                warn!(
                    "probing {resource} failed ({err}), retry {retries}/{} in {delay:?}",
                    policy.max_transient_retries
                );
                backoff = (backoff * 2).min(policy.max_backoff);
                delay
            }
            Err(err) => return Err(err.into()),
        };

        if Instant::now() + delay >= deadline {
            return Err(LifecycleError::Timeout {
                resource: resource.to_string(),
                goal: goal.name(),
                max_wait: policy.max_wait,
            });
        }
        sleep(delay).await;
    }
}

/// Linear scan of the model list for the first exact name match.
pub async fn find_model_by_name<A: AssetApi + ?Sized>(
    api: &A,
    name: &str,
) -> Result<Option<ModelId>, ApiError> {
    let models = api.list_models().await?;
    Ok(models.into_iter().find(|m| m.name == name).map(|m| m.id))
}

/// Submit a model definition and wait until the remote activates it.
#[instrument(skip_all, fields(name = %definition.name), err)]
pub async fn create_model<A: AssetApi + ?Sized>(
    api: &A,
    definition: &ModelDefinition,
    policy: &PollPolicy,
) -> Result<ModelId, LifecycleError> {
    let id = api.create_model(definition).await?;
    info!("model {id} submitted, waiting for it to become active");
    await_goal(api, Resource::Model(&id), Goal::Active, policy).await?;
    info!("model {id} is active");
    Ok(id)
}

/// Create an asset bound to a model and wait until it is active.
#[instrument(skip_all, fields(name = %name), err)]
pub async fn create_asset<A: AssetApi + ?Sized>(
    api: &A,
    name: &str,
    model: &ModelId,
    policy: &PollPolicy,
) -> Result<AssetId, LifecycleError> {
    let id = api.create_asset(name, model).await?;
    info!("asset {id} submitted, waiting for it to become active");
    await_goal(api, Resource::Asset(&id), Goal::Active, policy).await?;
    info!("asset {id} is active");
    Ok(id)
}

/// Delete a model together with every asset still bound to it.
///
/// The remote refuses to delete a model with live assets, so assets go
/// first and the model only after each of them has been observed absent.
/// Deleting a model that does not exist is a no-op.
#[instrument(skip_all, fields(model = %id), err)]
pub async fn delete_model<A: AssetApi + ?Sized>(
    api: &A,
    id: &ModelId,
    policy: &PollPolicy,
) -> Result<(), LifecycleError> {
    if let Probe::Absent = probe(api, &Resource::Model(id)).await? {
        info!("model {id} does not exist, nothing to delete");
        return Ok(());
    }

    let assets = api.list_assets(id).await?;
    for asset in &assets {
        info!("deleting asset {} ({})", asset.id, asset.name);
        api.delete_asset(&asset.id).await?;
    }
    for asset in &assets {
        await_goal(api, Resource::Asset(&asset.id), Goal::Absent, policy).await?;
        info!("asset {} is gone", asset.id);
    }

    api.delete_model(id).await?;
    await_goal(api, Resource::Model(id), Goal::Absent, policy).await?;
    info!("model {id} deleted");
    Ok(())
}
