use std::sync::Arc;

use async_trait::async_trait;
use db::{DBService, DbErr};
use services::services::{
    config::{Config, ConfigError},
    drafts::DraftService,
    image::ImageService,
    notify::NotifyService,
    storage::{StorageError, StorageService},
};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
pub enum DeploymentError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Database(#[from] DbErr),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// The capability surface handlers resolve services through. Handlers never
/// construct a service themselves; everything reachable from a request hangs
/// off this trait.
#[async_trait]
pub trait Deployment: Clone + Send + Sync + 'static {
    async fn new() -> Result<Self, DeploymentError>;

    fn config(&self) -> &Arc<RwLock<Config>>;

    fn db(&self) -> &DBService;

    fn storage(&self) -> &StorageService;

    fn image(&self) -> &ImageService;

    fn drafts(&self) -> &DraftService;

    fn notify(&self) -> &NotifyService;
}
