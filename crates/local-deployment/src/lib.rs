use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use db::DBService;
use deployment::{Deployment, DeploymentError};
use services::services::{
    config::{Config, load_config_from_file, save_config_to_file},
    drafts::DraftService,
    image::ImageService,
    notify::NotifyService,
    storage::StorageService,
};
use tokio::sync::RwLock;
use utils::assets::config_path;

const MAINTENANCE_INTERVAL_ENV: &str = "ROOMERY_MAINTENANCE_INTERVAL_SECS";
const DEFAULT_MAINTENANCE_INTERVAL: Duration = Duration::from_secs(60 * 60);
/// Draft sessions idle longer than this are dropped by the maintenance loop.
const DRAFT_SESSION_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone)]
pub struct LocalDeployment {
    config: Arc<RwLock<Config>>,
    db: DBService,
    storage: StorageService,
    image: ImageService,
    drafts: DraftService,
    notify: NotifyService,
}

struct CoreServices {
    storage: StorageService,
    notify: NotifyService,
}

struct RuntimeServices {
    db: DBService,
    image: ImageService,
    drafts: DraftService,
}

#[async_trait]
impl Deployment for LocalDeployment {
    async fn new() -> Result<Self, DeploymentError> {
        let config = Self::load_runtime_config().await?;
        let core = Self::build_core_services()?;
        let runtime = Self::build_runtime_services(&core).await?;

        let CoreServices { storage, notify } = core;
        let RuntimeServices { db, image, drafts } = runtime;

        let deployment = Self {
            config,
            db,
            storage,
            image,
            drafts,
            notify,
        };

        Ok(deployment)
    }

    fn config(&self) -> &Arc<RwLock<Config>> {
        &self.config
    }

    fn db(&self) -> &DBService {
        &self.db
    }

    fn storage(&self) -> &StorageService {
        &self.storage
    }

    fn image(&self) -> &ImageService {
        &self.image
    }

    fn drafts(&self) -> &DraftService {
        &self.drafts
    }

    fn notify(&self) -> &NotifyService {
        &self.notify
    }
}

impl LocalDeployment {
    /// Loads the config file, then writes it straight back so first runs get
    /// a file on disk and older files pick up current normalization.
    async fn load_runtime_config() -> Result<Arc<RwLock<Config>>, DeploymentError> {
        let raw_config = load_config_from_file(&config_path()).await;
        save_config_to_file(&raw_config, &config_path()).await?;

        Ok(Arc::new(RwLock::new(raw_config)))
    }

    fn build_core_services() -> Result<CoreServices, DeploymentError> {
        Ok(CoreServices {
            storage: StorageService::from_asset_dir()?,
            notify: NotifyService::new(),
        })
    }

    async fn build_runtime_services(
        core: &CoreServices,
    ) -> Result<RuntimeServices, DeploymentError> {
        let db = DBService::new().await?;
        let image = ImageService::new(db.clone(), core.storage.clone());
        let drafts = DraftService::new(db.clone(), image.clone())?;

        Self::spawn_orphaned_image_cleanup(image.clone());
        Self::spawn_draft_session_purge(drafts.clone());

        Ok(RuntimeServices { db, image, drafts })
    }

    /// Sweeps unreferenced uploads at startup and then on every maintenance
    /// tick.
    fn spawn_orphaned_image_cleanup(image_service: ImageService) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(maintenance_interval());
            loop {
                ticker.tick().await;
                tracing::info!("Starting orphaned image cleanup...");
                if let Err(e) = image_service.delete_orphaned_images().await {
                    tracing::error!("Failed to clean up orphaned images: {}", e);
                }
            }
        });
    }

    fn spawn_draft_session_purge(drafts: DraftService) {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(maintenance_interval());
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let dropped = drafts.purge_expired(DRAFT_SESSION_MAX_AGE).await;
                if dropped > 0 {
                    tracing::info!("Dropped {} stale draft sessions", dropped);
                }
            }
        });
    }
}

fn maintenance_interval() -> Duration {
    interval_from(std::env::var(MAINTENANCE_INTERVAL_ENV).ok().as_deref())
}

fn interval_from(raw: Option<&str>) -> Duration {
    raw.and_then(|value| value.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_MAINTENANCE_INTERVAL)
}
