//! Command implementations.

pub mod contact;
pub mod email;
pub mod maintenance;
pub mod settings;

use std::sync::Arc;

use sinertis_site::admin::MaintenanceControl;
use sinertis_site::config::{EmailJsConfig, MaintenanceConfig};
use sinertis_site::email::{TransportChain, TransportSlot};
use sinertis_site::error::AppError;
use sinertis_site::storage::{FileStore, SharedStorage, TabStorage};

/// Open the shared storage file as a fresh tab.
fn open_tab() -> Result<TabStorage, AppError> {
    let config = MaintenanceConfig::from_env()?;
    let store = FileStore::open(&config.storage_path)?;
    tracing::debug!(path = %config.storage_path.display(), "Opened shared storage");
    Ok(SharedStorage::new(Arc::new(store)).open_tab())
}

fn control() -> Result<MaintenanceControl, AppError> {
    Ok(MaintenanceControl::new(open_tab()?))
}

/// Resolve the transport chain and bind the winner.
async fn resolve_slot(config: &EmailJsConfig) -> Result<TransportSlot, AppError> {
    let chain = TransportChain::from_config(config);
    let slot = TransportSlot::resolve(&chain).await?;
    if let Some(tier) = slot.tier() {
        tracing::info!(tier = %tier, "Using email transport");
    }
    Ok(slot)
}
