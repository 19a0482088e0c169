use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::MapConfig;
use crate::map::{LatLng, MapLayerManager};
use crate::port::{NearbyListItem, ViewPort};

/// Session context shared by both controllers: the map overlay model, the
/// view port and the map settings. Created once and passed around by `Arc`.
pub struct MapSession {
    layers: RwLock<MapLayerManager>,
    view: Arc<dyn ViewPort>,
    settings: MapConfig,
}

impl MapSession {
    pub fn new(settings: MapConfig, view: Arc<dyn ViewPort>) -> Arc<Self> {
        let [lat, lng] = settings.center;
        Arc::new(Self {
            layers: RwLock::new(MapLayerManager::new(LatLng::new(lat, lng), settings.zoom)),
            view,
            settings,
        })
    }

    pub async fn layers(&self) -> RwLockReadGuard<'_, MapLayerManager> {
        self.layers.read().await
    }

    pub(crate) async fn layers_mut(&self) -> RwLockWriteGuard<'_, MapLayerManager> {
        self.layers.write().await
    }

    pub fn view(&self) -> Arc<dyn ViewPort> {
        self.view.clone()
    }

    pub fn settings(&self) -> &MapConfig {
        &self.settings
    }

    /// Re-centre on a listed station and open its popup.
    ///
    /// Returns `false` when the item's marker is gone, i.e. a newer search
    /// replaced the list the item came from.
    pub async fn focus(&self, item: &NearbyListItem) -> bool {
        let mut layers = self.layers.write().await;
        if layers.marker(item.marker).is_none() {
            tracing::debug!("Ignoring focus on stale station '{}'", item.station.name);
            return false;
        }
        layers.set_view(item.position(), self.settings.focus_zoom);
        layers.open_popup(item.marker)
    }
}
