//! Background geolocation of newly created items.

use std::sync::Arc;

use async_trait::async_trait;
use domain_items::{ItemCreated, ItemError, ItemRepository};
use messaging::{Event, EventHandler, HandlerError};
use tracing::{debug, error, info, warn};

use crate::error::GeoError;
use crate::geocoder::RetryingGeocoder;

/// `item.created` subscriber.
///
/// Each event ends either with the geolocation stored on the item or with a
/// logged failure and the item left untouched. Lookup and store failures are
/// terminal and never surface to the bus; only an undecodable payload does.
pub struct GeoLookupHandler {
    geocoder: Arc<RetryingGeocoder>,
    repository: Arc<dyn ItemRepository>,
}

impl GeoLookupHandler {
    pub fn new(geocoder: Arc<RetryingGeocoder>, repository: Arc<dyn ItemRepository>) -> Self {
        Self {
            geocoder,
            repository,
        }
    }
}

#[async_trait]
impl EventHandler for GeoLookupHandler {
    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        let created: ItemCreated = event.decode()?;
        let item_id = created.item_id;

        let Some(zip_code) = created.zip_code else {
            debug!(%item_id, "Item has no zip code, skipping geolocation");
            return Ok(());
        };

        let geolocation = match self.geocoder.geocode(&zip_code).await {
            Ok(geolocation) => geolocation,
            Err(GeoError::NotFound(_)) => {
                warn!(%item_id, zip_code = %zip_code, "No location for zip code");
                return Ok(());
            }
            Err(GeoError::Exhausted { attempts, last }) => {
                error!(
                    %item_id,
                    zip_code = %zip_code,
                    attempts,
                    error = %last,
                    "Geolocation retries exhausted"
                );
                return Ok(());
            }
            Err(e) => {
                error!(%item_id, zip_code = %zip_code, error = %e, "Geolocation lookup failed");
                return Ok(());
            }
        };

        match self.repository.set_geolocation(item_id, geolocation).await {
            Ok(item) => {
                info!(
                    %item_id,
                    direction = ?item.geolocation.as_ref().map(|g| g.direction_from_new_york),
                    "Item geolocated"
                );
            }
            Err(ItemError::NotFound(_)) => {
                warn!(%item_id, "Item deleted before its geolocation arrived");
            }
            Err(e) => {
                error!(%item_id, error = %e, "Failed to store geolocation");
            }
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "geo_lookup"
    }
}
