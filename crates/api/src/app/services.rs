//! Store wiring shared by every handler.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;

use flashcart_cart::CartStore;
use flashcart_checkout::CheckoutService;
use flashcart_core::DomainResult;
use flashcart_inventory::InventoryStore;
use flashcart_observability::metrics::ProcessClock;

use crate::app::errors;
use crate::config::Config;

/// The three stores plus the orchestrator that ties them together.
#[derive(Debug)]
pub struct AppServices {
    pub checkout: CheckoutService,
    pub clock: ProcessClock,
}

impl AppServices {
    pub fn inventory(&self) -> &InventoryStore {
        self.checkout.inventory()
    }

    pub fn carts(&self) -> &CartStore {
        self.checkout.carts()
    }

}

/// Run a core call off the async runtime.
///
/// Every store operation may sleep (injected delays are blocking), so it must
/// not run on a runtime worker.
pub async fn blocking<T, F>(services: &Arc<AppServices>, call: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce(&AppServices) -> DomainResult<T> + Send + 'static,
{
    let services = Arc::clone(services);
    match tokio::task::spawn_blocking(move || call(services.as_ref())).await {
        Ok(result) => result.map_err(errors::domain_error_to_response),
        Err(join) => {
            tracing::error!(error = %join, "core call panicked or was cancelled");
            Err(errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "internal error",
            ))
        }
    }
}

/// Build the stores and seed the sample catalog.
pub fn build_services(config: &Config) -> AppServices {
    let inventory = Arc::new(InventoryStore::with_sample_catalog(
        config.catalog_size,
        config.delays.clone(),
    ));
    let carts = Arc::new(CartStore::new(config.delays.clone()));
    let checkout = CheckoutService::new(inventory, carts, config.delays.clone());

    tracing::info!(
        catalog_size = config.catalog_size,
        delays_disabled = config.delays.is_disabled(),
        "services ready"
    );

    AppServices {
        checkout,
        clock: ProcessClock::start(),
    }
}
