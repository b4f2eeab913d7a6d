use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::backend::SharedBackend;
use crate::cart_actor::CartService;
use crate::clients::{CartClient, MenuClient, OrderClient, TrackerClient};
use crate::config::ClientConfig;
use crate::notifier::SharedNotifier;
use crate::tracker_actor::{FetchSettings, TrackerService};

// =============================================================================
// ORDER SYSTEM
// =============================================================================

/// The application core: starts the services, wires the clients together, and shuts
/// everything down.
///
/// Polling is not started here; the app layer calls
/// [`TrackerClient::start_polling`] when the order view becomes active.
pub struct OrderSystem {
    pub cart_client: CartClient,
    pub menu_client: MenuClient,
    pub order_client: OrderClient,
    pub tracker_client: TrackerClient,
    handles: Vec<JoinHandle<()>>,
}

impl OrderSystem {
    pub fn new(config: &ClientConfig, backend: SharedBackend, notifier: SharedNotifier) -> Self {
        info!(api = %config.api_base_url, policy = ?config.cart_policy, "Starting order system");

        // A zero-capacity channel cannot be created
        let buffer = config.channel_buffer.max(1);

        // 1. Cart
        let (cart_service, cart_client) = CartService::new(buffer, config.cart_policy);
        let cart_handle = tokio::spawn(cart_service.run());

        // 2. Order tracker
        let (tracker_service, tracker_client) = TrackerService::new(
            buffer,
            backend.clone(),
            notifier.clone(),
            FetchSettings::from(config),
        );
        let tracker_handle = tokio::spawn(tracker_service.run());

        // 3. Stateless orchestration clients
        let menu_client = MenuClient::new(backend.clone(), cart_client.clone());
        let order_client =
            OrderClient::new(backend, cart_client.clone(), tracker_client.clone(), notifier, config);

        Self {
            cart_client,
            menu_client,
            order_client,
            tracker_client,
            handles: vec![cart_handle, tracker_handle],
        }
    }

    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");
        // A failed send means the service is already gone, which is what we want.
        let _ = self.tracker_client.shutdown().await;
        let _ = self.cart_client.shutdown().await;

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Service task failed: {:?}", e);
                return Err(format!("Service task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
