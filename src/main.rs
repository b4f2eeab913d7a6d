use std::sync::Arc;

use tracing::{info, warn, Instrument};

use autochef_client::domain::RecipeId;
use autochef_client::{setup_tracing, ChannelNotifier, ClientConfig, Notifier, OrderSystem, RestBackend, TracingNotifier};

/// Runs the core against the configured backend: lists the menu, optionally orders the
/// recipe id given as the first argument, then tracks orders until Ctrl-C.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    setup_tracing();

    let config = ClientConfig::new_from_env_or_default();
    let backend = Arc::new(RestBackend::new(&config)?);
    let (notifier, mut notifications) = ChannelNotifier::new();
    let system = OrderSystem::new(&config, backend, Arc::new(notifier));

    // Stand-in for the platform notification service.
    let forwarder = tokio::spawn(async move {
        while let Some(notification) = notifications.recv().await {
            TracingNotifier.notify(notification);
        }
    });

    match system.menu_client.menu(1, config.page_size).await {
        Ok(recipes) => {
            for recipe in recipes.iter().filter(|r| r.is_active) {
                info!(recipe_id = recipe.recipe_id, name = %recipe.recipe_name, "On the menu");
            }
        }
        Err(e) => warn!(error = %e, "Could not load menu"),
    }

    if let Some(recipe_id) = std::env::args().nth(1).and_then(|arg| arg.parse::<RecipeId>().ok()) {
        let span = tracing::info_span!("order_placement", recipe_id);
        async {
            match system.menu_client.add_to_cart(recipe_id, 1, None).await {
                Ok(cart) => info!(lines = cart.len(), "Cart ready"),
                Err(e) => warn!(error = %e, "Could not add to cart"),
            }
            match system.order_client.checkout().await {
                Ok(order) => info!(recipe_id = order.recipe_id, "Order placed"),
                Err(e) => warn!(error = %e, "Checkout failed"),
            }
        }
        .instrument(span)
        .await;
    }

    let polling = system.tracker_client.start_polling(config.poll_interval).await?;
    info!("Tracking orders, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    system.tracker_client.stop_polling(&polling).await;
    system.shutdown().await.map_err(anyhow::Error::msg)?;
    forwarder.await?;

    info!("Application completed successfully");
    Ok(())
}
