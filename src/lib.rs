//! # autochef-client
//!
//! The client-side core of the AutoChef ordering app: a cart, checkout, and an order
//! tracker that turns backend status changes into user notifications. Screens and the
//! platform notification service sit outside this crate and talk to it through the
//! client handles.
//!
//! ## Layout
//!
//! - **Domain types** - recipes, cart lines, orders and notifications → [`domain`]
//! - **Services** - single-owner actors with instrumented handlers
//!     - [`CartService`] holds the cart and publishes every change
//!     - [`TrackerService`] owns the order snapshot, polls, diffs and notifies
//! - **Clients** - cloneable handles generated with the `client_method!` macro →
//!   [`CartClient`], [`TrackerClient`]; orchestration clients [`OrderClient`] (checkout,
//!   cancel) and [`MenuClient`]
//! - **Backend** - the [`OrderBackend`] seam and its `reqwest` implementation
//!   [`RestBackend`]
//! - **System** - [`OrderSystem`] wires it all up; [`setup_tracing`] configures logging
//!
//! ## Example
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use autochef_client::*;
//! # async fn demo() -> anyhow::Result<()> {
//! let config = ClientConfig::new_from_env_or_default();
//! let backend = Arc::new(RestBackend::new(&config)?);
//! let system = OrderSystem::new(&config, backend, Arc::new(TracingNotifier));
//!
//! system.menu_client.add_to_cart(1, 1, Some("no onions".into())).await?;
//! system.order_client.checkout().await?;
//!
//! let polling = system.tracker_client.start_polling(config.poll_interval).await?;
//! // ... later, when the order screen goes away
//! system.tracker_client.stop_polling(&polling).await;
//! system.shutdown().await.map_err(anyhow::Error::msg)?;
//! # Ok(())
//! # }
//! ```

pub mod app_system;
pub mod backend;
pub mod cart_actor;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod messages;
pub mod notifier;
pub mod tracker_actor;

#[cfg(test)]
mod mock_framework;

pub use app_system::{setup_tracing, OrderSystem};
pub use backend::{OrderBackend, RestBackend, SharedBackend};
pub use cart_actor::CartService;
pub use clients::{CartClient, MenuClient, OrderClient, PollingHandle, TrackerClient};
pub use config::{CartPolicy, ClientConfig};
pub use error::{CartError, FetchError, OrderError, TrackerError};
pub use notifier::{ChannelNotifier, Notifier, SharedNotifier, TracingNotifier};
pub use tracker_actor::TrackerService;
