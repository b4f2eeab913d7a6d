use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_API_BASE_URL: &str = "https://autochefsystem.azurewebsites.net/api";

/// How the cart treats a second, different recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CartPolicy {
    /// One distinct recipe at a time; adding another is rejected.
    #[default]
    SingleItem,
    /// Any number of lines; re-adding a recipe bumps its quantity.
    Merge,
}

impl FromStr for CartPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "single_item" | "single-item" => Ok(CartPolicy::SingleItem),
            "merge" => Ok(CartPolicy::Merge),
            other => Err(format!("unknown cart policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub page_size: u32,
    pub max_pages: u32,
    pub cart_policy: CartPolicy,
    pub location_id: i64,
    pub robot_id: i64,
    pub channel_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            poll_interval: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            page_size: 10,
            max_pages: 10,
            cart_policy: CartPolicy::SingleItem,
            location_id: 1,
            robot_id: 1,
            channel_buffer: 32,
        }
    }
}

impl ClientConfig {
    pub fn new_from_env_or_default() -> Self {
        let defaults = Self::default();
        let api_base_url = std::env::var("AUTOCHEF_API_BASE_URL").unwrap_or_else(|_| {
            warn!("AUTOCHEF_API_BASE_URL not set, using {}", defaults.api_base_url);
            defaults.api_base_url.clone()
        });
        let channel_buffer = match env_or("AUTOCHEF_CHANNEL_BUFFER", defaults.channel_buffer) {
            0 => {
                warn!("AUTOCHEF_CHANNEL_BUFFER must be positive, using {}", defaults.channel_buffer);
                defaults.channel_buffer
            }
            n => n,
        };
        Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            poll_interval: Duration::from_millis(env_or("AUTOCHEF_POLL_INTERVAL_MS", 5_000)),
            request_timeout: Duration::from_millis(env_or("AUTOCHEF_REQUEST_TIMEOUT_MS", 10_000)),
            page_size: env_or("AUTOCHEF_PAGE_SIZE", defaults.page_size),
            max_pages: env_or("AUTOCHEF_MAX_PAGES", defaults.max_pages),
            cart_policy: env_or("AUTOCHEF_CART_POLICY", defaults.cart_policy),
            location_id: env_or("AUTOCHEF_LOCATION_ID", defaults.location_id),
            robot_id: env_or("AUTOCHEF_ROBOT_ID", defaults.robot_id),
            channel_buffer,
        }
    }
}

/// Reads and parses `key`, falling back to `default` (with a warning) on absence or junk.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(value) => value,
            Err(e) => {
                warn!("{key}={raw} is invalid ({e}), using {default:?}");
                default
            }
        },
        Err(_) => default,
    }
}
