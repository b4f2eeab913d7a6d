use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Client,
    RequestBuilder,
    Response,
};
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;
use tracing::{debug, trace};

use super::OrderBackend;
use crate::config::ClientConfig;
use crate::domain::{NewOrder, Order, OrderId, OrderPage, Recipe, RecipeId, RecipePage, StatusUpdate};
use crate::error::FetchError;

/// [`OrderBackend`] over HTTP with `reqwest`.
#[derive(Clone)]
pub struct RestBackend {
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl RestBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| FetchError::Request(format!("could not initialize client: {e}")))?;
        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout,
            client,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(&self, req: RequestBuilder) -> Result<Response, FetchError> {
        let response = req.send().await.map_err(|e| self.request_error(e))?;
        let status = response.status();
        if status.is_success() {
            trace!("REST query successful. {status}");
            return Ok(response);
        }
        let body = response.text().await.map_err(|e| self.request_error(e))?;
        Err(FetchError::Status { status: status.as_u16(), message: error_message(&body, status.as_str()) })
    }

    async fn send_json<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, FetchError> {
        let response = self.send(req).await?;
        response.json::<T>().await.map_err(|e| FetchError::Decode(e.to_string()))
    }

    fn request_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout { timeout_ms: self.timeout.as_millis() as u64 }
        } else if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// Pulls `message` out of a JSON error body, falling back to the raw text.
fn error_message(body: &str, fallback: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

#[async_trait]
impl OrderBackend for RestBackend {
    async fn list_recipes(&self, page: u32, page_size: u32) -> Result<Vec<Recipe>, FetchError> {
        debug!(page, page_size, "Fetching recipes");
        let req = self
            .client
            .get(self.url("/Recipe/all"))
            .query(&[("page", page.to_string()), ("pageSize", page_size.to_string())]);
        let page: RecipePage = self.send_json(req).await?;
        Ok(page.recipes)
    }

    async fn get_recipe(&self, id: RecipeId) -> Result<Recipe, FetchError> {
        debug!(recipe_id = id, "Fetching recipe");
        self.send_json(self.client.get(self.url(&format!("/Recipe/{id}")))).await
    }

    async fn create_order(&self, order: &NewOrder) -> Result<(), FetchError> {
        debug!(recipe_id = order.recipe_id, "Creating order");
        let req = self.client.post(self.url("/Order/create-and-send-to-queue")).json(order);
        self.send(req).await.map(|_| ())
    }

    async fn get_order(&self, id: OrderId) -> Result<Order, FetchError> {
        debug!(order_id = id, "Fetching order");
        self.send_json(self.client.get(self.url(&format!("/Order/{id}")))).await
    }

    async fn update_order_status(&self, update: &StatusUpdate) -> Result<(), FetchError> {
        debug!(order_id = update.order_id, status = %update.status, "Updating order status");
        let req = self.client.put(self.url("/Order/update-order-status")).json(update);
        self.send(req).await.map(|_| ())
    }

    async fn list_orders(&self, page: u32, page_size: u32) -> Result<Vec<Order>, FetchError> {
        debug!(page, page_size, "Fetching orders");
        let req = self.client.get(self.url("/Order/all")).query(&[
            ("sort", "true".to_string()),
            ("page", page.to_string()),
            ("pageSize", page_size.to_string()),
        ]);
        let page: OrderPage = self.send_json(req).await?;
        Ok(page.orders)
    }
}
