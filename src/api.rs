//! Client for the storefront's hosted REST backend.
//!
//! Requests go through a [`Transport`], so widgets and tests can run against
//! any HTTP stack (or none). Replies are reduced to the payload on success or
//! to a displayable message on failure.

use crate::config::{ApiGroups, StoreConfig};
use crate::models::{
    Address, Cart, CepLookup, DeliveryQuote, Order, Profile, ReviewDraft, SignupForm,
};
use crate::session::AuthToken;
use crate::validation::{ValidationError, validate_cep};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Shown when the backend fails without a message of its own.
pub const FALLBACK_MESSAGE: &str = "Ocorreu um erro inesperado. Tente novamente.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    /// Value of the `Authorization` header, if any.
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiReply {
    pub status: u16,
    pub body: Value,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// HTTP 401; the page should send the user to the login screen.
    #[error("Sua sessão expirou. Faça login novamente.")]
    Unauthorized,

    /// Any other failure reported by the backend, with its message.
    #[error("{0}")]
    Backend(String),

    #[error("Não foi possível conectar ao servidor: {0}")]
    Network(String),

    #[error("Resposta inesperada do servidor: {0}")]
    Decode(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        ApiError::Network(e.0)
    }
}

/// Sends one HTTP request and returns the status and decoded JSON body.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: ApiRequest) -> Result<ApiReply, TransportError>;
}

/// Reduces a reply to its payload or to an [`ApiError`].
pub fn decode_reply<R: DeserializeOwned>(reply: ApiReply) -> Result<R, ApiError> {
    match reply.status {
        200..=299 => {
            serde_json::from_value(reply.body).map_err(|e| ApiError::Decode(e.to_string()))
        }
        401 => Err(ApiError::Unauthorized),
        _ => {
            let message = reply
                .body
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(FALLBACK_MESSAGE);
            Err(ApiError::Backend(message.to_string()))
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Group {
    Cart,
    Auth,
    Orders,
    Addresses,
    Reviews,
    Delivery,
}

/// Builds endpoint URLs from the configured base and group segments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
    groups: ApiGroups,
}

impl Endpoints {
    pub fn new(config: &StoreConfig) -> Self {
        Endpoints {
            base: config.api_base.trim_end_matches('/').to_string(),
            groups: config.groups.clone(),
        }
    }

    pub fn url(&self, group: Group, path: &str) -> String {
        let segment = match group {
            Group::Cart => &self.groups.cart,
            Group::Auth => &self.groups.auth,
            Group::Orders => &self.groups.orders,
            Group::Addresses => &self.groups.addresses,
            Group::Reviews => &self.groups.reviews,
            Group::Delivery => &self.groups.delivery,
        };
        format!(
            "{}/{}/{}",
            self.base,
            segment.trim_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[derive(Deserialize)]
struct LoginReply {
    #[serde(rename = "authToken")]
    auth_token: String,
}

pub struct Client<T> {
    transport: T,
    endpoints: Endpoints,
    token: Option<AuthToken>,
    cep_lookup_url: String,
    cep_lookup_attempts: u32,
}

impl<T: Transport> Client<T> {
    pub fn new(transport: T, config: &StoreConfig) -> Self {
        Client {
            transport,
            endpoints: Endpoints::new(config),
            token: None,
            cep_lookup_url: config.cep_lookup_url.clone(),
            cep_lookup_attempts: config.cep_lookup_attempts.max(1),
        }
    }

    pub fn with_token(mut self, token: Option<AuthToken>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: Option<AuthToken>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&AuthToken> {
        self.token.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn call<R: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        body: Option<Value>,
    ) -> Result<R, ApiError> {
        debug!("{:?} {}", method, url);
        let request = ApiRequest {
            method,
            url,
            authorization: self.token.as_ref().map(AuthToken::authorization),
            body,
        };
        let reply = self.transport.send(request).await?;
        debug!("-> {}", reply.status);
        decode_reply(reply)
    }

    // --- Cart ---

    pub async fn get_cart(&self) -> Result<Cart, ApiError> {
        let url = self.endpoints.url(Group::Cart, "cart");
        self.call(Method::Get, url, None).await
    }

    pub async fn add_to_cart(&self, sku_id: i64, quantity: i64) -> Result<Cart, ApiError> {
        let url = self.endpoints.url(Group::Cart, "cart/add_item");
        let body = json!({ "sku_id": sku_id, "quantity": quantity });
        self.call(Method::Post, url, Some(body)).await
    }

    pub async fn update_cart_item(&self, sku_id: i64, quantity: i64) -> Result<Cart, ApiError> {
        let url = self.endpoints.url(Group::Cart, "cart/item");
        let body = json!({ "sku_id": sku_id, "quantity": quantity });
        self.call(Method::Patch, url, Some(body)).await
    }

    pub async fn remove_cart_item(&self, sku_id: i64) -> Result<Cart, ApiError> {
        let url = self.endpoints.url(Group::Cart, &format!("cart/item/{}", sku_id));
        self.call(Method::Delete, url, None).await
    }

    // --- Auth ---

    /// Logs in and keeps the returned token for later calls.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthToken, ApiError> {
        let url = self.endpoints.url(Group::Auth, "auth/login");
        let body = json!({ "email": email.trim(), "password": password });
        let reply: LoginReply = self.call(Method::Post, url, Some(body)).await?;
        let token = AuthToken::new(reply.auth_token);
        self.token = Some(token.clone());
        Ok(token)
    }

    pub async fn signup(&mut self, form: &SignupForm) -> Result<AuthToken, ApiError> {
        let url = self.endpoints.url(Group::Auth, "auth/signup");
        let body = serde_json::to_value(form).map_err(|e| ApiError::Decode(e.to_string()))?;
        let reply: LoginReply = self.call(Method::Post, url, Some(body)).await?;
        let token = AuthToken::new(reply.auth_token);
        self.token = Some(token.clone());
        Ok(token)
    }

    pub async fn get_profile(&self) -> Result<Profile, ApiError> {
        let url = self.endpoints.url(Group::Auth, "auth/me");
        self.call(Method::Get, url, None).await
    }

    pub async fn update_profile(&self, profile: &Profile) -> Result<Profile, ApiError> {
        let url = self.endpoints.url(Group::Auth, "user");
        let body = serde_json::to_value(profile).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.call(Method::Patch, url, Some(body)).await
    }

    // --- Orders ---

    pub async fn list_orders(&self) -> Result<Vec<Order>, ApiError> {
        let url = self.endpoints.url(Group::Orders, "orders");
        self.call(Method::Get, url, None).await
    }

    /// Puts every item of a past order back into the cart.
    pub async fn buy_again(&self, order_id: i64) -> Result<Cart, ApiError> {
        let url = self
            .endpoints
            .url(Group::Orders, &format!("orders/{}/buy_again", order_id));
        self.call(Method::Post, url, None).await
    }

    // --- Addresses ---

    pub async fn list_addresses(&self) -> Result<Vec<Address>, ApiError> {
        let url = self.endpoints.url(Group::Addresses, "addresses");
        self.call(Method::Get, url, None).await
    }

    pub async fn create_address(&self, address: &Address) -> Result<Address, ApiError> {
        validate_cep(&address.cep)?;
        let url = self.endpoints.url(Group::Addresses, "addresses");
        let body = serde_json::to_value(address).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.call(Method::Post, url, Some(body)).await
    }

    pub async fn delete_address(&self, address_id: i64) -> Result<(), ApiError> {
        let url = self
            .endpoints
            .url(Group::Addresses, &format!("addresses/{}", address_id));
        let _: Value = self.call(Method::Delete, url, None).await?;
        Ok(())
    }

    /// Looks up street, neighborhood and city for a CEP.
    ///
    /// Retries up to the configured number of attempts whatever the cause of
    /// the failure, including an unknown CEP. The last error is returned.
    pub async fn lookup_cep(&self, cep: &str) -> Result<CepLookup, ApiError> {
        let digits = validate_cep(cep)?;
        let url = self.cep_lookup_url.replace("{cep}", &digits);

        let mut last_error = ApiError::Backend(FALLBACK_MESSAGE.to_string());
        for attempt in 1..=self.cep_lookup_attempts {
            let request = ApiRequest {
                method: Method::Get,
                url: url.clone(),
                authorization: None,
                body: None,
            };
            let result = match self.transport.send(request).await {
                Ok(reply) => decode_reply::<CepLookup>(reply),
                Err(e) => Err(e.into()),
            };
            match result {
                Ok(lookup) if !lookup.not_found => return Ok(lookup),
                Ok(_) => last_error = ApiError::Backend("CEP não encontrado.".to_string()),
                Err(e) => last_error = e,
            }
            warn!(
                "CEP lookup attempt {}/{} failed: {}",
                attempt, self.cep_lookup_attempts, last_error
            );
        }
        Err(last_error)
    }

    // --- Reviews ---

    pub async fn submit_review(&self, review: &ReviewDraft) -> Result<(), ApiError> {
        let url = self.endpoints.url(Group::Reviews, "reviews");
        let body = serde_json::to_value(review).map_err(|e| ApiError::Decode(e.to_string()))?;
        let _: Value = self.call(Method::Post, url, Some(body)).await?;
        Ok(())
    }

    // --- Delivery ---

    pub async fn quote_delivery(&self, cep: &str) -> Result<DeliveryQuote, ApiError> {
        let digits = validate_cep(cep)?;
        let url = self.endpoints.url(Group::Delivery, "delivery/quote");
        self.call(Method::Post, url, Some(json!({ "cep": digits }))).await
    }
}
