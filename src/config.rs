use serde::{Deserialize, Serialize};
use std::env;

/// Path segment of each backend API group, appended to `api_base`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiGroups {
    pub cart: String,
    pub auth: String,
    pub orders: String,
    pub addresses: String,
    pub reviews: String,
    pub delivery: String,
}

impl Default for ApiGroups {
    fn default() -> Self {
        Self {
            cart: "api:cart".to_string(),
            auth: "api:auth".to_string(),
            orders: "api:orders".to_string(),
            addresses: "api:addresses".to_string(),
            reviews: "api:reviews".to_string(),
            delivery: "api:delivery".to_string(),
        }
    }
}

/// Everything a widget needs to know about its environment.
///
/// Passed to widget constructors instead of living in page-level globals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub api_base: String,
    pub groups: ApiGroups,
    /// Postal-code lookup URL; `{cep}` is replaced by the 8 digits.
    pub cep_lookup_url: String,
    pub auth_cookie: String,
    /// Local storage key of the cart mirror.
    pub cart_storage_key: String,
    /// Orders strictly above this many centavos ship for free.
    pub free_shipping_cents: i64,
    pub max_quantity: i64,
    /// Attempts made by the postal-code lookup before giving up.
    pub cep_lookup_attempts: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:8080".to_string(),
            groups: ApiGroups::default(),
            cep_lookup_url: "https://viacep.com.br/ws/{cep}/json/".to_string(),
            auth_cookie: "talho_auth".to_string(),
            cart_storage_key: "talho_cart".to_string(),
            free_shipping_cents: 400_00,
            max_quantity: 10,
            cep_lookup_attempts: 3,
        }
    }
}

impl StoreConfig {
    /// Default configuration overlaid with environment variables.
    ///
    /// # Environment Variables
    /// - `TALHO_API_BASE`: backend base URL.
    /// - `TALHO_AUTH_COOKIE`: name of the auth cookie.
    /// - `TALHO_CART_KEY`: local storage key of the cart mirror.
    /// - `TALHO_FREE_SHIPPING_CENTS`: free-shipping threshold in centavos.
    ///
    /// Empty or unparsable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(base) = non_empty_var("TALHO_API_BASE") {
            config.api_base = base;
        }
        if let Some(cookie) = non_empty_var("TALHO_AUTH_COOKIE") {
            config.auth_cookie = cookie;
        }
        if let Some(key) = non_empty_var("TALHO_CART_KEY") {
            config.cart_storage_key = key;
        }
        if let Some(cents) = non_empty_var("TALHO_FREE_SHIPPING_CENTS").and_then(|v| v.parse().ok()) {
            config.free_shipping_cents = cents;
        }

        config
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
