//! Payload shapes exchanged with the storefront backend.
//!
//! Monetary fields are integer centavos throughout; formatting happens in
//! [`crate::money`].

use crate::money::Brl;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

/// One line of the shopping cart.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub name: String,
    pub quantity: i64,
    /// Unit price in centavos.
    pub price: i64,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub sku_id: i64,
    pub slug: String,
}

impl CartItem {
    pub fn subtotal(&self) -> Brl {
        Brl::from_minor(self.price.saturating_mul(self.quantity))
    }
}

/// Cart as returned by the cart endpoints and mirrored in local storage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub order_price: i64,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

impl Cart {
    pub fn total(&self) -> Brl {
        Brl::from_minor(self.order_price)
    }

    /// Number of units across all lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variation {
    pub id: i64,
    pub name: String,
    pub price: i64,
    /// List price before discount, when the variation is on sale.
    #[serde(default)]
    pub full_price: Option<i64>,
    #[serde(default)]
    pub stock: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub price: i64,
    #[serde(default)]
    pub full_price: Option<i64>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub variations: Vec<Variation>,
}

impl Product {
    pub fn variation(&self, id: i64) -> Option<&Variation> {
        self.variations.iter().find(|v| v.id == id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub quantity: i64,
    pub price: i64,
    pub sku_id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub status: String,
    pub total: i64,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    pub fn placed_on(&self) -> Option<NaiveDate> {
        DateTime::from_timestamp_millis(self.created_at).map(|dt| dt.date_naive())
    }

    pub fn total(&self) -> Brl {
        Brl::from_minor(self.total)
    }
}

/// Customer personal data, as edited on the account page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub cpf: String,
    /// `dd/mm/yyyy`
    #[serde(default)]
    pub birthday: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub id: i64,
    pub cep: String,
    pub street: String,
    pub number: String,
    #[serde(default)]
    pub complement: String,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

/// Reply of the public postal-code lookup service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct CepLookup {
    #[serde(default)]
    pub cep: String,
    #[serde(default, rename = "logradouro")]
    pub street: String,
    #[serde(default, rename = "bairro")]
    pub neighborhood: String,
    #[serde(default, rename = "localidade")]
    pub city: String,
    #[serde(default, rename = "uf")]
    pub state: String,
    /// Set by the service when the CEP does not exist.
    #[serde(default, rename = "erro")]
    pub not_found: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDraft {
    pub product_id: i64,
    pub rating: u8,
    pub comment: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryQuote {
    pub price: i64,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SignupForm {
    pub name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub cpf: String,
    pub phone: String,
}
