//! Single product page: variation picker, stock messaging and quantity
//! selector.

use crate::api::{Client, Transport};
use crate::config::StoreConfig;
use crate::models::{Cart, Product, Variation};
use crate::money::Brl;
use crate::store::{FieldId, Store, StoreBuilder, StoreError};
use log::warn;
use std::rc::Rc;

/// Stock at or below this count shows a "last units" message.
pub const LOW_STOCK: i64 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProductField {
    Quantity,
    StockCount,
    Product,
    SelectedVariation,
    VariationCount,
    HasPriceDifference,
    EffectivePrice,
    EffectiveFullPrice,
    FormattedPrice,
    FormattedFullPrice,
    FormattedSubtotal,
}

impl FieldId for ProductField {
    const ALL: &'static [Self] = &[
        ProductField::Quantity,
        ProductField::StockCount,
        ProductField::Product,
        ProductField::SelectedVariation,
        ProductField::VariationCount,
        ProductField::HasPriceDifference,
        ProductField::EffectivePrice,
        ProductField::EffectiveFullPrice,
        ProductField::FormattedPrice,
        ProductField::FormattedFullPrice,
        ProductField::FormattedSubtotal,
    ];
}

#[derive(Clone, Debug, PartialEq)]
pub enum ProductValue {
    Count(i64),
    Product(Option<Product>),
    Variation(Option<i64>),
    Flag(bool),
    Amount(Brl),
    Text(String),
}

pub trait ProductView {
    fn render_variations(&self, variations: &[Variation], selected: Option<i64>);
    /// `message` is `None` when stock is plentiful.
    fn render_stock(&self, stock: i64, message: Option<&str>);
    fn render_quantity(&self, quantity: i64, subtotal: &str);
    fn show_error(&self, message: &str);
}

/// Keeps a quantity within `[1, min(stock, max)]`. Out-of-stock products
/// still show 1.
pub fn clamp_quantity(quantity: i64, stock: i64, max: i64) -> i64 {
    quantity.clamp(1, stock.min(max).max(1))
}

pub fn stock_message(stock: i64) -> Option<String> {
    match stock {
        i64::MIN..=0 => Some("Produto esgotado".to_string()),
        1 => Some("Resta apenas 1 unidade".to_string()),
        2..=LOW_STOCK => Some(format!("Restam apenas {} unidades", stock)),
        _ => None,
    }
}

fn count(value: &ProductValue) -> i64 {
    match value {
        ProductValue::Count(n) => *n,
        _ => 0,
    }
}

fn product_of(store: &Store<ProductField, ProductValue>) -> Option<&Product> {
    match store.peek(ProductField::Product) {
        Some(ProductValue::Product(product)) => product.as_ref(),
        _ => None,
    }
}

fn selected_of(store: &Store<ProductField, ProductValue>) -> Option<i64> {
    match store.peek(ProductField::SelectedVariation) {
        Some(ProductValue::Variation(id)) => *id,
        _ => None,
    }
}

// (sale price, list price) of the selected variation, else of the product
fn prices(store: &Store<ProductField, ProductValue>) -> (i64, Option<i64>) {
    let Some(product) = product_of(store) else {
        return (0, None);
    };
    match selected_of(store).and_then(|id| product.variation(id)) {
        Some(variation) => (variation.price, variation.full_price),
        None => (product.price, product.full_price),
    }
}

fn quantity_of(store: &Store<ProductField, ProductValue>) -> i64 {
    store.peek(ProductField::Quantity).map_or(1, count)
}

pub struct ProductWidget {
    store: Store<ProductField, ProductValue>,
    view: Rc<dyn ProductView>,
    max_quantity: i64,
}

impl ProductWidget {
    pub fn new(config: &StoreConfig, view: Rc<dyn ProductView>) -> Result<Self, StoreError> {
        let max = config.max_quantity;
        let variations_view = view.clone();
        let stock_view = view.clone();
        let quantity_view = view.clone();

        let store = StoreBuilder::new()
            .stored(ProductField::Quantity, ProductValue::Count(1))
            .stored(ProductField::StockCount, ProductValue::Count(0))
            .stored(ProductField::Product, ProductValue::Product(None))
            .stored(ProductField::SelectedVariation, ProductValue::Variation(None))
            .derived(ProductField::VariationCount, |s| {
                ProductValue::Count(product_of(s).map_or(0, |p| p.variations.len() as i64))
            })
            .derived(ProductField::HasPriceDifference, |s| {
                let (price, full) = prices(s);
                ProductValue::Flag(full.is_some_and(|full| full > price))
            })
            .derived(ProductField::EffectivePrice, |s| {
                ProductValue::Amount(Brl::from_minor(prices(s).0))
            })
            .derived(ProductField::EffectiveFullPrice, |s| {
                let (price, full) = prices(s);
                ProductValue::Amount(Brl::from_minor(full.unwrap_or(price)))
            })
            .derived(ProductField::FormattedPrice, |s| {
                ProductValue::Text(Brl::from_minor(prices(s).0).to_string())
            })
            .derived(ProductField::FormattedFullPrice, |s| {
                let (price, full) = prices(s);
                ProductValue::Text(Brl::from_minor(full.unwrap_or(price)).to_string())
            })
            .derived(ProductField::FormattedSubtotal, |s| {
                let subtotal = prices(s).0.saturating_mul(quantity_of(s));
                ProductValue::Text(Brl::from_minor(subtotal).to_string())
            })
            .effect(ProductField::Product, |store, value| {
                let ProductValue::Product(product) = value else {
                    return Ok(());
                };
                let first = product.as_ref().and_then(|p| p.variations.first());
                let stock = first
                    .map(|v| v.stock)
                    .or(product.as_ref().map(|p| p.stock))
                    .unwrap_or(0);
                store.set(ProductField::StockCount, ProductValue::Count(stock))?;
                store.set(
                    ProductField::SelectedVariation,
                    ProductValue::Variation(first.map(|v| v.id)),
                )
            })
            .effect(ProductField::SelectedVariation, move |store, value| {
                let selected = match value {
                    ProductValue::Variation(id) => *id,
                    _ => None,
                };
                let variations = product_of(store).map_or(&[][..], |p| p.variations.as_slice());
                variations_view.render_variations(variations, selected);
                store.set(ProductField::Quantity, ProductValue::Count(1))
            })
            .effect(ProductField::StockCount, move |store, value| {
                let stock = count(value);
                stock_view.render_stock(stock, stock_message(stock).as_deref());
                let quantity = clamp_quantity(quantity_of(store), stock, max);
                store.set(ProductField::Quantity, ProductValue::Count(quantity))
            })
            .effect(ProductField::Quantity, move |store, value| {
                let subtotal = match store.get(ProductField::FormattedSubtotal) {
                    ProductValue::Text(text) => text,
                    _ => String::new(),
                };
                quantity_view.render_quantity(count(value), &subtotal);
                Ok(())
            })
            .build()?;

        Ok(ProductWidget {
            store,
            view,
            max_quantity: max,
        })
    }

    pub fn store(&self) -> &Store<ProductField, ProductValue> {
        &self.store
    }

    /// Shows a product; selects its first variation and resets the quantity.
    pub fn load(&mut self, product: Product) -> Result<(), StoreError> {
        self.store
            .set(ProductField::Product, ProductValue::Product(Some(product)))
    }

    /// Selects a variation of the current product and switches the stock
    /// to that variation's. Returns `false` for an unknown id.
    pub fn select_variation(&mut self, id: i64) -> Result<bool, StoreError> {
        let Some(stock) = product_of(&self.store)
            .and_then(|p| p.variation(id))
            .map(|v| v.stock)
        else {
            return Ok(false);
        };
        self.store
            .set(ProductField::StockCount, ProductValue::Count(stock))?;
        self.store
            .set(ProductField::SelectedVariation, ProductValue::Variation(Some(id)))?;
        Ok(true)
    }

    pub fn increment(&mut self) -> Result<i64, StoreError> {
        self.set_quantity(self.quantity() + 1)
    }

    pub fn decrement(&mut self) -> Result<i64, StoreError> {
        self.set_quantity(self.quantity() - 1)
    }

    /// Sets the quantity after clamping it; returns the value kept.
    pub fn set_quantity(&mut self, quantity: i64) -> Result<i64, StoreError> {
        let quantity = clamp_quantity(quantity, self.stock(), self.max_quantity);
        self.store
            .set(ProductField::Quantity, ProductValue::Count(quantity))?;
        Ok(quantity)
    }

    pub fn quantity(&self) -> i64 {
        quantity_of(&self.store)
    }

    pub fn stock(&self) -> i64 {
        self.store.peek(ProductField::StockCount).map_or(0, count)
    }

    pub fn product(&self) -> Option<&Product> {
        product_of(&self.store)
    }

    pub fn selected_variation(&self) -> Option<i64> {
        selected_of(&self.store)
    }

    pub fn variation_count(&self) -> i64 {
        count(&self.store.get(ProductField::VariationCount))
    }

    pub fn has_price_difference(&self) -> bool {
        matches!(
            self.store.get(ProductField::HasPriceDifference),
            ProductValue::Flag(true)
        )
    }

    pub fn effective_price(&self) -> Brl {
        match self.store.get(ProductField::EffectivePrice) {
            ProductValue::Amount(amount) => amount,
            _ => Brl::ZERO,
        }
    }

    pub fn formatted_price(&self) -> String {
        self.text(ProductField::FormattedPrice)
    }

    pub fn formatted_full_price(&self) -> String {
        self.text(ProductField::FormattedFullPrice)
    }

    pub fn formatted_subtotal(&self) -> String {
        self.text(ProductField::FormattedSubtotal)
    }

    fn text(&self, field: ProductField) -> String {
        match self.store.get(field) {
            ProductValue::Text(text) => text,
            _ => String::new(),
        }
    }

    /// Adds the selected variation in the chosen quantity to the cart.
    /// Returns the updated cart, or `None` after showing why it failed.
    pub async fn add_to_cart<T: Transport>(&self, client: &Client<T>) -> Option<Cart> {
        let product = self.product()?;
        if self.stock() < 1 {
            self.view.show_error("Produto indisponível no momento.");
            return None;
        }

        let sku_id = self.selected_variation().unwrap_or(product.id);
        match client.add_to_cart(sku_id, self.quantity()).await {
            Ok(cart) => Some(cart),
            Err(e) => {
                warn!("add to cart failed for sku {}: {}", sku_id, e);
                self.view.show_error(&e.to_string());
                None
            }
        }
    }
}
