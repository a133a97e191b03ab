//! Floating cart widget.

use crate::api::{ApiError, Client, Transport};
use crate::config::StoreConfig;
use crate::models::{Cart, CartItem};
use crate::money::Brl;
use crate::storage::{CartMirror, Storage, StorageEvent};
use crate::store::{FieldId, Store, StoreBuilder, StoreError};
use log::warn;
use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CartField {
    Cart,
    Pending,
    Open,
    HasFreeShipping,
    MissingForFreeShipping,
    FormattedTotal,
}

impl FieldId for CartField {
    const ALL: &'static [Self] = &[
        CartField::Cart,
        CartField::Pending,
        CartField::Open,
        CartField::HasFreeShipping,
        CartField::MissingForFreeShipping,
        CartField::FormattedTotal,
    ];
}

#[derive(Clone, Debug, PartialEq)]
pub enum CartValue {
    Cart(Option<Cart>),
    Flag(bool),
    Amount(Brl),
    Text(String),
}

/// Content of the free-shipping banner.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Promo {
    FreeShipping,
    /// Amount still needed to reach free shipping.
    Missing(Brl),
}

impl Promo {
    pub fn message(&self) -> String {
        match self {
            Promo::FreeShipping => "Parabéns! Você ganhou frete grátis.".to_string(),
            Promo::Missing(amount) => format!("Faltam {} para você ganhar frete grátis.", amount),
        }
    }
}

/// Page nodes the cart widget writes to.
pub trait CartView {
    fn render_items(&self, items: &[CartItem]);
    fn render_promo(&self, promo: &Promo);
    fn set_loading(&self, loading: bool);
    fn set_open(&self, open: bool);
    fn show_error(&self, message: &str);
}

fn order_price(store: &Store<CartField, CartValue>) -> i64 {
    match store.peek(CartField::Cart) {
        Some(CartValue::Cart(Some(cart))) => cart.order_price,
        _ => 0,
    }
}

fn flag(value: &CartValue) -> bool {
    matches!(value, CartValue::Flag(true))
}

pub struct CartWidget {
    store: Store<CartField, CartValue>,
    view: Rc<dyn CartView>,
    mirror: CartMirror,
    refresh_queued: Rc<Cell<bool>>,
}

impl CartWidget {
    /// Builds the widget from the mirrored cart, if any, and renders it.
    pub fn new(
        config: &StoreConfig,
        view: Rc<dyn CartView>,
        storage: Rc<dyn Storage>,
    ) -> Result<Self, StoreError> {
        let mirror = CartMirror::new(storage, config.cart_storage_key.clone());
        let threshold = config.free_shipping_cents;
        let refresh_queued = Rc::new(Cell::new(false));
        let initial = mirror.load();

        let items_view = view.clone();
        let promo_view = view.clone();
        let loading_view = view.clone();
        let open_view = view.clone();
        let persist = mirror.clone();
        let queued = refresh_queued.clone();

        let mut store = StoreBuilder::new()
            .stored(CartField::Cart, CartValue::Cart(initial))
            .stored(CartField::Pending, CartValue::Flag(false))
            .stored(CartField::Open, CartValue::Flag(false))
            .derived(CartField::HasFreeShipping, move |s| {
                CartValue::Flag(order_price(s) > threshold)
            })
            .derived(CartField::MissingForFreeShipping, move |s| {
                CartValue::Amount(Brl::from_minor(threshold.saturating_sub(order_price(s)).max(0)))
            })
            .derived(CartField::FormattedTotal, |s| {
                CartValue::Text(Brl::from_minor(order_price(s)).to_string())
            })
            .effect(CartField::Cart, move |_, value| {
                let items: &[CartItem] = match value {
                    CartValue::Cart(Some(cart)) => cart.items.as_slice(),
                    _ => &[],
                };
                items_view.render_items(items);
                Ok(())
            })
            .effect(CartField::Cart, move |store, _| {
                let promo = if flag(&store.get(CartField::HasFreeShipping)) {
                    Promo::FreeShipping
                } else {
                    match store.get(CartField::MissingForFreeShipping) {
                        CartValue::Amount(missing) => Promo::Missing(missing),
                        _ => Promo::Missing(Brl::from_minor(threshold)),
                    }
                };
                promo_view.render_promo(&promo);
                Ok(())
            })
            .effect(CartField::Cart, move |_, value| {
                match value {
                    CartValue::Cart(Some(cart)) => persist.save(cart)?,
                    _ => persist.clear()?,
                }
                Ok(())
            })
            .effect(CartField::Pending, move |_, value| {
                loading_view.set_loading(flag(value));
                Ok(())
            })
            .effect(CartField::Open, move |store, value| {
                open_view.set_open(flag(value));
                if flag(value) {
                    queued.set(true);
                    store.set(CartField::Pending, CartValue::Flag(true))?;
                } else if queued.replace(false) {
                    // closed before the queued refresh ran
                    store.set(CartField::Pending, CartValue::Flag(false))?;
                }
                Ok(())
            })
            .build()?;

        // first paint from the mirror
        let cart = store.get(CartField::Cart);
        store.set(CartField::Cart, cart)?;

        Ok(CartWidget {
            store,
            view,
            mirror,
            refresh_queued,
        })
    }

    pub fn store(&self) -> &Store<CartField, CartValue> {
        &self.store
    }

    pub fn cart(&self) -> Option<Cart> {
        match self.store.peek(CartField::Cart) {
            Some(CartValue::Cart(cart)) => cart.clone(),
            _ => None,
        }
    }

    pub fn item_count(&self) -> i64 {
        self.cart().map_or(0, |cart| cart.item_count())
    }

    pub fn is_open(&self) -> bool {
        flag(&self.store.get(CartField::Open))
    }

    pub fn is_pending(&self) -> bool {
        flag(&self.store.get(CartField::Pending))
    }

    pub fn has_free_shipping(&self) -> bool {
        flag(&self.store.get(CartField::HasFreeShipping))
    }

    pub fn missing_for_free_shipping(&self) -> Brl {
        match self.store.get(CartField::MissingForFreeShipping) {
            CartValue::Amount(amount) => amount,
            _ => Brl::ZERO,
        }
    }

    pub fn formatted_total(&self) -> String {
        match self.store.get(CartField::FormattedTotal) {
            CartValue::Text(text) => text,
            _ => String::new(),
        }
    }

    /// Opening queues a refresh; run it with [`CartWidget::run_pending`].
    /// Closing first drops the queued refresh.
    pub fn open(&mut self) -> Result<(), StoreError> {
        self.store.set(CartField::Open, CartValue::Flag(true))
    }

    pub fn close(&mut self) -> Result<(), StoreError> {
        self.store.set(CartField::Open, CartValue::Flag(false))
    }

    pub fn toggle(&mut self) -> Result<(), StoreError> {
        let open = !self.is_open();
        self.store.set(CartField::Open, CartValue::Flag(open))
    }

    /// Replaces the cart with a payload obtained elsewhere (e.g. the product
    /// page's add-to-cart reply).
    pub fn replace_cart(&mut self, cart: Cart) -> Result<(), StoreError> {
        self.store.set(CartField::Cart, CartValue::Cart(Some(cart)))
    }

    /// Whether a refresh was queued by opening the cart and not yet run.
    pub fn refresh_queued(&self) -> bool {
        self.refresh_queued.get()
    }

    /// Runs the queued refresh, if any. Returns whether one ran.
    pub async fn run_pending<T: Transport>(&mut self, client: &Client<T>) -> Result<bool, StoreError> {
        if !self.refresh_queued.replace(false) {
            return Ok(false);
        }
        self.refresh(client).await?;
        Ok(true)
    }

    /// Fetches the cart from the backend. Returns whether the fetch succeeded;
    /// failures are shown in the view.
    pub async fn refresh<T: Transport>(&mut self, client: &Client<T>) -> Result<bool, StoreError> {
        self.store.set(CartField::Pending, CartValue::Flag(true))?;
        let result = client.get_cart().await;
        self.settle(result)
    }

    pub async fn add_item<T: Transport>(
        &mut self,
        client: &Client<T>,
        sku_id: i64,
        quantity: i64,
    ) -> Result<bool, StoreError> {
        self.store.set(CartField::Pending, CartValue::Flag(true))?;
        let result = client.add_to_cart(sku_id, quantity).await;
        self.settle(result)
    }

    /// Sets a line's quantity; zero or less removes the line.
    pub async fn change_quantity<T: Transport>(
        &mut self,
        client: &Client<T>,
        sku_id: i64,
        quantity: i64,
    ) -> Result<bool, StoreError> {
        if quantity <= 0 {
            return self.remove_item(client, sku_id).await;
        }
        self.store.set(CartField::Pending, CartValue::Flag(true))?;
        let result = client.update_cart_item(sku_id, quantity).await;
        self.settle(result)
    }

    pub async fn remove_item<T: Transport>(
        &mut self,
        client: &Client<T>,
        sku_id: i64,
    ) -> Result<bool, StoreError> {
        self.store.set(CartField::Pending, CartValue::Flag(true))?;
        let result = client.remove_cart_item(sku_id).await;
        self.settle(result)
    }

    /// Applies a cart mirror written by another tab. Last write wins.
    /// Returns whether the event concerned the cart.
    pub fn apply_storage_event(&mut self, event: &StorageEvent) -> Result<bool, StoreError> {
        if event.key != self.mirror.key() {
            return Ok(false);
        }
        let cart = event.new_value.as_deref().and_then(CartMirror::decode);
        self.store.set(CartField::Cart, CartValue::Cart(cart))?;
        Ok(true)
    }

    // Commits a backend reply and always clears the pending flag.
    fn settle(&mut self, result: Result<Cart, ApiError>) -> Result<bool, StoreError> {
        let outcome = match result {
            Ok(cart) => self
                .store
                .set(CartField::Cart, CartValue::Cart(Some(cart)))
                .map(|_| true),
            Err(e) => {
                warn!("cart request failed: {}", e);
                self.view.show_error(&e.to_string());
                Ok(false)
            }
        };
        self.store.set(CartField::Pending, CartValue::Flag(false))?;
        outcome
    }
}
