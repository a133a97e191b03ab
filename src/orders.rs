//! "My orders" page: order history and the buy-again action.

use crate::api::{ApiError, Client, Transport};
use crate::models::{Cart, Order};
use crate::store::{FieldId, Store, StoreBuilder, StoreError};
use log::{info, warn};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrdersField {
    Orders,
    HasOrders,
    OrderCount,
}

impl FieldId for OrdersField {
    const ALL: &'static [Self] = &[
        OrdersField::Orders,
        OrdersField::HasOrders,
        OrdersField::OrderCount,
    ];
}

#[derive(Clone, Debug, PartialEq)]
pub enum OrdersValue {
    Orders(Vec<Order>),
    Flag(bool),
    Count(usize),
}

pub trait OrdersView {
    /// Replaces every order card. An empty slice shows the empty state.
    fn render_orders(&self, orders: &[Order]);
    fn set_buy_again_busy(&self, order_id: i64, busy: bool);
    fn show_error(&self, message: &str);
    fn redirect_to_login(&self);
}

/// Outcome of a buy-again click.
#[derive(Debug, PartialEq)]
pub enum BuyAgain {
    /// The order's items were added; carries the new cart.
    Added(Cart),
    /// A request for the same order is still running.
    InFlight,
    Failed(ApiError),
}

/// Card heading, e.g. `Pedido #42 - 14/10/2024`.
pub fn order_label(order: &Order) -> String {
    match order.placed_on() {
        Some(date) => format!("Pedido #{} - {}", order.id, date.format("%d/%m/%Y")),
        None => format!("Pedido #{}", order.id),
    }
}

fn orders_len(store: &Store<OrdersField, OrdersValue>) -> usize {
    match store.peek(OrdersField::Orders) {
        Some(OrdersValue::Orders(orders)) => orders.len(),
        _ => 0,
    }
}

// Clears the busy state of one order however its request ends, including
// when the future is dropped before the reply arrives.
struct BusyGuard<'a> {
    in_flight: &'a RefCell<HashSet<i64>>,
    view: &'a dyn OrdersView,
    order_id: i64,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.in_flight.borrow_mut().remove(&self.order_id);
        self.view.set_buy_again_busy(self.order_id, false);
    }
}

pub struct OrdersWidget {
    store: Store<OrdersField, OrdersValue>,
    view: Rc<dyn OrdersView>,
    in_flight: RefCell<HashSet<i64>>,
}

impl OrdersWidget {
    pub fn new(view: Rc<dyn OrdersView>) -> Result<Self, StoreError> {
        let render_view = view.clone();
        let store = StoreBuilder::new()
            .stored(OrdersField::Orders, OrdersValue::Orders(Vec::new()))
            .derived(OrdersField::HasOrders, |s| {
                OrdersValue::Flag(orders_len(s) > 0)
            })
            .derived(OrdersField::OrderCount, |s| OrdersValue::Count(orders_len(s)))
            .effect(OrdersField::Orders, move |_, value| {
                if let OrdersValue::Orders(orders) = value {
                    render_view.render_orders(orders);
                }
                Ok(())
            })
            .build()?;

        Ok(OrdersWidget {
            store,
            view,
            in_flight: RefCell::new(HashSet::new()),
        })
    }

    pub fn store(&self) -> &Store<OrdersField, OrdersValue> {
        &self.store
    }

    pub fn orders(&self) -> &[Order] {
        match self.store.peek(OrdersField::Orders) {
            Some(OrdersValue::Orders(orders)) => orders,
            _ => &[],
        }
    }

    pub fn has_orders(&self) -> bool {
        matches!(self.store.get(OrdersField::HasOrders), OrdersValue::Flag(true))
    }

    pub fn order_count(&self) -> usize {
        match self.store.get(OrdersField::OrderCount) {
            OrdersValue::Count(n) => n,
            _ => 0,
        }
    }

    pub fn set_orders(&mut self, orders: Vec<Order>) -> Result<(), StoreError> {
        self.store.set(OrdersField::Orders, OrdersValue::Orders(orders))
    }

    /// Fetches the order history. Returns whether it loaded; a rejected
    /// session redirects to the login page.
    pub async fn load<T: Transport>(&mut self, client: &Client<T>) -> Result<bool, StoreError> {
        match client.list_orders().await {
            Ok(orders) => {
                info!("loaded {} orders", orders.len());
                self.set_orders(orders)?;
                Ok(true)
            }
            Err(ApiError::Unauthorized) => {
                self.view.redirect_to_login();
                Ok(false)
            }
            Err(e) => {
                warn!("failed to load orders: {}", e);
                self.view.show_error(&e.to_string());
                Ok(false)
            }
        }
    }

    /// Whether a buy-again request for `order_id` is running.
    pub fn is_busy(&self, order_id: i64) -> bool {
        self.in_flight.borrow().contains(&order_id)
    }

    /// Adds every item of `order_id` back to the cart. A second call for the
    /// same order while the first is running is refused with
    /// [`BuyAgain::InFlight`].
    pub async fn buy_again<T: Transport>(&self, client: &Client<T>, order_id: i64) -> BuyAgain {
        if !self.in_flight.borrow_mut().insert(order_id) {
            return BuyAgain::InFlight;
        }
        let guard = BusyGuard {
            in_flight: &self.in_flight,
            view: self.view.as_ref(),
            order_id,
        };
        self.view.set_buy_again_busy(order_id, true);

        let result = client.buy_again(order_id).await;
        drop(guard);

        match result {
            Ok(cart) => BuyAgain::Added(cart),
            Err(ApiError::Unauthorized) => {
                self.view.redirect_to_login();
                BuyAgain::Failed(ApiError::Unauthorized)
            }
            Err(e) => {
                warn!("buy again failed for order {}: {}", order_id, e);
                self.view.show_error(&e.to_string());
                BuyAgain::Failed(e)
            }
        }
    }
}
