#![allow(dead_code)]

use serde_json::{Value, json};
use std::cell::RefCell;
use std::collections::VecDeque;
use talho::api::{ApiReply, ApiRequest, Transport, TransportError};
use talho::models::{Cart, CartItem};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Transport that replays queued replies and records every request.
#[derive(Default)]
pub struct MockTransport {
    replies: RefCell<VecDeque<Result<ApiReply, TransportError>>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, status: u16, body: Value) -> Self {
        self.push(Ok(ApiReply { status, body }));
        self
    }

    pub fn fail(self, message: &str) -> Self {
        self.push(Err(TransportError(message.to_string())));
        self
    }

    pub fn push(&self, reply: Result<ApiReply, TransportError>) {
        self.replies.borrow_mut().push_back(reply);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.borrow().len()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiReply, TransportError> {
        self.requests.borrow_mut().push(request);
        // behave like a real network call and give other tasks a turn
        tokio::task::yield_now().await;
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError("no reply queued".to_string())))
    }
}

pub fn item(sku_id: i64, quantity: i64, price: i64) -> CartItem {
    CartItem {
        name: format!("Corte {}", sku_id),
        quantity,
        price,
        image_url: format!("https://cdn.example/{}.jpg", sku_id),
        sku_id,
        slug: format!("corte-{}", sku_id),
    }
}

pub fn cart(items: Vec<CartItem>) -> Cart {
    let order_price = items.iter().map(|i| i.price * i.quantity).sum();
    Cart { order_price, items }
}

pub fn cart_json(cart: &Cart) -> Value {
    serde_json::to_value(cart).unwrap()
}

pub fn message(text: &str) -> Value {
    json!({ "message": text })
}
