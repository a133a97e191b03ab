/*!
# Talho

Client-side logic for the Talho butcher shop storefront, built in Rust.

## Overview

The storefront pages are rendered by a hosted site builder; this crate holds
everything the pages do on top of that markup: the floating cart, the product
page, the customer's order history, the account page and the review form.
Each of these widgets keeps its view state in a small reactive container and
talks to the hosted REST backend through an injectable transport.

## Architecture

### Reactive State Container
- **store**: fields are either *stored* (hold a value) or *derived*
  (computed from other fields on every read). Writing a stored field commits
  the value and then runs the *effects* bound to it, in registration order.
  Effects update the page and may write further fields, which cascade
  depth-first before the outer write returns.

### Widgets
- **cart**: item list, free-shipping banner, open/close panel, mirror in
  local storage shared across tabs
- **product**: variation picker, stock message, quantity selector clamped to
  stock, add to cart
- **orders**: order cards and "buy again"
- **personal**: personal data display and edit form
- **review**: star rating and comment

Widgets never touch the page directly. Each one is handed a view trait
object (`CartView`, `ProductView`, ...) that the page glue implements.

### Backend
- **api**: typed client for the cart, auth, orders, addresses, reviews and
  delivery endpoints, plus the public postal-code lookup
- **http**: `reqwest` transport (feature `web`)
- **session**: auth token and cookie handling

### Domain helpers
- **money**: amounts in integer centavos, formatted as `R$ 1.234,56`
- **cpf**: Brazilian taxpayer id check digits
- **validation**: email, phone, CEP, CPF, birthday and password checks
- **delivery**: bookable delivery slots
- **storage**: `localStorage`-like key/value stores and the cart mirror
- **config**: backend URL, cookie and storage names, shipping threshold

## Key Rules

- Orders strictly above R$ 400,00 ship for free.
- Product quantity stays within `[1, min(stock, 10)]`.
- Every write runs its effects, even when the value did not change.
- The cart mirror is last-write-wins across tabs.

## Logging

The crate logs through the `log` facade; install any logger (the tests use
`env_logger`) to see request traces and cascade diagnostics.
*/

pub mod api;
pub mod cart;
pub mod config;
pub mod cpf;
pub mod delivery;
#[cfg(feature = "web")]
pub mod http;
pub mod models;
pub mod money;
pub mod orders;
pub mod personal;
pub mod product;
pub mod review;
pub mod session;
pub mod storage;
pub mod store;
pub mod validation;

/// Re-export the widgets and core types at the crate root
pub use cart::*;
pub use models::*;
pub use money::*;
pub use orders::*;
pub use personal::*;
pub use product::*;
pub use review::*;
pub use store::*;

pub use api::{ApiError, Client, Transport};
pub use config::StoreConfig;
pub use storage::{CartMirror, FileStorage, MemoryStorage, Storage, StorageEvent};
