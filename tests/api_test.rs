mod common;

use serde_json::json;
use talho::api::{
    ApiError, ApiReply, Client, Endpoints, FALLBACK_MESSAGE, Group, Method, decode_reply,
};
use talho::config::StoreConfig;
use talho::models::{Address, Cart, ReviewDraft};
use talho::session::AuthToken;
use talho::validation::ValidationError;

use common::{MockTransport, cart, cart_json, init_logger, item, message};

fn reply(status: u16, body: serde_json::Value) -> ApiReply {
    ApiReply { status, body }
}

fn config() -> StoreConfig {
    StoreConfig {
        api_base: "https://api.talho.test/".to_string(),
        ..StoreConfig::default()
    }
}

#[test]
fn successful_replies_decode_to_the_payload() {
    let expected = cart(vec![item(3, 2, 1500)]);
    let decoded: Cart = decode_reply(reply(200, cart_json(&expected))).unwrap();
    assert_eq!(decoded, expected);
}

#[test]
fn failures_become_displayable_messages() {
    let unauthorized = decode_reply::<Cart>(reply(401, message("token expired")));
    assert_eq!(unauthorized, Err(ApiError::Unauthorized));

    let backend = decode_reply::<Cart>(reply(400, message("Estoque insuficiente")));
    assert_eq!(backend.unwrap_err().to_string(), "Estoque insuficiente");

    let silent = decode_reply::<Cart>(reply(500, serde_json::Value::Null));
    assert_eq!(silent.unwrap_err().to_string(), FALLBACK_MESSAGE);

    let blank = decode_reply::<Cart>(reply(500, message("  ")));
    assert_eq!(blank.unwrap_err().to_string(), FALLBACK_MESSAGE);

    let malformed = decode_reply::<Cart>(reply(200, json!({ "items": 3 })));
    assert!(matches!(malformed, Err(ApiError::Decode(_))));
}

#[test]
fn endpoint_urls_join_base_group_and_path() {
    let endpoints = Endpoints::new(&config());
    assert_eq!(
        endpoints.url(Group::Cart, "cart"),
        "https://api.talho.test/api:cart/cart"
    );
    assert_eq!(
        endpoints.url(Group::Orders, "/orders/7/buy_again"),
        "https://api.talho.test/api:orders/orders/7/buy_again"
    );
}

#[tokio::test]
async fn login_keeps_the_token_for_later_calls() {
    init_logger();
    let transport = MockTransport::new()
        .reply(200, json!({ "authToken": "tok-1" }))
        .reply(200, cart_json(&Cart::default()));
    let mut client = Client::new(transport, &config());

    let token = client.login(" ana@talho.com ", "segredo123").await.unwrap();
    assert_eq!(token, AuthToken::new("tok-1"));
    client.get_cart().await.unwrap();

    let requests = client.transport().requests();
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].authorization, None);
    assert_eq!(
        requests[0].body,
        Some(json!({ "email": "ana@talho.com", "password": "segredo123" }))
    );
    assert_eq!(requests[1].method, Method::Get);
    assert_eq!(requests[1].authorization.as_deref(), Some("Bearer tok-1"));
}

#[tokio::test]
async fn failed_login_keeps_the_previous_session() {
    let transport = MockTransport::new().reply(401, message("Credenciais inválidas"));
    let mut client = Client::new(transport, &config()).with_token(Some(AuthToken::new("old")));

    assert_eq!(
        client.login("ana@talho.com", "errada").await,
        Err(ApiError::Unauthorized)
    );
    assert_eq!(client.token(), Some(&AuthToken::new("old")));
}

#[tokio::test]
async fn network_errors_are_reported() {
    let client = Client::new(MockTransport::new().fail("connection refused"), &config());
    let err = client.list_orders().await.unwrap_err();
    assert_eq!(err, ApiError::Network("connection refused".to_string()));
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn cart_line_routes() {
    let reply_cart = cart_json(&cart(vec![item(9, 1, 100)]));
    let transport = MockTransport::new()
        .reply(200, reply_cart.clone())
        .reply(200, reply_cart.clone())
        .reply(200, reply_cart);
    let client = Client::new(transport, &config());

    client.add_to_cart(9, 2).await.unwrap();
    client.update_cart_item(9, 1).await.unwrap();
    client.remove_cart_item(9).await.unwrap();

    let requests = client.transport().requests();
    let routes: Vec<_> = requests.iter().map(|r| (r.method, r.url.as_str())).collect();
    assert_eq!(
        routes,
        vec![
            (Method::Post, "https://api.talho.test/api:cart/cart/add_item"),
            (Method::Patch, "https://api.talho.test/api:cart/cart/item"),
            (Method::Delete, "https://api.talho.test/api:cart/cart/item/9"),
        ]
    );
    assert_eq!(requests[0].body, Some(json!({ "sku_id": 9, "quantity": 2 })));
}

#[tokio::test]
async fn cep_lookup_retries_until_it_succeeds() {
    init_logger();
    let transport = MockTransport::new()
        .fail("timeout")
        .reply(
            200,
            json!({
                "cep": "01310-100",
                "logradouro": "Avenida Paulista",
                "bairro": "Bela Vista",
                "localidade": "São Paulo",
                "uf": "SP"
            }),
        );
    let client = Client::new(transport, &config());

    let found = client.lookup_cep("01310-100").await.unwrap();
    assert_eq!(found.street, "Avenida Paulista");
    assert_eq!(found.city, "São Paulo");
    assert_eq!(found.state, "SP");

    let requests = client.transport().requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url, "https://viacep.com.br/ws/01310100/json/");
    assert_eq!(requests[0].authorization, None);
}

#[tokio::test]
async fn cep_lookup_gives_up_after_the_configured_attempts() {
    let transport = MockTransport::new()
        .reply(200, json!({ "erro": true }))
        .fail("timeout")
        .reply(502, serde_json::Value::Null)
        .reply(200, json!({ "logradouro": "never reached" }));
    let client = Client::new(transport, &config());

    let err = client.lookup_cep("99999999").await.unwrap_err();
    assert_eq!(err, ApiError::Backend(FALLBACK_MESSAGE.to_string()));
    assert_eq!(client.transport().request_count(), 3);
}

#[tokio::test]
async fn invalid_input_never_reaches_the_network() {
    let client = Client::new(MockTransport::new(), &config());

    assert_eq!(
        client.lookup_cep("123").await,
        Err(ApiError::Invalid(ValidationError::Cep))
    );
    assert_eq!(
        client.quote_delivery("abc").await.unwrap_err(),
        ApiError::Invalid(ValidationError::Cep)
    );

    let address = Address {
        id: 0,
        cep: "0131".to_string(),
        street: "Rua Augusta".to_string(),
        number: "100".to_string(),
        complement: String::new(),
        neighborhood: "Consolação".to_string(),
        city: "São Paulo".to_string(),
        state: "SP".to_string(),
    };
    assert!(matches!(
        client.create_address(&address).await,
        Err(ApiError::Invalid(ValidationError::Cep))
    ));
    assert_eq!(client.transport().request_count(), 0);
}

#[tokio::test]
async fn delivery_quote_and_review_bodies() {
    let transport = MockTransport::new()
        .reply(200, json!({ "price": 1500 }))
        .reply(200, json!({ "id": 1 }));
    let client = Client::new(transport, &config()).with_token(Some(AuthToken::new("t")));

    let quote = client.quote_delivery("01310-100").await.unwrap();
    assert_eq!(quote.price, 1500);
    assert_eq!(quote.message, None);

    let review = ReviewDraft {
        product_id: 12,
        rating: 5,
        comment: "Excelente".to_string(),
    };
    client.submit_review(&review).await.unwrap();

    let requests = client.transport().requests();
    assert_eq!(requests[0].body, Some(json!({ "cep": "01310100" })));
    assert_eq!(
        requests[0].url,
        "https://api.talho.test/api:delivery/delivery/quote"
    );
    assert_eq!(
        requests[1].body,
        Some(json!({ "product_id": 12, "rating": 5, "comment": "Excelente" }))
    );
}
