use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{HeaderName, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub code: String,
    pub name: String,
    pub price_cents: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct PasswordReset {
    pub email: String,
}

struct StoredAccount {
    account: Account,
    password: String,
}

pub struct Store {
    accounts: HashMap<String, StoredAccount>,
    products: Vec<Product>,
}

pub type Db = Arc<RwLock<Store>>;

/// Products every fresh server starts with.
pub fn seed_catalog() -> Vec<Product> {
    vec![
        Product {
            code: "123asdf".to_string(),
            name: "Notebook".to_string(),
            price_cents: 459_900,
        },
        Product {
            code: "987zyx".to_string(),
            name: "Mouse".to_string(),
            price_cents: 8_990,
        },
    ]
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store {
        accounts: HashMap::new(),
        products: seed_catalog(),
    }));
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/resetPassword", post(reset_password))
        .route("/list", get(list_products))
        .route("/detail/{code}", get(product_detail))
        .layer(middleware::from_fn(echo_request_id))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Copy the caller's `x-request-id` onto the response.
async fn echo_request_id(request: Request, next: Next) -> Response {
    let request_id = request.headers().get(REQUEST_ID_HEADER).cloned();
    let mut response = next.run(request).await;
    if let Some(value) = request_id {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<Credentials>,
) -> Result<Json<Account>, StatusCode> {
    let store = db.read().await;
    match store.accounts.get(&input.email) {
        Some(stored) if stored.password == input.password => Ok(Json(stored.account.clone())),
        _ => {
            tracing::info!(email = %input.email, "rejected login");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

async fn register(
    State(db): State<Db>,
    Json(input): Json<Registration>,
) -> Result<(StatusCode, Json<Account>), StatusCode> {
    let mut store = db.write().await;
    if store.accounts.contains_key(&input.email) {
        return Err(StatusCode::CONFLICT);
    }
    let account = Account {
        id: Uuid::new_v4(),
        name: input.name,
        email: input.email,
    };
    store.accounts.insert(
        account.email.clone(),
        StoredAccount {
            account: account.clone(),
            password: input.password,
        },
    );
    tracing::info!(id = %account.id, "registered account");
    Ok((StatusCode::CREATED, Json(account)))
}

async fn reset_password(
    State(db): State<Db>,
    Json(input): Json<PasswordReset>,
) -> StatusCode {
    let store = db.read().await;
    if store.accounts.contains_key(&input.email) {
        StatusCode::ACCEPTED
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn list_products(State(db): State<Db>) -> Json<Vec<Product>> {
    let store = db.read().await;
    Json(store.products.clone())
}

async fn product_detail(
    State(db): State<Db>,
    Path(code): Path<String>,
) -> Result<Json<Product>, StatusCode> {
    let store = db.read().await;
    store
        .products
        .iter()
        .find(|p| p.code == code)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_serializes_to_json() {
        let product = Product {
            code: "123asdf".to_string(),
            name: "Notebook".to_string(),
            price_cents: 10,
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["code"], "123asdf");
        assert_eq!(json["name"], "Notebook");
        assert_eq!(json["price_cents"], 10);
    }

    #[test]
    fn seed_catalog_codes_are_unique() {
        let catalog = seed_catalog();
        let mut codes: Vec<&str> = catalog.iter().map(|p| p.code.as_str()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), catalog.len());
    }

    #[test]
    fn registration_rejects_missing_password() {
        let result: Result<Registration, _> =
            serde_json::from_str(r#"{"name":"Ana","email":"ana@example.com"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn credentials_accept_exact_shape() {
        let input: Credentials =
            serde_json::from_str(r#"{"email":"ana@example.com","password":"pw"}"#).unwrap();
        assert_eq!(input.email, "ana@example.com");
        assert_eq!(input.password, "pw");
    }
}
