#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use chrono::Utc;
use tokio::sync::Mutex;
use tower::ServiceExt;

use vehicle_rental::config::environment::{EnvironmentConfig, KhaltiConfig, MailConfig};
use vehicle_rental::models::payment::{
    InitiatedPayment, PaymentLookup, PaymentRequest, PaymentStatus,
};
use vehicle_rental::models::user::{Role, UserAccount};
use vehicle_rental::models::vehicle::Vehicle;
use vehicle_rental::repositories::InMemoryRentalStore;
use vehicle_rental::services::khalti_service::{PaymentGateway, PaymentGatewayError};
use vehicle_rental::services::notification_service::{NotificationError, Notifier, RentalNotice};
use vehicle_rental::utils::jwt::generate_token;
use vehicle_rental::{create_app_router, AppState};

pub const JWT_SECRET: &str = "integration-secret";
pub const DASHBOARD_URL: &str = "/api/rentals/mine";

pub const OWNER_ID: i64 = 10;
pub const OTHER_OWNER_ID: i64 = 11;
pub const RENTER_ID: i64 = 42;
pub const OTHER_RENTER_ID: i64 = 43;
pub const ADMIN_ID: i64 = 1;
pub const VEHICLE_ID: i64 = 7;
pub const VEHICLE_PRICE: i64 = 1000;

/// Pasarela falsa: estado de lookup configurable y registro de llamadas
pub struct FakeGateway {
    pub lookup_status: Mutex<&'static str>,
    pub lookup_amount: Mutex<Option<i64>>,
    pub fail_lookup: Mutex<bool>,
    pub initiated: Mutex<Vec<PaymentRequest>>,
}

impl FakeGateway {
    pub fn completed() -> Self {
        Self::with_status("Completed")
    }

    pub fn with_status(status: &'static str) -> Self {
        Self {
            lookup_status: Mutex::new(status),
            lookup_amount: Mutex::new(Some(VEHICLE_PRICE)),
            fail_lookup: Mutex::new(false),
            initiated: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn initiate(&self, request: PaymentRequest) -> Result<InitiatedPayment, PaymentGatewayError> {
        let purchase_order_id = request.vehicle_id.to_string();
        self.initiated.lock().await.push(request);
        Ok(InitiatedPayment {
            payment_url: "https://test-pay.khalti.com/?pidx=fake-pidx".to_string(),
            pidx: Some("fake-pidx".to_string()),
            transaction_id: "fake-tx".to_string(),
            purchase_order_id,
        })
    }

    async fn lookup(&self, pidx: &str) -> Result<PaymentLookup, PaymentGatewayError> {
        if *self.fail_lookup.lock().await {
            return Err(PaymentGatewayError::Timeout);
        }
        let status = *self.lookup_status.lock().await;
        Ok(PaymentLookup {
            pidx: pidx.to_string(),
            status: PaymentStatus::from_gateway(status),
            gateway_status: status.to_string(),
            total_amount: *self.lookup_amount.lock().await,
        })
    }
}

/// Notificador que guarda los avisos; puede forzarse a fallar
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<RentalNotice>>,
    pub fail: bool,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notice: &RentalNotice) -> Result<(), NotificationError> {
        if self.fail {
            return Err(NotificationError::Rejected(500));
        }
        self.sent.lock().await.push(notice.clone());
        Ok(())
    }
}

pub fn test_config() -> EnvironmentConfig {
    EnvironmentConfig {
        environment: "test".to_string(),
        port: 0,
        host: "127.0.0.1".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        cors_origins: Vec::new(),
        renter_dashboard_url: DASHBOARD_URL.to_string(),
        khalti: KhaltiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            secret_key: "test-secret-key".to_string(),
            return_url: "http://localhost:3000/api/payments/verify".to_string(),
            website_url: "http://localhost:3000".to_string(),
            timeout: Duration::from_secs(2),
        },
        mail: MailConfig {
            api_url: None,
            api_key: None,
            from: "no-reply@example.com".to_string(),
            timeout: Duration::from_secs(2),
        },
    }
}

pub fn user(id: i64, username: &str, role: Role) -> UserAccount {
    UserAccount {
        id,
        username: username.to_string(),
        email: format!("{}@example.com", username),
        full_name: None,
        phone_number: None,
        role,
        created_at: Utc::now(),
    }
}

pub fn vehicle(id: i64, owner_id: i64, available: bool) -> Vehicle {
    Vehicle {
        id,
        vehicle_model: format!("Toyota Hilux #{}", id),
        rent_price: VEHICLE_PRICE,
        category_id: 1,
        description: Some("4x4 pickup".to_string()),
        owner_id,
        rented_by: if available { None } else { Some(OTHER_RENTER_ID) },
        available,
        is_deleted: false,
        created_at: Utc::now(),
    }
}

/// Store con categoría 1, usuarios fijos y el vehículo 7 disponible
pub async fn seeded_store() -> InMemoryRentalStore {
    let store = InMemoryRentalStore::new();
    store.insert_category(1, "Pickup").await;
    store.insert_user(user(ADMIN_ID, "admin", Role::Admin)).await;
    store.insert_user(user(OWNER_ID, "hari", Role::Owner)).await;
    store.insert_user(user(OTHER_OWNER_ID, "gita", Role::Owner)).await;
    store.insert_user(user(RENTER_ID, "ram", Role::Customer)).await;
    store.insert_user(user(OTHER_RENTER_ID, "sita", Role::Customer)).await;
    store.insert_vehicle(vehicle(VEHICLE_ID, OWNER_ID, true)).await;
    store
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryRentalStore>,
    pub gateway: Arc<FakeGateway>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_gateway(FakeGateway::completed()).await
    }

    pub async fn with_gateway(gateway: FakeGateway) -> Self {
        let store = Arc::new(seeded_store().await);
        let gateway = Arc::new(gateway);
        let notifier = Arc::new(RecordingNotifier::default());

        let state = AppState::new(test_config(), store.clone(), gateway.clone(), notifier.clone());

        Self {
            router: create_app_router(state),
            store,
            gateway,
            notifier,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(request).await.unwrap()
    }
}

pub fn token_for(user_id: i64, username: &str, role: Role) -> String {
    generate_token(user_id, username, role, JWT_SECRET, 3600).unwrap()
}

pub fn owner_token() -> String {
    token_for(OWNER_ID, "hari", Role::Owner)
}

pub fn renter_token() -> String {
    token_for(RENTER_ID, "ram", Role::Customer)
}

pub fn admin_token() -> String {
    token_for(ADMIN_ID, "admin", Role::Admin)
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn send_json(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
