#![allow(dead_code)]

use cinema_booking::{
    models::booking::PaymentDetails,
    models::user::SignupRequest,
    services::catalog_service::CatalogService,
    services::user_service::{Session, UserService},
    store::MemoryStorage,
    utils::error::AppResult,
};
use once_cell::sync::Lazy;
use std::env;
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

// Lowest cost bcrypt accepts, keeps signups fast in tests
pub const TEST_BCRYPT_COST: u32 = 4;

pub static CATALOG_JSON: Lazy<String> = Lazy::new(|| {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/catalog.json");
    fs::read_to_string(&path).expect("fixtures/catalog.json must be readable")
});

pub fn catalog() -> CatalogService {
    CatalogService::from_json(&CATALOG_JSON).expect("fixture catalog must load")
}

pub fn memory_user_service() -> (UserService<MemoryStorage>, MemoryStorage) {
    let storage = MemoryStorage::new();
    (UserService::new(storage.clone(), TEST_BCRYPT_COST), storage)
}

pub fn signup_request(email: &str) -> SignupRequest {
    SignupRequest {
        name: "Test User".to_string(),
        email: email.to_string(),
        password: "test_password123".to_string(),
        confirm_password: "test_password123".to_string(),
    }
}

// Register a user and hand back their signed-in session
pub fn signed_in(users: &mut UserService<MemoryStorage>, email: &str) -> AppResult<Session> {
    let mut session = Session::anonymous();
    users.signup(&mut session, signup_request(email))?;
    Ok(session)
}

pub fn valid_payment() -> PaymentDetails {
    PaymentDetails {
        card_number: "4111 1111 1111 1111".to_string(),
        card_holder: "Test User".to_string(),
        expiry_date: "12/29".to_string(),
        cvv: "123".to_string(),
        phone: String::new(),
        ..PaymentDetails::default()
    }
}

// Unique scratch file under the system temp dir
pub fn temp_store_path(prefix: &str) -> PathBuf {
    env::temp_dir()
        .join(format!("cinema_booking_{}_{}", prefix, Uuid::new_v4().simple()))
        .join("profiles.json")
}
