//! HTTP handlers

use crate::error::ApiError;
use crate::models::*;
use account_core::{AccountId, Bank};
use actix_web::{web, HttpResponse};
use prometheus::{Encoder, TextEncoder};
use std::sync::Arc;

// ===== Account operations =====

pub async fn create_account(
    path: web::Path<String>,
    req: web::Json<CreateAccountRequest>,
    bank: web::Data<Arc<Bank>>,
) -> Result<HttpResponse, ApiError> {
    let account_id = AccountId::new(path.into_inner());
    bank.create_account(&account_id, req.into_inner().account_name)
        .await?;

    Ok(HttpResponse::Ok().json(CreateAccountResponse {
        account_id: account_id.to_string(),
        message: "Account created successfully".to_string(),
    }))
}

pub async fn deposit(
    path: web::Path<String>,
    req: web::Json<TransactionRequest>,
    bank: web::Data<Arc<Bank>>,
) -> Result<HttpResponse, ApiError> {
    let account_id = AccountId::new(path.into_inner());
    let req = req.into_inner();
    let new_balance = bank
        .deposit(&account_id, req.amount, req.description)
        .await?;

    Ok(HttpResponse::Ok().json(TransactionResponse {
        account_id: account_id.to_string(),
        amount: req.amount,
        new_balance,
    }))
}

pub async fn withdraw(
    path: web::Path<String>,
    req: web::Json<TransactionRequest>,
    bank: web::Data<Arc<Bank>>,
) -> Result<HttpResponse, ApiError> {
    let account_id = AccountId::new(path.into_inner());
    let req = req.into_inner();
    let new_balance = bank
        .withdraw(&account_id, req.amount, req.description)
        .await?;

    Ok(HttpResponse::Ok().json(TransactionResponse {
        account_id: account_id.to_string(),
        amount: req.amount,
        new_balance,
    }))
}

pub async fn balance(
    path: web::Path<String>,
    bank: web::Data<Arc<Bank>>,
) -> Result<HttpResponse, ApiError> {
    let account_id = AccountId::new(path.into_inner());
    let balance = bank.balance(&account_id).await?;

    Ok(HttpResponse::Ok().json(BalanceResponse {
        account_id: account_id.to_string(),
        balance,
    }))
}

pub async fn entries(
    path: web::Path<String>,
    bank: web::Data<Arc<Bank>>,
) -> Result<HttpResponse, ApiError> {
    let account_id = AccountId::new(path.into_inner());
    let entries = bank.entries(&account_id).await?;

    Ok(HttpResponse::Ok().json(EntriesResponse {
        account_id: account_id.to_string(),
        entries,
    }))
}

// ===== Service endpoints =====

pub async fn health(bank: web::Data<Arc<Bank>>) -> Result<HttpResponse, ApiError> {
    let accounts = bank.approximate_accounts()?;

    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        accounts,
        active_actors: bank.active_accounts(),
    }))
}

pub async fn metrics(bank: web::Data<Arc<Bank>>) -> HttpResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&bank.metrics().registry().gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}

#[cfg(test)]
mod tests {
    use crate::routes;
    use account_core::{Bank, Config};
    use actix_web::{test, web, App};
    use event_bus::MemoryPublisher;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn test_bank(temp_dir: &TempDir) -> web::Data<Arc<Bank>> {
        let mut config = Config::default();
        config.data_dir = temp_dir.path().to_path_buf();
        let bank = Arc::new(Bank::open(config, Arc::new(MemoryPublisher::new())).unwrap());
        web::Data::new(bank)
    }

    #[actix_web::test]
    async fn test_create_deposit_balance_flow() {
        let temp_dir = TempDir::new().unwrap();
        let app =
            test::init_service(App::new().app_data(test_bank(&temp_dir)).configure(routes)).await;

        let req = test::TestRequest::post()
            .uri("/api/accounts/acct-1/create")
            .set_json(serde_json::json!({"account_name": "Test"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = test::TestRequest::post()
            .uri("/api/accounts/acct-1/deposit")
            .set_json(serde_json::json!({"amount": "100.50"}))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["new_balance"], "100.50");

        let req = test::TestRequest::get()
            .uri("/api/accounts/acct-1/balance")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["balance"], "100.50");
    }

    #[actix_web::test]
    async fn test_error_mappings() {
        let temp_dir = TempDir::new().unwrap();
        let app =
            test::init_service(App::new().app_data(test_bank(&temp_dir)).configure(routes)).await;

        // Deposit into a missing account -> 404
        let req = test::TestRequest::post()
            .uri("/api/accounts/ghost/deposit")
            .set_json(serde_json::json!({"amount": "1.00"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 404);

        // Create, then create again -> 409
        let req = test::TestRequest::post()
            .uri("/api/accounts/acct-1/create")
            .set_json(serde_json::json!({"account_name": "Test"}))
            .to_request();
        assert!(test::call_service(&app, req).await.status().is_success());

        let req = test::TestRequest::post()
            .uri("/api/accounts/acct-1/create")
            .set_json(serde_json::json!({"account_name": "Test"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 409);

        // Overdraft -> 400
        let req = test::TestRequest::post()
            .uri("/api/accounts/acct-1/withdraw")
            .set_json(serde_json::json!({"amount": "10.00"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);

        // Non-positive amount -> 400
        let req = test::TestRequest::post()
            .uri("/api/accounts/acct-1/deposit")
            .set_json(serde_json::json!({"amount": "0"}))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 400);
    }

    #[actix_web::test]
    async fn test_health_endpoint() {
        let temp_dir = TempDir::new().unwrap();
        let app =
            test::init_service(App::new().app_data(test_bank(&temp_dir)).configure(routes)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
    }
}
