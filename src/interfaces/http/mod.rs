use actix_cors::Cors;
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::application::use_cases::reconciler::ReconcileResult;
use crate::application::use_cases::subscription::SubscriptionUseCase;
use crate::domain::error::AppError;
use crate::domain::identity::IdentityQuery;
use crate::domain::status::SubscriptionStatus;

pub struct HttpState {
    pub subscription: Arc<SubscriptionUseCase>,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionQueryParams {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub username: Option<String>,
}

/// Read output. The password value is never part of this shape — only a
/// presence flag — and there is deliberately no field that could carry it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub found: bool,
    pub username: Option<String>,
    pub expire_date: Option<String>,
    pub status: Option<SubscriptionStatus>,
    pub matched_field_count: usize,
    pub has_password: bool,
    pub candidate_count: usize,
}

impl SubscriptionResponse {
    pub fn from_result(result: &ReconcileResult) -> Self {
        let record = result.matched.record.as_ref();
        Self {
            found: result.found(),
            username: record.and_then(|r| r.username()).map(str::to_string),
            expire_date: record.and_then(|r| r.expiry()).map(str::to_string),
            status: result.status,
            matched_field_count: result.matched.matched_field_count(),
            has_password: record.map(|r| r.has_password()).unwrap_or(false),
            candidate_count: result.matched.qualifying_candidates,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub phone: String,
    #[validate(length(min = 1))]
    pub username: String,
    #[validate(length(min = 1))]
    pub subscription_type: String,
    #[validate(length(min = 1))]
    pub payment_method: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub success: bool,
    pub message: String,
    pub matched_field_count: usize,
    pub candidate_count: usize,
}

#[get("/subscription")]
async fn get_subscription(
    data: web::Data<HttpState>,
    params: web::Query<SubscriptionQueryParams>,
) -> impl Responder {
    let query = match IdentityQuery::new(
        params.email.as_deref(),
        params.phone.as_deref(),
        params.username.as_deref(),
    ) {
        Ok(query) => query,
        Err(e) => return error_response(&e),
    };

    match data.subscription.lookup(&query).await {
        Ok(result) => HttpResponse::Ok().json(SubscriptionResponse::from_result(&result)),
        Err(e) => error_response(&e),
    }
}

#[post("/register")]
async fn register(
    data: web::Data<HttpState>,
    req: web::Json<RegistrationRequest>,
) -> impl Responder {
    if let Err(e) = req.validate() {
        warn!(error = %e, "Rejected registration request");
        return error_response(&AppError::ValidationError(e.to_string()));
    }

    let query = match IdentityQuery::new(
        Some(req.email.as_str()),
        Some(req.phone.as_str()),
        Some(req.username.as_str()),
    ) {
        Ok(query) => query,
        Err(e) => return error_response(&e),
    };

    let mut assignments = BTreeMap::new();
    assignments.insert("payment method".to_string(), req.payment_method.clone());
    assignments.insert("subscription type".to_string(), req.subscription_type.clone());

    match data.subscription.register(&query, assignments).await {
        Ok(outcome) => {
            info!(name = %req.name, row = outcome.target_row_index, "Registration accepted");
            HttpResponse::Ok().json(RegistrationResponse {
                success: true,
                message: "Registration successful".to_string(),
                matched_field_count: outcome.matched_field_count,
                candidate_count: outcome.qualifying_candidates,
            })
        }
        Err(e) => error_response(&e),
    }
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

fn error_response(error: &AppError) -> HttpResponse {
    let body = serde_json::json!({ "error": error.to_string() });
    match error {
        AppError::AmbiguousQuery(_) | AppError::ValidationError(_) => {
            HttpResponse::BadRequest().json(body)
        }
        AppError::NoMatchingRecord(_) => HttpResponse::NotFound().json(body),
        // The upstream export is unusable, not this service.
        AppError::MalformedSnapshot(_) => HttpResponse::BadGateway().json(body),
        AppError::ConfigError(_) | AppError::TransportError(_) => {
            HttpResponse::InternalServerError().json(body)
        }
    }
}

pub fn start_server(
    subscription: Arc<SubscriptionUseCase>,
    bind_addr: &str,
    bind_port: u16,
) -> std::io::Result<Server> {
    let state = web::Data::new(HttpState { subscription });

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // The original frontend is served cross-origin.

        App::new().wrap(cors).app_data(state.clone()).service(
            web::scope("/api")
                .service(get_subscription)
                .service(register)
                .service(health),
        )
    })
    .bind((bind_addr, bind_port))?
    .run();

    Ok(server)
}
