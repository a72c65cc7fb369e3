use askama::Template;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::{Form, Json};
use serde::Deserialize;
use validator::Validate;

use super::AppState;
use super::responses::ApiResponse;
use crate::models::Product;
use crate::monitor::PassSummary;
use crate::notify::format_inr;
use crate::utils::error::AppError;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub products: Vec<ProductView>,
}

/// Display row for the dashboard table.
pub struct ProductView {
    pub name: String,
    pub price: String,
    pub platform: String,
    pub last_checked: String,
    pub url: String,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        let price = if product.has_observed_price() {
            format_inr(product.price)
        } else {
            "pending".to_string()
        };

        Self {
            name: product.name,
            price,
            platform: product.platform.to_string(),
            last_checked: product.last_checked.format("%Y-%m-%d %H:%M UTC").to_string(),
            url: product.url,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddProductRequest {
    #[validate(url(message = "must be an absolute http(s) URL"))]
    pub url: String,
}

pub async fn dashboard_page(State(state): State<AppState>) -> Result<DashboardTemplate, AppError> {
    let products = state.store.find_all().await?;

    Ok(DashboardTemplate {
        products: products.into_iter().map(ProductView::from).collect(),
    })
}

pub async fn add_product_form(
    State(state): State<AppState>,
    Form(request): Form<AddProductRequest>,
) -> Result<Redirect, AppError> {
    request.validate()?;
    state.monitor.add_product(&request.url).await?;
    Ok(Redirect::to("/"))
}

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Product>>>, AppError> {
    let products = state.store.find_all().await?;
    Ok(Json(ApiResponse::success(products)))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<AddProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Product>>), AppError> {
    request.validate()?;
    let product = state.monitor.add_product(&request.url).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(product))))
}

/// Triggers a reconciliation pass outside the regular schedule.
pub async fn run_check_now(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PassSummary>>, AppError> {
    let summary = state.monitor.run_pass().await?;
    Ok(Json(ApiResponse::success(summary)))
}
