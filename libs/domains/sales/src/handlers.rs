//! HTTP handlers for sales

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, NotFoundResponse,
        ServiceUnavailableResponse, UnauthorizedResponse, UnprocessableEntityResponse,
    },
};
use domain_products::ProductResponse;
use domain_users::UserResponse;
use listing::{ListQuery, Page};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::SaleResult;
use crate::models::{CreateSale, DeliveryStatus, SaleResponse, UpdateDeliveryStatus, UpdateSale};
use crate::service::SaleService;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_sales,
        create_sale,
        get_sale,
        update_sale,
        delete_sale,
        update_delivery_status,
        list_user_sales,
    ),
    components(
        schemas(
            SaleResponse,
            CreateSale,
            UpdateDeliveryStatus,
            DeliveryStatus,
            ProductResponse,
            UserResponse
        ),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            UnauthorizedResponse,
            UnprocessableEntityResponse,
            ServiceUnavailableResponse
        )
    ),
    tags(
        (name = "Sales", description = "Order and delivery endpoints")
    )
)]
pub struct ApiDoc;

/// Routes mounted under `/sales`
pub fn router(service: SaleService) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_sales).post(create_sale))
        .route(
            "/{id}",
            get(get_sale).put(update_sale).delete(delete_sale),
        )
        .route("/{id}/delivery_status", put(update_delivery_status))
        .route("/users/{id}", get(list_user_sales))
        .with_state(shared_service)
}

#[utoipa::path(
    get,
    path = "",
    tag = "Sales",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of sales", body = Page<SaleResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn list_sales(
    State(service): State<Arc<SaleService>>,
    Query(query): Query<ListQuery>,
) -> SaleResult<Json<Page<SaleResponse>>> {
    let page = service.list(&query).await?;
    Ok(Json(page))
}

/// Place an order, taking its quantity out of the product's stock
#[utoipa::path(
    post,
    path = "",
    tag = "Sales",
    request_body = CreateSale,
    responses(
        (status = 201, description = "Sale placed", body = SaleResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 422, response = UnprocessableEntityResponse)
    )
)]
async fn create_sale(
    State(service): State<Arc<SaleService>>,
    ValidatedJson(input): ValidatedJson<CreateSale>,
) -> SaleResult<impl IntoResponse> {
    let sale = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Sales",
    params(
        ("id" = Uuid, Path, description = "Sale ID")
    ),
    responses(
        (status = 200, description = "Sale found", body = SaleResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_sale(
    State(service): State<Arc<SaleService>>,
    UuidPath(id): UuidPath,
) -> SaleResult<Json<SaleResponse>> {
    let sale = service.get(id).await?;
    Ok(Json(sale))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Sales",
    params(
        ("id" = Uuid, Path, description = "Sale ID")
    ),
    request_body = UpdateSale,
    responses(
        (status = 200, description = "Sale updated", body = SaleResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = UnprocessableEntityResponse)
    )
)]
async fn update_sale(
    State(service): State<Arc<SaleService>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateSale>,
) -> SaleResult<Json<SaleResponse>> {
    let sale = service.update(id, input).await?;
    Ok(Json(sale))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Sales",
    params(
        ("id" = Uuid, Path, description = "Sale ID")
    ),
    responses(
        (status = 204, description = "Sale deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_sale(
    State(service): State<Arc<SaleService>>,
    UuidPath(id): UuidPath,
) -> SaleResult<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/{id}/delivery_status",
    tag = "Sales",
    params(
        ("id" = Uuid, Path, description = "Sale ID")
    ),
    request_body = UpdateDeliveryStatus,
    responses(
        (status = 200, description = "Delivery status updated", body = SaleResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = UnprocessableEntityResponse)
    )
)]
async fn update_delivery_status(
    State(service): State<Arc<SaleService>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateDeliveryStatus>,
) -> SaleResult<Json<SaleResponse>> {
    let sale = service.update_delivery_status(id, input).await?;
    Ok(Json(sale))
}

/// Sales placed by one user
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Sales",
    params(
        ("id" = Uuid, Path, description = "User ID"),
        ListQuery
    ),
    responses(
        (status = 200, description = "One page of the user's sales", body = Page<SaleResponse>),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse)
    )
)]
async fn list_user_sales(
    State(service): State<Arc<SaleService>>,
    UuidPath(user_id): UuidPath,
    Query(query): Query<ListQuery>,
) -> SaleResult<Json<Page<SaleResponse>>> {
    let page = service.list_for_user(user_id, &query).await?;
    Ok(Json(page))
}
