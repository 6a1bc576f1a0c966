use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use axum_helpers::{
    UuidPath, ValidatedJson,
    errors::responses::{
        BadRequestUuidResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse, ServiceUnavailableResponse,
        TooManyRequestsResponse, UnauthorizedResponse,
    },
};
use listing::{ListQuery, Page};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::auth::AuthService;
use crate::error::UserResult;
use crate::models::{
    ChangePassword, CreateUser, LoginRequest, LoginResponse, UpdateUser, UserResponse,
};
use crate::service::UserService;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_users,
        create_user,
        get_user,
        update_user,
        delete_user,
        change_password,
    ),
    components(
        schemas(UserResponse, CreateUser, UpdateUser, ChangePassword),
        responses(
            NotFoundResponse,
            BadRequestValidationResponse,
            BadRequestUuidResponse,
            ConflictResponse,
            UnauthorizedResponse,
            ServiceUnavailableResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Users", description = "User account endpoints")
    )
)]
pub struct ApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(login),
    components(
        schemas(LoginRequest, LoginResponse),
        responses(BadRequestValidationResponse, UnauthorizedResponse, TooManyRequestsResponse)
    ),
    tags(
        (name = "Authentication", description = "Login")
    )
)]
pub struct AuthApiDoc;

/// Routes mounted under `/users`
pub fn router(service: UserService) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route(
            "/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/{id}/password", patch(change_password))
        .with_state(shared_service)
}

/// Routes mounted under `/authentication`
pub fn auth_router(auth: AuthService) -> Router {
    Router::new()
        .route("/login", post(login))
        .with_state(Arc::new(auth))
}

#[utoipa::path(
    get,
    path = "",
    tag = "Users",
    params(ListQuery),
    responses(
        (status = 200, description = "One page of users", body = Page<UserResponse>),
        (status = 401, response = UnauthorizedResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn list_users(
    State(service): State<Arc<UserService>>,
    Query(query): Query<ListQuery>,
) -> UserResult<Json<Page<UserResponse>>> {
    let page = service.list(&query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "",
    tag = "Users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user(
    State(service): State<Arc<UserService>>,
    ValidatedJson(input): ValidatedJson<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let user = service.create(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_user(
    State(service): State<Arc<UserService>>,
    UuidPath(id): UuidPath,
) -> UserResult<Json<UserResponse>> {
    let user = service.get(id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse)
    )
)]
async fn update_user(
    State(service): State<Arc<UserService>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<UpdateUser>,
) -> UserResult<Json<UserResponse>> {
    let user = service.update(id, input).await?;
    Ok(Json(user))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_user(
    State(service): State<Arc<UserService>>,
    UuidPath(id): UuidPath,
) -> UserResult<StatusCode> {
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Change a user's password after checking the current one
#[utoipa::path(
    patch,
    path = "/{id}/password",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = ChangePassword,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn change_password(
    State(service): State<Arc<UserService>>,
    UuidPath(id): UuidPath,
    ValidatedJson(input): ValidatedJson<ChangePassword>,
) -> UserResult<StatusCode> {
    service.change_password(id, input).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Exchange email and password for a bearer token
#[utoipa::path(
    post,
    path = "/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, response = BadRequestValidationResponse),
        (status = 401, response = UnauthorizedResponse),
        (status = 429, response = TooManyRequestsResponse)
    )
)]
async fn login(
    State(auth): State<Arc<AuthService>>,
    ValidatedJson(input): ValidatedJson<LoginRequest>,
) -> UserResult<Json<LoginResponse>> {
    let response = auth.login(input).await?;
    Ok(Json(response))
}
