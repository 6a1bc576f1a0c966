//! API routes module
//!
//! Products, sales and users sit behind the JWT guard. `/authentication`
//! stays public so clients can obtain a token.

pub mod health;

use axum::{Router, middleware};
use axum_helpers::{JwtAuth, jwt_auth_middleware};
use domain_products::{Product, ProductService};
use domain_sales::{Sale, SaleService};
use domain_users::{AuthService, LoginThrottle, User, UserService};
use listing::SharedAccessor;

/// The domain services, sharing one accessor per collection
#[derive(Clone)]
pub struct Services {
    pub products: ProductService,
    pub sales: SaleService,
    pub users: UserService,
    pub auth: AuthService,
    pub jwt: JwtAuth,
}

impl Services {
    pub fn new(
        products: SharedAccessor<Product>,
        sales: SharedAccessor<Sale>,
        users: SharedAccessor<User>,
        throttle: LoginThrottle,
        jwt: JwtAuth,
    ) -> Self {
        let products = ProductService::new(products);
        let users = UserService::new(users);
        let sales = SaleService::new(sales, products.accessor(), users.accessor());
        let auth = AuthService::new(users.clone(), throttle, jwt.clone());

        Self {
            products,
            sales,
            users,
            auth,
            jwt,
        }
    }
}

/// Create all API routes
/// Note: These are nested under /api by axum_helpers::create_router
pub fn routes(services: Services) -> Router {
    let protected = Router::new()
        .nest("/products", domain_products::handlers::router(services.products))
        .nest("/sales", domain_sales::handlers::router(services.sales))
        .nest("/users", domain_users::handlers::router(services.users))
        .route_layer(middleware::from_fn_with_state(
            services.jwt,
            jwt_auth_middleware,
        ));

    Router::new()
        .nest(
            "/authentication",
            domain_users::handlers::auth_router(services.auth),
        )
        .merge(protected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use axum_helpers::JwtConfig;
    use domain_products::seed_default_products;
    use domain_users::{CreateUser, ThrottleConfig};
    use http_body_util::BodyExt;
    use listing::InMemoryAccessor;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use tower::ServiceExt;

    const SECRET: &str = "backoffice-test-secret-at-least-32-chars";

    async fn json_body(body: Body) -> Value {
        let bytes = body.collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn services() -> Services {
        let services = Services::new(
            Arc::new(InMemoryAccessor::<Product>::new()),
            Arc::new(InMemoryAccessor::<Sale>::new()),
            Arc::new(InMemoryAccessor::<User>::new()),
            LoginThrottle::in_memory(ThrottleConfig::default()),
            JwtAuth::new(&JwtConfig::new(SECRET).unwrap()),
        );
        services
            .users
            .create(CreateUser {
                name: "Grace Hopper".to_string(),
                email: "grace@example.com".to_string(),
                password: "cobol-1959".to_string(),
                password_confirm: "cobol-1959".to_string(),
            })
            .await
            .unwrap();
        seed_default_products(services.products.accessor().as_ref())
            .await
            .unwrap();
        services
    }

    async fn login(app: &Router) -> String {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/authentication/login")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "email": "grace@example.com", "password": "cobol-1959" })
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        json_body(response.into_body()).await["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn test_protected_routes_require_token() {
        let app = routes(services().await);

        for uri in ["/products", "/sales", "/users"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_login_token_opens_protected_routes() {
        let app = routes(services().await);
        let token = login(&app).await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/products?page_size=5")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let page = json_body(response.into_body()).await;
        assert_eq!(page["count"], 12);
        assert_eq!(page["data"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_forged_token_is_rejected() {
        let app = routes(services().await);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/users")
                    .header(header::AUTHORIZATION, "Bearer not.a.jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
