// API layer - HTTP endpoints
pub mod auth;
pub mod health;
pub mod helpers;
pub mod inventory;
pub mod listing;
pub mod rbac;
pub mod user;

#[cfg(test)]
mod helpers_test;

use std::sync::Arc;

use poem::{Endpoint, EndpointExt, Route};
use poem_openapi::OpenApiService;

pub use auth::{AuthApi, BearerAuth};
pub use health::HealthApi;
pub use inventory::InventoryApi;
pub use listing::ListingApi;
pub use rbac::RbacApi;
pub use user::UserApi;

use crate::AppData;
use crate::coordinators::{
    AuthCoordinator, InventoryCoordinator, ListingCoordinator, RbacCoordinator, UserCoordinator,
};

pub type ApiService = OpenApiService<(HealthApi, AuthApi, ListingApi, InventoryApi, UserApi, RbacApi), ()>;

/// Build the OpenAPI service with every endpoint group wired to its coordinator
pub fn api_service(app_data: Arc<AppData>, server_url: &str) -> ApiService {
    let auth_coordinator = Arc::new(AuthCoordinator::new(app_data.clone()));
    let listing_coordinator = Arc::new(ListingCoordinator::new(app_data.clone()));
    let inventory_coordinator = Arc::new(InventoryCoordinator::new(app_data.clone()));
    let user_coordinator = Arc::new(UserCoordinator::new(app_data.clone()));
    let rbac_coordinator = Arc::new(RbacCoordinator::new(app_data));

    OpenApiService::new(
        (
            HealthApi,
            AuthApi::new(auth_coordinator.clone()),
            ListingApi::new(auth_coordinator.clone(), listing_coordinator),
            InventoryApi::new(auth_coordinator.clone(), inventory_coordinator),
            UserApi::new(auth_coordinator.clone(), user_coordinator),
            RbacApi::new(auth_coordinator, rbac_coordinator),
        ),
        "Brokerage Backend API",
        env!("CARGO_PKG_VERSION"),
    )
    .server(server_url)
}

/// Routes: the API under `/api`, Swagger UI under `/swagger`
pub fn routes(app_data: Arc<AppData>, server_url: &str) -> impl Endpoint + use<> {
    let service = api_service(app_data, server_url);
    let ui = service.swagger_ui();
    Route::new()
        .nest("/api", service)
        .nest("/swagger", ui)
        .with(poem::middleware::Tracing)
}
