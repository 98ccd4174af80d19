//! REST API layer: route handlers, DTOs, and router composition.
//!
//! All endpoints are mounted under `/api/v1`.

pub mod dto;
pub mod handlers;
pub mod openapi;
pub mod request_meta;

use axum::Router;

use crate::app_state::AppState;

pub use openapi::ApiDoc;
pub use request_meta::RequestMeta;

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    let router = Router::new()
        .nest("/api/v1", handlers::routes())
        .merge(handlers::system::routes());

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
    };

    router
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::config::EngineSettings;
    use crate::domain::Season;
    use crate::persistence::{LedgerStore, MemoryStore};
    use crate::service::RatingService;

    fn app() -> Router {
        let store: Arc<dyn LedgerStore> = Arc::new(MemoryStore::new());
        let service = RatingService::new(store, EngineSettings::for_season(Season::FIRST));
        build_router().with_state(AppState {
            rating_service: Arc::new(service),
        })
    }

    async fn status_of(uri: &str) -> StatusCode {
        let Ok(request) = Request::builder().uri(uri).body(Body::empty()) else {
            panic!("bad request {uri}");
        };
        let Ok(response) = app().oneshot(request).await;
        response.status()
    }

    #[tokio::test]
    async fn health_is_mounted_at_root() {
        assert_eq!(status_of("/health").await, StatusCode::OK);
        assert_eq!(status_of("/api/v1/health").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_season_lists_nothing() {
        assert_eq!(status_of("/api/v1/leaderboard").await, StatusCode::OK);
        assert_eq!(
            status_of("/api/v1/pair").await,
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[cfg(feature = "swagger-ui")]
    #[tokio::test]
    async fn openapi_document_is_served() {
        assert_eq!(status_of("/api-docs/openapi.json").await, StatusCode::OK);
    }
}
