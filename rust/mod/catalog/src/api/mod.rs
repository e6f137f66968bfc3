mod cladd;
mod importado;

use std::sync::Arc;

use axum::{Json, Router};
use serde::Serialize;

use labeler_core::ServiceError;

use crate::service::CatalogService;

/// Shared application state.
pub type AppState = Arc<CatalogService>;

/// Build the catalog router.
///
/// Routes:
/// - `GET  /api/cladd/pieza?nroSerie=`          CLADD lookup
/// - `GET  /api/importado/all`                  full IMPORTADO result set
/// - `GET  /api/importado/pieza?codigoCompleto=` IMPORTADO lookup
/// - `POST /api/importado/pieza`                reload IMPORTADO
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(cladd::routes())
        .merge(importado::routes())
}

/// Wrap a service result, masking server faults behind `public_message`.
pub(crate) fn respond<T: Serialize>(
    result: Result<T, ServiceError>,
    public_message: &str,
) -> Result<Json<T>, ServiceError> {
    result.map(Json).map_err(|e| e.mask(public_message))
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    pub async fn call(
        router: &axum::Router,
        method: &str,
        uri: &str,
    ) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            serde_json::json!(null)
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::json!(null))
        };
        (status, json)
    }
}
