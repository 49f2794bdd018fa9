mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, patch, post},
    Router,
};

use crate::api::API;
use crate::error::{unexpected_error, Error};
use crate::server::handlers::{directions, forms};

type DynAPI = Arc<dyn API + Send + Sync>;

pub fn router<T: API + Sync + Send + 'static>(api: T) -> Router {
    let api = Arc::new(api) as DynAPI;

    Router::new()
        .route("/forms", post(forms::create))
        .route("/forms/:token", get(forms::find).delete(forms::delete))
        .route("/forms/:token/fields/:slot", patch(forms::edit))
        .route("/forms/:token/fields/:slot/confirm", post(forms::confirm))
        .route("/forms/:token/picker/select", post(forms::select))
        .route("/forms/:token/picker/dismiss", post(forms::dismiss))
        .route("/forms/:token/swap", post(forms::swap))
        .route("/forms/:token/directions", post(directions::create))
        .layer(Extension(api))
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T, addr: SocketAddr) -> Result<(), Error> {
    let app = router(api);

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(unexpected_error)
}
