use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::DirectionsAPI;
use crate::error::Error;
use crate::presenter::DirectionsView;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    #[serde(default)]
    round_trip: bool,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Path(token): Path<Uuid>,
    params: Option<Json<CreateParams>>,
) -> Result<Json<DirectionsView>, Error> {
    let round_trip = params.map(|Json(params)| params.round_trip).unwrap_or(false);
    let view = api.get_directions(token, round_trip).await?;

    Ok(view.into())
}
