use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{FormAPI, ResolveOutcome};
use crate::entities::{DeviceLocation, EntryForm, Slot};
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    #[serde(default)]
    device_location: Option<DeviceLocation>,
}

#[derive(Serialize, Deserialize)]
pub struct EditParams {
    text: String,
}

#[derive(Serialize, Deserialize)]
pub struct SelectParams {
    row: usize,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    params: Option<Json<CreateParams>>,
) -> Result<Json<EntryForm>, Error> {
    let device_location = params.and_then(|Json(params)| params.device_location);
    let form = api.create_form(device_location).await?;

    Ok(form.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    Path(token): Path<Uuid>,
) -> Result<Json<EntryForm>, Error> {
    let form = api.find_form(token).await?;

    Ok(form.into())
}

pub async fn delete(
    Extension(api): Extension<DynAPI>,
    Path(token): Path<Uuid>,
) -> Result<Json<EntryForm>, Error> {
    let form = api.delete_form(token).await?;

    Ok(form.into())
}

pub async fn edit(
    Extension(api): Extension<DynAPI>,
    Path((token, slot)): Path<(Uuid, Slot)>,
    Json(params): Json<EditParams>,
) -> Result<Json<EntryForm>, Error> {
    let form = api.edit_field(token, slot, params.text).await?;

    Ok(form.into())
}

pub async fn confirm(
    Extension(api): Extension<DynAPI>,
    Path((token, slot)): Path<(Uuid, Slot)>,
) -> Result<Json<ResolveOutcome>, Error> {
    let outcome = api.confirm_address(token, slot).await?;

    Ok(outcome.into())
}

pub async fn select(
    Extension(api): Extension<DynAPI>,
    Path(token): Path<Uuid>,
    Json(params): Json<SelectParams>,
) -> Result<Json<EntryForm>, Error> {
    let form = api.select_candidate(token, params.row).await?;

    Ok(form.into())
}

pub async fn dismiss(
    Extension(api): Extension<DynAPI>,
    Path(token): Path<Uuid>,
) -> Result<Json<EntryForm>, Error> {
    let form = api.dismiss_picker(token).await?;

    Ok(form.into())
}

pub async fn swap(
    Extension(api): Extension<DynAPI>,
    Path(token): Path<Uuid>,
) -> Result<Json<EntryForm>, Error> {
    let form = api.swap_destinations(token).await?;

    Ok(form.into())
}

#[test]
fn confirm_then_select_through_handlers() {
    use std::sync::Arc;
    use tokio_test::block_on;

    use crate::engine::Engine;
    use crate::test_utils::{candidate, FakeAddressResolver, FakeRouteProvider};

    let resolver = FakeAddressResolver::default().with(
        "market st",
        vec![candidate("1 Market St", 1.0), candidate("2 Market St", 2.0)],
    );
    let api = Arc::new(Engine::new(
        Arc::new(resolver),
        Arc::new(FakeRouteProvider::new(vec![])),
    )) as DynAPI;

    block_on(async {
        let Json(form) = create(
            Extension(api.clone()),
            Some(Json(CreateParams {
                device_location: None,
            })),
        )
        .await
        .unwrap();

        edit(
            Extension(api.clone()),
            Path((form.token, Slot::Source)),
            Json(EditParams {
                text: "market st".into(),
            }),
        )
        .await
        .unwrap();

        let Json(outcome) = confirm(Extension(api.clone()), Path((form.token, Slot::Source)))
            .await
            .unwrap();
        assert!(matches!(outcome, ResolveOutcome::Ambiguous { .. }));

        let Json(form) = select(
            Extension(api.clone()),
            Path(form.token),
            Json(SelectParams { row: 0 }),
        )
        .await
        .unwrap();
        assert_eq!(form.source.waypoint.label, "1 Market St");
    });
}

#[test]
fn create_without_body_then_delete() {
    use std::sync::Arc;
    use tokio_test::block_on;

    use crate::engine::Engine;
    use crate::test_utils::{FakeAddressResolver, FakeRouteProvider};

    let api = Arc::new(Engine::new(
        Arc::new(FakeAddressResolver::default()),
        Arc::new(FakeRouteProvider::new(vec![])),
    )) as DynAPI;

    block_on(async {
        let Json(form) = create(Extension(api.clone()), None).await.unwrap();
        assert!(!form.source.waypoint.is_resolved());

        let Json(deleted) = delete(Extension(api.clone()), Path(form.token))
            .await
            .unwrap();
        assert_eq!(deleted.token, form.token);

        assert!(find(Extension(api.clone()), Path(form.token)).await.is_err());
    });
}
