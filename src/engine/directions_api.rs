use super::Engine;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    api::DirectionsAPI,
    error::Error,
    planner,
    presenter::{self, DirectionsView},
};

#[async_trait]
impl DirectionsAPI for Engine {
    /// The plan is computed against a snapshot of the form. If the caller
    /// drops this future, the in-flight leg is cancelled and nothing is kept.
    #[tracing::instrument(skip(self))]
    async fn get_directions(&self, token: Uuid, round_trip: bool) -> Result<DirectionsView, Error> {
        let request = self
            .with_form(token, |form| form.route_request(round_trip))
            .await?;

        let plan = planner::plan(self.routes.as_ref(), request).await?;

        Ok(presenter::render(&plan))
    }
}

#[cfg(test)]
use crate::{
    api::FormAPI,
    entities::Slot,
    error::upstream_error,
    test_utils::{alternative, candidate, FakeAddressResolver, FakeRouteProvider},
};
#[cfg(test)]
use std::sync::Arc;
#[cfg(test)]
use tokio_test::block_on;

#[cfg(test)]
async fn resolved_form(engine: &Engine, fields: &[(Slot, &str)]) -> Uuid {
    let form = engine.create_form(None).await.unwrap();

    for (slot, text) in fields {
        engine
            .edit_field(form.token, *slot, text.to_string())
            .await
            .unwrap();
        engine.confirm_address(form.token, *slot).await.unwrap();
    }

    form.token
}

#[cfg(test)]
fn resolver() -> FakeAddressResolver {
    FakeAddressResolver::default()
        .with("a", vec![candidate("A", 0.0)])
        .with("b", vec![candidate("B", 1.0)])
        .with("c", vec![candidate("C", 2.0)])
}

#[test]
fn source_and_one_destination() {
    let routes = Arc::new(FakeRouteProvider::new(vec![Ok(vec![
        alternative(900.0, 12000.0),
        alternative(840.0, 13000.0),
    ])]));
    let engine = Engine::new(Arc::new(resolver()), routes.clone());

    let view = block_on(async {
        let token = resolved_form(&engine, &[(Slot::Source, "a"), (Slot::Destination1, "b")]).await;
        engine.get_directions(token, false).await.unwrap()
    });

    assert_eq!(routes.calls().len(), 1);
    assert_eq!(view.map.overlays.len(), 1);
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].starting_address, "A");
    assert_eq!(view.rows[0].ending_address, "B");
    assert_eq!(view.total_travel_time, 840.0);
    assert_eq!(view.total_travel_time_text, "14 min");
}

#[test]
fn skipped_middle_destination() {
    let routes = Arc::new(FakeRouteProvider::new(vec![Ok(vec![alternative(60.0, 1.0)])]));
    let engine = Engine::new(Arc::new(resolver()), routes.clone());

    let view = block_on(async {
        let token = resolved_form(&engine, &[(Slot::Source, "a"), (Slot::Destination2, "c")]).await;
        engine.get_directions(token, false).await.unwrap()
    });

    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].ending_address, "C");
}

#[test]
fn two_destinations_in_order() {
    let routes = Arc::new(FakeRouteProvider::new(vec![
        Ok(vec![alternative(600.0, 1.0)]),
        Ok(vec![alternative(300.0, 1.0)]),
    ]));
    let engine = Engine::new(Arc::new(resolver()), routes.clone());

    let view = block_on(async {
        let token = resolved_form(
            &engine,
            &[
                (Slot::Source, "a"),
                (Slot::Destination1, "b"),
                (Slot::Destination2, "c"),
            ],
        )
        .await;
        engine.get_directions(token, false).await.unwrap()
    });

    let rows: Vec<_> = view
        .rows
        .iter()
        .map(|row| (row.starting_address.as_str(), row.ending_address.as_str()))
        .collect();
    assert_eq!(rows, vec![("A", "B"), ("B", "C")]);
    assert_eq!(view.total_travel_time, 900.0);
    assert_eq!(routes.max_in_flight(), 1);
}

#[test]
fn second_leg_failure_discards_first() {
    let routes = Arc::new(FakeRouteProvider::new(vec![
        Ok(vec![alternative(600.0, 1.0)]),
        Err(upstream_error()),
    ]));
    let engine = Engine::new(Arc::new(resolver()), routes.clone());

    let err = block_on(async {
        let token = resolved_form(
            &engine,
            &[
                (Slot::Source, "a"),
                (Slot::Destination1, "b"),
                (Slot::Destination2, "c"),
            ],
        )
        .await;
        engine.get_directions(token, false).await.unwrap_err()
    });

    assert!(err.is_no_route_available());
    assert_eq!(err.message, "Directions not available.");
    assert_eq!(routes.calls().len(), 2);
}

#[test]
fn incomplete_form_is_rejected_without_routing() {
    let routes = Arc::new(FakeRouteProvider::new(vec![]));
    let engine = Engine::new(Arc::new(resolver()), routes.clone());

    let err = block_on(async {
        let token = resolved_form(&engine, &[(Slot::Destination1, "b")]).await;
        engine.get_directions(token, false).await.unwrap_err()
    });

    assert_eq!(
        err.message,
        "Please enter a valid starting point and at least one destination"
    );
    assert!(routes.calls().is_empty());
}

#[test]
fn round_trip_adds_return_leg() {
    let routes = Arc::new(FakeRouteProvider::new(vec![
        Ok(vec![alternative(600.0, 1.0)]),
        Ok(vec![alternative(620.0, 1.0)]),
    ]));
    let engine = Engine::new(Arc::new(resolver()), routes.clone());

    let view = block_on(async {
        let token = resolved_form(&engine, &[(Slot::Source, "a"), (Slot::Destination1, "b")]).await;
        engine.get_directions(token, true).await.unwrap()
    });

    assert_eq!(view.rows.len(), 2);
    assert_eq!(view.rows[1].ending_address, "A");
    assert_eq!(view.total_travel_time, 1220.0);
}
