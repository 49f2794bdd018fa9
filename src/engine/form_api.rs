use super::Engine;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    api::{FormAPI, ResolveOutcome},
    entities::{Candidate, DeviceLocation, EntryForm, Pick, Picker, Slot},
    error::{address_not_found_error, invalid_state_error, permission_denied_error, Error},
};

impl Engine {
    #[tracing::instrument(skip(self))]
    async fn locate_source(&self, device_location: &DeviceLocation) -> Result<Candidate, Error> {
        if !device_location.is_authorized() {
            return Err(permission_denied_error());
        }

        self.resolver
            .reverse_resolve(device_location.coordinates)
            .await
    }
}

#[async_trait]
impl FormAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_form(
        &self,
        device_location: Option<DeviceLocation>,
    ) -> Result<EntryForm, Error> {
        let mut form = EntryForm::new();

        if let Some(device_location) = device_location {
            match self.locate_source(&device_location).await {
                Ok(candidate) => form.resolve(Slot::Source, candidate),
                Err(err) if err.is_permission_denied() => {
                    tracing::debug!("location not authorized, leaving source empty");
                }
                Err(err) => {
                    tracing::warn!("could not prefill source: {:?}", err);
                }
            }
        }

        self.insert_form(form.clone()).await;

        Ok(form)
    }

    #[tracing::instrument(skip(self))]
    async fn find_form(&self, token: Uuid) -> Result<EntryForm, Error> {
        self.with_form(token, |form| Ok(form.clone())).await
    }

    #[tracing::instrument(skip(self))]
    async fn delete_form(&self, token: Uuid) -> Result<EntryForm, Error> {
        self.remove_form(token).await
    }

    #[tracing::instrument(skip(self))]
    async fn edit_field(&self, token: Uuid, slot: Slot, text: String) -> Result<EntryForm, Error> {
        self.with_form(token, |form| {
            form.edit(slot, text);
            Ok(form.clone())
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn confirm_address(&self, token: Uuid, slot: Slot) -> Result<ResolveOutcome, Error> {
        let (text, revision) = self
            .with_form(token, |form| {
                let field = form.field(slot);
                Ok((field.waypoint.label.clone(), field.revision))
            })
            .await?;

        if text.trim().is_empty() {
            return Err(address_not_found_error());
        }

        let mut candidates = self.resolver.resolve(&text).await?;

        if candidates.is_empty() {
            return Err(address_not_found_error());
        }

        tracing::info!("{} candidate(s) for {:?}", candidates.len(), slot);

        self.with_form(token, |form| {
            if form.field(slot).revision != revision {
                tracing::info!("{:?} was edited while resolving, discarding result", slot);
                return Err(invalid_state_error());
            }

            if candidates.len() == 1 {
                form.resolve(slot, candidates.remove(0));
                return Ok(ResolveOutcome::Resolved { form: form.clone() });
            }

            let picker = Picker::new(slot, candidates);
            let rows = picker.rows();
            form.attach_picker(picker);

            Ok(ResolveOutcome::Ambiguous {
                form: form.clone(),
                rows,
            })
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn select_candidate(&self, token: Uuid, row: usize) -> Result<EntryForm, Error> {
        self.with_form(token, |form| {
            if let Pick::NoneOfTheAbove = form.select(row)? {
                tracing::info!("no candidate accepted");
            }

            Ok(form.clone())
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn dismiss_picker(&self, token: Uuid) -> Result<EntryForm, Error> {
        self.with_form(token, |form| {
            form.dismiss_picker();
            Ok(form.clone())
        })
        .await
    }

    #[tracing::instrument(skip(self))]
    async fn swap_destinations(&self, token: Uuid) -> Result<EntryForm, Error> {
        self.with_form(token, |form| {
            form.swap_destinations();
            Ok(form.clone())
        })
        .await
    }
}

#[cfg(test)]
use crate::entities::{Authorization, NONE_OF_THE_ABOVE};
#[cfg(test)]
use crate::test_utils::{
    candidate, coordinates, FakeAddressResolver, FakeRouteProvider, GatedResolver,
};
#[cfg(test)]
use std::sync::{atomic::Ordering, Arc};
#[cfg(test)]
use tokio_test::block_on;

#[cfg(test)]
fn engine(resolver: FakeAddressResolver) -> Engine {
    Engine::new(Arc::new(resolver), Arc::new(FakeRouteProvider::new(vec![])))
}

#[test]
fn single_candidate_resolves_immediately() {
    let engine = engine(
        FakeAddressResolver::default().with("apple park", vec![candidate("Apple Park", 1.0)]),
    );

    block_on(async {
        let form = engine.create_form(None).await.unwrap();
        engine
            .edit_field(form.token, Slot::Source, "apple park".into())
            .await
            .unwrap();

        let outcome = engine.confirm_address(form.token, Slot::Source).await.unwrap();

        match outcome {
            ResolveOutcome::Resolved { form } => {
                assert!(form.picker.is_none());
                assert!(form.source.selected);
                assert_eq!(form.source.waypoint.label, "Apple Park");
            }
            ResolveOutcome::Ambiguous { .. } => panic!("expected immediate resolution"),
        }
    });
}

#[test]
fn multiple_candidates_open_picker() {
    let offered = vec![
        candidate("Springfield, IL", 1.0),
        candidate("Springfield, MA", 2.0),
        candidate("Springfield, MO", 3.0),
    ];
    let engine = engine(FakeAddressResolver::default().with("springfield", offered.clone()));

    block_on(async {
        let form = engine.create_form(None).await.unwrap();
        engine
            .edit_field(form.token, Slot::Destination1, "springfield".into())
            .await
            .unwrap();

        let outcome = engine
            .confirm_address(form.token, Slot::Destination1)
            .await
            .unwrap();

        let rows = match &outcome {
            ResolveOutcome::Ambiguous { rows, .. } => rows.clone(),
            ResolveOutcome::Resolved { .. } => panic!("expected a picker"),
        };
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3].text, NONE_OF_THE_ABOVE);
        assert!(!outcome.form().destination_1.waypoint.is_resolved());

        let form = engine.select_candidate(form.token, 2).await.unwrap();
        assert!(form.picker.is_none());
        assert!(form.destination_1.selected);
        assert_eq!(
            form.destination_1.waypoint.resolved,
            Some(offered[2].clone())
        );
    });
}

#[test]
fn none_of_the_above_leaves_field_unresolved() {
    let engine = engine(FakeAddressResolver::default().with(
        "main st",
        vec![candidate("1 Main St", 1.0), candidate("2 Main St", 2.0)],
    ));

    block_on(async {
        let form = engine.create_form(None).await.unwrap();
        engine
            .edit_field(form.token, Slot::Source, "main st".into())
            .await
            .unwrap();
        engine.confirm_address(form.token, Slot::Source).await.unwrap();

        let form = engine.select_candidate(form.token, 2).await.unwrap();

        assert!(form.picker.is_none());
        assert!(!form.source.selected);
        assert!(!form.source.waypoint.is_resolved());
    });
}

#[test]
fn dismiss_leaves_field_unresolved() {
    let engine = engine(FakeAddressResolver::default().with(
        "main st",
        vec![candidate("1 Main St", 1.0), candidate("2 Main St", 2.0)],
    ));

    block_on(async {
        let form = engine.create_form(None).await.unwrap();
        engine
            .edit_field(form.token, Slot::Source, "main st".into())
            .await
            .unwrap();
        engine.confirm_address(form.token, Slot::Source).await.unwrap();

        let form = engine.dismiss_picker(form.token).await.unwrap();

        assert!(form.picker.is_none());
        assert!(!form.source.waypoint.is_resolved());
    });
}

#[test]
fn unknown_address_is_not_found() {
    let engine = engine(FakeAddressResolver::default());

    block_on(async {
        let form = engine.create_form(None).await.unwrap();
        engine
            .edit_field(form.token, Slot::Destination2, "nowhere at all".into())
            .await
            .unwrap();

        let err = engine
            .confirm_address(form.token, Slot::Destination2)
            .await
            .unwrap_err();
        assert!(err.is_address_not_found());

        let form = engine.find_form(form.token).await.unwrap();
        assert!(!form.destination_2.waypoint.is_resolved());
        assert!(form.picker.is_none());
    });
}

#[test]
fn empty_field_is_not_found() {
    let engine = engine(FakeAddressResolver::default());

    block_on(async {
        let form = engine.create_form(None).await.unwrap();

        let err = engine
            .confirm_address(form.token, Slot::Source)
            .await
            .unwrap_err();
        assert!(err.is_address_not_found());
    });
}

#[test]
fn granted_location_prefills_source() {
    let engine = engine(
        FakeAddressResolver::default().with_reverse(candidate("1 Current Place", 9.0)),
    );

    let form = block_on(engine.create_form(Some(DeviceLocation {
        coordinates: coordinates(9.0),
        authorization: Authorization::Granted,
    })))
    .unwrap();

    assert!(form.source.selected);
    assert_eq!(form.source.waypoint.label, "1 Current Place");
}

#[test]
fn denied_location_is_silent() {
    let resolver = Arc::new(
        FakeAddressResolver::default().with_reverse(candidate("1 Current Place", 9.0)),
    );
    let engine = Engine::new(resolver.clone(), Arc::new(FakeRouteProvider::new(vec![])));

    for authorization in [Authorization::Denied, Authorization::NotDetermined] {
        let form = block_on(engine.create_form(Some(DeviceLocation {
            coordinates: coordinates(9.0),
            authorization,
        })))
        .unwrap();

        assert!(!form.source.waypoint.is_resolved());
        assert_eq!(form.source.waypoint.label, "");
    }

    assert_eq!(resolver.reverse_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn failed_reverse_lookup_is_silent() {
    let engine = engine(FakeAddressResolver::default());

    let form = block_on(engine.create_form(Some(DeviceLocation {
        coordinates: coordinates(9.0),
        authorization: Authorization::Granted,
    })))
    .unwrap();

    assert!(!form.source.waypoint.is_resolved());
}

#[test]
fn swap_is_persisted() {
    let engine = engine(
        FakeAddressResolver::default().with("b", vec![candidate("B Street", 2.0)]),
    );

    block_on(async {
        let form = engine.create_form(None).await.unwrap();
        engine
            .edit_field(form.token, Slot::Destination1, "b".into())
            .await
            .unwrap();
        engine
            .confirm_address(form.token, Slot::Destination1)
            .await
            .unwrap();
        engine
            .edit_field(form.token, Slot::Destination2, "c".into())
            .await
            .unwrap();

        engine.swap_destinations(form.token).await.unwrap();
        let form = engine.find_form(form.token).await.unwrap();

        assert_eq!(form.destination_1.waypoint.label, "c");
        assert!(!form.destination_1.selected);
        assert_eq!(form.destination_2.waypoint.label, "B Street");
        assert!(form.destination_2.selected);
    });
}

#[test]
fn swap_during_lookup_discards_result() {
    let resolver = Arc::new(GatedResolver::new(vec![candidate("B STREET", 2.0)]));
    let engine = Engine::new(resolver.clone(), Arc::new(FakeRouteProvider::new(vec![])));

    block_on(async {
        let form = engine.create_form(None).await.unwrap();
        engine
            .edit_field(form.token, Slot::Destination1, "b street".into())
            .await
            .unwrap();
        engine
            .edit_field(form.token, Slot::Destination2, "c street".into())
            .await
            .unwrap();

        let (outcome, _) = tokio::join!(
            engine.confirm_address(form.token, Slot::Destination1),
            async {
                resolver.entered.notified().await;
                engine.swap_destinations(form.token).await.unwrap();
                resolver.gate.notify_one();
            }
        );

        assert_eq!(
            outcome.unwrap_err().code,
            crate::error::INVALID_STATE_ERROR
        );

        let form = engine.find_form(form.token).await.unwrap();
        assert_eq!(form.destination_1.waypoint.label, "c street");
        assert!(!form.destination_1.waypoint.is_resolved());
        assert_eq!(form.destination_2.waypoint.label, "b street");
        assert!(!form.destination_2.waypoint.is_resolved());
    });
}

#[test]
fn expired_forms_are_evicted_on_create() {
    let engine = engine(FakeAddressResolver::default()).with_form_ttl(chrono::Duration::zero());

    block_on(async {
        let first = engine.create_form(None).await.unwrap();
        let second = engine.create_form(None).await.unwrap();

        let err = engine.find_form(first.token).await.unwrap_err();
        assert_eq!(err.code, crate::error::INVALID_INPUT_ERROR);
        assert!(engine.find_form(second.token).await.is_ok());
    });
}

#[test]
fn live_forms_survive_create() {
    let engine = engine(FakeAddressResolver::default());

    block_on(async {
        let first = engine.create_form(None).await.unwrap();
        engine.create_form(None).await.unwrap();

        assert!(engine.find_form(first.token).await.is_ok());
    });
}

#[test]
fn deleted_form_is_gone() {
    let engine = engine(FakeAddressResolver::default());

    block_on(async {
        let form = engine.create_form(None).await.unwrap();

        engine.delete_form(form.token).await.unwrap();

        let err = engine.find_form(form.token).await.unwrap_err();
        assert_eq!(err.code, crate::error::INVALID_INPUT_ERROR);
        assert!(engine.delete_form(form.token).await.is_err());
    });
}

#[test]
fn unknown_form_is_invalid_input() {
    let engine = engine(FakeAddressResolver::default());

    let err = block_on(engine.find_form(Uuid::new_v4())).unwrap_err();

    assert_eq!(err.code, crate::error::INVALID_INPUT_ERROR);
}
