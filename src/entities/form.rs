use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{Candidate, Pick, Picker, RouteRequest, Stop, Waypoint};
use crate::error::{incomplete_route_error, invalid_state_error, Error};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slot {
    #[serde(rename = "source")]
    Source,
    #[serde(rename = "destination_1")]
    Destination1,
    #[serde(rename = "destination_2")]
    Destination2,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Source, Slot::Destination1, Slot::Destination2];
}

/// One address text field together with its confirm button state.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub waypoint: Waypoint,
    pub selected: bool,
    pub revision: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntryForm {
    pub token: Uuid,
    pub created_at: DateTime<Utc>,
    pub source: Field,
    pub destination_1: Field,
    pub destination_2: Field,
    pub picker: Option<Picker>,
    /// Source of field revisions; never handed out twice.
    edits: u64,
}

impl EntryForm {
    pub fn new() -> Self {
        Self {
            token: Uuid::new_v4(),
            created_at: Utc::now(),
            source: Field::default(),
            destination_1: Field::default(),
            destination_2: Field::default(),
            picker: None,
            edits: 0,
        }
    }

    fn next_revision(&mut self) -> u64 {
        self.edits += 1;
        self.edits
    }

    pub fn field(&self, slot: Slot) -> &Field {
        match slot {
            Slot::Source => &self.source,
            Slot::Destination1 => &self.destination_1,
            Slot::Destination2 => &self.destination_2,
        }
    }

    fn field_mut(&mut self, slot: Slot) -> &mut Field {
        match slot {
            Slot::Source => &mut self.source,
            Slot::Destination1 => &mut self.destination_1,
            Slot::Destination2 => &mut self.destination_2,
        }
    }

    pub fn edit(&mut self, slot: Slot, text: String) {
        let revision = self.next_revision();
        let field = self.field_mut(slot);
        field.waypoint.edit(text);
        field.selected = false;
        field.revision = revision;

        if self.picker.as_ref().map(|picker| picker.slot) == Some(slot) {
            self.picker = None;
        }
    }

    pub fn resolve(&mut self, slot: Slot, candidate: Candidate) {
        let field = self.field_mut(slot);
        field.waypoint.resolve(candidate);
        field.selected = true;
    }

    pub fn attach_picker(&mut self, picker: Picker) {
        self.picker = Some(picker);
    }

    /// Applies the user's choice and removes the picker, whichever row was chosen.
    pub fn select(&mut self, row: usize) -> Result<Pick, Error> {
        let picker = self.picker.take().ok_or_else(invalid_state_error)?;
        let slot = picker.slot;

        let pick = match picker.clone().select(row) {
            Ok(pick) => pick,
            Err(err) => {
                self.picker = Some(picker);
                return Err(err);
            }
        };

        if let Pick::Candidate(candidate) = &pick {
            self.resolve(slot, candidate.clone());
        }

        Ok(pick)
    }

    pub fn dismiss_picker(&mut self) {
        self.picker = None;
    }

    /// Exchanges both destination fields as a whole: text, resolution and
    /// button state move together. Both fields count as edited, so a lookup
    /// started before the swap no longer matches either of them.
    pub fn swap_destinations(&mut self) {
        std::mem::swap(&mut self.destination_1, &mut self.destination_2);
        self.destination_1.revision = self.next_revision();
        self.destination_2.revision = self.next_revision();

        if let Some(picker) = self.picker.as_mut() {
            picker.slot = match picker.slot {
                Slot::Destination1 => Slot::Destination2,
                Slot::Destination2 => Slot::Destination1,
                Slot::Source => Slot::Source,
            };
        }
    }

    pub fn can_get_directions(&self) -> bool {
        self.source.waypoint.is_resolved()
            && (self.destination_1.waypoint.is_resolved()
                || self.destination_2.waypoint.is_resolved())
    }

    /// Snapshots the resolved fields into an owned request for the planner.
    pub fn route_request(&self, round_trip: bool) -> Result<RouteRequest, Error> {
        if !self.can_get_directions() {
            return Err(incomplete_route_error());
        }

        let stops = Slot::ALL
            .iter()
            .filter_map(|slot| Stop::try_from(&self.field(*slot).waypoint).ok())
            .collect();

        RouteRequest::new(stops, round_trip)
    }
}

impl Default for EntryForm {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
fn candidate(address: &str, lat: f64) -> Candidate {
    use crate::entities::Coordinates;

    Candidate::new(address.into(), Coordinates { lat, lng: 0.0 })
}

#[test]
fn edit_unselects_and_drops_picker() {
    let mut form = EntryForm::new();
    form.resolve(Slot::Destination1, candidate("A Street", 1.0));
    form.attach_picker(Picker::new(
        Slot::Destination1,
        vec![candidate("B1", 2.0), candidate("B2", 3.0)],
    ));

    form.edit(Slot::Destination1, "B".into());

    let field = form.field(Slot::Destination1);
    assert!(!field.selected);
    assert!(!field.waypoint.is_resolved());
    assert_eq!(field.revision, 1);
    assert!(form.picker.is_none());
}

#[test]
fn edit_other_field_keeps_picker() {
    let mut form = EntryForm::new();
    form.attach_picker(Picker::new(
        Slot::Source,
        vec![candidate("A1", 2.0), candidate("A2", 3.0)],
    ));

    form.edit(Slot::Destination2, "C".into());

    assert!(form.picker.is_some());
}

#[test]
fn select_resolves_and_removes_picker() {
    let mut form = EntryForm::new();
    form.edit(Slot::Source, "main st".into());
    form.attach_picker(Picker::new(
        Slot::Source,
        vec![candidate("1 Main St", 2.0), candidate("2 Main St", 3.0)],
    ));

    form.select(1).unwrap();

    assert!(form.picker.is_none());
    assert!(form.source.selected);
    assert_eq!(form.source.waypoint.label, "2 Main St");
    assert_eq!(form.source.waypoint.coordinates().unwrap().lat, 3.0);
}

#[test]
fn select_sentinel_leaves_unresolved() {
    let mut form = EntryForm::new();
    form.edit(Slot::Source, "main st".into());
    form.attach_picker(Picker::new(
        Slot::Source,
        vec![candidate("1 Main St", 2.0), candidate("2 Main St", 3.0)],
    ));

    assert_eq!(form.select(2).unwrap(), Pick::NoneOfTheAbove);
    assert!(form.picker.is_none());
    assert!(!form.source.selected);
    assert_eq!(form.source.waypoint.label, "main st");
}

#[test]
fn select_out_of_range_keeps_picker() {
    let mut form = EntryForm::new();
    form.attach_picker(Picker::new(
        Slot::Source,
        vec![candidate("1 Main St", 2.0), candidate("2 Main St", 3.0)],
    ));

    assert!(form.select(7).is_err());
    assert!(form.picker.is_some());
}

#[test]
fn select_without_picker_is_invalid_state() {
    let mut form = EntryForm::new();

    assert_eq!(
        form.select(0).unwrap_err().code,
        crate::error::INVALID_STATE_ERROR
    );
}

#[test]
fn swap_moves_text_resolution_and_selection_together() {
    let mut form = EntryForm::new();
    form.resolve(Slot::Destination1, candidate("B Street", 1.0));
    form.edit(Slot::Destination2, "c street".into());

    form.swap_destinations();

    assert_eq!(form.destination_1.waypoint.label, "c street");
    assert!(!form.destination_1.selected);
    assert!(!form.destination_1.waypoint.is_resolved());
    assert_eq!(form.destination_2.waypoint.label, "B Street");
    assert!(form.destination_2.selected);
    assert!(form.destination_2.waypoint.is_resolved());
}

#[test]
fn swap_bumps_both_destination_revisions() {
    let mut form = EntryForm::new();
    form.edit(Slot::Destination1, "b street".into());
    form.edit(Slot::Destination2, "c street".into());
    let before = [form.destination_1.revision, form.destination_2.revision];

    form.swap_destinations();

    assert!(!before.contains(&form.destination_1.revision));
    assert!(!before.contains(&form.destination_2.revision));
    assert_ne!(form.destination_1.revision, form.destination_2.revision);
}

#[test]
fn route_request_requires_source_and_destination() {
    let mut form = EntryForm::new();
    form.resolve(Slot::Destination1, candidate("B", 1.0));
    assert!(form.route_request(false).is_err());

    form.resolve(Slot::Source, candidate("A", 0.0));
    form.edit(Slot::Destination1, "b".into());
    assert!(form.route_request(false).is_err());

    form.resolve(Slot::Destination2, candidate("C", 2.0));
    let request = form.route_request(false).unwrap();
    let labels: Vec<_> = request.stops.iter().map(|stop| stop.label.as_str()).collect();
    assert_eq!(labels, vec!["A", "C"]);
}
