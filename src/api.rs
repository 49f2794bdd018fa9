use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{DeviceLocation, EntryForm, PickerRow, Slot};
use crate::error::Error;
use crate::presenter::DirectionsView;

/// Result of confirming an address field.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ResolveOutcome {
    Resolved { form: EntryForm },
    Ambiguous { form: EntryForm, rows: Vec<PickerRow> },
}

impl ResolveOutcome {
    pub fn form(&self) -> &EntryForm {
        match self {
            Self::Resolved { form } => form,
            Self::Ambiguous { form, rows: _ } => form,
        }
    }
}

#[async_trait]
pub trait FormAPI {
    async fn create_form(&self, device_location: Option<DeviceLocation>)
        -> Result<EntryForm, Error>;
    async fn find_form(&self, token: Uuid) -> Result<EntryForm, Error>;
    async fn delete_form(&self, token: Uuid) -> Result<EntryForm, Error>;
    async fn edit_field(&self, token: Uuid, slot: Slot, text: String) -> Result<EntryForm, Error>;
    async fn confirm_address(&self, token: Uuid, slot: Slot) -> Result<ResolveOutcome, Error>;
    async fn select_candidate(&self, token: Uuid, row: usize) -> Result<EntryForm, Error>;
    async fn dismiss_picker(&self, token: Uuid) -> Result<EntryForm, Error>;
    async fn swap_destinations(&self, token: Uuid) -> Result<EntryForm, Error>;
}

#[async_trait]
pub trait DirectionsAPI {
    async fn get_directions(&self, token: Uuid, round_trip: bool)
        -> Result<DirectionsView, Error>;
}

pub trait API: FormAPI + DirectionsAPI {}
