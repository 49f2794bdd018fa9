use serde::{Deserialize, Serialize};

use crate::entities::{Candidate, Slot};
use crate::error::{invalid_input_error, Error};

pub const PICKER_HEADER: &str = "Did you mean...";
pub const NONE_OF_THE_ABOVE: &str = "None of the above";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PickerRow {
    pub index: usize,
    pub text: String,
}

/// Candidates offered for one field while the user chooses between them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Picker {
    pub slot: Slot,
    pub header: String,
    pub candidates: Vec<Candidate>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Pick {
    Candidate(Candidate),
    NoneOfTheAbove,
}

impl Picker {
    pub fn new(slot: Slot, candidates: Vec<Candidate>) -> Self {
        Self {
            slot,
            header: PICKER_HEADER.into(),
            candidates,
        }
    }

    /// One row per candidate in resolver order, then the sentinel row.
    pub fn rows(&self) -> Vec<PickerRow> {
        self.candidates
            .iter()
            .map(|candidate| candidate.formatted_address.clone())
            .chain(std::iter::once(NONE_OF_THE_ABOVE.to_string()))
            .enumerate()
            .map(|(index, text)| PickerRow { index, text })
            .collect()
    }

    pub fn select(self, row: usize) -> Result<Pick, Error> {
        let count = self.candidates.len();

        match row {
            row if row < count => Ok(Pick::Candidate(
                self.candidates.into_iter().nth(row).ok_or_else(invalid_input_error)?,
            )),
            row if row == count => Ok(Pick::NoneOfTheAbove),
            _ => Err(invalid_input_error()),
        }
    }
}

#[cfg(test)]
fn candidates(count: usize) -> Vec<Candidate> {
    use crate::entities::Coordinates;

    (0..count)
        .map(|i| {
            Candidate::new(
                format!("{} Main Street, Springfield", i + 1),
                Coordinates {
                    lat: 40.0 + i as f64,
                    lng: -75.0,
                },
            )
        })
        .collect()
}

#[test]
fn rows_end_with_sentinel() {
    let picker = Picker::new(Slot::Destination1, candidates(3));
    let rows = picker.rows();

    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].text, "1 Main Street, Springfield");
    assert_eq!(rows[2].text, "3 Main Street, Springfield");
    assert_eq!(rows[3].text, NONE_OF_THE_ABOVE);
    assert_eq!(picker.header, "Did you mean...");
}

#[test]
fn select_candidate_row() {
    let offered = candidates(3);
    let picker = Picker::new(Slot::Source, offered.clone());

    assert_eq!(picker.select(1).unwrap(), Pick::Candidate(offered[1].clone()));
}

#[test]
fn select_sentinel_and_out_of_range() {
    let picker = Picker::new(Slot::Source, candidates(2));
    assert_eq!(picker.clone().select(2).unwrap(), Pick::NoneOfTheAbove);
    assert!(picker.select(3).is_err());
}
