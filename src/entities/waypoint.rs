use serde::{Deserialize, Serialize};

use crate::entities::{Candidate, Coordinates};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub label: String,
    pub resolved: Option<Candidate>,
}

impl Waypoint {
    pub fn new(label: String) -> Self {
        Self {
            label,
            resolved: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.resolved.as_ref().map(|candidate| candidate.coordinates)
    }

    /// Replaces the label with the candidate's formatted address and marks
    /// the waypoint as resolved.
    pub fn resolve(&mut self, candidate: Candidate) {
        self.label = candidate.formatted_address.clone();
        self.resolved = Some(candidate);
    }

    /// Any edit to the label invalidates a previous resolution.
    pub fn edit(&mut self, label: String) {
        self.label = label;
        self.resolved = None;
    }
}

/// A waypoint that is known to carry a location, as handed to the planner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub label: String,
    pub coordinates: Coordinates,
}

impl TryFrom<&Waypoint> for Stop {
    type Error = ();

    fn try_from(waypoint: &Waypoint) -> Result<Self, Self::Error> {
        let coordinates = waypoint.coordinates().ok_or(())?;

        Ok(Self {
            label: waypoint.label.clone(),
            coordinates,
        })
    }
}

#[test]
fn editing_clears_resolution() {
    let mut waypoint = Waypoint::new("1 infinite loop".into());
    assert!(!waypoint.is_resolved());

    waypoint.resolve(Candidate::new(
        "1 Infinite Loop, Cupertino, CA 95014, United States".into(),
        Coordinates {
            lat: 37.33,
            lng: -122.03,
        },
    ));
    assert!(waypoint.is_resolved());
    assert_eq!(
        waypoint.label,
        "1 Infinite Loop, Cupertino, CA 95014, United States"
    );
    assert!(Stop::try_from(&waypoint).is_ok());

    waypoint.edit("1 infinite loo".into());
    assert!(!waypoint.is_resolved());
    assert!(Stop::try_from(&waypoint).is_err());
}
