use chrono::{DateTime, Utc};
use geo_types::LineString;
use serde::{Deserialize, Serialize};

use crate::entities::Stop;
use crate::error::{invalid_input_error, Error};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportType {
    Automobile,
}

/// Ordered stops for one directions request. Built once from a validated
/// form and owned by the planner for the duration of the plan.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteRequest {
    pub stops: Vec<Stop>,
    pub transport_type: TransportType,
    pub round_trip: bool,
}

impl RouteRequest {
    pub fn new(mut stops: Vec<Stop>, round_trip: bool) -> Result<Self, Error> {
        if stops.len() < 2 {
            return Err(invalid_input_error());
        }

        if round_trip {
            stops.push(stops[0].clone());
        }

        Ok(Self {
            stops,
            transport_type: TransportType::Automobile,
            round_trip,
        })
    }

    /// Consecutive stop pairs, in input order.
    pub fn legs(&self) -> impl Iterator<Item = (&Stop, &Stop)> {
        self.stops.iter().zip(self.stops.iter().skip(1))
    }

    pub fn leg_count(&self) -> usize {
        self.stops.len() - 1
    }
}

/// One route offered by the provider between two stops.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteAlternative {
    pub polyline: LineString<f64>,
    /// Seconds
    pub travel_time: f64,
    /// Meters
    pub distance: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub start_label: String,
    pub end_label: String,
    pub polyline: LineString<f64>,
    pub travel_time: f64,
    pub distance: f64,
}

impl RouteSegment {
    pub fn new(start: &Stop, end: &Stop, route: RouteAlternative) -> Self {
        Self {
            start_label: start.label.clone(),
            end_label: end.label.clone(),
            polyline: route.polyline,
            travel_time: route.travel_time,
            distance: route.distance,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub segments: Vec<RouteSegment>,
    pub total_travel_time: f64,
    pub computed_at: DateTime<Utc>,
}

impl RoutePlan {
    pub fn total_distance(&self) -> f64 {
        self.segments.iter().map(|segment| segment.distance).sum()
    }
}

#[cfg(test)]
fn stop(label: &str) -> Stop {
    use crate::entities::Coordinates;

    Stop {
        label: label.into(),
        coordinates: Coordinates { lat: 0.0, lng: 0.0 },
    }
}

#[test]
fn request_needs_two_stops() {
    assert!(RouteRequest::new(vec![stop("A")], false).is_err());
    assert!(RouteRequest::new(vec![stop("A")], true).is_err());
}

#[test]
fn legs_follow_input_order() {
    let request = RouteRequest::new(vec![stop("A"), stop("B"), stop("C")], false).unwrap();
    let legs: Vec<_> = request
        .legs()
        .map(|(start, end)| (start.label.as_str(), end.label.as_str()))
        .collect();

    assert_eq!(legs, vec![("A", "B"), ("B", "C")]);
    assert_eq!(request.leg_count(), 2);
}

#[test]
fn round_trip_returns_to_source() {
    let request = RouteRequest::new(vec![stop("A"), stop("B")], true).unwrap();
    let labels: Vec<_> = request.stops.iter().map(|stop| stop.label.as_str()).collect();

    assert_eq!(labels, vec!["A", "B", "A"]);
    assert_eq!(request.leg_count(), 2);
}
