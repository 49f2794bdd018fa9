use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use geo_types::{Coord, LineString};
use tokio::sync::Notify;

use crate::entities::{Candidate, Coordinates, RouteAlternative, Stop, TransportType};
use crate::error::{address_not_found_error, Error};
use crate::external::{AddressResolver, RouteProvider};

pub fn coordinates(lat: f64) -> Coordinates {
    Coordinates { lat, lng: lat / 2.0 }
}

pub fn stop(label: &str, lat: f64) -> Stop {
    Stop {
        label: label.into(),
        coordinates: coordinates(lat),
    }
}

pub fn candidate(address: &str, lat: f64) -> Candidate {
    Candidate::new(address.into(), coordinates(lat))
}

pub fn alternative(travel_time: f64, distance: f64) -> RouteAlternative {
    RouteAlternative {
        polyline: LineString::from(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord {
                x: distance,
                y: travel_time,
            },
        ]),
        travel_time,
        distance,
    }
}

/// Replays scripted responses, one per call, and records the order of calls.
pub struct FakeRouteProvider {
    responses: Mutex<VecDeque<Result<Vec<RouteAlternative>, Error>>>,
    calls: Mutex<Vec<(Coordinates, Coordinates)>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeRouteProvider {
    pub fn new(responses: Vec<Result<Vec<RouteAlternative>, Error>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(vec![]),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> Vec<(Coordinates, Coordinates)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RouteProvider for FakeRouteProvider {
    async fn route(
        &self,
        from: Coordinates,
        to: Coordinates,
        _transport_type: TransportType,
    ) -> Result<Vec<RouteAlternative>, Error> {
        let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);
        self.calls.lock().unwrap().push((from, to));

        tokio::task::yield_now().await;

        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unexpected route request");

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        response
    }
}

#[derive(Default)]
pub struct FakeAddressResolver {
    pub addresses: HashMap<String, Vec<Candidate>>,
    pub reverse: Option<Candidate>,
    pub reverse_calls: AtomicUsize,
}

impl FakeAddressResolver {
    pub fn with(mut self, text: &str, candidates: Vec<Candidate>) -> Self {
        self.addresses.insert(text.into(), candidates);
        self
    }

    pub fn with_reverse(mut self, candidate: Candidate) -> Self {
        self.reverse = Some(candidate);
        self
    }
}

#[async_trait]
impl AddressResolver for FakeAddressResolver {
    async fn resolve(&self, text: &str) -> Result<Vec<Candidate>, Error> {
        match self.addresses.get(text) {
            Some(candidates) if !candidates.is_empty() => Ok(candidates.clone()),
            _ => Err(address_not_found_error()),
        }
    }

    async fn reverse_resolve(&self, _coordinates: Coordinates) -> Result<Candidate, Error> {
        self.reverse_calls.fetch_add(1, Ordering::SeqCst);
        self.reverse.clone().ok_or_else(address_not_found_error)
    }
}

/// Holds every forward lookup until the test opens the gate, so form edits
/// can land while a lookup is in flight.
pub struct GatedResolver {
    pub entered: Notify,
    pub gate: Notify,
    candidates: Vec<Candidate>,
}

impl GatedResolver {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            entered: Notify::new(),
            gate: Notify::new(),
            candidates,
        }
    }
}

#[async_trait]
impl AddressResolver for GatedResolver {
    async fn resolve(&self, _text: &str) -> Result<Vec<Candidate>, Error> {
        self.entered.notify_one();
        self.gate.notified().await;

        Ok(self.candidates.clone())
    }

    async fn reverse_resolve(&self, _coordinates: Coordinates) -> Result<Candidate, Error> {
        Err(address_not_found_error())
    }
}
