use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    entities::{Candidate, Coordinates},
    error::{address_not_found_error, invalid_input_error, upstream_error, Error},
    external::AddressResolver,
};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Place {
    pub place_id: String,
    pub formatted_address: String,
    pub geometry: Geometry,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Geometry {
    pub location: Coordinates,
}

impl From<Place> for Candidate {
    fn from(place: Place) -> Self {
        Candidate::new(place.formatted_address, place.geometry.location)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Response<T> {
    status: String,
    results: Option<T>,
}

#[derive(Clone, Debug)]
pub struct GoogleMapsClient {
    api_base: String,
    api_key: String,
    client: reqwest::Client,
}

impl GoogleMapsClient {
    pub fn new(config: &Config) -> Self {
        Self {
            api_base: config.google_maps_api_base.clone(),
            api_key: config.google_maps_api_key.clone(),
            client: reqwest::Client::new(),
        }
    }

    #[tracing::instrument(skip(self, query))]
    async fn geocode(&self, query: &[(&str, String)]) -> Result<Vec<Place>, Error> {
        let url = format!("https://{}/maps/api/geocode/json", self.api_base);

        let res = self
            .client
            .get(url)
            .query(&[("key", &self.api_key)])
            .query(query)
            .send()
            .await?;

        let status_code = res.status().as_u16();

        if (400..500).contains(&status_code) {
            return Err(invalid_input_error());
        } else if status_code != 200 {
            return Err(upstream_error());
        }

        let data: Response<Vec<Place>> = res.json().await?;

        places_from_response(data)
    }
}

fn places_from_response(data: Response<Vec<Place>>) -> Result<Vec<Place>, Error> {
    match data.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" => return Err(address_not_found_error()),
        "INVALID_REQUEST" => return Err(invalid_input_error()),
        status => {
            tracing::warn!("geocoder responded with status {}", status);
            return Err(upstream_error());
        }
    }

    let places = data.results.ok_or_else(upstream_error)?;

    if places.is_empty() {
        return Err(address_not_found_error());
    }

    Ok(places)
}

#[async_trait]
impl AddressResolver for GoogleMapsClient {
    #[tracing::instrument(skip(self))]
    async fn resolve(&self, text: &str) -> Result<Vec<Candidate>, Error> {
        let places = self.geocode(&[("address", text.to_string())]).await?;

        Ok(places.into_iter().map(Candidate::from).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn reverse_resolve(&self, coordinates: Coordinates) -> Result<Candidate, Error> {
        let places = self.geocode(&[("latlng", coordinates.into())]).await?;

        places
            .into_iter()
            .next()
            .map(Candidate::from)
            .ok_or_else(address_not_found_error)
    }
}

#[test]
fn parses_geocode_results() {
    let data: Response<Vec<Place>> = serde_json::from_value(serde_json::json!({
        "status": "OK",
        "results": [
            {
                "place_id": "ChIJ1",
                "formatted_address": "1 Infinite Loop, Cupertino, CA 95014, USA",
                "geometry": { "location": { "lat": 37.3318, "lng": -122.0312 } }
            },
            {
                "place_id": "ChIJ2",
                "formatted_address": "1 Infinite Loop, Sunnyvale, CA, USA",
                "geometry": { "location": { "lat": 37.37, "lng": -122.03 } }
            }
        ]
    }))
    .unwrap();

    let candidates: Vec<Candidate> = places_from_response(data)
        .unwrap()
        .into_iter()
        .map(Candidate::from)
        .collect();

    assert_eq!(candidates.len(), 2);
    assert_eq!(
        candidates[0].formatted_address,
        "1 Infinite Loop, Cupertino, CA 95014, USA"
    );
    assert_eq!(candidates[1].coordinates.lat, 37.37);
}

#[test]
fn zero_results_is_address_not_found() {
    let data: Response<Vec<Place>> = serde_json::from_value(serde_json::json!({
        "status": "ZERO_RESULTS",
        "results": []
    }))
    .unwrap();

    assert!(places_from_response(data).unwrap_err().is_address_not_found());
}

#[test]
fn denied_request_is_upstream_error() {
    let data: Response<Vec<Place>> = serde_json::from_value(serde_json::json!({
        "status": "REQUEST_DENIED"
    }))
    .unwrap();

    assert_eq!(
        places_from_response(data).unwrap_err().code,
        crate::error::UPSTREAM_ERROR
    );
}
