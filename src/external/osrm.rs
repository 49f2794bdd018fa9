use async_trait::async_trait;
use geo_types::{Coord, LineString};
use serde::Deserialize;

use crate::{
    config::Config,
    entities::{Coordinates, RouteAlternative, TransportType},
    error::{no_route_available_error, upstream_error, Error},
    external::RouteProvider,
};

pub const OSRM_ROUTE_API_PATH: &str = "/route/v1/";

#[derive(Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Deserialize)]
struct OsrmRoute {
    /// Seconds
    duration: f64,
    /// Meters
    distance: f64,
    geometry: OsrmGeometry,
}

#[derive(Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>,
}

impl From<OsrmRoute> for RouteAlternative {
    fn from(route: OsrmRoute) -> Self {
        let polyline: LineString<f64> = route
            .geometry
            .coordinates
            .into_iter()
            .map(|[x, y]| Coord { x, y })
            .collect();

        RouteAlternative {
            polyline,
            travel_time: route.duration,
            distance: route.distance,
        }
    }
}

fn profile(transport_type: TransportType) -> &'static str {
    match transport_type {
        TransportType::Automobile => "driving",
    }
}

#[derive(Clone, Debug)]
pub struct OsrmRouteClient {
    osrm_url: String,
    client: reqwest::Client,
}

impl OsrmRouteClient {
    pub fn new(config: &Config) -> Self {
        Self {
            osrm_url: config.osrm_url.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, from: Coordinates, to: Coordinates, transport_type: TransportType) -> String {
        format!(
            "{}{}{}/{},{};{},{}",
            self.osrm_url,
            OSRM_ROUTE_API_PATH,
            profile(transport_type),
            from.lng,
            from.lat,
            to.lng,
            to.lat
        )
    }
}

fn alternatives_from_response(data: OsrmRouteResponse) -> Result<Vec<RouteAlternative>, Error> {
    match data.code.as_str() {
        "Ok" => {}
        "NoRoute" | "NoSegment" => return Err(no_route_available_error()),
        code => {
            tracing::warn!("route service responded with code {}", code);
            return Err(no_route_available_error());
        }
    }

    if data.routes.is_empty() {
        return Err(no_route_available_error());
    }

    Ok(data.routes.into_iter().map(RouteAlternative::from).collect())
}

#[async_trait]
impl RouteProvider for OsrmRouteClient {
    #[tracing::instrument(skip(self))]
    async fn route(
        &self,
        from: Coordinates,
        to: Coordinates,
        transport_type: TransportType,
    ) -> Result<Vec<RouteAlternative>, Error> {
        let res = self
            .client
            .get(self.url(from, to, transport_type))
            .query(&[
                ("alternatives", "true"),
                ("geometries", "geojson"),
                ("overview", "full"),
            ])
            .send()
            .await?;

        let status_code = res.status().as_u16();

        // OSRM reports unroutable pairs as 400 with a JSON body
        if status_code >= 500 {
            return Err(upstream_error());
        }

        let data: OsrmRouteResponse = res.json().await?;

        alternatives_from_response(data)
    }
}

#[test]
fn parses_route_alternatives() {
    let data: OsrmRouteResponse = serde_json::from_value(serde_json::json!({
        "code": "Ok",
        "routes": [
            {
                "duration": 812.4,
                "distance": 10432.1,
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[-122.03, 37.33], [-122.01, 37.35], [-121.99, 37.37]]
                }
            },
            {
                "duration": 790.0,
                "distance": 11020.0,
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[-122.03, 37.33], [-121.99, 37.37]]
                }
            }
        ],
        "waypoints": []
    }))
    .unwrap();

    let alternatives = alternatives_from_response(data).unwrap();

    assert_eq!(alternatives.len(), 2);
    assert_eq!(alternatives[0].travel_time, 812.4);
    assert_eq!(alternatives[0].polyline.0.len(), 3);
    assert_eq!(alternatives[0].polyline.0[0], Coord { x: -122.03, y: 37.33 });
    assert_eq!(alternatives[1].distance, 11020.0);
}

#[test]
fn no_route_code_is_no_route_available() {
    let data: OsrmRouteResponse = serde_json::from_value(serde_json::json!({
        "code": "NoRoute",
        "message": "Impossible route between points"
    }))
    .unwrap();

    assert!(alternatives_from_response(data)
        .unwrap_err()
        .is_no_route_available());
}

#[test]
fn url_uses_lng_lat_order() {
    let client = OsrmRouteClient {
        osrm_url: "http://localhost:5000".into(),
        client: reqwest::Client::new(),
    };
    let url = client.url(
        Coordinates { lat: 1.5, lng: 2.5 },
        Coordinates { lat: 3.5, lng: 4.5 },
        TransportType::Automobile,
    );

    assert_eq!(url, "http://localhost:5000/route/v1/driving/2.5,1.5;4.5,3.5");
}
