use geo_types::Point;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl From<Coordinates> for Point<f64> {
    fn from(coordinates: Coordinates) -> Self {
        Point::new(coordinates.lng, coordinates.lat)
    }
}

impl From<&Coordinates> for Point<f64> {
    fn from(coordinates: &Coordinates) -> Self {
        (*coordinates).into()
    }
}

impl From<Point<f64>> for Coordinates {
    fn from(point: Point<f64>) -> Self {
        Self {
            lat: point.y(),
            lng: point.x(),
        }
    }
}

impl From<Coordinates> for String {
    fn from(coordinates: Coordinates) -> Self {
        format!("{},{}", coordinates.lat, coordinates.lng)
    }
}

/// One possible resolution of a free-text address.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub formatted_address: String,
    pub coordinates: Coordinates,
}

impl Candidate {
    pub fn new(formatted_address: String, coordinates: Coordinates) -> Self {
        Self {
            formatted_address,
            coordinates,
        }
    }
}

/// Whether the device owner allowed the app to read its location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Authorization {
    NotDetermined,
    Denied,
    Granted,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeviceLocation {
    pub coordinates: Coordinates,
    pub authorization: Authorization,
}

impl DeviceLocation {
    pub fn is_authorized(&self) -> bool {
        self.authorization == Authorization::Granted
    }
}

#[test]
fn coordinates_point_axis_order() {
    let coordinates = Coordinates {
        lat: 37.33,
        lng: -122.03,
    };
    let point: Point<f64> = coordinates.into();

    assert_eq!(point.x(), -122.03);
    assert_eq!(point.y(), 37.33);
    assert_eq!(Coordinates::from(point), coordinates);

    let query: String = coordinates.into();
    assert_eq!(query, "37.33,-122.03");
}
