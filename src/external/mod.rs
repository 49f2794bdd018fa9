pub mod google_maps;
pub mod osrm;

use async_trait::async_trait;

use crate::entities::{Candidate, Coordinates, RouteAlternative, TransportType};
use crate::error::Error;

/// Geocoding provider. `resolve` fails with an address-not-found error
/// instead of returning an empty list.
#[async_trait]
pub trait AddressResolver {
    async fn resolve(&self, text: &str) -> Result<Vec<Candidate>, Error>;
    async fn reverse_resolve(&self, coordinates: Coordinates) -> Result<Candidate, Error>;
}

/// Directions provider. Returns every alternative it knows of, in its own
/// order, or a no-route error.
#[async_trait]
pub trait RouteProvider {
    async fn route(
        &self,
        from: Coordinates,
        to: Coordinates,
        transport_type: TransportType,
    ) -> Result<Vec<RouteAlternative>, Error>;
}
