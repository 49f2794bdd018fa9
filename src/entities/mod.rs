mod form;
mod location;
mod picker;
mod route;
mod waypoint;

pub use form::{EntryForm, Field, Slot};
pub use location::{Authorization, Candidate, Coordinates, DeviceLocation};
pub use picker::{Pick, Picker, PickerRow, NONE_OF_THE_ABOVE, PICKER_HEADER};
pub use route::{RouteAlternative, RoutePlan, RouteRequest, RouteSegment, TransportType};
pub use waypoint::{Stop, Waypoint};
