use chrono::{DateTime, Utc};
use geo::BoundingRect;
use geo_types::{Coord, LineString, Rect};
use serde::{Deserialize, Serialize};

use crate::entities::{RoutePlan, RouteSegment};

pub const LINE_WIDTH: f64 = 5.0;
pub const EDGE_PADDING: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }
}

/// Stroke colors by overlay ordinal: first leg blue, second green, third red.
pub const PALETTE: [Color; 3] = [
    Color::rgba(0.0, 0.0, 1.0, 0.75),
    Color::rgba(0.0, 1.0, 0.0, 0.75),
    Color::rgba(1.0, 0.0, 0.0, 0.75),
];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub polyline: LineString<f64>,
    pub stroke_color: Color,
    pub line_width: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeInsets {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl EdgeInsets {
    pub fn uniform(inset: f64) -> Self {
        Self {
            top: inset,
            left: inset,
            bottom: inset,
            right: inset,
        }
    }
}

/// Overlays drawn so far and the region that bounds them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub overlays: Vec<Overlay>,
    pub visible_region: Option<Rect<f64>>,
    pub edge_padding: EdgeInsets,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            overlays: vec![],
            visible_region: None,
            edge_padding: EdgeInsets::uniform(EDGE_PADDING),
        }
    }
}

impl MapView {
    pub fn add_polyline(&mut self, polyline: LineString<f64>) {
        let stroke_color = PALETTE[self.overlays.len() % PALETTE.len()];
        let bounds = polyline.bounding_rect();

        self.overlays.push(Overlay {
            polyline,
            stroke_color,
            line_width: LINE_WIDTH,
        });

        self.visible_region = match (self.visible_region, bounds) {
            (Some(visible), Some(bounds)) => Some(union(visible, bounds)),
            (visible, bounds) => bounds.or(visible),
        };
    }
}

fn union(a: Rect<f64>, b: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectionsRow {
    pub starting_address: String,
    pub ending_address: String,
    pub travel_time: f64,
    pub travel_time_text: String,
    pub distance: f64,
}

impl From<&RouteSegment> for DirectionsRow {
    fn from(segment: &RouteSegment) -> Self {
        Self {
            starting_address: segment.start_label.clone(),
            ending_address: segment.end_label.clone(),
            travel_time: segment.travel_time,
            travel_time_text: format_travel_time(segment.travel_time),
            distance: segment.distance,
        }
    }
}

/// Everything the results screen shows for a finished plan.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectionsView {
    pub map: MapView,
    pub rows: Vec<DirectionsRow>,
    pub total_travel_time: f64,
    pub total_travel_time_text: String,
    pub computed_at: DateTime<Utc>,
}

pub fn render(plan: &RoutePlan) -> DirectionsView {
    let mut map = MapView::default();
    let mut rows = Vec::with_capacity(plan.segments.len());

    for segment in &plan.segments {
        map.add_polyline(segment.polyline.clone());
        rows.push(DirectionsRow::from(segment));
    }

    DirectionsView {
        map,
        rows,
        total_travel_time: plan.total_travel_time,
        total_travel_time_text: format_travel_time(plan.total_travel_time),
        computed_at: plan.computed_at,
    }
}

pub fn format_travel_time(seconds: f64) -> String {
    let minutes = (seconds.max(0.0) / 60.0).round() as u64;
    let (hours, minutes) = (minutes / 60, minutes % 60);

    if hours == 0 {
        format!("{} min", minutes)
    } else {
        format!("{} hr {} min", hours, minutes)
    }
}

#[cfg(test)]
fn segment(start: &str, end: &str, points: Vec<(f64, f64)>, travel_time: f64) -> RouteSegment {
    RouteSegment {
        start_label: start.into(),
        end_label: end.into(),
        polyline: points.into(),
        travel_time,
        distance: 1000.0,
    }
}

#[test]
fn travel_time_text() {
    assert_eq!(format_travel_time(0.0), "0 min");
    assert_eq!(format_travel_time(89.0), "1 min");
    assert_eq!(format_travel_time(3600.0), "1 hr 0 min");
    assert_eq!(format_travel_time(5430.0), "1 hr 31 min");
}

#[test]
fn single_segment_draws_one_overlay() {
    let plan = RoutePlan {
        segments: vec![segment("A", "B", vec![(0.0, 0.0), (2.0, 1.0)], 600.0)],
        total_travel_time: 600.0,
        computed_at: Utc::now(),
    };

    let view = render(&plan);

    assert_eq!(view.map.overlays.len(), 1);
    assert_eq!(view.map.overlays[0].stroke_color, PALETTE[0]);
    assert_eq!(view.map.overlays[0].line_width, LINE_WIDTH);
    assert_eq!(
        view.map.visible_region,
        Some(Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 2.0, y: 1.0 }))
    );
    assert_eq!(view.map.edge_padding, EdgeInsets::uniform(EDGE_PADDING));
    assert_eq!(view.rows.len(), 1);
    assert_eq!(view.rows[0].starting_address, "A");
    assert_eq!(view.rows[0].ending_address, "B");
    assert_eq!(view.total_travel_time_text, "10 min");
}

#[test]
fn region_grows_to_bound_every_overlay() {
    let plan = RoutePlan {
        segments: vec![
            segment("A", "B", vec![(0.0, 0.0), (2.0, 1.0)], 600.0),
            segment("B", "C", vec![(2.0, 1.0), (-1.0, 4.0)], 900.0),
            segment("C", "A", vec![(-1.0, 4.0), (0.0, 0.0)], 300.0),
            segment("A", "D", vec![(0.0, 0.0), (5.0, -3.0)], 300.0),
        ],
        total_travel_time: 2100.0,
        computed_at: Utc::now(),
    };

    let view = render(&plan);

    let colors: Vec<_> = view
        .map
        .overlays
        .iter()
        .map(|overlay| overlay.stroke_color)
        .collect();
    assert_eq!(colors, vec![PALETTE[0], PALETTE[1], PALETTE[2], PALETTE[0]]);
    assert_eq!(
        view.map.visible_region,
        Some(Rect::new(
            Coord { x: -1.0, y: -3.0 },
            Coord { x: 5.0, y: 4.0 }
        ))
    );

    let rows: Vec<_> = view
        .rows
        .iter()
        .map(|row| (row.starting_address.as_str(), row.ending_address.as_str()))
        .collect();
    assert_eq!(rows, vec![("A", "B"), ("B", "C"), ("C", "A"), ("A", "D")]);
    assert_eq!(view.total_travel_time_text, "35 min");
}
