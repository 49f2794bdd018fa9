use chrono::Utc;

use crate::{
    entities::{RouteAlternative, RoutePlan, RouteRequest, RouteSegment},
    error::{no_route_available_error, Error},
    external::RouteProvider,
};

/// Fastest alternative, keeping the provider's order on ties.
pub fn fastest(alternatives: Vec<RouteAlternative>) -> Option<RouteAlternative> {
    alternatives.into_iter().fold(None, |best, candidate| match best {
        Some(best) if best.travel_time <= candidate.travel_time => Some(best),
        _ => Some(candidate),
    })
}

/// Computes one segment per consecutive pair of stops.
///
/// Segments are requested strictly one after another: the request for leg
/// `i + 1` is issued only once leg `i` has completed. The first failing leg
/// aborts the whole plan and nothing computed so far is returned.
#[tracing::instrument(skip_all, fields(legs = request.leg_count()))]
pub async fn plan<P>(provider: &P, request: RouteRequest) -> Result<RoutePlan, Error>
where
    P: RouteProvider + ?Sized,
{
    let mut segments = Vec::with_capacity(request.leg_count());
    let mut total_travel_time = 0.0;

    for (index, (start, end)) in request.legs().enumerate() {
        tracing::info!("requesting leg {}: {} -> {}", index, start.label, end.label);

        let alternatives = provider
            .route(start.coordinates, end.coordinates, request.transport_type)
            .await
            .map_err(|err| {
                tracing::warn!("leg {} failed, discarding plan: {:?}", index, err);
                no_route_available_error()
            })?;

        let route = fastest(alternatives).ok_or_else(no_route_available_error)?;

        total_travel_time += route.travel_time;
        segments.push(RouteSegment::new(start, end, route));
    }

    tracing::info!("plan complete, total travel time {}s", total_travel_time);

    Ok(RoutePlan {
        segments,
        total_travel_time,
        computed_at: Utc::now(),
    })
}

#[cfg(test)]
use crate::test_utils::{alternative, stop, FakeRouteProvider};
#[cfg(test)]
use tokio_test::block_on;

#[test]
fn fastest_prefers_first_on_tie() {
    let alternatives = vec![
        alternative(300.0, 1.0),
        alternative(200.0, 2.0),
        alternative(200.0, 3.0),
        alternative(250.0, 4.0),
    ];

    let best = fastest(alternatives).unwrap();

    assert_eq!(best.travel_time, 200.0);
    assert_eq!(best.distance, 2.0);
    assert!(fastest(vec![]).is_none());
}

#[test]
fn single_leg_plan() {
    let provider = FakeRouteProvider::new(vec![Ok(vec![alternative(600.0, 5000.0)])]);
    let request = RouteRequest::new(vec![stop("A", 0.0), stop("B", 1.0)], false).unwrap();

    let plan = block_on(plan(&provider, request)).unwrap();

    assert_eq!(plan.segments.len(), 1);
    assert_eq!(plan.segments[0].start_label, "A");
    assert_eq!(plan.segments[0].end_label, "B");
    assert_eq!(plan.total_travel_time, 600.0);
    assert_eq!(provider.calls().len(), 1);
}

#[test]
fn legs_requested_in_order_and_summed() {
    let provider = FakeRouteProvider::new(vec![
        Ok(vec![alternative(700.5, 1.0), alternative(650.25, 2.0)]),
        Ok(vec![alternative(120.125, 3.0)]),
        Ok(vec![alternative(30.0, 4.0), alternative(45.0, 5.0)]),
    ]);
    let request = RouteRequest::new(
        vec![stop("A", 0.0), stop("B", 1.0), stop("C", 2.0), stop("D", 3.0)],
        false,
    )
    .unwrap();

    let plan = block_on(plan(&provider, request)).unwrap();

    let calls = provider.calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(
        calls.iter().map(|(from, to)| (from.lat, to.lat)).collect::<Vec<_>>(),
        vec![(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]
    );
    assert_eq!(provider.max_in_flight(), 1);

    let labels: Vec<_> = plan
        .segments
        .iter()
        .map(|segment| (segment.start_label.as_str(), segment.end_label.as_str()))
        .collect();
    assert_eq!(labels, vec![("A", "B"), ("B", "C"), ("C", "D")]);
    assert_eq!(plan.total_travel_time, 650.25 + 120.125 + 30.0);
    assert_eq!(plan.total_distance(), 2.0 + 3.0 + 4.0);
}

#[test]
fn failing_leg_discards_plan() {
    let provider = FakeRouteProvider::new(vec![
        Ok(vec![alternative(600.0, 1.0)]),
        Err(crate::error::upstream_error()),
        Ok(vec![alternative(600.0, 1.0)]),
    ]);
    let request = RouteRequest::new(
        vec![stop("A", 0.0), stop("B", 1.0), stop("C", 2.0), stop("D", 3.0)],
        false,
    )
    .unwrap();

    let err = block_on(plan(&provider, request)).unwrap_err();

    assert!(err.is_no_route_available());
    assert_eq!(provider.calls().len(), 2);
}

#[test]
fn empty_alternatives_is_no_route() {
    let provider = FakeRouteProvider::new(vec![Ok(vec![])]);
    let request = RouteRequest::new(vec![stop("A", 0.0), stop("B", 1.0)], false).unwrap();

    assert!(block_on(plan(&provider, request))
        .unwrap_err()
        .is_no_route_available());
}

#[test]
fn round_trip_plan_returns_to_source() {
    let provider = FakeRouteProvider::new(vec![
        Ok(vec![alternative(100.0, 1.0)]),
        Ok(vec![alternative(110.0, 1.0)]),
    ]);
    let request = RouteRequest::new(vec![stop("A", 0.0), stop("B", 1.0)], true).unwrap();

    let plan = block_on(plan(&provider, request)).unwrap();

    assert_eq!(plan.segments[1].end_label, "A");
    assert_eq!(plan.total_travel_time, 210.0);
}
