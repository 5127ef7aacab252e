//! Unit tests for span-eta.

#[cfg(test)]
mod helpers {
    use std::sync::Arc;

    use span_core::{FixedClock, NodeId, Timestamp};
    use span_graph::{Edge, RoutePath};

    use crate::EtaPropagator;

    pub fn id(s: &str) -> NodeId {
        NodeId::new(s)
    }

    /// a →(120, bridge) b →(60) c
    pub fn bridge_route() -> RoutePath {
        RoutePath::new(
            vec![id("a"), id("b"), id("c")],
            vec![
                Edge::bridge("a", "b", 120.0, 800.0, "test_bridge"),
                Edge::new("b", "c", 60.0, 300.0),
            ],
        )
        .unwrap()
    }

    pub fn propagator_at(now: f64) -> EtaPropagator {
        EtaPropagator::new(Arc::new(FixedClock::at(Timestamp(now))))
    }
}

#[cfg(test)]
mod etas {
    use span_core::Timestamp;

    use super::helpers::{bridge_route, id, propagator_at};

    #[test]
    fn per_node_accumulation() {
        let p = propagator_at(0.0);
        let etas = p.estimate_etas(&bridge_route(), Timestamp(1_000.0));
        assert_eq!(etas.len(), 3);
        assert_eq!(etas[0].node_id, id("a"));
        assert_eq!(etas[0].travel_time_from_start, 0.0);
        assert_eq!(etas[0].arrival_time, Timestamp(1_000.0));
        assert_eq!(etas[1].travel_time_from_start, 120.0);
        assert_eq!(etas[1].arrival_time, Timestamp(1_120.0));
        assert_eq!(etas[2].travel_time_from_start, 180.0);
        assert_eq!(etas[2].arrival_time, Timestamp(1_180.0));
    }

    #[test]
    fn bridge_etas_filter_and_instant() {
        let p = propagator_at(0.0);
        let etas = p.bridge_etas(&bridge_route(), Timestamp(1_000.0));
        assert_eq!(etas.len(), 1);
        let (bridge_id, eta) = &etas[0];
        assert_eq!(bridge_id, "test_bridge");
        // The span is reached at departure — the bridge is the first edge.
        assert_eq!(eta.arrival_time, Timestamp(1_000.0));
        assert_eq!(eta.node_id, id("a"));
    }

    #[test]
    fn no_bridges_empty() {
        use span_graph::{Edge, RoutePath};
        let route = RoutePath::new(
            vec![id("a"), id("b")],
            vec![Edge::new("a", "b", 60.0, 300.0)],
        )
        .unwrap();
        let p = propagator_at(0.0);
        assert!(p.bridge_etas(&route, Timestamp(0.0)).is_empty());
    }
}

#[cfg(test)]
mod uncertainty {
    use span_core::Timestamp;

    use super::helpers::{bridge_route, propagator_at};
    use crate::EtaSummary;

    #[test]
    fn variance_grows_monotonically() {
        let p = propagator_at(0.0);
        // Midnight departure → late-night regime (×0.9).
        let est = p.estimate_with_uncertainty(&bridge_route(), Timestamp(0.0));
        assert_eq!(est.len(), 3);
        assert_eq!(est[0].summary.variance, 0.0);
        assert!(est[1].summary.variance > 0.0);
        assert!(est[2].summary.variance > est[1].summary.variance);
    }

    #[test]
    fn contribution_factors() {
        let p = propagator_at(0.0);
        let est = p.estimate_with_uncertainty(&bridge_route(), Timestamp(0.0));
        // Bridge edge at late night: 120 × 0.1 × 0.9 × 1.5 = 16.2.
        assert!((est[1].summary.variance - 16.2).abs() < 1e-9);
        // Plain short edge: + 60 × 0.1 × 0.9 = 5.4.
        assert!((est[2].summary.variance - 21.6).abs() < 1e-9);
    }

    #[test]
    fn rush_hour_widens() {
        let p = propagator_at(0.0);
        // 07:00 departure → morning rush (×1.3 vs ×0.9 at midnight).
        let night = p.estimate_with_uncertainty(&bridge_route(), Timestamp(0.0));
        let rush = p.estimate_with_uncertainty(&bridge_route(), Timestamp(7.0 * 3_600.0));
        assert!(rush[2].summary.variance > night[2].summary.variance);
    }

    #[test]
    fn long_edge_multiplier() {
        use span_core::NodeId;
        use span_graph::{Edge, RoutePath};
        let long = RoutePath::new(
            vec![NodeId::new("a"), NodeId::new("b")],
            vec![Edge::new("a", "b", 600.0, 5_000.0)],
        )
        .unwrap();
        let p = propagator_at(0.0);
        let est = p.estimate_with_uncertainty(&long, Timestamp(0.0));
        // 600 × 0.1 × 0.9 × 1.2 = 64.8.
        assert!((est[1].summary.variance - 64.8).abs() < 1e-9);
    }

    #[test]
    fn envelope_and_interval() {
        let s = EtaSummary::new(100.0, 25.0);
        assert!((s.min - 70.0).abs() < 1e-9);
        assert!((s.max - 130.0).abs() < 1e-9);
        assert_eq!(s.std_dev(), 5.0);
        let (lo, hi) = s.confidence_interval(0.95);
        assert!((lo - (100.0 - 9.8)).abs() < 1e-9);
        assert!((hi - (100.0 + 9.8)).abs() < 1e-9);
        let (lo90, hi90) = s.confidence_interval(0.90);
        assert!(lo90 > lo && hi90 < hi);
    }
}
