//! Property-based tests for port, route, environment, and codec logic.
//!
//! Uses `proptest` to verify invariants across many random inputs.

#![allow(clippy::expect_used)]

use proptest::prelude::*;

use ltc_cli::domain::env::resolve_environment;
use ltc_cli::domain::route::parse_route_overrides;
use ltc_cli::domain::{AppRoute, AppRoutes, PortConfig, PortRequest, RoutingInfo};

fn app_route() -> impl Strategy<Value = AppRoute> {
    (prop::collection::vec("[a-z][a-z0-9-]{0,10}\\.example\\.com", 0..3), any::<u16>())
        .prop_map(|(hostnames, port)| AppRoute { hostnames, port })
}

// ============================================================================
// PortRequest::parse
// ============================================================================

proptest! {
    /// A single valid port is always exposed and monitored.
    #[test]
    fn prop_single_port_is_monitored(port in any::<u16>()) {
        let parsed = PortRequest::parse(Some(&port.to_string()), None, false)
            .expect("valid port");
        prop_assert_eq!(
            parsed,
            PortRequest::Explicit(PortConfig { monitored: port, exposed: vec![port] })
        );
    }

    /// Any token above 65535 is rejected.
    #[test]
    fn prop_out_of_range_port_rejected(port in 65_536u32..1_000_000) {
        prop_assert!(PortRequest::parse(Some(&port.to_string()), None, false).is_err());
    }

    /// Parsing is deterministic and keeps every listed port.
    #[test]
    fn prop_port_list_is_deterministic(ports in prop::collection::vec(any::<u16>(), 2..6)) {
        let expr = ports.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
        let first = PortRequest::parse(Some(&expr), None, true);
        let second = PortRequest::parse(Some(&expr), None, true);
        prop_assert_eq!(&first, &second);

        let Ok(PortRequest::Explicit(config)) = first else {
            return Err(TestCaseError::fail("expected explicit ports"));
        };
        let mut got = config.exposed.clone();
        let mut want = ports.clone();
        got.sort_unstable();
        want.sort_unstable();
        prop_assert_eq!(got, want);
    }
}

// ============================================================================
// parse_route_overrides
// ============================================================================

proptest! {
    /// Well-formed overrides parse back in order.
    #[test]
    fn prop_route_overrides_keep_order(
        pairs in prop::collection::vec((any::<u16>(), "[a-z][a-z0-9-]{0,12}"), 0..6)
    ) {
        let expr = pairs
            .iter()
            .map(|(port, host)| format!("{port}:{host}"))
            .collect::<Vec<_>>()
            .join(",");
        let parsed = parse_route_overrides(&expr).expect("well-formed");
        prop_assert_eq!(parsed.len(), pairs.len());
        for (o, (port, host)) in parsed.iter().zip(&pairs) {
            prop_assert_eq!(o.port, *port);
            prop_assert_eq!(&o.hostname_prefix, host);
        }
    }

    /// A segment without a colon is always malformed.
    #[test]
    fn prop_segment_without_colon_is_malformed(segment in "[a-z0-9]{1,12}") {
        prop_assert!(parse_route_overrides(&segment).is_err());
    }
}

// ============================================================================
// resolve_environment
// ============================================================================

proptest! {
    /// Explicit values are never replaced by the process environment.
    #[test]
    fn prop_explicit_env_values_win(
        name in "[A-Z][A-Z_]{0,8}",
        value in "[a-z0-9]{1,8}",
        other in "[a-z0-9]{1,8}",
    ) {
        let env = resolve_environment(
            &[format!("{name}={value}")],
            &[format!("{name}={other}")],
        );
        prop_assert_eq!(env.get(&name), Some(&value));
    }

    /// Every named variable appears in the result exactly once.
    #[test]
    fn prop_every_name_is_present(names in prop::collection::btree_set("[A-Z]{1,6}", 0..6)) {
        let tokens: Vec<String> = names.iter().cloned().collect();
        let env = resolve_environment(&tokens, &[]);
        prop_assert_eq!(env.len(), names.len());
        prop_assert!(env.values().all(String::is_empty));
    }
}

// ============================================================================
// AppRoutes codec
// ============================================================================

proptest! {
    /// Decoding what was encoded yields the same routes.
    #[test]
    fn prop_codec_round_trip(routes in prop::collection::vec(app_route(), 0..5)) {
        let routes = AppRoutes(routes);
        let info = routes.routing_info().expect("encode");
        prop_assert_eq!(AppRoutes::from_routing_info(Some(&info)), routes);
    }

    /// Storing routes leaves foreign routing keys untouched.
    #[test]
    fn prop_codec_preserves_foreign_keys(routes in prop::collection::vec(app_route(), 0..3)) {
        let mut info = RoutingInfo::new();
        let foreign = serde_json::value::to_raw_value(&serde_json::json!({"a": 1}))
            .expect("raw");
        info.insert("tcp-router".to_string(), Some(foreign));

        AppRoutes(routes).store(&mut info).expect("encode");
        let kept = info.get("tcp-router").and_then(Option::as_ref).expect("foreign key");
        prop_assert_eq!(kept.get(), r#"{"a":1}"#);
    }
}

#[test]
fn test_absent_and_null_routes_decode_empty() {
    assert!(AppRoutes::from_routing_info(None).is_empty());

    let mut info = RoutingInfo::new();
    assert!(AppRoutes::from_routing_info(Some(&info)).is_empty());

    info.insert("cf-router".to_string(), None);
    assert!(AppRoutes::from_routing_info(Some(&info)).is_empty());
}
