//! Tests for turning action arguments into typed actions.

use crate::action::Action;
use crate::network::IpFamily;

use super::*;

fn action_for(args: &[&str]) -> Result<Action, ConfigError> {
    let mut full = vec!["-d", "eth0"];
    full.extend(args);
    ValidatedConfig::from_raw(&cli(&full), None).map(|config| config.action)
}

mod get_dhcp {
    use super::*;

    #[test]
    fn proto_defaults_to_ipv4() {
        let action = action_for(&["-a", "get_dhcp"]).unwrap();

        assert_eq!(
            action,
            Action::GetDhcp {
                family: IpFamily::V4
            }
        );
    }

    #[test]
    fn proto_six_selects_ipv6() {
        let action = action_for(&["-a", "get_dhcp", "-p", "6"]).unwrap();

        assert_eq!(
            action,
            Action::GetDhcp {
                family: IpFamily::V6
            }
        );
    }

    #[test]
    fn combined_proto_is_rejected() {
        let result = action_for(&["-a", "get_dhcp", "-p", "46"]);

        assert!(matches!(
            result,
            Err(ConfigError::InvalidProto { ref value }) if value == "46"
        ));
    }
}

mod set_dhcp {
    use super::*;

    #[test]
    fn keeps_proto_digits() {
        let action = action_for(&["-a", "set_dhcp", "-p", "46"]).unwrap();

        assert_eq!(
            action,
            Action::SetDhcp {
                protocols: "46".to_string()
            }
        );
    }

    #[test]
    fn requires_proto() {
        let result = action_for(&["-a", "set_dhcp"]);

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequired { field: "proto", .. })
        ));
    }
}

mod address_actions {
    use super::*;

    #[test]
    fn set_ip_splits_addresses_and_options() {
        let action = action_for(&[
            "-a",
            "set_ip",
            "-i",
            " 10.0.0.5/24   fd00::5 ",
            "-o",
            "dhcp6",
        ])
        .unwrap();

        assert_eq!(
            action,
            Action::SetIp {
                addresses: vec!["10.0.0.5/24".to_string(), "fd00::5".to_string()],
                options: vec!["dhcp6".to_string()],
            }
        );
    }

    #[test]
    fn set_ip_without_options_has_none() {
        let action = action_for(&["-a", "set_ip", "-i", "10.0.0.5"]).unwrap();

        assert!(matches!(action, Action::SetIp { ref options, .. } if options.is_empty()));
    }

    #[test]
    fn set_gateway_splits_addresses() {
        let action = action_for(&["-a", "set_gateway", "-i", "10.0.0.1 fe80::1"]).unwrap();

        assert_eq!(
            action,
            Action::SetGateway {
                addresses: vec!["10.0.0.1".to_string(), "fe80::1".to_string()],
            }
        );
    }

    #[test]
    fn set_route_keeps_single_token() {
        let action = action_for(&["-a", "set_route", "-i", " 10.0.0.0/8=10.0.0.1m100 "]).unwrap();

        assert_eq!(
            action,
            Action::SetRoute {
                token: "10.0.0.0/8=10.0.0.1m100".to_string()
            }
        );
    }

    #[test]
    fn ip_is_required() {
        for name in ["set_ip", "set_gateway", "set_route"] {
            let result = action_for(&["-a", name]);

            assert!(
                matches!(result, Err(ConfigError::MissingRequired { field: "ip", .. })),
                "action {name}"
            );
        }
    }
}

mod restart {
    use super::*;

    #[test]
    fn ignores_payload_arguments() {
        let action = action_for(&["-a", "restart", "-i", "10.0.0.1", "-p", "9"]).unwrap();

        assert_eq!(action, Action::Restart);
    }
}
