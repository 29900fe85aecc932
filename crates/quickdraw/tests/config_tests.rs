use quickdraw::config::{QuickdrawConfig, Role};

// =============================================================================
// DEFAULTS
// =============================================================================

mod defaults {
    use super::*;

    #[test]
    fn minimal_config_validates() {
        assert!(QuickdrawConfig::minimal().validate().is_ok());
    }

    #[test]
    fn default_timings_match_reference_deployment() {
        let config = QuickdrawConfig::minimal();
        assert_eq!(config.timing.rebroadcast_interval_ms, 20);
        assert_eq!(config.timing.claim_timeout_ms, 5_000);
        assert_eq!(config.timing.display_ms, 5_000);
        assert_eq!(config.timing.cooldown_ms, 15_000);
        assert_eq!(config.timing.coordination_window_ms, 17_000);
        assert_eq!(config.timing.winner_flash_half_period_ms, 120);
        assert_eq!(config.timing.unknown_flash_half_period_ms, 500);
        assert_eq!(config.timing.sleep_timer_ms, 2_000);
        assert_eq!(config.timing.listen_window_ms, 50);
    }

    #[test]
    fn default_role_is_participant() {
        let config = QuickdrawConfig::minimal();
        assert_eq!(config.node.role, Role::Participant);
    }

    #[test]
    fn empty_sections_fill_from_defaults() {
        let config = QuickdrawConfig::from_toml(
            r#"
            [node]
            role = "coordinator"
            "#,
        )
        .unwrap();

        assert_eq!(config.node.channel, 4);
        assert_eq!(config.transport.port_base, 47000);
        assert!(config.logging.enabled);
    }
}

// =============================================================================
// PARSING
// =============================================================================

mod parsing {
    use super::*;

    #[test]
    fn full_config_round_trips() {
        let toml = r#"
            [node]
            role = "participant"
            address = "02:00:00:00:00:07"
            channel = 9

            [timing]
            listen_window_ms = 100
            rebroadcast_interval_ms = 25
            claim_timeout_ms = 4000
            display_ms = 3000
            cooldown_ms = 10000
            coordination_window_ms = 12000
            winner_flash_half_period_ms = 100
            unknown_flash_half_period_ms = 400
            sleep_timer_ms = 1500

            [transport]
            bind_addr = "0.0.0.0"
            broadcast_addr = "192.168.1.255"
            port_base = 50000

            [logging]
            enabled = false
        "#;

        let config = QuickdrawConfig::from_toml(toml).unwrap();
        assert_eq!(config.node.channel, 9);
        assert_eq!(config.transport.port(9), 50009);
        assert_eq!(config.timing.claim_timeout_ms, 4_000);
        assert!(!config.logging.enabled);

        let rendered = toml::to_string(&config).unwrap();
        let reparsed = QuickdrawConfig::from_toml(&rendered).unwrap();
        assert_eq!(reparsed.node.address, config.node.address);
        assert_eq!(reparsed.timing.cooldown_ms, config.timing.cooldown_ms);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let result = QuickdrawConfig::from_toml(
            r#"
            [node]
            role = "referee"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn malformed_address_is_rejected() {
        let result = QuickdrawConfig::from_toml(
            r#"
            [node]
            role = "participant"
            address = "not-an-address"
            "#,
        );
        assert!(result.is_err());
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

mod validation {
    use super::*;

    #[test]
    fn missing_participant_address_is_rejected() {
        let config = QuickdrawConfig::from_toml(
            r#"
            [node]
            role = "participant"
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rebroadcast_slower_than_claim_timeout_is_rejected() {
        let config = QuickdrawConfig::from_toml(
            r#"
            [node]
            role = "participant"
            address = "02:00:00:00:00:01"

            [timing]
            rebroadcast_interval_ms = 6000
            claim_timeout_ms = 5000
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn short_coordination_window_is_rejected() {
        let config = QuickdrawConfig::from_toml(
            r#"
            [node]
            role = "coordinator"

            [timing]
            coordination_window_ms = 1000
            claim_timeout_ms = 5000
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_rebroadcast_interval_is_rejected() {
        let config = QuickdrawConfig::from_toml(
            r#"
            [node]
            role = "coordinator"

            [timing]
            rebroadcast_interval_ms = 0
            "#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }
}
