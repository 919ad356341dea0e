use super::{Reason, SuspicionRule};
use crate::config::HeuristicsConfig;
use crate::model::ShodanMatch;

/// Flags services listening anywhere but the usual web ports
pub struct PortRule {
    standard_ports: Vec<u16>,
}

impl Default for PortRule {
    fn default() -> Self {
        Self::from_config(&HeuristicsConfig::default())
    }
}

impl PortRule {
    pub fn from_config(config: &HeuristicsConfig) -> Self {
        Self {
            standard_ports: config.standard_ports.clone(),
        }
    }
}

impl SuspicionRule for PortRule {
    fn evaluate(&self, site: &ShodanMatch) -> Vec<Reason> {
        if self.standard_ports.contains(&site.port) {
            Vec::new()
        } else {
            vec![Reason::NonStandardPort]
        }
    }

    fn name(&self) -> &str {
        "port"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::tests::site;

    #[test]
    fn test_standard_ports_pass() {
        let rule = PortRule::default();
        assert!(rule.evaluate(&site("203.0.113.5", 80, &[])).is_empty());
        assert!(rule.evaluate(&site("203.0.113.5", 443, &[])).is_empty());
    }

    #[test]
    fn test_every_other_port_is_flagged() {
        let rule = PortRule::default();
        for port in [0, 1, 21, 79, 81, 442, 444, 8000, 8080, 8443, 65535] {
            assert_eq!(
                rule.evaluate(&site("203.0.113.5", port, &[])),
                vec![Reason::NonStandardPort],
                "port {port}"
            );
        }
    }

    #[test]
    fn test_configured_ports() {
        let config = HeuristicsConfig {
            standard_ports: vec![80, 443, 8443],
            ..Default::default()
        };
        let rule = PortRule::from_config(&config);
        assert!(rule.evaluate(&site("203.0.113.5", 8443, &[])).is_empty());
        assert_eq!(
            rule.evaluate(&site("203.0.113.5", 8080, &[])),
            vec![Reason::NonStandardPort]
        );
    }
}
