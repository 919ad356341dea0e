pub mod domain;
pub mod port;
pub mod tls;

use crate::config::HeuristicsConfig;
use crate::model::ShodanMatch;
use std::collections::BTreeMap;
use std::fmt;

pub use domain::DomainRule;
pub use port::PortRule;
pub use tls::TlsRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    NonStandardPort,
    SuspiciousTld,
    ShortDomainName,
    ManyHyphens,
    ManySubdomains,
    SuspiciousKeywords,
    NoSslCertificate,
    SelfSignedCertificate,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::NonStandardPort => "Non-standard port",
            Reason::SuspiciousTld => "Domain TLD is suspicious",
            Reason::ShortDomainName => "Domain name is very short",
            Reason::ManyHyphens => "Domain contains many hyphens",
            Reason::ManySubdomains => "Domain has too many subdomains",
            Reason::SuspiciousKeywords => "Domain name contains suspicious keywords",
            Reason::NoSslCertificate => "No SSL certificate",
            Reason::SelfSignedCertificate => "Self-signed SSL certificate",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one service: an IP address and the port it was seen on
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SiteKey {
    pub ip: String,
    pub port: u16,
}

impl SiteKey {
    pub fn new(ip: impl Into<String>, port: u16) -> Self {
        Self {
            ip: ip.into(),
            port,
        }
    }

    pub fn of(site: &ShodanMatch) -> Self {
        Self::new(site.ip_str.clone(), site.port)
    }
}

impl fmt::Display for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

#[derive(Debug, Clone)]
pub struct SuspicionRecord {
    pub reasons: Vec<Reason>,
    /// The match that raised the first reason for this key
    pub details: ShodanMatch,
}

impl SuspicionRecord {
    pub fn has_reason(&self, reason: Reason) -> bool {
        self.reasons.contains(&reason)
    }
}

/// Reasons accumulated per (IP, port); an entry exists only once a rule fired
#[derive(Debug, Clone, Default)]
pub struct SuspicionMap {
    records: BTreeMap<SiteKey, SuspicionRecord>,
}

impl SuspicionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reason for the match's (IP, port). Returns false if it was already there.
    pub fn add_reason(&mut self, site: &ShodanMatch, reason: Reason) -> bool {
        let record = self
            .records
            .entry(SiteKey::of(site))
            .or_insert_with(|| SuspicionRecord {
                reasons: Vec::new(),
                details: site.clone(),
            });

        if record.has_reason(reason) {
            false
        } else {
            record.reasons.push(reason);
            true
        }
    }

    pub fn get(&self, key: &SiteKey) -> Option<&SuspicionRecord> {
        self.records.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SiteKey, &SuspicionRecord)> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// One independent heuristic applied to every match
pub trait SuspicionRule: Send + Sync {
    fn evaluate(&self, site: &ShodanMatch) -> Vec<Reason>;
    fn name(&self) -> &str;
}

pub struct SuspicionEvaluator {
    rules: Vec<Box<dyn SuspicionRule>>,
}

impl SuspicionEvaluator {
    pub fn from_config(config: &HeuristicsConfig) -> anyhow::Result<Self> {
        Ok(Self::with_rules(vec![
            Box::new(PortRule::from_config(config)),
            Box::new(DomainRule::from_config(config)?),
            Box::new(TlsRule),
        ]))
    }

    pub fn with_rules(rules: Vec<Box<dyn SuspicionRule>>) -> Self {
        Self { rules }
    }

    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn evaluate(&self, matches: &[ShodanMatch]) -> SuspicionMap {
        let mut suspicions = SuspicionMap::new();

        for rule in &self.rules {
            for site in matches {
                for reason in rule.evaluate(site) {
                    if suspicions.add_reason(site, reason) {
                        log::debug!("{} flagged {}: {}", rule.name(), SiteKey::of(site), reason);
                    }
                }
            }
        }

        suspicions
    }
}
