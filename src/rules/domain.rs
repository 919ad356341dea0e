use super::{Reason, SuspicionRule};
use crate::config::HeuristicsConfig;
use crate::model::ShodanMatch;
use regex::Regex;

/// Hostname characteristics common among phishing domains
pub struct DomainRule {
    suspicious_tlds: Vec<String>,
    keyword_pattern: Option<Regex>,
    min_domain_length: usize,
    max_hyphens: usize,
    max_dots: usize,
}

impl DomainRule {
    pub fn from_config(config: &HeuristicsConfig) -> anyhow::Result<Self> {
        let suspicious_tlds = config
            .suspicious_tlds
            .iter()
            .map(|tld| tld.trim())
            .filter(|tld| !tld.is_empty())
            .map(|tld| {
                if tld.starts_with('.') {
                    tld.to_string()
                } else {
                    format!(".{tld}")
                }
            })
            .collect();

        let keywords: Vec<String> = config
            .suspicious_keywords
            .iter()
            .filter(|keyword| !keyword.is_empty())
            .map(|keyword| regex::escape(keyword))
            .collect();
        let keyword_pattern = if keywords.is_empty() {
            None
        } else {
            Some(Regex::new(&format!("({})", keywords.join("|")))?)
        };

        Ok(Self {
            suspicious_tlds,
            keyword_pattern,
            min_domain_length: config.min_domain_length,
            max_hyphens: config.max_hyphens,
            max_dots: config.max_dots,
        })
    }

    /// The label left of the TLD, or the whole hostname when it has no dot
    pub fn domain_label(hostname: &str) -> &str {
        hostname.rsplit('.').nth(1).unwrap_or(hostname)
    }

    pub fn check_hostname(&self, hostname: &str) -> Vec<Reason> {
        let mut reasons = Vec::new();

        if self
            .suspicious_tlds
            .iter()
            .any(|tld| hostname.ends_with(tld.as_str()))
        {
            reasons.push(Reason::SuspiciousTld);
        }

        if Self::domain_label(hostname).chars().count() < self.min_domain_length {
            reasons.push(Reason::ShortDomainName);
        }

        if hostname.matches('-').count() > self.max_hyphens {
            reasons.push(Reason::ManyHyphens);
        }

        if hostname.matches('.').count() > self.max_dots {
            reasons.push(Reason::ManySubdomains);
        }

        if let Some(pattern) = &self.keyword_pattern {
            if pattern.is_match(hostname) {
                reasons.push(Reason::SuspiciousKeywords);
            }
        }

        reasons
    }
}

impl SuspicionRule for DomainRule {
    fn evaluate(&self, site: &ShodanMatch) -> Vec<Reason> {
        site.hostnames
            .iter()
            .flat_map(|hostname| self.check_hostname(hostname))
            .collect()
    }

    fn name(&self) -> &str {
        "domain"
    }
}
