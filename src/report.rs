//! Merging suspicion records per (IP, port), writing the report file and
//! telling the operator whether their own address was flagged.

use crate::model::ShodanMatch;
use crate::rules::{Reason, SiteKey, SuspicionMap, SuspicionRecord};
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use url::Url;

const RULE_WIDTH: usize = 40;
const BANNER_WIDTH: usize = 60;

#[derive(Debug, Clone)]
pub struct SiteSummary {
    pub key: SiteKey,
    pub reasons: Vec<Reason>,
    /// Lower-cased, in the order they were merged; duplicates are kept
    pub hostnames: Vec<String>,
    pub details: ShodanMatch,
}

impl SiteSummary {
    pub fn sorted_reasons(&self) -> Vec<&'static str> {
        let mut reasons: Vec<&'static str> = self.reasons.iter().map(Reason::as_str).collect();
        reasons.sort_unstable();
        reasons
    }

    pub fn location(&self) -> String {
        self.details
            .location
            .as_ref()
            .and_then(|location| location.describe())
            .unwrap_or_else(|| "N/A".to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AggregatedResults {
    sites: BTreeMap<SiteKey, SiteSummary>,
}

impl AggregatedResults {
    pub fn from_map(suspicions: &SuspicionMap) -> Self {
        let mut aggregated = Self::default();
        for (key, record) in suspicions.iter() {
            aggregated.merge(key, record);
        }
        aggregated
    }

    /// Union the reasons and append the hostnames of a record into its key's entry
    pub fn merge(&mut self, key: &SiteKey, record: &SuspicionRecord) {
        let site = self
            .sites
            .entry(key.clone())
            .or_insert_with(|| SiteSummary {
                key: key.clone(),
                reasons: Vec::new(),
                hostnames: Vec::new(),
                details: record.details.clone(),
            });

        for reason in &record.reasons {
            if !site.reasons.contains(reason) {
                site.reasons.push(*reason);
            }
        }
        site.hostnames.extend(
            record
                .details
                .hostnames
                .iter()
                .map(|hostname| hostname.to_lowercase()),
        );
        site.details = record.details.clone();
    }

    pub fn get(&self, key: &SiteKey) -> Option<&SiteSummary> {
        self.sites.get(key)
    }

    pub fn sites(&self) -> impl Iterator<Item = &SiteSummary> {
        self.sites.values()
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

pub fn render_report(favicon_hash: i32, results: &AggregatedResults) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut report = format!("Results found for hash {favicon_hash}:\n{rule}\n");

    for site in results.sites() {
        let hostnames = if site.hostnames.is_empty() {
            "N/A".to_string()
        } else {
            site.hostnames.join(", ")
        };
        let reasons: Vec<&str> = site.reasons.iter().map(Reason::as_str).collect();

        report.push_str(&format!("IP: {}\n", site.key.ip));
        report.push_str(&format!("Port: {}\n", site.key.port));
        report.push_str(&format!("Hostnames: {hostnames}\n"));
        report.push_str(&format!("Location: {}\n", site.location()));
        report.push_str(&format!("Reasons: {}\n", reasons.join(", ")));
        report.push_str(&format!("{rule}\n"));
    }

    report
}

/// Write the report, replacing any previous run's file
pub fn write_report(path: &Path, favicon_hash: i32, results: &AggregatedResults) -> anyhow::Result<()> {
    fs::write(path, render_report(favicon_hash, results))?;
    log::debug!("Wrote {} flagged sites to {}", results.len(), path.display());
    Ok(())
}

/// The (host, port) the operator asked about; the port defaults from the scheme
pub fn target_key(favicon_url: &str) -> Option<SiteKey> {
    let url = Url::parse(favicon_url).ok()?;
    let host = url.host_str()?;
    let port = url
        .port()
        .unwrap_or(if url.scheme() == "https" { 443 } else { 80 });
    Some(SiteKey::new(host, port))
}

pub fn find_target<'a>(results: &'a AggregatedResults, favicon_url: &str) -> Option<&'a SiteSummary> {
    target_key(favicon_url).and_then(|key| results.get(&key))
}

pub fn print_target_warning<W: Write>(out: &mut W, target: &SiteSummary) -> io::Result<()> {
    let banner = "=".repeat(BANNER_WIDTH);
    writeln!(out)?;
    writeln!(out, "{banner}")?;
    writeln!(out, "WARNING: Potential Phishing Site Detected")?;
    writeln!(out, "{banner}")?;
    writeln!(out, "Target IP      : {}", target.key.ip)?;
    writeln!(out, "Target Port    : {}", target.key.port)?;
    writeln!(out, "Reasons:")?;
    for reason in target.sorted_reasons() {
        writeln!(out, "  - {reason}")?;
    }
    writeln!(out, "{banner}")?;
    writeln!(out)
}

pub fn print_scan_complete<W: Write>(
    out: &mut W,
    report_path: &Path,
    target: Option<&SiteSummary>,
) -> io::Result<()> {
    if let Some(site) = target {
        print_target_warning(out, site)?;
    }

    let rule = "-".repeat(BANNER_WIDTH);
    writeln!(out)?;
    writeln!(out, "{rule}")?;
    writeln!(out, "Scan Complete")?;
    writeln!(out, "{rule}")?;
    writeln!(out, "A list of other suspicious sites using this favicon has been")?;
    writeln!(out, "saved to: {}", report_path.display())?;
    if target.is_some() {
        writeln!(out, "The provided address has been flagged. Review details above.")?;
    } else {
        writeln!(out, "No flags were raised for the provided address.")?;
    }
    writeln!(out, "Thank you for using FaviconPhisher.")?;
    writeln!(out, "{rule}")?;
    writeln!(out)
}
