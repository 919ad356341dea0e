use crate::address::NormalizedAddress;
use crate::config::Config;
use crate::favicon::FaviconFetcher;
use crate::report::{self, AggregatedResults, SiteSummary};
use crate::rules::SuspicionEvaluator;
use crate::search::ShodanClient;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub favicon_hash: i32,
    pub report_path: PathBuf,
    pub flagged_sites: usize,
    /// The queried address's own record, when it was among the flagged sites
    pub target: Option<SiteSummary>,
}

#[derive(Debug, Clone)]
pub enum ScanOutcome {
    Unreachable,
    HashUnavailable,
    NoResults { favicon_hash: i32 },
    Completed(ScanSummary),
}

/// Runs one address through fetch, hash, search, evaluation and reporting
pub struct FaviconScanner {
    fetcher: FaviconFetcher,
    search: ShodanClient,
    evaluator: SuspicionEvaluator,
    report_path: PathBuf,
}

impl FaviconScanner {
    pub fn new(
        fetcher: FaviconFetcher,
        search: ShodanClient,
        evaluator: SuspicionEvaluator,
        report_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            fetcher,
            search,
            evaluator,
            report_path: report_path.into(),
        }
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(
            FaviconFetcher::new(&config.http, &config.output.favicon_path)?,
            ShodanClient::new(&config.shodan)?,
            SuspicionEvaluator::from_config(&config.heuristics)?,
            &config.output.report_path,
        ))
    }

    pub async fn scan(&self, address: &NormalizedAddress) -> anyhow::Result<ScanOutcome> {
        let favicon_url = address.favicon_url();
        log::info!("Scanning {favicon_url}");

        if !self.fetcher.is_reachable(favicon_url).await {
            return Ok(ScanOutcome::Unreachable);
        }

        let Some(favicon_hash) = self.fetcher.fetch_and_hash(favicon_url).await? else {
            return Ok(ScanOutcome::HashUnavailable);
        };
        println!("The favicon hash is: {favicon_hash}");

        let Some(results) = self.search.search(favicon_hash).await else {
            return Ok(ScanOutcome::NoResults { favicon_hash });
        };
        log::info!(
            "Evaluating {} of {} hosts sharing the favicon",
            results.matches.len(),
            results.total
        );

        let suspicions = self.evaluator.evaluate(&results.matches);
        let aggregated = AggregatedResults::from_map(&suspicions);
        report::write_report(&self.report_path, favicon_hash, &aggregated)?;

        Ok(ScanOutcome::Completed(ScanSummary {
            favicon_hash,
            report_path: self.report_path.clone(),
            flagged_sites: aggregated.len(),
            target: report::find_target(&aggregated, favicon_url).cloned(),
        }))
    }
}
