use favicon_phisher::config::{HeuristicsConfig, HttpConfig, ShodanConfig};
use favicon_phisher::report::{self, AggregatedResults};
use favicon_phisher::{
    AddressNormalizer, AddressValidation, FaviconFetcher, FaviconScanner, NormalizedAddress, Reason,
    ScanOutcome, ShodanClient, ShodanMatch, SiteKey, SuspicionEvaluator,
};
use std::fs;
use std::path::Path;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// compute_favicon_hash(b"favicon")
const FAVICON_HASH: i32 = 1051234394;

fn normalize(raw: &str) -> NormalizedAddress {
    match AddressNormalizer::new().normalize(raw) {
        AddressValidation::Valid(address) => address,
        AddressValidation::Invalid { reason } => panic!("{raw} rejected: {reason}"),
    }
}

fn scanner(dir: &Path, shodan: &MockServer, api_key: Option<&str>) -> FaviconScanner {
    let http = HttpConfig {
        timeout_seconds: 5,
        ..Default::default()
    };
    let shodan_config = ShodanConfig {
        base_url: shodan.uri(),
        timeout_seconds: Some(5),
        ..Default::default()
    };

    FaviconScanner::new(
        FaviconFetcher::new(&http, dir.join("favicon.ico")).unwrap(),
        ShodanClient::with_api_key(&shodan_config, api_key.map(str::to_string)).unwrap(),
        SuspicionEvaluator::from_config(&HeuristicsConfig::default()).unwrap(),
        dir.join("FaviconPhisherOutput.txt"),
    )
}

async fn serve_favicon(target: &MockServer, expected_requests: u64) {
    Mock::given(method("GET"))
        .and(path("/favicon.ico"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"favicon".to_vec()))
        .expect(expected_requests)
        .mount(target)
        .await;
}

async fn serve_matches(shodan: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/shodan/host/search"))
        .and(query_param("key", "test-key"))
        .and(query_param("query", format!("http.favicon.hash:{FAVICON_HASH}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(shodan)
        .await;
}

fn block_count(report: &str) -> usize {
    report.lines().filter(|line| line.starts_with("IP: ")).count()
}

#[test]
fn test_phishing_match_for_example_tk() {
    let address = normalize("example.tk:8080");
    let matches: Vec<ShodanMatch> = serde_json::from_str(
        r#"[{"ip_str": "203.0.113.5", "port": 8080, "hostnames": ["secure-example.tk"]}]"#,
    )
    .unwrap();

    let evaluator = SuspicionEvaluator::from_config(&HeuristicsConfig::default()).unwrap();
    let suspicions = evaluator.evaluate(&matches);
    let record = suspicions.get(&SiteKey::new("203.0.113.5", 8080)).unwrap();

    let mut reasons = record.reasons.clone();
    reasons.sort_by_key(Reason::as_str);
    assert_eq!(
        reasons,
        vec![
            Reason::SuspiciousTld,
            Reason::SuspiciousKeywords,
            Reason::NoSslCertificate,
            Reason::NonStandardPort,
        ]
    );

    let aggregated = AggregatedResults::from_map(&suspicions);
    let dir = tempfile::tempdir().unwrap();
    let report_path = dir.path().join("FaviconPhisherOutput.txt");
    report::write_report(&report_path, FAVICON_HASH, &aggregated).unwrap();

    let written = fs::read_to_string(&report_path).unwrap();
    assert_eq!(block_count(&written), 1);
    assert!(written.contains("IP: 203.0.113.5\nPort: 8080\nHostnames: secure-example.tk\n"));

    // The target is a hostname, the match an IP: the target itself is not flagged
    assert!(report::find_target(&aggregated, address.favicon_url()).is_none());
}

#[tokio::test]
async fn test_scan_flags_queried_address() {
    let target = MockServer::start().await;
    let shodan = MockServer::start().await;
    let port = target.address().port();

    serve_favicon(&target, 2).await;
    serve_matches(
        &shodan,
        format!(
            r#"{{"total": 2, "matches": [
                {{"ip_str": "127.0.0.1", "port": {port}, "hostnames": []}},
                {{"ip_str": "198.51.100.1", "port": 443, "hostnames": ["example.com"],
                  "ssl": {{"cert": {{"issuer": {{"CN": "R3"}}, "subject": {{"CN": "example.com"}}}}}}}}
            ]}}"#
        ),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let scanner = scanner(dir.path(), &shodan, Some("test-key"));
    let outcome = scanner
        .scan(&normalize(&format!("127.0.0.1:{port}")))
        .await
        .unwrap();

    let summary = match outcome {
        ScanOutcome::Completed(summary) => summary,
        other => panic!("expected a completed scan, got {other:?}"),
    };
    assert_eq!(summary.favicon_hash, FAVICON_HASH);
    assert_eq!(summary.flagged_sites, 1);

    let flagged = summary.target.expect("queried address should be flagged");
    assert_eq!(flagged.key, SiteKey::new("127.0.0.1", port));
    assert_eq!(
        flagged.sorted_reasons(),
        vec!["No SSL certificate", "Non-standard port"]
    );

    let written = fs::read_to_string(&summary.report_path).unwrap();
    assert!(written.starts_with(&format!("Results found for hash {FAVICON_HASH}:")));
    assert_eq!(block_count(&written), 1);
    assert_eq!(
        fs::read(dir.path().join("favicon.ico")).unwrap(),
        b"favicon".to_vec()
    );
}

#[tokio::test]
async fn test_scan_target_not_among_matches() {
    let target = MockServer::start().await;
    let shodan = MockServer::start().await;

    serve_favicon(&target, 2).await;
    serve_matches(
        &shodan,
        r#"{"total": 2, "matches": [
            {"ip_str": "203.0.113.5", "port": 8080, "hostnames": ["secure-example.tk"]},
            {"ip_str": "203.0.113.6", "port": 8443, "hostnames": ["verify-account.xyz"]}
        ]}"#
        .to_string(),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let scanner = scanner(dir.path(), &shodan, Some("test-key"));
    let outcome = scanner
        .scan(&normalize(&format!("127.0.0.1:{}", target.address().port())))
        .await
        .unwrap();

    let summary = match outcome {
        ScanOutcome::Completed(summary) => summary,
        other => panic!("expected a completed scan, got {other:?}"),
    };
    assert!(summary.target.is_none());

    let written = fs::read_to_string(&summary.report_path).unwrap();
    assert_eq!(block_count(&written), 2);
    assert!(written.contains("IP: 203.0.113.5"));
    assert!(written.contains("IP: 203.0.113.6"));

    let mut out = Vec::new();
    report::print_scan_complete(&mut out, &summary.report_path, summary.target.as_ref()).unwrap();
    assert!(String::from_utf8(out)
        .unwrap()
        .contains("No flags were raised for the provided address."));
}

#[tokio::test]
async fn test_missing_credential_produces_no_report() {
    let target = MockServer::start().await;
    let shodan = MockServer::start().await;

    serve_favicon(&target, 2).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"matches": []}"#))
        .expect(0)
        .mount(&shodan)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let scanner = scanner(dir.path(), &shodan, None);
    let outcome = scanner
        .scan(&normalize(&format!("127.0.0.1:{}", target.address().port())))
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        ScanOutcome::NoResults {
            favicon_hash: FAVICON_HASH
        }
    ));
    assert!(!dir.path().join("FaviconPhisherOutput.txt").exists());
}

#[tokio::test]
async fn test_unreachable_target_stops_before_hashing() {
    let target = MockServer::start().await;
    let shodan = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/favicon.ico"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&target)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"matches": []}"#))
        .expect(0)
        .mount(&shodan)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let scanner = scanner(dir.path(), &shodan, Some("test-key"));
    let outcome = scanner
        .scan(&normalize(&format!("127.0.0.1:{}", target.address().port())))
        .await
        .unwrap();

    assert!(matches!(outcome, ScanOutcome::Unreachable));
    assert!(!dir.path().join("favicon.ico").exists());
    assert!(!dir.path().join("FaviconPhisherOutput.txt").exists());
}
