use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub shodan: ShodanConfig,
    pub output: OutputConfig,
    pub heuristics: HeuristicsConfig,
}

/// Settings for the two requests made against the target's favicon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            user_agent: format!("favicon-phisher/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShodanConfig {
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub base_url: String,
    /// No timeout unless set; a search blocks until Shodan answers
    pub timeout_seconds: Option<u64>,
}

impl Default for ShodanConfig {
    fn default() -> Self {
        Self {
            api_key_env: "SHODAN_API_KEY".to_string(),
            base_url: "https://api.shodan.io".to_string(),
            timeout_seconds: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub favicon_path: String,
    pub report_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            favicon_path: "favicon.ico".to_string(),
            report_path: "FaviconPhisherOutput.txt".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicsConfig {
    pub standard_ports: Vec<u16>,
    /// TLD suffixes statistically tied to phishing, e.g. ".tk"
    pub suspicious_tlds: Vec<String>,
    pub suspicious_keywords: Vec<String>,
    pub min_domain_length: usize,
    pub max_hyphens: usize,
    pub max_dots: usize,
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            standard_ports: vec![80, 443],
            // Top 20 TLDs by malicious phishing domains (cybercrimeinfocenter.org)
            suspicious_tlds: [
                ".tk", ".buzz", ".xyz", ".top", ".ga", ".ml", ".info", ".cf", ".gq", ".icu",
                ".wang", ".live", ".net", ".cn", ".online", ".host", ".org", ".us", ".ru", ".io",
            ]
            .iter()
            .map(|tld| tld.to_string())
            .collect(),
            suspicious_keywords: [
                "login", "verify", "update", "secure", "account", "bank", "paypal",
            ]
            .iter()
            .map(|keyword| keyword.to_string())
            .collect(),
            min_domain_length: 4,
            max_hyphens: 2,
            max_dots: 3,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn default_path() -> &'static str {
        "favicon-phisher.yaml"
    }
}
