use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Response body of a Shodan host search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub matches: Vec<ShodanMatch>,
    #[serde(default)]
    pub total: u64,
}

/// A single host:port observed serving the queried favicon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShodanMatch {
    pub ip_str: String,
    pub port: u16,
    #[serde(default)]
    pub hostnames: Vec<String>,
    #[serde(default)]
    pub ssl: Option<SslInfo>,
    #[serde(default)]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SslInfo {
    #[serde(default)]
    pub cert: Option<Certificate>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl SslInfo {
    /// Shodan sends `"ssl": {}` for services without TLS data
    pub fn is_empty(&self) -> bool {
        self.cert.is_none() && self.other.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    #[serde(default)]
    pub issuer: Map<String, Value>,
    #[serde(default)]
    pub subject: Map<String, Value>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Text(String),
    Geo(GeoLocation),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoLocation {
    pub city: Option<String>,
    pub region_code: Option<String>,
    pub country_name: Option<String>,
    pub country_code: Option<String>,
}

impl Location {
    /// Human readable form, `None` when nothing useful is known
    pub fn describe(&self) -> Option<String> {
        match self {
            Location::Text(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            Location::Geo(geo) => {
                let country = geo.country_name.as_ref().or(geo.country_code.as_ref());
                let parts: Vec<&str> = [geo.city.as_ref(), geo.region_code.as_ref(), country]
                    .into_iter()
                    .flatten()
                    .map(|part| part.trim())
                    .filter(|part| !part.is_empty())
                    .collect();

                if parts.is_empty() {
                    None
                } else {
                    Some(parts.join(", "))
                }
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.describe() {
            Some(text) => write!(f, "{text}"),
            None => write!(f, "N/A"),
        }
    }
}
