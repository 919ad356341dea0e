//! Sanitising and validating the address typed by the operator.
//!
//! Accepted shapes are an IPv4 address or a dotted domain name, each with an
//! optional `http(s)://` scheme and an optional port. A valid address is
//! turned into the URL of the site's default favicon.

use regex::Regex;
use std::io::{BufRead, Write};
use url::Url;

const FAVICON_PATH: &str = "/favicon.ico";

/// An address that passed validation, pointing at `<host>/favicon.ico`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAddress {
    favicon_url: String,
}

impl NormalizedAddress {
    pub fn favicon_url(&self) -> &str {
        &self.favicon_url
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressValidation {
    Valid(NormalizedAddress),
    Invalid { reason: String },
}

impl AddressValidation {
    pub fn is_valid(&self) -> bool {
        matches!(self, AddressValidation::Valid(_))
    }
}

pub struct AddressNormalizer {
    ipv4_pattern: Regex,
    domain_pattern: Regex,
}

impl Default for AddressNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressNormalizer {
    pub fn new() -> Self {
        Self {
            ipv4_pattern: Regex::new(r"^(https?://)?(\d{1,3}\.){3}\d{1,3}(:\d{1,5})?$").unwrap(),
            domain_pattern: Regex::new(
                r"^(https?://)?([a-zA-Z0-9-]+\.)+[a-zA-Z]{2,}(/[\w\-/]*)*(:\d{1,5})?$",
            )
            .unwrap(),
        }
    }

    /// Remove surrounding whitespace and any trailing slashes
    pub fn sanitize(address: &str) -> &str {
        address.trim().trim_end_matches('/')
    }

    /// Prefix `http://` unless the address already names a scheme
    pub fn ensure_scheme(address: &str) -> String {
        if address.starts_with("http://") || address.starts_with("https://") {
            address.to_string()
        } else {
            format!("http://{address}")
        }
    }

    pub fn is_valid_address(&self, address: &str) -> bool {
        self.ipv4_pattern.is_match(address) || self.domain_pattern.is_match(address)
    }

    pub fn normalize(&self, raw: &str) -> AddressValidation {
        let mut address = Self::sanitize(raw);

        // Already normalized addresses carry the favicon path; it is re-added below
        if let Some(stripped) = address.strip_suffix(FAVICON_PATH) {
            address = Self::sanitize(stripped);
        }

        if address.is_empty() {
            return AddressValidation::Invalid {
                reason: "no address entered".to_string(),
            };
        }

        if !self.is_valid_address(address) {
            return AddressValidation::Invalid {
                reason: format!("'{address}' is not an IPv4 address or domain name"),
            };
        }

        let favicon_url = format!("{}{FAVICON_PATH}", Self::ensure_scheme(address));

        // The patterns admit ports and octets outside their valid ranges
        if let Err(e) = Url::parse(&favicon_url) {
            return AddressValidation::Invalid {
                reason: format!("'{address}' is not a usable URL ({e})"),
            };
        }

        log::debug!("Normalized '{}' to {}", raw.trim(), favicon_url);
        AddressValidation::Valid(NormalizedAddress { favicon_url })
    }
}

/// Prompt until a valid address is entered. Returns `None` at end of input.
pub fn prompt_for_address<R: BufRead, W: Write>(
    normalizer: &AddressNormalizer,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<Option<NormalizedAddress>> {
    loop {
        writeln!(output, "Enter a website address or IP address: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        match normalizer.normalize(&line) {
            AddressValidation::Valid(address) => return Ok(Some(address)),
            AddressValidation::Invalid { reason } => {
                writeln!(
                    output,
                    "Invalid address format ({reason}). Please enter a valid domain or IP."
                )?;
            }
        }
    }
}
