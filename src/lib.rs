pub mod address;
pub mod config;
pub mod favicon;
pub mod model;
pub mod report;
pub mod rules;
pub mod scanner;
pub mod search;

pub use address::{AddressNormalizer, AddressValidation, NormalizedAddress};
pub use config::Config;
pub use favicon::{compute_favicon_hash, FaviconFetcher};
pub use model::{SearchResults, ShodanMatch};
pub use rules::{Reason, SiteKey, SuspicionEvaluator, SuspicionMap};
pub use scanner::{FaviconScanner, ScanOutcome, ScanSummary};
pub use search::ShodanClient;
