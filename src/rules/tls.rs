use super::{Reason, SuspicionRule};
use crate::model::ShodanMatch;

/// Flags services without TLS data or with a certificate issued to itself.
///
/// Self-signature is inferred from issuer == subject; the signature itself
/// is never verified.
pub struct TlsRule;

impl SuspicionRule for TlsRule {
    fn evaluate(&self, site: &ShodanMatch) -> Vec<Reason> {
        let ssl = match &site.ssl {
            Some(ssl) if !ssl.is_empty() => ssl,
            _ => return vec![Reason::NoSslCertificate],
        };

        match &ssl.cert {
            Some(cert) if !cert.issuer.is_empty() && cert.issuer == cert.subject => {
                vec![Reason::SelfSignedCertificate]
            }
            _ => Vec::new(),
        }
    }

    fn name(&self) -> &str {
        "tls"
    }
}
