//! Failure taxonomy for the initial data load.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Why the initial sitemap data could not be loaded.
///
/// Incremental pushes are not expected to fail; this taxonomy only covers
/// the connection/bootstrap path. The `Display` form doubles as the
/// technical detail surface on the error screen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// No network connectivity is available at all.
    #[error("no network connection available")]
    NoNetwork,

    /// A network is reachable but fails the configured-network constraint.
    #[error("connected network does not match the configured one")]
    WrongNetwork,

    /// No usable server URL could be resolved.
    #[error("no usable server address configured")]
    NoServerInfo,

    /// Any other failure fetching server properties or sitemap data.
    #[error("remote request failed: {0}")]
    Remote(String),
}

impl LoadError {
    /// User-facing message for the error screen.
    ///
    /// Wrong-network and missing-server-info failures share the
    /// "not reachable" wording; anything else gets the generic load
    /// failure message.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoNetwork => "No network connection",
            Self::WrongNetwork | Self::NoServerInfo => "openHAB server not reachable",
            Self::Remote(_) => "Failed to load sitemap data",
        }
    }
}
