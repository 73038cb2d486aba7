// Version information for the blocksite publisher

/// Full version string with feature description
pub const VERSION: &str = "v0.2.0-resumable-publish-2026-10-19";

/// Semantic version number
pub const VERSION_NUMBER: &str = "0.2.0";

/// Build date
pub const BUILD_DATE: &str = "2026-10-19";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "chunked-publish",
    "zlib-compression",
    "resumable-sessions",
    "persistent-state-file",
    "arity-checked-calls",
    "chat-creation",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Blocksite Publisher {} ({})", VERSION, BUILD_DATE)
}
