use tablekit::{ErrorPolicy, Layout};

use crate::logging::LogFormat;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default request header layout.
#[must_use]
pub const fn default_layout() -> Layout {
    Layout::Extended
}

/// Default handling of rejected request lines.
#[must_use]
pub const fn default_error_policy() -> ErrorPolicy {
    ErrorPolicy::FailFast
}
