//! Paths that bypass tracing.

use crate::config::TelemetryConfig;

/// Decides which request paths are served without any tracing.
///
/// Prefixes match whole path segments: `/api/health` excludes
/// `/api/health` and `/api/health/live` but not `/api/healthz`.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    prefixes: Vec<String>,
    skip_static_files: bool,
}

impl PathFilter {
    pub fn new<I, S>(prefixes: I, skip_static_files: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefixes = prefixes
            .into_iter()
            .map(Into::into)
            .map(|prefix: String| {
                let trimmed = prefix.trim_end_matches('/');
                if trimmed.is_empty() {
                    "/".to_string()
                } else {
                    trimmed.to_string()
                }
            })
            .collect();

        Self {
            prefixes,
            skip_static_files,
        }
    }

    pub fn from_config(config: &TelemetryConfig) -> Self {
        Self::new(config.excluded_paths.iter().cloned(), config.skip_static_files)
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        if self.skip_static_files && looks_like_file(path) {
            return true;
        }
        self.prefixes.iter().any(|prefix| matches_prefix(path, prefix))
    }
}

fn matches_prefix(path: &str, prefix: &str) -> bool {
    if prefix == "/" {
        return true;
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn looks_like_file(path: &str) -> bool {
    path.rsplit('/').next().is_some_and(|segment| segment.contains('.'))
}
