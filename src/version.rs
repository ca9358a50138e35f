//! Version and build information.

use std::fmt;

/// Build information
#[derive(Debug, Clone)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: Option<&'static str>,
    pub build_date: Option<&'static str>,
    pub target: &'static str,
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cname-preflight {}", self.version)?;

        if let Some(commit) = self.commit {
            write!(f, " ({})", commit)?;
        }

        if let Some(date) = self.build_date {
            write!(f, " built {}", date)?;
        }

        write!(f, " [{}]", self.target)
    }
}

/// Get build information
pub fn get_build_info() -> BuildInfo {
    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        commit: option_env!("CNAME_PREFLIGHT_GIT_HASH"),
        build_date: option_env!("CNAME_PREFLIGHT_BUILD_DATE"),
        target: std::env::consts::ARCH,
    }
}
