//! Static build metadata for `ddnsup version`

use std::fmt;

/// Version, commit and build date baked in at compile time
///
/// Release builds set `DDNSUP_GIT_COMMIT` and `DDNSUP_BUILD_DATE` in the
/// compiler's environment; local builds report `unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildInfo {
    pub version: &'static str,
    pub commit: &'static str,
    pub date: &'static str,
}

impl BuildInfo {
    pub const fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            commit: or_unknown(option_env!("DDNSUP_GIT_COMMIT")),
            date: or_unknown(option_env!("DDNSUP_BUILD_DATE")),
        }
    }
}

const fn or_unknown(value: Option<&'static str>) -> &'static str {
    match value {
        Some(v) => v,
        None => "unknown",
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ddnsup {}", self.version)?;
        writeln!(f, "commit: {}", self.commit)?;
        write!(f, "built:  {}", self.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_three_lines() {
        let info = BuildInfo {
            version: "1.2.3",
            commit: "abc1234",
            date: "2026-01-02T03:04:05Z",
        };

        assert_eq!(
            info.to_string(),
            "ddnsup 1.2.3\ncommit: abc1234\nbuilt:  2026-01-02T03:04:05Z"
        );
    }

    #[test]
    fn current_uses_package_version() {
        assert_eq!(BuildInfo::current().version, env!("CARGO_PKG_VERSION"));
        assert!(!BuildInfo::current().commit.is_empty());
    }
}
