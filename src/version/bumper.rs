//! Semantic version increments.

use crate::error::VersionError;
use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;
use std::str::FromStr;

/// Kind of release being cut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionBump {
    /// Breaking release: `x.0.0`
    Major,
    /// Feature release: `x.y.0`
    Minor,
    /// Fix release: `x.y.z`
    Patch,
}

impl VersionBump {
    /// All release types, most significant first
    pub const ALL: [VersionBump; 3] = [VersionBump::Major, VersionBump::Minor, VersionBump::Patch];

    /// Lowercase name used on the command line and in requests
    pub fn as_str(self) -> &'static str {
        match self {
            VersionBump::Major => "major",
            VersionBump::Minor => "minor",
            VersionBump::Patch => "patch",
        }
    }
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VersionBump {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "major" => Ok(VersionBump::Major),
            "minor" => Ok(VersionBump::Minor),
            "patch" => Ok(VersionBump::Patch),
            _ => Err(VersionError::InvalidReleaseType {
                input: s.to_string(),
            }),
        }
    }
}

/// Computes next versions
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionBumper;

impl VersionBumper {
    /// Next version for `bump`.
    ///
    /// Lower components reset to zero and pre-release/build metadata is
    /// dropped. A patch bump of a pre-release finalizes it instead of
    /// incrementing (`1.2.3-rc.1` becomes `1.2.3`).
    pub fn bump(current: &Version, bump: VersionBump) -> Result<Version, VersionError> {
        let overflow = || VersionError::Overflow {
            current: current.to_string(),
            bump: bump.to_string(),
        };

        let mut next = current.clone();
        next.pre = Prerelease::EMPTY;
        next.build = BuildMetadata::EMPTY;

        match bump {
            VersionBump::Major => {
                next.major = next.major.checked_add(1).ok_or_else(overflow)?;
                next.minor = 0;
                next.patch = 0;
            }
            VersionBump::Minor => {
                next.minor = next.minor.checked_add(1).ok_or_else(overflow)?;
                next.patch = 0;
            }
            VersionBump::Patch => {
                if current.pre.is_empty() {
                    next.patch = next.patch.checked_add(1).ok_or_else(overflow)?;
                }
            }
        }
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_bump_resets_lower_components() {
        assert_eq!(VersionBumper::bump(&v("1.2.3"), VersionBump::Patch).unwrap(), v("1.2.4"));
        assert_eq!(VersionBumper::bump(&v("1.2.3"), VersionBump::Minor).unwrap(), v("1.3.0"));
        assert_eq!(VersionBumper::bump(&v("1.2.3"), VersionBump::Major).unwrap(), v("2.0.0"));
    }

    #[test]
    fn test_prerelease_patch_finalizes() {
        assert_eq!(VersionBumper::bump(&v("1.2.3-rc.1"), VersionBump::Patch).unwrap(), v("1.2.3"));
        assert_eq!(VersionBumper::bump(&v("1.2.3-rc.1"), VersionBump::Minor).unwrap(), v("1.3.0"));
    }

    #[test]
    fn test_bump_always_strictly_increases() {
        let samples = [
            "0.0.0",
            "0.1.9",
            "1.2.3",
            "9.9.9",
            "1.0.0-alpha",
            "2.4.6-beta.3+exp.sha.5114f85",
            "3.1.4+build.7",
        ];
        for sample in samples {
            let current = v(sample);
            for bump in VersionBump::ALL {
                let next = VersionBumper::bump(&current, bump).unwrap();
                assert!(next > current, "{} {} -> {}", sample, bump, next);
                assert!(next.pre.is_empty() && next.build.is_empty());
                match bump {
                    VersionBump::Major => assert_eq!((next.minor, next.patch), (0, 0)),
                    VersionBump::Minor => assert_eq!(next.patch, 0),
                    VersionBump::Patch => {}
                }
            }
        }
    }

    #[test]
    fn test_component_overflow_is_an_error() {
        let max = u64::MAX;
        let cases = [
            (format!("{max}.0.0"), VersionBump::Major),
            (format!("1.{max}.0"), VersionBump::Minor),
            (format!("1.2.{max}"), VersionBump::Patch),
        ];
        for (current, bump) in cases {
            let err = VersionBumper::bump(&v(&current), bump).unwrap_err();
            assert!(matches!(err, VersionError::Overflow { .. }), "{} {}", current, bump);
            assert!(err.to_string().contains(&current));
        }

        // finalizing a pre-release never increments
        let pre = v(&format!("1.2.{max}-rc.1"));
        assert_eq!(VersionBumper::bump(&pre, VersionBump::Patch).unwrap(), v(&format!("1.2.{max}")));
    }

    #[test]
    fn test_release_type_parsing() {
        assert_eq!("Minor".parse::<VersionBump>().unwrap(), VersionBump::Minor);
        assert!(matches!(
            "huge".parse::<VersionBump>(),
            Err(VersionError::InvalidReleaseType { .. })
        ));
    }
}
