use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::error::{Component, Error, Result};

/// A partially specified version number: `major.minor[.build[.revision]]`
///
/// `build` and `revision` are optional. An unset component orders before any
/// explicit value, so `4.0.1` < `4.0.1.0`. Ordering and equality are
/// lexicographic over `(major, minor, build, revision)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    major: u32,
    minor: u32,
    build: Option<u32>,
    revision: Option<u32>,
}

impl Version {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor, build: None, revision: None }
    }

    pub const fn with_build(major: u32, minor: u32, build: u32) -> Self {
        Self { major, minor, build: Some(build), revision: None }
    }

    pub const fn with_build_revision(major: u32, minor: u32, build: u32, revision: u32) -> Self {
        Self { major, minor, build: Some(build), revision: Some(revision) }
    }

    /// Build a version from signed components, rejecting any negative value
    pub fn checked(major: i64, minor: i64, build: Option<i64>, revision: Option<i64>) -> Result<Self> {
        let major = component(Component::Major, major)?;
        let minor = component(Component::Minor, minor)?;
        let build = build.map(|b| component(Component::Build, b)).transpose()?;
        let revision = revision.map(|r| component(Component::Revision, r)).transpose()?;

        if build.is_none() && revision.is_some() {
            return Err(Error::format(
                format!("{}.{}", major, minor),
                "revision given without build",
            ));
        }

        Ok(Self { major, minor, build, revision })
    }

    /// Parse `N`, `N.N`, `N.N.N` or `N.N.N.N`
    ///
    /// A bare `N` is read as `N.0`. Non-numeric tokens, empty tokens and more
    /// than four components are format errors; negative components are
    /// rejected as invalid arguments.
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() {
            return Err(Error::format(input, "version string is empty"));
        }

        let mut parts = Vec::with_capacity(4);
        for token in input.split('.') {
            let digits = token.strip_prefix('-').unwrap_or(token);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::format(input, format!("component {:?} is not an integer", token)));
            }
            let value = token.parse::<i64>().map_err(|e| {
                Error::format(input, format!("component {:?} is not an integer: {}", token, e))
            })?;
            parts.push(value);
        }

        match parts.as_slice() {
            [major] => Self::checked(*major, 0, None, None),
            [major, minor] => Self::checked(*major, *minor, None, None),
            [major, minor, build] => Self::checked(*major, *minor, Some(*build), None),
            [major, minor, build, revision] => {
                Self::checked(*major, *minor, Some(*build), Some(*revision))
            }
            _ => Err(Error::format(
                input,
                format!("expected 1 to 4 components, found {}", parts.len()),
            )),
        }
    }

    pub fn major(&self) -> u32 {
        self.major
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn build(&self) -> Option<u32> {
        self.build
    }

    pub fn revision(&self) -> Option<u32> {
        self.revision
    }
}

fn component(which: Component, value: i64) -> Result<u32> {
    if value < 0 {
        return Err(Error::InvalidArgument { component: which, value });
    }
    u32::try_from(value).map_err(|_| {
        Error::format(value.to_string(), format!("{} component does not fit in 32 bits", which))
    })
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;
        if let Some(build) = self.build {
            write!(f, ".{}", build)?;
            if let Some(revision) = self.revision {
                write!(f, ".{}", revision)?;
            }
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Version::parse(&value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.to_string()
    }
}
