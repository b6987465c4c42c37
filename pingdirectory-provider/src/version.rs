//! Supported PingDirectory product versions

use std::fmt;
use std::str::FromStr;

/// Product versions the provider knows how to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProductVersion {
    V9_1,
    V9_2,
    V9_3,
}

impl ProductVersion {
    pub fn all() -> &'static [ProductVersion] {
        &[
            ProductVersion::V9_1,
            ProductVersion::V9_2,
            ProductVersion::V9_3,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductVersion::V9_1 => "9.1.0.0",
            ProductVersion::V9_2 => "9.2.0.0",
            ProductVersion::V9_3 => "9.3.0.0",
        }
    }
}

impl fmt::Display for ProductVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProductVersion {
    type Err = String;

    /// Accepts full versions ("9.3.0.1") as well as "9.3"; only major.minor matters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('.');
        let major = parts.next().unwrap_or_default();
        let minor = parts.next().unwrap_or("0");

        match (major, minor) {
            ("9", "1") => Ok(ProductVersion::V9_1),
            ("9", "2") => Ok(ProductVersion::V9_2),
            ("9", "3") => Ok(ProductVersion::V9_3),
            _ => {
                let supported: Vec<&str> = Self::all().iter().map(|v| v.as_str()).collect();
                Err(format!(
                    "Unsupported PingDirectory version '{}'. Supported versions: {}",
                    s,
                    supported.join(", ")
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_patch_versions() {
        assert_eq!("9.3.0.2".parse::<ProductVersion>(), Ok(ProductVersion::V9_3));
        assert_eq!("9.1".parse::<ProductVersion>(), Ok(ProductVersion::V9_1));
    }

    #[test]
    fn reject_unsupported() {
        let err = "8.3.0.0".parse::<ProductVersion>().unwrap_err();
        assert!(err.contains("9.1.0.0, 9.2.0.0, 9.3.0.0"));
        assert!("".parse::<ProductVersion>().is_err());
    }

    #[test]
    fn versions_are_ordered() {
        assert!(ProductVersion::V9_1 < ProductVersion::V9_2);
        assert_eq!(ProductVersion::all().last(), Some(&ProductVersion::V9_3));
    }
}
