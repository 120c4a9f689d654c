//! Pact specification versions and interaction parts.

use crate::error::PactError;
use std::fmt;
use std::str::FromStr;

/// Version of the Pact specification a pact document is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpecificationVersion {
    /// Version 1.0
    V1,
    /// Version 1.1
    V1_1,
    /// Version 2.0
    V2,
    /// Version 3.0
    V3,
    /// Version 4.0, the only one with synchronous message interactions
    #[default]
    V4,
}

impl SpecificationVersion {
    /// All versions, oldest first.
    pub const ALL: [Self; 5] = [Self::V1, Self::V1_1, Self::V2, Self::V3, Self::V4];

    /// Value of the engine's `PactSpecification` enum.
    #[must_use]
    pub const fn native(self) -> u32 {
        match self {
            Self::V1 => 1,
            Self::V1_1 => 2,
            Self::V2 => 3,
            Self::V3 => 4,
            Self::V4 => 5,
        }
    }

    /// Dotted version string as written in pact files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V1 => "1.0.0",
            Self::V1_1 => "1.1.0",
            Self::V2 => "2.0.0",
            Self::V3 => "3.0.0",
            Self::V4 => "4.0",
        }
    }
}

impl fmt::Display for SpecificationVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecificationVersion {
    type Err = PactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let normalized = normalized.strip_prefix('v').unwrap_or(&normalized);
        match normalized {
            "1" | "1.0" | "1.0.0" => Ok(Self::V1),
            "1_1" | "1.1" | "1.1.0" => Ok(Self::V1_1),
            "2" | "2.0" | "2.0.0" => Ok(Self::V2),
            "3" | "3.0" | "3.0.0" => Ok(Self::V3),
            "4" | "4.0" | "4.0.0" => Ok(Self::V4),
            _ => Err(PactError::config(format!("unknown pact specification version: {s}"))),
        }
    }
}

/// Which side of an interaction contents are attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionPart {
    /// The request (for gRPC this carries the whole contract)
    Request,
    /// The response
    Response,
}

impl InteractionPart {
    /// Value of the engine's `InteractionPart` enum.
    #[must_use]
    pub const fn native(self) -> u32 {
        match self {
            Self::Request => 0,
            Self::Response => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_native_values_are_distinct() {
        let values: HashSet<u32> = SpecificationVersion::ALL.iter().map(|v| v.native()).collect();
        assert_eq!(values.len(), SpecificationVersion::ALL.len());
        assert!(!values.contains(&0), "0 is the engine's Unknown version");
    }

    #[test]
    fn test_parse_versions() {
        assert_eq!("V4".parse::<SpecificationVersion>().unwrap(), SpecificationVersion::V4);
        assert_eq!("v1.1".parse::<SpecificationVersion>().unwrap(), SpecificationVersion::V1_1);
        assert_eq!("V1_1".parse::<SpecificationVersion>().unwrap(), SpecificationVersion::V1_1);
        assert_eq!("3.0.0".parse::<SpecificationVersion>().unwrap(), SpecificationVersion::V3);
        assert!("V5".parse::<SpecificationVersion>().is_err());
    }

    #[test]
    fn test_default_is_v4() {
        assert_eq!(SpecificationVersion::default(), SpecificationVersion::V4);
        assert_eq!(InteractionPart::Request.native(), 0);
    }
}
