//! Measurement intent and normalization basis tags.

use crate::bundle::Column;
use crate::error::Error;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Quantity the intensity was divided by to produce a rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum NormBasis {
    /// Counts per monitor count.
    #[default]
    Monitor,
    /// Counts per second.
    Time,
    /// Values are already rates and are not Poisson distributed.
    None,
}

impl NormBasis {
    /// Tag as written in reduction files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Monitor => "monitor",
            Self::Time => "time",
            Self::None => "none",
        }
    }
}

impl fmt::Display for NormBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NormBasis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monitor" => Ok(Self::Monitor),
            "time" => Ok(Self::Time),
            "none" => Ok(Self::None),
            other => Err(Error::UnsupportedNormBasis(other.to_string())),
        }
    }
}

impl TryFrom<String> for NormBasis {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NormBasis> for String {
    fn from(value: NormBasis) -> Self {
        value.as_str().to_string()
    }
}

/// Scan type, which decides what "same configuration" means when merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum Intent {
    /// Specular reflectivity.
    #[default]
    Specular,
    /// Background with the detector offset above specular.
    BackgroundPlus,
    /// Background with the detector offset below specular.
    BackgroundMinus,
    /// Slit scan measuring direct beam intensity.
    Slit,
    /// Rocking curve moving the sample angle.
    RockSample,
    /// Rocking curve moving the detector angle.
    RockDetector,
    /// Rocking curve at constant Q.
    RockQ,
    /// Generic motor scan.
    Scan,
    /// Intent not recorded.
    Unspecified,
}

/// Slit scans only resolve wavelength and divergence.
const SLIT_KEYS: &[Column] = &[
    Column::AngularResolution,
    Column::WavelengthResolution,
    Column::Wavelength,
];

/// Detector angle before sample angle so sample-angle jitter keeps scan order.
const ROCK_DETECTOR_KEYS: &[Column] = &[
    Column::AngularResolution,
    Column::WavelengthResolution,
    Column::DetectorAngle,
    Column::SampleAngle,
    Column::Wavelength,
];

const REFLECTIVITY_KEYS: &[Column] = &[
    Column::AngularResolution,
    Column::WavelengthResolution,
    Column::SampleAngle,
    Column::DetectorAngle,
    Column::Wavelength,
];

impl Intent {
    /// Tag as written in reduction files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Specular => "specular",
            Self::BackgroundPlus => "background+",
            Self::BackgroundMinus => "background-",
            Self::Slit => "intensity",
            Self::RockSample => "rock sample",
            Self::RockDetector => "rock detector",
            Self::RockQ => "rock qx",
            Self::Scan => "scan",
            Self::Unspecified => "none",
        }
    }

    /// True for slit scans, where angles do not identify a configuration.
    #[must_use]
    pub fn is_slit(self) -> bool {
        self == Self::Slit
    }

    /// Sort keys bringing equivalent points together, last key primary.
    #[must_use]
    pub fn sort_keys(self) -> &'static [Column] {
        match self {
            Self::Slit => SLIT_KEYS,
            Self::RockDetector => ROCK_DETECTOR_KEYS,
            _ => REFLECTIVITY_KEYS,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let intent = match s {
            "specular" => Self::Specular,
            "background+" => Self::BackgroundPlus,
            "background-" => Self::BackgroundMinus,
            "intensity" | "slit" => Self::Slit,
            "rock sample" => Self::RockSample,
            "rock detector" => Self::RockDetector,
            "rock qx" => Self::RockQ,
            "scan" => Self::Scan,
            "none" => Self::Unspecified,
            other => return Err(Error::UnknownIntent(other.to_string())),
        };
        Ok(intent)
    }
}

impl TryFrom<String> for Intent {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Intent> for String {
    fn from(value: Intent) -> Self {
        value.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm_basis_parse() {
        assert_eq!("monitor".parse::<NormBasis>().unwrap(), NormBasis::Monitor);
        assert_eq!("time".parse::<NormBasis>().unwrap(), NormBasis::Time);
        assert_eq!("none".parse::<NormBasis>().unwrap(), NormBasis::None);
        assert_eq!(
            "power".parse::<NormBasis>(),
            Err(Error::UnsupportedNormBasis("power".to_string()))
        );
    }

    #[test]
    fn test_intent_round_trip_tags() {
        for intent in [
            Intent::Specular,
            Intent::BackgroundPlus,
            Intent::BackgroundMinus,
            Intent::Slit,
            Intent::RockSample,
            Intent::RockDetector,
            Intent::RockQ,
            Intent::Scan,
            Intent::Unspecified,
        ] {
            assert_eq!(intent.as_str().parse::<Intent>().unwrap(), intent);
        }
        assert!("sideways".parse::<Intent>().is_err());
    }

    #[test]
    fn test_sort_keys_table() {
        assert_eq!(Intent::Slit.sort_keys().len(), 3);
        assert_eq!(Intent::RockDetector.sort_keys()[2], Column::DetectorAngle);
        assert_eq!(Intent::Specular.sort_keys()[2], Column::SampleAngle);
        assert_eq!(Intent::BackgroundPlus.sort_keys(), Intent::Specular.sort_keys());
    }
}
