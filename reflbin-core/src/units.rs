//! Unit conversion for sample environment fields.
//!
//! Only the handful of quantities logged by sample environment equipment
//! are known. Identical unit strings always convert, even when unknown.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Dimension {
    Temperature,
    MagneticField,
    Time,
    Length,
    Angle,
}

/// Affine map onto the base unit of a dimension: `base = value * scale + offset`.
#[derive(Clone, Copy, Debug)]
struct Unit {
    dimension: Dimension,
    scale: f64,
    offset: f64,
}

impl Unit {
    const fn linear(dimension: Dimension, scale: f64) -> Self {
        Self {
            dimension,
            scale,
            offset: 0.0,
        }
    }

    fn lookup(name: &str) -> Option<Self> {
        use Dimension::{Angle, Length, MagneticField, Temperature, Time};
        let unit = match name.trim() {
            "K" | "kelvin" => Self::linear(Temperature, 1.0),
            "C" | "degC" | "°C" | "celsius" => Self {
                dimension: Temperature,
                scale: 1.0,
                offset: 273.15,
            },
            "F" | "degF" | "°F" | "fahrenheit" => Self {
                dimension: Temperature,
                scale: 5.0 / 9.0,
                offset: 273.15 - 32.0 * 5.0 / 9.0,
            },
            "T" | "tesla" => Self::linear(MagneticField, 1.0),
            "mT" => Self::linear(MagneticField, 1e-3),
            "G" | "gauss" => Self::linear(MagneticField, 1e-4),
            "kG" => Self::linear(MagneticField, 1e-1),
            "s" | "second" | "seconds" => Self::linear(Time, 1.0),
            "ms" => Self::linear(Time, 1e-3),
            "min" | "minute" | "minutes" => Self::linear(Time, 60.0),
            "h" | "hour" | "hours" => Self::linear(Time, 3600.0),
            "m" | "metre" | "meter" => Self::linear(Length, 1.0),
            "cm" => Self::linear(Length, 1e-2),
            "mm" => Self::linear(Length, 1e-3),
            "um" | "µm" => Self::linear(Length, 1e-6),
            "nm" => Self::linear(Length, 1e-9),
            "Ang" | "A" | "Å" | "angstrom" => Self::linear(Length, 1e-10),
            "degree" | "degrees" | "deg" | "°" => Self::linear(Angle, 1.0_f64.to_radians()),
            "rad" | "radian" | "radians" => Self::linear(Angle, 1.0),
            _ => return None,
        };
        Some(unit)
    }
}

/// Converts `values` from unit `from` into unit `to`.
///
/// Returns `None` if either unit is unknown or the units measure different
/// quantities.
#[must_use]
pub fn convert(values: &[f64], from: &str, to: &str) -> Option<Vec<f64>> {
    if from == to {
        return Some(values.to_vec());
    }
    let (src, dst) = (Unit::lookup(from)?, Unit::lookup(to)?);
    if src.dimension != dst.dimension {
        return None;
    }
    Some(
        values
            .iter()
            .map(|&value| (value * src.scale + src.offset - dst.offset) / dst.scale)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_same_units_pass_through() {
        assert_eq!(convert(&[1.0, 2.0], "furlong", "furlong").unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_temperature_offsets() {
        let kelvin = convert(&[0.0, 100.0], "degC", "K").unwrap();
        assert_relative_eq!(kelvin[0], 273.15);
        assert_relative_eq!(kelvin[1], 373.15);
        let celsius = convert(&[212.0], "F", "C").unwrap();
        assert_relative_eq!(celsius[0], 100.0, max_relative = 1e-12);
    }

    #[test]
    fn test_field_scaling() {
        let tesla = convert(&[5.0], "kG", "T").unwrap();
        assert_relative_eq!(tesla[0], 0.5);
    }

    #[test]
    fn test_incompatible_units() {
        assert!(convert(&[1.0], "K", "T").is_none());
        assert!(convert(&[1.0], "K", "parsec").is_none());
    }
}
