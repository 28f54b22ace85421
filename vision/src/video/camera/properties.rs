//! Named device properties and their discovered ranges.

use crate::common::constants::properties::{RANGE_MAX, RANGE_MIDPOINT, RANGE_MIN};
use opencv::videoio::{
    CAP_PROP_AUTO_EXPOSURE, CAP_PROP_AUTOFOCUS, CAP_PROP_BRIGHTNESS, CAP_PROP_CONTRAST,
    CAP_PROP_EXPOSURE, CAP_PROP_FOCUS, CAP_PROP_SATURATION, CAP_PROP_SHARPNESS,
};
use std::fmt;
use std::str::FromStr;

/// The fixed set of adjustable device properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyId {
    Brightness,
    Contrast,
    Saturation,
    Sharpness,
    Exposure,
    AutoExposure,
    Focus,
    AutoFocus,
}

impl PropertyId {
    /// Every property, in mailbox/report order
    pub const ALL: [PropertyId; 8] = [
        PropertyId::Brightness,
        PropertyId::Contrast,
        PropertyId::Saturation,
        PropertyId::Sharpness,
        PropertyId::Exposure,
        PropertyId::AutoExposure,
        PropertyId::Focus,
        PropertyId::AutoFocus,
    ];

    /// OpenCV `CAP_PROP_*` identifier
    pub fn cap_prop(self) -> i32 {
        match self {
            PropertyId::Brightness => CAP_PROP_BRIGHTNESS,
            PropertyId::Contrast => CAP_PROP_CONTRAST,
            PropertyId::Saturation => CAP_PROP_SATURATION,
            PropertyId::Sharpness => CAP_PROP_SHARPNESS,
            PropertyId::Exposure => CAP_PROP_EXPOSURE,
            PropertyId::AutoExposure => CAP_PROP_AUTO_EXPOSURE,
            PropertyId::Focus => CAP_PROP_FOCUS,
            PropertyId::AutoFocus => CAP_PROP_AUTOFOCUS,
        }
    }

    /// Position in [`PropertyId::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PropertyId::Brightness => "brightness",
            PropertyId::Contrast => "contrast",
            PropertyId::Saturation => "saturation",
            PropertyId::Sharpness => "sharpness",
            PropertyId::Exposure => "exposure",
            PropertyId::AutoExposure => "autoexposure",
            PropertyId::Focus => "focus",
            PropertyId::AutoFocus => "autofocus",
        }
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();

        PropertyId::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| format!("Unknown property: '{}'", s))
    }
}

/// `{min, max, current}` for one device property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyRange {
    pub min: i32,
    pub max: i32,
    pub current: i32,
}

impl PropertyRange {
    /// Range seeded from a raw device reading.
    ///
    /// Devices report 0 both for "unset" and "off", so an exact zero is
    /// replaced by the midpoint of the default range.
    pub fn from_reading(raw: f64) -> Self {
        let current = if raw == 0.0 || !raw.is_finite() {
            RANGE_MIDPOINT
        } else {
            raw.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
        };

        PropertyRange {
            min: RANGE_MIN,
            max: RANGE_MAX,
            current,
        }
    }
}

impl Default for PropertyRange {
    fn default() -> Self {
        PropertyRange {
            min: RANGE_MIN,
            max: RANGE_MAX,
            current: RANGE_MIDPOINT,
        }
    }
}

/// Which of the eight properties the open device supports, indexed like [`PropertyId::ALL`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SupportedProperties([bool; 8]);

impl SupportedProperties {
    pub fn set(&mut self, property: PropertyId, supported: bool) {
        self.0[property.index()] = supported;
    }

    pub fn contains(&self, property: PropertyId) -> bool {
        self.0[property.index()]
    }

    /// Supported properties in report order
    pub fn iter(&self) -> impl Iterator<Item = PropertyId> + '_ {
        PropertyId::ALL.into_iter().filter(|p| self.contains(*p))
    }

    pub fn count(&self) -> usize {
        self.0.iter().filter(|s| **s).count()
    }
}

/// Current range of every property, indexed like [`PropertyId::ALL`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PropertyRanges([PropertyRange; 8]);

impl PropertyRanges {
    pub fn get(&self, property: PropertyId) -> PropertyRange {
        self.0[property.index()]
    }

    pub fn set(&mut self, property: PropertyId, range: PropertyRange) {
        self.0[property.index()] = range;
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, PropertyRange)> + '_ {
        PropertyId::ALL.into_iter().map(|p| (p, self.get(p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_indices_match_positions() {
        for (i, property) in PropertyId::ALL.iter().enumerate() {
            assert_eq!(property.index(), i);
        }
    }

    #[test]
    fn test_parse_property_names() {
        assert_eq!("Brightness".parse::<PropertyId>(), Ok(PropertyId::Brightness));
        assert_eq!("auto_exposure".parse::<PropertyId>(), Ok(PropertyId::AutoExposure));
        assert_eq!("auto-focus".parse::<PropertyId>(), Ok(PropertyId::AutoFocus));
        assert!("gain".parse::<PropertyId>().is_err());
    }

    #[test]
    fn test_range_from_zero_reading_uses_midpoint() {
        let range = PropertyRange::from_reading(0.0);
        assert_eq!(range, PropertyRange { min: 0, max: 255, current: 126 });
    }

    #[test]
    fn test_range_from_reading_keeps_value() {
        assert_eq!(PropertyRange::from_reading(200.0).current, 200);
        assert_eq!(PropertyRange::from_reading(-3.0).current, -3);
        assert_eq!(PropertyRange::from_reading(f64::NAN).current, 126);
    }

    #[test]
    fn test_supported_properties() {
        let mut supported = SupportedProperties::default();
        supported.set(PropertyId::Focus, true);
        supported.set(PropertyId::Brightness, true);

        assert!(supported.contains(PropertyId::Focus));
        assert!(!supported.contains(PropertyId::Contrast));
        assert_eq!(supported.count(), 2);
        assert_eq!(
            supported.iter().collect::<Vec<_>>(),
            vec![PropertyId::Brightness, PropertyId::Focus]
        );
    }
}
