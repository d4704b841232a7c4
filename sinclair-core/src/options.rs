//! Enumerated select options and their persisted indices
//!
//! Each option set is a closed, ordered list of labels. The position of a
//! label in its list is the index written to flash, so the order of the
//! variants below is part of the persistence layout and must not change
//! within a layout version (see [`crate::config::preferences`]).

use sinclair_hal::StorageKey;

/// A closed, ordered set of select options
pub trait OptionSet: Copy + PartialEq + 'static {
    /// Every member, in persisted index order
    const ALL: &'static [Self];
    /// Labels shown to the user, parallel to `ALL`
    const LABELS: &'static [&'static str];
    /// Member used when a lookup misses
    const DEFAULT: Self;
    /// Runtime tag for this set
    const KIND: OptionKind;

    /// Persisted index of this member
    fn index(self) -> u8;

    /// Label of this member
    fn label(self) -> &'static str {
        Self::LABELS[self.index() as usize]
    }

    /// Member at `index`, if in range
    fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Member at `index`, or the default when out of range
    fn from_index_or_default(index: u8) -> Self {
        Self::from_index(index).unwrap_or(Self::DEFAULT)
    }

    /// Member with exactly this label
    fn from_label(label: &str) -> Option<Self> {
        Self::LABELS
            .iter()
            .position(|&l| l == label)
            .and_then(|i| Self::ALL.get(i).copied())
    }
}

macro_rules! option_set {
    (
        $(#[$meta:meta])*
        pub enum $name:ident: $kind:ident, default $default:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[repr(u8)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl OptionSet for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];
            const LABELS: &'static [&'static str] = &[$($label),+];
            const DEFAULT: Self = Self::$default;
            const KIND: OptionKind = OptionKind::$kind;

            fn index(self) -> u8 {
                self as u8
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }
    };
}

option_set! {
    /// What the unit's front panel shows
    pub enum DisplayMode: Display, default Auto {
        Off => "0 - OFF",
        Auto => "1 - Auto",
        SetTemperature => "2 - Set temperature",
        ActualTemperature => "3 - Actual temperature",
        OutsideTemperature => "4 - Outside temperature",
    }
}

option_set! {
    /// Temperature unit on the front panel
    pub enum DisplayUnit: DisplayUnit, default Celsius {
        Celsius => "C",
        Fahrenheit => "F",
    }
}

option_set! {
    /// Vertical louver position
    pub enum VerticalSwing: VerticalSwing, default ConstantMiddle {
        Off => "00 - OFF",
        SwingFull => "01 - Swing - Full",
        SwingDown => "02 - Swing - Down",
        SwingMidDown => "03 - Swing - Mid-Down",
        SwingMiddle => "04 - Swing - Middle",
        SwingMidUp => "05 - Swing - Mid-Up",
        SwingUp => "06 - Swing - Up",
        ConstantDown => "07 - Constant - Down",
        ConstantMidDown => "08 - Constant - Mid-Down",
        ConstantMiddle => "09 - Constant - Middle",
        ConstantMidUp => "10 - Constant - Mid-Up",
        ConstantUp => "11 - Constant - Up",
    }
}

option_set! {
    /// Horizontal louver position
    pub enum HorizontalSwing: HorizontalSwing, default ConstantMiddle {
        Off => "0 - OFF",
        SwingFull => "1 - Swing - Full",
        ConstantLeft => "2 - Constant - Left",
        ConstantMidLeft => "3 - Constant - Mid-Left",
        ConstantMiddle => "4 - Constant - Middle",
        ConstantMidRight => "5 - Constant - Mid-Right",
        ConstantRight => "6 - Constant - Right",
    }
}

option_set! {
    /// Which sensor drives the published current temperature
    pub enum TemperatureSource: TemperatureSource, default AcOwn {
        /// The unit's own return-air sensor
        AcOwn => "AC Own Sensor",
        /// The configured wireless thermometer
        External => "External ATC Sensor",
        /// Wireless thermometer timed out; unit sensor in charge until it
        /// reports again
        AtcFail => "ATC Fail",
    }
}

/// Number of temperature-source entries in the legacy layout
pub const LEGACY_TEMPERATURE_SOURCE_COUNT: u8 = 2;

/// Runtime tag for an option set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OptionKind {
    Display,
    DisplayUnit,
    VerticalSwing,
    HorizontalSwing,
    TemperatureSource,
}

impl OptionKind {
    /// Every option set
    pub const ALL: [OptionKind; 5] = [
        OptionKind::Display,
        OptionKind::DisplayUnit,
        OptionKind::VerticalSwing,
        OptionKind::HorizontalSwing,
        OptionKind::TemperatureSource,
    ];

    /// Labels of this set in index order
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            OptionKind::Display => DisplayMode::LABELS,
            OptionKind::DisplayUnit => DisplayUnit::LABELS,
            OptionKind::VerticalSwing => VerticalSwing::LABELS,
            OptionKind::HorizontalSwing => HorizontalSwing::LABELS,
            OptionKind::TemperatureSource => TemperatureSource::LABELS,
        }
    }

    /// Index substituted when a lookup misses
    pub fn default_index(self) -> u8 {
        match self {
            OptionKind::Display => DisplayMode::DEFAULT.index(),
            OptionKind::DisplayUnit => DisplayUnit::DEFAULT.index(),
            OptionKind::VerticalSwing => VerticalSwing::DEFAULT.index(),
            OptionKind::HorizontalSwing => HorizontalSwing::DEFAULT.index(),
            OptionKind::TemperatureSource => TemperatureSource::DEFAULT.index(),
        }
    }

    /// Index of `value`, or the default index if it is not a member
    pub fn index_of(self, value: &str) -> u8 {
        self.labels()
            .iter()
            .position(|&label| label == value)
            .map(|i| i as u8)
            .unwrap_or_else(|| self.default_index())
    }

    /// Label at `index`, or the default label if out of range
    pub fn value_of(self, index: u8) -> &'static str {
        let labels = self.labels();
        match labels.get(index as usize) {
            Some(&label) => label,
            None => labels[self.default_index() as usize],
        }
    }

    /// Number of members
    pub fn len(self) -> u8 {
        self.labels().len() as u8
    }

    /// Key the selected index is persisted under
    pub fn storage_key(self) -> StorageKey {
        match self {
            OptionKind::Display => StorageKey::Display,
            OptionKind::DisplayUnit => StorageKey::DisplayUnit,
            OptionKind::VerticalSwing => StorageKey::VerticalSwing,
            OptionKind::HorizontalSwing => StorageKey::HorizontalSwing,
            OptionKind::TemperatureSource => StorageKey::TemperatureSource,
        }
    }
}

/// Auxiliary on/off functions of the unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SwitchKind {
    /// Ionizer
    Plasma,
    Beeper,
    Sleep,
    /// Coil drying after cooling
    XFan,
    /// Energy save
    Save,
}

impl SwitchKind {
    pub const ALL: [SwitchKind; 5] = [
        SwitchKind::Plasma,
        SwitchKind::Beeper,
        SwitchKind::Sleep,
        SwitchKind::XFan,
        SwitchKind::Save,
    ];

    /// Position in [`SwitchKind::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Key the switch state is persisted under
    pub fn storage_key(self) -> StorageKey {
        match self {
            SwitchKind::Plasma => StorageKey::Plasma,
            SwitchKind::Beeper => StorageKey::Beeper,
            SwitchKind::Sleep => StorageKey::Sleep,
            SwitchKind::XFan => StorageKey::XFan,
            SwitchKind::Save => StorageKey::Save,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_label_gives_default_index() {
        assert_eq!(OptionKind::Display.index_of("not-a-real-option"), 1);
        assert_eq!(OptionKind::DisplayUnit.index_of(""), 0);
        assert_eq!(OptionKind::VerticalSwing.index_of("Middle"), 9);
        assert_eq!(OptionKind::HorizontalSwing.index_of("middle"), 4);
        assert_eq!(OptionKind::TemperatureSource.index_of("ATC"), 0);
    }

    #[test]
    fn test_out_of_range_index_gives_default_value() {
        assert_eq!(OptionKind::Display.value_of(255), "1 - Auto");
        assert_eq!(OptionKind::DisplayUnit.value_of(2), "C");
        assert_eq!(OptionKind::VerticalSwing.value_of(12), "09 - Constant - Middle");
        assert_eq!(OptionKind::HorizontalSwing.value_of(7), "4 - Constant - Middle");
        assert_eq!(OptionKind::TemperatureSource.value_of(3), "AC Own Sensor");
    }

    #[test]
    fn test_round_trip_every_member() {
        for kind in OptionKind::ALL {
            for (i, &label) in kind.labels().iter().enumerate() {
                assert_eq!(kind.index_of(label), i as u8);
                assert_eq!(kind.value_of(kind.index_of(label)), label);
            }
        }
    }

    #[test]
    fn test_set_sizes() {
        assert_eq!(OptionKind::Display.len(), 5);
        assert_eq!(OptionKind::DisplayUnit.len(), 2);
        assert_eq!(OptionKind::VerticalSwing.len(), 12);
        assert_eq!(OptionKind::HorizontalSwing.len(), 7);
        assert_eq!(OptionKind::TemperatureSource.len(), 3);
    }

    #[test]
    fn test_typed_sets_agree_with_kind() {
        assert_eq!(VerticalSwing::DEFAULT, VerticalSwing::ConstantMiddle);
        assert_eq!(VerticalSwing::ConstantMiddle.index(), 9);
        assert_eq!(
            VerticalSwing::KIND.value_of(VerticalSwing::SwingUp.index()),
            VerticalSwing::SwingUp.label()
        );
        assert_eq!(
            TemperatureSource::from_label("ATC Fail"),
            Some(TemperatureSource::AtcFail)
        );
        assert_eq!(DisplayMode::from_label("Auto"), None);
        assert_eq!(
            HorizontalSwing::from_index_or_default(200),
            HorizontalSwing::ConstantMiddle
        );
        assert_eq!(DisplayUnit::from_index(1), Some(DisplayUnit::Fahrenheit));
    }

    #[test]
    fn test_storage_keys_are_distinct() {
        for (i, a) in OptionKind::ALL.iter().enumerate() {
            for b in &OptionKind::ALL[i + 1..] {
                assert_ne!(a.storage_key(), b.storage_key());
            }
        }
    }

    #[test]
    fn test_switch_indices_follow_all() {
        for (i, kind) in SwitchKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert_eq!(SwitchKind::Save.storage_key(), StorageKey::Save);
    }
}
