// src/common/response/types.rs

use chrono::NaiveDate;
use heapless::String;

use super::parse::parse_int;

/// Capacity for the firmware revision string (`BC660KGLAAR01A01`).
pub const FIRMWARE_CAPACITY: usize = 32;
/// Capacity for the raw `+CCLK` time string.
pub const CLOCK_TEXT_CAPACITY: usize = 40;

pub type FirmwareVersion = String<FIRMWARE_CAPACITY>;
pub type ClockText = String<CLOCK_TEXT_CAPACITY>;

/// Copies `text` into a fixed-capacity string, truncating at a char boundary.
pub(crate) fn truncated<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

// --- Signal quality (`+CSQ`) ---

/// Raw `+CSQ: <rssi>,<ber>` values.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SignalQuality {
    /// 0..=31, 99 = not known or not detectable.
    pub rssi_raw: u8,
    /// RXQUAL 0..=7, 99 = not known or not detectable.
    pub ber_raw: u8,
}

impl SignalQuality {
    /// Marker for "not known or not detectable".
    pub const NOT_DETECTABLE: u8 = 99;

    /// The unparsed value; also what a reply without fields yields.
    pub const UNKNOWN: SignalQuality = SignalQuality {
        rssi_raw: Self::NOT_DETECTABLE,
        ber_raw: Self::NOT_DETECTABLE,
    };

    /// Received signal strength: 0 = -113 dBm or less, 31 = -51 dBm or greater.
    pub fn rssi_dbm(&self) -> Option<i16> {
        if self.rssi_raw == Self::NOT_DETECTABLE {
            None
        } else {
            Some(-113 + i16::from(self.rssi_raw) * 2)
        }
    }

    pub fn ber(&self) -> Option<u8> {
        (self.ber_raw != Self::NOT_DETECTABLE).then_some(self.ber_raw)
    }
}

// --- Registration (`+CEREG`) ---

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RegistrationStatus {
    /// 0 - not registered, not searching.
    NotRegistered,
    /// 1 - registered, home network.
    RegisteredHome,
    /// 2 - not registered, searching.
    Searching,
    /// 3 - registration denied.
    Denied,
    /// 4 - unknown, e.g. out of E-UTRAN coverage.
    OutOfCoverage,
    /// 5 - registered, roaming.
    RegisteredRoaming,
    /// The reply carried no usable `<stat>`.
    Unknown,
}

impl RegistrationStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => RegistrationStatus::NotRegistered,
            1 => RegistrationStatus::RegisteredHome,
            2 => RegistrationStatus::Searching,
            3 => RegistrationStatus::Denied,
            4 => RegistrationStatus::OutOfCoverage,
            5 => RegistrationStatus::RegisteredRoaming,
            _ => RegistrationStatus::Unknown,
        }
    }

    /// The `<stat>` value; `Unknown` maps to 6, one past the defined range.
    pub fn code(&self) -> u8 {
        match self {
            RegistrationStatus::NotRegistered => 0,
            RegistrationStatus::RegisteredHome => 1,
            RegistrationStatus::Searching => 2,
            RegistrationStatus::Denied => 3,
            RegistrationStatus::OutOfCoverage => 4,
            RegistrationStatus::RegisteredRoaming => 5,
            RegistrationStatus::Unknown => 6,
        }
    }

    pub fn is_registered(&self) -> bool {
        matches!(self, RegistrationStatus::RegisteredHome | RegistrationStatus::RegisteredRoaming)
    }

    pub fn describe(&self) -> &'static str {
        match self {
            RegistrationStatus::NotRegistered => {
                "0 = Not registered, MT is not currently searching a new operator to register to"
            }
            RegistrationStatus::RegisteredHome => "1 = Registered, home network",
            RegistrationStatus::Searching => {
                "2 = Not registered, but MT is searching a new operator to register to"
            }
            RegistrationStatus::Denied => "3 = Registration denied",
            RegistrationStatus::OutOfCoverage => {
                "4 = Unknown. (for example, out GERAN/UTRAN/E-UTRAN coverage)"
            }
            RegistrationStatus::RegisteredRoaming => "5 = Registered, roaming",
            RegistrationStatus::Unknown => "ERROR",
        }
    }
}

// --- Network time (`+CCLK`) ---

/// Parsed `yy/MM/dd,hh:mm:ss±zz` network time.
///
/// The date and time are local; `zone_quarters` is the offset to GMT in quarters
/// of an hour (-96..=96).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ModemClock {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub zone_quarters: i16,
}

impl ModemClock {
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim().trim_matches('"');
        let (date, time) = text.split_once(',')?;

        let mut date_parts = date.split('/');
        let year = two_digits(date_parts.next()?)?;
        let month = two_digits(date_parts.next()?)?;
        let day = two_digits(date_parts.next()?)?;

        let zone_start = time.find(|c: char| c == '+' || c == '-')?;
        let (clock, zone) = time.split_at(zone_start);
        let mut clock_parts = clock.split(':');
        let hour = two_digits(clock_parts.next()?)?;
        let minute = two_digits(clock_parts.next()?)?;
        let second = two_digits(clock_parts.next()?)?;
        let zone_quarters = parse_int(zone)?;
        if !(-96..=96).contains(&zone_quarters) {
            return None;
        }

        let clock = ModemClock {
            year: 2000 + u16::from(year),
            month,
            day,
            hour,
            minute,
            second,
            zone_quarters: zone_quarters as i16,
        };
        // Rejects 13th months, 25th hours and the like.
        clock.epoch()?;
        Some(clock)
    }

    /// Seconds since 1970-01-01T00:00:00Z.
    pub fn epoch(&self) -> Option<i64> {
        let local = NaiveDate::from_ymd_opt(i32::from(self.year), u32::from(self.month), u32::from(self.day))?
            .and_hms_opt(u32::from(self.hour), u32::from(self.minute), u32::from(self.second))?;
        Some(local.and_utc().timestamp() - i64::from(self.zone_quarters) * 15 * 60)
    }

    pub fn timezone_minutes(&self) -> i16 {
        self.zone_quarters * 15
    }
}

fn two_digits(text: &str) -> Option<u8> {
    if text.len() != 2 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

// --- Engineering data ---

/// Serving-cell metrics plus firmware and clock, refreshed by `engineering_data()`.
///
/// Every refresh starts from all-`None`: a field the modem did not report stays
/// `None` instead of keeping a value from an earlier refresh.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct EngineeringSnapshot {
    /// Reference signal received power, dBm.
    pub rsrp: Option<i16>,
    /// Reference signal received quality, dB.
    pub rsrq: Option<i16>,
    /// Received signal strength indicator, dBm.
    pub rssi: Option<i16>,
    /// Signal to interference plus noise ratio, dB.
    pub sinr: Option<i16>,
    pub firmware_version: Option<FirmwareVersion>,
    /// Offset to GMT in quarters of an hour.
    pub timezone: Option<i16>,
    /// Network time as a Unix timestamp.
    pub epoch: Option<i64>,
}

impl EngineeringSnapshot {
    pub fn clear(&mut self) {
        *self = EngineeringSnapshot::default();
    }
}
