// src/common/sleep.rs

/// Sleep configuration of the modem as set with `AT+QSCLK`.
///
/// `Unknown` is the state before the first `AT+QSCLK?` query succeeded. While the
/// mode is not `Disabled` the modem may be asleep and has to be woken before it
/// answers.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum SleepMode {
    #[default]
    Unknown,
    /// `AT+QSCLK=0`
    Disabled,
    /// `AT+QSCLK=1`
    DeepAndLightSleep,
    /// `AT+QSCLK=2`
    LightSleepOnly,
}

impl SleepMode {
    /// Maps a `+QSCLK: <n>` value. Anything outside 0..=2 is `None`.
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(SleepMode::Disabled),
            1 => Some(SleepMode::DeepAndLightSleep),
            2 => Some(SleepMode::LightSleepOnly),
            _ => None,
        }
    }

    /// The `AT+QSCLK=<n>` argument; `Unknown` has none.
    pub const fn code(&self) -> Option<u8> {
        match self {
            SleepMode::Unknown => None,
            SleepMode::Disabled => Some(0),
            SleepMode::DeepAndLightSleep => Some(1),
            SleepMode::LightSleepOnly => Some(2),
        }
    }

    #[inline]
    pub const fn is_known(&self) -> bool {
        !matches!(self, SleepMode::Unknown)
    }

    /// Whether a wake step is required before a command is guaranteed an answer.
    #[inline]
    pub const fn needs_wake(&self) -> bool {
        !matches!(self, SleepMode::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_both_ways() {
        for mode in [SleepMode::Disabled, SleepMode::DeepAndLightSleep, SleepMode::LightSleepOnly] {
            let code = mode.code().unwrap();
            assert_eq!(SleepMode::from_code(code as i32), Some(mode));
        }
        assert_eq!(SleepMode::from_code(3), None);
        assert_eq!(SleepMode::Unknown.code(), None);
    }

    #[test]
    fn only_disabled_skips_wake() {
        assert!(!SleepMode::Disabled.needs_wake());
        assert!(SleepMode::Unknown.needs_wake());
        assert!(SleepMode::LightSleepOnly.needs_wake());
        assert!(SleepMode::DeepAndLightSleep.needs_wake());
        assert!(!SleepMode::default().is_known());
    }
}
