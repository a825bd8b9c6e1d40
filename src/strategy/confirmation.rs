use crate::model::candle::Candle;

/// Extra entry confirmations a strategy may list. None of them has a rule
/// yet; each passes through so the list can grow without changing callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    SupportResistanceBreak,
    VolumeConfirmation,
}

impl Confirmation {
    pub fn confirms(&self, _recent: &[Candle]) -> bool {
        match self {
            Confirmation::SupportResistanceBreak => true,
            Confirmation::VolumeConfirmation => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confirmation::SupportResistanceBreak => "support_resistance_break",
            Confirmation::VolumeConfirmation => "volume_confirmation",
        }
    }
}

/// Exit rules beyond the regime-change exit. Unimplemented slots never fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitSlot {
    TrailingStop,
    EmaCrossDown,
}

impl ExitSlot {
    pub fn fires(&self, _recent: &[Candle]) -> bool {
        match self {
            ExitSlot::TrailingStop => false,
            ExitSlot::EmaCrossDown => false,
        }
    }
}
