use serde::Serialize;

/// Which rule produced an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    PriceBreakout,
    PriceBreakdown,
    Surge,
    Plunge,
    Volatile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Important,
    Warning,
    Opportunity,
    Danger,
    Info,
}

impl AlertKind {
    pub fn level(&self) -> AlertLevel {
        match self {
            AlertKind::PriceBreakout => AlertLevel::Important,
            AlertKind::PriceBreakdown => AlertLevel::Warning,
            AlertKind::Surge => AlertLevel::Opportunity,
            AlertKind::Plunge => AlertLevel::Danger,
            AlertKind::Volatile => AlertLevel::Info,
        }
    }
}

/// One firing of one rule. Only `key` outlives the run, via the cooldown
/// store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEvent {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub level: AlertLevel,
    pub code: String,
    pub message: String,
    pub detail: String,
    pub key: String,

    /// Suggested next step, when the rule has one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}
