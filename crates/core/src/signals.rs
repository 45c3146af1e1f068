//! Validation rules for raw wellbeing signals (mood entries, module
//! sessions, badge awards) that feed team aggregation.

use crate::error::CoreError;

/// Lower bound for valence and arousal.
pub const AFFECT_MIN: f64 = -1.0;
/// Upper bound for valence and arousal.
pub const AFFECT_MAX: f64 = 1.0;

/// Maximum length of a free-text mood note.
pub const MAX_NOTE_LENGTH: usize = 500;

/// Longest session accepted (one day).
pub const MAX_SESSION_SECS: i32 = 86_400;

/// Maximum length of a badge code.
pub const MAX_BADGE_CODE_LENGTH: usize = 64;

/// Badge codes that indicate fatigue or overload.
pub const BADGE_BURNOUT_RISK: &str = "burnout_risk";
pub const BADGE_LATE_NIGHT_STREAK: &str = "late_night_streak";
pub const BADGE_OVERLOAD_WARNING: &str = "overload_warning";

pub const BURNOUT_BADGES: &[&str] = &[
    BADGE_BURNOUT_RISK,
    BADGE_LATE_NIGHT_STREAK,
    BADGE_OVERLOAD_WARNING,
];

pub fn is_burnout_badge(code: &str) -> bool {
    BURNOUT_BADGES.contains(&code)
}

fn validate_affect(field: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || !(AFFECT_MIN..=AFFECT_MAX).contains(&value) {
        return Err(CoreError::Validation(format!(
            "{field} must be between {AFFECT_MIN} and {AFFECT_MAX}, got {value}"
        )));
    }
    Ok(())
}

/// Validate a mood entry's valence, arousal and optional note.
pub fn validate_mood(valence: f64, arousal: f64, note: Option<&str>) -> Result<(), CoreError> {
    validate_affect("valence", valence)?;
    validate_affect("arousal", arousal)?;
    if let Some(note) = note {
        if note.chars().count() > MAX_NOTE_LENGTH {
            return Err(CoreError::Validation(format!(
                "Note must be at most {MAX_NOTE_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

pub fn validate_session_duration(duration_secs: i32) -> Result<(), CoreError> {
    if duration_secs <= 0 || duration_secs > MAX_SESSION_SECS {
        return Err(CoreError::Validation(format!(
            "Session duration must be between 1 and {MAX_SESSION_SECS} seconds"
        )));
    }
    Ok(())
}

pub fn validate_badge_code(code: &str) -> Result<(), CoreError> {
    if code.trim().is_empty() || code.len() > MAX_BADGE_CODE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Badge code must be 1-{MAX_BADGE_CODE_LENGTH} characters"
        )));
    }
    Ok(())
}
