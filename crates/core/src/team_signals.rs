//! Team wellbeing aggregation with a k-anonymity floor.
//!
//! [`aggregate`] turns pre-loaded team signals into at most three short
//! manager-facing phrases, a representative mood color and a few hints. It is
//! a fixed-threshold classifier: no statistics beyond averages and counts.
//! Output is suppressed entirely unless at least [`K_ANONYMITY_FLOOR`]
//! members are on the team and have contributed signals in the period.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::signals::is_burnout_badge;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Minimum group size below which nothing is shown.
pub const K_ANONYMITY_FLOOR: usize = 5;

/// Maximum number of phrases returned.
pub const MAX_PHRASES: usize = 3;

/// Sessions shorter than this do not count as engagement.
pub const ENGAGEMENT_MIN_SECS: i32 = 60;

pub const POSITIVE_VALENCE: f64 = 0.3;
pub const NEGATIVE_VALENCE: f64 = -0.3;
pub const HIGH_AROUSAL: f64 = 0.4;
pub const LOW_AROUSAL: f64 = -0.4;

/// Burnout badges per responding member at which fatigue is flagged.
pub const BURNOUT_RATIO: f64 = 0.2;

/// Engagement sessions per responding member considered high.
pub const HIGH_ENGAGEMENT_PER_MEMBER: f64 = 3.0;
/// Engagement sessions per responding member considered low.
pub const LOW_ENGAGEMENT_PER_MEMBER: f64 = 1.0;

/// Below this magnitude on both axes the mood is treated as neutral.
const NEUTRAL_BAND: f64 = 0.15;

pub const COLOR_ENERGIZED: &str = "#F6C945";
pub const COLOR_CALM: &str = "#7BC8A4";
pub const COLOR_TENSE: &str = "#E8726A";
pub const COLOR_LOW: &str = "#7A8CC4";
pub const COLOR_NEUTRAL: &str = "#B8B8C8";

pub const PHRASE_FATIGUE: &str =
    "Several fatigue signals showed up this period; a workload check-in may help.";
pub const PHRASE_MOOD_POSITIVE: &str = "Overall mood leans positive.";
pub const PHRASE_MOOD_LOW: &str =
    "Overall mood is lower than usual; a supportive team moment could help.";
pub const PHRASE_MOOD_STEADY: &str = "Overall mood is steady.";
pub const PHRASE_TENSION: &str = "Energy is high alongside lower mood, a sign of tension.";
pub const PHRASE_ENERGY_HIGH: &str = "Energy levels are high.";
pub const PHRASE_ENERGY_LOW: &str = "Energy appears low; recovery time could help.";
pub const PHRASE_ENGAGEMENT_HIGH: &str = "Strong engagement with wellbeing activities.";
pub const PHRASE_ENGAGEMENT_LOW: &str = "Few wellbeing sessions were logged this period.";

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoodSample {
    pub user_id: DbId,
    pub valence: f64,
    pub arousal: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSample {
    pub user_id: DbId,
    pub duration_secs: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeSample {
    pub user_id: DbId,
    pub badge_code: String,
}

/// Everything recorded for one team inside one period.
#[derive(Debug, Clone, Default)]
pub struct TeamSignals {
    pub member_count: usize,
    pub moods: Vec<MoodSample>,
    pub sessions: Vec<SessionSample>,
    pub badges: Vec<BadgeSample>,
}

impl TeamSignals {
    /// Distinct members who contributed at least one signal.
    pub fn response_count(&self) -> usize {
        let mut users: HashSet<DbId> = HashSet::new();
        users.extend(self.moods.iter().map(|m| m.user_id));
        users.extend(self.sessions.iter().map(|s| s.user_id));
        users.extend(self.badges.iter().map(|b| b.user_id));
        users.len()
    }
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedFocus {
    Workload,
    Recovery,
    Recognition,
    Maintain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementLevel {
    High,
    Moderate,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateHints {
    pub suggested_focus: SuggestedFocus,
    pub engagement_level: EngagementLevel,
}

/// Aggregator output as returned to managers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamAggregate {
    pub can_show: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phrases: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hints: Option<AggregateHints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_mood: Option<String>,
    pub response_count: i32,
}

impl TeamAggregate {
    fn suppressed(response_count: usize) -> Self {
        Self {
            can_show: false,
            phrases: None,
            hints: None,
            color_mood: None,
            response_count: clamp_count(response_count),
        }
    }
}

fn clamp_count(n: usize) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Aggregate a team's signals into manager-facing output.
pub fn aggregate(signals: &TeamSignals) -> TeamAggregate {
    let response_count = signals.response_count();
    if signals.member_count < K_ANONYMITY_FLOOR || response_count < K_ANONYMITY_FLOOR {
        return TeamAggregate::suppressed(response_count);
    }

    let averages = average_affect(&signals.moods);
    let burnout_signals = signals
        .badges
        .iter()
        .filter(|b| is_burnout_badge(&b.badge_code))
        .count();
    let engagement_sessions = signals
        .sessions
        .iter()
        .filter(|s| s.duration_secs >= ENGAGEMENT_MIN_SECS)
        .count();

    let responders = response_count as f64;
    let fatigue = burnout_signals as f64 / responders >= BURNOUT_RATIO;
    let engagement_level = classify_engagement(engagement_sessions as f64 / responders);

    let mut phrases: Vec<&'static str> = Vec::with_capacity(4);
    if fatigue {
        phrases.push(PHRASE_FATIGUE);
    }
    if let Some((valence, arousal)) = averages {
        phrases.push(valence_phrase(valence));
        if let Some(phrase) = arousal_phrase(valence, arousal) {
            phrases.push(phrase);
        }
    }
    match engagement_level {
        EngagementLevel::High => phrases.push(PHRASE_ENGAGEMENT_HIGH),
        EngagementLevel::Low => phrases.push(PHRASE_ENGAGEMENT_LOW),
        EngagementLevel::Moderate => {}
    }
    phrases.truncate(MAX_PHRASES);

    let color = match averages {
        Some((valence, arousal)) => mood_color(valence, arousal),
        None => COLOR_NEUTRAL,
    };

    TeamAggregate {
        can_show: true,
        phrases: Some(phrases.into_iter().map(str::to_string).collect()),
        hints: Some(AggregateHints {
            suggested_focus: suggested_focus(fatigue, averages),
            engagement_level,
        }),
        color_mood: Some(color.to_string()),
        response_count: clamp_count(response_count),
    }
}

fn average_affect(moods: &[MoodSample]) -> Option<(f64, f64)> {
    if moods.is_empty() {
        return None;
    }
    let n = moods.len() as f64;
    let valence = moods.iter().map(|m| m.valence).sum::<f64>() / n;
    let arousal = moods.iter().map(|m| m.arousal).sum::<f64>() / n;
    Some((valence, arousal))
}

fn valence_phrase(valence: f64) -> &'static str {
    if valence >= POSITIVE_VALENCE {
        PHRASE_MOOD_POSITIVE
    } else if valence <= NEGATIVE_VALENCE {
        PHRASE_MOOD_LOW
    } else {
        PHRASE_MOOD_STEADY
    }
}

fn arousal_phrase(valence: f64, arousal: f64) -> Option<&'static str> {
    if arousal >= HIGH_AROUSAL {
        if valence < 0.0 {
            Some(PHRASE_TENSION)
        } else {
            Some(PHRASE_ENERGY_HIGH)
        }
    } else if arousal <= LOW_AROUSAL {
        Some(PHRASE_ENERGY_LOW)
    } else {
        None
    }
}

fn classify_engagement(per_member: f64) -> EngagementLevel {
    if per_member >= HIGH_ENGAGEMENT_PER_MEMBER {
        EngagementLevel::High
    } else if per_member < LOW_ENGAGEMENT_PER_MEMBER {
        EngagementLevel::Low
    } else {
        EngagementLevel::Moderate
    }
}

/// Pick a color from the valence/arousal quadrant.
pub fn mood_color(valence: f64, arousal: f64) -> &'static str {
    if valence.abs() < NEUTRAL_BAND && arousal.abs() < NEUTRAL_BAND {
        return COLOR_NEUTRAL;
    }
    match (valence >= 0.0, arousal >= 0.0) {
        (true, true) => COLOR_ENERGIZED,
        (true, false) => COLOR_CALM,
        (false, true) => COLOR_TENSE,
        (false, false) => COLOR_LOW,
    }
}

fn suggested_focus(fatigue: bool, averages: Option<(f64, f64)>) -> SuggestedFocus {
    if fatigue {
        return SuggestedFocus::Workload;
    }
    match averages {
        Some((valence, arousal)) if valence <= NEGATIVE_VALENCE || arousal <= LOW_AROUSAL => {
            SuggestedFocus::Recovery
        }
        Some((valence, _)) if valence >= POSITIVE_VALENCE => SuggestedFocus::Recognition,
        _ => SuggestedFocus::Maintain,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
