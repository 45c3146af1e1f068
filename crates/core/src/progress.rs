//! Per-module gamification progress: XP, level, unlocked items, metadata.
//!
//! [`ModuleProgress`] is the local mirror a client mutates optimistically.
//! [`ProgressUpdate`] is the coalesced change set that gets persisted; it is
//! applied to the stored row with [`ModuleProgress::apply`], which is the same
//! merge the database performs in SQL.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Experience points needed per level.
pub const XP_PER_LEVEL: i64 = 500;

/// Upper bound on `total_xp`. The resulting level still fits in an `i32`.
pub const MAX_TOTAL_XP: i64 = 1_000_000_000_000;

/// Maximum length of a module name.
pub const MAX_MODULE_NAME_LENGTH: usize = 64;

/// Maximum length of an unlockable item id.
pub const MAX_ITEM_ID_LENGTH: usize = 128;

/// Maximum length of a metadata key.
pub const MAX_METADATA_KEY_LENGTH: usize = 100;

/// Maximum number of metadata keys kept per module.
pub const MAX_METADATA_KEYS: usize = 100;

/// Well-known module names. Other names matching the name pattern are allowed.
pub const MODULE_JOURNAL: &str = "journal";
pub const MODULE_MEDITATION: &str = "meditation";
pub const MODULE_BREATHWORK: &str = "breathwork";
pub const MODULE_MUSIC: &str = "music";
pub const MODULE_CARDS: &str = "weekly_cards";

static MODULE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9][a-z0-9_-]*$").expect("valid regex"));

/// Level for a given XP total: `floor(total_xp / 500) + 1`.
///
/// Negative totals are clamped to zero so the level never drops below 1.
pub fn level_for_xp(total_xp: i64) -> i32 {
    let levels = total_xp.max(0) / XP_PER_LEVEL;
    i32::try_from(levels).unwrap_or(i32::MAX - 1) + 1
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a module name (lowercase ascii, digits, `_`, `-`).
pub fn validate_module_name(name: &str) -> Result<(), CoreError> {
    if name.is_empty() || name.len() > MAX_MODULE_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Module name must be 1-{MAX_MODULE_NAME_LENGTH} characters"
        )));
    }
    if !MODULE_NAME_RE.is_match(name) {
        return Err(CoreError::Validation(format!(
            "Invalid module name '{name}'. Use lowercase letters, digits, '_' or '-'"
        )));
    }
    Ok(())
}

/// Validate an unlockable item id.
pub fn validate_item_id(item_id: &str) -> Result<(), CoreError> {
    if item_id.trim().is_empty() {
        return Err(CoreError::Validation(
            "Item id must be a non-empty string".to_string(),
        ));
    }
    if item_id.len() > MAX_ITEM_ID_LENGTH {
        return Err(CoreError::Validation(format!(
            "Item id must be at most {MAX_ITEM_ID_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a metadata key.
pub fn validate_metadata_key(key: &str) -> Result<(), CoreError> {
    if key.trim().is_empty() || key.len() > MAX_METADATA_KEY_LENGTH {
        return Err(CoreError::Validation(format!(
            "Metadata key must be 1-{MAX_METADATA_KEY_LENGTH} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ModuleProgress
// ---------------------------------------------------------------------------

/// Progress for one user in one module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleProgress {
    pub module_name: String,
    pub level: i32,
    pub total_xp: i64,
    pub unlocked_items: BTreeSet<String>,
    pub metadata: Map<String, Value>,
}

/// Outcome of [`ModuleProgress::add_experience`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperienceGain {
    pub previous_level: i32,
    pub level: i32,
    pub total_xp: i64,
    /// Whether the optional item was newly unlocked by this call.
    pub item_unlocked: bool,
}

impl ExperienceGain {
    pub fn leveled_up(&self) -> bool {
        self.level > self.previous_level
    }
}

impl ModuleProgress {
    /// Fresh progress at level 1 with nothing unlocked.
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            level: 1,
            total_xp: 0,
            unlocked_items: BTreeSet::new(),
            metadata: Map::new(),
        }
    }

    /// Recompute `level` from `total_xp`. Stored levels are only a cache.
    pub fn normalized(mut self) -> Self {
        self.total_xp = self.total_xp.clamp(0, MAX_TOTAL_XP);
        self.level = level_for_xp(self.total_xp);
        self
    }

    /// Add experience and optionally unlock an item in the same step.
    pub fn add_experience(
        &mut self,
        amount: i64,
        unlock_item_id: Option<&str>,
    ) -> Result<ExperienceGain, CoreError> {
        if amount <= 0 {
            return Err(CoreError::Validation(format!(
                "Experience amount must be positive, got {amount}"
            )));
        }
        if amount > MAX_TOTAL_XP - self.total_xp {
            return Err(CoreError::Validation(format!(
                "Experience total is capped at {MAX_TOTAL_XP}"
            )));
        }
        if let Some(item_id) = unlock_item_id {
            validate_item_id(item_id)?;
        }

        let previous_level = self.level;
        self.total_xp += amount;
        self.level = level_for_xp(self.total_xp);
        let item_unlocked = match unlock_item_id {
            Some(item_id) => self.unlocked_items.insert(item_id.to_string()),
            None => false,
        };

        Ok(ExperienceGain {
            previous_level,
            level: self.level,
            total_xp: self.total_xp,
            item_unlocked,
        })
    }

    /// Unlock an item. Returns `false` when it was already unlocked.
    pub fn unlock_item(&mut self, item_id: &str) -> Result<bool, CoreError> {
        validate_item_id(item_id)?;
        Ok(self.unlocked_items.insert(item_id.to_string()))
    }

    /// Set one metadata key, replacing any previous value.
    pub fn set_metadata(&mut self, key: &str, value: Value) -> Result<(), CoreError> {
        validate_metadata_key(key)?;
        if !self.metadata.contains_key(key) && self.metadata.len() >= MAX_METADATA_KEYS {
            return Err(CoreError::Validation(format!(
                "Metadata is limited to {MAX_METADATA_KEYS} keys"
            )));
        }
        self.metadata.insert(key.to_string(), value);
        Ok(())
    }

    /// Merge a persisted update into this (stored) progress.
    ///
    /// - `total_xp` becomes `max(stored + xp_delta, sent total_xp)`, capped
    ///   at [`MAX_TOTAL_XP`]
    /// - `level` is recomputed, never copied
    /// - `unlocked_items` is the union
    /// - `metadata` is merged per key, sent keys win; new keys are only added
    ///   when the merged map stays within [`MAX_METADATA_KEYS`]
    pub fn apply(&mut self, update: &ProgressUpdate) {
        let incremented = self.total_xp.saturating_add(update.xp_delta.max(0));
        let total = match update.total_xp {
            Some(sent) => incremented.max(sent),
            None => incremented,
        };
        self.total_xp = total.min(MAX_TOTAL_XP);
        self.level = level_for_xp(self.total_xp);

        if let Some(items) = &update.unlocked_items {
            self.unlocked_items.extend(items.iter().cloned());
        }
        if let Some(metadata) = &update.metadata {
            let new_keys = metadata
                .keys()
                .filter(|k| !self.metadata.contains_key(*k))
                .count();
            let room = self.metadata.len() + new_keys <= MAX_METADATA_KEYS;
            for (key, value) in metadata {
                if room || self.metadata.contains_key(key) {
                    self.metadata.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// ProgressUpdate
// ---------------------------------------------------------------------------

/// A coalesced set of changed fields waiting to be persisted.
///
/// Snapshot fields (`total_xp`, `level`, `unlocked_items`, `metadata`) follow
/// last-writer-wins when merged. `xp_delta` accumulates so the store can apply
/// the increment atomically.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_xp: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<i32>,
    #[serde(default)]
    pub xp_delta: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_items: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl ProgressUpdate {
    /// Fields written by an experience gain.
    pub fn experience(progress: &ModuleProgress, amount: i64) -> Self {
        Self {
            total_xp: Some(progress.total_xp),
            level: Some(progress.level),
            xp_delta: amount,
            unlocked_items: Some(progress.unlocked_items.iter().cloned().collect()),
            metadata: None,
        }
    }

    /// Fields written by an unlock.
    pub fn unlocks(progress: &ModuleProgress) -> Self {
        Self {
            unlocked_items: Some(progress.unlocked_items.iter().cloned().collect()),
            ..Self::default()
        }
    }

    /// Fields written by a metadata change.
    pub fn metadata(progress: &ModuleProgress) -> Self {
        Self {
            metadata: Some(progress.metadata.clone()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_xp.is_none()
            && self.level.is_none()
            && self.xp_delta == 0
            && self.unlocked_items.is_none()
            && self.metadata.is_none()
    }

    /// Fold a newer update into this one.
    pub fn merge(&mut self, newer: ProgressUpdate) {
        self.xp_delta = self.xp_delta.saturating_add(newer.xp_delta);
        if newer.total_xp.is_some() {
            self.total_xp = newer.total_xp;
        }
        if newer.level.is_some() {
            self.level = newer.level;
        }
        if newer.unlocked_items.is_some() {
            self.unlocked_items = newer.unlocked_items;
        }
        if newer.metadata.is_some() {
            self.metadata = newer.metadata;
        }
    }

    /// Reject updates a client could not have produced.
    pub fn validate(&self) -> Result<(), CoreError> {
        if !(0..=MAX_TOTAL_XP).contains(&self.xp_delta) {
            return Err(CoreError::Validation(format!(
                "xp_delta must be between 0 and {MAX_TOTAL_XP}"
            )));
        }
        if let Some(total_xp) = self.total_xp {
            if !(0..=MAX_TOTAL_XP).contains(&total_xp) {
                return Err(CoreError::Validation(format!(
                    "total_xp must be between 0 and {MAX_TOTAL_XP}"
                )));
            }
        }
        if let Some(items) = &self.unlocked_items {
            for item in items {
                validate_item_id(item)?;
            }
        }
        if let Some(metadata) = &self.metadata {
            if metadata.len() > MAX_METADATA_KEYS {
                return Err(CoreError::Validation(format!(
                    "Metadata is limited to {MAX_METADATA_KEYS} keys"
                )));
            }
            for key in metadata.keys() {
                validate_metadata_key(key)?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
