//! Campaign definitions and their lifecycle.
//!
//! ## State Transitions
//!
//! ```text
//! draft ──publish──> published ──activate──> active
//!   ^                  |    |                  |
//!   +────unpublish─────+    +──end──> ended <──end
//!      (no participants)
//! ```
//!
//! `ended` is terminal. Once a campaign leaves `draft`, only the cosmetic
//! fields (title, description, emoji, difficulty, featured) may change.
//!
//! Stored status and effective status are kept apart: a `published`
//! campaign whose start date has arrived is *effectively* active (see
//! [`derive_effective_status`]) even if nobody persisted the change yet.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, TransitionError, ValidationError};
use crate::events::Event;
use crate::verification::{VerificationConfig, VerificationType};

/// Stored campaign status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    /// Being authored, invisible to users
    Draft,
    /// Visible and joinable, not started yet
    Published,
    /// Running
    Active,
    /// Finished (terminal state)
    Ended,
}

impl CampaignStatus {
    /// Target status of `action`, or `None` when the pair is not in the table.
    pub fn next(&self, action: CampaignAction) -> Option<CampaignStatus> {
        match (self, action) {
            (CampaignStatus::Draft, CampaignAction::Publish) => Some(CampaignStatus::Published),
            (CampaignStatus::Published, CampaignAction::Unpublish) => Some(CampaignStatus::Draft),
            (CampaignStatus::Published, CampaignAction::Activate) => Some(CampaignStatus::Active),
            (CampaignStatus::Published, CampaignAction::End) => Some(CampaignStatus::Ended),
            (CampaignStatus::Active, CampaignAction::End) => Some(CampaignStatus::Ended),
            _ => None,
        }
    }

    /// Actions allowed from this status (guards aside).
    pub fn valid_actions(&self) -> &'static [CampaignAction] {
        match self {
            CampaignStatus::Draft => &[CampaignAction::Publish],
            CampaignStatus::Published => &[
                CampaignAction::Unpublish,
                CampaignAction::Activate,
                CampaignAction::End,
            ],
            CampaignStatus::Active => &[CampaignAction::End],
            CampaignStatus::Ended => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CampaignStatus::Ended)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Published => "published",
            CampaignStatus::Active => "active",
            CampaignStatus::Ended => "ended",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Admin lifecycle action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignAction {
    /// draft → published
    Publish,
    /// published → draft, only without participants
    Unpublish,
    /// published → active
    Activate,
    /// published | active → ended
    End,
}

impl fmt::Display for CampaignAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CampaignAction::Publish => write!(f, "publish"),
            CampaignAction::Unpublish => write!(f, "unpublish"),
            CampaignAction::Activate => write!(f, "activate"),
            CampaignAction::End => write!(f, "end"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

/// Physical reward handed out on completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Input for creating a campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCampaign {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub emoji: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub featured: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub target_count: u32,
    pub verification_type: VerificationType,
    #[serde(default)]
    pub verification_config: VerificationConfig,
    pub achievement_rate: u8,
    pub reward: RewardDefinition,
    #[serde(default)]
    pub max_participants: Option<u32>,
}

/// An admin-authored, time-boxed challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub title: String,
    pub description: String,
    pub emoji: Option<String>,
    pub difficulty: Difficulty,
    pub featured: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Days (daily cadence) or window length in days (weekly cadence)
    pub target_count: u32,
    pub verification_type: VerificationType,
    pub verification_config: VerificationConfig,
    /// Percentage used for eligibility messaging, 1-100
    pub achievement_rate: u8,
    pub reward: RewardDefinition,
    /// `None` means unlimited
    pub max_participants: Option<u32>,
    pub status: CampaignStatus,
    pub published_at: Option<DateTime<Utc>>,
    /// Maintained by the datastore
    #[serde(default)]
    pub participant_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial update of a campaign. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampaignPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub emoji: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub featured: Option<bool>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub target_count: Option<u32>,
    pub verification_type: Option<VerificationType>,
    pub verification_config: Option<VerificationConfig>,
    pub achievement_rate: Option<u8>,
    pub reward: Option<RewardDefinition>,
    pub max_participants: Option<Option<u32>>,
}

impl CampaignPatch {
    /// Names of the fields this patch touches that freeze after publish.
    pub fn immutable_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.start_date.is_some() {
            fields.push("start_date");
        }
        if self.end_date.is_some() {
            fields.push("end_date");
        }
        if self.target_count.is_some() {
            fields.push("target_count");
        }
        if self.verification_type.is_some() {
            fields.push("verification_type");
        }
        if self.verification_config.is_some() {
            fields.push("verification_config");
        }
        if self.achievement_rate.is_some() {
            fields.push("achievement_rate");
        }
        if self.reward.is_some() {
            fields.push("reward");
        }
        if self.max_participants.is_some() {
            fields.push("max_participants");
        }
        fields
    }

    /// Names of every field this patch touches.
    pub fn touched_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.title.is_some() {
            fields.push("title");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.emoji.is_some() {
            fields.push("emoji");
        }
        if self.difficulty.is_some() {
            fields.push("difficulty");
        }
        if self.featured.is_some() {
            fields.push("featured");
        }
        fields.extend(self.immutable_fields());
        fields
    }
}

fn check_invariants(
    title: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    target_count: u32,
    achievement_rate: u8,
    config: &VerificationConfig,
) -> std::result::Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::Empty("title"));
    }
    if end_date <= start_date {
        return Err(ValidationError::InvalidDateRange {
            start: start_date,
            end: end_date,
        });
    }
    if target_count == 0 {
        return Err(ValidationError::InvalidValue {
            field: "target_count".into(),
            message: "must be a positive integer".into(),
        });
    }
    if !(1..=100).contains(&achievement_rate) {
        return Err(ValidationError::InvalidValue {
            field: "achievement_rate".into(),
            message: format!("{achievement_rate} is outside 1-100"),
        });
    }
    config.validate()
}

impl NewCampaign {
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        check_invariants(
            &self.title,
            self.start_date,
            self.end_date,
            self.target_count,
            self.achievement_rate,
            &self.verification_config,
        )
    }
}

impl Campaign {
    /// Create a draft campaign.
    pub fn create(new: NewCampaign, now: DateTime<Utc>) -> Result<Self> {
        new.validate()?;
        Ok(Campaign {
            id: format!("campaign-{}", uuid::Uuid::new_v4()),
            title: new.title,
            description: new.description,
            emoji: new.emoji,
            difficulty: new.difficulty,
            featured: new.featured,
            start_date: new.start_date,
            end_date: new.end_date,
            target_count: new.target_count,
            verification_type: new.verification_type,
            verification_config: new.verification_config,
            achievement_rate: new.achievement_rate,
            reward: new.reward,
            max_participants: new.max_participants,
            status: CampaignStatus::Draft,
            published_at: None,
            participant_count: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        check_invariants(
            &self.title,
            self.start_date,
            self.end_date,
            self.target_count,
            self.achievement_rate,
            &self.verification_config,
        )
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Apply a lifecycle action.
    ///
    /// Fails without touching the campaign when the action is not allowed
    /// from the current status or its guard does not hold.
    pub fn apply(&mut self, action: CampaignAction, now: DateTime<Utc>) -> Result<Event> {
        let Some(next) = self.status.next(action) else {
            warn!(campaign_id = %self.id, status = %self.status, %action, "rejected campaign transition");
            return Err(TransitionError::InvalidTransition {
                from: self.status,
                action,
            }
            .into());
        };

        match action {
            CampaignAction::Publish => self.validate()?,
            CampaignAction::Unpublish if self.participant_count > 0 => {
                warn!(
                    campaign_id = %self.id,
                    participants = self.participant_count,
                    "unpublish blocked by participants"
                );
                return Err(TransitionError::ParticipantsPresent {
                    count: self.participant_count,
                }
                .into());
            }
            _ => {}
        }

        let from = self.status;
        self.status = next;
        self.updated_at = now;
        info!(campaign_id = %self.id, %from, to = %next, "campaign transition");

        let campaign_id = self.id.clone();
        Ok(match action {
            CampaignAction::Publish => {
                self.published_at = Some(now);
                Event::CampaignPublished { campaign_id, at: now }
            }
            CampaignAction::Unpublish => {
                self.published_at = None;
                Event::CampaignUnpublished { campaign_id, at: now }
            }
            CampaignAction::Activate => Event::CampaignActivated { campaign_id, at: now },
            CampaignAction::End => Event::CampaignEnded {
                campaign_id,
                from,
                at: now,
            },
        })
    }

    pub fn publish(&mut self, now: DateTime<Utc>) -> Result<Event> {
        self.apply(CampaignAction::Publish, now)
    }

    pub fn unpublish(&mut self, now: DateTime<Utc>) -> Result<Event> {
        self.apply(CampaignAction::Unpublish, now)
    }

    pub fn activate(&mut self, now: DateTime<Utc>) -> Result<Event> {
        self.apply(CampaignAction::Activate, now)
    }

    pub fn end(&mut self, now: DateTime<Utc>) -> Result<Event> {
        self.apply(CampaignAction::End, now)
    }

    /// Edit campaign fields.
    ///
    /// Drafts accept any field as long as the invariants still hold.
    /// Any other status only accepts the cosmetic fields.
    pub fn edit(&mut self, patch: CampaignPatch, now: DateTime<Utc>) -> Result<Event> {
        if self.status != CampaignStatus::Draft {
            if let Some(&field) = patch.immutable_fields().first() {
                warn!(campaign_id = %self.id, status = %self.status, field, "rejected edit");
                return Err(TransitionError::ImmutableField {
                    field,
                    status: self.status,
                }
                .into());
            }
        }

        let fields = patch.touched_fields();
        let mut edited = self.clone();
        let CampaignPatch {
            title,
            description,
            emoji,
            difficulty,
            featured,
            start_date,
            end_date,
            target_count,
            verification_type,
            verification_config,
            achievement_rate,
            reward,
            max_participants,
        } = patch;

        if let Some(v) = title {
            edited.title = v;
        }
        if let Some(v) = description {
            edited.description = v;
        }
        if let Some(v) = emoji {
            edited.emoji = Some(v).filter(|e| !e.is_empty());
        }
        if let Some(v) = difficulty {
            edited.difficulty = v;
        }
        if let Some(v) = featured {
            edited.featured = v;
        }
        if let Some(v) = start_date {
            edited.start_date = v;
        }
        if let Some(v) = end_date {
            edited.end_date = v;
        }
        if let Some(v) = target_count {
            edited.target_count = v;
        }
        if let Some(v) = verification_type {
            edited.verification_type = v;
        }
        if let Some(v) = verification_config {
            edited.verification_config = v;
        }
        if let Some(v) = achievement_rate {
            edited.achievement_rate = v;
        }
        if let Some(v) = reward {
            edited.reward = v;
        }
        if let Some(v) = max_participants {
            edited.max_participants = v;
        }

        edited.validate()?;
        edited.updated_at = now;
        *self = edited;

        Ok(Event::CampaignEdited {
            campaign_id: self.id.clone(),
            fields: fields.into_iter().map(String::from).collect(),
            at: now,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn effective_status(&self, today: NaiveDate) -> CampaignStatus {
        derive_effective_status(self, today)
    }

    /// Inclusive length of the campaign window in days.
    pub fn total_days(&self) -> u32 {
        days_between(self.start_date, self.end_date) + 1
    }

    /// Days left in the window, today included.
    pub fn remaining_days(&self, today: NaiveDate) -> u32 {
        if today < self.start_date {
            return self.total_days();
        }
        if today > self.end_date {
            return 0;
        }
        days_between(today, self.end_date) + 1
    }

    pub fn is_window_closed(&self, today: NaiveDate) -> bool {
        today > self.end_date
    }

    pub fn has_capacity(&self) -> bool {
        self.max_participants
            .map_or(true, |max| self.participant_count < max)
    }

    pub fn remaining_capacity(&self) -> Option<u32> {
        self.max_participants
            .map(|max| max.saturating_sub(self.participant_count))
    }

    /// Whether a new participant may join today.
    pub fn accepts_participants(&self, today: NaiveDate) -> std::result::Result<(), TransitionError> {
        let status = self.effective_status(today);
        if !matches!(status, CampaignStatus::Published | CampaignStatus::Active) {
            return Err(self.closed(status, "not open for joining"));
        }
        if self.is_window_closed(today) {
            return Err(self.closed(status, "campaign window is over"));
        }
        if let Some(max) = self.max_participants {
            if self.participant_count >= max {
                return Err(TransitionError::CapacityReached {
                    campaign_id: self.id.clone(),
                    max,
                });
            }
        }
        Ok(())
    }

    /// Whether a check-in dated `date` may be recorded today.
    pub fn accepts_check_in(
        &self,
        date: NaiveDate,
        today: NaiveDate,
    ) -> std::result::Result<(), TransitionError> {
        let status = self.effective_status(today);
        if status != CampaignStatus::Active {
            return Err(self.closed(status, "check-ins are only accepted while active"));
        }
        if date < self.start_date || date > self.end_date {
            return Err(self.closed(status, "date is outside the campaign window"));
        }
        if date > today {
            return Err(self.closed(status, "cannot check in for a future date"));
        }
        Ok(())
    }

    fn closed(&self, status: CampaignStatus, reason: &'static str) -> TransitionError {
        TransitionError::CampaignClosed {
            campaign_id: self.id.clone(),
            status,
            reason,
        }
    }
}

/// Effective status of `campaign` on `today`, without mutating it.
///
/// A `published` campaign whose start date has arrived is `active`.
/// Every other stored status is returned as-is.
pub fn derive_effective_status(campaign: &Campaign, today: NaiveDate) -> CampaignStatus {
    match campaign.status {
        CampaignStatus::Published if today >= campaign.start_date => CampaignStatus::Active,
        status => status,
    }
}

fn days_between(from: NaiveDate, to: NaiveDate) -> u32 {
    u32::try_from((to - from).num_days()).unwrap_or(0)
}
