//! Reward ticket state machine.
//!
//! ```text
//! LOCK ─> PROGRESS <─> UNLOCK ──apply──> APPLY ──ship──> SHIPPING ──deliver──> DELIVERED
//!  (computed from progress)    (explicit user/admin actions, forward only)
//! ```
//!
//! Until the user applies for the reward, the status is recomputed from
//! progress on every check-in and may drop from UNLOCK back to PROGRESS.
//! From APPLY onward only explicit actions move the ticket.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, TransitionError, ValidationError};
use crate::events::Event;

/// Progress percentage at which a reward becomes claimable.
///
/// Fixed policy value; campaigns carry their own `achievement_rate` for
/// messaging, which is deliberately not used here.
pub const UNLOCK_THRESHOLD: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewardStatus {
    /// No check-ins yet
    Lock,
    /// Started, below the unlock threshold
    Progress,
    /// Claimable
    Unlock,
    /// Claimed, waiting for shipment
    Apply,
    /// Shipped by an admin
    Shipping,
    /// Delivered (terminal state)
    Delivered,
}

impl RewardStatus {
    /// Whether the status is still derived from progress.
    pub fn is_computed(&self) -> bool {
        matches!(
            self,
            RewardStatus::Lock | RewardStatus::Progress | RewardStatus::Unlock
        )
    }

    /// Whether the user already applied for the reward.
    pub fn is_claimed(&self) -> bool {
        !self.is_computed()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RewardStatus::Lock => "LOCK",
            RewardStatus::Progress => "PROGRESS",
            RewardStatus::Unlock => "UNLOCK",
            RewardStatus::Apply => "APPLY",
            RewardStatus::Shipping => "SHIPPING",
            RewardStatus::Delivered => "DELIVERED",
        }
    }
}

impl fmt::Display for RewardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Explicit reward action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardAction {
    /// User claims the reward: UNLOCK → APPLY
    Apply,
    /// Admin ships it: APPLY → SHIPPING
    Ship,
    /// Admin confirms delivery: SHIPPING → DELIVERED
    Deliver,
}

impl fmt::Display for RewardAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewardAction::Apply => write!(f, "apply"),
            RewardAction::Ship => write!(f, "ship"),
            RewardAction::Deliver => write!(f, "deliver"),
        }
    }
}

/// Status implied by progress alone.
pub fn determine_reward_status(progress: f64, has_started: bool) -> RewardStatus {
    if progress >= UNLOCK_THRESHOLD {
        RewardStatus::Unlock
    } else if has_started {
        RewardStatus::Progress
    } else {
        RewardStatus::Lock
    }
}

/// Where to send a physical reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub recipient: String,
    pub phone: String,
    pub address_line1: String,
    #[serde(default)]
    pub address_line2: Option<String>,
    pub postal_code: String,
    #[serde(default)]
    pub memo: Option<String>,
}

impl ShippingAddress {
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if self.recipient.trim().is_empty() {
            return Err(ValidationError::Empty("recipient"));
        }
        if self.phone.trim().is_empty() {
            return Err(ValidationError::Empty("phone"));
        }
        if self.address_line1.trim().is_empty() {
            return Err(ValidationError::Empty("address_line1"));
        }
        Ok(())
    }
}

/// Fulfillment record for one participation's reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardTicket {
    pub id: String,
    pub participation_id: String,
    pub status: RewardStatus,
    /// Progress at the last evaluation
    pub progress: f64,
    pub unlocked_at: Option<DateTime<Utc>>,
    pub applied_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub shipping: Option<ShippingAddress>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RewardTicket {
    pub fn new(
        participation_id: impl Into<String>,
        progress: f64,
        has_started: bool,
        now: DateTime<Utc>,
    ) -> Self {
        let status = determine_reward_status(progress, has_started);
        RewardTicket {
            id: format!("reward-{}", uuid::Uuid::new_v4()),
            participation_id: participation_id.into(),
            status,
            progress,
            unlocked_at: (status == RewardStatus::Unlock).then_some(now),
            applied_at: None,
            shipped_at: None,
            delivered_at: None,
            shipping: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Recompute the status from progress.
    ///
    /// No-op once the reward has been applied for. Returns an event when
    /// the status changed.
    pub fn reevaluate(
        &mut self,
        progress: f64,
        has_started: bool,
        now: DateTime<Utc>,
    ) -> Option<Event> {
        if self.status.is_claimed() {
            debug!(ticket_id = %self.id, status = %self.status, "reward already claimed, skipping reevaluation");
            return None;
        }

        self.progress = progress;
        self.updated_at = now;
        let next = determine_reward_status(progress, has_started);
        if next == self.status {
            return None;
        }

        let from = self.status;
        self.status = next;
        if next == RewardStatus::Unlock && self.unlocked_at.is_none() {
            self.unlocked_at = Some(now);
        }
        info!(ticket_id = %self.id, %from, to = %next, progress, "reward status recomputed");
        Some(Event::RewardStatusChanged {
            ticket_id: self.id.clone(),
            participation_id: self.participation_id.clone(),
            from,
            to: next,
            at: now,
        })
    }

    /// Claim the reward.
    ///
    /// Re-applying an already applied ticket only replaces the shipping
    /// address.
    pub fn apply(&mut self, shipping: ShippingAddress, now: DateTime<Utc>) -> Result<Event> {
        shipping.validate()?;
        let reapplied = match self.status {
            RewardStatus::Unlock => false,
            RewardStatus::Apply => true,
            _ => return Err(self.rejected(RewardAction::Apply)),
        };

        self.status = RewardStatus::Apply;
        if self.applied_at.is_none() {
            self.applied_at = Some(now);
        }
        self.shipping = Some(shipping);
        self.updated_at = now;
        info!(ticket_id = %self.id, reapplied, "reward applied");

        Ok(Event::RewardApplied {
            ticket_id: self.id.clone(),
            participation_id: self.participation_id.clone(),
            reapplied,
            at: now,
        })
    }

    /// Admin: mark the reward as shipped.
    pub fn ship(&mut self, now: DateTime<Utc>) -> Result<Event> {
        if self.status != RewardStatus::Apply {
            return Err(self.rejected(RewardAction::Ship));
        }
        self.status = RewardStatus::Shipping;
        self.shipped_at = Some(now);
        self.updated_at = now;
        info!(ticket_id = %self.id, "reward shipped");
        Ok(self.changed(RewardStatus::Apply, now))
    }

    /// Admin: mark the reward as delivered.
    pub fn deliver(&mut self, now: DateTime<Utc>) -> Result<Event> {
        if self.status != RewardStatus::Shipping {
            return Err(self.rejected(RewardAction::Deliver));
        }
        self.status = RewardStatus::Delivered;
        self.delivered_at = Some(now);
        self.updated_at = now;
        info!(ticket_id = %self.id, "reward delivered");
        Ok(self.changed(RewardStatus::Shipping, now))
    }

    fn changed(&self, from: RewardStatus, now: DateTime<Utc>) -> Event {
        Event::RewardStatusChanged {
            ticket_id: self.id.clone(),
            participation_id: self.participation_id.clone(),
            from,
            to: self.status,
            at: now,
        }
    }

    fn rejected(&self, action: RewardAction) -> crate::error::CoreError {
        warn!(ticket_id = %self.id, status = %self.status, %action, "rejected reward transition");
        TransitionError::InvalidRewardTransition {
            from: self.status,
            action,
        }
        .into()
    }
}

/// Unlock state next to the campaign's own achievement rate.
///
/// The two thresholds disagree whenever `achievement_rate` is not 90;
/// `threshold_mismatch` is set when this progress value lands between them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardEligibility {
    pub progress: f64,
    pub unlock_threshold: f64,
    pub achievement_rate: u8,
    pub unlocked: bool,
    pub meets_achievement_rate: bool,
    pub threshold_mismatch: bool,
}

impl RewardEligibility {
    pub fn evaluate(progress: f64, achievement_rate: u8) -> Self {
        let unlocked = progress >= UNLOCK_THRESHOLD;
        let meets_achievement_rate = progress >= f64::from(achievement_rate);
        RewardEligibility {
            progress,
            unlock_threshold: UNLOCK_THRESHOLD,
            achievement_rate,
            unlocked,
            meets_achievement_rate,
            threshold_mismatch: unlocked != meets_achievement_rate,
        }
    }
}
