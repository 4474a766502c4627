use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::campaign::CampaignStatus;
use crate::participation::ParticipationStatus;
use crate::reward::RewardStatus;

/// Every state change in the core produces an Event.
/// The datastore persists the new snapshots; surfaces render the events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CampaignPublished {
        campaign_id: String,
        at: DateTime<Utc>,
    },
    CampaignUnpublished {
        campaign_id: String,
        at: DateTime<Utc>,
    },
    CampaignActivated {
        campaign_id: String,
        at: DateTime<Utc>,
    },
    /// Campaign reached its terminal state.
    CampaignEnded {
        campaign_id: String,
        from: CampaignStatus,
        at: DateTime<Utc>,
    },
    CampaignEdited {
        campaign_id: String,
        fields: Vec<String>,
        at: DateTime<Utc>,
    },
    ParticipantJoined {
        campaign_id: String,
        participation_id: String,
        user_id: String,
        at: DateTime<Utc>,
    },
    CheckInRecorded {
        participation_id: String,
        check_in_id: String,
        date: NaiveDate,
        completed_count: u32,
        progress: f64,
        at: DateTime<Utc>,
    },
    NotificationsChanged {
        participation_id: String,
        enabled: bool,
        at: DateTime<Utc>,
    },
    /// Participation left `active` (completed or abandoned).
    ParticipationFinished {
        participation_id: String,
        status: ParticipationStatus,
        at: DateTime<Utc>,
    },
    RewardStatusChanged {
        ticket_id: String,
        participation_id: String,
        from: RewardStatus,
        to: RewardStatus,
        at: DateTime<Utc>,
    },
    /// User claimed (or re-submitted the address for) a reward.
    RewardApplied {
        ticket_id: String,
        participation_id: String,
        reapplied: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::CampaignPublished { at, .. }
            | Event::CampaignUnpublished { at, .. }
            | Event::CampaignActivated { at, .. }
            | Event::CampaignEnded { at, .. }
            | Event::CampaignEdited { at, .. }
            | Event::ParticipantJoined { at, .. }
            | Event::CheckInRecorded { at, .. }
            | Event::NotificationsChanged { at, .. }
            | Event::ParticipationFinished { at, .. }
            | Event::RewardStatusChanged { at, .. }
            | Event::RewardApplied { at, .. } => *at,
        }
    }
}
