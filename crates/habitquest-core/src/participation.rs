//! Participation records and check-in orchestration.
//!
//! A check-in runs through: gate (participation active, campaign accepting
//! the date) → duplicate check → payload validation → completed count +1 →
//! progress → reward re-evaluation. Inputs are snapshots; the outcome holds
//! the new snapshots for the datastore to persist. Nothing is returned when
//! any step fails, so a rejected check-in never partially applies.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::campaign::Campaign;
use crate::error::{CoreError, Result, TransitionError, ValidationError};
use crate::events::Event;
use crate::progress::{campaign_progress, ProgressReport};
use crate::reward::{RewardStatus, RewardTicket};
use crate::verification::{
    time_interval_minutes, validate_for, Advisory, VerificationPayload, VerificationType,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParticipationStatus {
    #[default]
    Active,
    Completed,
    Abandoned,
}

impl fmt::Display for ParticipationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticipationStatus::Active => write!(f, "active"),
            ParticipationStatus::Completed => write!(f, "completed"),
            ParticipationStatus::Abandoned => write!(f, "abandoned"),
        }
    }
}

/// One user's enrollment in one campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participation {
    pub id: String,
    pub user_id: String,
    pub campaign_id: String,
    /// Copied from the campaign at join time
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub target_count: u32,
    /// Verified check-ins so far; may exceed `target_count`
    pub completed_count: u32,
    pub status: ParticipationStatus,
    pub notifications_enabled: bool,
    pub joined_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Participation {
    pub fn has_started(&self) -> bool {
        self.completed_count > 0
    }

    pub fn is_active(&self) -> bool {
        self.status == ParticipationStatus::Active
    }

    /// Mark the participation completed. Only from `active`, only by its owner.
    pub fn complete(&mut self, user_id: &str, now: DateTime<Utc>) -> Result<Event> {
        self.ensure_owner(user_id)?;
        self.finish(ParticipationStatus::Completed, now)
    }

    /// Mark the participation abandoned. Only from `active`, only by its owner.
    pub fn abandon(&mut self, user_id: &str, now: DateTime<Utc>) -> Result<Event> {
        self.ensure_owner(user_id)?;
        self.finish(ParticipationStatus::Abandoned, now)
    }

    pub fn set_notifications(
        &mut self,
        user_id: &str,
        enabled: bool,
        now: DateTime<Utc>,
    ) -> Result<Event> {
        self.ensure_owner(user_id)?;
        self.notifications_enabled = enabled;
        self.updated_at = now;
        Ok(Event::NotificationsChanged {
            participation_id: self.id.clone(),
            enabled,
            at: now,
        })
    }

    /// Refuse anyone but the participant.
    pub fn ensure_owner(&self, user_id: &str) -> std::result::Result<(), TransitionError> {
        if self.user_id == user_id {
            return Ok(());
        }
        warn!(participation_id = %self.id, user_id, "rejected non-owner");
        Err(TransitionError::NotOwner {
            participation_id: self.id.clone(),
            user_id: user_id.to_string(),
        })
    }

    fn finish(&mut self, status: ParticipationStatus, now: DateTime<Utc>) -> Result<Event> {
        self.ensure_active()?;
        self.status = status;
        self.finished_at = Some(now);
        self.updated_at = now;
        info!(participation_id = %self.id, %status, "participation finished");
        Ok(Event::ParticipationFinished {
            participation_id: self.id.clone(),
            status,
            at: now,
        })
    }

    fn ensure_active(&self) -> std::result::Result<(), TransitionError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(TransitionError::ParticipationInactive {
                participation_id: self.id.clone(),
                status: self.status,
            })
        }
    }
}

/// A verified unit of progress on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: String,
    pub participation_id: String,
    pub date: NaiveDate,
    pub verification_type: VerificationType,
    pub payload: VerificationPayload,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Snapshots produced by [`join`].
#[derive(Debug, Clone, Serialize)]
pub struct Joined {
    pub participation: Participation,
    /// Campaign with the participant count bumped
    pub campaign: Campaign,
    /// Locked reward ticket for the new participation
    pub ticket: RewardTicket,
    pub event: Event,
}

/// Enroll `user_id` in `campaign`.
///
/// `existing` are the user's current participations; joining the same
/// campaign twice is refused.
pub fn join(
    campaign: &Campaign,
    user_id: &str,
    existing: &[Participation],
    notifications_enabled: bool,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Joined> {
    if user_id.trim().is_empty() {
        return Err(ValidationError::Empty("user_id").into());
    }
    if existing
        .iter()
        .any(|p| p.user_id == user_id && p.campaign_id == campaign.id)
    {
        warn!(user_id, campaign_id = %campaign.id, "duplicate join");
        return Err(TransitionError::AlreadyJoined {
            user_id: user_id.to_string(),
            campaign_id: campaign.id.clone(),
        }
        .into());
    }
    campaign.accepts_participants(today)?;

    let participation = Participation {
        id: format!("part-{}", uuid::Uuid::new_v4()),
        user_id: user_id.to_string(),
        campaign_id: campaign.id.clone(),
        start_date: campaign.start_date,
        end_date: campaign.end_date,
        target_count: campaign.target_count,
        completed_count: 0,
        status: ParticipationStatus::Active,
        notifications_enabled,
        joined_at: now,
        finished_at: None,
        updated_at: now,
    };

    let mut campaign = campaign.clone();
    campaign.participant_count += 1;
    campaign.updated_at = now;

    let ticket = RewardTicket::new(participation.id.clone(), 0.0, false, now);
    info!(user_id, campaign_id = %campaign.id, participation_id = %participation.id, "participant joined");

    let event = Event::ParticipantJoined {
        campaign_id: campaign.id.clone(),
        participation_id: participation.id.clone(),
        user_id: user_id.to_string(),
        at: now,
    };
    Ok(Joined {
        participation,
        campaign,
        ticket,
        event,
    })
}

/// Everything needed to record one check-in.
#[derive(Debug, Clone)]
pub struct CheckInRequest<'a> {
    /// Acting user; must own `participation`
    pub user_id: &'a str,
    pub campaign: &'a Campaign,
    pub participation: &'a Participation,
    /// Check-ins already recorded for this participation
    pub existing: &'a [CheckIn],
    pub ticket: Option<&'a RewardTicket>,
    pub payload: VerificationPayload,
    /// Calendar date the check-in counts for
    pub date: NaiveDate,
    pub today: NaiveDate,
    pub now: DateTime<Utc>,
}

/// New snapshots after a successful check-in.
#[derive(Debug, Clone, Serialize)]
pub struct CheckInOutcome {
    pub check_in: CheckIn,
    pub participation: Participation,
    pub ticket: RewardTicket,
    pub progress: f64,
    pub advisories: Vec<Advisory>,
    pub events: Vec<Event>,
}

/// Validate and record a check-in.
pub fn record_check_in(req: CheckInRequest<'_>) -> Result<CheckInOutcome> {
    let CheckInRequest {
        user_id,
        campaign,
        participation,
        existing,
        ticket,
        payload,
        date,
        today,
        now,
    } = req;

    if participation.campaign_id != campaign.id {
        return Err(ValidationError::InvalidValue {
            field: "campaign_id".into(),
            message: format!(
                "participation {} belongs to campaign {}, not {}",
                participation.id, participation.campaign_id, campaign.id
            ),
        }
        .into());
    }
    participation.ensure_owner(user_id)?;
    participation.ensure_active()?;
    campaign.accepts_check_in(date, today)?;

    if has_checked_in_on(existing, date) {
        warn!(participation_id = %participation.id, %date, "duplicate check-in");
        return Err(CoreError::DuplicateCheckIn {
            participation_id: participation.id.clone(),
            date,
        });
    }

    let payload = with_time_interval(payload, existing, date);
    let validated = validate_for(
        campaign.verification_type,
        &payload,
        &campaign.verification_config,
    )?;

    let check_in = CheckIn {
        id: format!("checkin-{}", uuid::Uuid::new_v4()),
        participation_id: participation.id.clone(),
        date,
        verification_type: validated.verification_type,
        payload,
        verified: true,
        created_at: now,
    };

    let mut participation = participation.clone();
    participation.completed_count = participation.completed_count.saturating_add(1);
    participation.updated_at = now;

    let progress = campaign_progress(
        participation.completed_count,
        participation.target_count,
        &campaign.verification_config.cadence,
    );
    debug!(
        participation_id = %participation.id,
        completed = participation.completed_count,
        progress,
        "progress recomputed"
    );

    let mut events = vec![Event::CheckInRecorded {
        participation_id: participation.id.clone(),
        check_in_id: check_in.id.clone(),
        date,
        completed_count: participation.completed_count,
        progress,
        at: now,
    }];

    let ticket = match ticket {
        Some(existing_ticket) => {
            let mut ticket = existing_ticket.clone();
            events.extend(ticket.reevaluate(progress, participation.has_started(), now));
            ticket
        }
        None => {
            let ticket = RewardTicket::new(participation.id.clone(), progress, true, now);
            events.push(Event::RewardStatusChanged {
                ticket_id: ticket.id.clone(),
                participation_id: participation.id.clone(),
                from: RewardStatus::Lock,
                to: ticket.status,
                at: now,
            });
            ticket
        }
    };

    info!(
        participation_id = %participation.id,
        %date,
        completed = participation.completed_count,
        reward = %ticket.status,
        "check-in recorded"
    );

    Ok(CheckInOutcome {
        check_in,
        participation,
        ticket,
        progress,
        advisories: validated.advisories,
        events,
    })
}

/// Fill in the interval of a time record from the latest earlier one.
fn with_time_interval(
    payload: VerificationPayload,
    existing: &[CheckIn],
    date: NaiveDate,
) -> VerificationPayload {
    match payload {
        VerificationPayload::TimeRecord {
            time,
            interval_minutes: None,
        } => {
            let current = crate::verification::parse_time(&time).ok();
            let previous = existing
                .iter()
                .filter(|c| c.date < date)
                .max_by_key(|c| c.date)
                .and_then(|c| c.payload.recorded_time());
            let interval_minutes = match (previous, current) {
                (Some(prev), Some(cur)) => Some(time_interval_minutes(prev, cur)),
                _ => None,
            };
            VerificationPayload::TimeRecord {
                time,
                interval_minutes,
            }
        }
        other => other,
    }
}

// ── Queries ──────────────────────────────────────────────────────────

/// Current progress of a participation in its campaign.
pub fn progress_for(participation: &Participation, campaign: &Campaign) -> f64 {
    campaign_progress(
        participation.completed_count,
        participation.target_count,
        &campaign.verification_config.cadence,
    )
}

/// Full progress view for dashboards.
pub fn progress_report(
    participation: &Participation,
    campaign: &Campaign,
    check_ins: &[CheckIn],
    today: NaiveDate,
) -> ProgressReport {
    let dates: Vec<NaiveDate> = check_ins
        .iter()
        .filter(|c| c.verified && c.participation_id == participation.id)
        .map(|c| c.date)
        .collect();
    ProgressReport::evaluate(
        participation.completed_count,
        participation.target_count,
        &campaign.verification_config.cadence,
        campaign.remaining_days(today),
        campaign.achievement_rate,
        &dates,
    )
}

pub fn has_checked_in_on(check_ins: &[CheckIn], date: NaiveDate) -> bool {
    check_ins.iter().any(|c| c.date == date)
}

pub fn checked_in_today(check_ins: &[CheckIn], today: NaiveDate) -> bool {
    has_checked_in_on(check_ins, today)
}

/// One row of input for [`summarize`].
#[derive(Debug, Clone, Copy)]
pub struct SummaryEntry<'a> {
    pub participation: &'a Participation,
    pub campaign: &'a Campaign,
    pub ticket: Option<&'a RewardTicket>,
}

/// Aggregate counts across a user's participations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ParticipationSummary {
    pub user_id: String,
    pub total: u32,
    pub active: u32,
    pub completed: u32,
    pub abandoned: u32,
    pub total_check_ins: u32,
    /// Mean progress over active participations
    pub average_progress: f64,
    pub rewards_unlocked: u32,
    pub rewards_claimed: u32,
}

pub fn summarize(user_id: &str, entries: &[SummaryEntry<'_>]) -> ParticipationSummary {
    let mut summary = ParticipationSummary {
        user_id: user_id.to_string(),
        ..Default::default()
    };
    let mut active_progress = Vec::new();

    for entry in entries.iter().filter(|e| e.participation.user_id == user_id) {
        let p = entry.participation;
        summary.total += 1;
        summary.total_check_ins += p.completed_count;
        match p.status {
            ParticipationStatus::Active => {
                summary.active += 1;
                active_progress.push(progress_for(p, entry.campaign));
            }
            ParticipationStatus::Completed => summary.completed += 1,
            ParticipationStatus::Abandoned => summary.abandoned += 1,
        }
        match entry.ticket.map(|t| t.status) {
            Some(RewardStatus::Unlock) => summary.rewards_unlocked += 1,
            Some(status) if status.is_claimed() => summary.rewards_claimed += 1,
            _ => {}
        }
    }

    if !active_progress.is_empty() {
        let mean = active_progress.iter().sum::<f64>() / active_progress.len() as f64;
        summary.average_progress = (mean * 10.0).round() / 10.0;
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::tests::{d, now, sample_new_campaign};
    use crate::error::ErrorKind;
    use crate::verification::{Cadence, VerificationConfig};

    fn running_campaign() -> Campaign {
        let mut campaign = Campaign::create(sample_new_campaign(), now()).unwrap();
        campaign.publish(now()).unwrap();
        campaign
    }

    fn joined(campaign: &Campaign) -> Joined {
        join(campaign, "user-1", &[], true, d(2026, 2, 25), now()).unwrap()
    }

    fn check(
        campaign: &Campaign,
        participation: &Participation,
        existing: &[CheckIn],
        ticket: Option<&RewardTicket>,
        date: NaiveDate,
    ) -> Result<CheckInOutcome> {
        record_check_in(CheckInRequest {
            user_id: "user-1",
            campaign,
            participation,
            existing,
            ticket,
            payload: VerificationPayload::SimpleCheck { checked: true },
            date,
            today: date,
            now: now(),
        })
    }

    #[test]
    fn join_copies_campaign_window_and_bumps_count() {
        let campaign = running_campaign();
        let joined = joined(&campaign);
        assert_eq!(joined.participation.target_count, 30);
        assert_eq!(joined.participation.start_date, campaign.start_date);
        assert_eq!(joined.participation.completed_count, 0);
        assert_eq!(joined.campaign.participant_count, 1);
        assert_eq!(joined.ticket.status, RewardStatus::Lock);
    }

    #[test]
    fn join_twice_is_refused() {
        let campaign = running_campaign();
        let first = joined(&campaign);
        let err = join(
            &first.campaign,
            "user-1",
            &[first.participation.clone()],
            true,
            d(2026, 2, 25),
            now(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Transition(TransitionError::AlreadyJoined { .. })
        ));
    }

    #[test]
    fn join_draft_is_refused() {
        let campaign = Campaign::create(sample_new_campaign(), now()).unwrap();
        let err = join(&campaign, "user-1", &[], true, d(2026, 2, 25), now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[test]
    fn check_in_increments_and_unlocks_progressively() {
        let campaign = running_campaign();
        let joined = joined(&campaign);
        let first = check(
            &joined.campaign,
            &joined.participation,
            &[],
            Some(&joined.ticket),
            d(2026, 3, 1),
        )
        .unwrap();
        assert_eq!(first.participation.completed_count, 1);
        assert_eq!(first.progress, 3.3);
        assert_eq!(first.ticket.status, RewardStatus::Progress);
        assert!(first.check_in.verified);
        assert_eq!(first.events.len(), 2);
    }

    #[test]
    fn duplicate_check_in_does_not_double_count() {
        let campaign = running_campaign();
        let joined = joined(&campaign);
        let first = check(
            &joined.campaign,
            &joined.participation,
            &[],
            Some(&joined.ticket),
            d(2026, 3, 1),
        )
        .unwrap();

        let existing = vec![first.check_in.clone()];
        let err = check(
            &joined.campaign,
            &first.participation,
            &existing,
            Some(&first.ticket),
            d(2026, 3, 1),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateCheckIn);
        assert_eq!(first.participation.completed_count, 1);
    }

    #[test]
    fn invalid_payload_changes_nothing() {
        let campaign = running_campaign();
        let joined = joined(&campaign);
        let err = record_check_in(CheckInRequest {
            user_id: "user-1",
            campaign: &joined.campaign,
            participation: &joined.participation,
            existing: &[],
            ticket: Some(&joined.ticket),
            payload: VerificationPayload::SimpleCheck { checked: false },
            date: d(2026, 3, 1),
            today: d(2026, 3, 1),
            now: now(),
        })
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(joined.participation.completed_count, 0);
    }

    #[test]
    fn check_in_before_start_is_refused() {
        let campaign = running_campaign();
        let joined = joined(&campaign);
        let err = check(
            &joined.campaign,
            &joined.participation,
            &[],
            Some(&joined.ticket),
            d(2026, 2, 27),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[test]
    fn abandoned_participation_rejects_check_ins() {
        let campaign = running_campaign();
        let mut joined = joined(&campaign);
        joined.participation.abandon("user-1", now()).unwrap();
        assert!(joined.participation.finished_at.is_some());
        let err = check(
            &joined.campaign,
            &joined.participation,
            &[],
            Some(&joined.ticket),
            d(2026, 3, 1),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Transition(TransitionError::ParticipationInactive { .. })
        ));
        assert!(joined.participation.complete("user-1", now()).is_err());
    }

    #[test]
    fn only_the_participant_may_check_in_or_finish() {
        let campaign = running_campaign();
        let mut joined = joined(&campaign);
        let err = record_check_in(CheckInRequest {
            user_id: "user-2",
            campaign: &joined.campaign,
            participation: &joined.participation,
            existing: &[],
            ticket: Some(&joined.ticket),
            payload: VerificationPayload::SimpleCheck { checked: true },
            date: d(2026, 3, 1),
            today: d(2026, 3, 1),
            now: now(),
        })
        .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Transition(TransitionError::NotOwner { .. })
        ));

        assert!(joined.participation.abandon("user-2", now()).is_err());
        assert!(joined.participation.complete("user-2", now()).is_err());
        assert!(joined
            .participation
            .set_notifications("user-2", false, now())
            .is_err());
        assert!(joined.participation.is_active());
        assert!(joined.participation.notifications_enabled);

        let event = joined
            .participation
            .set_notifications("user-1", false, now())
            .unwrap();
        assert!(matches!(
            event,
            Event::NotificationsChanged { enabled: false, .. }
        ));
        assert!(!joined.participation.notifications_enabled);
    }

    #[test]
    fn reaching_ninety_percent_unlocks_reward() {
        let campaign = running_campaign();
        let joined = joined(&campaign);
        let mut participation = joined.participation.clone();
        participation.completed_count = 26;
        let outcome = check(
            &joined.campaign,
            &participation,
            &[],
            Some(&joined.ticket),
            d(2026, 3, 28),
        )
        .unwrap();
        assert_eq!(outcome.progress, 90.0);
        assert_eq!(outcome.ticket.status, RewardStatus::Unlock);
        assert!(outcome.ticket.unlocked_at.is_some());
    }

    #[test]
    fn weekly_cadence_uses_effective_target() {
        let mut new = sample_new_campaign();
        new.end_date = d(2026, 3, 14);
        new.target_count = 14;
        new.verification_config = VerificationConfig::weekly(3);
        let mut campaign = Campaign::create(new, now()).unwrap();
        campaign.publish(now()).unwrap();
        let joined = joined(&campaign);

        let mut participation = joined.participation.clone();
        participation.completed_count = 2;
        let outcome = check(
            &joined.campaign,
            &participation,
            &[],
            Some(&joined.ticket),
            d(2026, 3, 5),
        )
        .unwrap();
        assert_eq!(outcome.progress, 50.0);
        assert_eq!(
            joined.campaign.verification_config.cadence,
            Cadence::Weekly { weekly_target: 3 }
        );
    }

    #[test]
    fn time_record_interval_is_filled_from_previous_day() {
        let mut new = sample_new_campaign();
        new.verification_type = VerificationType::TimeRecord;
        let mut campaign = Campaign::create(new, now()).unwrap();
        campaign.publish(now()).unwrap();
        let joined = joined(&campaign);

        let first = record_check_in(CheckInRequest {
            user_id: "user-1",
            campaign: &joined.campaign,
            participation: &joined.participation,
            existing: &[],
            ticket: Some(&joined.ticket),
            payload: VerificationPayload::TimeRecord {
                time: "06:30".into(),
                interval_minutes: None,
            },
            date: d(2026, 3, 1),
            today: d(2026, 3, 1),
            now: now(),
        })
        .unwrap();
        let second = record_check_in(CheckInRequest {
            user_id: "user-1",
            campaign: &joined.campaign,
            participation: &first.participation,
            existing: &[first.check_in.clone()],
            ticket: Some(&first.ticket),
            payload: VerificationPayload::TimeRecord {
                time: "06:10".into(),
                interval_minutes: None,
            },
            date: d(2026, 3, 2),
            today: d(2026, 3, 2),
            now: now(),
        })
        .unwrap();

        assert_eq!(
            second.check_in.payload,
            VerificationPayload::TimeRecord {
                time: "06:10".into(),
                interval_minutes: Some(20),
            }
        );
    }

    #[test]
    fn missing_ticket_is_created_on_first_check_in() {
        let campaign = running_campaign();
        let joined = joined(&campaign);
        let outcome = check(&joined.campaign, &joined.participation, &[], None, d(2026, 3, 1))
            .unwrap();
        assert_eq!(outcome.ticket.participation_id, joined.participation.id);
        assert_eq!(outcome.ticket.status, RewardStatus::Progress);
    }

    #[test]
    fn today_query_matches_dates() {
        let campaign = running_campaign();
        let joined = joined(&campaign);
        let outcome = check(
            &joined.campaign,
            &joined.participation,
            &[],
            Some(&joined.ticket),
            d(2026, 3, 1),
        )
        .unwrap();
        let check_ins = [outcome.check_in];
        assert!(checked_in_today(&check_ins, d(2026, 3, 1)));
        assert!(!checked_in_today(&check_ins, d(2026, 3, 2)));

        let report = progress_report(&outcome.participation, &joined.campaign, &check_ins, d(2026, 3, 1));
        assert_eq!(report.current_streak, 1);
        assert_eq!(report.target, 30);
        assert_eq!(report.remaining_days, 30);
    }

    #[test]
    fn summary_counts_per_status() {
        let campaign = running_campaign();
        let a = joined(&campaign);
        let mut b = join(&a.campaign, "user-1", &[], true, d(2026, 2, 25), now()).unwrap();
        b.participation.completed_count = 15;
        let mut c = join(&b.campaign, "user-1", &[], true, d(2026, 2, 25), now()).unwrap();
        c.participation.abandon("user-1", now()).unwrap();
        let other = join(&c.campaign, "user-2", &[], true, d(2026, 2, 25), now()).unwrap();

        let mut unlocked = b.ticket.clone();
        unlocked.status = RewardStatus::Unlock;

        let entries = [
            SummaryEntry {
                participation: &a.participation,
                campaign: &campaign,
                ticket: Some(&a.ticket),
            },
            SummaryEntry {
                participation: &b.participation,
                campaign: &campaign,
                ticket: Some(&unlocked),
            },
            SummaryEntry {
                participation: &c.participation,
                campaign: &campaign,
                ticket: None,
            },
            SummaryEntry {
                participation: &other.participation,
                campaign: &campaign,
                ticket: None,
            },
        ];
        let summary = summarize("user-1", &entries);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.active, 2);
        assert_eq!(summary.abandoned, 1);
        assert_eq!(summary.total_check_ins, 15);
        assert_eq!(summary.average_progress, 25.0);
        assert_eq!(summary.rewards_unlocked, 1);
        assert_eq!(summary.rewards_claimed, 0);
    }
}
