use clap::Subcommand;
use habitquest_core::participation::progress_report;
use habitquest_core::progress::ProgressReport;
use habitquest_core::{Database, Event, Participation, RewardEligibility, RewardTicket};
use serde::Serialize;

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum ParticipationAction {
    /// List the acting user's participations
    List {
        /// Only participations in this campaign
        #[arg(long)]
        campaign: Option<String>,
    },
    /// Progress, streaks and reward eligibility of one participation
    Progress {
        /// Participation ID
        id: String,
    },
    /// Mark a participation completed
    Complete { id: String },
    /// Give up on a participation
    Abandon { id: String },
    /// Turn reminders for a participation on or off
    Notifications {
        id: String,
        /// Disable reminders (enables them when omitted)
        #[arg(long)]
        off: bool,
    },
    /// Roll-up over all of the acting user's participations
    Summary,
}

#[derive(Serialize)]
struct ProgressView {
    participation: Participation,
    report: ProgressReport,
    eligibility: RewardEligibility,
    checked_in_today: bool,
    reward: Option<RewardTicket>,
}

#[derive(Serialize)]
struct Changed {
    participation: Participation,
    event: Event,
}

pub fn join(campaign_id: &str, no_notifications: bool, ctx: &Context) -> CmdResult {
    let user_id = ctx.user_id()?;
    let notifications = ctx.config.notifications.default_enabled && !no_notifications;
    let mut db = Database::open()?;
    let joined = db.join_campaign(campaign_id, user_id, notifications, ctx.today, ctx.now)?;
    print_json(&joined)
}

pub fn run(action: ParticipationAction, ctx: &Context) -> CmdResult {
    let mut db = Database::open()?;

    match action {
        ParticipationAction::List { campaign } => {
            let user_id = ctx.user_id()?;
            let list = db.list_participations(Some(user_id), campaign.as_deref())?;
            print_json(&list)?;
        }
        ParticipationAction::Progress { id } => {
            let participation = db.get_participation(&id)?;
            let campaign = db.get_campaign(&participation.campaign_id)?;
            let check_ins = db.list_check_ins(&id)?;
            let report = progress_report(&participation, &campaign, &check_ins, ctx.today);
            let eligibility = RewardEligibility::evaluate(report.progress, campaign.achievement_rate);
            let view = ProgressView {
                checked_in_today: habitquest_core::participation::checked_in_today(
                    &check_ins, ctx.today,
                ),
                reward: db.reward_for_participation(&id)?,
                participation,
                report,
                eligibility,
            };
            print_json(&view)?;
        }
        ParticipationAction::Complete { id } => {
            let user_id = ctx.user_id()?;
            let (participation, event) =
                db.update_participation(&id, |p| p.complete(user_id, ctx.now))?;
            print_json(&Changed {
                participation,
                event,
            })?;
        }
        ParticipationAction::Abandon { id } => {
            let user_id = ctx.user_id()?;
            let (participation, event) =
                db.update_participation(&id, |p| p.abandon(user_id, ctx.now))?;
            print_json(&Changed {
                participation,
                event,
            })?;
        }
        ParticipationAction::Notifications { id, off } => {
            let user_id = ctx.user_id()?;
            let (participation, event) =
                db.update_participation(&id, |p| p.set_notifications(user_id, !off, ctx.now))?;
            print_json(&Changed {
                participation,
                event,
            })?;
        }
        ParticipationAction::Summary => {
            let user_id = ctx.user_id()?;
            print_json(&db.summarize_user(user_id)?)?;
        }
    }
    Ok(())
}
