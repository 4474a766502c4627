use chrono::NaiveDate;
use clap::Subcommand;
use habitquest_core::participation::checked_in_today;
use habitquest_core::{CheckIn, Database, VerificationPayload, VerificationType};
use serde::Serialize;

use super::{print_json, CmdResult, Context};

#[derive(Subcommand)]
pub enum CheckinAction {
    /// Submit today's (or a back-dated) check-in
    Submit {
        /// Participation ID
        participation_id: String,
        /// Payload JSON, e.g. '{"type":"simple_check","checked":true}'
        #[arg(long)]
        payload: String,
        /// Date of the check-in (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// List check-ins of a participation
    List {
        /// Participation ID
        participation_id: String,
    },
    /// Which of the acting user's active participations still need a check-in today
    Today,
}

#[derive(Serialize)]
struct TodayEntry {
    participation_id: String,
    campaign_id: String,
    title: String,
    verification_type: VerificationType,
    verification_label: &'static str,
    checked_in: bool,
}

#[derive(Serialize)]
struct CheckInLine {
    #[serde(flatten)]
    check_in: CheckIn,
    summary: String,
}

pub fn run(action: CheckinAction, ctx: &Context) -> CmdResult {
    let mut db = Database::open()?;

    match action {
        CheckinAction::Submit {
            participation_id,
            payload,
            date,
        } => {
            let payload: VerificationPayload = serde_json::from_str(&payload)
                .map_err(|e| format!("invalid payload: {e}"))?;
            let user_id = ctx.user_id()?;
            let date = date.unwrap_or(ctx.today);
            let outcome = db.record_check_in(
                &participation_id,
                user_id,
                payload,
                date,
                ctx.today,
                ctx.now,
            )?;
            print_json(&outcome)?;
        }
        CheckinAction::List { participation_id } => {
            // Surface a missing participation as an error, not an empty list.
            db.get_participation(&participation_id)?;
            let lines: Vec<CheckInLine> = db
                .list_check_ins(&participation_id)?
                .into_iter()
                .map(|check_in| CheckInLine {
                    summary: check_in.payload.summary(),
                    check_in,
                })
                .collect();
            print_json(&lines)?;
        }
        CheckinAction::Today => {
            let user_id = ctx.user_id()?;
            let mut entries = Vec::new();
            for p in db.list_participations(Some(user_id), None)? {
                if !p.is_active() {
                    continue;
                }
                let campaign = db.get_campaign(&p.campaign_id)?;
                if campaign.accepts_check_in(ctx.today, ctx.today).is_err() {
                    continue;
                }
                let check_ins = db.list_check_ins(&p.id)?;
                entries.push(TodayEntry {
                    checked_in: checked_in_today(&check_ins, ctx.today),
                    participation_id: p.id,
                    campaign_id: campaign.id,
                    title: campaign.title,
                    verification_label: campaign.verification_type.label(),
                    verification_type: campaign.verification_type,
                });
            }
            print_json(&entries)?;
        }
    }
    Ok(())
}
