use clap::{Subcommand, ValueEnum};
use habitquest_core::{Database, Event, RewardStatus, RewardTicket, ShippingAddress};
use serde::Serialize;

use super::{print_json, CmdResult, Context};

#[derive(Clone, Copy, ValueEnum)]
pub enum RewardStatusArg {
    Lock,
    Progress,
    Unlock,
    Apply,
    Shipping,
    Delivered,
}

impl From<RewardStatusArg> for RewardStatus {
    fn from(s: RewardStatusArg) -> Self {
        match s {
            RewardStatusArg::Lock => RewardStatus::Lock,
            RewardStatusArg::Progress => RewardStatus::Progress,
            RewardStatusArg::Unlock => RewardStatus::Unlock,
            RewardStatusArg::Apply => RewardStatus::Apply,
            RewardStatusArg::Shipping => RewardStatus::Shipping,
            RewardStatusArg::Delivered => RewardStatus::Delivered,
        }
    }
}

#[derive(Subcommand)]
pub enum RewardAction {
    /// Show the reward ticket of a participation
    Show {
        /// Participation ID
        participation_id: String,
    },
    /// List reward tickets (fulfillment queue)
    List {
        #[arg(long, value_enum)]
        status: Option<RewardStatusArg>,
    },
    /// Claim an unlocked reward with a shipping address
    Apply {
        /// Reward ticket ID
        ticket_id: String,
        #[arg(long)]
        recipient: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        address2: Option<String>,
        #[arg(long, default_value = "")]
        postal_code: String,
        #[arg(long)]
        memo: Option<String>,
    },
    /// Mark a claimed reward as shipped
    Ship { ticket_id: String },
    /// Mark a shipped reward as delivered
    Deliver { ticket_id: String },
}

#[derive(Serialize)]
struct Changed {
    ticket: RewardTicket,
    event: Event,
}

pub fn run(action: RewardAction, ctx: &Context) -> CmdResult {
    let mut db = Database::open()?;

    let (ticket, event) = match action {
        RewardAction::Show { participation_id } => {
            db.get_participation(&participation_id)?;
            let ticket = db
                .reward_for_participation(&participation_id)?
                .ok_or_else(|| format!("no reward ticket for {participation_id}"))?;
            return print_json(&ticket);
        }
        RewardAction::List { status } => {
            return print_json(&db.list_reward_tickets(status.map(Into::into))?);
        }
        RewardAction::Apply {
            ticket_id,
            recipient,
            phone,
            address,
            address2,
            postal_code,
            memo,
        } => {
            let shipping = ShippingAddress {
                recipient,
                phone,
                address_line1: address,
                address_line2: address2,
                postal_code,
                memo,
            };
            db.claim_reward(&ticket_id, ctx.user_id()?, shipping, ctx.now)?
        }
        RewardAction::Ship { ticket_id } => {
            db.update_reward_ticket(&ticket_id, |t| t.ship(ctx.now))?
        }
        RewardAction::Deliver { ticket_id } => {
            db.update_reward_ticket(&ticket_id, |t| t.deliver(ctx.now))?
        }
    };
    print_json(&Changed { ticket, event })
}
