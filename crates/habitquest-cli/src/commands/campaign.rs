use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use habitquest_core::campaign::CampaignAction as LifecycleAction;
use habitquest_core::{
    Campaign, CampaignPatch, CampaignStatus, Cadence, Database, Difficulty, Event, NewCampaign,
    RewardDefinition, VerificationConfig, VerificationType,
};
use serde::Serialize;

use super::{print_json, CmdResult, Context};

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Draft,
    Published,
    Active,
    Ended,
}

impl From<StatusArg> for CampaignStatus {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::Draft => CampaignStatus::Draft,
            StatusArg::Published => CampaignStatus::Published,
            StatusArg::Active => CampaignStatus::Active,
            StatusArg::Ended => CampaignStatus::Ended,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DifficultyArg {
    Easy,
    Normal,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(d: DifficultyArg) -> Self {
        match d {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Normal => Difficulty::Normal,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

#[derive(Subcommand)]
pub enum CampaignAction {
    /// Create a draft campaign
    Create {
        /// Campaign title
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        emoji: Option<String>,
        #[arg(long, value_enum, default_value = "normal")]
        difficulty: DifficultyArg,
        #[arg(long)]
        featured: bool,
        /// First day (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,
        /// Required check-ins
        #[arg(long)]
        target: u32,
        /// time_record | text_input | photo_upload | counter_input | simple_check | receipt_record
        #[arg(long)]
        verification: VerificationType,
        /// Check-ins per week; enables weekly cadence
        #[arg(long)]
        weekly_target: Option<u32>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        placeholder: Option<String>,
        #[arg(long)]
        min_value: Option<i64>,
        #[arg(long)]
        max_value: Option<i64>,
        /// Percentage shown as the campaign's goal (1-100)
        #[arg(long, default_value_t = 80)]
        achievement_rate: u8,
        #[arg(long)]
        reward_name: String,
        #[arg(long, default_value = "")]
        reward_description: String,
        #[arg(long, default_value = "general")]
        reward_category: String,
        #[arg(long)]
        reward_brand: Option<String>,
        #[arg(long)]
        max_participants: Option<u32>,
    },
    /// Edit a campaign; only cosmetic fields once published
    Edit {
        /// Campaign ID
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        emoji: Option<String>,
        #[arg(long, value_enum)]
        difficulty: Option<DifficultyArg>,
        #[arg(long)]
        featured: Option<bool>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long)]
        target: Option<u32>,
        #[arg(long)]
        achievement_rate: Option<u8>,
        /// Full patch as JSON; individual flags are applied on top
        #[arg(long)]
        patch: Option<String>,
    },
    /// Publish a draft
    Publish { id: String },
    /// Return a published campaign to draft (no participants allowed)
    Unpublish { id: String },
    /// Mark a published campaign active
    Activate { id: String },
    /// End a campaign
    End { id: String },
    /// List campaigns
    List {
        /// Filter by stored status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
    },
    /// Show one campaign
    Show { id: String },
}

/// Campaign as seen on a given day.
#[derive(Serialize)]
struct CampaignView {
    #[serde(flatten)]
    campaign: Campaign,
    effective_status: CampaignStatus,
    total_days: u32,
    remaining_days: u32,
    remaining_capacity: Option<u32>,
    /// Admin actions the stored status allows
    actions: &'static [LifecycleAction],
    terminal: bool,
}

impl CampaignView {
    fn new(campaign: Campaign, ctx: &Context) -> Self {
        Self {
            effective_status: campaign.effective_status(ctx.today),
            total_days: campaign.total_days(),
            remaining_days: campaign.remaining_days(ctx.today),
            remaining_capacity: campaign.remaining_capacity(),
            actions: campaign.status.valid_actions(),
            terminal: campaign.status.is_terminal(),
            campaign,
        }
    }
}

#[derive(Serialize)]
struct Changed {
    campaign: Campaign,
    event: Event,
}

pub fn run(action: CampaignAction, ctx: &Context) -> CmdResult {
    let mut db = Database::open()?;

    match action {
        CampaignAction::Create {
            title,
            description,
            emoji,
            difficulty,
            featured,
            start,
            end,
            target,
            verification,
            weekly_target,
            unit,
            placeholder,
            min_value,
            max_value,
            achievement_rate,
            reward_name,
            reward_description,
            reward_category,
            reward_brand,
            max_participants,
        } => {
            let cadence = match weekly_target {
                Some(weekly_target) => Cadence::Weekly { weekly_target },
                None => Cadence::Daily,
            };
            let new = NewCampaign {
                title,
                description,
                emoji,
                difficulty: difficulty.into(),
                featured,
                start_date: start,
                end_date: end,
                target_count: target,
                verification_type: verification,
                verification_config: VerificationConfig {
                    cadence,
                    placeholder,
                    unit,
                    min_value,
                    max_value,
                },
                achievement_rate,
                reward: RewardDefinition {
                    name: reward_name,
                    description: reward_description,
                    category: reward_category,
                    brand: reward_brand,
                    image_url: None,
                },
                max_participants,
            };
            let campaign = Campaign::create(new, ctx.now)?;
            db.insert_campaign(&campaign)?;
            print_json(&CampaignView::new(campaign, ctx))?;
        }
        CampaignAction::Edit {
            id,
            title,
            description,
            emoji,
            difficulty,
            featured,
            start,
            end,
            target,
            achievement_rate,
            patch,
        } => {
            let mut p: CampaignPatch = match patch {
                Some(json) => serde_json::from_str(&json)?,
                None => CampaignPatch::default(),
            };
            p.title = title.or(p.title);
            p.description = description.or(p.description);
            p.emoji = emoji.or(p.emoji);
            p.difficulty = difficulty.map(Into::into).or(p.difficulty);
            p.featured = featured.or(p.featured);
            p.start_date = start.or(p.start_date);
            p.end_date = end.or(p.end_date);
            p.target_count = target.or(p.target_count);
            p.achievement_rate = achievement_rate.or(p.achievement_rate);

            let (campaign, event) = db.edit_campaign(&id, p, ctx.now)?;
            print_json(&Changed { campaign, event })?;
        }
        CampaignAction::Publish { id } => transition(&mut db, &id, LifecycleAction::Publish, ctx)?,
        CampaignAction::Unpublish { id } => {
            transition(&mut db, &id, LifecycleAction::Unpublish, ctx)?
        }
        CampaignAction::Activate { id } => {
            transition(&mut db, &id, LifecycleAction::Activate, ctx)?
        }
        CampaignAction::End { id } => transition(&mut db, &id, LifecycleAction::End, ctx)?,
        CampaignAction::List { status } => {
            let views: Vec<CampaignView> = db
                .list_campaigns(status.map(Into::into))?
                .into_iter()
                .map(|c| CampaignView::new(c, ctx))
                .collect();
            print_json(&views)?;
        }
        CampaignAction::Show { id } => {
            let campaign = db.get_campaign(&id)?;
            print_json(&CampaignView::new(campaign, ctx))?;
        }
    }
    Ok(())
}

fn transition(db: &mut Database, id: &str, action: LifecycleAction, ctx: &Context) -> CmdResult {
    let (campaign, event) = db.transition_campaign(id, action, ctx.now)?;
    print_json(&Changed { campaign, event })
}
