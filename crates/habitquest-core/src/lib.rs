//! # HabitQuest Core Library
//!
//! This library provides the core business logic for HabitQuest, a habit-building
//! challenge platform: admins publish time-boxed campaigns, users join them and
//! submit one verified check-in per day, and a physical reward unlocks once a
//! participant's progress reaches the unlock threshold.
//!
//! Everything is available through the standalone `habitquest` CLI, which is a
//! thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Campaign lifecycle**: `draft -> published -> active -> ended` state machine
//!   with participant and edit guards
//! - **Verification**: Typed check-in payloads validated against the campaign's
//!   verification type and config
//! - **Progress engine**: Pure functions for percentages, streaks and milestone bands
//! - **Rewards**: Ticket lifecycle from lock to delivered
//! - **Storage**: SQLite-based persistence and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Campaign`]: Campaign state machine
//! - [`participation::join`] / [`participation::record_check_in`]: Orchestration
//! - [`RewardTicket`]: Reward fulfillment state machine
//! - [`Database`]: Transactional persistence
//! - [`Config`]: Application configuration management

pub mod campaign;
pub mod error;
pub mod events;
pub mod participation;
pub mod progress;
pub mod reward;
pub mod storage;
pub mod verification;

pub use campaign::{
    derive_effective_status, Campaign, CampaignAction, CampaignPatch, CampaignStatus, Difficulty,
    NewCampaign, RewardDefinition,
};
pub use error::{ConfigError, CoreError, DatabaseError, ErrorKind, TransitionError, ValidationError};
pub use events::Event;
pub use participation::{
    CheckIn, CheckInOutcome, Participation, ParticipationStatus, ParticipationSummary,
};
pub use progress::{calculate_progress, ProgressBand, ProgressReport};
pub use reward::{RewardEligibility, RewardStatus, RewardTicket, ShippingAddress};
pub use storage::{Config, Database};
pub use verification::{Cadence, VerificationConfig, VerificationPayload, VerificationType};
