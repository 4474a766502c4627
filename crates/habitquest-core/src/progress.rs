//! Progress calculation.
//!
//! Pure functions turning a count of verified check-ins into a 0-100
//! percentage, plus streak and "can this still be finished" helpers.
//! Nothing here holds state.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::verification::Cadence;

/// Percentage of `target` reached by `completed`, one decimal place,
/// capped at 100. A zero target yields 0.
pub fn calculate_progress(completed: u32, target: u32) -> f64 {
    if target == 0 {
        return 0.0;
    }
    let pct = completed as f64 / target as f64 * 100.0;
    round1(pct).min(100.0)
}

/// Number of check-ins needed to finish a campaign of `target_count` days.
///
/// Weekly cadence counts every started week: 14 days at 3 per week is 6.
pub fn effective_target(target_count: u32, cadence: &Cadence) -> u32 {
    match cadence {
        Cadence::Daily => target_count,
        Cadence::Weekly { weekly_target } => {
            target_count.div_ceil(7).saturating_mul(*weekly_target)
        }
    }
}

/// Progress against the cadence-adjusted target.
pub fn campaign_progress(completed: u32, target_count: u32, cadence: &Cadence) -> f64 {
    calculate_progress(completed, effective_target(target_count, cadence))
}

/// Check-ins still possible in `remaining_days`.
pub fn remaining_possible(remaining_days: u32, cadence: &Cadence) -> u32 {
    match cadence {
        Cadence::Daily => remaining_days,
        Cadence::Weekly { weekly_target } => {
            remaining_days.div_ceil(7).saturating_mul(*weekly_target)
        }
    }
}

/// Whether `target` can still be reached in the days left.
pub fn is_achievable(completed: u32, target: u32, remaining_days: u32, cadence: &Cadence) -> bool {
    target.saturating_sub(completed) <= remaining_possible(remaining_days, cadence)
}

/// Consecutive days ending at the most recent check-in date.
pub fn current_streak(dates: &[NaiveDate]) -> u32 {
    let days = sorted_unique(dates);
    let Some(&last) = days.last() else {
        return 0;
    };

    let mut streak = 1;
    let mut expected = last;
    for &day in days.iter().rev().skip(1) {
        match expected.pred_opt() {
            Some(prev) if prev == day => {
                streak += 1;
                expected = day;
            }
            _ => break,
        }
    }
    streak
}

/// Longest run of consecutive days anywhere in `dates`.
pub fn longest_streak(dates: &[NaiveDate]) -> u32 {
    let days = sorted_unique(dates);
    let mut best = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for day in days {
        run = match previous.and_then(|p| p.succ_opt()) {
            Some(next) if next == day => run + 1,
            _ => 1,
        };
        best = best.max(run);
        previous = Some(day);
    }
    best
}

fn sorted_unique(dates: &[NaiveDate]) -> Vec<NaiveDate> {
    let mut days = dates.to_vec();
    days.sort_unstable();
    days.dedup();
    days
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Fixed encouragement bands over the progress percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressBand {
    /// exactly 0
    NotStarted,
    /// below 25
    GettingStarted,
    /// below 50
    Building,
    /// below 75
    Halfway,
    /// below 90
    AlmostThere,
    /// below 100
    FinalStretch,
    /// 100
    Complete,
}

impl ProgressBand {
    pub fn from_progress(progress: f64) -> Self {
        if progress <= 0.0 {
            ProgressBand::NotStarted
        } else if progress < 25.0 {
            ProgressBand::GettingStarted
        } else if progress < 50.0 {
            ProgressBand::Building
        } else if progress < 75.0 {
            ProgressBand::Halfway
        } else if progress < 90.0 {
            ProgressBand::AlmostThere
        } else if progress < 100.0 {
            ProgressBand::FinalStretch
        } else {
            ProgressBand::Complete
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ProgressBand::NotStarted => "Ready when you are. Make your first check-in!",
            ProgressBand::GettingStarted => "Good start. Keep the rhythm going.",
            ProgressBand::Building => "The habit is taking shape.",
            ProgressBand::Halfway => "Past the halfway mark. Nice work!",
            ProgressBand::AlmostThere => "Almost there. The reward is in sight.",
            ProgressBand::FinalStretch => "Final stretch. Your reward is unlocked!",
            ProgressBand::Complete => "Challenge complete. Congratulations!",
        }
    }
}

/// Dashboard view of one participation's progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub completed: u32,
    /// Cadence-adjusted target
    pub target: u32,
    pub progress: f64,
    pub band: ProgressBand,
    pub message: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub remaining_days: u32,
    pub achievable: bool,
    /// Campaign's own achievement rate (display and messaging only)
    pub achievement_rate: u8,
    pub meets_achievement_rate: bool,
}

impl ProgressReport {
    pub fn evaluate(
        completed: u32,
        target_count: u32,
        cadence: &Cadence,
        remaining_days: u32,
        achievement_rate: u8,
        check_in_dates: &[NaiveDate],
    ) -> Self {
        let target = effective_target(target_count, cadence);
        let progress = calculate_progress(completed, target);
        let band = ProgressBand::from_progress(progress);
        Self {
            completed,
            target,
            progress,
            band,
            message: band.message().to_string(),
            current_streak: current_streak(check_in_dates),
            longest_streak: longest_streak(check_in_dates),
            remaining_days,
            achievable: is_achievable(completed, target, remaining_days, cadence),
            achievement_rate,
            meets_achievement_rate: progress >= f64::from(achievement_rate),
        }
    }
}
