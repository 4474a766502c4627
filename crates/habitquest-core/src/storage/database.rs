//! SQLite-based campaign and participation storage.
//!
//! Provides persistent storage for:
//! - Campaigns, with the participant count kept as an authoritative column
//! - Participations and their daily check-ins
//! - Reward tickets
//!
//! Each row carries indexed key columns plus a JSON snapshot of the domain
//! value. Multi-row operations (joining, checking in, lifecycle transitions)
//! run inside one immediate transaction.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::campaign::{Campaign, CampaignAction, CampaignPatch, CampaignStatus};
use crate::error::{CoreError, DatabaseError, Result, TransitionError};
use crate::events::Event;
use crate::participation::{
    self, CheckIn, CheckInOutcome, CheckInRequest, Joined, Participation, ParticipationSummary,
    SummaryEntry,
};
use crate::reward::{RewardStatus, RewardTicket, ShippingAddress};
use crate::verification::VerificationPayload;

use super::data_dir;

/// SQLite database for HabitQuest state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `<data_dir>/habitquest.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("habitquest.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| DatabaseError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(
                "PRAGMA foreign_keys = ON;

                CREATE TABLE IF NOT EXISTS campaigns (
                    id                TEXT PRIMARY KEY,
                    status            TEXT NOT NULL,
                    start_date        TEXT NOT NULL,
                    end_date          TEXT NOT NULL,
                    participant_count INTEGER NOT NULL DEFAULT 0,
                    data              TEXT NOT NULL,
                    created_at        TEXT NOT NULL,
                    updated_at        TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS participations (
                    id          TEXT PRIMARY KEY,
                    user_id     TEXT NOT NULL,
                    campaign_id TEXT NOT NULL REFERENCES campaigns(id),
                    status      TEXT NOT NULL,
                    data        TEXT NOT NULL,
                    joined_at   TEXT NOT NULL,
                    updated_at  TEXT NOT NULL,
                    UNIQUE(user_id, campaign_id)
                );

                CREATE TABLE IF NOT EXISTS check_ins (
                    id               TEXT PRIMARY KEY,
                    participation_id TEXT NOT NULL REFERENCES participations(id),
                    date             TEXT NOT NULL,
                    data             TEXT NOT NULL,
                    created_at       TEXT NOT NULL,
                    UNIQUE(participation_id, date)
                );

                CREATE TABLE IF NOT EXISTS reward_tickets (
                    id               TEXT PRIMARY KEY,
                    participation_id TEXT NOT NULL UNIQUE REFERENCES participations(id),
                    status           TEXT NOT NULL,
                    data             TEXT NOT NULL,
                    updated_at       TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_campaigns_status ON campaigns(status);
                CREATE INDEX IF NOT EXISTS idx_participations_user ON participations(user_id);
                CREATE INDEX IF NOT EXISTS idx_participations_campaign ON participations(campaign_id);
                CREATE INDEX IF NOT EXISTS idx_reward_tickets_status ON reward_tickets(status);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
    }

    // ── Campaigns ───────────────────────────────────────────────────────

    /// Persist a freshly created campaign.
    pub fn insert_campaign(&self, campaign: &Campaign) -> Result<()> {
        self.conn.execute(
            "INSERT INTO campaigns
                (id, status, start_date, end_date, participant_count, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                campaign.id,
                campaign.status.as_str(),
                campaign.start_date.to_string(),
                campaign.end_date.to_string(),
                campaign.participant_count,
                to_json(campaign)?,
                campaign.created_at.to_rfc3339(),
                campaign.updated_at.to_rfc3339(),
            ],
        )?;
        info!(campaign_id = %campaign.id, "campaign created");
        Ok(())
    }

    pub fn get_campaign(&self, id: &str) -> Result<Campaign> {
        load_campaign(&self.conn, id)
    }

    /// Campaigns ordered by start date, optionally filtered by stored status.
    pub fn list_campaigns(&self, status: Option<CampaignStatus>) -> Result<Vec<Campaign>> {
        let mut stmt = self.conn.prepare(
            "SELECT data, participant_count FROM campaigns
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY start_date, created_at",
        )?;
        let rows = stmt.query_map(params![status.map(|s| s.as_str())], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })?;

        let mut campaigns = Vec::new();
        for row in rows {
            let (data, count) = row?;
            campaigns.push(campaign_from_row(&data, count)?);
        }
        Ok(campaigns)
    }

    /// Apply a lifecycle action atomically.
    ///
    /// The unpublish guard sees the participant count as of this transaction.
    pub fn transition_campaign(
        &mut self,
        id: &str,
        action: CampaignAction,
        now: DateTime<Utc>,
    ) -> Result<(Campaign, Event)> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut campaign = load_campaign(&tx, id)?;
        let event = campaign.apply(action, now)?;
        update_campaign(&tx, &campaign)?;
        tx.commit()?;
        Ok((campaign, event))
    }

    pub fn edit_campaign(
        &mut self,
        id: &str,
        patch: CampaignPatch,
        now: DateTime<Utc>,
    ) -> Result<(Campaign, Event)> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut campaign = load_campaign(&tx, id)?;
        let event = campaign.edit(patch, now)?;
        update_campaign(&tx, &campaign)?;
        tx.commit()?;
        Ok((campaign, event))
    }

    // ── Participations ──────────────────────────────────────────────────

    /// Enroll a user: capacity guard, participation insert, ticket insert and
    /// count increment commit together or not at all.
    pub fn join_campaign(
        &mut self,
        campaign_id: &str,
        user_id: &str,
        notifications_enabled: bool,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Joined> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let campaign = load_campaign(&tx, campaign_id)?;
        let existing = query_participations(&tx, Some(user_id), Some(campaign_id))?;
        let joined =
            participation::join(&campaign, user_id, &existing, notifications_enabled, today, now)?;

        let inserted = insert_participation(&tx, &joined.participation);
        if let Err(CoreError::Database(DatabaseError::ConstraintViolation(_))) = inserted {
            return Err(TransitionError::AlreadyJoined {
                user_id: user_id.to_string(),
                campaign_id: campaign_id.to_string(),
            }
            .into());
        }
        inserted?;
        upsert_reward_ticket(&tx, &joined.ticket)?;
        tx.execute(
            "UPDATE campaigns
             SET participant_count = participant_count + 1, data = ?2, updated_at = ?3
             WHERE id = ?1",
            params![
                campaign_id,
                to_json(&joined.campaign)?,
                now.to_rfc3339()
            ],
        )?;
        tx.commit()?;
        Ok(joined)
    }

    pub fn get_participation(&self, id: &str) -> Result<Participation> {
        load_participation(&self.conn, id)
    }

    /// Participations filtered by user and/or campaign, oldest first.
    pub fn list_participations(
        &self,
        user_id: Option<&str>,
        campaign_id: Option<&str>,
    ) -> Result<Vec<Participation>> {
        query_participations(&self.conn, user_id, campaign_id)
    }

    /// Load a participation, let `f` change it, and persist the result.
    pub fn update_participation<F>(&mut self, id: &str, f: F) -> Result<(Participation, Event)>
    where
        F: FnOnce(&mut Participation) -> Result<Event>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut participation = load_participation(&tx, id)?;
        let event = f(&mut participation)?;
        tx.execute(
            "UPDATE participations SET status = ?2, data = ?3, updated_at = ?4 WHERE id = ?1",
            params![
                participation.id,
                participation.status.to_string(),
                to_json(&participation)?,
                participation.updated_at.to_rfc3339(),
            ],
        )?;
        tx.commit()?;
        Ok((participation, event))
    }

    /// Roll up every participation of `user_id`.
    pub fn summarize_user(&self, user_id: &str) -> Result<ParticipationSummary> {
        let participations = self.list_participations(Some(user_id), None)?;
        let mut loaded = Vec::with_capacity(participations.len());
        for p in &participations {
            let campaign = self.get_campaign(&p.campaign_id)?;
            let ticket = self.reward_for_participation(&p.id)?;
            loaded.push((campaign, ticket));
        }
        let entries: Vec<SummaryEntry<'_>> = participations
            .iter()
            .zip(&loaded)
            .map(|(participation, (campaign, ticket))| SummaryEntry {
                participation,
                campaign,
                ticket: ticket.as_ref(),
            })
            .collect();
        Ok(participation::summarize(user_id, &entries))
    }

    // ── Check-ins ───────────────────────────────────────────────────────

    /// Validate and store one daily check-in, updating the participation's
    /// count and its reward ticket in the same transaction.
    pub fn record_check_in(
        &mut self,
        participation_id: &str,
        user_id: &str,
        payload: VerificationPayload,
        date: NaiveDate,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<CheckInOutcome> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current = load_participation(&tx, participation_id)?;
        let campaign = load_campaign(&tx, &current.campaign_id)?;
        let existing = query_check_ins(&tx, participation_id)?;
        let ticket = query_reward_for_participation(&tx, participation_id)?;

        let outcome = participation::record_check_in(CheckInRequest {
            user_id,
            campaign: &campaign,
            participation: &current,
            existing: &existing,
            ticket: ticket.as_ref(),
            payload,
            date,
            today,
            now,
        })?;

        let inserted = tx.execute(
            "INSERT INTO check_ins (id, participation_id, date, data, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                outcome.check_in.id,
                outcome.check_in.participation_id,
                outcome.check_in.date.to_string(),
                to_json(&outcome.check_in)?,
                outcome.check_in.created_at.to_rfc3339(),
            ],
        );
        match inserted {
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(CoreError::DuplicateCheckIn {
                    participation_id: participation_id.to_string(),
                    date,
                });
            }
            other => {
                other?;
            }
        }

        tx.execute(
            "UPDATE participations SET status = ?2, data = ?3, updated_at = ?4 WHERE id = ?1",
            params![
                outcome.participation.id,
                outcome.participation.status.to_string(),
                to_json(&outcome.participation)?,
                outcome.participation.updated_at.to_rfc3339(),
            ],
        )?;
        upsert_reward_ticket(&tx, &outcome.ticket)?;
        tx.commit()?;
        Ok(outcome)
    }

    /// Check-ins of one participation, ordered by date.
    pub fn list_check_ins(&self, participation_id: &str) -> Result<Vec<CheckIn>> {
        query_check_ins(&self.conn, participation_id)
    }

    // ── Reward tickets ──────────────────────────────────────────────────

    pub fn get_reward_ticket(&self, id: &str) -> Result<RewardTicket> {
        let data = self
            .conn
            .query_row(
                "SELECT data FROM reward_tickets WHERE id = ?1",
                params![id],
                |row| row.get::<_, String>(0),
            )
            .optional()?
            .ok_or_else(|| CoreError::not_found("reward ticket", id))?;
        from_json(&data)
    }

    pub fn reward_for_participation(&self, participation_id: &str) -> Result<Option<RewardTicket>> {
        query_reward_for_participation(&self.conn, participation_id)
    }

    pub fn list_reward_tickets(&self, status: Option<RewardStatus>) -> Result<Vec<RewardTicket>> {
        let mut stmt = self.conn.prepare(
            "SELECT data FROM reward_tickets
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY updated_at",
        )?;
        let rows = stmt.query_map(params![status.map(|s| s.as_str())], |row| {
            row.get::<_, String>(0)
        })?;
        let mut tickets = Vec::new();
        for row in rows {
            tickets.push(from_json(&row?)?);
        }
        Ok(tickets)
    }

    /// Load a ticket, let `f` move it through its lifecycle, and persist it.
    pub fn update_reward_ticket<F>(&mut self, id: &str, f: F) -> Result<(RewardTicket, Event)>
    where
        F: FnOnce(&mut RewardTicket) -> Result<Event>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut ticket = load_reward_ticket(&tx, id)?;
        let event = f(&mut ticket)?;
        upsert_reward_ticket(&tx, &ticket)?;
        tx.commit()?;
        Ok((ticket, event))
    }

    /// Claim an unlocked reward on behalf of `user_id`, who must own the
    /// participation the ticket belongs to.
    pub fn claim_reward(
        &mut self,
        ticket_id: &str,
        user_id: &str,
        shipping: ShippingAddress,
        now: DateTime<Utc>,
    ) -> Result<(RewardTicket, Event)> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut ticket = load_reward_ticket(&tx, ticket_id)?;
        load_participation(&tx, &ticket.participation_id)?.ensure_owner(user_id)?;
        let event = ticket.apply(shipping, now)?;
        upsert_reward_ticket(&tx, &ticket)?;
        tx.commit()?;
        Ok((ticket, event))
    }
}

// ── Row helpers ─────────────────────────────────────────────────────────

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

fn from_json<T: DeserializeOwned>(data: &str) -> Result<T> {
    Ok(serde_json::from_str(data)?)
}

fn campaign_from_row(data: &str, participant_count: u32) -> Result<Campaign> {
    let mut campaign: Campaign = from_json(data)?;
    campaign.participant_count = participant_count;
    Ok(campaign)
}

fn load_campaign(conn: &Connection, id: &str) -> Result<Campaign> {
    let (data, count) = conn
        .query_row(
            "SELECT data, participant_count FROM campaigns WHERE id = ?1",
            params![id],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)),
        )
        .optional()?
        .ok_or_else(|| CoreError::not_found("campaign", id))?;
    campaign_from_row(&data, count)
}

/// Writes the snapshot; the participant count column is left alone.
fn update_campaign(conn: &Connection, campaign: &Campaign) -> Result<()> {
    conn.execute(
        "UPDATE campaigns
         SET status = ?2, start_date = ?3, end_date = ?4, data = ?5, updated_at = ?6
         WHERE id = ?1",
        params![
            campaign.id,
            campaign.status.as_str(),
            campaign.start_date.to_string(),
            campaign.end_date.to_string(),
            to_json(campaign)?,
            campaign.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn load_participation(conn: &Connection, id: &str) -> Result<Participation> {
    let data = conn
        .query_row(
            "SELECT data FROM participations WHERE id = ?1",
            params![id],
            |row| row.get::<_, String>(0),
        )
        .optional()?
        .ok_or_else(|| CoreError::not_found("participation", id))?;
    from_json(&data)
}

fn query_participations(
    conn: &Connection,
    user_id: Option<&str>,
    campaign_id: Option<&str>,
) -> Result<Vec<Participation>> {
    let mut stmt = conn.prepare(
        "SELECT data FROM participations
         WHERE (?1 IS NULL OR user_id = ?1) AND (?2 IS NULL OR campaign_id = ?2)
         ORDER BY joined_at",
    )?;
    let rows = stmt.query_map(params![user_id, campaign_id], |row| row.get::<_, String>(0))?;
    let mut participations = Vec::new();
    for row in rows {
        participations.push(from_json(&row?)?);
    }
    Ok(participations)
}

fn insert_participation(conn: &Connection, participation: &Participation) -> Result<()> {
    conn.execute(
        "INSERT INTO participations (id, user_id, campaign_id, status, data, joined_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            participation.id,
            participation.user_id,
            participation.campaign_id,
            participation.status.to_string(),
            to_json(participation)?,
            participation.joined_at.to_rfc3339(),
            participation.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn query_check_ins(conn: &Connection, participation_id: &str) -> Result<Vec<CheckIn>> {
    let mut stmt = conn.prepare(
        "SELECT data FROM check_ins WHERE participation_id = ?1 ORDER BY date",
    )?;
    let rows = stmt.query_map(params![participation_id], |row| row.get::<_, String>(0))?;
    let mut check_ins = Vec::new();
    for row in rows {
        check_ins.push(from_json(&row?)?);
    }
    Ok(check_ins)
}

fn load_reward_ticket(conn: &Connection, id: &str) -> Result<RewardTicket> {
    let data = conn
        .query_row(
            "SELECT data FROM reward_tickets WHERE id = ?1",
            params![id],
            |row| row.get::<_, String>(0),
        )
        .optional()?
        .ok_or_else(|| CoreError::not_found("reward ticket", id))?;
    from_json(&data)
}

fn query_reward_for_participation(
    conn: &Connection,
    participation_id: &str,
) -> Result<Option<RewardTicket>> {
    let data = conn
        .query_row(
            "SELECT data FROM reward_tickets WHERE participation_id = ?1",
            params![participation_id],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    data.map(|d| from_json(&d)).transpose()
}

fn upsert_reward_ticket(conn: &Connection, ticket: &RewardTicket) -> Result<()> {
    conn.execute(
        "INSERT INTO reward_tickets (id, participation_id, status, data, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO UPDATE SET
            status = excluded.status,
            data = excluded.data,
            updated_at = excluded.updated_at",
        params![
            ticket.id,
            ticket.participation_id,
            ticket.status.as_str(),
            to_json(ticket)?,
            ticket.updated_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::tests::{d, now, sample_new_campaign};
    use crate::error::ErrorKind;
    use chrono::Duration;

    fn published(db: &mut Database) -> Campaign {
        let campaign = Campaign::create(sample_new_campaign(), now()).unwrap();
        db.insert_campaign(&campaign).unwrap();
        let (campaign, _) = db
            .transition_campaign(&campaign.id, CampaignAction::Publish, now())
            .unwrap();
        campaign
    }

    fn check() -> VerificationPayload {
        VerificationPayload::SimpleCheck { checked: true }
    }

    #[test]
    fn campaign_roundtrips_through_snapshot() {
        let db = Database::open_memory().unwrap();
        let campaign = Campaign::create(sample_new_campaign(), now()).unwrap();
        db.insert_campaign(&campaign).unwrap();
        assert_eq!(db.get_campaign(&campaign.id).unwrap(), campaign);
        assert_eq!(
            db.get_campaign("campaign-missing").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn list_filters_by_stored_status() {
        let mut db = Database::open_memory().unwrap();
        published(&mut db);
        let draft = Campaign::create(sample_new_campaign(), now()).unwrap();
        db.insert_campaign(&draft).unwrap();

        assert_eq!(db.list_campaigns(None).unwrap().len(), 2);
        let drafts = db.list_campaigns(Some(CampaignStatus::Draft)).unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].id, draft.id);
    }

    #[test]
    fn join_increments_count_and_creates_locked_ticket() {
        let mut db = Database::open_memory().unwrap();
        let campaign = published(&mut db);
        let joined = db
            .join_campaign(&campaign.id, "user-1", true, d(2026, 2, 25), now())
            .unwrap();

        assert_eq!(db.get_campaign(&campaign.id).unwrap().participant_count, 1);
        let ticket = db
            .reward_for_participation(&joined.participation.id)
            .unwrap()
            .unwrap();
        assert_eq!(ticket.status, RewardStatus::Lock);

        let err = db
            .join_campaign(&campaign.id, "user-1", true, d(2026, 2, 25), now())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert_eq!(db.get_campaign(&campaign.id).unwrap().participant_count, 1);
    }

    #[test]
    fn unpublish_sees_persisted_participants() {
        let mut db = Database::open_memory().unwrap();
        let campaign = published(&mut db);
        db.join_campaign(&campaign.id, "user-1", false, d(2026, 2, 25), now())
            .unwrap();

        let err = db
            .transition_campaign(&campaign.id, CampaignAction::Unpublish, now())
            .unwrap_err();
        assert_eq!(err.to_string(), "cannot unpublish: 1 active participants");
        assert_eq!(
            db.get_campaign(&campaign.id).unwrap().status,
            CampaignStatus::Published
        );
    }

    #[test]
    fn check_in_updates_participation_and_ticket() {
        let mut db = Database::open_memory().unwrap();
        let campaign = published(&mut db);
        let joined = db
            .join_campaign(&campaign.id, "user-1", true, d(2026, 2, 25), now())
            .unwrap();
        let pid = joined.participation.id;

        let outcome = db
            .record_check_in(&pid, "user-1", check(), d(2026, 3, 1), d(2026, 3, 1), now())
            .unwrap();
        assert_eq!(outcome.participation.completed_count, 1);

        assert_eq!(db.get_participation(&pid).unwrap().completed_count, 1);
        assert_eq!(db.list_check_ins(&pid).unwrap().len(), 1);
        let ticket = db.reward_for_participation(&pid).unwrap().unwrap();
        assert_eq!(ticket.status, RewardStatus::Progress);
    }

    #[test]
    fn second_check_in_same_day_is_duplicate() {
        let mut db = Database::open_memory().unwrap();
        let campaign = published(&mut db);
        let pid = db
            .join_campaign(&campaign.id, "user-1", true, d(2026, 2, 25), now())
            .unwrap()
            .participation
            .id;

        db.record_check_in(&pid, "user-1", check(), d(2026, 3, 2), d(2026, 3, 2), now())
            .unwrap();
        let err = db
            .record_check_in(
                &pid,
                "user-1",
                check(),
                d(2026, 3, 2),
                d(2026, 3, 2),
                now() + Duration::hours(1),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateCheckIn);
        assert_eq!(db.get_participation(&pid).unwrap().completed_count, 1);
    }

    #[test]
    fn failed_check_in_leaves_no_trace() {
        let mut db = Database::open_memory().unwrap();
        let campaign = published(&mut db);
        let pid = db
            .join_campaign(&campaign.id, "user-1", true, d(2026, 2, 25), now())
            .unwrap()
            .participation
            .id;

        let err = db
            .record_check_in(
                &pid,
                "user-1",
                VerificationPayload::SimpleCheck { checked: false },
                d(2026, 3, 1),
                d(2026, 3, 1),
                now(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(db.list_check_ins(&pid).unwrap().is_empty());
    }

    #[test]
    fn reward_ticket_lifecycle_is_persisted() {
        let mut db = Database::open_memory().unwrap();
        let campaign = published(&mut db);
        let pid = db
            .join_campaign(&campaign.id, "user-1", true, d(2026, 2, 25), now())
            .unwrap()
            .participation
            .id;
        for day in 1..=27 {
            db.record_check_in(&pid, "user-1", check(), d(2026, 3, day), d(2026, 3, day), now())
                .unwrap();
        }
        let ticket = db.reward_for_participation(&pid).unwrap().unwrap();
        assert_eq!(ticket.status, RewardStatus::Unlock);

        let address = ShippingAddress {
            recipient: "Kim".into(),
            phone: "010-0000-0000".into(),
            address_line1: "1 Main St".into(),
            address_line2: None,
            postal_code: "12345".into(),
            memo: None,
        };
        let err = db
            .claim_reward(&ticket.id, "user-2", address.clone(), now())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        assert_eq!(
            db.reward_for_participation(&pid).unwrap().unwrap().status,
            RewardStatus::Unlock
        );

        let (ticket, _) = db
            .claim_reward(&ticket.id, "user-1", address, now())
            .unwrap();
        assert_eq!(ticket.status, RewardStatus::Apply);
        assert_eq!(
            db.list_reward_tickets(Some(RewardStatus::Apply)).unwrap().len(),
            1
        );

        let summary = db.summarize_user("user-1").unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.rewards_claimed, 1);
        assert_eq!(summary.total_check_ins, 27);
    }

    #[test]
    fn abandon_is_persisted() {
        let mut db = Database::open_memory().unwrap();
        let campaign = published(&mut db);
        let pid = db
            .join_campaign(&campaign.id, "user-1", true, d(2026, 2, 25), now())
            .unwrap()
            .participation
            .id;
        db.update_participation(&pid, |p| p.abandon("user-1", now())).unwrap();

        let err = db
            .record_check_in(&pid, "user-1", check(), d(2026, 3, 1), d(2026, 3, 1), now())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[test]
    fn other_users_cannot_touch_a_participation() {
        let mut db = Database::open_memory().unwrap();
        let campaign = published(&mut db);
        let pid = db
            .join_campaign(&campaign.id, "alice", true, d(2026, 2, 25), now())
            .unwrap()
            .participation
            .id;

        let err = db
            .record_check_in(&pid, "mallory", check(), d(2026, 3, 1), d(2026, 3, 1), now())
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Transition(TransitionError::NotOwner { .. })
        ));
        assert!(db.list_check_ins(&pid).unwrap().is_empty());

        let err = db
            .update_participation(&pid, |p| p.abandon("mallory", now()))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
        let stored = db.get_participation(&pid).unwrap();
        assert!(stored.is_active());
        assert_eq!(stored.completed_count, 0);
    }
}
