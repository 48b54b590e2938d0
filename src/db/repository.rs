//! Database repository for all data operations.
//!
//! Uses prepared statements and transactions for data integrity.

use chrono::{Duration, Utc};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    Datastore, FoundItemRecord, FoundStatus, LogFoundItemRequest, LostItemReport, LostStatus,
    ReportLostItemRequest, RevisionInfo, Role, UserAccount,
};

/// Green points earned by a student for filing a lost item report.
pub const POINTS_FOR_REPORT: i64 = 5;

/// Green points earned by a student when a claim recovers one of their
/// reported lost items.
pub const POINTS_FOR_RECOVERY: i64 = 15;

/// Everything a successful claim changed.
#[derive(Debug, Clone)]
pub struct ClaimEffects {
    pub item: FoundItemRecord,
    pub matched_lost_item_id: Option<String>,
    pub points_awarded: i64,
}

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Increment the revision ID and return the new value.
    pub async fn increment_revision(&self) -> Result<i64, AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(&now)
            .execute(&self.pool)
            .await?;
        self.get_revision_id().await
    }

    /// Get the full datastore snapshot.
    pub async fn get_datastore(&self) -> Result<Datastore, AppError> {
        let meta =
            sqlx::query("SELECT schema_version, revision_id, generated_at FROM meta WHERE id = 1")
                .fetch_one(&self.pool)
                .await?;

        let users = self
            .list_accounts()
            .await?
            .iter()
            .map(|a| a.to_public())
            .collect();
        let lost_items = self.list_lost_items().await?;
        let found_items = self.list_found_items().await?;

        Ok(Datastore {
            schema_version: meta.get("schema_version"),
            revision_id: meta.get("revision_id"),
            generated_at: meta.get("generated_at"),
            users,
            lost_items,
            found_items,
        })
    }

    // ==================== USER OPERATIONS ====================

    /// List all accounts.
    pub async fn list_accounts(&self) -> Result<Vec<UserAccount>, AppError> {
        let rows = sqlx::query(
            "SELECT id, email, name, role, room_number, green_points, password_hash FROM users ORDER BY name"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(account_from_row).collect())
    }

    /// Get an account by ID.
    pub async fn get_account(&self, id: &str) -> Result<Option<UserAccount>, AppError> {
        let row = sqlx::query(
            "SELECT id, email, name, role, room_number, green_points, password_hash FROM users WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(account_from_row))
    }

    /// Find an account by email.
    pub async fn find_account_by_email(&self, email: &str) -> Result<Option<UserAccount>, AppError> {
        let row = sqlx::query(
            "SELECT id, email, name, role, room_number, green_points, password_hash FROM users WHERE email = ?"
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(account_from_row))
    }

    /// Create a new account. Fails with a conflict if the email is taken.
    pub async fn create_account(
        &self,
        email: &str,
        name: &str,
        role: Role,
        room_number: Option<String>,
        password_hash: &str,
    ) -> Result<UserAccount, AppError> {
        if self.find_account_by_email(email).await?.is_some() {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        // Students always carry a room and a point balance
        let room_number = match role {
            Role::Student => Some(room_number.unwrap_or_else(|| "A-101".to_string())),
            _ => None,
        };
        let green_points = match role {
            Role::Student => Some(0i64),
            _ => None,
        };

        sqlx::query(
            "INSERT INTO users (id, email, name, role, room_number, green_points, password_hash, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
        )
        .bind(&id)
        .bind(email)
        .bind(name)
        .bind(role.as_str())
        .bind(&room_number)
        .bind(green_points)
        .bind(password_hash)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;

        Ok(UserAccount {
            id,
            email: email.to_string(),
            name: name.to_string(),
            role,
            room_number,
            green_points,
            password_hash: password_hash.to_string(),
        })
    }

    /// Add points to a student balance and return the new total. Awards are
    /// clamped so the balance never goes negative.
    pub async fn award_points(&self, user_id: &str, delta: i64) -> Result<i64, AppError> {
        sqlx::query(
            "UPDATE users SET green_points = MAX(COALESCE(green_points, 0) + ?, 0) WHERE id = ? AND role = 'student'"
        )
        .bind(delta)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;

        let account = self
            .get_account(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        Ok(account.green_points.unwrap_or(0))
    }

    // ==================== SESSION OPERATIONS ====================

    /// Create a session for a user and return the opaque token.
    pub async fn create_session(&self, user_id: &str) -> Result<String, AppError> {
        let token = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)")
            .bind(&token)
            .bind(user_id)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        Ok(token)
    }

    /// Resolve a session token to its account.
    pub async fn get_session_user(&self, token: &str) -> Result<Option<UserAccount>, AppError> {
        let row = sqlx::query(
            r#"SELECT u.id, u.email, u.name, u.role, u.room_number, u.green_points, u.password_hash
               FROM sessions s JOIN users u ON u.id = s.user_id
               WHERE s.token = ?"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(account_from_row))
    }

    /// Delete a session (logout). Unknown tokens are a no-op.
    pub async fn delete_session(&self, token: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    // ==================== LOST ITEM OPERATIONS ====================

    /// List all lost item reports.
    pub async fn list_lost_items(&self) -> Result<Vec<LostItemReport>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, description, location, date_lost, image_url, user_id, user_name, user_email, status, date_reported FROM lost_items ORDER BY date_reported DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(lost_item_from_row).collect())
    }

    /// List lost item reports filed by a user.
    pub async fn list_lost_items_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<LostItemReport>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, description, location, date_lost, image_url, user_id, user_name, user_email, status, date_reported FROM lost_items WHERE user_id = ? ORDER BY date_reported DESC"
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(lost_item_from_row).collect())
    }

    /// Get a lost item report by ID.
    pub async fn get_lost_item(&self, id: &str) -> Result<Option<LostItemReport>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, description, location, date_lost, image_url, user_id, user_name, user_email, status, date_reported FROM lost_items WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(lost_item_from_row))
    }

    /// File a new lost item report for the given account.
    pub async fn create_lost_item(
        &self,
        reporter: &UserAccount,
        request: &ReportLostItemRequest,
    ) -> Result<LostItemReport, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO lost_items (
                id, name, description, location, date_lost, image_url,
                user_id, user_name, user_email, status, date_reported
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.location)
        .bind(&request.date_lost)
        .bind(&request.image_url)
        .bind(&reporter.id)
        .bind(&reporter.name)
        .bind(&reporter.email)
        .bind(LostStatus::NotFound.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;

        Ok(LostItemReport {
            id,
            name: request.name.clone(),
            description: request.description.clone(),
            location: request.location.clone(),
            date_lost: request.date_lost.clone(),
            image_url: request.image_url.clone(),
            user_id: reporter.id.clone(),
            user_name: reporter.name.clone(),
            user_email: reporter.email.clone(),
            status: LostStatus::NotFound,
            date_reported: now,
        })
    }

    /// Advance a lost report's status. Reverse transitions are rejected.
    pub async fn advance_lost_status(
        &self,
        id: &str,
        next: LostStatus,
    ) -> Result<LostItemReport, AppError> {
        let existing = self
            .get_lost_item(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lost item {} not found", id)))?;

        if !existing.status.can_advance_to(next) {
            return Err(AppError::Conflict(format!(
                "Lost item {} cannot move from {} to {}",
                id,
                existing.status.as_str(),
                next.as_str()
            )));
        }

        sqlx::query("UPDATE lost_items SET status = ? WHERE id = ?")
            .bind(next.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        self.increment_revision().await?;

        Ok(LostItemReport {
            status: next,
            ..existing
        })
    }

    // ==================== FOUND ITEM OPERATIONS ====================

    /// List all found item records.
    pub async fn list_found_items(&self) -> Result<Vec<FoundItemRecord>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, description, location, date_found, image_url, status, staff_id, staff_name, claimed_by, claimed_at FROM found_items ORDER BY date_found DESC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(found_item_from_row).collect())
    }

    /// Get a found item by ID.
    pub async fn get_found_item(&self, id: &str) -> Result<Option<FoundItemRecord>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, description, location, date_found, image_url, status, staff_id, staff_name, claimed_by, claimed_at FROM found_items WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(found_item_from_row))
    }

    /// Log a new found item at the desk.
    pub async fn create_found_item(
        &self,
        staff: &UserAccount,
        request: &LogFoundItemRequest,
    ) -> Result<FoundItemRecord, AppError> {
        let id = uuid::Uuid::new_v4().to_string();

        sqlx::query(
            r#"INSERT INTO found_items (
                id, name, description, location, date_found, image_url,
                status, staff_id, staff_name
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(&request.location)
        .bind(&request.date_found)
        .bind(&request.image_url)
        .bind(FoundStatus::Available.as_str())
        .bind(&staff.id)
        .bind(&staff.name)
        .execute(&self.pool)
        .await?;

        self.increment_revision().await?;

        Ok(FoundItemRecord {
            id,
            name: request.name.clone(),
            description: request.description.clone(),
            location: request.location.clone(),
            date_found: request.date_found.clone(),
            image_url: request.image_url.clone(),
            status: FoundStatus::Available,
            staff_id: staff.id.clone(),
            staff_name: staff.name.clone(),
            claimed_by: None,
            claimed_at: None,
        })
    }

    /// Apply the effects of a verified claim in one transaction: flip the
    /// found item to claimed, close a matching lost report (same owner,
    /// case-insensitive name, still not_found), and award recovery points to
    /// students when a match existed.
    pub async fn apply_claim(
        &self,
        item_id: &str,
        claimant: &UserAccount,
    ) -> Result<ClaimEffects, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT id, name, description, location, date_found, image_url, status, staff_id, staff_name, claimed_by, claimed_at FROM found_items WHERE id = ?"
        )
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await?;

        let item = row
            .as_ref()
            .map(found_item_from_row)
            .ok_or_else(|| AppError::NotFound(format!("Found item {} not found", item_id)))?;

        if item.status != FoundStatus::Available {
            return Err(AppError::Conflict(format!(
                "Item {} has already been claimed",
                item_id
            )));
        }

        let now = Utc::now().to_rfc3339();

        // Guard on status in the WHERE clause as well; claimed is absorbing.
        let result = sqlx::query(
            "UPDATE found_items SET status = ?, claimed_by = ?, claimed_at = ? WHERE id = ? AND status = ?"
        )
        .bind(FoundStatus::Claimed.as_str())
        .bind(&claimant.id)
        .bind(&now)
        .bind(item_id)
        .bind(FoundStatus::Available.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Item {} has already been claimed",
                item_id
            )));
        }

        // Cross-match: an open report by the same user for the same item name
        let lost_row = sqlx::query(
            "SELECT id FROM lost_items WHERE user_id = ? AND status = ? AND LOWER(name) = LOWER(?) LIMIT 1"
        )
        .bind(&claimant.id)
        .bind(LostStatus::NotFound.as_str())
        .bind(&item.name)
        .fetch_optional(&mut *tx)
        .await?;

        let mut matched_lost_item_id = None;
        let mut points_awarded = 0;

        if let Some(lost_row) = lost_row {
            let lost_id: String = lost_row.get("id");
            sqlx::query("UPDATE lost_items SET status = ? WHERE id = ?")
                .bind(LostStatus::Claimed.as_str())
                .bind(&lost_id)
                .execute(&mut *tx)
                .await?;
            matched_lost_item_id = Some(lost_id);

            if claimant.role == Role::Student {
                sqlx::query(
                    "UPDATE users SET green_points = MAX(COALESCE(green_points, 0) + ?, 0) WHERE id = ?"
                )
                .bind(POINTS_FOR_RECOVERY)
                .bind(&claimant.id)
                .execute(&mut *tx)
                .await?;
                points_awarded = POINTS_FOR_RECOVERY;
            }
        }

        // Increment revision once for the entire claim
        sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
            .bind(&now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ClaimEffects {
            item: FoundItemRecord {
                status: FoundStatus::Claimed,
                claimed_by: Some(claimant.id.clone()),
                claimed_at: Some(now),
                ..item
            },
            matched_lost_item_id,
            points_awarded,
        })
    }

    // ==================== SEEDING ====================

    /// Write the demo accounts and found items when the corresponding tables
    /// are empty. Idempotent; safe to call on every startup.
    pub async fn seed_defaults(&self, password_hash: &str) -> Result<(), AppError> {
        let user_count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM users")
            .fetch_one(&self.pool)
            .await?
            .get("n");

        let now = Utc::now().to_rfc3339();

        if user_count == 0 {
            let demo_users: [(&str, &str, &str, Role, Option<&str>, Option<i64>); 3] = [
                ("1", "student@example.com", "John Doe", Role::Student, Some("A-101"), Some(25)),
                ("2", "staff@example.com", "Jane Smith", Role::Staff, None, None),
                ("3", "admin@example.com", "Admin User", Role::Admin, None, None),
            ];

            for (id, email, name, role, room, points) in demo_users {
                sqlx::query(
                    "INSERT OR IGNORE INTO users (id, email, name, role, room_number, green_points, password_hash, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)"
                )
                .bind(id)
                .bind(email)
                .bind(name)
                .bind(role.as_str())
                .bind(room)
                .bind(points)
                .bind(password_hash)
                .bind(&now)
                .execute(&self.pool)
                .await?;
            }
            tracing::info!("Seeded {} demo accounts", demo_users.len());
        }

        let item_count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM found_items")
            .fetch_one(&self.pool)
            .await?
            .get("n");

        if item_count == 0 {
            let seed_items: [(&str, &str, &str, &str, i64, &str); 4] = [
                (
                    "1",
                    "Blue Notebook",
                    "A blue spiral notebook with \"Organic Chemistry\" written on the cover.",
                    "Library",
                    7,
                    "https://images.unsplash.com/photo-1600095077943-9059ad6fde2a?q=80&w=200",
                ),
                (
                    "2",
                    "Silver Watch",
                    "A silver analog watch with a leather strap. Brand appears to be Fossil.",
                    "Dining Hall",
                    10,
                    "https://images.unsplash.com/photo-1523170335258-f5ed11844a49?q=80&w=200",
                ),
                (
                    "3",
                    "USB Drive",
                    "32GB SanDisk USB drive, black and red in color.",
                    "Study Room",
                    15,
                    "https://images.unsplash.com/photo-1647427060118-4911c9821b82?q=80&w=200",
                ),
                (
                    "4",
                    "Water Bottle",
                    "Blue hydroflask water bottle with a few stickers on it.",
                    "Sports Complex",
                    20,
                    "https://images.unsplash.com/photo-1602143407151-7111542de6e8?q=80&w=200",
                ),
            ];

            for (id, name, description, location, days_ago, image_url) in seed_items {
                let date_found = (Utc::now() - Duration::days(days_ago)).to_rfc3339();
                sqlx::query(
                    r#"INSERT OR IGNORE INTO found_items (
                        id, name, description, location, date_found, image_url,
                        status, staff_id, staff_name
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
                )
                .bind(id)
                .bind(name)
                .bind(description)
                .bind(location)
                .bind(&date_found)
                .bind(image_url)
                .bind(FoundStatus::Available.as_str())
                .bind("2")
                .bind("Jane Smith")
                .execute(&self.pool)
                .await?;
            }
            tracing::info!("Seeded {} found items", seed_items.len());
        }

        Ok(())
    }
}

// Helper functions for row conversion

fn account_from_row(row: &sqlx::sqlite::SqliteRow) -> UserAccount {
    let role: String = row.get("role");
    UserAccount {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        // An unknown role degrades to the least-privileged one
        role: Role::from_str(&role).unwrap_or(Role::Student),
        room_number: row.get("room_number"),
        green_points: row.get("green_points"),
        password_hash: row.get("password_hash"),
    }
}

fn lost_item_from_row(row: &sqlx::sqlite::SqliteRow) -> LostItemReport {
    let status: String = row.get("status");
    LostItemReport {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        location: row.get("location"),
        date_lost: row.get("date_lost"),
        image_url: row.get("image_url"),
        user_id: row.get("user_id"),
        user_name: row.get("user_name"),
        user_email: row.get("user_email"),
        // A corrupt status degrades to claimed so it can never re-transition
        status: LostStatus::from_str(&status).unwrap_or(LostStatus::Claimed),
        date_reported: row.get("date_reported"),
    }
}

fn found_item_from_row(row: &sqlx::sqlite::SqliteRow) -> FoundItemRecord {
    let status: String = row.get("status");
    FoundItemRecord {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        location: row.get("location"),
        date_found: row.get("date_found"),
        image_url: row.get("image_url"),
        // A corrupt status degrades to claimed so the item cannot be claimed twice
        status: FoundStatus::from_str(&status).unwrap_or(FoundStatus::Claimed),
        staff_id: row.get("staff_id"),
        staff_name: row.get("staff_name"),
        claimed_by: row.get("claimed_by"),
        claimed_at: row.get("claimed_at"),
    }
}
