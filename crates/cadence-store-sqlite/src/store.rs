//! The SQLite implementation of [`HabitStore`].

use std::path::Path;

use cadence_core::{
  completion::{Completion, NewCompletion},
  habit::{Habit, NewHabit, Periodicity, User},
  store::{HabitQuery, HabitStore},
};
use chrono::{Local, Utc};
use rusqlite::OptionalExtension as _;
use tracing::warn;
use uuid::Uuid;

use crate::{
  encode::{
    decode_periodicity, encode_dt, encode_naive_dt, encode_periodicity,
    encode_uuid, RawCompletion, RawHabit, RawUser,
  },
  schema::SCHEMA,
  Error, Result,
};

const HABIT_COLUMNS: &str =
  "habit_id, user_id, name, periodicity, created_at, is_active";

fn raw_habit(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawHabit> {
  Ok(RawHabit {
    habit_id:    row.get(0)?,
    user_id:     row.get(1)?,
    name:        row.get(2)?,
    periodicity: row.get(3)?,
    created_at:  row.get(4)?,
    is_active:   row.get(5)?,
  })
}

fn raw_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
  Ok(RawUser {
    user_id:    row.get(0)?,
    username:   row.get(1)?,
    created_at: row.get(2)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Cadence habit store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Owner of a habit, or `None` if the habit does not exist.
  async fn habit_owner(&self, habit_id: Uuid) -> Result<Option<Uuid>> {
    let id_str = encode_uuid(habit_id);

    let owner: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id FROM habits WHERE habit_id = ?1",
              rusqlite::params![id_str],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    owner
      .map(|s| Uuid::parse_str(&s))
      .transpose()
      .map_err(Error::Uuid)
  }
}

// ─── HabitStore impl ─────────────────────────────────────────────────────────

impl HabitStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn add_user(&self, username: String) -> Result<User> {
    if self.find_user(&username).await?.is_some() {
      return Err(Error::UsernameTaken(username));
    }

    let user = User {
      user_id: Uuid::new_v4(),
      username,
      created_at: Utc::now(),
    };

    let id_str   = encode_uuid(user.user_id);
    let name     = user.username.clone();
    let at_str   = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, username, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, username, created_at FROM users WHERE user_id = ?1",
              rusqlite::params![id_str],
              raw_user,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn find_user(&self, username: &str) -> Result<Option<User>> {
    let name = username.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, username, created_at FROM users WHERE username = ?1",
              rusqlite::params![name],
              raw_user,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  // ── Habits ────────────────────────────────────────────────────────────────

  async fn add_habit(&self, input: NewHabit) -> Result<Habit> {
    if self.get_user(input.user_id).await?.is_none() {
      return Err(Error::UserNotFound(input.user_id));
    }

    let habit = Habit {
      habit_id:    Uuid::new_v4(),
      user_id:     input.user_id,
      name:        input.name,
      periodicity: input.periodicity,
      created_at:  Local::now().naive_local(),
      is_active:   true,
    };

    let id_str      = encode_uuid(habit.habit_id);
    let user_str    = encode_uuid(habit.user_id);
    let name        = habit.name.clone();
    let periodicity = encode_periodicity(habit.periodicity);
    let at_str      = encode_naive_dt(habit.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO habits (habit_id, user_id, name, periodicity, created_at, is_active)
           VALUES (?1, ?2, ?3, ?4, ?5, 1)",
          rusqlite::params![id_str, user_str, name, periodicity, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(habit)
  }

  async fn get_habit(&self, id: Uuid) -> Result<Option<Habit>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawHabit> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE habit_id = ?1"),
              rusqlite::params![id_str],
              raw_habit,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawHabit::into_habit).transpose()
  }

  async fn list_habits(&self, query: &HabitQuery) -> Result<Vec<Habit>> {
    let user_str         = encode_uuid(query.user_id);
    let periodicity      = query.periodicity.map(encode_periodicity);
    let include_inactive = query.include_inactive;

    let raws: Vec<RawHabit> = self
      .conn
      .call(move |conn| {
        // Unset filters bind NULL and fall through the `IS NULL` branch.
        let mut stmt = conn.prepare(&format!(
          "SELECT {HABIT_COLUMNS} FROM habits
           WHERE user_id = ?1
             AND (?2 IS NULL OR periodicity = ?2)
             AND (?3 OR is_active = 1)
           ORDER BY created_at, rowid"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![user_str, periodicity, include_inactive],
            raw_habit,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHabit::into_habit).collect()
  }

  async fn deactivate_habit(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE habits SET is_active = 0 WHERE habit_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::HabitNotFound(id));
    }
    Ok(())
  }

  async fn delete_habit(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM completions WHERE habit_id = ?1",
          rusqlite::params![id_str],
        )?;
        let deleted = tx.execute(
          "DELETE FROM habits WHERE habit_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(deleted)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::HabitNotFound(id));
    }
    Ok(())
  }

  // ── Completions ───────────────────────────────────────────────────────────

  async fn record_completion(
    &self,
    user_id: Uuid,
    input: NewCompletion,
  ) -> Result<Completion> {
    if self.habit_owner(input.habit_id).await? != Some(user_id) {
      return Err(Error::HabitNotFound(input.habit_id));
    }

    let completion = Completion {
      completion_id: Uuid::new_v4(),
      habit_id:      input.habit_id,
      timestamp:     input
        .timestamp
        .unwrap_or_else(|| Local::now().naive_local()),
      note:          input.note.filter(|n| !n.trim().is_empty()),
      mood_score:    input.mood_score,
    };

    let id_str    = encode_uuid(completion.completion_id);
    let habit_str = encode_uuid(completion.habit_id);
    let ts_str    = encode_naive_dt(completion.timestamp);
    let note      = completion.note.clone();
    let mood      = completion.mood_score.map(i64::from);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO completions (completion_id, habit_id, timestamp, note, mood_score)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, habit_str, ts_str, note, mood],
        )?;
        Ok(())
      })
      .await?;

    Ok(completion)
  }

  async fn list_completions(&self, habit_id: Uuid) -> Result<Vec<Completion>> {
    let habit_str = encode_uuid(habit_id);

    let raws: Vec<RawCompletion> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT completion_id, habit_id, timestamp, note, mood_score
           FROM completions
           WHERE habit_id = ?1
           ORDER BY timestamp",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![habit_str], |row| {
            Ok(RawCompletion {
              completion_id: row.get(0)?,
              habit_id:      row.get(1)?,
              timestamp:     row.get(2)?,
              note:          row.get(3)?,
              mood_score:    row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut completions = Vec::with_capacity(raws.len());
    for raw in raws {
      let timestamp = match raw.decode_timestamp() {
        Ok(ts) => ts,
        Err(e) => {
          warn!(
            %habit_id,
            completion_id = %raw.completion_id,
            raw = ?raw.timestamp,
            error = %e,
            "skipping completion with unparseable timestamp"
          );
          continue;
        }
      };
      let raw_id = raw.completion_id.clone();
      match raw.into_completion(timestamp) {
        Ok(completion) => completions.push(completion),
        Err(e) => warn!(
          %habit_id,
          completion_id = %raw_id,
          error = %e,
          "skipping malformed completion row"
        ),
      }
    }

    // Text ordering breaks down across mixed stored formats; sort parsed
    // values so the ascending contract holds.
    completions.sort_by_key(|c| c.timestamp);
    Ok(completions)
  }

  async fn get_periodicity(&self, habit_id: Uuid) -> Result<Periodicity> {
    let id_str = encode_uuid(habit_id);

    let stored: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT periodicity FROM habits WHERE habit_id = ?1",
              rusqlite::params![id_str],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    match stored {
      Some(s) => decode_periodicity(&s),
      None => Ok(Periodicity::default()),
    }
  }
}
