//! SQL schema for the Cadence SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,
    username    TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL       -- RFC 3339 UTC
);

CREATE TABLE IF NOT EXISTS habits (
    habit_id     TEXT PRIMARY KEY,
    user_id      TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    name         TEXT NOT NULL,
    periodicity  TEXT NOT NULL,     -- 'daily' | 'weekly'
    created_at   TEXT NOT NULL,     -- naive local date-time
    is_active    INTEGER NOT NULL DEFAULT 1
);

-- Completions are append-only; rows only leave with their habit.
CREATE TABLE IF NOT EXISTS completions (
    completion_id  TEXT PRIMARY KEY,
    habit_id       TEXT NOT NULL REFERENCES habits(habit_id) ON DELETE CASCADE,
    timestamp      TEXT,            -- naive local date-time
    note           TEXT,
    mood_score     INTEGER
);

CREATE INDEX IF NOT EXISTS habits_user_idx            ON habits(user_id);
CREATE INDEX IF NOT EXISTS completions_habit_time_idx ON completions(habit_id, timestamp);

PRAGMA user_version = 1;
";
