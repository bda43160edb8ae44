//! Subcommands and their plain-text / JSON output.

use anyhow::{Context, Result, bail};
use cadence_core::{
  completion::{MoodScore, NewCompletion},
  engine::{HabitStats, StreakEngine},
  habit::{Habit, NewHabit, PREDEFINED_HABITS, Periodicity, User},
  store::{HabitQuery, HabitStore},
  streak::BestHabit,
};
use cadence_store_sqlite::SqliteStore;
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Subcommand};
use uuid::Uuid;

type Engine = StreakEngine<SqliteStore>;

// ─── Definitions ──────────────────────────────────────────────────────────────

/// Identifies the acting user by username.
#[derive(Args, Debug)]
pub struct UserArg {
  #[arg(short, long, env = "CADENCE_USER")]
  user: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Manage users.
  #[command(subcommand)]
  User(UserCommand),

  /// Manage habits.
  #[command(subcommand)]
  Habit(HabitCommand),

  /// Check a habit off.
  Check {
    #[command(flatten)]
    user:  UserArg,
    habit: Uuid,
    /// Free-text note stored with the check-off.
    #[arg(long)]
    note:  Option<String>,
    /// Mood from 1 to 10.
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=10))]
    mood:  Option<i64>,
    /// Record at this local time instead of now (e.g. 2024-01-31T07:30:00).
    #[arg(long)]
    at:    Option<NaiveDateTime>,
  },

  /// Show completions, success rate and streaks for each active habit.
  Stats {
    #[command(flatten)]
    user:        UserArg,
    #[arg(short, long)]
    periodicity: Option<Periodicity>,
    #[arg(long)]
    json:        bool,
  },

  /// Show the habit with the longest streak.
  Best {
    #[command(flatten)]
    user: UserArg,
    #[arg(long)]
    json: bool,
  },
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
  /// Create a user.
  Add { username: String },
}

#[derive(Subcommand, Debug)]
pub enum HabitCommand {
  /// Create a habit.
  Add {
    #[command(flatten)]
    user:        UserArg,
    name:        String,
    #[arg(short, long, default_value_t)]
    periodicity: Periodicity,
  },

  /// List habits.
  List {
    #[command(flatten)]
    user:        UserArg,
    #[arg(short, long)]
    periodicity: Option<Periodicity>,
    /// Include deactivated habits.
    #[arg(long)]
    all:         bool,
  },

  /// Add the five starter habits.
  Seed {
    #[command(flatten)]
    user: UserArg,
  },

  /// Hide a habit from reports, keeping its history.
  Deactivate {
    #[command(flatten)]
    user:  UserArg,
    habit: Uuid,
  },

  /// Delete a habit and all of its completions.
  Delete {
    #[command(flatten)]
    user:  UserArg,
    habit: Uuid,
  },
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

pub async fn run(command: Command, engine: &Engine, today: NaiveDate) -> Result<()> {
  let store = engine.store();

  match command {
    Command::User(UserCommand::Add { username }) => {
      let user = store.add_user(username).await?;
      println!("Created user {} ({})", user.username, user.user_id);
    }

    Command::Habit(cmd) => run_habit(cmd, store).await?,

    Command::Check { user, habit, note, mood, at } => {
      let user = resolve_user(store, &user).await?;
      let input = NewCompletion {
        habit_id: habit,
        timestamp: at,
        note,
        mood_score: mood.map(MoodScore::try_from).transpose()?,
      };
      let completion = store.record_completion(user.user_id, input).await?;
      println!("Checked off at {}", completion.timestamp.format("%Y-%m-%d %H:%M"));
    }

    Command::Stats { user, periodicity, json } => {
      let user = resolve_user(store, &user).await?;
      let stats = engine.user_stats(user.user_id, periodicity, today).await?;
      if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
      } else if stats.is_empty() {
        println!("No habits found. Add some habits to get started!");
      } else {
        stats.iter().for_each(print_stats);
      }
    }

    Command::Best { user, json } => {
      let user = resolve_user(store, &user).await?;
      let best = engine.best_habit_overall(user.user_id).await?;
      if json {
        println!("{}", serde_json::to_string_pretty(&best)?);
      } else {
        print_best(&best);
      }
    }
  }

  Ok(())
}

async fn run_habit(cmd: HabitCommand, store: &SqliteStore) -> Result<()> {
  match cmd {
    HabitCommand::Add { user, name, periodicity } => {
      let user = resolve_user(store, &user).await?;
      let habit = store
        .add_habit(NewHabit::new(user.user_id, name, periodicity)?)
        .await?;
      println!("Added {} habit '{}' ({})", habit.periodicity, habit.name, habit.habit_id);
    }

    HabitCommand::List { user, periodicity, all } => {
      let user = resolve_user(store, &user).await?;
      let query = HabitQuery {
        user_id: user.user_id,
        periodicity,
        include_inactive: all,
      };
      let habits = store.list_habits(&query).await?;
      if habits.is_empty() {
        println!("No habits found. Add some habits to get started!");
      }
      for habit in &habits {
        let status = if habit.is_active { "" } else { " [inactive]" };
        println!(
          "{}  {:<6}  {}{status}",
          habit.habit_id, habit.periodicity, habit.name
        );
      }
    }

    HabitCommand::Seed { user } => {
      let user = resolve_user(store, &user).await?;
      for (name, periodicity) in PREDEFINED_HABITS {
        store
          .add_habit(NewHabit::new(user.user_id, name, periodicity)?)
          .await?;
        println!("Added: {name}");
      }
    }

    HabitCommand::Deactivate { user, habit } => {
      let habit = owned_habit(store, &user, habit).await?;
      store.deactivate_habit(habit.habit_id).await?;
      println!("Deactivated '{}'", habit.name);
    }

    HabitCommand::Delete { user, habit } => {
      let habit = owned_habit(store, &user, habit).await?;
      store.delete_habit(habit.habit_id).await?;
      println!("Deleted '{}' and its completions", habit.name);
    }
  }

  Ok(())
}

// ─── Lookups ──────────────────────────────────────────────────────────────────

async fn resolve_user(store: &SqliteStore, arg: &UserArg) -> Result<User> {
  store
    .find_user(&arg.user)
    .await?
    .with_context(|| format!("unknown user {:?}; create it with `cadence user add`", arg.user))
}

async fn owned_habit(store: &SqliteStore, arg: &UserArg, habit_id: Uuid) -> Result<Habit> {
  let user = resolve_user(store, arg).await?;
  match store.get_habit(habit_id).await? {
    Some(habit) if habit.user_id == user.user_id => Ok(habit),
    _ => bail!("habit {habit_id} not found for user {:?}", user.username),
  }
}

// ─── Output ───────────────────────────────────────────────────────────────────

fn print_stats(stats: &HabitStats) {
  let habit = &stats.habit;
  let unit = habit.periodicity.unit();
  println!("{} ({})", habit.name, habit.periodicity);
  println!("  Total completions: {}", stats.completion_count);
  println!("  Success rate:      {:.1}%", stats.success_rate);
  println!("  Current streak:    {} {unit}", stats.current_streak);
  println!("  Longest streak:    {} {unit}", stats.longest_streak);
  println!("  Created:           {}", habit.created_at.format("%Y-%m-%d"));
}

/// Encouragement shown alongside the best streak.
fn encouragement(streak: u32) -> &'static str {
  match streak {
    30.. => "Legendary! You're building amazing habits!",
    14.. => "Excellent! You're very consistent!",
    7.. => "Great job! Keep up the good work!",
    _ => "Good start! Every streak begins with one completion!",
  }
}

fn print_best(best: &BestHabit) {
  match &best.name {
    Some(name) => {
      println!("Champion habit: {name}");
      println!("Longest streak: {} days/weeks", best.streak);
      println!("{}", encouragement(best.streak));
    }
    None => println!("No streak data available yet. Keep building those habits!"),
  }
}

#[cfg(test)]
mod tests {
  use clap::Parser;

  use super::*;

  #[derive(Parser)]
  struct Cli {
    #[command(subcommand)]
    command: Command,
  }

  #[test]
  fn encouragement_tiers() {
    assert!(encouragement(45).starts_with("Legendary"));
    assert!(encouragement(30).starts_with("Legendary"));
    assert!(encouragement(14).starts_with("Excellent"));
    assert!(encouragement(7).starts_with("Great"));
    assert!(encouragement(1).starts_with("Good start"));
  }

  #[test]
  fn parses_check_with_mood_and_time() {
    let id = Uuid::new_v4();
    let cli = Cli::try_parse_from([
      "cadence", "check", "--user", "alice", &id.to_string(),
      "--mood", "7", "--at", "2024-01-31T07:30:00",
    ])
    .unwrap();

    match cli.command {
      Command::Check { user, habit, mood, at, .. } => {
        assert_eq!(user.user, "alice");
        assert_eq!(habit, id);
        assert_eq!(mood, Some(7));
        assert_eq!(at.unwrap().format("%H:%M").to_string(), "07:30");
      }
      other => panic!("unexpected command: {other:?}"),
    }
  }

  #[test]
  fn rejects_out_of_range_mood() {
    let id = Uuid::new_v4().to_string();
    let res = Cli::try_parse_from([
      "cadence", "check", "--user", "alice", &id, "--mood", "11",
    ]);
    assert!(res.is_err());
  }

  #[test]
  fn habit_add_defaults_to_daily() {
    let cli = Cli::try_parse_from([
      "cadence", "habit", "add", "--user", "alice", "Read",
    ])
    .unwrap();
    assert!(matches!(
      cli.command,
      Command::Habit(HabitCommand::Add { periodicity: Periodicity::Daily, .. })
    ));

    let cli = Cli::try_parse_from([
      "cadence", "habit", "add", "--user", "alice", "Clean", "-p", "weekly",
    ])
    .unwrap();
    assert!(matches!(
      cli.command,
      Command::Habit(HabitCommand::Add { periodicity: Periodicity::Weekly, .. })
    ));
  }
}
