use chrono::Local;
use clap::{Args, Subcommand};

use super::{parse_date, resolve_range, OutputFormat};
use crate::db::ExerciseRepository;
use crate::models::ExerciseEntry;
use crate::session::SessionStore;

/// Manage exercise entries
#[derive(Args)]
pub struct ExerciseCommand {
    #[command(subcommand)]
    command: ExerciseSubcommand,
}

#[derive(Subcommand)]
enum ExerciseSubcommand {
    /// Log an exercise session
    Log {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long, short)]
        date: Option<String>,

        /// Activity (e.g. "running", "swimming", "yoga")
        #[arg(long, short)]
        activity: String,

        /// Duration in minutes
        #[arg(long = "duration", short = 'm')]
        duration_minutes: i64,

        /// Estimated calories burned
        #[arg(long)]
        calories: Option<i64>,

        /// Optional notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List exercise entries
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Start date (YYYY-MM-DD), defaults to 7 days ago
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        to: Option<String>,

        /// List all entries, ignoring the date range
        #[arg(long)]
        all: bool,
    },

    /// Edit an existing entry
    Edit {
        /// Entry ID
        id: i64,

        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        activity: Option<String>,

        #[arg(long = "duration")]
        duration_minutes: Option<i64>,

        #[arg(long)]
        calories: Option<i64>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Delete an entry
    Delete {
        /// Entry ID
        id: i64,
    },
}

impl ExerciseCommand {
    pub async fn run(
        &self,
        repo: &ExerciseRepository,
        session: &SessionStore,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ExerciseSubcommand::Log {
                date,
                activity,
                duration_minutes,
                calories,
                notes,
            } => {
                self.log(date, activity, *duration_minutes, calories, notes, repo, session)
                    .await
            }
            ExerciseSubcommand::List {
                format,
                from,
                to,
                all,
            } => self.list(format, from, to, *all, repo, session).await,
            ExerciseSubcommand::Edit {
                id,
                date,
                activity,
                duration_minutes,
                calories,
                notes,
            } => {
                self.edit(*id, date, activity, duration_minutes, calories, notes, repo)
                    .await
            }
            ExerciseSubcommand::Delete { id } => {
                repo.delete(*id).await?;
                println!("Deleted exercise entry {}", id);
                Ok(())
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn log(
        &self,
        date: &Option<String>,
        activity: &str,
        duration_minutes: i64,
        calories: &Option<i64>,
        notes: &Option<String>,
        repo: &ExerciseRepository,
        session: &SessionStore,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let parsed_date = match date {
            Some(d) => parse_date(d)?,
            None => Local::now().date_naive(),
        };

        if duration_minutes <= 0 {
            return Err("Duration must be a positive number of minutes".into());
        }

        let user_id = session.current_user_id().unwrap_or_default();

        let mut entry =
            ExerciseEntry::new(parsed_date, activity, duration_minutes).with_user_id(user_id);
        if let Some(c) = calories {
            entry = entry.with_calories(*c);
        }
        if let Some(n) = notes {
            entry = entry.with_notes(n);
        }

        let created = repo.create(&entry).await?;

        println!("Logged exercise entry:");
        println!();
        print_entry(&created);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn list(
        &self,
        format: &OutputFormat,
        from: &Option<String>,
        to: &Option<String>,
        all: bool,
        repo: &ExerciseRepository,
        session: &SessionStore,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let user_id = session.current_user_id().unwrap_or_default();

        let entries = if all {
            repo.list_for_user(&user_id).await?
        } else {
            let (from_date, to_date) = resolve_range(from, to)?;
            repo.list_range(&user_id, from_date, to_date).await?
        };

        if entries.is_empty() {
            println!("No exercise entries found");
            return Ok(());
        }

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            }
            OutputFormat::Text => {
                for entry in &entries {
                    println!(
                        "  [{}] {}  {:12}  {:>4} min  {:>5} kcal  {}",
                        entry.id,
                        entry.date,
                        entry.activity,
                        entry.duration_minutes,
                        entry.calories_burned,
                        entry.notes
                    );
                }
                println!("\nTotal: {} session(s)", entries.len());
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn edit(
        &self,
        id: i64,
        date: &Option<String>,
        activity: &Option<String>,
        duration_minutes: &Option<i64>,
        calories: &Option<i64>,
        notes: &Option<String>,
        repo: &ExerciseRepository,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut entry = repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| format!("Exercise entry not found: {}", id))?;

        if let Some(d) = date {
            entry.date = parse_date(d)?;
        }
        if let Some(a) = activity {
            entry.activity = a.clone();
        }
        if let Some(m) = duration_minutes {
            if *m <= 0 {
                return Err("Duration must be a positive number of minutes".into());
            }
            entry.duration_minutes = *m;
        }
        if let Some(c) = calories {
            entry.calories_burned = *c;
        }
        if let Some(n) = notes {
            entry.notes = n.clone();
        }

        let updated = repo.update(&entry).await?;

        println!("Updated exercise entry:");
        println!();
        print_entry(&updated);
        Ok(())
    }
}

fn print_entry(entry: &ExerciseEntry) {
    println!("  Date:     {}", entry.date);
    println!("  Activity: {}", entry.activity);
    println!("  Duration: {} min", entry.duration_minutes);
    if entry.calories_burned > 0 {
        println!("  Calories: {} kcal", entry.calories_burned);
    }
    if !entry.notes.is_empty() {
        println!("  Notes:    {}", entry.notes);
    }
    println!();
    println!("Entry ID: {}", entry.id);
}
