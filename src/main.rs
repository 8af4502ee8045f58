// Event Timetable
// Terminal entry point over the timetable session

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate, NaiveTime, Timelike};
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use serde::Deserialize;

use event_timetable::models::event::Event;
use event_timetable::models::grid::{self, CellPosition, SLOTS_PER_DAY, SLOT_MINUTES};
use event_timetable::models::venue::{Venue, VenueDirectory};
use event_timetable::services::session::TimetableSession;
use event_timetable::services::storage::FileStorage;
use event_timetable::utils::date::{start_of_week, week_days};

#[derive(Parser)]
#[command(name = "event-timetable", version, about = "Venue booking timetable")]
struct Cli {
    /// Events file (defaults to the platform data directory)
    #[arg(long, value_name = "FILE")]
    data_file: Option<PathBuf>,

    /// Venue list as TOML (defaults to venues.toml next to the events file)
    #[arg(long, value_name = "FILE")]
    venues_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show bookings for a date
    Show {
        /// Date to show (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Show the whole Monday-based week instead
        #[arg(long)]
        week: bool,
    },
    /// Book a venue range by dragging across the grid
    Add {
        /// Date to book on (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Start time (HH:MM on a 15-minute boundary)
        #[arg(long)]
        from: String,
        /// End time, exclusive (HH:MM on a 15-minute boundary, or 24:00)
        #[arg(long)]
        to: String,
        /// Venue columns, 1-based: a single column ("2") or a range ("2-4")
        #[arg(long, default_value = "1")]
        venues: String,
        /// Event name
        name: String,
    },
    /// Remove a booking by id
    Remove {
        /// Date the booking is on (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Event id as printed by `show`
        id: String,
    },
}

/// Shape of the optional venues.toml file.
#[derive(Debug, Deserialize)]
struct VenuesFile {
    venues: Vec<Venue>,
}

fn main() {
    // Initialize logging
    env_logger::init();

    log::info!("Starting event timetable");

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let data_file = match cli.data_file {
        Some(path) => path,
        None => default_data_file()?,
    };
    let (venues_path, venues_required) = match cli.venues_file {
        Some(path) => (path, true),
        None => (data_file.with_file_name("venues.toml"), false),
    };
    let venues = load_venues(&venues_path, venues_required)?;
    log::info!(
        "using events file {} with {} venues",
        data_file.display(),
        venues.len()
    );

    match cli.command {
        Commands::Show { date, week } => {
            let date = date.unwrap_or_else(today);
            let mut session =
                TimetableSession::new(FileStorage::new(&data_file), venues, date);
            if week {
                show_week(&mut session);
            } else {
                show_day(&session);
            }
            Ok(())
        }
        Commands::Add {
            date,
            from,
            to,
            venues: venue_spec,
            name,
        } => {
            let date = date.unwrap_or_else(today);
            let (start_row, end_row) = parse_time_rows(&from, &to)?;
            let (start_col, end_col) = parse_venue_columns(&venue_spec, venues.len())?;
            let mut session =
                TimetableSession::new(FileStorage::new(&data_file), venues, date);
            add_event(&mut session, &name, (start_row, start_col), (end_row, end_col))
        }
        Commands::Remove { date, id } => {
            let date = date.unwrap_or_else(today);
            let mut session =
                TimetableSession::new(FileStorage::new(&data_file), venues, date);
            if !session.delete_event(&id) {
                bail!("No booking with id {id} on {date}");
            }
            println!("Removed {id}");
            Ok(())
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn default_data_file() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "event-timetable")
        .context("Could not determine the platform data directory")?;
    Ok(dirs.data_dir().join("events.json"))
}

fn load_venues(path: &Path, required: bool) -> Result<VenueDirectory> {
    if !path.exists() {
        if required {
            bail!("Venues file {} does not exist", path.display());
        }
        log::debug!(
            "no venues file at {}, using the default venue set",
            path.display()
        );
        return Ok(VenueDirectory::default());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read venues file {}", path.display()))?;
    let file: VenuesFile = toml::from_str(&raw)
        .with_context(|| format!("Failed to parse venues file {}", path.display()))?;
    VenueDirectory::new(file.venues).map_err(|e| anyhow!(e))
}

/// Map an inclusive `--from`/exclusive `--to` pair onto grid rows.
fn parse_time_rows(from: &str, to: &str) -> Result<(usize, usize)> {
    let start_row = row_for(from)?;
    let end_exclusive = if to == "24:00" {
        SLOTS_PER_DAY
    } else {
        row_for(to)?
    };
    if end_exclusive <= start_row {
        bail!("--to must be after --from");
    }
    Ok((start_row, end_exclusive - 1))
}

fn row_for(value: &str) -> Result<usize> {
    let time = NaiveTime::parse_from_str(value, "%H:%M")
        .with_context(|| format!("Invalid time {value:?}, expected HH:MM"))?;
    if time.minute() % SLOT_MINUTES != 0 {
        bail!("Time {value:?} is not on a 15-minute boundary");
    }
    Ok(grid::row_at(time))
}

/// Parse the 1-based `--venues` column spec into inclusive 0-based columns.
fn parse_venue_columns(spec: &str, venue_count: usize) -> Result<(usize, usize)> {
    let (first, last) = match spec.split_once('-') {
        Some((a, b)) => (parse_column(a)?, parse_column(b)?),
        None => {
            let col = parse_column(spec)?;
            (col, col)
        }
    };
    if first > last {
        bail!("Venue range {spec:?} is reversed");
    }
    if last > venue_count {
        bail!("Venue column {last} is out of range, this timetable has {venue_count} venues");
    }
    Ok((first - 1, last - 1))
}

fn parse_column(value: &str) -> Result<usize> {
    let col: usize = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid venue column {value:?}"))?;
    if col == 0 {
        bail!("Venue columns are 1-based");
    }
    Ok(col)
}

/// Drive the real pointer path: press, extend, release, then book.
fn add_event(
    session: &mut TimetableSession<FileStorage>,
    name: &str,
    start: (usize, usize),
    end: (usize, usize),
) -> Result<()> {
    session.pointer_down(CellPosition::new(start.0, start.1));
    if !session.is_dragging() {
        if let Some(existing) = session.selected_event() {
            bail!(
                "That slot is already booked by \"{}\" ({})",
                existing.name,
                existing.id
            );
        }
        bail!("Could not start a selection at row {}, column {}", start.0, start.1);
    }
    session.pointer_enter(CellPosition::new(end.0, end.1));
    session.pointer_up();

    if let Some(summary) = session.selection_summary() {
        println!("{summary}");
    }

    let event = session.create_event(name)?;
    println!("Created \"{}\" ({})", event.name, event.id);
    Ok(())
}

fn show_day(session: &TimetableSession<FileStorage>) {
    println!("{}", session.date().format("%A %Y-%m-%d"));
    print_events(session.events(), "  ");
}

fn show_week(session: &mut TimetableSession<FileStorage>) {
    let start = start_of_week(session.date());
    for day in week_days(start) {
        session.set_date(day);
        let events = session.events();
        println!("{}  {} bookings", day.format("%a %Y-%m-%d"), events.len());
        if !events.is_empty() {
            print_events(events, "    ");
        }
    }
}

fn print_events(events: &[Event], indent: &str) {
    if events.is_empty() {
        println!("{indent}no bookings");
        return;
    }
    for event in events {
        let venues = event
            .venues
            .iter()
            .map(|venue| venue.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{indent}{} - {}  {}  [{}]  ({})",
            event.start_time.format("%-I:%M %p"),
            event.end_time.format("%-I:%M %p"),
            event.name,
            venues,
            event.id
        );
    }
}
