//! Command-line interface definition.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

/// staysync - keep room availability in step with your booking channels
#[derive(Debug, Parser)]
#[command(name = "staysync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "STAYSYNC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch every configured feed and refresh the booking cache
    Sync,

    /// Show the availability grid of a room
    Availability {
        #[command(flatten)]
        room: RoomArg,

        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Admit a manually entered booking
    Admit(AdmitArgs),

    /// Block dates on a room
    Block {
        #[command(flatten)]
        room: RoomArg,

        #[command(flatten)]
        dates: DateSpan,

        /// Reason shown next to the block
        #[arg(long)]
        note: Option<String>,
    },

    /// Lift a manual block
    Unblock {
        #[command(flatten)]
        room: RoomArg,

        #[command(flatten)]
        dates: DateSpan,
    },

    /// List cached channel bookings
    Bookings,

    /// List admin reservations
    Reservations,

    /// Cancel an admin reservation
    Cancel {
        /// Reservation id
        id: String,
    },

    /// Booking cache maintenance
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Room selection; falls back to `default_room`.
#[derive(Debug, Clone, Args)]
pub struct RoomArg {
    /// Room id
    #[arg(long)]
    pub room: Option<String>,
}

/// A half-open span of dates.
#[derive(Debug, Clone, Args)]
pub struct DateSpan {
    /// First date (YYYY-MM-DD)
    #[arg(long)]
    pub from: NaiveDate,

    /// Day after the last date (YYYY-MM-DD)
    #[arg(long)]
    pub to: NaiveDate,
}

/// Query period: a month or an explicit span; defaults to the current month.
#[derive(Debug, Clone, Args)]
pub struct PeriodArgs {
    /// Month to show (YYYY-MM)
    #[arg(long, value_parser = parse_month, conflicts_with_all = ["from", "to"])]
    pub month: Option<(i32, u32)>,

    /// First date (YYYY-MM-DD)
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,

    /// Day after the last date (YYYY-MM-DD)
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,
}

/// Arguments of `staysync admit`.
#[derive(Debug, Clone, Args)]
pub struct AdmitArgs {
    /// Primary guest name
    #[arg(long)]
    pub name: String,

    /// Guest contact number
    #[arg(long)]
    pub phone: String,

    /// Guest email
    #[arg(long)]
    pub email: Option<String>,

    /// Check-in date (YYYY-MM-DD)
    #[arg(long)]
    pub check_in: NaiveDate,

    /// Check-out date (YYYY-MM-DD)
    #[arg(long)]
    pub check_out: NaiveDate,

    #[arg(long, default_value_t = 1)]
    pub adults: u32,

    #[arg(long, default_value_t = 0)]
    pub kids: u32,

    /// The party travels with a pet
    #[arg(long)]
    pub pet: bool,

    #[command(flatten)]
    pub room: RoomArg,

    /// Total price in minor currency units
    #[arg(long, default_value_t = 0)]
    pub amount: i64,

    /// Payment method (e.g. cash, bank_transfer)
    #[arg(long)]
    pub payment_method: Option<String>,

    /// Amount already paid, in minor currency units
    #[arg(long, requires = "payment_method")]
    pub paid: Option<i64>,

    /// External payment reference
    #[arg(long, requires = "payment_method")]
    pub payment_reference: Option<String>,

    /// Admit even if the room is not free for the whole stay
    #[arg(long)]
    pub force: bool,
}

/// Cache actions.
#[derive(Debug, Subcommand)]
pub enum CacheAction {
    /// Delete every cached channel booking
    Clear {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

/// Parses `YYYY-MM`.
fn parse_month(value: &str) -> Result<(i32, u32), String> {
    let (year, month) = value
        .split_once('-')
        .ok_or_else(|| format!("expected YYYY-MM, got {:?}", value))?;
    let year: i32 = year
        .parse()
        .map_err(|_| format!("invalid year in {:?}", value))?;
    let month: u32 = month
        .parse()
        .map_err(|_| format!("invalid month in {:?}", value))?;
    if !(1..=12).contains(&month) {
        return Err(format!("month out of range in {:?}", value));
    }
    Ok((year, month))
}
