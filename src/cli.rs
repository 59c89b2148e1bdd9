use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use imena::models::income::GroupBy;
use imena::models::user::SignupRole;

/// Imena - cooperative contributions from the command line
#[derive(Parser)]
#[command(name = "imena", version, about)]
pub struct Cli {
    /// API base URL (overrides IMENA_API_URL from the environment or .env)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in with an email or phone number
    Login {
        /// Email or phone number
        identifier: String,
        #[arg(long, env = "IMENA_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored credentials
    Logout,

    /// Show the logged-in account
    Whoami,

    /// Create an account
    Register {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        full_name: String,
        #[arg(long, env = "IMENA_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, value_enum, default_value = "rider")]
        role: RoleArg,
        /// Cooperative a rider joins
        #[arg(long)]
        cooperative_id: Option<i64>,
        #[arg(long)]
        invite_code: Option<String>,
        /// Cooperatives an administrator manages
        #[arg(long, value_delimiter = ',')]
        cooperatives: Vec<i64>,
    },

    /// Browse and manage cooperatives
    Cooperatives {
        #[command(subcommand)]
        command: CooperativeCommands,
    },

    /// List members across every cooperative you administer
    Members,

    /// Toggle a member's verified flag
    Verify {
        #[arg(long)]
        cooperative: i64,
        #[arg(long)]
        member: i64,
    },

    /// Income totals
    Income {
        #[command(subcommand)]
        command: IncomeCommands,
    },

    /// Record a contribution
    Contribute {
        /// Amount in RWF
        amount: Decimal,
        /// Defaults to your first cooperative
        #[arg(long)]
        cooperative: Option<i64>,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
pub enum CooperativeCommands {
    /// Cooperatives visible to you
    List,
    /// Public list offered at signup
    Choices,
    /// Create a cooperative you administer
    Create {
        #[arg(long)]
        name: String,
    },
    /// Members of one cooperative
    Show { id: i64 },
}

#[derive(Subcommand)]
pub enum IncomeCommands {
    /// Total income
    Summary,
    /// Income per month or year
    Stats {
        #[arg(long, value_enum, default_value = "month")]
        group_by: GroupBy,
        /// Year for monthly grouping, defaults to the current year
        #[arg(long)]
        year: Option<i32>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
pub enum RoleArg {
    Rider,
    Administrator,
}

impl From<RoleArg> for SignupRole {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Rider => SignupRole::Rider,
            RoleArg::Administrator => SignupRole::Administrator,
        }
    }
}
