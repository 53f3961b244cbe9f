//! Dreamhouse CLI - command-line client for the Dreamhouse real-estate API
//!
//! Browse listings, manage favorites and referrals, authenticate over SMS.

mod api;
mod auth;
mod config;
mod models;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::CardFilters;

#[derive(Parser)]
#[command(name = "dreamhouse-cli")]
#[command(about = "Command-line client for Dreamhouse real-estate listings", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with an SMS one-time password
    Login {
        /// Phone number in international format
        phone: String,
    },

    /// Create an account, confirmed with an SMS code
    Register {
        /// Phone number in international format
        phone: String,

        /// Display name
        name: String,

        /// Referral code from an existing user
        #[arg(long)]
        ref_code: Option<String>,
    },

    /// Log out and clear stored tokens
    Logout,

    /// Show current authentication status
    Status,

    /// Show current user profile
    Whoami,

    /// Browse cards
    Cards {
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Full-text search query
        #[arg(short, long)]
        query: Option<String>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show one card in detail
    Card {
        /// Card ID (from `cards` output)
        id: i64,
    },

    /// Search cards by text
    Search {
        /// Search query
        query: String,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// List favorite cards
    Favorites {
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,
    },

    /// Add a card to favorites
    Favorite {
        /// Card ID
        id: i64,
    },

    /// Remove a card from favorites
    Unfavorite {
        /// Card ID
        id: i64,
    },

    /// List recently viewed cards
    Recent {
        /// Page number
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Maximum number of cards to show
        #[arg(short, long, default_value = "8")]
        limit: u32,
    },

    /// Show referral link and referred users
    Referrals,
}

/// Card filter flags shared by `cards` and `search`.
#[derive(Args)]
struct FilterArgs {
    /// City ID (1-3)
    #[arg(long)]
    city: Option<u8>,

    /// Category: flat, new_building
    #[arg(long)]
    category: Option<String>,

    /// House type: private, apartment
    #[arg(long)]
    house_type: Option<String>,

    /// Elevator: cargo, passenger, none
    #[arg(long)]
    elevator: Option<String>,

    /// Parking: underground, none
    #[arg(long)]
    parking: Option<String>,

    /// Building material: brick, monolith, panel
    #[arg(long)]
    building_material: Option<String>,

    /// Only cards with a balcony
    #[arg(long)]
    balcony: bool,

    /// Minimum area, m2
    #[arg(long)]
    area_min: Option<f64>,

    /// Maximum area, m2
    #[arg(long)]
    area_max: Option<f64>,

    /// Minimum price
    #[arg(long)]
    price_min: Option<u64>,

    /// Maximum price
    #[arg(long)]
    price_max: Option<u64>,

    /// Minimum floor count
    #[arg(long)]
    floors_min: Option<u32>,

    /// Maximum floor count
    #[arg(long)]
    floors_max: Option<u32>,

    /// Minimum rooms
    #[arg(long)]
    rooms_min: Option<u32>,

    /// Maximum rooms
    #[arg(long)]
    rooms_max: Option<u32>,
}

impl FilterArgs {
    fn into_filters(self) -> CardFilters {
        CardFilters {
            city: self.city,
            category: self.category,
            house_type: self.house_type,
            elevator: self.elevator,
            parking: self.parking,
            building_material: self.building_material,
            balcony: self.balcony.then_some(true),
            area_min: self.area_min,
            area_max: self.area_max,
            price_min: self.price_min,
            price_max: self.price_max,
            floors_min: self.floors_min,
            floors_max: self.floors_max,
            rooms_min: self.rooms_min,
            rooms_max: self.rooms_max,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Login { phone } => {
            tracing::info!("Starting SMS login...");
            auth::login(&phone).await?;
        }
        Commands::Register {
            phone,
            name,
            ref_code,
        } => {
            tracing::info!("Starting registration...");
            auth::register(&phone, &name, ref_code.as_deref()).await?;
        }
        Commands::Logout => {
            auth::logout().await?;
        }
        Commands::Status => {
            auth::status().await?;
        }
        Commands::Whoami => {
            api::whoami().await?;
        }
        Commands::Cards {
            page,
            query,
            filters,
        } => {
            api::list_cards(&filters.into_filters(), page, query.as_deref()).await?;
        }
        Commands::Card { id } => {
            api::show_card(id).await?;
        }
        Commands::Search { query, filters } => {
            api::search_cards(&query, &filters.into_filters()).await?;
        }
        Commands::Favorites { page } => {
            api::list_favorites(page).await?;
        }
        Commands::Favorite { id } => {
            api::add_favorite(id).await?;
        }
        Commands::Unfavorite { id } => {
            api::remove_favorite(id).await?;
        }
        Commands::Recent { page, limit } => {
            api::recent_views(page, limit).await?;
        }
        Commands::Referrals => {
            api::referrals().await?;
        }
    }

    Ok(())
}
