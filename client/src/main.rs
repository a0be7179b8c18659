//! TerraSync command-line client
//!
//! Drives the three API calls in the order the web UI uses them:
//! analyze an item, optionally orchestrate a trade, optionally view stats.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use terrasync_client::{
    AnalysisResult, ClientConfig, ImageUpload, ImpactStats, TerraSyncClient, TradeRequest,
    TradeResult,
};

#[derive(Parser)]
#[command(name = "terrasync")]
#[command(about = "Analyze items and orchestrate circular-economy trades")]
struct Cli {
    /// TerraSync API base URL [default: $TERRASYNC_API_URL, then the hosted API]
    #[arg(long)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an item image for analysis
    Analyze {
        /// Path to an image file
        image: PathBuf,
    },

    /// Orchestrate a trade for an analyzed item
    Trade {
        /// Item ID returned by `analyze`
        #[arg(short, long)]
        item: String,

        /// User ID
        #[arg(short, long, default_value = "user-demo")]
        user: String,

        /// Preferred disposition path (e.g. donate, recycle)
        #[arg(short, long)]
        path: Option<String>,

        /// Latitude of the pickup location
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude of the pickup location
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
    },

    /// Show platform impact statistics
    Stats,

    /// Analyze an image, trade it along its top recommended path, then show stats
    Demo {
        /// Path to an image file
        image: PathBuf,

        /// User ID
        #[arg(short, long, default_value = "user-demo")]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "terrasync_client=info".into()),
        )
        .init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = match cli.api_url {
        Some(url) => ClientConfig::new(url).context("Invalid --api-url")?,
        None => ClientConfig::from_env().context("Invalid TERRASYNC_API_URL")?,
    };
    let client = TerraSyncClient::new(&config);
    tracing::debug!(base_url = %client.base_url(), "Using TerraSync API");

    match cli.command {
        Commands::Analyze { image } => {
            let analysis = analyze(&client, &image).await?;
            print_analysis(&analysis);
        }

        Commands::Trade {
            item,
            user,
            path,
            lat,
            lng,
        } => {
            let mut request = TradeRequest::new(item, user);
            request.preferred_path = path;
            if let (Some(lat), Some(lng)) = (lat, lng) {
                request = request.location(lat, lng);
            }
            let trade = client.orchestrate_trade(&request).await?;
            print_trade(&trade);
        }

        Commands::Stats => {
            let stats = client.impact_stats().await?;
            print_stats(&stats);
        }

        Commands::Demo { image, user } => {
            println!("[1] Analyzing {}...", image.display());
            let analysis = analyze(&client, &image).await?;
            print_analysis(&analysis);

            let mut request = TradeRequest::new(analysis.item_id.clone(), user);
            request.preferred_path = analysis.recommended_paths.first().cloned();
            println!(
                "\n[2] Orchestrating trade via {}...",
                request.preferred_path.as_deref().unwrap_or("any path")
            );
            let trade = client.orchestrate_trade(&request).await?;
            print_trade(&trade);

            println!("\n[3] Platform impact");
            let stats = client.impact_stats().await?;
            print_stats(&stats);
        }
    }

    Ok(())
}

async fn analyze(client: &TerraSyncClient, image: &Path) -> Result<AnalysisResult> {
    let upload = ImageUpload::from_path(image)
        .with_context(|| format!("Cannot upload {}", image.display()))?;
    Ok(client.analyze_item(upload).await?)
}

fn print_analysis(analysis: &AnalysisResult) {
    let value = &analysis.circular_value;
    let impact = &analysis.environmental_impact;

    println!("Analysis:");
    println!("  Item ID:       {}", analysis.item_id);
    println!("  Category:      {} / {}", analysis.category, analysis.subcategory);
    println!("  Condition:     {}", analysis.condition);
    println!("  Description:   {}", analysis.description);
    println!("  Value:         ${:.2}", value.monetary_value);
    println!("  Eco-credits:   {}", value.eco_credits);
    println!("  Carbon saved:  {:.1} kg", value.carbon_savings_kg);
    println!("  Confidence:    {:.0}%", value.confidence_score * 100.0);
    println!("  Paths:         {}", analysis.recommended_paths.join(", "));

    println!("\nEnvironmental impact:");
    println!("  CO2:    {:.1} kg", impact.co2_saved_kg);
    println!("  Waste:  {:.1} kg", impact.waste_diverted_kg);
    println!("  Water:  {:.0} L", impact.water_saved_liters);
    println!("  Energy: {:.0} kWh", impact.energy_saved_kwh);

    if !analysis.matching_organizations.is_empty() {
        println!("\n{:<14} {:<28} {:<18} {:>6} {:>8}", "ID", "Name", "Type", "Score", "Km");
        println!("{}", "-".repeat(78));
        for org in &analysis.matching_organizations {
            println!(
                "{:<14} {:<28} {:<18} {:>6.2} {:>8.1}",
                org.id, org.name, org.org_type, org.match_score, org.distance_km
            );
        }
    }
}

fn print_trade(trade: &TradeResult) {
    println!("Trade {} ({})", trade.trade_id, trade.status);

    for step in &trade.negotiation_steps {
        println!("  [{}] {:<10} {:<24} {}", step.step, step.action, step.party, step.details);
    }

    if !trade.matches.is_empty() {
        println!("\n{:<14} {:<28} {:>6} {:>8} {:>8}", "ID", "Name", "Score", "Credits", "Km");
        println!("{}", "-".repeat(70));
        for m in &trade.matches {
            let distance = m
                .distance_km
                .map(|d| format!("{d:.1}"))
                .unwrap_or_else(|| "N/A".to_string());
            println!(
                "{:<14} {:<28} {:>6.2} {:>8.0} {:>8}",
                m.organization_id,
                m.organization_name,
                m.match_score,
                m.proposed_terms.credit_offer,
                distance
            );
        }
    }

    match &trade.best_match {
        Some(best) => println!(
            "\nBest match: {} (pickup {})",
            best.organization_name,
            if best.proposed_terms.pickup_available { "available" } else { "unavailable" }
        ),
        None => println!("\nNo viable match found"),
    }
    println!("Eco-credits earned: {}", trade.eco_credits_earned);
    println!("Carbon impact:      {:.1} kg", trade.carbon_impact_kg);
}

fn print_stats(stats: &ImpactStats) {
    println!("Impact Stats:");
    println!("  CO2 sequestered:  {} t", stats.co2_sequestered_tons);
    println!("  Waste diverted:   {} kg", stats.waste_diverted_kg);
    println!("  Eco-credits:      {}", stats.eco_credits_earned);
    println!("  Recovery rate:    {}%", stats.recovery_rate_percent);
    println!("  Items processed:  {}", stats.items_processed);
    println!("  Active users:     {}", stats.active_users);
}
