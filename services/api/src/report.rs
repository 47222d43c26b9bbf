use crate::infra::{load_service, write_orders_csv};
use clap::Args;
use nexgen_dispatch::config::AppConfig;
use nexgen_dispatch::dashboard::FilteredTable;
use nexgen_dispatch::dispatch::{Priority, RankedRecommendation, WeightInput};
use nexgen_dispatch::error::AppError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct RecommendArgs {
    /// Order to dispatch
    #[arg(long)]
    pub(crate) order_id: String,
    /// Weight for the cost criterion, 0 to 1
    #[arg(long, default_value_t = 0.5)]
    pub(crate) cost: f64,
    /// Weight for the speed criterion, 0 to 1
    #[arg(long, default_value_t = 0.3)]
    pub(crate) speed: f64,
    /// Weight for the CO2 criterion, 0 to 1
    #[arg(long, default_value_t = 0.2)]
    pub(crate) sustainability: f64,
    /// Override the reference data directory
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct OrdersArgs {
    /// Product category to keep, case-insensitive
    #[arg(long)]
    pub(crate) category: Option<String>,
    /// Priority to keep (low, medium, high, critical or the export labels)
    #[arg(long, value_parser = parse_priority)]
    pub(crate) priority: Option<Priority>,
    /// Write the filtered rows to this CSV file instead of listing them
    #[arg(long)]
    pub(crate) export: Option<PathBuf>,
    /// Override the reference data directory
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
}

fn parse_priority(raw: &str) -> Result<Priority, String> {
    raw.parse()
}

pub(crate) fn run_recommend(args: RecommendArgs) -> Result<(), AppError> {
    let RecommendArgs {
        order_id,
        cost,
        speed,
        sustainability,
        data_dir,
    } = args;

    let config = AppConfig::load()?;
    let service = load_service(&config, data_dir)?;
    let recommendation = service.recommend(
        &order_id,
        WeightInput {
            cost,
            speed,
            sustainability,
        },
    )?;

    render_recommendation(&recommendation);
    Ok(())
}

pub(crate) fn run_orders(args: OrdersArgs) -> Result<(), AppError> {
    let OrdersArgs {
        category,
        priority,
        export,
        data_dir,
    } = args;

    let config = AppConfig::load()?;
    let service = load_service(&config, data_dir)?;
    let table = service.orders(category.as_deref(), priority);

    match export {
        Some(path) => {
            let file = BufWriter::new(File::create(&path)?);
            write_orders_csv(&table, file)?.flush()?;
            println!("Exported {} orders to {}", table.len(), path.display());
        }
        None => render_order_table(&table),
    }

    Ok(())
}

fn render_recommendation(recommendation: &RankedRecommendation) {
    println!("Dispatch recommendation for {}", recommendation.order_id);
    println!("Required category: {}", recommendation.category);
    let weights = recommendation.weights;
    println!(
        "Weights: cost {:.2} | speed {:.2} | sustainability {:.2}",
        weights.cost(),
        weights.speed(),
        weights.sustainability()
    );

    if recommendation.is_empty() {
        println!("\nNo suitable vehicle found.");
    } else {
        println!("\n{}", recommendation.summary());
        println!("\nRanked candidates:");
        for entry in &recommendation.entries {
            println!(
                "{:>2}. {} ({}) score {:.3} | cost {:.2} | time {:.2} h | CO2 {:.1} kg",
                entry.rank,
                entry.vehicle_id,
                entry.vehicle_type,
                entry.score,
                entry.predicted_cost,
                entry.predicted_time_hours,
                entry.predicted_co2_kg
            );
            println!(
                "    sub-scores: cost {:.2} | speed {:.2} | sustainability {:.2}",
                entry.sub_scores.cost, entry.sub_scores.speed, entry.sub_scores.sustainability
            );
        }
    }

    if !recommendation.excluded.is_empty() {
        println!("\nExcluded vehicles:");
        for excluded in &recommendation.excluded {
            println!("- {}: {}", excluded.vehicle_id, excluded.reason.summary());
        }
    }
}

fn render_order_table(table: &FilteredTable) {
    println!("{} orders", table.len());
    for row in &table.rows {
        println!(
            "- {} | {} | {} | {} -> {} | {:.0} kg | {}",
            row.order_id,
            row.priority,
            row.product_category,
            row.origin,
            row.destination,
            row.weight_kg,
            row.carrier.as_deref().unwrap_or("unassigned")
        );
    }
}
