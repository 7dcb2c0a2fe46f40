use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use coffee_sales::{DashboardConfig, MonthTotal, ProductTotal, SalesDashboard};

/// Revenue per product and per month from coffee sales exports.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// JSON config file (sources, column names, "all products" sentinel).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Table, global = true)]
    format: Format,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Total revenue per product inside a date window.
    Products {
        /// First day, inclusive. Defaults to the earliest sale.
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day, inclusive. Defaults to today.
        #[arg(long)]
        end: Option<NaiveDate>,
        #[command(flatten)]
        sources: Sources,
    },
    /// Total revenue per month, optionally for some products only.
    Months {
        /// Product to include; repeat for several.
        /// The sentinel (default "All") selects every product.
        #[arg(long = "product")]
        products: Vec<String>,
        /// Also restrict to days from this one, inclusive.
        #[arg(long, requires = "end")]
        start: Option<NaiveDate>,
        /// Also restrict to days up to this one, inclusive.
        #[arg(long, requires = "start")]
        end: Option<NaiveDate>,
        #[command(flatten)]
        sources: Sources,
    },
    /// Describe the loaded table.
    Summary {
        #[command(flatten)]
        sources: Sources,
    },
}

#[derive(Args, Debug)]
struct Sources {
    /// Source files (.csv, .json, .parquet). Overrides the config's list.
    sources: Vec<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Table,
    Json,
}

#[derive(Serialize)]
struct Summary<'a> {
    records: usize,
    unparsed_timestamps: usize,
    products: Vec<&'a str>,
    first_sale: Option<String>,
    last_sale: Option<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DashboardConfig::from_file(path)?,
        None => DashboardConfig::default(),
    };

    match cli.command {
        Command::Products {
            start,
            end,
            sources,
        } => {
            let dash = open(&config, sources)?;
            let start = start
                .or_else(|| dash.date_bounds().map(|(lo, _)| lo.date()))
                .unwrap_or_else(|| Local::now().date_naive());
            let end = end.unwrap_or_else(|| Local::now().date_naive());
            let rows = dash.query_product_totals(start, end);
            print_products(&rows, cli.format)
        }
        Command::Months {
            products,
            start,
            end,
            sources,
        } => {
            let dash = open(&config, sources)?;
            let selection = if products.is_empty() {
                dash.selection([config.all_products.as_str()])
            } else {
                dash.selection(products)
            };
            let rows = match (start, end) {
                (Some(start), Some(end)) => {
                    dash.query_month_totals_in_range(&selection, start, end)
                }
                _ => dash.query_month_totals(&selection),
            };
            print_months(&rows, cli.format)
        }
        Command::Summary { sources } => {
            let dash = open(&config, sources)?;
            let bounds = dash.date_bounds();
            let summary = Summary {
                records: dash.table().len(),
                unparsed_timestamps: dash.table().unparsed_timestamps(),
                products: dash.products().iter().map(String::as_str).collect(),
                first_sale: bounds.map(|(lo, _)| lo.to_string()),
                last_sale: bounds.map(|(_, hi)| hi.to_string()),
            };
            match cli.format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
                Format::Table => {
                    println!("records:             {}", summary.records);
                    println!("unparsed timestamps: {}", summary.unparsed_timestamps);
                    println!("products:            {}", summary.products.join(", "));
                    if let (Some(first), Some(last)) = (&summary.first_sale, &summary.last_sale) {
                        println!("sales between:       {first} and {last}");
                    }
                }
            }
            Ok(())
        }
    }
}

fn open(config: &DashboardConfig, sources: Sources) -> Result<SalesDashboard> {
    let paths = if sources.sources.is_empty() {
        config.sources.clone()
    } else {
        sources.sources
    };
    SalesDashboard::load(&paths, config).context("loading sales sources")
}

fn print_products(rows: &[ProductTotal], format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(rows)?),
        Format::Table => {
            let width = rows.iter().map(|r| r.category.len()).max().unwrap_or(0).max(8);
            println!("{:<width$}  {:>12}", "category", "total");
            for row in rows {
                println!("{:<width$}  {:>12.2}", row.category, row.total);
            }
        }
    }
    Ok(())
}

fn print_months(rows: &[MonthTotal], format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", serde_json::to_string_pretty(rows)?),
        Format::Table => {
            println!("{:<7}  {:>12}", "month", "total");
            for row in rows {
                println!("{:<7}  {:>12.2}", row.period_label, row.total);
            }
        }
    }
    Ok(())
}
