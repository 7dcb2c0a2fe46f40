use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

const MENU: &[(&str, f64)] = &[
    ("Americano", 28.9),
    ("Americano with Milk", 33.8),
    ("Cappuccino", 38.7),
    ("Cocoa", 38.7),
    ("Cortado", 28.9),
    ("Espresso", 24.0),
    ("Hot Chocolate", 38.7),
    ("Latte", 38.7),
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }
}

struct Sale {
    at: NaiveDateTime,
    cash: bool,
    product: &'static str,
    price: f64,
}

fn generate(rng: &mut SimpleRng, first_day: NaiveDate, days: u32) -> Vec<Sale> {
    let mut sales = Vec::new();
    for offset in 0..days {
        let day = first_day + TimeDelta::days(offset.into());
        let count = 3 + rng.below(10);
        let mut at = day.and_hms_opt(7, 0, 0).unwrap_or_default();
        for _ in 0..count {
            at += TimeDelta::seconds((300 + rng.below(3600)) as i64);
            let (product, price) = MENU[rng.below(MENU.len() as u64) as usize];
            sales.push(Sale {
                at,
                cash: rng.below(10) == 0,
                product,
                price,
            });
        }
    }
    sales
}

/// `timestamp_format` differs between the two files on purpose: the loader
/// has to accept both.
fn write_source(path: &Path, sales: &[Sale], timestamp_format: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(["date", "datetime", "cash_type", "card", "money", "coffee_name"])?;
    for (i, sale) in sales.iter().enumerate() {
        let card = if sale.cash {
            String::new()
        } else {
            format!("ANON-0000-0000-{:04}", i % 97)
        };
        writer.write_record([
            sale.at.format("%Y-%m-%d").to_string(),
            sale.at.format(timestamp_format).to_string(),
            if sale.cash { "cash" } else { "card" }.to_string(),
            card,
            sale.price.to_string(),
            sale.product.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let first = NaiveDate::from_ymd_opt(2024, 3, 1).context("start date")?;
    let second = NaiveDate::from_ymd_opt(2024, 6, 1).context("start date")?;
    let older = generate(&mut rng, first, 92);
    let newer = generate(&mut rng, second, 61);

    write_source(Path::new("Coffee Sales_1.csv"), &older, "%Y-%m-%d %H:%M:%S%.3f")?;
    write_source(Path::new("Coffee Sales_2.csv"), &newer, "%Y-%m-%dT%H:%M:%S")?;

    println!(
        "Wrote {} sales to 'Coffee Sales_1.csv' and {} to 'Coffee Sales_2.csv'",
        older.len(),
        newer.len()
    );
    Ok(())
}
