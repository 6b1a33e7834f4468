/// Fuzzy Search Example
///
/// This example demonstrates:
/// - Ranking values against a query
/// - How rank tiers order search results
/// - Debounced typing with explicit timestamps

use datatable::{rank_item, CellValue, ColumnSpec, FilterTarget, RankOptions, Row, TableController, TableOptions};
use std::time::{Duration, Instant};

const CITIES: [&str; 10] = [
    "Ålesund",
    "Alexandria",
    "Dallas",
    "Halifax",
    "Kuala Lumpur",
    "Las Palmas",
    "Palo Alto",
    "Salt Lake City",
    "São Paulo",
    "Tallinn",
];

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    println!("=== DataTable Fuzzy Search Example ===\n");

    // 1. Raw ranking
    println!("1. Ranking cities against \"al\":");
    let options = RankOptions::default();
    for city in CITIES.iter() {
        let rank = rank_item(&CellValue::from(*city), "al", &options);
        println!("   {:<16} {:?} (passed: {})", city, rank.ranking, rank.passed);
    }
    println!();

    // 2. The same query through a table, sorted by rank
    let rows: Vec<Row> = CITIES.iter().enumerate().map(|(i, city)| Row::new(i).with("city", *city)).collect();
    let mut table = TableController::new(vec![ColumnSpec::accessor("city")], rows, TableOptions::default())?;
    table.toggle_sort("city", false)?;

    // 3. Simulated typing: only the final text is applied
    let t0 = Instant::now();
    for (i, text) in ["s", "sa", "sao"].iter().enumerate() {
        let at = t0 + Duration::from_millis(120 * i as u64);
        table.input_filter(FilterTarget::Global, *text, at)?;
        println!("   typed {:<4} -> draft {:?}, applied {:?}", text, table.filter_draft(&FilterTarget::Global), table.global_filter());
    }

    if let Some(deadline) = table.next_input_deadline() {
        table.poll_inputs(deadline);
    }

    println!("\n2. Results for {:?} after the debounce delay:", table.global_filter());
    for row in table.page_rows() {
        let rank = table.filter_meta().get(row.id(), "city");
        println!("   {:<16} {:?}", row.get("city").map(|c| c.to_text()).unwrap_or_default(), rank.map(|r| r.ranking));
    }

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
