// Dump one day's partition as JSON rows.
//
// Usage: cargo run --example dump_partition -- [OUTPUT_DIR] [DATE]
//   OUTPUT_DIR  default: ./host_metrics
//   DATE        YYYY-MM-DD, default: the newest partition in OUTPUT_DIR

use hostmetrics::partition_repo::PartitionRepo;
use std::env;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let dir = args.get(1).map(String::as_str).unwrap_or("./host_metrics");
    let repo = PartitionRepo::new(dir);

    let date = match args.get(2) {
        Some(s) => chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")?,
        None => match repo.list_partitions()?.last() {
            Some((date, _)) => *date,
            None => anyhow::bail!("no partitions in {}", dir),
        },
    };

    let rows = repo.read_partition(date)?;
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
