/*!
 * Turnwise - Main Entry Point
 *
 * Runs one producer/consumer exercise against the selected buffer
 * variant and prints the final buffer size
 */

use anyhow::Result;
use tracing::info;
use turnwise::{init_tracing, run, Exercise, WorkloadConfig};

fn main() -> Result<()> {
    init_tracing();

    let exercise: Exercise = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "bounded".to_string())
        .parse()?;
    let config = WorkloadConfig::from_env();

    let report = run(exercise, &config)?;

    info!(
        produced = report.produced,
        consumed = report.consumed,
        "all tasks joined"
    );
    println!("Final buffer size: {}", report.final_len);
    Ok(())
}
