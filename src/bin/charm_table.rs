//! Print the expanded chief charm table: one row per quarter step with its
//! cost, the cumulative cost and the interpolated bonus at that level.
//! Usage: cargo run --bin charm_table -- [track_id]
//! Example: cargo run --bin charm_table
//!   → 52 rows from `1` to `16-0`.

use frostguide::progression::{bonus_at, ResourceCost, TrackRegistry};

fn format_cost(cost: &ResourceCost) -> String {
    cost.iter()
        .map(|(resource, amount)| format!("{resource}={amount}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let track_id = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "chief_charm".to_string());
    let registry = TrackRegistry::load_from_env()?;
    let track = registry.get(&track_id)?;

    println!("{} ({} steps)", track.name(), track.len());
    println!("index\tlevel\tbonus\tstep_cost\tcumulative");
    let mut cumulative = ResourceCost::new();
    for (index, step) in track.steps().iter().enumerate() {
        cumulative.add_from(&step.cost);
        let bonus = if track.has_bonus_curve() {
            format!("{:.2}", bonus_at(track, &step.label)?)
        } else {
            "-".to_string()
        };
        println!(
            "{index}\t{}\t{bonus}\t{}\t{}",
            step.label,
            format_cost(&step.cost),
            format_cost(&cumulative)
        );
    }
    Ok(())
}
