use std::env;
use std::fmt::Write as _;
use std::io;
use std::sync::Arc;

use crate::data::export::{export_track_csv, write_track_csv};
use crate::data::tracks::DEFAULT_TRACKS_DIR;
use crate::data::validate::{validate_track_dir, ValidationSeverity};
use crate::progression::{calculate, TrackRegistry, UpgradeEstimate, UpgradeQuery};
use crate::server::{self, BIND_ENV, DEFAULT_BIND};

const USAGE: &str = "usage: frostguide <serve|tracks|levels|cost|export|validate>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Serve,
    Tracks,
    Levels,
    Cost,
    Export,
    Validate,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("serve") => Some(Command::Serve),
        Some("tracks") => Some(Command::Tracks),
        Some("levels") => Some(Command::Levels),
        Some("cost") => Some(Command::Cost),
        Some("export") => Some(Command::Export),
        Some("validate") => Some(Command::Validate),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Serve) => handle_serve(),
        Some(Command::Tracks) => handle_tracks(),
        Some(Command::Levels) => handle_levels(args),
        Some(Command::Cost) => handle_cost(args),
        Some(Command::Export) => handle_export(args),
        Some(Command::Validate) => handle_validate(args),
        None => {
            eprintln!("{USAGE}");
            2
        }
    }
}

/// Arguments after the subcommand, without `--flags`.
fn positional(args: &[String]) -> Vec<&str> {
    args.iter()
        .skip(2)
        .map(String::as_str)
        .filter(|arg| !arg.starts_with("--"))
        .collect()
}

fn load_registry() -> Option<Arc<TrackRegistry>> {
    match TrackRegistry::load_from_env() {
        Ok(registry) => Some(registry),
        Err(err) => {
            eprintln!("failed to load track data: {err}");
            None
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T, what: &str) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize {what}: {err}");
            1
        }
    }
}

fn handle_serve() -> i32 {
    let bind_addr = env::var(BIND_ENV).unwrap_or_else(|_| DEFAULT_BIND.to_string());
    let Some(registry) = load_registry() else {
        return 1;
    };
    match server::run_server(&bind_addr, registry) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("server error: {err}");
            1
        }
    }
}

fn handle_tracks() -> i32 {
    let Some(registry) = load_registry() else {
        return 1;
    };
    match server::api::tracks_payload(&registry) {
        Ok(payload) => {
            println!("{payload}");
            0
        }
        Err(err) => {
            eprintln!("failed to serialize tracks: {err}");
            1
        }
    }
}

fn handle_levels(args: &[String]) -> i32 {
    let Some(track_id) = positional(args).first().copied() else {
        eprintln!("usage: frostguide levels <track>");
        return 2;
    };
    let Some(registry) = load_registry() else {
        return 1;
    };
    match registry.get(track_id) {
        Ok(track) => {
            for level in track.level_ids() {
                println!("{level}");
            }
            0
        }
        Err(err) => {
            eprintln!("{err}");
            1
        }
    }
}

fn handle_cost(args: &[String]) -> i32 {
    let positional = positional(args);
    let (Some(track), Some(from), Some(to)) = (
        positional.first().copied(),
        positional.get(1).copied(),
        positional.get(2).copied(),
    ) else {
        eprintln!("usage: frostguide cost <track> <from> <to> [quantity] [--table]");
        return 2;
    };
    let quantity = match positional.get(3) {
        Some(raw) => match raw.parse::<u32>() {
            Ok(quantity) => quantity,
            Err(_) => {
                eprintln!("invalid quantity '{raw}'");
                return 2;
            }
        },
        None => 1,
    };
    let as_table = args.iter().any(|arg| arg == "--table");

    let Some(registry) = load_registry() else {
        return 1;
    };
    let query = UpgradeQuery::new(track, from, to, quantity);
    let estimate = match calculate(&registry, &query) {
        Ok(estimate) => estimate,
        Err(err) => {
            eprintln!("cost failed: {err}");
            return 1;
        }
    };

    if as_table {
        print!("{}", render_table(&estimate));
        0
    } else {
        print_json(&estimate, "upgrade estimate")
    }
}

fn render_table(estimate: &UpgradeEstimate) -> String {
    let mut out = String::new();
    let breakdown = match estimate {
        UpgradeEstimate::Empty { track, from, to } => {
            let _ = writeln!(out, "{track}: nothing to upgrade from {from} to {to}");
            return out;
        }
        UpgradeEstimate::Upgrade(breakdown) => breakdown,
    };

    let _ = writeln!(
        out,
        "{}: {} -> {} ({} steps, x{})",
        breakdown.track, breakdown.from, breakdown.to, breakdown.steps, breakdown.quantity
    );
    let _ = writeln!(out, "resource\tper_unit\ttotal");
    for (resource, total) in breakdown.total.iter() {
        let _ = writeln!(out, "{resource}\t{}\t{total}", breakdown.per_unit.get(resource));
    }
    if let Some(bonus) = &breakdown.bonus {
        let stat = bonus.stat.as_deref().unwrap_or("bonus");
        let _ = writeln!(
            out,
            "{stat}\t{:.2}\t{:.2}\t(+{:.2})",
            bonus.before, bonus.after, bonus.delta
        );
    }
    if let Some(building) = &breakdown.building {
        let _ = writeln!(
            out,
            "build_time\t{}",
            format_duration(building.total_time_seconds)
        );
        let _ = writeln!(out, "power_gain\t{}", building.power_gain);
        if let Some(prerequisite) = &building.highest_prerequisite {
            let _ = writeln!(out, "requires\t{prerequisite}");
        }
    }
    for milestone in &breakdown.milestones {
        let _ = writeln!(out, "milestone\t{}", milestone.level);
    }
    out
}

/// `2d 4h 0m` style; seconds are dropped once the duration passes a minute.
pub fn format_duration(total_seconds: u64) -> String {
    let days = total_seconds / 86_400;
    let hours = total_seconds % 86_400 / 3_600;
    let minutes = total_seconds % 3_600 / 60;
    let seconds = total_seconds % 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

fn handle_export(args: &[String]) -> i32 {
    let positional = positional(args);
    let Some(track_id) = positional.first().copied() else {
        eprintln!("usage: frostguide export <track> [path]");
        return 2;
    };
    let Some(registry) = load_registry() else {
        return 1;
    };
    let track = match registry.get(track_id) {
        Ok(track) => track,
        Err(err) => {
            eprintln!("{err}");
            return 1;
        }
    };

    let result = match positional.get(1) {
        Some(path) => export_track_csv(track, path),
        None => write_track_csv(track, io::stdout().lock()),
    };
    match result {
        Ok(()) => {
            if let Some(path) = positional.get(1) {
                eprintln!("exported {} steps to {path}", track.len());
            }
            0
        }
        Err(err) => {
            eprintln!("export failed: {err}");
            1
        }
    }
}

fn handle_validate(args: &[String]) -> i32 {
    let dir = positional(args).first().copied().unwrap_or(DEFAULT_TRACKS_DIR);

    let report = match validate_track_dir(dir) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("validation failed: {err}");
            return 1;
        }
    };
    for diag in &report.diagnostics {
        match diag.severity {
            ValidationSeverity::Info => println!("{diag}"),
            _ => eprintln!("{diag}"),
        }
    }

    if report.has_errors() {
        eprintln!(
            "validation failed: {} error(s), {} warning(s)",
            report.count(ValidationSeverity::Error),
            report.count(ValidationSeverity::Warning)
        );
        1
    } else {
        println!("validation passed: {dir}");
        0
    }
}
