use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDate};

use bolastats::config::AppConfig;
use bolastats::dashboard::{Dashboard, render_text};
use bolastats::logging;
use bolastats::trends::TrendProfile;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    logging::init_stderr_logging();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("{}", usage());
        return Ok(());
    }

    let mut config = AppConfig::from_env();
    if let Some(loc) = arg_value(&args, "historical") {
        config.sources.historical = loc;
    }
    if let Some(loc) = arg_value(&args, "fixtures") {
        config.sources.fixtures = loc;
    }
    if let Some(raw) = arg_value(&args, "profile") {
        config.profile = TrendProfile::parse(&raw)
            .ok_or_else(|| anyhow!("unknown profile `{raw}` (expected classic or extended)"))?;
    }
    let today = match arg_value(&args, "today") {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .with_context(|| format!("invalid --today `{raw}`, expected YYYY-MM-DD"))?,
        None => Local::now().date_naive(),
    };

    let dashboard = Dashboard::load(&config, today);
    print!("{}", render_text(&dashboard));
    Ok(())
}

/// `--name=value` or `--name value`.
fn arg_value(args: &[String], name: &str) -> Option<String> {
    let flag = format!("--{name}");
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if *arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn usage() -> &'static str {
    "trends - print head-to-head trends for the current gameweek\n\
     \n\
     Options:\n\
       --historical <loc>   results sheet (URL or path)\n\
       --fixtures <loc>     fixtures sheet (URL or path)\n\
       --profile <name>     classic (last 5) or extended (last 8)\n\
       --today <date>       evaluate rounds as of YYYY-MM-DD\n\
     \n\
     Defaults come from BOLASTATS_* environment variables."
}
