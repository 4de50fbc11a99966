use creature_combat::{run, Action, CliOptions, Weather};
use std::env;
use tracing_subscriber::EnvFilter;
use std::path::PathBuf;
use std::time::Duration;

fn usage() -> ! {
    eprintln!(
        "Usage: cargo run --release -- [--roster roster.json] [--seed SEED] [--pacing-ms MS] \
[--weather rain|sun] [--moves 0,1,run,...] [--json-log log.json]"
    );
    std::process::exit(1);
}

fn parse_actions(raw: &str) -> anyhow::Result<Vec<Action>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|token| match token.to_ascii_lowercase().as_str() {
            "run" | "flee" => Ok(Action::Run),
            other => other
                .parse()
                .map(Action::Fight)
                .map_err(|_| anyhow::anyhow!("Unknown action {other} (use a move index or run)")),
        })
        .collect()
}

fn parse_args() -> anyhow::Result<CliOptions> {
    let mut roster_path = PathBuf::from("roster.json");
    let mut seed = 0u64;
    let mut pacing = Duration::from_millis(1000);
    let mut weather = None;
    let mut actions = vec![Action::Fight(0)];
    let mut json_log = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--roster" => {
                roster_path = args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--roster requires a path (e.g. --roster roster.json)")
                })?;
            }
            "--seed" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--seed requires a number"))?;
                seed = val.parse()?;
            }
            "--pacing-ms" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--pacing-ms requires milliseconds"))?;
                pacing = Duration::from_millis(val.parse()?);
            }
            "--weather" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--weather requires rain or sun"))?;
                weather = match val.to_ascii_lowercase().as_str() {
                    "rain" => Some(Weather::Rain),
                    "sun" => Some(Weather::Sun),
                    "none" => None,
                    other => anyhow::bail!("Unknown weather {other} (use rain, sun or none)"),
                };
            }
            "--moves" => {
                let val = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--moves requires a list like 0,1,run"))?;
                actions = parse_actions(&val)?;
            }
            "--json-log" => {
                json_log = Some(args.next().map(PathBuf::from).ok_or_else(|| {
                    anyhow::anyhow!("--json-log requires a path (e.g. --json-log log.json)")
                })?);
            }
            "--help" | "-h" => usage(),
            other => return Err(anyhow::anyhow!("Unknown argument {other}")),
        }
    }

    Ok(CliOptions {
        roster_path,
        seed,
        pacing,
        weather,
        actions,
        json_log,
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = parse_args()?;
    run(opts)
}
