use anyhow::{anyhow, Context, Result};
use std::io::Read;
use std::path::PathBuf;
use textprobe_lib::api::{self, AppState};
use textprobe_lib::models::{AuthResponse, DetectRequest, HistoryQuery, LoginRequest, RegisterRequest};
use textprobe_lib::services::config_store::ConfigStore;
use textprobe_lib::services::history::HistoryStore;
use textprobe_lib::services::users::UserStore;
use textprobe_lib::services::text_processor::preview;

const USAGE: &str = "Usage:
  textprobe --register --username <name> --email <email> --password <pw>
  textprobe --login --email <email> --password <pw>
  textprobe --profile --token <token>
  textprobe [<path>|-] --token <token> [--out <json_path>]
  textprobe --history --token <token> [--page <n>] [--limit <n>]
  textprobe --delete <id> --token <token>

Options:
  --config <dir>   config directory (default: platform config dir)
  --no-history     do not record the analysis

The token may also be given through TEXTPROBE_TOKEN.
Reads from stdin when no path (or `-`) is given.";

/// Flags followed by a value.
const VALUE_FLAGS: &[&str] = &[
    "--token", "--out", "--page", "--limit", "--delete", "--config", "--username", "--email",
    "--password",
];

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn has_flag(args: &[String], key: &str) -> bool {
    args.iter().any(|a| a == key)
}

/// First argument that is neither a flag nor a flag's value.
fn input_path(args: &[String]) -> Option<&str> {
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            rest.next();
        } else if arg == "-" || !arg.starts_with('-') {
            return Some(arg.as_str());
        }
    }
    None
}

fn required_arg(args: &[String], key: &str) -> Result<String> {
    parse_arg_value(args, key).ok_or_else(|| anyhow!("missing {} <value>\n\n{}", key, USAGE))
}

fn token(args: &[String]) -> Result<String> {
    parse_arg_value(args, "--token")
        .or_else(|| std::env::var("TEXTPROBE_TOKEN").ok())
        .ok_or_else(|| anyhow!("missing --token (or TEXTPROBE_TOKEN); run --login first"))
}

fn print_auth(response: &AuthResponse) {
    println!("{}", response.message);
    println!("User: {} <{}> ({})", response.user.username, response.user.email, response.user.id);
    println!("Token: {}", response.token);
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read stdin failed")?;
            Ok(buf)
        }
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("read file failed: {}", p)),
    }
}

fn load_state(args: &[String]) -> Result<AppState> {
    let config_dir = match parse_arg_value(args, "--config") {
        Some(dir) => PathBuf::from(dir),
        None => ConfigStore::default_config_dir()
            .ok_or_else(|| anyhow!("no config directory available; pass --config <dir>"))?,
    };
    let store = ConfigStore::new(config_dir);
    let config = api::get_config(&store).map_err(|e| anyhow!(e))?;

    let users_file = store.users_file(&config);
    let users = UserStore::open(&users_file, config.users.session_days)
        .with_context(|| format!("open users failed: {}", users_file.display()))?;

    let history = if has_flag(args, "--no-history") {
        HistoryStore::in_memory(api::page_limits(&config))
    } else {
        let history_file = store.history_file(&config);
        HistoryStore::open(&history_file, api::page_limits(&config))
            .with_context(|| format!("open history failed: {}", history_file.display()))?
    };
    Ok(AppState::with_stores(config, history, users))
}

async fn run_detect(state: &AppState, token: &str, args: &[String]) -> Result<()> {
    let text = read_input(input_path(args))?;

    let response = api::detect_text(state, token, DetectRequest { text: text.clone() })
        .await
        .map_err(|e| anyhow!(e))?;

    println!("Input: {}", preview(text.trim(), 80));
    println!(
        "AI probability: {:.1}%  (words={}, chars={}, language={})",
        response.ai_probability * 100.0,
        response.word_count,
        response.characters,
        response.detected_language.as_str()
    );
    for (name, value) in response.metrics.entries() {
        println!("  {:<20} {:.3}", name, value);
    }
    println!("Id: {}", response.id);

    if let Some(out_path) = parse_arg_value(args, "--out") {
        let json = serde_json::to_string_pretty(&response)?;
        std::fs::write(&out_path, json).with_context(|| format!("write out failed: {}", out_path))?;
        println!();
        println!("Wrote JSON: {}", out_path);
    }

    Ok(())
}

async fn run_history(state: &AppState, token: &str, args: &[String]) -> Result<()> {
    let query = HistoryQuery {
        page: parse_arg_value(args, "--page").and_then(|s| s.parse().ok()),
        limit: parse_arg_value(args, "--limit").and_then(|s| s.parse().ok()),
    };
    let page = api::get_history(state, token, query).await.map_err(|e| anyhow!(e))?;

    println!(
        "History: page {}/{} ({} total)",
        page.pagination.page,
        page.pagination.pages.max(1),
        page.pagination.total
    );
    for d in &page.detections {
        println!(
            "[{}] {}  prob={:.3} words={} chars={}",
            d.created_at.format("%Y-%m-%d %H:%M:%S"),
            d.id,
            d.ai_probability,
            d.word_count,
            d.characters
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        eprintln!("{}", USAGE);
        return Ok(());
    }

    textprobe_lib::init_logging();

    let state = load_state(&args)?;

    if has_flag(&args, "--register") {
        let request = RegisterRequest {
            username: required_arg(&args, "--username")?,
            email: required_arg(&args, "--email")?,
            password: required_arg(&args, "--password")?,
        };
        let response = api::register(&state, request).map_err(|e| anyhow!(e))?;
        print_auth(&response);
        return Ok(());
    }

    if has_flag(&args, "--login") {
        let request = LoginRequest {
            email: required_arg(&args, "--email")?,
            password: required_arg(&args, "--password")?,
        };
        let response = api::login(&state, request).map_err(|e| anyhow!(e))?;
        print_auth(&response);
        return Ok(());
    }

    let token = token(&args)?;

    if has_flag(&args, "--profile") {
        let profile = api::get_profile(&state, &token).map_err(|e| anyhow!(e))?;
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    if let Some(id) = parse_arg_value(&args, "--delete") {
        let response = api::delete_detection(&state, &token, &id)
            .await
            .map_err(|e| anyhow!(e))?;
        println!("{}", response.message);
        return Ok(());
    }

    if has_flag(&args, "--history") {
        return run_history(&state, &token, &args).await;
    }

    run_detect(&state, &token, &args).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_input_path_skips_flag_values() {
        let a = args(&["textprobe", "--token", "abc", "notes.txt"]);
        assert_eq!(input_path(&a), Some("notes.txt"));

        let a = args(&["textprobe", "notes.txt", "--out", "result.json"]);
        assert_eq!(input_path(&a), Some("notes.txt"));

        let a = args(&["textprobe", "--no-history", "--config", "/tmp/cfg", "-"]);
        assert_eq!(input_path(&a), Some("-"));
    }

    #[test]
    fn test_input_path_defaults_to_stdin() {
        let a = args(&["textprobe", "--token", "abc", "--out", "result.json"]);
        assert_eq!(input_path(&a), None);
        assert_eq!(input_path(&args(&["textprobe"])), None);
    }
}
