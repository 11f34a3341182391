use std::sync::Arc;

use anyhow::Result;
use clap::Parser as CliParser;
use geoprobe::command_line::{Command, CommandLine, HELP};
use geoprobe::client::SurfClient;
use geoprobe::config::Config;
use geoprobe::query::GeocoderVersion;
use geoprobe::url_state::MemoryAddressBar;
use geoprobe::{Environment, FetchOutcome, SearchSession, StaticHost};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(clap::Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// Hostname the harness pretends to be served from. Decides the default environment.
  #[arg(long, default_value = "localhost")]
  host: String,
  /// Initial query string, e.g. "mode=reverse&lat=59.91&lon=10.75".
  #[arg(short, long, default_value = "")]
  url: String,
  /// Environment to start in, overriding the query string.
  #[arg(short, long)]
  env: Option<Environment>,
  /// Use the v1 geocoder API.
  #[arg(long, default_value_t = false)]
  geocoder_v1: bool,
  /// Replaces the v2 base URL, like GEOCODER_V2_URL.
  #[arg(long)]
  override_url: Option<String>,
}

fn print_outcome(outcome: &FetchOutcome, query_url: &str) {
  if !query_url.is_empty() {
    println!("GET {query_url}");
  }
  match outcome {
    FetchOutcome::Success { results } => {
      println!("{} result{}", results.len(), if results.len() == 1 { "" } else { "s" });
      for (i, result) in results.iter().enumerate() {
        println!("{:>3}. {result}", i + 1);
      }
    }
    FetchOutcome::Failure {
      status_code,
      message,
    } => println!("Error {status_code}: {message}"),
  }
}

fn print_state(session: &SearchSession<MemoryAddressBar>) {
  println!("location: {}", session.address_bar().location());
  println!("{:#?}", session.params());
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  tracing_subscriber::fmt()
    .with_target(false)
    .with_env_filter(EnvFilter::from_default_env())
    .compact()
    .init();

  let mut config = Config::new();
  if args.override_url.is_some() {
    config.geocoder_v2_override = args.override_url.clone();
  }
  if args.geocoder_v1 {
    config.version = Some(GeocoderVersion::V1);
  }
  tracing::info!(
    "Starting geoprobe on host {} with geocoder {}",
    args.host,
    config.version()
  );

  let client = Arc::new(SurfClient::new(config.client_name()));
  let mut session = SearchSession::with_timing(
    &args.url,
    Arc::new(StaticHost::new(args.host.clone())),
    MemoryAddressBar::new("/"),
    client,
    config.query_builder(),
    config.debounce(),
    config.timeout(),
  );
  if let Some(env) = args.env {
    session.set_environment(env);
  }

  if let Some(endpoint) = session.override_endpoint().filter(|_| session.override_active()) {
    println!("Notice: geocoder v2 is overridden with {endpoint}");
  }
  println!("location: {}", session.address_bar().location());

  let mut outcomes = session.subscribe();
  let mut command_line = CommandLine::new();
  let mut lines = BufReader::new(tokio::io::stdin()).lines();

  loop {
    tokio::select! {
      line = lines.next_line() => {
        let Some(line) = line? else { break };
        let Some(command) = command_line.handle_line(&line) else { continue };
        if command.is_edit() {
          command.apply(&mut session);
          println!("location: {}", session.address_bar().location());
          continue;
        }
        match command {
          Command::Quit => break,
          Command::Help => println!("{HELP}"),
          Command::Show => print_state(&session),
          Command::Unknown(reason) => println!("{reason}"),
          _ => {}
        }
      }
      changed = outcomes.changed() => {
        if changed.is_err() {
          break;
        }
        let outcome = outcomes.borrow_and_update().clone();
        let query_url = if session.params().is_primary_input_empty() {
          String::new()
        } else {
          session.query_url()
        };
        print_outcome(&outcome, &query_url);
      }
    }
  }

  session.close();
  Ok(())
}
