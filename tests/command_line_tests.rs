mod common;

use common::MockGeocoder;
use geoprobe::command_line::{Command, CommandLine};
use geoprobe::query::QueryBuilder;
use geoprobe::url_state::MemoryAddressBar;
use geoprobe::{Environment, SearchMode, SearchSession, StaticHost};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_blank_lines_are_ignored() {
  let mut cmd = CommandLine::new();
  assert_eq!(cmd.handle_line(""), None);
  assert_eq!(cmd.handle_line("   "), None);
  assert!(cmd.history.is_empty());
}

#[test]
fn test_parameter_commands() {
  let mut cmd = CommandLine::new();
  assert_eq!(
    cmd.handle_line("q Oslo S"),
    Some(Command::SearchTerm("Oslo S".to_string()))
  );
  assert_eq!(cmd.handle_line("q"), Some(Command::SearchTerm(String::new())));
  assert_eq!(
    cmd.handle_line("mode reverse"),
    Some(Command::Mode(SearchMode::Reverse))
  );
  assert_eq!(cmd.handle_line("env prod"), Some(Command::Env(Environment::Prod)));
  assert_eq!(
    cmd.handle_line("point 59,91 10,75"),
    Some(Command::Point("59,91".to_string(), "10,75".to_string()))
  );
  assert_eq!(
    cmd.handle_line("click 62.47 6.15"),
    Some(Command::Click { lat: 62.47, lon: 6.15 })
  );
  assert_eq!(cmd.handle_line("clear-focus"), Some(Command::ClearFocus));
  assert_eq!(
    cmd.handle_line("multiModal parent"),
    Some(Command::MultiModal("parent".to_string()))
  );
}

#[test]
fn test_malformed_commands() {
  let mut cmd = CommandLine::new();
  for line in ["mode sideways", "env moon", "focus 1", "click a b", "teleport"] {
    let command = cmd.handle_line(line);
    assert!(matches!(command, Some(Command::Unknown(_))), "{line}: {command:?}");
  }
}

#[test]
fn test_frontend_commands() {
  let mut cmd = CommandLine::new();
  assert_eq!(cmd.handle_line("quit"), Some(Command::Quit));
  assert_eq!(cmd.handle_line("exit"), Some(Command::Quit));
  assert_eq!(cmd.handle_line("help"), Some(Command::Help));
  assert_eq!(cmd.handle_line("show"), Some(Command::Show));
  for command in [
    Command::Show,
    Command::Help,
    Command::Quit,
    Command::Unknown("teleport".to_string()),
  ] {
    assert!(!command.is_edit(), "{command:?}");
  }
  assert!(Command::ClearFocus.is_edit());
  assert!(Command::Click { lat: 1.0, lon: 2.0 }.is_edit());
}

#[test]
fn test_history_skips_repeats() {
  let mut cmd = CommandLine::new();
  cmd.handle_line("q Oslo");
  cmd.handle_line("q Oslo");
  cmd.handle_line("show");
  assert_eq!(cmd.history, vec!["q Oslo", "show"]);
}

#[tokio::test(start_paused = true)]
async fn test_commands_drive_the_session() {
  let client = MockGeocoder::new(Duration::ZERO);
  let mut session = SearchSession::new(
    "",
    Arc::new(StaticHost::default()),
    MemoryAddressBar::new("/"),
    client.clone(),
    QueryBuilder::default(),
  );
  let mut cmd = CommandLine::new();

  for line in ["q Ålesund", "click 62.472 6.1495", "size 5"] {
    cmd.handle_line(line).unwrap().apply(&mut session);
  }
  assert_eq!(
    session.address_bar().location(),
    "/?q=%C3%85lesund&size=5&focus_lat=62.47200&focus_lon=6.14950"
  );

  for line in ["mode reverse", "click 59.9139 10.7522"] {
    cmd.handle_line(line).unwrap().apply(&mut session);
  }
  assert_eq!(session.params().lat, "59.91390");
  assert_eq!(session.params().lon, "10.75220");

  tokio::time::sleep(Duration::from_secs(1)).await;
  let calls = client.calls();
  assert_eq!(calls.len(), 1);
  assert!(calls[0].contains("/reverse?lang=no&size=5&point.lat=59.91390&point.lon=10.75220"));
}
