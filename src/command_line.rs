use crate::environment::Environment;
use crate::params::SearchMode;
use crate::session::SearchSession;
use crate::url_state::AddressBar;
use std::collections::HashMap;

const HISTORY_LIMIT: usize = 100;

pub const HELP: &str = "\
Commands:
  q <text>              search term (autocomplete)
  mode <autocomplete|reverse>
  env <dev|staging|prod>
  lat <v> | lon <v>     reverse point
  point <lat> <lon>     reverse point
  focus <lat> <lon>     focus point
  focus-lat <v> | focus-lon <v>
  clear-focus
  click <lat> <lon>     map click: focus in autocomplete, point in reverse
  size <n> | layers <v> | sources <v> | multimodal <v> | radius <km>
  show | help | quit";

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
  // Parameter edits
  SearchTerm(String),
  Mode(SearchMode),
  Env(Environment),
  Lat(String),
  Lon(String),
  Point(String, String),
  Focus(String, String),
  FocusLat(String),
  FocusLon(String),
  ClearFocus,
  Click { lat: f64, lon: f64 },
  Size(String),
  Layers(String),
  Sources(String),
  MultiModal(String),
  Radius(String),

  // Front-end commands
  Show,
  Help,
  Quit,

  // Unknown or malformed command, with the reason
  Unknown(String),
}

impl Command {
  /// Whether the command edits the search parameters.
  #[must_use]
  pub fn is_edit(&self) -> bool {
    !matches!(
      self,
      Command::Show | Command::Help | Command::Quit | Command::Unknown(_)
    )
  }

  /// Applies an edit command to the session. Other commands are ignored.
  pub fn apply<A: AddressBar>(self, session: &mut SearchSession<A>) {
    match self {
      Command::SearchTerm(term) => session.set_search_term(&term),
      Command::Mode(mode) => session.set_mode(mode),
      Command::Env(env) => session.set_environment(env),
      Command::Lat(lat) => session.set_lat(&lat),
      Command::Lon(lon) => session.set_lon(&lon),
      Command::Point(lat, lon) => session.edit(|p| {
        p.set_lat(&lat);
        p.set_lon(&lon);
      }),
      Command::Focus(lat, lon) => session.edit(|p| {
        p.set_focus_lat(&lat);
        p.set_focus_lon(&lon);
      }),
      Command::FocusLat(lat) => session.set_focus_lat(&lat),
      Command::FocusLon(lon) => session.set_focus_lon(&lon),
      Command::ClearFocus => session.clear_focus(),
      Command::Click { lat, lon } => match session.params().mode {
        SearchMode::Autocomplete => session.set_focus_from_click(lat, lon),
        SearchMode::Reverse => session.set_point_from_click(lat, lon),
      },
      Command::Size(size) => session.set_size(&size),
      Command::Layers(layers) => session.set_layers(&layers),
      Command::Sources(sources) => session.set_sources(&sources),
      Command::MultiModal(multi_modal) => session.set_multi_modal(&multi_modal),
      Command::Radius(radius) => session.set_boundary_radius(&radius),
      Command::Show | Command::Help | Command::Quit | Command::Unknown(_) => {}
    }
  }
}

/// Line based command input with a history, read by the terminal front-end.
pub struct CommandLine {
  pub history: Vec<String>,
  command_handlers: HashMap<String, fn() -> Command>,
}

impl Default for CommandLine {
  fn default() -> Self {
    Self::new()
  }
}

impl CommandLine {
  #[must_use]
  pub fn new() -> Self {
    let mut cmd = Self {
      history: Vec::new(),
      command_handlers: HashMap::new(),
    };

    cmd.setup_command_handlers();
    cmd
  }

  fn setup_command_handlers(&mut self) {
    self
      .command_handlers
      .insert("quit".to_string(), || Command::Quit);
    self
      .command_handlers
      .insert("exit".to_string(), || Command::Quit);
    self
      .command_handlers
      .insert("show".to_string(), || Command::Show);
    self
      .command_handlers
      .insert("help".to_string(), || Command::Help);
    self
      .command_handlers
      .insert("clear-focus".to_string(), || Command::ClearFocus);
  }

  /// Parses one input line. Blank lines yield `None`.
  pub fn handle_line(&mut self, line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
      return None;
    }

    if self.history.last().map(String::as_str) != Some(line) {
      self.history.push(line.to_string());
      if self.history.len() > HISTORY_LIMIT {
        self.history.remove(0);
      }
    }

    Some(self.parse(line))
  }

  fn parse(&self, line: &str) -> Command {
    let (cmd, args) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let args = args.trim();

    if let Some(handler) = self.command_handlers.get(cmd) {
      return handler();
    }

    match cmd {
      "q" | "search" => Command::SearchTerm(args.to_string()),
      "mode" => match args.parse::<SearchMode>() {
        Ok(mode) => Command::Mode(mode),
        Err(e) => Command::Unknown(e),
      },
      "env" => match args.parse::<Environment>() {
        Ok(env) => Command::Env(env),
        Err(e) => Command::Unknown(e.to_string()),
      },
      "lat" => Command::Lat(args.to_string()),
      "lon" => Command::Lon(args.to_string()),
      "focus-lat" => Command::FocusLat(args.to_string()),
      "focus-lon" => Command::FocusLon(args.to_string()),
      "point" | "focus" => match split_pair(args) {
        Some((lat, lon)) if cmd == "point" => Command::Point(lat.to_string(), lon.to_string()),
        Some((lat, lon)) => Command::Focus(lat.to_string(), lon.to_string()),
        None => Command::Unknown(format!("{cmd} expects <lat> <lon>")),
      },
      "click" => match split_pair(args)
        .and_then(|(lat, lon)| Some((lat.parse::<f64>().ok()?, lon.parse::<f64>().ok()?)))
      {
        Some((lat, lon)) => Command::Click { lat, lon },
        None => Command::Unknown("click expects two numbers".to_string()),
      },
      "size" => Command::Size(args.to_string()),
      "layers" => Command::Layers(args.to_string()),
      "sources" => Command::Sources(args.to_string()),
      "multimodal" | "multiModal" => Command::MultiModal(args.to_string()),
      "radius" => Command::Radius(args.to_string()),
      _ => Command::Unknown(format!("Unknown command: {line}")),
    }
  }
}

fn split_pair(args: &str) -> Option<(&str, &str)> {
  let mut parts = args.split_whitespace();
  match (parts.next(), parts.next(), parts.next()) {
    (Some(lat), Some(lon), None) => Some((lat, lon)),
    _ => None,
  }
}
