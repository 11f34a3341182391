//! Free-text coordinate handling for the latitude/longitude inputs.

/// Normalizes user typed coordinate text into a plain decimal string.
///
/// Commas are read as decimal separators, anything that is not a digit, a
/// period or a leading minus is dropped, and only the first period survives.
/// Never fails; garbage collapses to an empty string.
#[must_use]
pub fn sanitize(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  let mut seen_period = false;
  for (i, c) in raw.replace(',', ".").chars().filter(is_coordinate_char).enumerate() {
    match c {
      '-' if i != 0 => {}
      '.' if seen_period => {}
      '.' => {
        seen_period = true;
        out.push(c);
      }
      _ => out.push(c),
    }
  }
  out
}

fn is_coordinate_char(c: &char) -> bool {
  c.is_ascii_digit() || *c == '.' || *c == '-'
}

/// Formats a coordinate picked on the map the way the inputs store it.
#[must_use]
pub fn format_clicked(value: f64) -> String {
  format!("{value:.5}")
}
