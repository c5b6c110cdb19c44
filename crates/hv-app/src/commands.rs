//! Command script parsing and execution
//!
//! One command per line; blank lines and `#` comments are ignored.
//!
//! ```text
//! step 2
//! waypoint 3 up
//! year 2014
//! select France, Togo
//! click-map United States of America
//! click-point Finland
//! search fin
//! clear
//! show
//! ```

use thiserror::Error;

use hv_core::{CoreError, ScrollDirection, TransactionReport};
use hv_views::Viewport;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Step(usize),
    Waypoint { index: usize, direction: ScrollDirection },
    Year(i32),
    Select(Vec<String>),
    ClickMap(String),
    ClickPoint(String),
    Search(String),
    Clear,
    Show,
}

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("Unknown command '{0}'")]
    Unknown(String),

    #[error("'{command}' needs {expected}")]
    MissingArgument { command: String, expected: &'static str },

    #[error("'{value}' is not a valid {expected}")]
    Invalid { value: String, expected: &'static str },
}

impl Command {
    /// Parse one script line; `None` for blanks and comments
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let word = word.to_ascii_lowercase();

        let require = |expected: &'static str| {
            if rest.is_empty() {
                Err(CommandError::MissingArgument {
                    command: word.clone(),
                    expected,
                })
            } else {
                Ok(rest)
            }
        };

        let command = match word.as_str() {
            "step" => Command::Step(parse_number(require("a step index")?, "step index")?),
            "waypoint" => {
                let mut parts = require("a step index")?.split_whitespace();
                let index = parse_number(parts.next().unwrap_or_default(), "step index")?;
                let direction = match parts.next().map(str::to_ascii_lowercase).as_deref() {
                    None | Some("down") => ScrollDirection::Down,
                    Some("up") => ScrollDirection::Up,
                    Some(other) => {
                        return Err(CommandError::Invalid {
                            value: other.to_string(),
                            expected: "scroll direction",
                        })
                    }
                };
                Command::Waypoint { index, direction }
            }
            "year" => Command::Year(parse_number(require("a year")?, "year")?),
            "select" => Command::Select(
                require("country names")?
                    .split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            "click-map" => Command::ClickMap(require("a boundary name")?.to_string()),
            "click-point" => Command::ClickPoint(require("a country name")?.to_string()),
            "search" => Command::Search(require("a query")?.to_string()),
            "clear" => Command::Clear,
            "show" => Command::Show,
            _ => return Err(CommandError::Unknown(word.to_string())),
        };
        Ok(Some(command))
    }

    /// Run the command against the viewport. `Ok(None)` means nothing was published.
    pub fn execute(&self, viewport: &Viewport) -> Result<Option<TransactionReport>, CoreError> {
        let dashboard = viewport.dashboard();
        let report = match self {
            Command::Step(index) => dashboard.go_to_step(*index)?,
            Command::Waypoint { index, direction } => {
                let step = dashboard.registry().step_for_waypoint(*index, *direction);
                dashboard.go_to_step(step)?
            }
            Command::Year(year) => dashboard.set_year(*year),
            Command::Select(names) => dashboard.select_countries(names.iter().cloned()),
            Command::ClickMap(name) => viewport.click_region(name),
            Command::ClickPoint(name) => viewport.click_point(name),
            Command::Search(query) => dashboard.search(query),
            Command::Clear => dashboard.clear(),
            Command::Show => return Ok(None),
        };
        Ok(Some(report))
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, expected: &'static str) -> Result<T, CommandError> {
    value.trim().parse().map_err(|_| CommandError::Invalid {
        value: value.to_string(),
        expected,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("step 3"), Ok(Some(Command::Step(3))));
        assert_eq!(Command::parse("  YEAR 2014 "), Ok(Some(Command::Year(2014))));
        assert_eq!(
            Command::parse("waypoint 4 up"),
            Ok(Some(Command::Waypoint { index: 4, direction: ScrollDirection::Up }))
        );
        assert_eq!(
            Command::parse("waypoint 4"),
            Ok(Some(Command::Waypoint { index: 4, direction: ScrollDirection::Down }))
        );
        assert_eq!(
            Command::parse("select France, Togo ,"),
            Ok(Some(Command::Select(vec!["France".to_string(), "Togo".to_string()])))
        );
        assert_eq!(
            Command::parse("click-map United States of America"),
            Ok(Some(Command::ClickMap("United States of America".to_string())))
        );
        assert_eq!(Command::parse("clear"), Ok(Some(Command::Clear)));
    }

    #[test]
    fn test_blank_and_comments() {
        assert_eq!(Command::parse(""), Ok(None));
        assert_eq!(Command::parse("   # scroll to gdp"), Ok(None));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Command::parse("zoom 3"), Err(CommandError::Unknown("zoom".to_string())));
        assert!(matches!(Command::parse("step"), Err(CommandError::MissingArgument { .. })));
        assert!(matches!(Command::parse("step two"), Err(CommandError::Invalid { .. })));
        assert!(matches!(Command::parse("waypoint 2 sideways"), Err(CommandError::Invalid { .. })));
    }

    #[test]
    fn test_execute_script() {
        use hv_core::{
            AliasTable, AttributeKey, Dashboard, GeoJoin, Indicators, Record, RecordStore, SelectionMode,
            StepRegistry, ViewState,
        };

        let store = RecordStore::new(vec![
            Record::new("Finland", 2013, Indicators::missing().with(AttributeKey::LifeLadder, 7.8)),
            Record::new("Togo", 2013, Indicators::missing().with(AttributeKey::LifeLadder, 2.8)),
        ])
        .unwrap();
        let dashboard = Dashboard::new(
            store,
            GeoJoin::new(Vec::new(), AliasTable::builtin()),
            StepRegistry::default(),
            ViewState::new(2013, 0),
        )
        .unwrap();
        let viewport = Viewport::new(dashboard);

        let run = |line: &str| Command::parse(line).unwrap().unwrap().execute(&viewport);

        assert!(run("show").unwrap().is_none());
        assert_eq!(run("waypoint 3 up").unwrap().unwrap().view_state.active_step_index, 2);
        assert!(matches!(run("step 12"), Err(CoreError::InvalidStep { .. })));

        let report = run("search tog").unwrap().unwrap();
        assert_eq!(report.view_state.selection_mode, SelectionMode::Explicit);
        assert!(viewport.dashboard().store().is_country_selected("Togo"));

        run("clear").unwrap();
        assert_eq!(viewport.dashboard().view_state().selection_mode, SelectionMode::Browsing);
    }
}
