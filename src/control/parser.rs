use serde_json::json;

use crate::models::Command;

/// One parsed line of operator input.
#[derive(Debug)]
pub enum Directive {
    /// Broadcast this command to every connected client
    Dispatch(Command),
    /// Report the number of connected clients
    Status,
    /// Shut the server down
    Quit,
}

/// Operator-facing parse diagnostics. None of these abort the control loop.
#[derive(Debug, PartialEq)]
pub enum ParseError {
    Empty,
    UnknownDirective(String),
    MissingParameters {
        directive: &'static str,
        usage: &'static str,
    },
    InvalidNumber(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Empty => write!(f, "empty input"),
            ParseError::UnknownDirective(directive) => write!(
                f,
                "Invalid command '{}' - known commands: move, attack, collect, defend, communicate, status, quit",
                directive
            ),
            ParseError::MissingParameters { directive, usage } => {
                write!(f, "Missing parameters for '{}' - usage: {}", directive, usage)
            }
            ParseError::InvalidNumber(token) => {
                write!(f, "Expected a number, got '{}'", token)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Parse one line of operator input.
pub fn parse_directive(line: &str) -> Result<Directive, ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&directive, args)) = tokens.split_first() else {
        return Err(ParseError::Empty);
    };

    match directive.to_lowercase().as_str() {
        "quit" => Ok(Directive::Quit),
        "status" => Ok(Directive::Status),
        "move" => {
            let [x, y, z] = coordinates(args, "move", "move <x> <y> <z>")?;
            Ok(dispatch("move", json!({ "x": x, "y": y, "z": z })))
        }
        "attack" => match args.first() {
            Some(target) => Ok(dispatch("attack", json!({ "target": target }))),
            None => Err(ParseError::MissingParameters {
                directive: "attack",
                usage: "attack <target>",
            }),
        },
        "collect" => match args.first() {
            // radius and maxItems are fixed defaults, not operator input
            Some(item) => Ok(dispatch(
                "collect",
                json!({ "itemType": item, "radius": 10, "maxItems": 64 }),
            )),
            None => Err(ParseError::MissingParameters {
                directive: "collect",
                usage: "collect <item>",
            }),
        },
        "defend" => {
            let [x, y, z] = coordinates(args, "defend", "defend <x> <y> <z>")?;
            Ok(dispatch(
                "defend",
                json!({ "x": x, "y": y, "z": z, "radius": 10 }),
            ))
        }
        "communicate" => {
            if args.is_empty() {
                Err(ParseError::MissingParameters {
                    directive: "communicate",
                    usage: "communicate <message>",
                })
            } else {
                Ok(dispatch("communicate", json!({ "message": args.join(" ") })))
            }
        }
        other => Err(ParseError::UnknownDirective(other.to_string())),
    }
}

fn dispatch(action: &str, parameters: serde_json::Value) -> Directive {
    Directive::Dispatch(Command::new(action, parameters))
}

/// Parse three numeric tokens, tolerating trailing commas (`move 1, 2, 3`).
fn coordinates(
    args: &[&str],
    directive: &'static str,
    usage: &'static str,
) -> Result<[f64; 3], ParseError> {
    if args.len() < 3 {
        return Err(ParseError::MissingParameters { directive, usage });
    }
    let mut coords = [0.0; 3];
    for (slot, token) in coords.iter_mut().zip(args) {
        let cleaned = token.trim_end_matches(',');
        *slot = cleaned
            .parse()
            .map_err(|_| ParseError::InvalidNumber(token.to_string()))?;
    }
    Ok(coords)
}
