//! Operator commands typed on the console.
//!
//! ```text
//! connect [host] [port]   start a connection (defaults from config)
//! disconnect              close the connection
//! down <key>              press a key
//! up <key>                release a key
//! tap <key>               press then release a key
//! keys                    show the keys currently held
//! help                    list commands
//! quit                    exit
//! ```
//!
//! Keys are given by name (`W`, `Space`, `Escape`, `Control`, …) or as a
//! hexadecimal identifier (`0x57`).

use keyrelay_core::keymap::qt;
use keyrelay_core::KeyId;
use thiserror::Error;

/// Usage text printed by `help`.
pub const HELP_TEXT: &str = "\
commands:
  connect [host] [port]   start a connection
  disconnect              close the connection
  down <key>              press a key
  up <key>                release a key
  tap <key>               press then release a key
  keys                    show the keys currently held
  help                    list commands
  quit                    exit";

/// Errors produced while parsing a console line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}' (type 'help')")]
    UnknownCommand(String),

    #[error("'{command}' needs a <{argument}> argument")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },

    #[error("too many arguments for '{0}'")]
    TooManyArguments(&'static str),

    #[error("unknown key '{0}'")]
    UnknownKey(String),

    #[error("invalid port '{0}'")]
    InvalidPort(String),
}

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// `None` fields fall back to the configured defaults.
    Connect {
        host: Option<String>,
        port: Option<u16>,
    },
    Disconnect,
    Down(KeyId),
    Up(KeyId),
    Tap(KeyId),
    Keys,
    Help,
    Quit,
}

impl ConsoleCommand {
    /// Parses one line of operator input.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] describing the first problem found.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or(CommandError::Empty)?.to_ascii_lowercase();
        let args: Vec<&str> = words.collect();

        match verb.as_str() {
            "connect" | "c" => parse_connect(&args),
            "disconnect" | "dc" => no_args("disconnect", &args, ConsoleCommand::Disconnect),
            "down" | "press" => Ok(ConsoleCommand::Down(key_arg("down", &args)?)),
            "up" | "release" => Ok(ConsoleCommand::Up(key_arg("up", &args)?)),
            "tap" => Ok(ConsoleCommand::Tap(key_arg("tap", &args)?)),
            "keys" => no_args("keys", &args, ConsoleCommand::Keys),
            "help" | "?" => Ok(ConsoleCommand::Help),
            "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
            other => Err(CommandError::UnknownCommand(other.to_string())),
        }
    }
}

fn parse_connect(args: &[&str]) -> Result<ConsoleCommand, CommandError> {
    match args {
        [] => Ok(ConsoleCommand::Connect {
            host: None,
            port: None,
        }),
        [target] => {
            // `connect host:port` is accepted alongside `connect host port`.
            if let Some((host, port)) = target.rsplit_once(':') {
                if !host.is_empty() && !host.contains(':') {
                    return Ok(ConsoleCommand::Connect {
                        host: Some(host.to_string()),
                        port: Some(parse_port(port)?),
                    });
                }
            }
            Ok(ConsoleCommand::Connect {
                host: Some(target.to_string()),
                port: None,
            })
        }
        [host, port] => Ok(ConsoleCommand::Connect {
            host: Some(host.to_string()),
            port: Some(parse_port(port)?),
        }),
        _ => Err(CommandError::TooManyArguments("connect")),
    }
}

fn parse_port(raw: &str) -> Result<u16, CommandError> {
    raw.parse::<u16>()
        .ok()
        .filter(|p| *p != 0)
        .ok_or_else(|| CommandError::InvalidPort(raw.to_string()))
}

fn key_arg(command: &'static str, args: &[&str]) -> Result<KeyId, CommandError> {
    match args {
        [] => Err(CommandError::MissingArgument {
            command,
            argument: "key",
        }),
        [name] => qt::key_from_name(name).ok_or_else(|| CommandError::UnknownKey(name.to_string())),
        _ => Err(CommandError::TooManyArguments(command)),
    }
}

fn no_args(
    command: &'static str,
    args: &[&str],
    parsed: ConsoleCommand,
) -> Result<ConsoleCommand, CommandError> {
    if args.is_empty() {
        Ok(parsed)
    } else {
        Err(CommandError::TooManyArguments(command))
    }
}
