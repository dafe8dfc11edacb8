//! Line-oriented referee protocol.
//!
//! The referee talks to the agent over stdin/stdout in the style of GTP:
//! one command per line, an optional numeric id in front, and a response of
//! `=<id> <payload>` or `?<id> <error>` followed by a blank line.
//!
//! ## Commands
//!
//! - `name`, `version`, `protocol_version`
//! - `list_commands`, `known_command <cmd>`
//! - `quit`
//! - `init <N> <H|V> <N*N cell tokens>` - start a game as the given side
//! - `update <x,y,D|pass>` - the opponent's move
//! - `move` - choose, play and print our move
//! - `showboard` - print the live board
//! - `weights` - print the current weights
//!
//! ```text
//! init 3 V + + H + V + + + +
//! =
//!
//! move
//! = 1,1,U
//! ```

use std::io::{self, BufRead, Write};

use log::{debug, warn};

use crate::agent::Agent;
use crate::config::AgentConfig;
use crate::moves::{parse_move, str_move};

const KNOWN_COMMANDS: &[&str] = &[
    "init",
    "known_command",
    "list_commands",
    "move",
    "name",
    "protocol_version",
    "quit",
    "showboard",
    "update",
    "version",
    "weights",
];

const PROTOCOL_VERSION: &str = "1";

pub struct RefereeSession {
    config: AgentConfig,
    agent: Option<Agent>,
}

impl Default for RefereeSession {
    fn default() -> Self {
        Self::new(AgentConfig::default())
    }
}

impl RefereeSession {
    pub fn new(config: AgentConfig) -> Self {
        Self {
            config,
            agent: None,
        }
    }

    /// The agent of the game in progress, if `init` has been sent.
    pub fn agent(&self) -> Option<&Agent> {
        self.agent.as_ref()
    }

    /// Serve stdin until `quit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Serve commands from `input`, writing responses to `output`.
    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }

            let command = parts[0].to_lowercase();
            let args = &parts[1..];
            debug!("<- {command_line}");

            let (success, message) = self.execute(&command, args);
            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();

            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Split an optional leading numeric id from the command.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        if end == 0 {
            return (None, trimmed);
        }
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute one command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "protocol_version" => (true, PROTOCOL_VERSION.to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(cmd) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "init" => self.init(args),

            "update" => {
                let Some(agent) = self.agent.as_mut() else {
                    return (false, "no game in progress".to_string());
                };
                let Some(text) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                match parse_move(text).and_then(|mv| agent.update(mv)) {
                    Ok(()) => (true, String::new()),
                    Err(e) => {
                        warn!("rejected update {text}: {e}");
                        (false, e.to_string())
                    }
                }
            }

            "move" => {
                let Some(agent) = self.agent.as_mut() else {
                    return (false, "no game in progress".to_string());
                };
                match agent.make_move() {
                    Ok(mv) => (true, str_move(mv)),
                    Err(e) => (false, e.to_string()),
                }
            }

            "showboard" => match &self.agent {
                Some(agent) => (true, format!("\n{}", agent.board()).trim_end().to_string()),
                None => (false, "no game in progress".to_string()),
            },

            "weights" => match &self.agent {
                Some(agent) => (true, agent.weights().to_string()),
                None => (false, "no game in progress".to_string()),
            },

            _ => (false, format!("unknown command: {command}")),
        }
    }

    fn init(&mut self, args: &[&str]) -> (bool, String) {
        let [size, player, cells @ ..] = args else {
            return (false, "usage: init <N> <H|V> <cells>".to_string());
        };
        let Ok(size) = size.parse::<usize>() else {
            return (false, format!("invalid size: {size}"));
        };
        let mut chars = player.chars();
        let (Some(c), None) = (chars.next(), chars.next()) else {
            return (false, format!("invalid player: {player}"));
        };

        match Agent::init(size, &cells.join(" "), c, self.config.clone()) {
            Ok(agent) => {
                self.agent = Some(agent);
                (true, String::new())
            }
            Err(e) => (false, e.to_string()),
        }
    }
}
