use anyhow::Result;
use std::path::PathBuf;

use editcore::Command;

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Edit(Command),
    ToggleTheme,
    Export(PathBuf),
    Import(PathBuf),
    Help,
    Quit,
}

const APP_COMMANDS: [&str; 5] = ["theme", "export", "import", "help", "q"];

pub struct CommandProcessor;

impl CommandProcessor {
    /// Parse one command line. Empty input is `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Invocation>> {
        let line = line.trim().trim_start_matches(':');
        let mut parts = line.split_whitespace();
        let Some(name) = parts.next() else {
            return Ok(None);
        };

        let invocation = match name {
            "theme" => Invocation::ToggleTheme,
            "help" => Invocation::Help,
            "q" | "quit" => Invocation::Quit,
            "export" | "import" => {
                let rest: Vec<&str> = parts.collect();
                if rest.is_empty() {
                    return Err(anyhow::anyhow!("{} needs a file name", name));
                }
                let path = PathBuf::from(rest.join(" "));
                if name == "export" {
                    Invocation::Export(path)
                } else {
                    Invocation::Import(path)
                }
            }
            other => match other.parse::<Command>() {
                Ok(cmd) => Invocation::Edit(cmd),
                Err(_) => return Err(anyhow::anyhow!("Not an editor command: {}", other)),
            },
        };

        Ok(Some(invocation))
    }

    /// Command names starting with `prefix`, sorted.
    pub fn suggestions(prefix: &str) -> Vec<&'static str> {
        let prefix = prefix.trim_start_matches(':');
        let mut names: Vec<&'static str> = Command::ALL
            .iter()
            .map(Command::name)
            .chain(APP_COMMANDS)
            .filter(|name| name.starts_with(prefix))
            .collect();
        names.sort_unstable();
        names
    }
}
