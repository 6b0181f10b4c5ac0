//! Command parsing for the shell.
//!
//! This module parses command strings into structured [`Command`] values.

/// Parsed command from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List every known package with its state.
    List,

    /// Show the state of one package.
    State {
        /// Target package.
        package: String,
    },

    /// Clone a package into the island.
    Clone {
        /// Target package.
        package: String,
    },

    /// Hide a package.
    Freeze {
        /// Target package.
        package: String,
    },

    /// Unhide a package.
    Defreeze {
        /// Target package.
        package: String,
    },

    /// Launch a package.
    Launch {
        /// Target package.
        package: String,
    },

    /// Remove a clone.
    Remove {
        /// Target package.
        package: String,
    },

    /// Open the details surface of a package.
    Enable {
        /// Target package.
        package: String,
    },

    /// Install a package for the owner user.
    OwnerInstall {
        /// Target package.
        package: String,
    },

    /// Whether a package only exists in the island.
    Exclusive {
        /// Target package.
        package: String,
    },

    /// Whether a package has a launcher entry.
    Launchable {
        /// Target package.
        package: String,
    },

    /// Display name of a package.
    Name {
        /// Target package.
        package: String,
    },

    /// Place a launch shortcut.
    Shortcut {
        /// Target package.
        package: String,
    },

    /// Name and enable the island profile.
    Activate,

    /// Offer to destroy the island.
    Destroy,

    /// Finish an install as the out-of-process installer would.
    Complete {
        /// Target package.
        package: String,
    },

    /// Uninstall a package from outside the engine.
    Uninstall {
        /// Target package.
        package: String,
    },

    /// The engine's own app was reinstalled.
    Reinstall,

    /// Accept the pending confirmation.
    Yes,

    /// Decline the pending confirmation.
    No,

    /// Show the command list.
    Help,

    /// Quit the shell.
    Quit,

    /// Empty input.
    Empty,

    /// Unknown or invalid command.
    Unknown {
        /// The original input.
        input: String,
    },

    /// Command with missing or invalid arguments.
    InvalidArgs {
        /// Command name.
        command: String,
        /// Error message.
        error: String,
    },
}

/// Parse a user input string into a command.
///
/// Commands start with `/`; the slash may be omitted.
pub fn parse(input: &str) -> Command {
    let input = input.trim();
    if input.is_empty() {
        return Command::Empty;
    }

    let cmd_str = input.strip_prefix('/').unwrap_or(input);
    let parts: Vec<&str> = cmd_str.split_whitespace().collect();
    let command = parts.first().copied().unwrap_or("");

    let with_package = |build: fn(String) -> Command| match parts.get(1) {
        Some(package) => build((*package).to_string()),
        None => Command::InvalidArgs {
            command: command.to_string(),
            error: format!("Usage: /{command} <package>"),
        },
    };

    match command {
        "list" | "ls" => Command::List,
        "state" => with_package(|package| Command::State { package }),
        "clone" => with_package(|package| Command::Clone { package }),
        "freeze" => with_package(|package| Command::Freeze { package }),
        "defreeze" | "unfreeze" => with_package(|package| Command::Defreeze { package }),
        "launch" => with_package(|package| Command::Launch { package }),
        "remove" => with_package(|package| Command::Remove { package }),
        "enable" => with_package(|package| Command::Enable { package }),
        "owner-install" => with_package(|package| Command::OwnerInstall { package }),
        "exclusive" => with_package(|package| Command::Exclusive { package }),
        "launchable" => with_package(|package| Command::Launchable { package }),
        "name" => with_package(|package| Command::Name { package }),
        "shortcut" => with_package(|package| Command::Shortcut { package }),
        "activate" => Command::Activate,
        "destroy" => Command::Destroy,
        "complete" => with_package(|package| Command::Complete { package }),
        "uninstall" => with_package(|package| Command::Uninstall { package }),
        "reinstall" => Command::Reinstall,
        "yes" | "y" => Command::Yes,
        "no" | "n" => Command::No,
        "help" | "?" => Command::Help,
        "quit" | "q" => Command::Quit,
        _ => Command::Unknown { input: input.to_string() },
    }
}

/// One-line usage of every command.
pub const HELP: &str = "\
/list                      list packages and their states
/state <package>           show one package
/clone <package>           clone into the island
/freeze <package>          hide
/defreeze <package>        unhide
/launch <package>          start the launcher entry
/remove <package>          remove a clone
/enable <package>          open app details
/owner-install <package>   install for the owner user
/exclusive <package>       only present in the island?
/launchable <package>      has a launcher entry?
/name <package>            display name
/shortcut <package>        place a launch shortcut
/activate                  name and enable the profile
/destroy                   tear down the island
/complete <package>        finish a pending install
/uninstall <package>       uninstall from outside the engine
/reinstall                 reinstall the engine app
/yes, /no                  answer the pending confirmation
/quit                      leave";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_clone() {
        assert_eq!(parse("/clone com.example.notes"), Command::Clone {
            package: "com.example.notes".into()
        });
    }

    #[test]
    fn parse_without_slash() {
        assert_eq!(parse("freeze com.example.notes"), Command::Freeze {
            package: "com.example.notes".into()
        });
    }

    #[test]
    fn parse_missing_package() {
        assert!(matches!(
            parse("/remove"),
            Command::InvalidArgs { command, error } if command == "remove" && error.contains("<package>")
        ));
    }

    #[test]
    fn parse_answers() {
        assert_eq!(parse("/yes"), Command::Yes);
        assert_eq!(parse("y"), Command::Yes);
        assert_eq!(parse("/no"), Command::No);
    }

    #[test]
    fn parse_quit() {
        assert_eq!(parse("/quit"), Command::Quit);
        assert_eq!(parse("/q"), Command::Quit);
    }

    #[test]
    fn parse_unknown_command() {
        assert!(matches!(parse("/unknown"), Command::Unknown { .. }));
    }

    #[test]
    fn parse_empty() {
        assert_eq!(parse("   "), Command::Empty);
    }

    #[test]
    fn help_mentions_every_package_command() {
        for command in ["clone", "freeze", "owner-install", "complete", "uninstall"] {
            assert!(HELP.contains(&format!("/{command} <package>")), "{command}");
        }
    }
}
