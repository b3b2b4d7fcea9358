use std::path::PathBuf;

use crate::command::Command;


/// A full `ffs` command line.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// `--config <file>`, if given.
    pub config: Option<PathBuf>,
    pub store: PathBuf,
    pub command: Command,
}


/// Parse `[--config <file>] <store-file> <command> [args...]`.
///
/// Arguments are expected WITHOUT the program name. A bare `help` (no
/// store file) is accepted and yields an empty store path.
pub fn parse_invocation(args: &[&str]) -> Result<Invocation, String> {
    let mut config = None;
    let mut rest = args;

    if rest.first() == Some(&"--config") {
        let path = take_arg(rest, 1, "--config")?;
        config = Some(PathBuf::from(path));
        rest = &rest[2..];
    }

    match rest.first() {
        None => Err("No store file specified. Run 'ffs help' for usage.".into()),
        Some(&"help") => Ok(Invocation {
            config,
            store: PathBuf::new(),
            command: parse_args(rest)?,
        }),
        Some(store) => Ok(Invocation {
            config,
            store: PathBuf::from(*store),
            command: parse_args(&rest[1..])?,
        }),
    }
}


/// Parse the command part of the command line into a typed `Command`.
pub fn parse_args(args: &[&str]) -> Result<Command, String> {
    if args.is_empty() {
        return Err("No command specified. Run 'ffs help' for usage.".into());
    }

    match args[0] {
        "show" => parse_show(args),
        "ls" => parse_ls(args),
        "get" => Ok(Command::Get { path: take_arg(args, 1, "get <path>")? }),
        "set" => parse_set(args),
        "mkdir" => Ok(Command::Mkdir { path: take_arg(args, 1, "mkdir <path>")? }),
        "rm" => Ok(Command::Rm { path: take_arg(args, 1, "rm <path>")? }),
        "link" => Ok(Command::Link {
            path: take_arg(args, 1, "link <path> <target>")?,
            target: take_arg(args, 2, "link <path> <target>")?,
        }),
        "mv" => Ok(Command::Mv {
            path: take_arg(args, 1, "mv <path> <new-name>")?,
            to: take_arg(args, 2, "mv <path> <new-name>")?,
        }),
        "help" => Ok(Command::Help { topic: args.get(1).map(|s| s.to_string()) }),
        _ => Err(format!("Unknown command: '{}'", args[0])),
    }
}


// ---------------------------------------------------------------------------
// Sub-parsers
// ---------------------------------------------------------------------------

/// `show [path]`
fn parse_show(args: &[&str]) -> Result<Command, String> {
    if args.len() > 2 {
        return Err("Usage: ffs <file> show [path]".into());
    }
    Ok(Command::Show { path: args.get(1).map(|s| s.to_string()) })
}

/// `ls [path] [--json]`
fn parse_ls(args: &[&str]) -> Result<Command, String> {
    let mut path = None;
    let mut format = None;
    for arg in &args[1..] {
        match *arg {
            "--json" => format = Some("json".to_string()),
            flag if flag.starts_with("--") => {
                return Err(format!("Unknown flag for ls: '{}'", flag));
            }
            p if path.is_none() => path = Some(p.to_string()),
            _ => return Err("Usage: ffs <file> ls [path] [--json]".into()),
        }
    }
    Ok(Command::Ls { path, format })
}

/// `set <path> <value...>`. Remaining words are joined with spaces.
fn parse_set(args: &[&str]) -> Result<Command, String> {
    if args.len() < 3 {
        return Err("Usage: ffs <file> set <path> <value>".into());
    }
    Ok(Command::Set {
        path: args[1].to_string(),
        value: args[2..].join(" "),
    })
}

fn take_arg(args: &[&str], i: usize, usage: &str) -> Result<String, String> {
    args.get(i)
        .map(|s| s.to_string())
        .ok_or_else(|| format!("Usage: ffs {}", usage))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_get() {
        assert_eq!(
            parse_args(&["get", "/chars/hero"]).unwrap(),
            Command::Get { path: "/chars/hero".into() }
        );
    }

    #[test]
    fn parse_set_joins_words() {
        assert_eq!(
            parse_args(&["set", "title", "The", "Game"]).unwrap(),
            Command::Set { path: "title".into(), value: "The Game".into() }
        );
        assert!(parse_args(&["set", "title"]).is_err());
    }

    #[test]
    fn parse_ls_variants() {
        assert_eq!(parse_args(&["ls"]).unwrap(), Command::Ls { path: None, format: None });
        assert_eq!(
            parse_args(&["ls", "/a", "--json"]).unwrap(),
            Command::Ls { path: Some("/a".into()), format: Some("json".into()) }
        );
        assert!(parse_args(&["ls", "--yaml"]).is_err());
        assert!(parse_args(&["ls", "a", "b"]).is_err());
    }

    #[test]
    fn parse_link_needs_target() {
        assert!(parse_args(&["link", "alias"]).is_err());
        assert_eq!(
            parse_args(&["link", "alias", "hero"]).unwrap(),
            Command::Link { path: "alias".into(), target: "hero".into() }
        );
    }

    #[test]
    fn parse_unknown_and_empty() {
        assert!(parse_args(&[]).is_err());
        assert!(parse_args(&["format"]).unwrap_err().contains("Unknown command"));
    }

    #[test]
    fn parse_full_invocation() {
        let inv = parse_invocation(&["--config", "s.yaml", "game.sav", "mkdir", "/a"]).unwrap();
        assert_eq!(inv.config, Some(PathBuf::from("s.yaml")));
        assert_eq!(inv.store, PathBuf::from("game.sav"));
        assert_eq!(inv.command, Command::Mkdir { path: "/a".into() });
    }

    #[test]
    fn parse_invocation_help_without_store() {
        let inv = parse_invocation(&["help"]).unwrap();
        assert_eq!(inv.command, Command::Help { topic: None });
        let inv = parse_invocation(&["help", "link"]).unwrap();
        assert_eq!(inv.command, Command::Help { topic: Some("link".into()) });
    }

    #[test]
    fn parse_invocation_errors() {
        assert!(parse_invocation(&[]).is_err());
        assert!(parse_invocation(&["--config"]).is_err());
        assert!(parse_invocation(&["game.sav"]).is_err());
    }
}
