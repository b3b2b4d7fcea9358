//! ffs: command-line editor for fake-filesystem save files.
//!
//! # Usage
//!
//! ```text
//! ffs game.sav ls /
//! ffs game.sav set /chars/hero sword
//! ffs game.sav link /party/leader /chars/hero
//! ffs --config settings.yaml game.sav show
//! ```

use std::path::{Path, PathBuf};
use std::process;

use log::debug;

use fakefs_core::cli::{parse_invocation, Invocation};
use fakefs_core::command::{Command, Response};
use fakefs_core::help::help_text;
use fakefs_core::settings::FsSettings;
use fakefs_core::shell::Shell;


fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();
    let arg_refs: Vec<&str> = args[1..].iter().map(|s| s.as_str()).collect();

    let inv = match parse_invocation(&arg_refs) {
        Ok(inv) => inv,
        Err(e) => {
            eprintln!("ffs: {}", e);
            process::exit(1);
        }
    };

    // Help needs no store file.
    if let Command::Help { topic } = &inv.command {
        println!("{}", help_text(topic.as_deref()));
        return;
    }

    match run(inv) {
        Response::Ok { output } => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Response::Error { message } => {
            eprintln!("ffs error: {}", message);
            process::exit(1);
        }
    }
}


/// Settings file from `--config`, else `FFS_CONFIG`. None means defaults.
fn resolve_config(flag: Option<PathBuf>) -> Option<PathBuf> {
    flag.or_else(|| std::env::var("FFS_CONFIG").ok().map(PathBuf::from))
}


fn load_settings(path: Option<&Path>) -> Result<FsSettings, String> {
    match path {
        Some(p) => {
            debug!("loading settings from {}", p.display());
            FsSettings::load(p).map_err(|e| e.to_string())
        }
        None => Ok(FsSettings::default()),
    }
}


/// Open the store, run the command and write the store back if it changed.
fn run(inv: Invocation) -> Response {
    let config = resolve_config(inv.config);
    let settings = match load_settings(config.as_deref()) {
        Ok(s) => s,
        Err(e) => return Response::error(e),
    };

    let mut shell = match Shell::open(&inv.store, settings) {
        Ok(shell) => shell,
        Err(e) => {
            return Response::error(format!("Failed to open {}: {}", inv.store.display(), e));
        }
    };

    let response = shell.execute(inv.command);
    if response.is_ok() && shell.is_dirty() {
        if let Err(e) = shell.save(&inv.store) {
            return Response::error(format!("Failed to save {}: {}", inv.store.display(), e));
        }
        debug!("saved {}", inv.store.display());
    }
    response
}


#[cfg(test)]
mod tests {
    use super::*;

    fn test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("ffs-cli-test").join(name);
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    // Explicit empty settings file so FFS_CONFIG from the environment is never consulted.
    fn invocation(store: &Path, command: Command) -> Invocation {
        let cfg = store.with_extension("yaml");
        std::fs::write(&cfg, "").unwrap();
        Invocation { config: Some(cfg), store: store.to_path_buf(), command }
    }

    #[test]
    fn resolve_config_precedence() {
        let old = std::env::var("FFS_CONFIG").ok();

        std::env::remove_var("FFS_CONFIG");
        assert_eq!(resolve_config(None), None);

        std::env::set_var("FFS_CONFIG", "/tmp/test-ffs.yaml");
        assert_eq!(resolve_config(None), Some(PathBuf::from("/tmp/test-ffs.yaml")));
        assert_eq!(
            resolve_config(Some(PathBuf::from("flag.yaml"))),
            Some(PathBuf::from("flag.yaml"))
        );

        match old {
            Some(v) => std::env::set_var("FFS_CONFIG", v),
            None => std::env::remove_var("FFS_CONFIG"),
        }
    }

    #[test]
    fn run_writes_store_on_change() {
        let dir = test_dir("writes");
        let store = dir.join("game.sav");

        let resp = run(invocation(&store, Command::Set { path: "/cfg/w".into(), value: "640".into() }));
        assert!(resp.is_ok());
        let text = std::fs::read_to_string(&store).unwrap();
        assert_eq!(text, "\"cfg\" : {\n\t\"w\" : \"640\"\n}\n");

        match run(invocation(&store, Command::Get { path: "/cfg/w".into() })) {
            Response::Ok { output } => assert_eq!(output, "640"),
            Response::Error { message } => panic!("Unexpected error: {}", message),
        }
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn run_read_does_not_create_store() {
        let dir = test_dir("readonly");
        let store = dir.join("missing.sav");
        let resp = run(invocation(&store, Command::Ls { path: None, format: None }));
        assert!(resp.is_ok());
        assert!(!store.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn run_bad_settings_file() {
        let dir = test_dir("badcfg");
        let cfg = dir.join("settings.yaml");
        std::fs::write(&cfg, "separator: '{'\n").unwrap();
        let inv = Invocation {
            config: Some(cfg),
            store: dir.join("game.sav"),
            command: Command::Ls { path: None, format: None },
        };
        assert!(!run(inv).is_ok());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
