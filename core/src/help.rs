//! Usage text for the `ffs` command line.


/// Overview, or the usage line of one command.
pub fn help_text(topic: Option<&str>) -> String {
    match topic {
        None => overview(),
        Some(t) => match command_help(t) {
            Some(text) => text.to_string(),
            None => format!("Unknown help topic: '{}'. Run 'ffs help' for a list of commands.", t),
        },
    }
}


fn overview() -> String {
    "\
ffs: inspect and edit fake-filesystem save files

Usage: ffs [--config <settings.yaml>] <store-file> <command> [args...]

Commands:
  show [path]                 Print a namespace in save-file format
  ls [path] [--json]          List child namespaces and entities
  get <path>                  Print an entity's value
  set <path> <value>          Set an entity (creates missing namespaces)
  mkdir <path>                Create a namespace and missing parents
  rm <path>                   Remove a namespace or an entity
  link <path> <target>        Make <path> an alias of entity <target>
  mv <path> <new-name>        Rename an entity within its namespace
  help [command]              Show this message

The store file is created on the first write. Settings may also come from
the FFS_CONFIG environment variable. Set RUST_LOG=debug for load details.
"
    .to_string()
}


fn command_help(command: &str) -> Option<&'static str> {
    let text = match command {
        "show" => "ffs <file> show [path]\n\nPrint the namespace at [path] (default: root) in save-file format.",
        "ls" => "ffs <file> ls [path] [--json]\n\nList namespaces (with a trailing separator) and entities with their values.",
        "get" => "ffs <file> get <path>\n\nPrint the value of the entity at <path>.",
        "set" => "ffs <file> set <path> <value>\n\nSet the entity at <path>, creating it and any missing namespaces.",
        "mkdir" => "ffs <file> mkdir <path>\n\nCreate the namespace at <path> and any missing parents.",
        "rm" => "ffs <file> rm <path>\n\nRemove a namespace with everything below it, or a single entity slot.",
        "link" => "ffs <file> link <path> <target>\n\nCreate <path> as an alias sharing the entity at <target>.",
        "mv" => "ffs <file> mv <path> <new-name>\n\nRename an entity; aliases keep pointing at the same value.",
        "help" => "ffs help [command]",
        _ => return None,
    };
    Some(text)
}
