//! Clap command tree.

use clap::{Arg, ArgAction, Command};

/// Build the `tracedoc` command.
pub fn build_cli() -> Command {
    Command::new("tracedoc")
        .about("Append-merge store for tracing documents")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .help("TOML configuration file")
                .global(true),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .short('d')
                .value_name("DIR")
                .help("Directory holding collection snapshots [default: .tracedoc]")
                .global(true),
        )
        .arg(
            Arg::new("ephemeral")
                .long("ephemeral")
                .action(ArgAction::SetTrue)
                .conflicts_with("data-dir")
                .help("Keep data in memory only")
                .global(true),
        )
        .arg(
            Arg::new("collection")
                .long("collection")
                .value_name("NAME")
                .help("Collection to read and write")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("Log more (-v debug, -vv trace)")
                .global(true),
        )
        .subcommand(
            Command::new("upsert")
                .about("Insert a document or append its items to the stored one")
                .arg(
                    Arg::new("document")
                        .required(true)
                        .value_name("JSON|@FILE")
                        .help("Document as inline JSON, or @path to read it from a file"),
                ),
        )
        .subcommand(
            Command::new("get")
                .about("Print the stored record for a master key")
                .arg(Arg::new("master_key").required(true).value_name("MASTER_KEY")),
        )
        .subcommand(Command::new("list").about("Print every stored record"))
}
