//! ArgMatches → CliAction conversion.
//!
//! Also turns the JSON accepted by `upsert` into a [`Document`]:
//!
//! ```json
//! {"master_key": "…", "record_key": "…", "label": "…", "items": [ … ]}
//! ```
//!
//! `record_key` is optional (a fresh one is generated) and so is `items`.

use std::fs;

use clap::ArgMatches;
use tracedoc::json::from_json_str;
use tracedoc::{fields, Document, Item, MasterKey, RecordKey, Value};

/// The result of parsing the command line.
#[derive(Debug)]
pub enum CliAction {
    /// Upsert a document
    Upsert(Document),
    /// Print the record for a master key
    Get(MasterKey),
    /// Print every record
    List,
}

/// Translate parsed arguments into an action.
pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction, String> {
    match matches.subcommand() {
        Some(("upsert", sub)) => {
            let arg = required(sub, "document")?;
            let text = read_input(arg)?;
            parse_document(&text).map(CliAction::Upsert)
        }
        Some(("get", sub)) => {
            let key = required(sub, "master_key")?;
            MasterKey::parse(key)
                .map(CliAction::Get)
                .map_err(|e| e.to_string())
        }
        Some(("list", _)) => Ok(CliAction::List),
        Some((other, _)) => Err(format!("unknown command: {}", other)),
        None => Err("no command given".to_string()),
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, String> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| format!("missing argument: {}", name))
}

/// Inline JSON, or the contents of a file when the argument is `@path`.
fn read_input(arg: &str) -> Result<String, String> {
    match arg.strip_prefix('@') {
        Some(path) => fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e)),
        None => Ok(arg.to_string()),
    }
}

/// Parse the JSON form of a document.
pub fn parse_document(text: &str) -> Result<Document, String> {
    let value = from_json_str(text).map_err(|e| format!("document: {}", e))?;
    let object = value
        .as_object()
        .ok_or_else(|| format!("document must be a JSON object, got {}", value.type_name()))?;

    const KNOWN: [&str; 4] = [
        fields::MASTER_KEY,
        fields::RECORD_KEY,
        fields::LABEL,
        fields::ITEMS,
    ];
    if let Some(unknown) = object.keys().find(|k| !KNOWN.contains(&k.as_str())) {
        return Err(format!("document: unknown field '{}'", unknown));
    }

    let master_key = match value.get(fields::MASTER_KEY) {
        Some(Value::String(s)) => MasterKey::parse(s).map_err(|e| e.to_string())?,
        _ => return Err("document: master_key must be a UUID string".to_string()),
    };
    let record_key = match value.get(fields::RECORD_KEY) {
        None | Some(Value::Null) => RecordKey::new(),
        Some(Value::String(s)) => RecordKey::parse(s).map_err(|e| e.to_string())?,
        Some(_) => return Err("document: record_key must be a UUID string".to_string()),
    };
    let label = match value.get(fields::LABEL) {
        Some(Value::String(s)) => s.clone(),
        _ => return Err("document: label must be a string".to_string()),
    };
    let items = match value.get(fields::ITEMS) {
        None => Vec::new(),
        Some(Value::Array(items)) => items.iter().cloned().map(Item::new).collect(),
        Some(_) => return Err("document: items must be an array".to_string()),
    };

    Document::new(master_key, record_key, label)
        .map(|doc| doc.with_items(items))
        .map_err(|e| e.to_string())
}
