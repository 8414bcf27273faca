//! Print the JSON Schema of `schema.json` (default) or `report.json`
//! (`-- report`) artifacts.

use dbreflect_core::{Database, ImportReport};
use schemars::schema_for;

fn main() {
    let schema = match std::env::args().nth(1).as_deref() {
        Some("report") => schema_for!(ImportReport),
        _ => schema_for!(Database),
    };
    let json = serde_json::to_string_pretty(&schema).expect("serialize json schema");
    println!("{json}");
}
