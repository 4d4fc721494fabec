use std::io::Write;
use std::sync::Arc;

use assert_cmd::cmd::Command;
use serde::Serialize;
use shardplan_core::catalog::{NodeId, ShardPlacement, TableInfo};
use shardplan_core::functions::Functions;
use shardplan_core::symbol::{ColumnIdent, Function, FunctionIdent, Reference, Symbol, TableIdent};
use shardplan_core::types::DataType;
use tempfile::NamedTempFile;

#[allow(dead_code)]
pub const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);

pub fn make_cli() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).expect("Failed to find binary")
}

/// Write a request to a temp file, the file is removed on drop.
#[allow(dead_code)]
pub fn request_file(request: &impl Serialize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    serde_json::to_writer(&mut file, request).expect("Failed to write request");
    file.flush().expect("Failed to flush request");
    file
}

/// `doc.visits` with three shards on nodes `n1` and `n2`.
#[allow(dead_code)]
pub fn visits_table() -> Arc<TableInfo> {
    let ident = TableIdent::doc("visits");
    Arc::new(TableInfo {
        ident: ident.clone(),
        columns: vec![
            Reference::new(ident.clone(), ColumnIdent::new("country"), DataType::String),
            Reference::new(ident.clone(), ColumnIdent::new("duration"), DataType::Long),
        ],
        shards: (0..3)
            .map(|shard_id| ShardPlacement {
                index: "visits".to_string(),
                shard_id,
                node: NodeId::new(if shard_id == 0 { "n1" } else { "n2" }),
            })
            .collect(),
    })
}

#[allow(dead_code)]
pub fn column(table: &TableInfo, name: &str) -> Symbol {
    Symbol::Reference(
        table
            .get_column(&ColumnIdent::new(name))
            .expect("column to exist")
            .clone(),
    )
}

#[allow(dead_code)]
pub fn call(name: &str, args: Vec<Symbol>) -> Symbol {
    let types = args
        .iter()
        .map(|arg| arg.value_type().expect("typed argument"))
        .collect();
    let info = Functions::builtin()
        .lookup(&FunctionIdent::new(name, types))
        .expect("function to resolve");
    Symbol::Function(Function::new(info, args.into_iter().map(Into::into).collect()))
}
