//! Fixtures shared by unit tests.

use std::sync::Arc;

use crate::catalog::{NodeId, ShardPlacement, TableInfo};
use crate::functions::Functions;
use crate::symbol::{ColumnIdent, Function, FunctionIdent, IndexType, Reference, Symbol, TableIdent};
use crate::types::DataType;

/// `doc.users` with four shards spread over nodes `n1` and `n2`.
pub fn users_table() -> Arc<TableInfo> {
    let ident = TableIdent::doc("users");
    let col = |name: &str, typ: DataType| Reference::new(ident.clone(), ColumnIdent::new(name), typ);

    let columns = vec![
        col("id", DataType::Integer),
        col("name", DataType::String),
        col("age", DataType::Long),
        col("bio", DataType::String).with_index_type(IndexType::Analyzed),
        col("details", DataType::Object),
        col("notes", DataType::String).with_index_type(IndexType::No),
        col("location", DataType::GeoPoint),
        col("score", DataType::Double),
    ];

    let shards = (0..4)
        .map(|shard_id| ShardPlacement {
            index: "users".to_string(),
            shard_id,
            node: NodeId::new(if shard_id % 2 == 0 { "n1" } else { "n2" }),
        })
        .collect();

    Arc::new(TableInfo {
        ident,
        columns,
        shards,
    })
}

/// `doc.events` partitioned by `year`, one partition per year.
pub fn partitioned_table() -> Arc<TableInfo> {
    let ident = TableIdent::doc("events");
    let columns = vec![
        Reference::new(ident.clone(), ColumnIdent::new("year"), DataType::Integer),
        Reference::new(ident.clone(), ColumnIdent::new("kind"), DataType::String),
    ];

    let shards = vec![
        ShardPlacement {
            index: ".partitioned.events.2023".to_string(),
            shard_id: 0,
            node: NodeId::new("n1"),
        },
        ShardPlacement {
            index: ".partitioned.events.2023".to_string(),
            shard_id: 1,
            node: NodeId::new("n2"),
        },
        ShardPlacement {
            index: ".partitioned.events.2024".to_string(),
            shard_id: 0,
            node: NodeId::new("n2"),
        },
    ];

    Arc::new(TableInfo {
        ident,
        columns,
        shards,
    })
}

pub fn column_ref(table: &TableInfo, name: &str) -> Reference {
    table
        .get_column(&ColumnIdent::new(name))
        .cloned()
        .unwrap_or_else(|| panic!("missing column {name} in {}", table.ident))
}

pub fn column(table: &TableInfo, name: &str) -> Symbol {
    Symbol::Reference(column_ref(table, name))
}

pub fn lit_int(v: i64) -> Symbol {
    Symbol::literal(v, DataType::Integer)
}

pub fn lit_str(v: &str) -> Symbol {
    Symbol::literal(v, DataType::String)
}

/// Resolve a function call against the builtin functions.
pub fn call(name: &str, args: Vec<Symbol>) -> Symbol {
    let argument_types = args
        .iter()
        .map(|arg| arg.value_type().expect("typed argument"))
        .collect();
    let info = Functions::builtin()
        .lookup(&FunctionIdent::new(name, argument_types))
        .unwrap();

    Symbol::Function(Function::new(
        info,
        args.into_iter().map(Into::into).collect(),
    ))
}

/// Unsplit aggregate call.
pub fn agg(name: &str, args: Vec<Symbol>) -> Symbol {
    let sym = call(name, args);
    assert!(sym.is_aggregate(), "{name} is not an aggregate");
    sym
}

pub fn gt(left: Symbol, right: Symbol) -> Symbol {
    call("op_>", vec![left, right])
}

pub fn eq(left: Symbol, right: Symbol) -> Symbol {
    call("op_=", vec![left, right])
}

pub fn add_int(left: Symbol, right: Symbol) -> Symbol {
    call("add", vec![left, right])
}
