//! # CLI Commands
//!
//! One `cmd_*` function per subcommand. Each loads the store file, applies a
//! single operation, and writes the store back when it changed. All of them
//! return `GraphResult<()>` so they can be driven directly from tests.
//!
//! Store files are native JSON documents; `export`/`import` also speak GraphML.

use attrgraph_core::{
    AttrType, AttrValue, Attributes, Format, Graph, GraphError, GraphResult, GraphStore, Schema,
};
use serde_json::json;
use std::fs;
use std::path::Path;

// =============================================================================
// STORE FILE
// =============================================================================

fn io_error(path: &Path, e: impl std::fmt::Display) -> GraphError {
    GraphError::IoError(format!("{}: {}", path.display(), e))
}

/// Read a store file written by [`save_graph`].
pub fn load_graph(path: &Path) -> GraphResult<Graph> {
    let json = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let graph = attrgraph_core::from_json_str(&json)?;
    tracing::debug!(
        path = %path.display(),
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        "loaded store"
    );
    Ok(graph)
}

/// Write `graph` as a native JSON document.
///
/// The document goes to a sibling temp file first and is renamed over
/// `path`, so an interrupted write leaves the previous store intact.
pub fn save_graph(graph: &Graph, path: &Path) -> GraphResult<()> {
    let json = attrgraph_core::to_json_string(graph)?;
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json).map_err(|e| io_error(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| io_error(path, e))?;
    tracing::debug!(path = %path.display(), "saved store");
    Ok(())
}

fn refuse_overwrite(path: &Path, force: bool) -> GraphResult<()> {
    if path.exists() && !force {
        return Err(GraphError::IoError(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    Ok(())
}

// =============================================================================
// ARGUMENT PARSING
// =============================================================================

/// Parse a `name:type` schema declaration.
pub fn parse_key_decl(decl: &str) -> GraphResult<(String, AttrType)> {
    let (name, ty) = decl.split_once(':').ok_or_else(|| {
        GraphError::DeserializationError(format!("key '{}' is not in name:type form", decl))
    })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(GraphError::DeserializationError(format!(
            "key '{}' has an empty name",
            decl
        )));
    }
    Ok((name.to_string(), ty.trim().parse()?))
}

/// Turn `name=value` pairs into typed attributes using the schema's types.
///
/// Pairs that are malformed, undeclared or unparseable are dropped with a
/// warning, matching the store's own lenient policy.
pub fn parse_attributes(schema: &Schema, pairs: &[String]) -> Attributes {
    let mut out = Attributes::new();
    for pair in pairs {
        let Some((name, text)) = pair.split_once('=') else {
            tracing::warn!(pair = %pair, "ignoring attribute without '='");
            continue;
        };
        let Some(attr_type) = schema.attr_type(name) else {
            tracing::warn!(key = name, "ignoring undeclared attribute");
            continue;
        };
        match AttrValue::parse_as(attr_type, text) {
            Ok(value) => {
                out.insert(name.to_string(), value);
            }
            Err(e) => tracing::warn!(key = name, error = %e, "ignoring attribute"),
        }
    }
    out
}

// =============================================================================
// STORE COMMANDS
// =============================================================================

/// Create an empty store with the declared keys.
pub fn cmd_init(db: &Path, keys: &[String], force: bool) -> GraphResult<()> {
    refuse_overwrite(db, force)?;

    let types = keys
        .iter()
        .map(|decl| parse_key_decl(decl))
        .collect::<GraphResult<Vec<_>>>()?;
    let graph = Graph::new(Schema::from_types(types)?);
    save_graph(&graph, db)?;

    println!("Initialized store at {} ({} keys)", db.display(), graph.schema().len());
    Ok(())
}

pub fn cmd_add_node(db: &Path, uid: Option<&str>, attrs: &[String]) -> GraphResult<()> {
    let mut graph = load_graph(db)?;
    let attributes = parse_attributes(graph.schema(), attrs);
    let resolved = graph.add_node(uid, attributes);
    save_graph(&graph, db)?;

    println!("{}", resolved);
    Ok(())
}

pub fn cmd_modify_node(db: &Path, uid: &str, attrs: &[String]) -> GraphResult<()> {
    let mut graph = load_graph(db)?;
    let attributes = parse_attributes(graph.schema(), attrs);
    graph.modify_node(uid, attributes)?;
    save_graph(&graph, db)
}

pub fn cmd_del_node(db: &Path, uid: &str) -> GraphResult<()> {
    let mut graph = load_graph(db)?;
    graph.del_node(uid)?;
    save_graph(&graph, db)
}

pub fn cmd_add_edge(db: &Path, source: &str, target: &str, edge_type: &str) -> GraphResult<()> {
    let mut graph = load_graph(db)?;
    graph.add_edge(source, target, edge_type)?;
    save_graph(&graph, db)
}

/// Removing an absent edge is not an error; the store is left untouched.
pub fn cmd_del_edge(db: &Path, source: &str, target: &str, edge_type: &str) -> GraphResult<()> {
    let mut graph = load_graph(db)?;
    if !graph.del_edge(source, target, edge_type) {
        println!("No {} edge {} -> {}", edge_type, source, target);
        return Ok(());
    }
    save_graph(&graph, db)
}

// =============================================================================
// READ COMMANDS
// =============================================================================

/// Print successors (or predecessors with `reverse`), one uid per line.
pub fn cmd_neighbors(
    db: &Path,
    uid: &str,
    edge_type: Option<&str>,
    reverse: bool,
    json_output: bool,
) -> GraphResult<()> {
    let graph = load_graph(db)?;
    let uids = if reverse {
        graph.get_predecessors(uid, edge_type)?
    } else {
        graph.get_neighbors(uid, edge_type)?
    };

    if json_output {
        let out = json!({
            "uid": uid,
            "direction": if reverse { "predecessors" } else { "successors" },
            "type": edge_type,
            "uids": uids,
        });
        println!("{}", out);
    } else {
        for neighbor in &uids {
            println!("{}", neighbor);
        }
    }
    Ok(())
}

pub fn cmd_status(db: &Path, json_output: bool) -> GraphResult<()> {
    let graph = load_graph(db)?;
    let keys: serde_json::Map<String, serde_json::Value> = graph
        .schema()
        .iter()
        .map(|(name, ty)| (name.to_string(), json!(ty)))
        .collect();
    let edge_types: Vec<&str> = graph.edge_types().collect();

    if json_output {
        let out = json!({
            "nodes": graph.node_count(),
            "edges": graph.edge_count(),
            "progress": graph.progress(),
            "keys": keys,
            "edge_types": edge_types,
        });
        println!("{}", out);
    } else {
        println!("Store:      {}", db.display());
        println!("Nodes:      {}", graph.node_count());
        println!("Edges:      {}", graph.edge_count());
        println!("Next auto:  {}{}", attrgraph_core::AUTO_UID_PREFIX, graph.progress());
        for (name, ty) in graph.schema().iter() {
            println!("Key:        {} ({})", name, ty);
        }
        if !edge_types.is_empty() {
            println!("Edge types: {}", edge_types.join(", "));
        }
    }
    Ok(())
}

// =============================================================================
// IMPORT / EXPORT
// =============================================================================

pub fn cmd_export(db: &Path, out: &Path, format: &str) -> GraphResult<()> {
    let format = Format::from_name(format).ok_or_else(|| {
        GraphError::SerializationError(format!("unsupported export format '{}'", format))
    })?;
    let graph = load_graph(db)?;
    let text = format.encode(&graph)?;
    fs::write(out, text).map_err(|e| io_error(out, e))?;

    println!(
        "Exported {} nodes, {} edges to {}",
        graph.node_count(),
        graph.edge_count(),
        out.display()
    );
    Ok(())
}

/// Build a store from an exported document. The whole input is decoded
/// before the store file is touched.
pub fn cmd_import(input: &Path, format: &str, db: &Path, force: bool) -> GraphResult<()> {
    let format = Format::from_name(format).ok_or_else(|| {
        GraphError::DeserializationError(format!("unsupported import format '{}'", format))
    })?;
    refuse_overwrite(db, force)?;

    let text = fs::read_to_string(input).map_err(|e| io_error(input, e))?;
    let graph = format.decode(&text)?;
    save_graph(&graph, db)?;

    println!(
        "Imported {} nodes, {} edges into {}",
        graph.node_count(),
        graph.edge_count(),
        db.display()
    );
    Ok(())
}
