//! # GraphML Format
//!
//! XML interchange readable by tools that know nothing about this crate.
//!
//! Schema keys become `<key for="node">` declarations typed `boolean`, `int`,
//! `double` or `string`. The edge type travels as the value of a synthetic
//! `edge_type` key. The auto-uid counter is not part of GraphML; an imported
//! graph starts minting from `node-0`, skipping uids already present.

use crate::graph::{Graph, GraphStore};
use crate::schema::Schema;
use crate::types::{AttrType, AttrValue, Attributes, GraphError, GraphResult};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::{Read, Write};

pub const GRAPHML_NS: &str = "http://graphml.graphdrawing.org/xmlns";
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";
const SCHEMA_LOCATION: &str =
    "http://graphml.graphdrawing.org/xmlns http://graphml.graphdrawing.org/xmlns/1.0/graphml.xsd";

/// Key id of the edge type declaration.
pub const EDGE_TYPE_KEY: &str = "edge_type";

/// Edge type used when an edge element carries no type data.
pub const DEFAULT_EDGE_TYPE: &str = "default";

// Element depths, counting the root as 1.
const ROOT_DEPTH: usize = 1;
const GRAPH_DEPTH: usize = 2;
const ITEM_DEPTH: usize = 3;
const DATA_DEPTH: usize = 4;

// =============================================================================
// WRITER
// =============================================================================

fn write_failed(e: impl fmt::Display) -> GraphError {
    GraphError::SerializationError(format!("GraphML write failed: {}", e))
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> GraphResult<()> {
    writer.write_event(event).map_err(write_failed)
}

/// XML 1.0 `Char` production. Escaping cannot help outside it, so such text
/// is refused rather than written as a document no parser accepts.
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

fn checked(text: &str) -> GraphResult<&str> {
    match text.chars().find(|c| !is_xml_char(*c)) {
        None => Ok(text),
        Some(c) => Err(GraphError::SerializationError(format!(
            "character U+{:04X} in {:?} cannot be represented in XML",
            u32::from(c),
            text
        ))),
    }
}

fn element<'a>(name: &'a str, attributes: &[(&str, &str)]) -> GraphResult<BytesStart<'a>> {
    let mut start = BytesStart::new(name);
    for &(key, value) in attributes {
        start.push_attribute((key, checked(value)?));
    }
    Ok(start)
}

fn emit_data<W: Write>(writer: &mut Writer<W>, key: &str, text: &str) -> GraphResult<()> {
    emit(writer, Event::Start(element("data", &[("key", key)])?))?;
    emit(writer, Event::Text(BytesText::new(checked(text)?)))?;
    emit(writer, Event::End(BytesEnd::new("data")))
}

/// Render `graph` as an indented GraphML document.
pub fn to_graphml_string(graph: &Graph) -> GraphResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    emit(&mut writer, Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    emit(
        &mut writer,
        Event::Start(element(
            "graphml",
            &[
                ("xmlns", GRAPHML_NS),
                ("xmlns:xsi", XSI_NS),
                ("xsi:schemaLocation", SCHEMA_LOCATION),
            ],
        )?),
    )?;

    let mut key_ids: BTreeMap<&str, String> = BTreeMap::new();
    for (index, (name, attr_type)) in graph.schema().iter().enumerate() {
        let id = format!("k{}", index);
        emit(
            &mut writer,
            Event::Empty(element(
                "key",
                &[
                    ("id", id.as_str()),
                    ("for", "node"),
                    ("attr.name", name),
                    ("attr.type", attr_type.graphml_name()),
                ],
            )?),
        )?;
        key_ids.insert(name, id);
    }
    emit(
        &mut writer,
        Event::Empty(element(
            "key",
            &[
                ("id", EDGE_TYPE_KEY),
                ("for", "edge"),
                ("attr.name", "type"),
                ("attr.type", "string"),
            ],
        )?),
    )?;

    emit(
        &mut writer,
        Event::Start(element("graph", &[("id", "G"), ("edgedefault", "directed")])?),
    )?;

    for node in graph.nodes() {
        let start = element("node", &[("id", node.uid())])?;
        let data: Vec<(&str, String)> = node
            .attributes()
            .iter()
            .filter_map(|(name, value)| {
                key_ids
                    .get(name.as_str())
                    .map(|id| (id.as_str(), value.to_string()))
            })
            .collect();

        if data.is_empty() {
            emit(&mut writer, Event::Empty(start))?;
            continue;
        }
        emit(&mut writer, Event::Start(start))?;
        for (id, text) in &data {
            emit_data(&mut writer, id, text)?;
        }
        emit(&mut writer, Event::End(BytesEnd::new("node")))?;
    }

    for (index, (source, target, edge_type)) in graph.edges().enumerate() {
        let id = format!("e{}", index);
        emit(
            &mut writer,
            Event::Start(element(
                "edge",
                &[("id", id.as_str()), ("source", source), ("target", target)],
            )?),
        )?;
        emit_data(&mut writer, EDGE_TYPE_KEY, edge_type)?;
        emit(&mut writer, Event::End(BytesEnd::new("edge")))?;
    }

    emit(&mut writer, Event::End(BytesEnd::new("graph")))?;
    emit(&mut writer, Event::End(BytesEnd::new("graphml")))?;

    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        keys = graph.schema().len(),
        "encoded GraphML"
    );
    String::from_utf8(writer.into_inner()).map_err(write_failed)
}

/// Render the whole document in memory, then write it to `out` in one go.
pub fn write_graphml<W: Write>(graph: &Graph, mut out: W) -> GraphResult<()> {
    let xml = to_graphml_string(graph)?;
    out.write_all(xml.as_bytes())
        .map_err(|e| GraphError::IoError(e.to_string()))
}

// =============================================================================
// READER
// =============================================================================

#[derive(Debug, Default)]
struct KeyDecl {
    id: Option<String>,
    domain: Option<String>,
    name: Option<String>,
    attr_type: Option<String>,
}

#[derive(Debug)]
enum Item {
    Node {
        id: Option<String>,
        data: Vec<(String, String)>,
    },
    Edge {
        source: Option<String>,
        target: Option<String>,
        data: Vec<(String, String)>,
    },
}

impl Item {
    fn data_mut(&mut self) -> &mut Vec<(String, String)> {
        match self {
            Self::Node { data, .. } | Self::Edge { data, .. } => data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GraphState {
    NotSeen,
    Open,
    Closed,
}

/// Raw declarations collected in one pass, applied to a store afterwards.
#[derive(Debug)]
struct Document {
    keys: Vec<KeyDecl>,
    items: Vec<Item>,
}

fn malformed(e: impl fmt::Display) -> GraphError {
    GraphError::DeserializationError(format!("malformed GraphML: {}", e))
}

fn attributes_of(start: &BytesStart<'_>) -> GraphResult<BTreeMap<String, String>> {
    let mut out = BTreeMap::new();
    for attr in start.attributes() {
        let attr = attr.map_err(malformed)?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value().map_err(malformed)?.into_owned();
        out.insert(key, value);
    }
    Ok(out)
}

struct Parser {
    depth: usize,
    saw_root: bool,
    graph: GraphState,
    current: Option<Item>,
    data: Option<(String, String)>,
    doc: Document,
}

impl Parser {
    fn new() -> Self {
        Self {
            depth: 0,
            saw_root: false,
            graph: GraphState::NotSeen,
            current: None,
            data: None,
            doc: Document {
                keys: Vec::new(),
                items: Vec::new(),
            },
        }
    }

    /// Handle an opening tag. `depth` is the depth the element occupies.
    fn open(&mut self, start: &BytesStart<'_>, depth: usize) -> GraphResult<()> {
        let name = start.local_name();
        let name = name.as_ref();

        if depth == ROOT_DEPTH {
            if self.saw_root {
                return Err(malformed("more than one root element"));
            }
            if name != b"graphml" {
                return Err(malformed("root element is not <graphml>"));
            }
            self.saw_root = true;
            return Ok(());
        }

        match (depth, name) {
            (GRAPH_DEPTH, b"key") => {
                let mut attrs = attributes_of(start)?;
                self.doc.keys.push(KeyDecl {
                    id: attrs.remove("id"),
                    domain: attrs.remove("for"),
                    name: attrs.remove("attr.name"),
                    attr_type: attrs.remove("attr.type"),
                });
            }
            (GRAPH_DEPTH, b"graph") if self.graph == GraphState::NotSeen => {
                self.graph = GraphState::Open;
            }
            (ITEM_DEPTH, b"node") if self.graph == GraphState::Open => {
                let mut attrs = attributes_of(start)?;
                self.current = Some(Item::Node {
                    id: attrs.remove("id"),
                    data: Vec::new(),
                });
            }
            (ITEM_DEPTH, b"edge") if self.graph == GraphState::Open => {
                let mut attrs = attributes_of(start)?;
                self.current = Some(Item::Edge {
                    source: attrs.remove("source"),
                    target: attrs.remove("target"),
                    data: Vec::new(),
                });
            }
            (DATA_DEPTH, b"data") if self.current.is_some() => {
                let key = attributes_of(start)?.remove("key").unwrap_or_default();
                self.data = Some((key, String::new()));
            }
            _ => {}
        }
        Ok(())
    }

    /// Handle a closing tag at `depth`.
    fn close(&mut self, name: &[u8], depth: usize) {
        match (depth, name) {
            (GRAPH_DEPTH, b"graph") if self.graph == GraphState::Open => {
                self.graph = GraphState::Closed;
            }
            (ITEM_DEPTH, b"node" | b"edge") => {
                if let Some(item) = self.current.take() {
                    self.doc.items.push(item);
                }
            }
            (DATA_DEPTH, b"data") => {
                if let (Some(pair), Some(item)) = (self.data.take(), self.current.as_mut()) {
                    item.data_mut().push(pair);
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.depth == DATA_DEPTH {
            if let Some((_, value)) = self.data.as_mut() {
                value.push_str(text);
            }
        }
    }

    fn run(mut self, xml: &str) -> GraphResult<Document> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(false);

        loop {
            match reader.read_event().map_err(malformed)? {
                Event::Start(start) => {
                    let depth = self.depth.saturating_add(1);
                    self.open(&start, depth)?;
                    self.depth = depth;
                }
                Event::Empty(start) => {
                    let depth = self.depth.saturating_add(1);
                    self.open(&start, depth)?;
                    self.close(start.local_name().as_ref(), depth);
                }
                Event::End(end) => {
                    self.close(end.local_name().as_ref(), self.depth);
                    self.depth = self.depth.saturating_sub(1);
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(malformed)?;
                    self.text(&text);
                }
                Event::CData(cdata) => {
                    let text = std::str::from_utf8(&cdata).map_err(malformed)?;
                    self.text(text);
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if self.depth != 0 {
            return Err(malformed("unexpected end of document"));
        }
        if !self.saw_root {
            return Err(malformed("missing <graphml> root element"));
        }
        if self.graph == GraphState::NotSeen {
            return Err(malformed("missing <graph> element"));
        }
        Ok(self.doc)
    }
}

fn parse_value(uid: &str, name: &str, attr_type: AttrType, text: &str) -> GraphResult<AttrValue> {
    AttrValue::parse_as(attr_type, text).map_err(|_| {
        GraphError::DeserializationError(format!(
            "node '{}': cannot parse '{}' as {} for attribute '{}'",
            uid, text, attr_type, name
        ))
    })
}

impl Document {
    fn into_graph(self) -> GraphResult<Graph> {
        // key id -> (attribute name, type)
        let mut node_keys: BTreeMap<String, (String, AttrType)> = BTreeMap::new();
        let mut edge_type_key: Option<String> = None;

        for key in self.keys {
            match key.domain.as_deref() {
                Some("node") => {
                    let (Some(id), Some(name)) = (key.id, key.name) else {
                        return Err(malformed("node <key> without id or attr.name"));
                    };
                    let attr_type =
                        AttrType::from_graphml_name(key.attr_type.as_deref().unwrap_or(""));
                    node_keys.insert(id, (name, attr_type));
                }
                Some("edge") if key.name.as_deref() == Some("type") && edge_type_key.is_none() => {
                    edge_type_key = key.id;
                }
                _ => {}
            }
        }

        let schema = Schema::from_types(node_keys.values().map(|(name, t)| (name.clone(), *t)))?;
        let mut graph = Graph::new(schema);
        let mut seen = BTreeSet::new();
        let mut edges = Vec::new();

        for item in self.items {
            match item {
                Item::Node { id, data } => {
                    let uid = id
                        .filter(|uid| !uid.is_empty())
                        .ok_or_else(|| malformed("<node> without id"))?;
                    if !seen.insert(uid.clone()) {
                        return Err(GraphError::DuplicateNode(uid));
                    }

                    let mut attributes = Attributes::new();
                    for (key, text) in data {
                        if let Some((name, attr_type)) = node_keys.get(&key) {
                            let value = parse_value(&uid, name, *attr_type, &text)?;
                            attributes.insert(name.clone(), value);
                        }
                    }
                    graph.add_node(Some(uid.as_str()), attributes);
                }
                Item::Edge {
                    source,
                    target,
                    data,
                } => {
                    let (Some(source), Some(target)) = (source, target) else {
                        return Err(malformed("<edge> without source or target"));
                    };
                    let edge_type = edge_type_key
                        .as_ref()
                        .and_then(|key_id| data.into_iter().find(|(key, _)| key == key_id))
                        .map(|(_, text)| text)
                        .unwrap_or_else(|| DEFAULT_EDGE_TYPE.to_string());
                    edges.push((source, target, edge_type));
                }
            }
        }

        // Edges may precede the nodes they reference, so they go in last.
        for (source, target, edge_type) in &edges {
            graph.add_edge(source, target, edge_type)?;
        }

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            keys = graph.schema().len(),
            "decoded GraphML"
        );
        Ok(graph)
    }
}

/// Parse a GraphML document into a new store.
pub fn from_graphml_str(xml: &str) -> GraphResult<Graph> {
    Parser::new().run(xml)?.into_graph()
}

/// Read a whole GraphML document from `input` and parse it.
pub fn read_graphml<R: Read>(mut input: R) -> GraphResult<Graph> {
    let mut xml = String::new();
    input
        .read_to_string(&mut xml)
        .map_err(|e| GraphError::IoError(e.to_string()))?;
    from_graphml_str(&xml)
}

// =============================================================================
// TESTS
// =============================================================================
