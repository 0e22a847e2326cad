//! # Formats Module
//!
//! Serialization of a [`Graph`](crate::Graph) to and from its two external forms:
//! - Native tree document (serde, JSON by default)
//! - GraphML (XML, readable by third-party graph tools)
//!
//! Both codecs only use the store's public API. File I/O stays in the app
//! layer (apps/attrgraph); this module handles format conversion only.

pub mod graphml;
pub mod native;

pub use graphml::{from_graphml_str, read_graphml, to_graphml_string, write_graphml};
pub use native::{
    NativeDocument, NodeRecord, decode_native, encode_native, from_json_str, from_json_value,
    to_json_string, to_json_value,
};

/// External representations understood by the codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    GraphMl,
}

impl Format {
    /// Parse a format name as used on the command line.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "json" | "native" => Some(Self::Json),
            "graphml" | "xml" => Some(Self::GraphMl),
            _ => None,
        }
    }

    /// Encode `graph` in this format.
    pub fn encode(self, graph: &crate::Graph) -> crate::GraphResult<String> {
        match self {
            Self::Json => to_json_string(graph),
            Self::GraphMl => to_graphml_string(graph),
        }
    }

    /// Decode a store from text in this format.
    pub fn decode(self, text: &str) -> crate::GraphResult<crate::Graph> {
        match self {
            Self::Json => from_json_str(text),
            Self::GraphMl => from_graphml_str(text),
        }
    }
}
