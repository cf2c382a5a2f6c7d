//! Lookups in the project info tree returned by the `info` endpoint.
//!
//! The tree is owned by Crowdin; the only structure relied on here is that
//! the project root and every branch expose an ordered `files` array whose
//! entries carry `node_type` and `name`.

use serde_json::Value;

/// Node type as reported in `node_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    /// Source file
    File,
    /// Version branch
    Branch,
    /// Plain directory
    Directory,
}

impl NodeType {
    /// Value used by Crowdin in the `node_type` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::File => "file",
            NodeType::Branch => "branch",
            NodeType::Directory => "directory",
        }
    }

    /// Parse a `node_type` value. Unknown types yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "file" => Some(NodeType::File),
            "branch" => Some(NodeType::Branch),
            "directory" => Some(NodeType::Directory),
            _ => None,
        }
    }

    /// Check if nodes of this type carry their own `files` array.
    pub fn is_container(&self) -> bool {
        matches!(self, NodeType::Branch | NodeType::Directory)
    }
}

/// Find the first direct child of `source` with the given name and type.
///
/// Matching is exact and case-sensitive. A missing or non-array `files`
/// field simply yields `None`.
pub fn find_node<'a>(source: &'a Value, name: &str, node_type: NodeType) -> Option<&'a Value> {
    source.get("files")?.as_array()?.iter().find(|node| {
        node.get("node_type").and_then(Value::as_str) == Some(node_type.as_str())
            && node.get("name").and_then(Value::as_str) == Some(name)
    })
}

/// Find a top-level branch by name.
pub fn find_branch<'a>(info: &'a Value, branch_name: &str) -> Option<&'a Value> {
    find_node(info, branch_name, NodeType::Branch)
}

/// Find a file directly inside `parent` (the project root or a branch).
pub fn find_file<'a>(parent: &'a Value, file_name: &str) -> Option<&'a Value> {
    find_node(parent, file_name, NodeType::File)
}
