use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};
use tree_sitter::{Node, Parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Class,
    Trait,
    Enum,
}

impl DeclarationKind {
    fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "class_declaration" => Some(Self::Class),
            "trait_declaration" => Some(Self::Trait),
            "enum_declaration" => Some(Self::Enum),
            _ => None,
        }
    }
}

/// Header facts of one class-like declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDeclaration {
    pub class_name: String,
    pub kind: DeclarationKind,
    pub has_parent_class_or_interface: bool,
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub declarations: Vec<ClassDeclaration>,
    /// Declarations dropped because their header did not parse.
    pub skipped: usize,
}

pub fn extract(file_path: &Path, source: &str) -> Extraction {
    let mut extraction = Extraction::default();
    if source.trim().is_empty() {
        return extraction;
    }

    let mut parser = Parser::new();
    if let Err(err) = parser.set_language(&tree_sitter_php::LANGUAGE_PHP.into()) {
        warn!("php grammar unavailable, skipping {}: {err}", file_path.display());
        return extraction;
    }
    let Some(tree) = parser.parse(source, None) else {
        warn!("failed to parse {}", file_path.display());
        return extraction;
    };

    let root = tree.root_node();
    if root.has_error() {
        debug!("{} contains syntax errors", file_path.display());
    }

    let mut namespace = String::new();
    collect_declarations(&root, source.as_bytes(), &mut namespace, &mut extraction);

    if extraction.skipped > 0 {
        warn!(
            "skipped {} unparsable declaration(s) in {}",
            extraction.skipped,
            file_path.display()
        );
    }
    extraction
}

fn collect_declarations(
    node: &Node,
    source: &[u8],
    namespace: &mut String,
    out: &mut Extraction,
) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "namespace_definition" {
            let name = child
                .child_by_field_name("name")
                .map(|n| node_text(&n, source).trim().to_string())
                .unwrap_or_default();

            match child.child_by_field_name("body") {
                Some(body) => {
                    let mut scoped = name;
                    collect_declarations(&body, source, &mut scoped, out);
                }
                None => *namespace = name,
            }
            continue;
        }

        match DeclarationKind::from_node_kind(child.kind()) {
            Some(kind) => match read_declaration(&child, kind, source, namespace) {
                Some(decl) => out.declarations.push(decl),
                None => out.skipped += 1,
            },
            None => collect_declarations(&child, source, namespace, out),
        }
    }
}

fn read_declaration(
    node: &Node,
    kind: DeclarationKind,
    source: &[u8],
    namespace: &str,
) -> Option<ClassDeclaration> {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(&n, source).trim())
        .filter(|n| !n.is_empty())?;

    let mut has_parent_class_or_interface = false;
    let mut attributes = Vec::new();

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.is_error() || child.is_missing() {
            return None;
        }
        match child.kind() {
            "declaration_list" | "enum_declaration_list" => break,
            "base_clause" | "class_interface_clause" => {
                if child.has_error() {
                    return None;
                }
                has_parent_class_or_interface = true;
            }
            "attribute_list" => collect_attributes(&child, source, &mut attributes),
            _ => {}
        }
    }

    Some(ClassDeclaration {
        class_name: qualify(namespace, name),
        kind,
        has_parent_class_or_interface,
        attributes,
    })
}

fn collect_attributes(node: &Node, source: &[u8], out: &mut Vec<String>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "attribute" => {
                if let Some(name) = attribute_name(&child, source) {
                    out.push(name);
                }
            }
            "attribute_group" => collect_attributes(&child, source, out),
            _ => {}
        }
    }
}

fn attribute_name(node: &Node, source: &[u8]) -> Option<String> {
    let mut cursor = node.walk();
    let named = node
        .named_children(&mut cursor)
        .find(|c| matches!(c.kind(), "name" | "qualified_name"))
        .map(|c| node_text(&c, source));

    let raw = named.unwrap_or_else(|| {
        let text = node_text(node, source);
        text.split('(').next().unwrap_or(text)
    });
    let name: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if name.is_empty() { None } else { Some(name) }
}

fn qualify(namespace: &str, name: &str) -> String {
    let namespace = namespace.trim_matches('\\');
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{namespace}\\{name}")
    }
}

fn node_text<'a>(node: &Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}
