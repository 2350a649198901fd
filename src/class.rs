use serde::{Deserialize, Serialize, Serializer};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::path::display_path;
use crate::structure::{ClassDeclaration, DeclarationKind};

/// One class-like declaration found in a source file.
///
/// The entity keeps a shared handle to the text it was extracted from, so
/// marker checks observe the same snapshot as extraction did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWithClass {
    file_path: PathBuf,
    class_name: String,
    kind: DeclarationKind,
    has_parent_class_or_interface: bool,
    attributes: Vec<String>,
    source: Arc<str>,
}

impl FileWithClass {
    pub fn new(
        file_path: PathBuf,
        class_name: String,
        kind: DeclarationKind,
        has_parent_class_or_interface: bool,
        attributes: Vec<String>,
        source: Arc<str>,
    ) -> Self {
        debug_assert!(!file_path.as_os_str().is_empty());
        debug_assert!(!class_name.is_empty());
        Self {
            file_path,
            class_name,
            kind,
            has_parent_class_or_interface,
            attributes,
            source,
        }
    }

    pub fn from_declaration(file_path: &Path, decl: ClassDeclaration, source: Arc<str>) -> Self {
        Self::new(
            file_path.to_path_buf(),
            decl.class_name,
            decl.kind,
            decl.has_parent_class_or_interface,
            decl.attributes,
            source,
        )
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn display_path(&self) -> String {
        display_path(&self.file_path)
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Class name without its namespace.
    pub fn short_name(&self) -> &str {
        self.class_name
            .rsplit('\\')
            .next()
            .unwrap_or(&self.class_name)
    }

    pub fn kind(&self) -> DeclarationKind {
        self.kind
    }

    pub fn has_parent_class_or_interface(&self) -> bool {
        self.has_parent_class_or_interface
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn is_trait(&self) -> bool {
        self.kind == DeclarationKind::Trait
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn to_record(&self) -> LeakRecord {
        LeakRecord {
            file_path: self.display_path(),
            class_name: self.class_name.clone(),
            attributes: self.attributes.clone(),
        }
    }
}

impl Serialize for FileWithClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_record().serialize(serializer)
    }
}

/// Public report payload of a leaking class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeakRecord {
    pub file_path: String,
    #[serde(rename = "class")]
    pub class_name: String,
    pub attributes: Vec<String>,
}
