//! Heuristic leak signals.
//!
//! Markers are matched as plain text over the whole file, so a marker that
//! only appears in a comment or a string literal still counts. Annotation
//! metadata lives in docblocks, which a parser-based check would not see.

use std::fmt;
use tracing::trace;

use crate::class::FileWithClass;

pub const SERIALIZATION_MARKERS: &[&str] = &["@Serializer"];

pub const ENTITY_MARKERS: &[&str] = &[
    "Doctrine\\ODM\\MongoDB\\Mapping\\Annotations",
    "Doctrine\\ORM\\Annotations",
    "@ORM\\Entity",
    "@Entity",
    "@ODM\\Document",
    "@Document",
];

pub trait MarkerRule: fmt::Debug + Send + Sync {
    fn label(&self) -> &str;

    fn matches(&self, text: &str) -> bool;
}

/// Exact substring containment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralMarker(String);

impl LiteralMarker {
    pub fn new(marker: impl Into<String>) -> Self {
        Self(marker.into())
    }
}

impl MarkerRule for LiteralMarker {
    fn label(&self) -> &str {
        &self.0
    }

    fn matches(&self, text: &str) -> bool {
        text.contains(self.0.as_str())
    }
}

/// Ordered marker rules; evaluation stops at the first hit.
#[derive(Debug, Default)]
pub struct MarkerSet {
    rules: Vec<Box<dyn MarkerRule>>,
}

impl MarkerSet {
    pub fn literals<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::default();
        for m in markers {
            set.push(LiteralMarker::new(m));
        }
        set
    }

    pub fn push(&mut self, rule: impl MarkerRule + 'static) {
        self.rules.push(Box::new(rule));
    }

    pub fn first_match(&self, text: &str) -> Option<&dyn MarkerRule> {
        self.rules
            .iter()
            .map(|r| r.as_ref())
            .find(|r| r.matches(text))
    }

    pub fn matches(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.label()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LeakSignals {
    pub is_serialized: bool,
    pub is_entity: bool,
    pub is_trait: bool,
    pub has_parent_class_or_interface: bool,
}

#[derive(Debug)]
pub struct LeakClassifier {
    serialization: MarkerSet,
    entity: MarkerSet,
}

impl Default for LeakClassifier {
    fn default() -> Self {
        Self::new(
            MarkerSet::literals(SERIALIZATION_MARKERS.iter().copied()),
            MarkerSet::literals(ENTITY_MARKERS.iter().copied()),
        )
    }
}

impl LeakClassifier {
    pub fn new(serialization: MarkerSet, entity: MarkerSet) -> Self {
        Self {
            serialization,
            entity,
        }
    }

    pub fn serialization_markers(&self) -> &MarkerSet {
        &self.serialization
    }

    pub fn entity_markers(&self) -> &MarkerSet {
        &self.entity
    }

    pub fn is_serialized(&self, file: &FileWithClass) -> bool {
        hit(&self.serialization, file, "serialization")
    }

    pub fn is_entity(&self, file: &FileWithClass) -> bool {
        hit(&self.entity, file, "entity")
    }

    pub fn is_trait(&self, file: &FileWithClass) -> bool {
        file.is_trait()
    }

    pub fn classify(&self, file: &FileWithClass) -> LeakSignals {
        LeakSignals {
            is_serialized: self.is_serialized(file),
            is_entity: self.is_entity(file),
            is_trait: self.is_trait(file),
            has_parent_class_or_interface: file.has_parent_class_or_interface(),
        }
    }
}

fn hit(set: &MarkerSet, file: &FileWithClass, signal: &str) -> bool {
    match set.first_match(file.source()) {
        Some(rule) => {
            trace!(
                "{} marker {:?} hit for {}",
                signal,
                rule.label(),
                file.class_name()
            );
            true
        }
        None => false,
    }
}
