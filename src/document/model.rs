/*!
 * Core record types of an annotation document.
 *
 * Tiers, annotations, time slots and linguistic types as they are held in
 * memory. Attributes the model does not interpret are kept in `extra` so a
 * written document carries them back out unchanged.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// @const: Annotation id pattern ("a" + integer)
static ANNOTATION_ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^a(\d+)$").unwrap());

// @const: Time slot id pattern ("ts" + integer)
static SLOT_ID_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^ts(\d+)$").unwrap());

/// Ordered attribute list carried through untouched
pub type Attributes = Vec<(String, String)>;

/// Numeric part of an annotation id such as `a42`
pub fn annotation_number(id: &str) -> Option<u64> {
    ANNOTATION_ID_REGEX
        .captures(id)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Build an annotation id from its number
pub fn annotation_id(number: u64) -> String {
    format!("a{}", number)
}

/// Numeric part of a time slot id such as `ts7`
pub fn slot_number(id: &str) -> Option<u64> {
    SLOT_ID_REGEX
        .captures(id)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// A point on the document timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Slot identifier (`TIME_SLOT_ID`)
    pub id: String,

    /// Declared value in milliseconds, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,
}

impl TimeSlot {
    pub fn new(id: &str, value: Option<u64>) -> Self {
        Self {
            id: id.to_string(),
            value,
        }
    }
}

/// How an annotation gets its interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AnnotationKind {
    /// Directly anchored on two time slots
    Anchored {
        start_slot: String,
        stop_slot: String,
    },
    /// Inherits the interval of a governing annotation
    Referential {
        governing: String,
        /// Preceding sibling in a symbolic subdivision
        #[serde(skip_serializing_if = "Option::is_none")]
        previous: Option<String>,
    },
}

/// A single annotation owned by a tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Document-unique id (`a` + integer)
    pub id: String,

    /// Annotation text, possibly empty
    pub value: String,

    /// Anchored or referential representation
    pub kind: AnnotationKind,

    /// Unmodelled attributes (EXT_REF, LANG_REF, CVE_REF, ...)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Attributes,
}

impl Annotation {
    /// Create an anchored annotation
    pub fn anchored(id: &str, start_slot: &str, stop_slot: &str, value: &str) -> Self {
        Self {
            id: id.to_string(),
            value: value.to_string(),
            kind: AnnotationKind::Anchored {
                start_slot: start_slot.to_string(),
                stop_slot: stop_slot.to_string(),
            },
            extra: Vec::new(),
        }
    }

    /// Create a referential annotation governed by `governing`
    pub fn referential(id: &str, governing: &str, value: &str) -> Self {
        Self {
            id: id.to_string(),
            value: value.to_string(),
            kind: AnnotationKind::Referential {
                governing: governing.to_string(),
                previous: None,
            },
            extra: Vec::new(),
        }
    }

    pub fn is_anchored(&self) -> bool {
        matches!(self.kind, AnnotationKind::Anchored { .. })
    }

    pub fn is_referential(&self) -> bool {
        matches!(self.kind, AnnotationKind::Referential { .. })
    }

    /// Id of the governing annotation, for referential annotations
    pub fn governing(&self) -> Option<&str> {
        match &self.kind {
            AnnotationKind::Referential { governing, .. } => Some(governing),
            AnnotationKind::Anchored { .. } => None,
        }
    }

    /// Whether the value has non-whitespace content
    pub fn has_value(&self) -> bool {
        !self.value.trim().is_empty()
    }
}

/// A named track of annotations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    /// Tier identifier (`TIER_ID`), conventionally `Field@Speaker`
    pub id: String,

    /// Parent tier id for dependent tiers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Linguistic type reference
    pub linguistic_type: String,

    /// Speaker attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participant: Option<String>,

    /// Owned annotations in document order
    pub annotations: Vec<Annotation>,

    /// Unmodelled attributes (ANNOTATOR, DEFAULT_LOCALE, LANG_REF, ...)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Attributes,
}

impl Tier {
    pub fn new(id: &str, linguistic_type: &str) -> Self {
        Self {
            id: id.to_string(),
            linguistic_type: linguistic_type.to_string(),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<Annotation>) -> Self {
        self.annotations = annotations;
        self
    }

    /// A tier with a parent reference is dependent
    pub fn is_dependent(&self) -> bool {
        self.parent.is_some()
    }

    /// True when the tier owns no annotations at all
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Field part of the id (before `@`)
    pub fn field_name(&self) -> &str {
        split_tier_id(&self.id).0
    }

    /// Speaker part of the id (after `@`, empty when absent)
    pub fn speaker(&self) -> &str {
        split_tier_id(&self.id).1
    }

    pub fn annotation(&self, id: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }
}

/// Split a tier id of the form `Field@Speaker`
pub fn split_tier_id(id: &str) -> (&str, &str) {
    match id.split_once('@') {
        Some((field, speaker)) => (field, speaker),
        None => (id, ""),
    }
}

/// Schema classification of a tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinguisticType {
    /// Type identifier (`LINGUISTIC_TYPE_ID`)
    pub id: String,

    /// Whether annotations of this type are anchored on time slots
    pub time_alignable: bool,

    /// Constraint stereotype; present on dependent-compatible types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constraints: Option<String>,

    /// Unmodelled attributes (GRAPHIC_REFERENCES, CONTROLLED_VOCABULARY_REF, ...)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra: Attributes,
}

impl LinguisticType {
    pub fn new(id: &str, time_alignable: bool) -> Self {
        Self {
            id: id.to_string(),
            time_alignable,
            constraints: None,
            extra: Vec::new(),
        }
    }

    pub fn with_constraints(mut self, constraints: &str) -> Self {
        self.constraints = Some(constraints.to_string());
        self
    }

    /// Types without constraints may only be used on independent tiers
    pub fn is_independent(&self) -> bool {
        self.constraints.is_none()
    }
}
