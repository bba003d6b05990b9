/*!
 * In-memory model of an annotation document.
 *
 * - `model`: tiers, annotations, time slots and linguistic types
 * - `time_index`: interval resolution for every annotation
 * - `core`: the `Document` aggregate and its builder
 * - `tier_graph`: tier lookup and structural edits
 * - `rectify`: conversion of annotations to match a tier's type
 * - `query`: range queries, coverage and export rows
 */

pub mod core;
pub mod model;
pub mod query;
pub mod rectify;
pub mod tier_graph;
pub mod time_index;

pub use self::core::{Document, DocumentBuilder};
pub use model::{Annotation, AnnotationKind, Attributes, LinguisticType, Tier, TimeSlot};
pub use query::{BaselineSelector, ExportRow};
pub use rectify::RectifyReport;
pub use time_index::{format_human_time, Interval, TimeIndex, DEFAULT_MAX_CHAIN_DEPTH};
