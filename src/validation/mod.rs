/*!
 * Validation of loaded annotation documents.
 *
 * # Architecture
 *
 * - `integrity`: structural checks (id uniqueness, references, slot order,
 *   representation against linguistic types)
 */

pub mod integrity;

// Re-export main types
pub use integrity::{IntegrityChecker, IntegrityIssue, IntegrityReport};
