//! # Weekly Plan Parser
//!
//! Turns free-form model output into a seven-day [`WeeklyContentPlan`].
//! Handles think blocks, markdown fences, Python- and JSON-style lists,
//! brackets inside list entries, and plain day-prefixed lines without an
//! additional model call. Parsing never fails; missing days get
//! placeholder ideas.
//!
//! [`WeeklyContentPlan`]: crate::types::WeeklyContentPlan
//!
//! ## Entry Point
//!
//! | Function | Use Case |
//! |----------|----------|
//! | [`parse_weekly_plan`] | Seven ideas plus a summary from raw output |
//!
//! ## Building Blocks
//!
//! | Function | Purpose |
//! |----------|---------|
//! | [`strip_think_tags`] | Remove `<think>` blocks from text |
//! | [`find_list_literal`] | Locate the first list literal with enough strings |
//! | [`ideas_from_lines`] | Day-prefixed line scan |

pub mod extract;
pub mod lines;
pub mod literal;
pub mod weekly;

pub use extract::{preprocess, strip_think_tags};
pub use lines::ideas_from_lines;
pub use literal::{find_list_literal, ListLiteral, LiteralItem};
pub use weekly::{parse_weekly_plan, MIN_LIST_STRINGS};
