#![warn(clippy::nursery, clippy::pedantic, unused_crate_dependencies)]
#![allow(
    clippy::cognitive_complexity,
    clippy::match_same_arms,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::similar_names,
    clippy::too_many_lines
)]

pub mod const_expr;
pub mod hoist;
pub mod id;
pub mod ir;
pub mod position;
pub mod rich_ir;
pub mod string_to_ir;
pub mod utils;
