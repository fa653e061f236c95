//! Spreadsheet-to-directory import planning
//!
//! Turns tabular input rows into canonical directory attributes and
//! reconciles them against current directory state, producing an
//! ordered plan of create/delete actions. The plan is the output; an
//! external applier performs the actual mutations.

pub mod mapper;
pub mod normalize;
pub mod path;
pub mod planner;
pub mod report;
pub mod rows;
pub mod template;
pub mod types;

pub use mapper::RowMapper;
pub use normalize::AttributeNormalizer;
pub use path::{DirectoryPath, build_ou_path};
pub use planner::{ImportPlanner, PlannerOptions};
pub use report::write_plan_excel;
pub use rows::{read_rows, read_rows_csv, read_rows_excel};
pub use template::{Modifier, TemplateCache, TemplateEngine};
pub use types::*;
