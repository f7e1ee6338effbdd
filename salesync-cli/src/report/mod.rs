//! Sales report transformation
//!
//! Raw export bytes flow through four stages:
//! - [`source`] decodes bytes into header-keyed records
//! - [`resolver`] maps columns onto name / category / sold
//! - [`aggregate`] groups and orders items by category
//! - [`rows`] lays the groups out as the report's 2-D row set

pub mod aggregate;
pub mod resolver;
pub mod rows;
pub mod source;
pub mod value;

pub use aggregate::{GroupingPolicy, aggregate};
pub use resolver::{FieldResolver, ResolveMode, ResolveStats};
pub use rows::{ReportBuilder, ReportRow, ReportRowSet, ReportShape};
pub use source::{SourceKind, parse_records};
