//! Gap filling, grade aggregation and classification.
//!
//! This module turns a raw gradebook into a filled, annotated gradebook:
//! reference averages feed the gap filler, the filled component rows are
//! blended into period totals, midterm composites, an admission rating and
//! a final grade, and the final grade is mapped to a letter.

pub mod aggregate;
pub mod analyzer;
pub mod filler;
pub mod grade;
pub mod reference;
pub mod types;
pub mod utility;
