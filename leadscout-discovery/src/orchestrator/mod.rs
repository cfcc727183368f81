//! Discovery orchestration: fan-out, merge, ranking and assembly.
//!
//! [`fanout`] queries the sources concurrently under time budgets,
//! [`dedup`] merges normalised persons into unique executives,
//! [`scoring`] filters and ranks them and picks the primary decision maker,
//! and [`assemble`] packages the job's result and writes it back.

pub mod assemble;
pub mod dedup;
pub mod fanout;
pub mod scoring;
pub mod similarity;
