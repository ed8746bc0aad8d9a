//! Report serialisation for a [`ResultRecord`](crate::model::ResultRecord):
//! JSON (for tooling), CSV (for spreadsheets) and a human/markdown summary.
//! Receives a fully populated record and must preserve its integer values
//! byte-exactly (§6 "Report serialiser").

pub mod csv;
pub mod human;
pub mod json;
