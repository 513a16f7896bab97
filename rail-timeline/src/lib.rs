//! Railway timeline inference and movement decisions.
//!
//! Turns sparse station-by-station schedules into complete timelines,
//! derives labelled conflict pairs from them, and answers "go, wait or
//! reroute" questions from a precomputed policy table.

pub mod cache;
pub mod conflict;
pub mod domain;
pub mod formats;
pub mod geo;
pub mod geocode;
pub mod policy;
pub mod timeline;
pub mod web;
