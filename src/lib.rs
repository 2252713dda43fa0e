//! A deterministic rating and pairing engine for a fourball golf league.
//! Derives pool-relative player ratings from recent round history, blends them
//! into a single headline score, and fills eight anchor/gunner pairings under
//! hard captain-supplied constraints.

pub mod blend;
pub mod classify;
pub mod config;
pub mod csv;
pub mod metrics;
pub mod pairing;
pub mod print;
pub mod rating;
pub mod roles;
pub mod rounds;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

#[doc = include_str!("../README.md")]
#[cfg(doc)]
fn readme() {}
