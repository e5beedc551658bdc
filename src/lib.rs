//! frostguide: upgrade cost and bonus calculators for the strategy guide.
//!
//! The [progression] engine answers "what does it take to go from level A to
//! level B" for every upgrade track the guide documents. [data] owns the
//! reference tables, [server] and [cli] are thin front ends over the engine.

pub mod cli;
pub mod data;
pub mod progression;
pub mod server;
