//! Domain models for the Stockroom inventory tracker

mod inventory;
mod location;
mod movement;
mod product;
mod stock;

pub use inventory::*;
pub use location::*;
pub use movement::*;
pub use product::*;
pub use stock::*;
