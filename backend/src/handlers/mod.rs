//! HTTP handlers for the Stockroom API

mod dashboard;
mod export;
mod health;
mod location;
mod product;
mod stock;
mod stock_movement;

pub use dashboard::*;
pub use export::*;
pub use health::*;
pub use location::*;
pub use product::*;
pub use stock::*;
pub use stock_movement::*;

use serde::Deserialize;
use shared::parse_dead_days;

use crate::error::{AppError, AppResult};

/// `?deadDays=` as sent by the client, parsed after extraction so bad
/// values report a field-level validation error
#[derive(Debug, Default, Deserialize)]
pub struct DeadDaysQuery {
    #[serde(rename = "deadDays")]
    pub dead_days: Option<String>,
}

impl DeadDaysQuery {
    pub fn resolve(&self, default: i64) -> AppResult<i64> {
        parse_dead_days(self.dead_days.as_deref(), default)
            .map_err(|msg| AppError::validation("deadDays", msg))
    }
}
