use explore_core::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

use crate::tour::Tour;

/// Order total for a seat count on one tour, fixed at the moment it is computed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Quote {
    pub tour_id: u64,
    pub tour_title: String,
    pub unit_price: f64,
    pub seats: u32,
    /// Taxes and fees are not charged on tour packages.
    pub fees: f64,
    pub total: f64,
}

/// `total = price × seats`. Seat availability is not consulted.
pub fn quote(tour: &Tour, seats: u32) -> CoreResult<Quote> {
    if seats == 0 {
        return Err(CoreError::ValidationError("At least one seat is required".to_string()));
    }
    let fees = 0.0;
    Ok(Quote {
        tour_id: tour.id,
        tour_title: tour.title.clone(),
        unit_price: tour.price,
        seats,
        fees,
        total: tour.price * f64::from(seats) + fees,
    })
}
