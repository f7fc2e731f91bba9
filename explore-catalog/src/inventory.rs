use serde::{Deserialize, Serialize};

use crate::tour::Tour;

/// Seat bookkeeping view of a tour, as shown in the admin plan list.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SeatAvailability {
    pub capacity: u32,
    pub available: u32,
}

impl SeatAvailability {
    pub fn of(tour: &Tour) -> Self {
        Self {
            capacity: tour.capacity,
            available: tour.available_seats,
        }
    }

    pub fn taken(&self) -> u32 {
        self.capacity.saturating_sub(self.available)
    }

    pub fn is_sold_out(&self) -> bool {
        self.available == 0
    }

    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            1.0 - (f64::from(self.available) / f64::from(self.capacity))
        }
    }

    pub fn can_seat(&self, seats: u32) -> bool {
        seats <= self.available
    }
}
