use chrono::NaiveDate;
use explore_core::Record;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Completed,
}

/// A confirmed purchase of seats on a tour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: u64,
    pub tour_id: u64,
    pub tour_title: String,
    pub seats: u32,
    /// Tour price times seats, captured when payment succeeded.
    pub total_amount: f64,
    pub status: BookingStatus,
    pub date: NaiveDate,
    pub transaction_id: String,
}

/// What checkout hands to the store once payment went through.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub tour_id: u64,
    pub tour_title: String,
    pub seats: u32,
    pub total_amount: f64,
    pub transaction_id: String,
}

impl NewBooking {
    pub fn into_booking(self, date: NaiveDate) -> Booking {
        Booking {
            id: 0,
            tour_id: self.tour_id,
            tour_title: self.tour_title,
            seats: self.seats,
            total_amount: self.total_amount,
            status: BookingStatus::Confirmed,
            date,
            transaction_id: self.transaction_id,
        }
    }
}

impl Record for Booking {
    // Bookings are never edited once written.
    type Patch = std::convert::Infallible;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn apply(&mut self, patch: Self::Patch) {
        match patch {}
    }
}
