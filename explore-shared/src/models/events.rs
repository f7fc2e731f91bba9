use serde::{Deserialize, Serialize};

/// Change notifications published by the store after every successful mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreEvent {
    TourCreated { tour_id: u64, slug: String, timestamp: i64 },
    TourUpdated { tour_id: u64, timestamp: i64 },
    TourDeleted { tour_id: u64, timestamp: i64 },
    DestinationCreated { destination_id: u64, name: String, timestamp: i64 },
    DestinationUpdated { destination_id: u64, timestamp: i64 },
    ReviewPosted { review_id: u64, tour_id: u64, rating: f64, timestamp: i64 },
    InquiryReceived { inquiry_id: u64, destination: String, timestamp: i64 },
    InquiryStatusChanged { inquiry_id: u64, status: String, timestamp: i64 },
    UserRegistered { user_id: u64, timestamp: i64 },
    BookingConfirmed {
        booking_id: u64,
        tour_id: u64,
        seats: u32,
        total_amount: f64,
        timestamp: i64,
    },
    HeroMediaReplaced { count: usize, timestamp: i64 },
}

impl StoreEvent {
    pub fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    /// Short event name, used as the SSE event field.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreEvent::TourCreated { .. } => "tour.created",
            StoreEvent::TourUpdated { .. } => "tour.updated",
            StoreEvent::TourDeleted { .. } => "tour.deleted",
            StoreEvent::DestinationCreated { .. } => "destination.created",
            StoreEvent::DestinationUpdated { .. } => "destination.updated",
            StoreEvent::ReviewPosted { .. } => "review.posted",
            StoreEvent::InquiryReceived { .. } => "inquiry.received",
            StoreEvent::InquiryStatusChanged { .. } => "inquiry.status_changed",
            StoreEvent::UserRegistered { .. } => "user.registered",
            StoreEvent::BookingConfirmed { .. } => "booking.confirmed",
            StoreEvent::HeroMediaReplaced { .. } => "hero_media.replaced",
        }
    }
}
