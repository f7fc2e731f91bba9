pub mod booking;
pub mod destination;
pub mod inquiry;
pub mod inventory;
pub mod media;
pub mod pricing;
pub mod review;
pub mod tour;

pub use booking::{Booking, BookingStatus, NewBooking};
pub use destination::{Destination, DestinationPatch, MediaAsset, MediaKind, NewDestination};
pub use inquiry::{Inquiry, InquiryStatus, NewInquiry};
pub use inventory::SeatAvailability;
pub use media::{HeroMedia, MediaSection};
pub use pricing::{quote, Quote};
pub use review::{NewReview, Review};
pub use tour::{slugify, NewTour, Tour, TourCategory, TourPatch};
