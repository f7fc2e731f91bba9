use std::collections::HashSet;

use explore_catalog::{
    Booking, Destination, DestinationPatch, HeroMedia, Inquiry, InquiryStatus, MediaSection,
    NewBooking, NewDestination, NewInquiry, NewReview, NewTour, Review, Tour, TourCategory,
    TourPatch,
};
use explore_core::{today, CoreError, CoreResult, Repository, User};
use explore_shared::pii::Masked;
use explore_shared::StoreEvent;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::memory::{Collection, MAX_RECORD_ID};
use crate::seed::Seed;

/// How many tours the landing page features.
pub const FEATURED_LIMIT: usize = 3;

const EVENT_BUFFER: usize = 256;

/// Owns every collection of the site. One instance per process (or per test).
pub struct Store {
    destinations: Collection<Destination>,
    tours: Collection<Tour>,
    reviews: Collection<Review>,
    inquiries: Collection<Inquiry>,
    users: Collection<User>,
    bookings: Collection<Booking>,
    hero_media: Collection<HeroMedia>,
    events: broadcast::Sender<StoreEvent>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(Seed::demo())
    }
}

impl Store {
    pub fn new(seed: Seed) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            destinations: Collection::seeded(seed.destinations),
            tours: Collection::seeded(seed.tours),
            reviews: Collection::seeded(seed.reviews),
            inquiries: Collection::seeded(seed.inquiries),
            users: Collection::seeded(seed.users),
            bookings: Collection::seeded(seed.bookings),
            hero_media: Collection::seeded(seed.hero_media),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: StoreEvent) {
        // No subscribers is the normal case outside the admin feed.
        let _ = self.events.send(event);
    }

    // Tours

    pub async fn tours(&self) -> Vec<Tour> {
        self.tours.list().await
    }

    pub async fn tour(&self, id: u64) -> Option<Tour> {
        self.tours.get(id).await
    }

    pub async fn tour_by_slug(&self, slug: &str) -> Option<Tour> {
        self.tours.find(|t| t.slug == slug).await
    }

    pub async fn featured_tours(&self, limit: usize) -> Vec<Tour> {
        let mut featured = self.tours.filter(|t| t.featured).await;
        featured.truncate(limit);
        featured
    }

    /// An empty category list means no filter.
    pub async fn tours_in_categories(&self, categories: &[TourCategory]) -> Vec<Tour> {
        if categories.is_empty() {
            return self.tours().await;
        }
        self.tours.filter(|t| categories.contains(&t.category)).await
    }

    /// Other tours at the same destination.
    pub async fn related_tours(&self, tour: &Tour) -> Vec<Tour> {
        self.tours
            .filter(|t| t.destination_id == tour.destination_id && t.id != tour.id)
            .await
    }

    pub async fn add_tour(&self, draft: NewTour) -> CoreResult<Tour> {
        let destination = self.require_destination(draft.destination_id).await?;
        let mut tour = draft.into_tour(&destination)?;
        tour.slug = self.unique_slug(&tour.slug).await;

        let tour = self.tours.add(tour).await;
        info!(tour_id = tour.id, slug = %tour.slug, "tour created");
        self.publish(StoreEvent::TourCreated {
            tour_id: tour.id,
            slug: tour.slug.clone(),
            timestamp: StoreEvent::now(),
        });
        Ok(tour)
    }

    /// Shallow merge. Moving a tour to another destination also moves its location
    /// unless the patch sets one explicitly.
    pub async fn update_tour(&self, id: u64, mut patch: TourPatch) -> CoreResult<Tour> {
        patch.validate()?;
        if let Some(destination_id) = patch.destination_id {
            let destination = self.require_destination(destination_id).await?;
            if patch.location.is_none() {
                patch.location = Some(destination.name);
            }
        }

        let tour = self
            .tours
            .update(id, patch)
            .await
            .ok_or_else(|| CoreError::NotFound(format!("tour {}", id)))?;
        info!(tour_id = id, "tour updated");
        self.publish(StoreEvent::TourUpdated { tour_id: id, timestamp: StoreEvent::now() });
        Ok(tour)
    }

    pub async fn delete_tour(&self, id: u64) -> bool {
        let removed = self.tours.delete(id).await;
        if removed {
            info!(tour_id = id, "tour deleted");
            self.publish(StoreEvent::TourDeleted { tour_id: id, timestamp: StoreEvent::now() });
        }
        removed
    }

    async fn unique_slug(&self, base: &str) -> String {
        let taken: Vec<String> = self.tours.list().await.into_iter().map(|t| t.slug).collect();
        if !taken.iter().any(|s| s == base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{}-{}", base, n))
            .find(|candidate| !taken.contains(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    // Destinations

    pub async fn destinations(&self) -> Vec<Destination> {
        self.destinations.list().await
    }

    pub async fn destination(&self, id: u64) -> Option<Destination> {
        self.destinations.get(id).await
    }

    async fn require_destination(&self, id: u64) -> CoreResult<Destination> {
        match self.destination(id).await {
            Some(destination) => Ok(destination),
            None => {
                warn!(destination_id = id, "unknown destination referenced");
                Err(CoreError::ValidationError(format!("Destination {} does not exist", id)))
            }
        }
    }

    pub async fn add_destination(&self, draft: NewDestination) -> CoreResult<Destination> {
        let destination = self.destinations.add(draft.into_destination()?).await;
        info!(destination_id = destination.id, name = %destination.name, "destination created");
        self.publish(StoreEvent::DestinationCreated {
            destination_id: destination.id,
            name: destination.name.clone(),
            timestamp: StoreEvent::now(),
        });
        Ok(destination)
    }

    pub async fn update_destination(&self, id: u64, patch: DestinationPatch) -> CoreResult<Destination> {
        if matches!(&patch.name, Some(name) if name.trim().is_empty()) {
            return Err(CoreError::ValidationError("Destination name is required".to_string()));
        }
        let destination = self
            .destinations
            .update(id, patch)
            .await
            .ok_or_else(|| CoreError::NotFound(format!("destination {}", id)))?;
        info!(destination_id = id, "destination updated");
        self.publish(StoreEvent::DestinationUpdated {
            destination_id: id,
            timestamp: StoreEvent::now(),
        });
        Ok(destination)
    }

    // Reviews

    pub async fn reviews_for_tour(&self, tour_id: u64) -> Vec<Review> {
        self.reviews.filter(|r| r.tour_id == tour_id).await
    }

    pub async fn add_review(&self, tour_id: u64, draft: NewReview) -> CoreResult<Review> {
        if self.tour(tour_id).await.is_none() {
            return Err(CoreError::NotFound(format!("tour {}", tour_id)));
        }
        let review = self.reviews.add(draft.into_review(tour_id, today())?).await;
        info!(review_id = review.id, tour_id, rating = review.rating, "review posted");
        self.publish(StoreEvent::ReviewPosted {
            review_id: review.id,
            tour_id,
            rating: review.rating,
            timestamp: StoreEvent::now(),
        });
        Ok(review)
    }

    // Inquiries

    pub async fn inquiries(&self) -> Vec<Inquiry> {
        self.inquiries.list().await
    }

    pub async fn add_inquiry(&self, draft: NewInquiry) -> CoreResult<Inquiry> {
        let inquiry = self.inquiries.add(draft.into_inquiry(today())?).await;
        info!(inquiry_id = inquiry.id, email = %inquiry.email, "inquiry received");
        self.publish(StoreEvent::InquiryReceived {
            inquiry_id: inquiry.id,
            destination: inquiry.destination.clone(),
            timestamp: StoreEvent::now(),
        });
        Ok(inquiry)
    }

    pub async fn set_inquiry_status(&self, id: u64, status: InquiryStatus) -> CoreResult<Inquiry> {
        let inquiry = self
            .inquiries
            .update(id, status)
            .await
            .ok_or_else(|| CoreError::NotFound(format!("inquiry {}", id)))?;
        info!(inquiry_id = id, status = status.as_str(), "inquiry status changed");
        self.publish(StoreEvent::InquiryStatusChanged {
            inquiry_id: id,
            status: status.as_str().to_string(),
            timestamp: StoreEvent::now(),
        });
        Ok(inquiry)
    }

    // Users

    pub async fn users(&self) -> Vec<User> {
        self.users.list().await
    }

    /// Matches against email or phone.
    pub async fn check_user_exists(&self, identifier: &str) -> bool {
        self.users.any(|u| u.matches(identifier)).await
    }

    pub async fn find_user(&self, identifier: &str) -> Option<User> {
        self.users.find(|u| u.matches(identifier)).await
    }

    /// Identifier uniqueness is not enforced.
    pub async fn register_user(&self, identifier: &str, name: &str) -> User {
        let user = self.users.append(User::register(identifier, name, today())).await;
        info!(user_id = user.id, identifier = %Masked(identifier), "user registered");
        self.publish(StoreEvent::UserRegistered { user_id: user.id, timestamp: StoreEvent::now() });
        user
    }

    // Bookings

    pub async fn bookings(&self) -> Vec<Booking> {
        self.bookings.list().await
    }

    pub async fn add_booking(&self, draft: NewBooking) -> Booking {
        let booking = self.bookings.add(draft.into_booking(today())).await;
        info!(
            booking_id = booking.id,
            tour_id = booking.tour_id,
            seats = booking.seats,
            total = booking.total_amount,
            "booking confirmed"
        );
        self.publish(StoreEvent::BookingConfirmed {
            booking_id: booking.id,
            tour_id: booking.tour_id,
            seats: booking.seats,
            total_amount: booking.total_amount,
            timestamp: StoreEvent::now(),
        });
        booking
    }

    // Hero media

    pub async fn hero_media(&self, section: Option<MediaSection>) -> Vec<HeroMedia> {
        match section {
            Some(section) => self.hero_media.filter(|m| m.in_section(section)).await,
            None => self.hero_media.list().await,
        }
    }

    /// Ids of zero are assigned; any other id must be unique and at most
    /// [`MAX_RECORD_ID`].
    pub async fn replace_hero_media(&self, media: Vec<HeroMedia>) -> CoreResult<Vec<HeroMedia>> {
        let mut seen = HashSet::new();
        for item in media.iter().filter(|m| m.id != 0) {
            if item.id > MAX_RECORD_ID {
                return Err(CoreError::ValidationError(format!("Media id {} is out of range", item.id)));
            }
            if !seen.insert(item.id) {
                return Err(CoreError::ValidationError(format!("Duplicate media id {}", item.id)));
            }
        }

        let media = self.hero_media.replace_all(media).await;
        info!(count = media.len(), "hero media replaced");
        self.publish(StoreEvent::HeroMediaReplaced {
            count: media.len(),
            timestamp: StoreEvent::now(),
        });
        Ok(media)
    }

    pub async fn remove_hero_media(&self, id: u64) -> bool {
        let removed = self.hero_media.delete(id).await;
        if removed {
            let count = self.hero_media.len().await;
            info!(media_id = id, "hero media removed");
            self.publish(StoreEvent::HeroMediaReplaced { count, timestamp: StoreEvent::now() });
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use explore_catalog::{MediaKind, BookingStatus};

    fn draft(title: &str, destination_id: u64) -> NewTour {
        NewTour {
            destination_id,
            title: title.to_string(),
            description: "Three lakes in three days".to_string(),
            price: 600.0,
            capacity: Some(15),
            duration_days: 3,
            start_date: NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            featured: false,
            image: None,
            video: None,
            category: TourCategory::Standard,
            services: vec![],
        }
    }

    #[tokio::test]
    async fn test_tours_returns_a_copy() {
        let store = Store::default();
        let mut tours = store.tours().await;
        tours.clear();
        assert_eq!(store.tours().await.len(), 2);
    }

    #[tokio::test]
    async fn test_add_tour_is_listed_with_full_availability() {
        let store = Store::default();
        let tour = store.add_tour(draft("Hunza Lakes Tour", 1)).await.unwrap();

        let tours = store.tours().await;
        assert_eq!(tours[0].id, tour.id);
        assert_eq!(tours[0].available_seats, tours[0].capacity);
        assert_eq!(tours[0].location, "Hunza");
        assert!(tour.id > 2);
    }

    #[tokio::test]
    async fn test_add_tour_requires_known_destination() {
        let store = Store::default();
        let err = store.add_tour(draft("Nowhere", 99)).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
        assert_eq!(store.tours().await.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_titles_get_suffixed_slugs() {
        let store = Store::default();
        let first = store.add_tour(draft("Lake Tour", 1)).await.unwrap();
        let second = store.add_tour(draft("Lake Tour", 2)).await.unwrap();
        let third = store.add_tour(draft("Lake Tour", 2)).await.unwrap();
        assert_eq!(first.slug, "lake-tour");
        assert_eq!(second.slug, "lake-tour-2");
        assert_eq!(third.slug, "lake-tour-3");
        assert_eq!(store.tour_by_slug("lake-tour-2").await.unwrap().id, second.id);
    }

    #[tokio::test]
    async fn test_non_ascii_titles_get_routable_slugs() {
        let store = Store::default();
        let first = store.add_tour(draft("ہنزہ", 1)).await.unwrap();
        let second = store.add_tour(draft("دیوسائی", 2)).await.unwrap();
        assert_eq!(first.slug, "tour");
        assert_eq!(second.slug, "tour-2");
        assert_eq!(store.tour_by_slug("tour-2").await.unwrap().title, "دیوسائی");
    }

    #[tokio::test]
    async fn test_delete_tour_twice() {
        let store = Store::default();
        assert!(store.delete_tour(1).await);
        assert!(!store.delete_tour(1).await);
        assert!(store.tour(1).await.is_none());
    }

    #[tokio::test]
    async fn test_update_tour_moves_destination() {
        let store = Store::default();
        let patch = TourPatch { destination_id: Some(2), ..Default::default() };
        let tour = store.update_tour(1, patch).await.unwrap();
        assert_eq!(tour.location, "Skardu");
        assert_eq!(tour.slug, "hunza-luxury-7");

        let bad = TourPatch { destination_id: Some(42), ..Default::default() };
        assert!(store.update_tour(1, bad).await.is_err());
        assert!(matches!(
            store.update_tour(77, TourPatch::default()).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_catalog_queries() {
        let store = Store::default();
        assert_eq!(store.featured_tours(FEATURED_LIMIT).await.len(), 2);
        assert_eq!(store.tours_in_categories(&[TourCategory::Luxury]).await.len(), 1);
        assert_eq!(store.tours_in_categories(&[]).await.len(), 2);

        let hunza = store.tour(1).await.unwrap();
        assert!(store.related_tours(&hunza).await.is_empty());
        let sibling = store.add_tour(draft("Hunza Lakes Tour", 1)).await.unwrap();
        let related = store.related_tours(&hunza).await;
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].id, sibling.id);
    }

    #[tokio::test]
    async fn test_user_lookup_and_signup() {
        let store = Store::default();
        assert!(store.check_user_exists("admin@exploregb.pk").await);
        assert!(store.check_user_exists("03219876543").await);
        assert!(!store.check_user_exists("nobody@nowhere.com").await);

        store.register_user("a@b.com", "X").await;
        assert!(store.check_user_exists("a@b.com").await);
        let users = store.users().await;
        assert_eq!(users.last().unwrap().name, "X");
    }

    #[tokio::test]
    async fn test_reviews_are_prepended() {
        let store = Store::default();
        let review = store
            .add_review(1, NewReview { user_name: "Ali".to_string(), rating: 3.5, comment: "Cold nights".to_string() })
            .await
            .unwrap();
        let reviews = store.reviews_for_tour(1).await;
        assert_eq!(reviews.len(), 3);
        assert_eq!(reviews[0].id, review.id);
        assert!(store.reviews_for_tour(2).await.is_empty());
    }

    #[tokio::test]
    async fn test_inquiry_lifecycle() {
        let store = Store::default();
        let inquiry = store
            .add_inquiry(NewInquiry {
                user_name: "Zara".to_string(),
                email: "zara@example.com".to_string(),
                destination: "Fairy Meadows".to_string(),
                budget: "1500".to_string(),
                notes: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(inquiry.status, InquiryStatus::New);
        assert_eq!(store.inquiries().await[0].id, inquiry.id);

        let updated = store.set_inquiry_status(inquiry.id, InquiryStatus::Responded).await.unwrap();
        assert_eq!(updated.status, InquiryStatus::Responded);
    }

    #[tokio::test]
    async fn test_booking_is_confirmed_and_published() {
        let store = Store::default();
        let mut events = store.subscribe();
        let booking = store
            .add_booking(NewBooking {
                tour_id: 1,
                tour_title: "Hunza Valley: 7-Day Luxury Plan".to_string(),
                seats: 2,
                total_amount: 1900.0,
                transaction_id: "tx_abc".to_string(),
            })
            .await;
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(store.bookings().await.len(), 1);

        match events.recv().await.unwrap() {
            StoreEvent::BookingConfirmed { booking_id, total_amount, .. } => {
                assert_eq!(booking_id, booking.id);
                assert_eq!(total_amount, 1900.0);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_hero_media_management() {
        let store = Store::default();
        assert_eq!(store.hero_media(Some(MediaSection::Hero)).await.len(), 3);
        assert!(store.hero_media(Some(MediaSection::About)).await.is_empty());

        let replaced = store
            .replace_hero_media(vec![HeroMedia {
                id: 0,
                url: "https://cdn.example.com/k2.jpg".to_string(),
                kind: MediaKind::Image,
                section: Some(MediaSection::About),
            }])
            .await
            .unwrap();
        assert_eq!(replaced.len(), 1);
        assert!(replaced[0].id > 3);
        assert!(store.remove_hero_media(replaced[0].id).await);
        assert!(store.hero_media(None).await.is_empty());
    }

    fn media(id: u64) -> HeroMedia {
        HeroMedia {
            id,
            url: format!("https://cdn.example.com/{}.jpg", id),
            kind: MediaKind::Image,
            section: Some(MediaSection::Hero),
        }
    }

    #[tokio::test]
    async fn test_hero_media_rejects_out_of_range_and_duplicate_ids() {
        let store = Store::default();

        let err = store.replace_hero_media(vec![media(u64::MAX)]).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
        let err = store.replace_hero_media(vec![media(5), media(5)]).await.unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
        assert_eq!(store.hero_media(None).await.len(), 3);

        let kept = store.replace_hero_media(vec![media(MAX_RECORD_ID), media(0)]).await.unwrap();
        assert_eq!(kept[0].id, MAX_RECORD_ID);
        assert_ne!(kept[1].id, 0);
    }

    #[tokio::test]
    async fn test_add_destination() {
        let store = Store::default();
        let mut events = store.subscribe();
        let astore = store
            .add_destination(NewDestination {
                name: "Astore".to_string(),
                description: "Gateway to Nanga Parbat".to_string(),
                image: "astore.jpg".to_string(),
                services: vec![],
                visit_places: vec!["Rama Meadows".to_string()],
                gallery: vec![],
            })
            .await
            .unwrap();
        assert!(astore.id > 2);
        assert_eq!(store.destinations().await[0].name, "Astore");
        assert_eq!(events.recv().await.unwrap().kind(), "destination.created");

        // Tours can now be planned there.
        let tour = store.add_tour(draft("Rama Meadows Walk", astore.id)).await.unwrap();
        assert_eq!(tour.location, "Astore");

        let missing_cover = NewDestination {
            name: "Minimarg".to_string(),
            description: String::new(),
            image: String::new(),
            services: vec![],
            visit_places: vec![],
            gallery: vec![],
        };
        assert!(store.add_destination(missing_cover).await.is_err());
    }

    #[tokio::test]
    async fn test_update_destination() {
        let store = Store::default();
        let updated = store
            .update_destination(1, DestinationPatch { gallery: Some(vec![]), ..Default::default() })
            .await
            .unwrap();
        assert!(updated.gallery.is_empty());
        assert_eq!(updated.name, "Hunza");

        let blank = DestinationPatch { name: Some("  ".to_string()), ..Default::default() };
        assert!(matches!(
            store.update_destination(1, blank).await,
            Err(CoreError::ValidationError(_))
        ));
        assert!(matches!(
            store.update_destination(42, DestinationPatch::default()).await,
            Err(CoreError::NotFound(_))
        ));
        assert_eq!(store.destination(1).await.unwrap().name, "Hunza");
    }
}
