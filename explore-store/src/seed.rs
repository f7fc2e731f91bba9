use chrono::NaiveDate;
use explore_catalog::{
    Booking, Destination, HeroMedia, Inquiry, InquiryStatus, MediaAsset, MediaKind, MediaSection,
    Review, Tour, TourCategory,
};
use explore_core::{Role, User};
use explore_shared::pii::Masked;

/// Initial contents of every collection.
#[derive(Debug, Clone, Default)]
pub struct Seed {
    pub destinations: Vec<Destination>,
    pub tours: Vec<Tour>,
    pub reviews: Vec<Review>,
    pub inquiries: Vec<Inquiry>,
    pub users: Vec<User>,
    pub bookings: Vec<Booking>,
    pub hero_media: Vec<HeroMedia>,
}

const HUNZA_COVER: &str =
    "https://images.unsplash.com/photo-1548320936-c6a3e041551e?auto=format&fit=crop&w=800&q=80";
const SKARDU_COVER: &str =
    "https://images.unsplash.com/photo-1623150954026-3e0964987593?auto=format&fit=crop&w=800&q=80";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Seed {
    /// The catalog the site ships with: Hunza and Skardu, one tour each.
    pub fn demo() -> Self {
        Self {
            destinations: destinations(),
            tours: tours(),
            reviews: reviews(),
            inquiries: inquiries(),
            users: users(),
            bookings: Vec::new(),
            hero_media: hero_media(),
        }
    }
}

fn destinations() -> Vec<Destination> {
    vec![
        Destination {
            id: 1,
            name: "Hunza".to_string(),
            description: "Known as the 'Heaven on Earth', Hunza is a mountainous valley in the northern part of the Gilgit-Baltistan region of Pakistan. It is home to ancient forts and turquoise lakes.".to_string(),
            image: "https://images.unsplash.com/photo-1548320936-c6a3e041551e?auto=crop&w=800&q=80".to_string(),
            services: strings(&["Luxury SUV Transport", "Local Tour Guide", "Altit Fort Access", "Breakfast Included"]),
            visit_places: strings(&["Altit Fort", "Baltit Fort", "Attabad Lake", "Passu Cones", "Eagle's Nest"]),
            gallery: vec![
                MediaAsset::image(HUNZA_COVER),
                MediaAsset::image("https://images.unsplash.com/photo-1469854523086-cc02fe5d8800?auto=format&fit=crop&w=800&q=80"),
            ],
        },
        Destination {
            id: 2,
            name: "Skardu".to_string(),
            description: "Skardu is the central valley of Baltistan and the gateway to some of the highest peaks in the world, including K2. It offers a unique desert-mountain landscape.".to_string(),
            image: SKARDU_COVER.to_string(),
            services: strings(&["4x4 Deosai Safari", "Shangrila Resort Entry", "Cold Desert Camping", "Stargazing Kit"]),
            visit_places: strings(&["Shangrila Resort", "Upper Kachura Lake", "Deosai National Park", "Katpana Desert"]),
            gallery: vec![MediaAsset::image(SKARDU_COVER)],
        },
    ]
}

fn tours() -> Vec<Tour> {
    vec![
        Tour {
            id: 1,
            destination_id: 1,
            title: "Hunza Valley: 7-Day Luxury Plan".to_string(),
            slug: "hunza-luxury-7".to_string(),
            description: "Witness the golden hues of Hunza. Visit Altit & Baltit Forts, Attabad Lake, and the majestic Rakaposhi View Point.".to_string(),
            price: 950.0,
            capacity: 10,
            available_seats: 10,
            duration_days: 7,
            location: "Hunza".to_string(),
            start_date: date(2024, 10, 15),
            featured: true,
            image: HUNZA_COVER.to_string(),
            video: None,
            rating: 4.9,
            reviews_count: 342,
            category: TourCategory::Luxury,
            services: strings(&["Luxury SUV", "Guided Tours", "All Meals"]),
        },
        Tour {
            id: 2,
            destination_id: 2,
            title: "Skardu & Deosai: 10-Day Expedition".to_string(),
            slug: "skardu-deosai-10".to_string(),
            description: "Explore the land of giants. Deosai Plains, Shangrila Resort, and the cold desert of Skardu.".to_string(),
            price: 1250.0,
            capacity: 12,
            available_seats: 8,
            duration_days: 10,
            location: "Skardu".to_string(),
            start_date: date(2024, 7, 10),
            featured: true,
            image: SKARDU_COVER.to_string(),
            video: None,
            rating: 4.8,
            reviews_count: 215,
            category: TourCategory::Premium,
            services: strings(&["4x4 Jeep", "Camping Gear", "Local Chef"]),
        },
    ]
}

fn reviews() -> Vec<Review> {
    vec![
        Review {
            id: 1,
            tour_id: 1,
            user_name: "Sarah Khan".to_string(),
            rating: 5.0,
            comment: "Amazing experience! The views were breathtaking.".to_string(),
            date: date(2024, 4, 15),
        },
        Review {
            id: 2,
            tour_id: 1,
            user_name: "John Doe".to_string(),
            rating: 4.0,
            comment: "Great tour, very well organized.".to_string(),
            date: date(2024, 5, 10),
        },
    ]
}

fn inquiries() -> Vec<Inquiry> {
    vec![Inquiry {
        id: 1,
        user_name: "Ahad Malik".to_string(),
        email: Masked("aadimalik226@gmail.com".to_string()),
        destination: "Custom Skardu Honeymoon".to_string(),
        budget: "2000".to_string(),
        notes: "Need a private cottage near Shangrila.".to_string(),
        status: InquiryStatus::New,
        date: date(2024, 5, 20),
    }]
}

fn users() -> Vec<User> {
    let user = |id, email: &str, phone: &str, name: &str, role, joined| User {
        id,
        email: Masked(email.to_string()),
        phone: Masked(phone.to_string()),
        name: name.to_string(),
        role,
        joined,
    };
    vec![
        user(1, "admin@exploregb.pk", "0318384001", "Ahad Malik", Role::Admin, date(2023, 10, 12)),
        user(2, "user@example.com", "03001234567", "John Doe", Role::User, date(2024, 1, 5)),
        user(3, "sarah.khan@travel.pk", "03219876543", "Sarah Khan", Role::User, date(2024, 3, 15)),
    ]
}

fn hero_media() -> Vec<HeroMedia> {
    let item = |id, url: &str, kind| HeroMedia {
        id,
        url: url.to_string(),
        kind,
        section: Some(MediaSection::Hero),
    };
    vec![
        item(1, "https://images.unsplash.com/photo-1548320936-c6a3e041551e?auto=format&fit=crop&w=1920&q=80", MediaKind::Image),
        item(2, "https://www.w3schools.com/html/mov_bbb.mp4", MediaKind::Video),
        item(3, "https://images.unsplash.com/photo-1627896610402-8a8b8e6c4c5b?auto=format&fit=crop&w=1920&q=80", MediaKind::Image),
    ]
}
