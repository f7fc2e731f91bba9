use explore_catalog::Tour;

/// Catalog lines handed to the model so it can quote live prices and seats.
pub fn tour_context(tours: &[Tour]) -> String {
    tours
        .iter()
        .map(|t| {
            format!(
                "- Tour: {}\n  - Price: ${}\n  - Duration: {} Days\n  - Location: {}\n  - Availability: {} seats left\n  - Rating: {} stars\n  - Description: {}\n  - Featured: {}",
                t.title,
                t.price,
                t.duration_days,
                t.location,
                t.available_seats,
                t.rating,
                t.description,
                if t.featured { "Yes" } else { "No" },
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn system_instruction(tours: &[Tour]) -> String {
    format!(
        r#"You are an enthusiastic and knowledgeable local travel guide for Gilgit-Baltistan (GB), Pakistan.
Your name is "ExploreGB Guide".

Key traits:
- Warm, hospitable, and polite (use greetings like "As-salamu alaykum").
- Expert on destinations: Hunza, Skardu, Fairy Meadows, Astore, Ghizer, Khunjerab Pass.
- Practical: Give advice on roads, weather, best seasons.

IMPORTANT - REAL-TIME DATABASE ACCESS:
You have access to the following LIVE tour packages:
{}

IMPORTANT - WEB SEARCH ACCESS:
Use the search tool for current weather, road conditions, news, or specific facts not in the database.

Response Style:
- Use **Bold** for key locations or prices.
- Use bullet points for lists or itineraries.
- Keep it easy to read and visually structured.
- Be concise but helpful."#,
        tour_context(tours)
    )
}
