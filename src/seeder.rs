use crate::db::models::{GeoPoint, Post};
use crate::db::repository::PostRepository;

/// Sample posts around Thiruvananthapuram: (longitude, latitude, brief, detail).
const DEMO_POSTS: &[(f64, f64, &str, &str)] = &[
    (
        76.94556,
        8.48278,
        "Sree Padmanabhaswamy Temple",
        "A Hindu temple in the East Fort area. It is known for its Dravidian architecture.",
    ),
    (
        76.95498,
        8.50891,
        "Napier Museum",
        "An art and natural history museum built in the 19th century. The building has a distinctive Indo-Saracenic roof.",
    ),
    (
        76.97862,
        8.40028,
        "Kovalam Lighthouse",
        "A lighthouse on the Kurumkal hillock. Visitors can climb to the top for a view of the beaches.",
    ),
    (
        76.89805,
        8.51568,
        "Shanghumukham Beach",
        "A beach near the airport. It is popular for evening walks and the mermaid sculpture.",
    ),
];

/// Insert the sample posts that are not already present.
///
/// Returns the number of posts inserted. Failures are logged and skipped.
pub async fn seed_demo_posts(repo: &dyn PostRepository) -> usize {
    tracing::info!("Starting demo data seeding...");

    let mut inserted = 0;
    for (longitude, latitude, brief, detail) in DEMO_POSTS {
        match repo.find_by_brief(brief).await {
            Ok(Some(_)) => {
                tracing::info!("Post '{}' already exists, skipping.", brief);
                continue;
            }
            Err(e) => {
                tracing::error!("Failed to check for existing post '{}': {}", brief, e);
                continue;
            }
            Ok(None) => {}
        }

        let post = Post {
            id: None,
            location: GeoPoint::new(*longitude, *latitude),
            description_brief: brief.to_string(),
            description_detail: detail.to_string(),
        };

        match repo.insert(post).await {
            Ok(_) => {
                tracing::info!("Inserted demo post '{}'.", brief);
                inserted += 1;
            }
            Err(e) => tracing::error!("Failed to insert demo post '{}': {}", brief, e),
        }
    }

    tracing::info!(inserted, "Demo data seeding completed.");
    inserted
}
