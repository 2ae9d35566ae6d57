//! Interactive search session
//!
//! This example demonstrates the session coordinator: queries issued as a
//! user types, supersession of stale lookups, and local re-filtering of
//! resolved results.

use meridian::{GeoSearcher, SearchConfig, SessionState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let searcher = GeoSearcher::new(SearchConfig::default());
    let session = searcher.session().await?;
    let mut updates = session.subscribe();

    // Simulate a user typing: each keystroke supersedes the last lookup.
    // Only the final query's results are ever published.
    for text in ["Mil", "Milt", "Milton"] {
        session.search(text);
    }

    let snapshot = updates
        .wait_for(|s| s.state == SessionState::Resolved || s.state == SessionState::Errored)
        .await?
        .clone();

    println!(
        "query '{}' -> {} results",
        snapshot.query.as_deref().unwrap_or(""),
        snapshot.results.len()
    );
    for hit in snapshot.results.iter().take(5) {
        println!(
            "  {} ({}) @ {}",
            hit.name,
            hit.type_name.as_deref().unwrap_or("-"),
            hit.point
        );
    }

    // Narrow to Ontario (province code 35): a pure local transform over the
    // already-fetched results, no new lookup
    session.set_province(Some("35".to_string()));
    println!("\nwithin Ontario: {} results", session.results().len());

    // Clearing returns the session to Idle with no results
    session.clear();
    assert_eq!(session.state(), SessionState::Idle);

    Ok(())
}
