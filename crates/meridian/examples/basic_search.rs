//! Basic query classification and resolution
//!
//! This example demonstrates the fundamental operations:
//! - Classifying free-text input into query variants
//! - Resolving queries against the live gazetteer services
//! - Working with the uniform result model

use meridian::{GeoSearcher, SearchConfig, SearchHit};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let searcher = GeoSearcher::new(SearchConfig::default());
    searcher.init().await?;

    // Classification is pure; nothing is looked up yet
    for text in ["064D06", "L5L 2R7", "45.4, -75.7", "Milton"] {
        let query = searcher.classify(text);
        println!(
            "'{}' -> {} query ('{}')",
            text,
            query.origin(),
            query.normalized()
        );
    }

    // A grid reference resolves to its single authoritative sheet
    println!("\nResolving '064D06':");
    let hits = searcher.search_once("064D06").await?;
    print_hits(&hits, 3);

    // A place name resolves to ranked candidates
    println!("\nResolving 'Milton':");
    let hits = searcher.search_once("Milton").await?;
    print_hits(&hits, 5);

    // Incomplete input is rejected before any network call
    println!("\nResolving '064D' (partial reference):");
    match searcher.search_once("064D").await {
        Err(err) => println!("  rejected: {err}"),
        Ok(_) => unreachable!("partial references never resolve"),
    }

    Ok(())
}

fn print_hits(hits: &[SearchHit], limit: usize) {
    for (i, hit) in hits.iter().take(limit).enumerate() {
        println!(
            "  {}. {} ({}) @ {}{}",
            i + 1,
            hit.name,
            hit.type_name.as_deref().unwrap_or("-"),
            hit.point,
            hit.province
                .as_deref()
                .map(|p| format!(", {p}"))
                .unwrap_or_default()
        );
    }

    if hits.len() > limit {
        println!("  ... and {} more results", hits.len() - limit);
    }
}
