//! Search configuration and customization
//!
//! This example demonstrates how to customize search behavior using
//! different configurations for various use cases.

use meridian::{GeoSearcher, Language, SearchConfigBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Preset configurations
    let fast = SearchConfigBuilder::fast().build();
    println!("fast preset: up to {} candidates", fast.max_results);

    let comprehensive = SearchConfigBuilder::comprehensive().build();
    println!(
        "comprehensive preset: up to {} candidates",
        comprehensive.max_results
    );

    // A customized configuration: French services, city/town results first,
    // unincorporated areas excluded entirely
    let config = SearchConfigBuilder::new()
        .language(Language::French)
        .max_results(50)
        .sort_order(["CITY", "TOWN"])
        .exclude_types(["UNP"])
        .official_only(true)
        .build();

    let searcher = GeoSearcher::new(config);
    searcher.init().await?;

    // The type registry drives filter UIs; excluded codes are gone from the
    // valid view but still describable from the full dictionary
    let types = searcher.types().await?;
    println!(
        "\n{} valid types of {} total",
        types.valid_types().len(),
        types.all_types().len()
    );

    let hits = searcher.search_once("Trois-Rivières").await?;
    for hit in hits.iter().take(5) {
        println!(
            "  {} ({})",
            hit.name,
            hit.type_name.as_deref().unwrap_or("-")
        );
    }

    Ok(())
}
