use std::sync::Arc;

use anyhow::Result;
use clap::Parser as ClapParser;

use catalog_search::config::CatalogConfig;
use catalog_search::docstore::InMemoryDocStore;
use catalog_search::document::Document;
use catalog_search::embedder::HashingEmbedder;
use catalog_search::engine::CatalogEngine;

mod cli;

use cli::Args;

fn demo_catalog() -> Vec<Document> {
    vec![
        Document::new("cement-opc-43").with_text("OPC cement 43 grade", "binders", "ordinary portland cement, 50kg bag"),
        Document::new("cement-white").with_text("white cement powder", "binders", "fine white cement for finishing work"),
        Document::new("steel-tmt-12mm").with_text("TMT steel bars 12mm", "metal", "fe500 grade, corrosion resistant"),
        Document::new("steel-tmt-8mm").with_text("TMT steel bars 8mm", "metal", "fe500 grade, for slab reinforcement"),
        Document::new("brick-red-clay").with_text("red clay bricks", "masonry", "standard size fired clay bricks"),
        Document::new("sand-river").with_text("river sand", "aggregates", "washed river sand for plastering"),
        Document::new("tile-ceramic-floor").with_text("ceramic floor tiles", "finishing", "glazed ceramic tiles, 600x600mm"),
        Document::new("paint-exterior").with_text("exterior emulsion paint", "finishing", "weatherproof acrylic emulsion"),
    ]
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = CatalogConfig::load()?;

    let store = Arc::new(InMemoryDocStore::seed(demo_catalog()));
    let embedder = Arc::new(HashingEmbedder::new(config.embedding_dim));
    let engine = CatalogEngine::bootstrap(config.embedding_dim, store, embedder).await?;

    let response = engine
        .search(&args.query, args.top_k, args.min_score, args.w_sem, args.w_kw)
        .await?;

    if response.results.is_empty() {
        println!("No results found for \"{}\".", response.query);
    } else {
        println!("Results for \"{}\" ({} total):\n", response.query, response.total);
        for (i, hit) in response.results.iter().enumerate() {
            println!(
                "{:>2}. {:<24} combined={:.4}  semantic={:.4}  keyword={:.4}  {}",
                i + 1,
                hit.doc_id,
                hit.combined_score,
                hit.semantic_score,
                hit.keyword_score,
                hit.document.title,
            );
        }
    }

    let health = engine.health();
    println!(
        "\nhealth: status={} materials_loaded={} model={}",
        health.status, health.materials_loaded, health.model_name
    );

    Ok(())
}
