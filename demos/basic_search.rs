//! Load a dataset and run a few queries from the command line.
//!
//! Usage: `cargo run --example basic_search -- <dataset.json> <query>...`

use geoscout::{MapExplorer, SceneDataset, error::GeoscoutError};

fn main() -> Result<(), GeoscoutError> {
    geoscout::init_logging(tracing::Level::INFO)?;

    let mut args = std::env::args().skip(1);
    let dataset = match args.next() {
        Some(path) => SceneDataset::from_json_file(path)?,
        None => sample_dataset()?,
    };
    let queries: Vec<String> = args.collect();
    let queries = if queries.is_empty() {
        vec!["river".to_owned(), "blue roof".to_owned()]
    } else {
        queries
    };

    let mut explorer = MapExplorer::new(dataset);
    for query in &queries {
        let summary = explorer.search(query)?;
        println!("\"{query}\" matched {} records", summary.matched);
        for scored in explorer.cursor().results() {
            println!(
                "  {:>6.2}  {}",
                scored.relevance, scored.record.description_from_model
            );
        }
        println!(
            "  geojson: {}",
            serde_json::to_string(&summary.features).map_err(anyhow::Error::from)?
        );
    }
    Ok(())
}

fn sample_dataset() -> Result<SceneDataset, GeoscoutError> {
    Ok(SceneDataset::from_json_str(
        r#"[
            {"description_from_model": "a blue bridge over a river", "bbox": "(85.5100,27.6200,85.5150,27.6250)"},
            {"description_from_model": "houses with blue roofs along the road", "bbox": "(85.5200,27.6300,85.5250,27.6350)"},
            {"description_from_model": "a river bend with trees", "bbox": "(85.5300,27.6400,85.5350,27.6450)"}
        ]"#,
    )?)
}
