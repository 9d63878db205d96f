//! Walk through a result set the way the explore panel does, printing the
//! map effects instead of drawing them, then print the shareable link.

use geoscout::{
    BoundingBox, FeatureCollection, MapExplorer, MapSurface, SceneDataset, error::GeoscoutError,
};

/// Prints every effect the explorer pushes at it.
struct ConsoleMap;

impl MapSurface for ConsoleMap {
    fn fit_bounds(&mut self, bounds: BoundingBox) {
        println!(
            "[map] fit ({}, {}) .. ({}, {})",
            bounds.min_lon, bounds.min_lat, bounds.max_lon, bounds.max_lat
        );
    }
    fn show_features(&mut self, features: &FeatureCollection) {
        println!("[map] overlay with {} polygons", features.len());
    }
    fn highlight(&mut self, bounds: BoundingBox) {
        println!(
            "[map] highlight ({}, {}) .. ({}, {})",
            bounds.min_lon, bounds.min_lat, bounds.max_lon, bounds.max_lat
        );
    }
    fn clear_highlight(&mut self) {
        println!("[map] highlight cleared");
    }
}

fn main() -> Result<(), GeoscoutError> {
    geoscout::init_logging(tracing::Level::WARN)?;

    let dataset = SceneDataset::from_json_str(
        r#"[
            {"description_from_model": "a blue bridge over a river", "bbox": "(85.5100,27.6200,85.5150,27.6250)"},
            {"description_from_model": "a river bend with trees", "bbox": "(85.5300,27.6400,85.5350,27.6450)"},
            {"description_from_model": "a red house", "bbox": "(85.5200,27.6300,85.5250,27.6350)"}
        ]"#,
    )?;

    let mut explorer = MapExplorer::new(dataset);
    let mut map = ConsoleMap;

    let summary = explorer.search_and_render("river", &mut map)?;
    println!("{} results found", summary.matched);

    if let Some(item) = explorer.start_exploration(&mut map) {
        println!("> {}", item.record.description_from_model);
    }
    while explorer.cursor().has_next() {
        if let Some(item) = explorer.navigate_next(&mut map) {
            println!("> {}", item.record.description_from_model);
        }
    }
    explorer.close_exploration(&mut map);

    let link = explorer
        .view_state(Some(geoscout::DEFAULT_VIEWPORT))
        .to_query_string();
    println!("share this session: ?{link}");
    Ok(())
}
