//! Print a store snapshot as a tree, optionally filtered by a viewer config.
//!
//! Run with: cargo run -p arbor --example browse -- [snapshot.json] [viewer.toml]
//!
//! Without a snapshot a small demo acquisition is used. Set `RUST_LOG=arbor=debug`
//! to see pattern compilation and model edits.

use arbor::model::{HierarchyModel, ItemModel, ModelIndex};
use arbor::store::{AttrValue, HierarchyPath, HierarchyStore, MemoryStore};
use arbor::ViewerConfig;
use tracing_subscriber::EnvFilter;

fn demo_store() -> arbor::Result<MemoryStore> {
    let mut store = MemoryStore::new();
    for sweep in 0..2 {
        for channel in 0..3 {
            for trace in 0..2 {
                let path: HierarchyPath =
                    format!("run.0/sweep.{sweep}/channel.{channel}/trace.{trace}/ydata").parse()?;
                store.require_leaf(&path, vec![1000], "float64")?;
            }
        }
    }
    let run: HierarchyPath = "run.0".parse()?;
    store.set_attr(&run, "operator", AttrValue::from("jd"))?;
    store.set_attr(&run, "gains", AttrValue::from(vec![1.0, 2.5, 10.0]))?;
    Ok(store)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let store = match args.next() {
        Some(snapshot) => MemoryStore::load_json(snapshot)?,
        None => demo_store()?,
    };
    let config = match args.next() {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig {
            pattern: Some("run[0]/sweep[:]/channel[1:]/...".into()),
            include_attrs: true,
            ..Default::default()
        },
    };

    let model = HierarchyModel::new(store, config.build_options(HierarchyPath::root()))?;
    println!("{}", model.dump(&config.dump));

    // Rename the first top-level row and show the store follows.
    let first = model.index(0, 0, &ModelIndex::invalid());
    if let Some(path) = model.item_path(&first) {
        let renamed = format!("{}_renamed", path.name().unwrap_or("root"));
        if model.set_key(&first, &renamed) {
            let moved = model.item_path(&first);
            let exists = moved
                .as_ref()
                .is_some_and(|p| model.with_store(|store| store.exists(p)));
            println!("renamed {path} -> {} (in store: {exists})", moved.map(|p| p.to_string()).unwrap_or_default());
        }
    }

    Ok(())
}
