use anyhow::Result;
use popsync::gauges::paths::CachePaths;
use popsync::gauges::ranking;
use popsync::gauges::store::ViewStore;

pub fn run(paths: &CachePaths, limit: Option<usize>) -> Result<()> {
    let store = ViewStore::new(paths);
    let totals = store.load_all()?;
    if totals.is_empty() {
        println!("no cached resources; run `popsync sync` first");
        return Ok(());
    }

    let pages: Vec<String> = totals.keys().cloned().collect();
    let ranked = ranking::rank(&store, pages)?;
    let shown = limit.unwrap_or(ranked.len());

    for path in ranked.iter().take(shown) {
        let views = totals.get(path).copied().unwrap_or(0);
        println!("{views:>8}  {path}");
    }
    Ok(())
}
