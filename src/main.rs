use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::{info, warn};

use crate::importer::SceneImporter;
use crate::settings::CliArgs;
use crate::viewer::SceneViewer;

mod importer;
mod settings;
mod viewer;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = CliArgs::parse();
    log::trace!("Starting with args: {:?}", args);

    let Some(dir) = args.dir.clone() else {
        warn!("Nothing to import, pass --dir <World_Scene> or set FSCENE_DIR");
        return Ok(());
    };

    if !dir.is_dir() {
        warn!("{} is not a directory, the import will come back empty", dir.display());
    }

    let importer = Arc::new(SceneImporter::new());
    let mut viewer = SceneViewer::new(importer.clone(), args.scale, args.lod);

    let Some(worker) = importer.request_import(dir) else {
        anyhow::bail!("The import could not be started");
    };

    viewer.run(Duration::from_millis(args.poll_interval_ms));
    worker
        .join()
        .map_err(|_| anyhow::anyhow!("The importer thread panicked"))?;

    info!("Done");
    Ok(())
}
