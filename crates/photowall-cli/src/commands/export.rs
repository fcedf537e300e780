use anyhow::{anyhow, Result};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use photowall_core::{load_photos, markup, Viewport, Wall, WallOptions, WallWidth};

use crate::ExportArgs;

pub fn run(args: ExportArgs) -> Result<()> {
    let photos = load_photos(&args.photos)?;
    if photos.is_empty() {
        return Err(anyhow!("photo list is empty"));
    }
    let count = photos.len();

    let options = WallOptions {
        width: Some(WallWidth::Px(args.width)),
        height: Some(args.height),
        direction: args.direction,
        // the snapshot carries every image, there is nothing to defer
        lazy_load: Some(false),
        data: Some(photos),
        ..Default::default()
    };

    let rng = match args.seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_os_rng(),
    };

    let wall = Wall::new(
        options.resolve(),
        Viewport::new(args.width, args.height),
        rng,
    );

    let html = markup::render_markup(&wall);
    std::fs::write(&args.output, html)?;

    println!(
        "Wrote {} ({} lanes, {} photos)",
        args.output.display(),
        wall.lane_count(),
        count
    );

    Ok(())
}
