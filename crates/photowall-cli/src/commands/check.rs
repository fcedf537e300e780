use std::path::Path;

use anyhow::Result;

use photowall_core::load_photos;

pub fn run(file: &Path) -> Result<()> {
    let photos = load_photos(file)?;

    if photos.is_empty() {
        println!("{}: valid, but contains no photos", file.display());
        return Ok(());
    }

    let mut missing_img = 0;
    let mut missing_title = 0;
    let mut local_missing = Vec::new();

    for photo in &photos {
        if photo.img.is_empty() {
            missing_img += 1;
        } else if !photo.img.starts_with("http://") && !photo.img.starts_with("https://") {
            let path = Path::new(&photo.img);
            if !path.exists() {
                local_missing.push(photo.img.clone());
            }
        }
        if photo.title.is_empty() {
            missing_title += 1;
        }
    }

    println!("{}: {} photos", file.display(), photos.len());
    if missing_img > 0 {
        println!("  {} without an image (placeholder only)", missing_img);
    }
    if missing_title > 0 {
        println!("  {} without a title", missing_title);
    }
    for path in &local_missing {
        println!("  missing local file: {}", path);
    }

    Ok(())
}
