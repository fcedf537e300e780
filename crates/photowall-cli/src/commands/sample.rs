use std::path::Path;

use anyhow::{anyhow, Result};

const SAMPLE: &str = r#"# Photo list for photowall.
# Each [[photos]] entry is one item; img can be an http(s) URL or a
# local file path. All fields are optional.

[[photos]]
title = "Golden Gate"
subtitle = "San Francisco, CA"
url = "https://example.com/golden-gate"
img = "https://picsum.photos/id/1011/400/600"

[[photos]]
title = "Forest Path"
subtitle = "Olympic National Park"
img = "https://picsum.photos/id/1018/400/600"

[[photos]]
title = "Night Market"
img = "https://picsum.photos/id/1035/400/600"

[[photos]]
title = "Harbor"
subtitle = "Morning fog"
img = "https://picsum.photos/id/1040/400/600"
"#;

pub fn run(output: &Path) -> Result<()> {
    if output.exists() {
        return Err(anyhow!("{} already exists", output.display()));
    }
    std::fs::write(output, SAMPLE)?;

    println!("Wrote {}", output.display());
    println!("\nTo start the wall, run:");
    println!("  photowall run -f {}", output.display());

    Ok(())
}
