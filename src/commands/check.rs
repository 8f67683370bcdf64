//! Check the manifest against the pages directory

use anyhow::Result;

use crate::content::SiteContent;
use crate::Blog;

pub fn run(blog: &Blog) -> Result<()> {
    let content = SiteContent::new(blog);
    let report = content.check()?;

    println!(
        "Checked {} posts from {}",
        report.posts,
        content.manifest_path().display()
    );
    for file in &report.missing {
        println!("  missing:         {}", file);
    }
    for file in &report.unlisted {
        println!("  not in manifest: {}", file);
    }
    for file in &report.without_front_matter {
        println!("  no front-matter: {}", file);
    }
    for file in &report.unreadable {
        println!("  unreadable:      {}", file);
    }

    if !report.is_clean() {
        anyhow::bail!("{} problem(s) found", report.problems());
    }

    println!("Everything looks good.");
    Ok(())
}
