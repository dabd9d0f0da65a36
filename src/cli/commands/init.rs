//! Initialize command.

use console::style;

use crate::config::Settings;

/// Initialize the data directory, image folders and database.
pub async fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    settings.ensure_directories()?;

    let ctx = settings.create_db_context();
    ctx.init_schema().await?;

    let library = settings.image_library();
    println!(
        "  {} Image folders: {}, {}",
        style("✓").green(),
        library.unprocessed_dir().display(),
        library.processed_dir().display()
    );

    let images = ctx.images().count().await?;
    let categories = ctx.categories().get_all().await?.len();
    println!(
        "  {} Database: {} ({} images, {} categories)",
        style("✓").green(),
        ctx.pool().database_url(),
        images,
        categories
    );

    println!(
        "{} Initialized tagallery in {}",
        style("✓").green(),
        settings.data_dir.display()
    );

    Ok(())
}
