//! Catalog command - show which pages hold which figures and tables.

use clap::Args;
use console::style;

use super::load_config;

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    /// Print the catalog as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: CatalogArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let catalog = load_config(config_path)?.catalog;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    println!("{}", style("index  page  contents").bold());
    for page in catalog.render_pages() {
        let figures = catalog.figures_on(page);
        let mut contents = Vec::new();
        if !figures.is_empty() {
            let numbers: Vec<String> = figures.iter().map(u32::to_string).collect();
            contents.push(format!("figures {}", numbers.join(", ")));
        }
        if catalog.is_table_page(page) {
            contents.push("table".to_string());
        }
        println!("{:>5}  {:>4}  {}", page, page + 1, contents.join("; "));
    }

    println!();
    println!(
        "{} figures on {} pages, {} table pages",
        catalog.figure_count(),
        catalog.figures.len(),
        catalog.tables.len()
    );

    Ok(())
}
