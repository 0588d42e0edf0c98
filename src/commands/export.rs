//! Export command - spreadsheets for managers.

use super::manager;
use crate::cli::args::{ExportArgs, ExportDocument};
use crate::errors::AppResult;
use crate::services::ServiceContainer;

/// Execute the export command
pub async fn execute(args: ExportArgs, services: &dyn ServiceContainer) -> AppResult<()> {
    manager(services).await?;
    let exports = services.exports();

    let path = match args.document {
        ExportDocument::Products => exports.export_products(args.out).await?,
        ExportDocument::Orders => exports.export_orders(args.out).await?,
        ExportDocument::Stats => exports.export_stats(args.out).await?,
    };

    println!("Wrote {}", path.display());
    Ok(())
}
