// ABOUTME: List command implementation.
// ABOUTME: Shows known images and transfers that are still running.

use machine_image::error::Result;
use machine_image::output::{Output, OutputMode};
use machine_image::service::{FullService, ImageInfo, TransferInfo};
use serde::Serialize;

#[derive(Serialize)]
struct Listing<'a> {
    images: &'a [ImageInfo],
    transfers: &'a [TransferInfo],
}

pub async fn list<S: FullService + ?Sized>(service: &S, output: &Output) -> Result<()> {
    let mut images = service.list_images().await?;
    images.sort_by(|a, b| a.name.cmp(&b.name));
    let transfers = service.list_transfers().await?;

    if output.mode() == OutputMode::Json {
        let listing = Listing {
            images: &images,
            transfers: &transfers,
        };
        println!("{}", serde_json::to_string(&listing)?);
        return Ok(());
    }

    println!("{:<32} {:<10} {:<4} {:>12}", "NAME", "TYPE", "RO", "USAGE");
    for image in &images {
        println!(
            "{:<32} {:<10} {:<4} {:>12}",
            image.name,
            image.kind,
            if image.read_only { "yes" } else { "no" },
            image
                .usage
                .map(|bytes| bytes.to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }

    if !transfers.is_empty() {
        println!();
        println!("{:<6} {:<12} {:<24} {:>8}", "ID", "TYPE", "IMAGE", "PROGRESS");
        for transfer in &transfers {
            println!(
                "{:<6} {:<12} {:<24} {:>7.0}%",
                transfer.id.to_string(),
                transfer.kind,
                transfer.image_name,
                transfer.progress * 100.0
            );
        }
    }

    Ok(())
}
