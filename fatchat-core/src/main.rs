use fatchat_core::{logging, Asset, AssetConfig, AssetKind, AssetLoader, ChatMessage};
use tracing::{error, info};

const USAGE: &str = "usage: fatchat-fetch <url-or-path> [--file]";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init();

    let mut args = std::env::args().skip(1);
    let Some(locator) = args.next() else {
        error!("{}", USAGE);
        std::process::exit(2);
    };
    let kind = if args.any(|arg| arg == "--file") {
        AssetKind::File
    } else {
        AssetKind::Photo
    };

    let loader = match AssetLoader::new(AssetConfig::from_env()) {
        Ok(loader) => loader,
        Err(e) => {
            error!("Failed to create asset loader: {}", e);
            std::process::exit(1);
        }
    };

    let mut message = ChatMessage::new(locator.clone(), "fatchat-fetch", kind);
    if let Err(e) = message.load_asset_from(&locator, &loader).await {
        error!(locator = %locator, error = %e, "Failed to load asset");
        std::process::exit(1);
    }

    match message.asset() {
        Some(Asset::Photo(photo)) => info!(
            width = photo.width(),
            height = photo.height(),
            format = ?photo.format(),
            "Loaded photo"
        ),
        Some(Asset::File(file)) => info!(
            name = %file.file_name(),
            size = file.len(),
            content_type = ?file.content_type(),
            "Loaded file"
        ),
        None => error!("Load reported success but no asset was stored"),
    }
}
