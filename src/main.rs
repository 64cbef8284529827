mod controller;
mod devices;
mod recognize;
mod source;
mod types;

use crate::controller::Controller;
use crate::devices::DevNodeEnumerator;
use crate::recognize::Recognizer;
use crate::types::Status;
use env_logger::Env;
use failure::Error;
use log::{error, info, warn};
use std::env;
use std::path::Path;
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

#[macro_use]
extern crate failure;

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("Starting plate-snap");
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Error> {
    let endpoint = env::var("RECOGNIZER_URL").unwrap_or_else(|_| "http://localhost:8080/".to_string());
    let endpoint =
        Url::parse(&endpoint).map_err(|e| format_err!("Invalid RECOGNIZER_URL: {}", e))?;
    let controller = Controller::new(
        Arc::new(DevNodeEnumerator::default()),
        Recognizer::new(endpoint),
    );

    if let Err(e) = controller.initialize().await {
        warn!("Device enumeration failed: {}", e);
    }

    let args: Vec<String> = env::args().skip(1).collect();
    if args.iter().any(|a| a == "--devices") {
        let active = controller.active_device().await;
        for device in controller.devices().await {
            let marker = if Some(&device.id) == active.as_ref() { "*" } else { " " };
            let label = if device.label.is_empty() { "(no label)" } else { &device.label };
            println!("{} {} {}", marker, device.id, label);
        }
        return Ok(());
    }
    if args.is_empty() {
        return Err(format_err!(
            "Usage: plate-snap --devices | plate-snap <image>..."
        ));
    }

    for arg in &args {
        controller.upload_from_file(Path::new(arg)).await?;
        match controller.status().await {
            Status::Ready => {
                let result = controller.result().await.unwrap_or_default();
                if result.plates.is_empty() {
                    println!("{}: no plates recognized", arg);
                }
                for hit in &result.plates {
                    println!("{}: {}", arg, hit.number);
                    if let Some(crop) = &hit.crop {
                        save_crop(&hit.number, crop).await;
                    }
                }
            }
            Status::Failed(msg) => println!("{}: recognition failed: {}", arg, msg),
            _ => {}
        }
    }
    Ok(())
}

async fn save_crop(number: &str, crop: &[u8]) {
    let dir = match env::var("CROPS_DIR") {
        Ok(dir) => dir,
        Err(_) => return,
    };
    let name = format!("{:x}.jpeg", Uuid::new_v4().to_simple());
    let path = Path::new(&dir).join(&name);
    match tokio::fs::write(&path, crop).await {
        Ok(_) => info!("Saved crop for plate {} to {:?}", number, path),
        Err(e) => warn!("Error saving crop to {:?}: {:?}", path, e),
    }
}
