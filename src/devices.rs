use crate::types::{Device, DeviceKind};
use failure::Error;
use futures::future::{BoxFuture, FutureExt};
use futures::StreamExt;
use log::debug;
use std::path::PathBuf;
use tokio::fs;

pub trait DeviceEnumerator: Send + Sync {
    fn enumerate(&self) -> BoxFuture<'_, Result<Vec<Device>, Error>>;
}

/// Enumerates V4L device nodes (`video*` under the dev directory), pulling
/// display labels from the matching sysfs `name` entries.
pub struct DevNodeEnumerator {
    dev_dir: PathBuf,
    sys_dir: PathBuf,
}

impl DevNodeEnumerator {
    pub fn new(dev_dir: impl Into<PathBuf>, sys_dir: impl Into<PathBuf>) -> DevNodeEnumerator {
        DevNodeEnumerator {
            dev_dir: dev_dir.into(),
            sys_dir: sys_dir.into(),
        }
    }
}

impl Default for DevNodeEnumerator {
    fn default() -> DevNodeEnumerator {
        DevNodeEnumerator::new("/dev", "/sys/class/video4linux")
    }
}

impl DeviceEnumerator for DevNodeEnumerator {
    fn enumerate(&self) -> BoxFuture<'_, Result<Vec<Device>, Error>> {
        async move {
            let mut names: Vec<String> = vec![];
            let mut entries = fs::read_dir(&self.dev_dir).await?;
            while let Some(entry) = entries.next().await {
                let name = entry?.file_name().to_string_lossy().into_owned();
                if name.starts_with("video") {
                    names.push(name);
                }
            }
            // read_dir order is arbitrary; sort for a stable default device
            names.sort();
            let mut devices = Vec::with_capacity(names.len());
            for name in names {
                let label = match fs::read_to_string(self.sys_dir.join(&name).join("name")).await
                {
                    Ok(s) => s.trim().to_string(),
                    Err(_) => String::new(),
                };
                devices.push(Device {
                    id: self.dev_dir.join(&name).to_string_lossy().into_owned(),
                    label,
                    kind: DeviceKind::VideoInput,
                });
            }
            debug!("Enumerated {} video devices", devices.len());
            Ok(devices)
        }
        .boxed()
    }
}
