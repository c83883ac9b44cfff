use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{apply_set_string, jar_to_wire, WireChannel};

/// Serializable on-disk form of the jar.
#[derive(Debug, Default, Serialize, Deserialize)]
struct JarFile {
    cookies: Vec<(String, String)>,
}

/// A wire channel host that persists its jar to a JSON file on every
/// write. Useful for embedders that want cookies to survive restarts;
/// the store itself neither knows nor cares.
pub struct JsonWireChannel {
    path: PathBuf,
    jar: RwLock<Vec<(String, String)>>,
}

impl JsonWireChannel {
    pub fn open(path: PathBuf) -> Result<Self> {
        let jar = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            // A corrupt file starts the jar over instead of poisoning the host.
            serde_json::from_str::<JarFile>(&contents)
                .unwrap_or_default()
                .cookies
        } else {
            fs::write(&path, serde_json::to_vec(&JarFile::default())?)?;
            Vec::new()
        };

        Ok(Self {
            path,
            jar: RwLock::new(jar),
        })
    }

    fn persist(&self, jar: &[(String, String)]) -> Result<()> {
        let file = JarFile {
            cookies: jar.to_vec(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }
}

impl WireChannel for JsonWireChannel {
    fn read(&self) -> Result<String> {
        let jar = self.jar.read().unwrap();
        Ok(jar_to_wire(&jar))
    }

    fn write(&self, set_str: &str) -> Result<()> {
        let mut jar = self.jar.write().unwrap();
        apply_set_string(&mut jar, set_str);
        self.persist(&jar)
    }
}
