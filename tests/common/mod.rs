//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use pet_master::commands::{NoPetCommands, PetCommand, PetCommands};
use pet_master::listeners::Player;
use pet_master::{LifecycleOptions, PetMaster, PluginConfig};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A data directory with `config.toml` set to `settings`.
pub fn data_dir(settings: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("config.toml"), settings).unwrap();
    dir
}

pub fn write(dir: &Path, file: &str, content: &str) {
    fs::write(dir.join(file), content).unwrap();
}

pub fn read(dir: &Path, file: &str) -> String {
    fs::read_to_string(dir.join(file)).unwrap()
}

/// Number of `<file>.*.bak` files in `dir`.
pub fn backups(dir: &Path, file: &str) -> usize {
    let prefix = format!("{file}.");
    fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(&prefix) && name.ends_with(".bak"))
        .count()
}

/// A plugin over `dir` with no async runtime and no pet command handler.
pub fn plugin(dir: &Path) -> PetMaster {
    PetMaster::new(LifecycleOptions::new(dir), None, Box::new(NoPetCommands))
}

/// Records every pet command it receives.
#[derive(Clone, Default)]
pub struct RecordingCommands {
    pub calls: Arc<Mutex<Vec<(PetCommand, String, Vec<String>)>>>,
}

impl PetCommands for RecordingCommands {
    fn execute(&mut self, command: PetCommand, player: &Player, args: &[&str], _config: &PluginConfig) -> Vec<String> {
        self.calls.lock().unwrap().push((
            command,
            player.name.clone(),
            args.iter().map(|arg| arg.to_string()).collect(),
        ));
        vec![format!("{command} done")]
    }
}

/// Start a mock HTTP server answering every request with `body`.
pub async fn start_mock_backend(body: String) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let body = body.clone();
            tokio::spawn(async move {
                let mut request = [0u8; 4096];
                let _ = socket.read(&mut request).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// A minimal project descriptor declaring `version`.
pub fn descriptor(version: &str) -> String {
    format!(
        "<project>\n  <parent>\n    <version>1.0.0</version>\n  </parent>\n  <artifactId>PetMaster</artifactId>\n  <version>{version}</version>\n</project>\n"
    )
}
