pub mod archive;
pub mod config;
pub mod download;
pub mod fetcher;
pub mod manifest;
pub mod presets;
pub mod progress;
pub mod transport;
pub mod verify;

#[cfg(test)]
pub(crate) mod testing;
