use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evolve::Genome;

#[derive(Debug, Error)]
pub enum ChampionError {
    #[error("champion file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode champion: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("failed to decode champion: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

/// Best genome seen so far and where it came from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Champion {
    pub genome: Genome,
    pub fitness: f32,
    pub generation: u32,
}

impl Champion {
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ChampionError> {
        let path = path.as_ref();
        let bytes = bincode::serde::encode_to_vec(self, bincode::config::standard())?;
        fs::write(path, bytes)?;
        log::info!(
            "saved champion from generation {} (fitness {:.1}) to {}",
            self.generation,
            self.fitness,
            path.display()
        );
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ChampionError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let (champion, _): (Champion, usize) =
            bincode::serde::decode_from_slice(&bytes, bincode::config::standard())?;
        log::info!("loaded champion from {}", path.display());
        Ok(champion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("flappy-{}-{name}", std::process::id()))
    }

    #[test]
    fn save_then_load_restores_champion() {
        let path = scratch("champion.bin");
        let champion = Champion {
            genome: Genome { weights: [0.25, -1.5, 3.0], bias: -0.125 },
            fitness: 42.5,
            generation: 7,
        };
        champion.save(&path).unwrap();
        let loaded = Champion::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, champion);
    }

    #[test]
    fn truncated_file_is_a_decode_error() {
        let path = scratch("truncated.bin");
        fs::write(&path, [1u8, 2]).unwrap();
        let err = Champion::load(&path).unwrap_err();
        let _ = fs::remove_file(&path);
        assert!(matches!(err, ChampionError::Decode(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Champion::load(scratch("absent.bin")).unwrap_err();
        assert!(matches!(err, ChampionError::Io(_)));
    }
}
