use crate::config::{ConfigError, WorldConfig};
use crate::sprite::Silhouettes;

/// Validated constants of a run together with the collision shapes built
/// from them. Shared read-only by every generation.
#[derive(Debug, Clone)]
pub struct World {
    pub config: WorldConfig,
    pub sprites: Silhouettes,
}

impl World {
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let sprites = Silhouettes::new(&config);
        Ok(Self { config, sprites })
    }
}
