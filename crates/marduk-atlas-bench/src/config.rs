use anyhow::{Context, Result};

/// Bench parameters, read from `MARDUK_ATLAS_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    /// Number of simulated frames (`MARDUK_ATLAS_FRAMES`).
    pub frames: usize,
    /// RNG seed for the mutation stream (`MARDUK_ATLAS_SEED`).
    pub seed: u64,
    /// Initial quad capacity (`MARDUK_ATLAS_CAPACITY`).
    pub capacity: usize,
    /// Render the final frame offscreen (`MARDUK_ATLAS_GPU`, "0"/"false" disables).
    pub gpu: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            frames: 240,
            seed: 0x5EED,
            capacity: marduk_atlas::DEFAULT_CAPACITY,
            gpu: true,
        }
    }
}

impl BenchConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("MARDUK_ATLAS_FRAMES") {
            config.frames = v.trim().parse().with_context(|| format!("MARDUK_ATLAS_FRAMES={v:?}"))?;
        }
        if let Some(v) = lookup("MARDUK_ATLAS_SEED") {
            config.seed = v.trim().parse().with_context(|| format!("MARDUK_ATLAS_SEED={v:?}"))?;
        }
        if let Some(v) = lookup("MARDUK_ATLAS_CAPACITY") {
            config.capacity = v
                .trim()
                .parse()
                .with_context(|| format!("MARDUK_ATLAS_CAPACITY={v:?}"))?;
        }
        if let Some(v) = lookup("MARDUK_ATLAS_GPU") {
            config.gpu = !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "off" | "no");
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |key| pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| v.to_string())
    }

    #[test]
    fn defaults_when_unset() {
        let c = BenchConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(c, BenchConfig::default());
        assert_eq!(c.capacity, 29);
    }

    #[test]
    fn reads_overrides() {
        let c = BenchConfig::from_lookup(lookup(&[
            ("MARDUK_ATLAS_FRAMES", "10"),
            ("MARDUK_ATLAS_SEED", " 7 "),
            ("MARDUK_ATLAS_CAPACITY", "0"),
            ("MARDUK_ATLAS_GPU", "off"),
        ]))
        .unwrap();
        assert_eq!(c.frames, 10);
        assert_eq!(c.seed, 7);
        assert_eq!(c.capacity, 0);
        assert!(!c.gpu);
    }

    #[test]
    fn rejects_garbage() {
        let err = BenchConfig::from_lookup(lookup(&[("MARDUK_ATLAS_FRAMES", "lots")])).unwrap_err();
        assert!(format!("{err:#}").contains("MARDUK_ATLAS_FRAMES"));
    }
}
