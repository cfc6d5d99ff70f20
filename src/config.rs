use crate::{
    error::{Error, Result},
    DEFAULT_VOICE_COUNT, MAX_BLOCK_SIZE,
};

/// Shape of a voice pool, fixed for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpanderConfig {
    /// Number of voices, prototype included.
    pub voice_count: usize,
    /// Channels in every voice buffer and in the pooled output.
    pub channel_count: usize,
    /// Frames per processing block.
    pub block_size: usize,
    /// Parameters that can carry per-voice values and modulation.
    pub param_count: usize,
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        Self {
            voice_count: DEFAULT_VOICE_COUNT,
            channel_count: 2,
            block_size: MAX_BLOCK_SIZE,
            param_count: 0,
        }
    }
}

impl ExpanderConfig {
    pub fn with_voices(mut self, voice_count: usize) -> Self {
        self.voice_count = voice_count;
        self
    }

    pub fn with_channels(mut self, channel_count: usize) -> Self {
        self.channel_count = channel_count;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_params(mut self, param_count: usize) -> Self {
        self.param_count = param_count;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.voice_count == 0 {
            return Err(Error::InvalidConfig("voice_count must be at least 1"));
        }
        if self.channel_count == 0 {
            return Err(Error::InvalidConfig("channel_count must be at least 1"));
        }
        if self.voice_count.checked_mul(self.param_count).is_none() {
            return Err(Error::InvalidConfig("voice_count * param_count overflows the record index"));
        }
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(Error::InvalidConfig("block_size must be within 1..=MAX_BLOCK_SIZE"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ExpanderConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.voice_count, DEFAULT_VOICE_COUNT);
    }

    #[test]
    fn rejects_empty_shapes() {
        let base = ExpanderConfig::default();
        assert!(base.with_voices(0).validate().is_err());
        assert!(base.with_channels(0).validate().is_err());
        assert!(base.with_block_size(0).validate().is_err());
        assert!(base.with_block_size(MAX_BLOCK_SIZE + 1).validate().is_err());
    }

    #[test]
    fn rejects_record_count_overflow() {
        let config = ExpanderConfig::default().with_voices(usize::MAX / 2).with_params(3);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        assert!(config.with_params(0).validate().is_ok());
    }
}
