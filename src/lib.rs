//! Realtime-safe polyphonic voice pool.
//!
//! A [`VoiceExpander`](synth::expander::VoiceExpander) clones one inner
//! [`Module`](synth::module::Module) into a fixed set of voices, routes note
//! and parameter events to them, and mixes their blocks into one output
//! buffer. Everything is allocated up front; processing and event dispatch
//! never touch the heap.

pub mod buffer; // Interleaved block buffers and the host bridge
pub mod config;
pub mod error;
pub mod list; // Intrusive lists over index arenas
pub mod params; // Per-voice parameter values and modulation
pub mod synth; // Voices, the pool and event types

pub use buffer::AudioBuffer;
pub use config::ExpanderConfig;
pub use error::{Error, ModuleError, Result};
pub use synth::{
    expander::VoiceExpander,
    module::{BlockCtx, Module, ProcessCtx, ProcessStatus},
};

/// Largest block a pool can be configured for.
pub const MAX_BLOCK_SIZE: usize = 2048;
pub const DEFAULT_VOICE_COUNT: usize = 8;
