// Purpose: Voice management, polyphony, note and parameter events
// This layer sits above the buffers and runs one inner module per voice

pub mod expander;
pub mod message;
pub mod module;
pub mod sine;
pub mod voice;
