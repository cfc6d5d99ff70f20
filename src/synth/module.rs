use crate::{
    buffer::AudioBuffer,
    error::ModuleError,
    params::VoiceParams,
    synth::message::{NoteEvent, NoteExpressionEvent},
};

/// Outcome of one processing block.
///
/// Variants are ordered by liveness so merging is a `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProcessStatus {
    /// Silent and finished; the voice may be put to sleep.
    Sleep,
    /// Still ringing out after the note ended.
    Tail,
    /// Producing meaningful output.
    Continue,
}

impl ProcessStatus {
    /// Combine two statuses: the livelier one wins.
    ///
    /// `Sleep` only survives when both sides sleep.
    #[inline]
    pub fn merge(self, other: ProcessStatus) -> ProcessStatus {
        self.max(other)
    }
}

/// Per-block information shared by every voice.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BlockCtx {
    /// Frames processed since activation, at the start of this block.
    pub steady_time: u64,
}

/// Context handed to an inner module for one voice and one block.
pub struct ProcessCtx<'a> {
    pub sample_rate: f64,
    pub steady_time: u64,
    pub voice_index: usize,
    pub params: VoiceParams<'a>,
}

/// Inner signal-processing unit run by each voice.
///
/// A module renders into the voice's own buffer and never sees the pool.
pub trait Module: Send {
    fn activate(&mut self, _sample_rate: f64, _max_frame_count: usize) -> Result<(), ModuleError> {
        Ok(())
    }

    fn deactivate(&mut self) {}

    /// Render `num_frames` frames into `out`.
    fn process(
        &mut self,
        ctx: &ProcessCtx<'_>,
        out: &mut AudioBuffer<f32>,
        num_frames: usize,
    ) -> ProcessStatus;

    fn note_on(&mut self, _note: &NoteEvent) {}

    fn note_off(&mut self, _note: &NoteEvent) {}

    /// Stop immediately, without a release tail.
    fn note_choke(&mut self, _note: &NoteEvent) {}

    fn note_expression(&mut self, _expression: &NoteExpressionEvent) {}
}
