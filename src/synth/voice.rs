use crate::{
    buffer::AudioBuffer,
    error::{ModuleError, Result},
    list::{Hook, Linked, List},
    params::ModulationTable,
    synth::{
        message::{NoteEvent, NoteExpressionEvent},
        module::{BlockCtx, Module, ProcessCtx, ProcessStatus},
    },
};

/// One instance of an inner module plus the bookkeeping the pool needs.
///
/// Voice 0 is the prototype; every other voice is built from it with
/// [`Voice::duplicate`] and owns its own module state, output buffer and
/// parameter records.
pub struct Voice<M: Module> {
    index: usize,
    assigned: bool,
    key: i16,
    channel: i16,
    activated: bool,
    sample_rate: f64,
    state_hook: Hook, // sleeping or active list
    pending_reset: List,
    module: M,
    output: AudioBuffer<f32>,
}

impl<M: Module> Voice<M> {
    /// Build the prototype voice around `module`.
    pub fn new(module: M, channel_count: usize, frame_count: usize) -> Result<Self> {
        Ok(Self {
            index: 0,
            assigned: false,
            key: -1,
            channel: -1,
            activated: false,
            sample_rate: 0.0,
            state_hook: Hook::default(),
            pending_reset: ModulationTable::reset_list(),
            module,
            output: AudioBuffer::new(channel_count, frame_count, 0.0)?,
        })
    }

    /// Structural clone with its own module, buffer and identity.
    pub fn duplicate(&self, index: usize) -> Result<Self>
    where
        M: Clone,
    {
        Ok(Self {
            index,
            assigned: false,
            key: -1,
            channel: -1,
            activated: false,
            sample_rate: 0.0,
            state_hook: Hook::default(),
            pending_reset: ModulationTable::reset_list(),
            module: self.module.clone(),
            output: self.output.with_same_shape()?,
        })
    }

    /// Activate the inner module. Activating again at the same rate is a
    /// no-op; a different rate needs a `deactivate` first.
    pub fn activate(&mut self, sample_rate: f64, max_frame_count: usize) -> std::result::Result<(), ModuleError> {
        let max = self.output.frame_count();
        if max_frame_count > max {
            return Err(ModuleError::BlockTooLarge {
                requested: max_frame_count,
                max,
            });
        }

        if self.activated {
            return if sample_rate == self.sample_rate {
                Ok(())
            } else {
                Err(ModuleError::AlreadyActive(self.sample_rate))
            };
        }

        self.module.activate(sample_rate, max_frame_count)?;
        self.sample_rate = sample_rate;
        self.activated = true;
        Ok(())
    }

    pub fn deactivate(&mut self) {
        if !self.activated {
            return;
        }

        self.module.deactivate();
        self.activated = false;
    }

    /// Run the inner module for one block into this voice's buffer.
    pub fn process(&mut self, block: &BlockCtx, params: &ModulationTable, num_frames: usize) -> ProcessStatus {
        debug_assert!(self.assigned, "processing an unassigned voice");

        let ctx = ProcessCtx {
            sample_rate: self.sample_rate,
            steady_time: block.steady_time,
            voice_index: self.index,
            params: params.view(self.index),
        };
        self.module.process(&ctx, &mut self.output, num_frames)
    }

    pub(crate) fn assign(&mut self, key: i16, channel: i16) {
        debug_assert!(!self.assigned);
        self.assigned = true;
        self.key = key;
        self.channel = channel;
    }

    /// Drop the assignment and wipe every parameter record this voice
    /// touched.
    pub(crate) fn release(&mut self, params: &mut ModulationTable) {
        debug_assert!(self.assigned);
        self.assigned = false;
        params.reset_voice(&mut self.pending_reset);
    }

    /// Exact (key, channel) comparison against the current assignment.
    #[inline]
    pub fn matches(&self, key: i16, channel: i16) -> bool {
        self.assigned && self.key == key && self.channel == channel
    }

    pub(crate) fn set_param_value(&mut self, params: &mut ModulationTable, param: usize, value: f64) -> bool {
        params.set_value(&mut self.pending_reset, self.index, param, value)
    }

    pub(crate) fn set_param_modulation(&mut self, params: &mut ModulationTable, param: usize, amount: f64) -> bool {
        params.set_modulation(&mut self.pending_reset, self.index, param, amount)
    }

    pub fn note_on(&mut self, note: &NoteEvent) {
        self.module.note_on(note);
    }

    pub fn note_off(&mut self, note: &NoteEvent) {
        self.module.note_off(note);
    }

    pub fn note_choke(&mut self, note: &NoteEvent) {
        self.module.note_choke(note);
    }

    pub fn note_expression(&mut self, expression: &NoteExpressionEvent) {
        self.module.note_expression(expression);
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn is_assigned(&self) -> bool {
        self.assigned
    }

    #[inline]
    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Assigned (key, channel), if any.
    pub fn note(&self) -> Option<(i16, i16)> {
        self.assigned.then_some((self.key, self.channel))
    }

    /// Parameter records waiting to be wiped on release.
    pub fn pending_reset_count(&self) -> usize {
        self.pending_reset.len()
    }

    pub fn output(&self) -> &AudioBuffer<f32> {
        &self.output
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    pub fn module_mut(&mut self) -> &mut M {
        &mut self.module
    }
}

impl<M: Module> Linked for Voice<M> {
    #[inline]
    fn hook(&self, _slot: usize) -> &Hook {
        &self.state_hook
    }

    #[inline]
    fn hook_mut(&mut self, _slot: usize) -> &mut Hook {
        &mut self.state_hook
    }
}
