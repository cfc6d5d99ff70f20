use crate::{
    buffer::AudioBuffer,
    config::ExpanderConfig,
    error::{Error, Result},
    list::List,
    params::ModulationTable,
    synth::{
        message::{
            Event, EventReceiver, NoteEvent, NoteExpressionEvent, ParamModEvent, ParamValueEvent,
        },
        module::{BlockCtx, Module, ProcessStatus},
        voice::Voice,
    },
};

/*
Voice Expander
==============

Turns one monophonic module into a fixed pool of voices.

    note on ──► active voice for (key, channel)? ──yes──► forward
                        │ no
                        ▼
                first sleeping voice ──► assign, forward
                        │ none
                        ▼
                     dropped

Every voice sits on exactly one of two intrusive lists:

    sleeping   unassigned, FIFO: released voices go to the back
    active     assigned, in assignment order

Moving between them is an O(1) relink; nothing is built or freed per note.


Block Processing
----------------

    1. clear the pooled output to constant silence
    2. for each active voice, in list order:
         run it, merge its status, add its buffer to the pool output,
         and put it back to sleep if it reported Sleep
    3. return the merged status

The cursor moves to the next voice before the current one can be unlinked,
so releasing mid-scan never breaks the walk. A voice released this way still
contributes its final block exactly once.

Voice stealing is not implemented: with no sleeping voice left, new notes are
dropped and counted in `dropped_notes`.
*/

pub struct VoiceExpander<M: Module> {
    voices: Box<[Voice<M>]>,
    sleeping: List,
    active: List,
    output: AudioBuffer<f32>,
    params: ModulationTable,
    activated: bool,
    sample_rate: f64,
    dropped_notes: u64,
}

impl<M: Module + Clone> VoiceExpander<M> {
    /// Build the prototype voice around `module` and clone it up to
    /// `config.voice_count`. Every voice starts asleep, in index order.
    pub fn new(module: M, config: &ExpanderConfig) -> Result<Self> {
        config.validate()?;

        let mut voices = Vec::with_capacity(config.voice_count);
        voices.push(Voice::new(module, config.channel_count, config.block_size)?);
        for index in 1..config.voice_count {
            let clone = voices[0].duplicate(index)?;
            voices.push(clone);
        }
        let mut voices = voices.into_boxed_slice();

        let mut sleeping = List::new(0);
        for index in 0..voices.len() {
            sleeping.push_back(&mut voices, index);
        }

        log::debug!(
            "voice expander: {} voices, {} channels, {} frames, {} params",
            config.voice_count,
            config.channel_count,
            config.block_size,
            config.param_count
        );

        Ok(Self {
            voices,
            sleeping,
            active: List::new(0),
            output: AudioBuffer::new(config.channel_count, config.block_size, 0.0)?,
            params: ModulationTable::new(config.voice_count, config.param_count),
            activated: false,
            sample_rate: 0.0,
            dropped_notes: 0,
        })
    }
}

impl<M: Module> VoiceExpander<M> {
    /// Activate every voice. On the first failure every voice is deactivated
    /// again and the error is returned.
    ///
    /// `max_frame_count` may not exceed the configured block size. An active
    /// pool accepts the same sample rate again; a new rate needs
    /// `deactivate` first.
    pub fn activate(&mut self, sample_rate: f64, max_frame_count: usize) -> Result<()> {
        let max = self.output.frame_count();
        if max_frame_count > max {
            return Err(Error::BlockTooLarge {
                requested: max_frame_count,
                max,
            });
        }

        if self.activated {
            if sample_rate == self.sample_rate {
                return Ok(());
            }
            return Err(Error::AlreadyActive {
                sample_rate: self.sample_rate,
            });
        }

        for index in 0..self.voices.len() {
            if let Err(source) = self.voices[index].activate(sample_rate, max_frame_count) {
                log::warn!("voice {index} failed to activate ({source}), rolling back");
                self.deactivate();
                return Err(Error::Activation { voice: index, source });
            }
        }

        self.activated = true;
        self.sample_rate = sample_rate;
        log::debug!("voice expander activated at {sample_rate} Hz, {max_frame_count} frames max");
        Ok(())
    }

    pub fn deactivate(&mut self) {
        for voice in self.voices.iter_mut() {
            voice.deactivate();
        }

        if self.activated {
            log::debug!("voice expander deactivated");
        }
        self.activated = false;
    }

    /// Run every active voice and sum them into the pooled output.
    pub fn process(&mut self, block: &BlockCtx, num_frames: usize) -> ProcessStatus {
        debug_assert!(num_frames <= self.output.frame_count());
        let num_frames = num_frames.min(self.output.frame_count());

        self.output.clear(0.0);
        if !self.activated {
            return ProcessStatus::Sleep;
        }

        self.params.flush();

        let mut status = ProcessStatus::Sleep;
        let mut cursor = self.active.front();
        while let Some(index) = cursor {
            cursor = self.active.next(&self.voices, index);

            let voice = &mut self.voices[index];
            let voice_status = voice.process(block, &self.params, num_frames);
            status = status.merge(voice_status);
            self.output.accumulate(voice.output(), num_frames);

            if voice_status == ProcessStatus::Sleep {
                self.release_voice(index);
            }
        }

        self.params.end_block();
        status
    }

    fn find_active_voice(&self, key: i16, channel: i16) -> Option<usize> {
        self.active.iter(&self.voices).find(|&index| {
            debug_assert!(self.voices[index].is_assigned());
            self.voices[index].matches(key, channel)
        })
    }

    fn assign_voice(&mut self, key: i16, channel: i16) -> Option<usize> {
        // TODO: steal a voice once a stealing policy is chosen.
        let index = self.sleeping.pop_front(&mut self.voices)?;
        self.voices[index].assign(key, channel);
        self.active.push_back(&mut self.voices, index);
        Some(index)
    }

    fn release_voice(&mut self, index: usize) {
        self.active.unlink(&mut self.voices, index);
        self.voices[index].release(&mut self.params);
        self.sleeping.push_back(&mut self.voices, index);
    }

    pub fn on_note_on(&mut self, note: &NoteEvent) {
        let index = match self.find_active_voice(note.key, note.channel) {
            Some(index) => index,
            None => match self.assign_voice(note.key, note.channel) {
                Some(index) => index,
                None => {
                    self.dropped_notes += 1;
                    return;
                }
            },
        };

        self.voices[index].note_on(note);
    }

    pub fn on_note_off(&mut self, note: &NoteEvent) {
        if let Some(index) = self.find_active_voice(note.key, note.channel) {
            self.voices[index].note_off(note);
        }
    }

    pub fn on_note_choke(&mut self, note: &NoteEvent) {
        if let Some(index) = self.find_active_voice(note.key, note.channel) {
            self.voices[index].note_choke(note);
        }
    }

    pub fn on_note_expression(&mut self, expression: &NoteExpressionEvent) {
        if let Some(index) = self.find_active_voice(expression.key, expression.channel) {
            self.voices[index].note_expression(expression);
        }
    }

    pub fn on_param_value(&mut self, event: &ParamValueEvent) {
        if event.key == -1 && event.channel == -1 {
            self.params.set_base_value(event.param, event.value);
            return;
        }

        if let Some(index) = self.find_active_voice(event.key, event.channel) {
            self.voices[index].set_param_value(&mut self.params, event.param, event.value);
        }
    }

    pub fn on_param_mod(&mut self, event: &ParamModEvent) {
        if event.key == -1 && event.channel == -1 {
            let mut cursor = self.active.front();
            while let Some(index) = cursor {
                cursor = self.active.next(&self.voices, index);
                self.voices[index].set_param_modulation(&mut self.params, event.param, event.amount);
            }
            return;
        }

        if let Some(index) = self.find_active_voice(event.key, event.channel) {
            self.voices[index].set_param_modulation(&mut self.params, event.param, event.amount);
        }
    }

    pub fn dispatch(&mut self, event: &Event) {
        match event {
            Event::NoteOn(note) => self.on_note_on(note),
            Event::NoteOff(note) => self.on_note_off(note),
            Event::NoteChoke(note) => self.on_note_choke(note),
            Event::NoteExpression(expression) => self.on_note_expression(expression),
            Event::ParamValue(value) => self.on_param_value(value),
            Event::ParamMod(modulation) => self.on_param_mod(modulation),
        }
    }

    /// Dispatch every event waiting in `rx`.
    pub fn drain_events<R: EventReceiver>(&mut self, rx: &mut R) {
        while let Some(event) = rx.pop() {
            self.dispatch(&event);
        }
    }

    pub fn output(&self) -> &AudioBuffer<f32> {
        &self.output
    }

    pub fn params(&self) -> &ModulationTable {
        &self.params
    }

    pub fn voice(&self, index: usize) -> Option<&Voice<M>> {
        self.voices.get(index)
    }

    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn sleeping_count(&self) -> usize {
        self.sleeping.len()
    }

    /// Active voice indices in processing order.
    pub fn active_voices(&self) -> impl Iterator<Item = usize> + '_ {
        self.active.iter(&self.voices)
    }

    /// Sleeping voice indices in assignment order.
    pub fn sleeping_voices(&self) -> impl Iterator<Item = usize> + '_ {
        self.sleeping.iter(&self.voices)
    }

    pub fn is_activated(&self) -> bool {
        self.activated
    }

    /// Note-ons dropped because no sleeping voice was left.
    pub fn dropped_notes(&self) -> u64 {
        self.dropped_notes
    }
}
