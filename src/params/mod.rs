use crate::list::{Hook, Linked, List};

/*
Per-voice Parameter State
=========================

Every (voice, parameter) pair owns one `ModulationRecord`. Records never move:
they sit in a flat arena indexed by `voice * param_count + param`, and list
membership is tracked with embedded hooks.

A record can be on four lists at once:

  reset            owned by its voice; everything the voice touched since
                   it was assigned
  value            per-voice values waiting for `flush`
  modulation       per-voice modulation amounts waiting for `flush`
  modulated value  records whose modulated value changed this block

Event handling links a record into `reset` and one of the pending queues.
`flush` folds the pending queues into `modulated_value`. `end_block` empties
the modulated-value queue once every voice had the chance to look at it.

When a voice is released, `reset_voice` walks its reset list and clears
every record it finds: flags down, all four hooks unlinked. A voice that is
reassigned on the very next event starts with no stale modulation.
*/

pub const RESET_HOOK: usize = 0;
pub const VALUE_HOOK: usize = 1;
pub const MODULATION_HOOK: usize = 2;
pub const MODULATED_VALUE_HOOK: usize = 3;

/// Bookkeeping for one parameter on one voice.
#[derive(Debug, Clone, Default)]
pub struct ModulationRecord {
    param: usize,
    value: f64,
    modulation: f64,
    modulated_value: f64,
    has_value: bool,
    has_modulation: bool,
    has_modulated_value: bool,
    hooks: [Hook; 4],
}

impl ModulationRecord {
    #[inline]
    pub fn has_value(&self) -> bool {
        self.has_value
    }

    #[inline]
    pub fn has_modulation(&self) -> bool {
        self.has_modulation
    }

    #[inline]
    pub fn has_modulated_value(&self) -> bool {
        self.has_modulated_value
    }

    /// True if the record sits on any of its four lists.
    pub fn is_linked(&self) -> bool {
        self.hooks.iter().any(Hook::is_linked)
    }

    #[inline]
    pub fn is_linked_in(&self, slot: usize) -> bool {
        self.hooks[slot].is_linked()
    }
}

impl Linked for ModulationRecord {
    #[inline]
    fn hook(&self, slot: usize) -> &Hook {
        &self.hooks[slot]
    }

    #[inline]
    fn hook_mut(&mut self, slot: usize) -> &mut Hook {
        &mut self.hooks[slot]
    }
}

/// Arena of per-voice parameter records plus the pending queues.
pub struct ModulationTable {
    param_count: usize,
    records: Box<[ModulationRecord]>,
    base_values: Box<[Option<f64>]>,
    value_queue: List,
    modulation_queue: List,
    modulated_value_queue: List,
}

impl ModulationTable {
    /// The pool builds its table from a validated `ExpanderConfig`, so
    /// `voice_count * param_count` is known not to overflow.
    pub(crate) fn new(voice_count: usize, param_count: usize) -> Self {
        let records = (0..voice_count * param_count)
            .map(|id| ModulationRecord {
                param: id % param_count.max(1),
                ..Default::default()
            })
            .collect();

        Self {
            param_count,
            records,
            base_values: vec![None; param_count].into_boxed_slice(),
            value_queue: List::new(VALUE_HOOK),
            modulation_queue: List::new(MODULATION_HOOK),
            modulated_value_queue: List::new(MODULATED_VALUE_HOOK),
        }
    }

    /// Empty reset list for a voice to own.
    pub const fn reset_list() -> List {
        List::new(RESET_HOOK)
    }

    #[inline]
    pub fn param_count(&self) -> usize {
        self.param_count
    }

    #[inline]
    fn record_id(&self, voice: usize, param: usize) -> Option<usize> {
        let id = voice * self.param_count + param;
        (param < self.param_count && id < self.records.len()).then_some(id)
    }

    pub fn record(&self, voice: usize, param: usize) -> Option<&ModulationRecord> {
        self.record_id(voice, param).map(|id| &self.records[id])
    }

    /// Non-polyphonic value used when a voice has no value of its own.
    ///
    /// Records that fold modulation onto the base are queued again so the
    /// next `flush` sees the new value.
    pub fn set_base_value(&mut self, param: usize, value: f64) {
        let Some(base) = self.base_values.get_mut(param) else {
            return;
        };
        *base = Some(value);

        for id in (param..self.records.len()).step_by(self.param_count) {
            let record = &self.records[id];
            if record.has_modulation && !record.has_value && !record.is_linked_in(MODULATION_HOOK) {
                self.modulation_queue.push_back(&mut self.records, id);
            }
        }
    }

    pub fn base_value(&self, param: usize) -> Option<f64> {
        self.base_values.get(param).copied().flatten()
    }

    /// Record a per-voice value. Returns false for an unknown parameter.
    pub fn set_value(&mut self, reset: &mut List, voice: usize, param: usize, value: f64) -> bool {
        let Some(id) = self.record_id(voice, param) else {
            return false;
        };

        let record = &mut self.records[id];
        record.value = value;
        record.has_value = true;

        self.track(reset, id);
        if !self.records[id].is_linked_in(VALUE_HOOK) {
            self.value_queue.push_back(&mut self.records, id);
        }
        true
    }

    /// Record a per-voice modulation amount. Returns false for an unknown
    /// parameter.
    pub fn set_modulation(&mut self, reset: &mut List, voice: usize, param: usize, amount: f64) -> bool {
        let Some(id) = self.record_id(voice, param) else {
            return false;
        };

        let record = &mut self.records[id];
        record.modulation = amount;
        record.has_modulation = true;

        self.track(reset, id);
        if !self.records[id].is_linked_in(MODULATION_HOOK) {
            self.modulation_queue.push_back(&mut self.records, id);
        }
        true
    }

    #[inline]
    fn track(&mut self, reset: &mut List, id: usize) {
        if !self.records[id].is_linked_in(RESET_HOOK) {
            reset.push_back(&mut self.records, id);
        }
    }

    /// Fold pending values and modulation into each record's modulated value.
    pub fn flush(&mut self) {
        while let Some(id) = self.value_queue.pop_front(&mut self.records) {
            self.refresh(id);
        }
        while let Some(id) = self.modulation_queue.pop_front(&mut self.records) {
            self.refresh(id);
        }
    }

    fn refresh(&mut self, id: usize) {
        let record = &self.records[id];
        let value = if record.has_value {
            record.value
        } else {
            self.base_values[record.param].unwrap_or(0.0)
        };
        let modulation = if record.has_modulation {
            record.modulation
        } else {
            0.0
        };

        let record = &mut self.records[id];
        record.modulated_value = value + modulation;
        record.has_modulated_value = true;

        if !record.is_linked_in(MODULATED_VALUE_HOOK) {
            self.modulated_value_queue.push_back(&mut self.records, id);
        }
    }

    /// Hand every record whose modulated value changed this block to
    /// `visit` as `(voice, param, modulated_value)`, emptying the queue.
    pub fn drain_modulated(&mut self, mut visit: impl FnMut(usize, usize, f64)) {
        while let Some(id) = self.modulated_value_queue.pop_front(&mut self.records) {
            let record = &self.records[id];
            visit(id / self.param_count, record.param, record.modulated_value);
        }
    }

    /// Forget this block's modulated-value changes.
    pub fn end_block(&mut self) {
        self.drain_modulated(|_, _, _| {});
    }

    /// Clear every record on `reset` and unlink it from all four lists.
    pub fn reset_voice(&mut self, reset: &mut List) {
        while let Some(id) = reset.pop_front(&mut self.records) {
            let record = &mut self.records[id];
            record.has_value = false;
            record.has_modulation = false;
            record.has_modulated_value = false;

            self.value_queue.unlink(&mut self.records, id);
            self.modulation_queue.unlink(&mut self.records, id);
            self.modulated_value_queue.unlink(&mut self.records, id);
        }
    }

    pub fn pending_values(&self) -> usize {
        self.value_queue.len()
    }

    pub fn pending_modulations(&self) -> usize {
        self.modulation_queue.len()
    }

    pub fn changed_this_block(&self) -> usize {
        self.modulated_value_queue.len()
    }

    /// Read-only view of one voice's parameters.
    pub fn view(&self, voice: usize) -> VoiceParams<'_> {
        VoiceParams { table: self, voice }
    }
}

/// What an inner module sees of its voice's parameter state.
#[derive(Clone, Copy)]
pub struct VoiceParams<'a> {
    table: &'a ModulationTable,
    voice: usize,
}

impl<'a> VoiceParams<'a> {
    /// Per-voice value, if one was set since the voice was assigned.
    pub fn value(&self, param: usize) -> Option<f64> {
        self.table
            .record(self.voice, param)
            .filter(|record| record.has_value)
            .map(|record| record.value)
    }

    pub fn modulation(&self, param: usize) -> Option<f64> {
        self.table
            .record(self.voice, param)
            .filter(|record| record.has_modulation)
            .map(|record| record.modulation)
    }

    /// Value the voice should render with: the modulated value when one has
    /// been computed, otherwise its own value or the base value. `None` when
    /// nothing was ever set, so the module picks its own default.
    pub fn modulated_value(&self, param: usize) -> Option<f64> {
        let record = self.table.record(self.voice, param)?;
        if record.has_modulated_value {
            Some(record.modulated_value)
        } else if record.has_value {
            Some(record.value)
        } else {
            self.table.base_value(param)
        }
    }

    /// True if this parameter's modulated value changed in the current block.
    pub fn changed(&self, param: usize) -> bool {
        self.table
            .record(self.voice, param)
            .is_some_and(|record| record.is_linked_in(MODULATED_VALUE_HOOK))
    }
}
