#[cfg(feature = "rtrb")]
use rtrb::Consumer;

/// Note on/off/choke payload. Only `key` and `channel` drive routing.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteEvent {
    pub key: i16,
    pub channel: i16,
    pub note_id: i32,
    pub velocity: f64,
}

impl NoteEvent {
    pub fn new(key: i16, channel: i16, velocity: f64) -> Self {
        Self {
            key,
            channel,
            note_id: -1,
            velocity,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExpressionKind {
    Volume,     // linear gain, 0..4
    Pan,        // 0 left, 0.5 center, 1 right
    Tuning,     // semitones
    Vibrato,
    Expression,
    Brightness,
    Pressure,
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoteExpressionEvent {
    pub key: i16,
    pub channel: i16,
    pub note_id: i32,
    pub kind: ExpressionKind,
    pub value: f64,
}

impl NoteExpressionEvent {
    pub fn new(key: i16, channel: i16, kind: ExpressionKind, value: f64) -> Self {
        Self {
            key,
            channel,
            note_id: -1,
            kind,
            value,
        }
    }
}

/// Per-voice parameter value. `key == -1 && channel == -1` targets the
/// parameter itself rather than a voice.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamValueEvent {
    pub param: usize,
    pub key: i16,
    pub channel: i16,
    pub value: f64,
}

/// Per-voice modulation amount. `key == -1 && channel == -1` modulates
/// every active voice.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParamModEvent {
    pub param: usize,
    pub key: i16,
    pub channel: i16,
    pub amount: f64,
}

#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    NoteOn(NoteEvent),
    NoteOff(NoteEvent),
    NoteChoke(NoteEvent),
    NoteExpression(NoteExpressionEvent),
    ParamValue(ParamValueEvent),
    ParamMod(ParamModEvent),
}

pub trait EventReceiver {
    fn pop(&mut self) -> Option<Event>;
}

#[cfg(feature = "rtrb")]
impl EventReceiver for Consumer<Event> {
    fn pop(&mut self) -> Option<Event> {
        Consumer::pop(self).ok()
    }
}
