//! Bridge between host-owned channel buffers and [`AudioBuffer`].
//!
//! Hosts hand over one slice per channel plus a constant bitmask. A set bit
//! means that channel holds a single value at index 0 that is valid for the
//! whole block. These two functions are the only place the crate touches the
//! host-facing layout.

use super::{AudioBuffer, Sample};

/// Borrowed host input bus.
#[derive(Clone, Copy)]
pub struct HostInput<'a, T> {
    pub channels: &'a [&'a [T]],
    pub constant_mask: u64,
}

/// Borrowed host output bus.
pub struct HostOutput<'a, 'b, T> {
    pub channels: &'a mut [&'b mut [T]],
    pub constant_mask: &'a mut u64,
}

#[inline]
fn mask_bit(channel: usize) -> u64 {
    if channel < 64 {
        1 << channel
    } else {
        0
    }
}

impl<'a, T: Sample> HostInput<'a, T> {
    pub fn new(channels: &'a [&'a [T]], constant_mask: u64) -> Self {
        Self {
            channels,
            constant_mask,
        }
    }

    #[inline]
    pub fn is_constant(&self, channel: usize) -> bool {
        self.constant_mask & mask_bit(channel) != 0
    }

    #[inline]
    fn read(&self, channel: usize, index: usize) -> T {
        let source = self.channels[channel];
        let index = if self.is_constant(channel) { 0 } else { index };
        source.get(index).copied().unwrap_or(T::ZERO)
    }
}

impl<'a, 'b, T: Sample> HostOutput<'a, 'b, T> {
    pub fn new(channels: &'a mut [&'b mut [T]], constant_mask: &'a mut u64) -> Self {
        Self {
            channels,
            constant_mask,
        }
    }
}

impl<T: Sample> AudioBuffer<T> {
    /// Load `frame_count` host frames starting at `frame_offset` into frames
    /// `0..frame_count` of this buffer.
    ///
    /// When every transferred channel is flagged constant the buffer becomes
    /// constant too. Channels the host does not provide read as silence.
    pub fn from_host(&mut self, input: &HostInput<'_, T>, frame_offset: usize, frame_count: usize) {
        let shared = self.channel_count.min(input.channels.len());
        let frames = frame_count.min(self.frame_count);

        if shared == 0 {
            self.clear(T::ZERO);
            return;
        }

        if (0..shared).all(|channel| input.is_constant(channel)) {
            for channel in 0..self.channel_count {
                self.data[channel] = if channel < shared {
                    input.read(channel, 0)
                } else {
                    T::ZERO
                };
            }
            self.set_constant(true);
            return;
        }

        self.set_constant(false);
        let channels = self.channel_count;
        for frame in 0..frames {
            for channel in 0..channels {
                self.data[frame * channels + channel] = if channel < shared {
                    input.read(channel, frame_offset + frame)
                } else {
                    T::ZERO
                };
            }
        }
    }

    /// Write frames `0..frame_count` of this buffer into host frames
    /// `frame_offset..frame_offset + frame_count`.
    ///
    /// A constant buffer that covers a whole host channel marks it constant;
    /// any other write clears that channel's constant bit.
    pub fn to_host(&self, output: &mut HostOutput<'_, '_, T>, frame_offset: usize, frame_count: usize) {
        let shared = self.channel_count.min(output.channels.len());
        let frames = frame_count.min(self.frame_count);

        for channel in 0..shared {
            let dest = &mut *output.channels[channel];
            let end = (frame_offset + frames).min(dest.len());
            if frame_offset >= end {
                continue;
            }

            for (frame, sample) in dest[frame_offset..end].iter_mut().enumerate() {
                *sample = self.sample(frame, channel);
            }

            if self.is_constant() && frame_offset == 0 && end == dest.len() {
                *output.constant_mask |= mask_bit(channel);
            } else {
                *output.constant_mask &= !mask_bit(channel);
            }
        }
    }
}
