use std::ops::{Add, Mul};

use crate::error::{Error, Result};

pub mod host;

pub use host::{HostInput, HostOutput};

/*
Interleaved Block Buffers
=========================

An `AudioBuffer` holds one processing block of interleaved samples:

    data = [f0c0, f0c1, f1c0, f1c1, f2c0, f2c1, ...]   (2 channels)

Sample (frame, channel) lives at `frame * stride + channel`.


The Constant Fast Path
----------------------

Silence and DC are common: a released voice, an untouched sidechain, a
parameter that is not moving. Writing the same value into every frame is
wasted work, so a buffer can be flagged constant:

    stride = channel_count   normal buffer, one slot per frame
    stride = 0               constant buffer, every frame reads frame 0

With stride 0 the read `data[frame * 0 + channel]` lands on the same slot for
every frame, so a constant buffer is broadcast for free and nothing is ever
replicated.

Constancy is never inferred. `compute` always produces a non-constant result,
even when both operands happen to be constant; only `clear` and the host
bridge set the flag.


In-place Combination
--------------------

`combine` writes `op(self, other)` back into `self`. When `self` is constant
its values sit in the frame-0 slots, which are also where the non-constant
frame 0 will be written. Walking the frames from last to first means frame 0
is overwritten last, after every other frame has read it.
*/

/// Numeric sample type stored in an [`AudioBuffer`].
pub trait Sample:
    Copy + Default + PartialEq + std::fmt::Debug + Add<Output = Self> + Mul<Output = Self> + Send + Sync + 'static
{
    const ZERO: Self;
    const ONE: Self;

    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
}

impl Sample for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    #[inline]
    fn from_f64(value: f64) -> Self {
        value as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Sample for f64 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;

    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

/// Fixed-shape block of interleaved multichannel samples.
///
/// The shape is decided at construction and never changes; nothing on the
/// processing path reallocates. Out-of-range frames are the caller's
/// responsibility (`num_frames` must not exceed [`frame_count`](Self::frame_count)).
pub struct AudioBuffer<T: Sample = f32> {
    channel_count: usize,
    frame_count: usize,
    sample_rate: f64, // 0.0 if unspecified
    data: Box<[T]>,
    stride: usize,
}

impl<T: Sample> AudioBuffer<T> {
    /// Allocate a silent, constant buffer.
    ///
    /// Fails with [`Error::Allocation`] if the backing store cannot be reserved.
    pub fn new(channel_count: usize, frame_count: usize, sample_rate: f64) -> Result<Self> {
        let len = channel_count.checked_mul(frame_count).unwrap_or(usize::MAX);

        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|source| Error::Allocation {
                channels: channel_count,
                frames: frame_count,
                source,
            })?;
        data.resize(len, T::ZERO);

        Ok(Self {
            channel_count,
            frame_count,
            sample_rate,
            data: data.into_boxed_slice(),
            stride: 0,
        })
    }

    /// Allocate a second buffer with the same shape as `self`.
    pub fn with_same_shape(&self) -> Result<Self> {
        Self::new(self.channel_count, self.frame_count, self.sample_rate)
    }

    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn is_constant(&self) -> bool {
        self.stride == 0
    }

    /// Switch between the per-frame and the broadcast representation.
    ///
    /// Only the stride changes; stored samples are left as they are.
    #[inline]
    pub fn set_constant(&mut self, constant: bool) {
        self.stride = if constant { 0 } else { self.channel_count };
    }

    #[inline]
    pub fn sample(&self, frame: usize, channel: usize) -> T {
        self.data[frame * self.stride + channel]
    }

    /// Mutable view of one frame's channel samples.
    ///
    /// On a constant buffer every frame maps to the shared frame-0 slots.
    #[inline]
    pub fn frame_mut(&mut self, frame: usize) -> &mut [T] {
        let start = frame * self.stride;
        &mut self.data[start..start + self.channel_count]
    }

    #[inline]
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    #[inline]
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Set every channel to `value` using the constant representation.
    pub fn clear(&mut self, value: T) {
        let channels = self.channel_count.min(self.data.len());
        self.data[..channels].fill(value);
        self.set_constant(true);
    }

    /// Store `op(a, b)` into this buffer for the first `num_frames` frames.
    ///
    /// Operands are read through their own stride, so constant and
    /// non-constant inputs mix freely. The result is always non-constant.
    pub fn compute<F>(&mut self, op: F, a: &AudioBuffer<T>, b: &AudioBuffer<T>, num_frames: usize)
    where
        F: Fn(T, T) -> T,
    {
        debug_assert!(num_frames <= self.frame_count);
        debug_assert!(a.channel_count >= self.channel_count);
        debug_assert!(b.channel_count >= self.channel_count);

        self.set_constant(false);
        let channels = self.channel_count;

        for frame in 0..num_frames {
            let out = &mut self.data[frame * channels..(frame + 1) * channels];
            for (channel, sample) in out.iter_mut().enumerate() {
                *sample = op(a.sample(frame, channel), b.sample(frame, channel));
            }
        }
    }

    /// Store `a + b` into this buffer.
    pub fn sum(&mut self, a: &AudioBuffer<T>, b: &AudioBuffer<T>, num_frames: usize) {
        self.compute(|x, y| x + y, a, b, num_frames);
    }

    /// Store `a * b` into this buffer.
    pub fn product(&mut self, a: &AudioBuffer<T>, b: &AudioBuffer<T>, num_frames: usize) {
        self.compute(|x, y| x * y, a, b, num_frames);
    }

    /// Store `op(self, other)` back into this buffer.
    ///
    /// This is `compute` with the destination doubling as the first operand.
    /// The result is always non-constant.
    pub fn combine<F>(&mut self, op: F, other: &AudioBuffer<T>, num_frames: usize)
    where
        F: Fn(T, T) -> T,
    {
        debug_assert!(num_frames <= self.frame_count);
        debug_assert!(other.channel_count >= self.channel_count);

        let read_stride = self.stride;
        self.set_constant(false);
        let channels = self.channel_count;

        // Frame 0 last: a constant destination keeps its values there.
        for frame in (0..num_frames).rev() {
            for channel in 0..channels {
                let current = self.data[frame * read_stride + channel];
                self.data[frame * channels + channel] = op(current, other.sample(frame, channel));
            }
        }
    }

    /// `self += other` over the first `num_frames` frames.
    pub fn accumulate(&mut self, other: &AudioBuffer<T>, num_frames: usize) {
        self.combine(|x, y| x + y, other, num_frames);
    }

    /// Apply `op` to every sample in place.
    ///
    /// A constant buffer stays constant: only its stored channel values are
    /// touched.
    pub fn apply_to<F>(&mut self, mut op: F, num_frames: usize)
    where
        F: FnMut(T) -> T,
    {
        debug_assert!(num_frames <= self.frame_count);

        let len = if self.is_constant() {
            self.channel_count
        } else {
            num_frames * self.channel_count
        };

        for sample in &mut self.data[..len] {
            *sample = op(*sample);
        }
    }

    /// Copy `other` into this buffer, keeping its representation.
    pub fn copy_from(&mut self, other: &AudioBuffer<T>, num_frames: usize) {
        debug_assert!(other.channel_count >= self.channel_count);

        if other.is_constant() {
            for channel in 0..self.channel_count {
                self.data[channel] = other.sample(0, channel);
            }
            self.set_constant(true);
            return;
        }

        self.set_constant(false);
        let channels = self.channel_count;
        for frame in 0..num_frames {
            for channel in 0..channels {
                self.data[frame * channels + channel] = other.sample(frame, channel);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(channels: usize, frames: usize) -> AudioBuffer<f32> {
        let mut buffer = AudioBuffer::new(channels, frames, 48_000.0).unwrap();
        buffer.set_constant(false);
        for frame in 0..frames {
            for (channel, sample) in buffer.frame_mut(frame).iter_mut().enumerate() {
                *sample = (frame * 10 + channel) as f32;
            }
        }
        buffer
    }

    fn constant(channels: usize, frames: usize, value: f32) -> AudioBuffer<f32> {
        let mut buffer = AudioBuffer::new(channels, frames, 48_000.0).unwrap();
        buffer.clear(value);
        buffer
    }

    #[test]
    fn new_buffer_is_constant_silence() {
        let buffer = AudioBuffer::<f64>::new(2, 64, 0.0).unwrap();
        assert!(buffer.is_constant());
        assert_eq!(buffer.stride(), 0);
        assert_eq!(buffer.data().len(), 128);
        assert_eq!(buffer.sample(63, 1), 0.0);
        assert_eq!(buffer.sample_rate(), 0.0);
    }

    #[test]
    fn oversized_buffer_reports_allocation_error() {
        let result = AudioBuffer::<f32>::new(usize::MAX, 2, 0.0);
        assert!(matches!(result, Err(Error::Allocation { .. })));
    }

    #[test]
    fn set_constant_recomputes_stride() {
        let mut buffer = AudioBuffer::<f32>::new(3, 8, 0.0).unwrap();
        buffer.set_constant(false);
        assert_eq!(buffer.stride(), 3);
        assert!(!buffer.is_constant());
        buffer.set_constant(true);
        assert_eq!(buffer.stride(), 0);
    }

    #[test]
    fn constant_buffer_broadcasts_every_frame() {
        let mut buffer = AudioBuffer::<f32>::new(2, 32, 0.0).unwrap();
        buffer.set_constant(false);
        buffer.frame_mut(0).copy_from_slice(&[0.25, -0.5]);
        buffer.frame_mut(5).copy_from_slice(&[9.0, 9.0]);
        buffer.set_constant(true);

        for frame in 0..32 {
            assert_eq!(buffer.sample(frame, 0), 0.25);
            assert_eq!(buffer.sample(frame, 1), -0.5);
        }
    }

    #[test]
    fn sum_of_constant_and_ramp_is_not_constant() {
        let a = constant(2, 16, 0.5);
        let b = ramp(2, 16);
        let mut out = AudioBuffer::new(2, 16, 0.0).unwrap();

        out.sum(&a, &b, 16);

        assert!(!out.is_constant());
        for frame in 0..16 {
            for channel in 0..2 {
                assert_eq!(out.sample(frame, channel), 0.5 + b.sample(frame, channel));
            }
        }
    }

    #[test]
    fn sum_of_two_constants_is_still_written_per_frame() {
        let a = constant(1, 8, 1.0);
        let b = constant(1, 8, 2.0);
        let mut out = AudioBuffer::new(1, 8, 0.0).unwrap();

        out.sum(&a, &b, 8);

        assert!(!out.is_constant());
        assert!((0..8).all(|frame| out.sample(frame, 0) == 3.0));
    }

    #[test]
    fn product_multiplies_elementwise() {
        let a = ramp(2, 4);
        let b = constant(2, 4, 2.0);
        let mut out = AudioBuffer::new(2, 4, 0.0).unwrap();

        out.product(&a, &b, 4);

        assert_eq!(out.sample(3, 1), 62.0);
        assert_eq!(out.sample(0, 0), 0.0);
    }

    #[test]
    fn compute_only_touches_requested_frames() {
        let a = constant(1, 8, 1.0);
        let b = constant(1, 8, 1.0);
        let mut out = ramp(1, 8);

        out.compute(|x, y| x - y, &a, &b, 4);

        assert_eq!(out.sample(3, 0), 0.0);
        assert_eq!(out.sample(4, 0), 40.0);
    }

    #[test]
    fn accumulate_into_constant_destination() {
        let mut out = constant(2, 8, 1.0);
        let voice = ramp(2, 8);

        out.accumulate(&voice, 8);

        assert!(!out.is_constant());
        for frame in 0..8 {
            for channel in 0..2 {
                assert_eq!(out.sample(frame, channel), 1.0 + voice.sample(frame, channel));
            }
        }
    }

    #[test]
    fn accumulate_constant_source_into_ramp() {
        let mut out = ramp(2, 8);
        let dc = constant(2, 8, 0.5);

        out.accumulate(&dc, 8);

        assert_eq!(out.sample(7, 1), 71.5);
        assert_eq!(out.sample(0, 0), 0.5);
    }

    #[test]
    fn apply_to_keeps_constant_representation() {
        let mut buffer = constant(2, 16, 0.5);
        buffer.apply_to(|s| s * 4.0, 16);

        assert!(buffer.is_constant());
        assert_eq!(buffer.sample(15, 1), 2.0);
    }

    #[test]
    fn apply_to_scales_active_frames() {
        let mut buffer = ramp(1, 8);
        buffer.apply_to(|s| -s, 4);

        assert_eq!(buffer.sample(3, 0), -30.0);
        assert_eq!(buffer.sample(5, 0), 50.0);
    }

    #[test]
    fn copy_from_preserves_constancy() {
        let source = constant(2, 8, 0.75);
        let mut dest = ramp(2, 8);

        dest.copy_from(&source, 8);
        assert!(dest.is_constant());
        assert_eq!(dest.sample(6, 1), 0.75);

        let source = ramp(2, 8);
        dest.copy_from(&source, 8);
        assert!(!dest.is_constant());
        assert_eq!(dest.sample(6, 1), 61.0);
    }
}
