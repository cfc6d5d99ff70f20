//! expander-play - plays an arpeggio through a voice pool on the default
//! output device.
//!
//! Run with: cargo run --bin expander-play

use std::{thread, time::Duration};

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use poly_expander::{
    synth::{
        message::{Event, NoteEvent},
        sine::SineVoice,
    },
    BlockCtx, ExpanderConfig, VoiceExpander,
};
use rtrb::RingBuffer;

const BLOCK_SIZE: usize = 256;
const EVENT_QUEUE_SIZE: usize = 256;
const ARPEGGIO: [i16; 8] = [60, 64, 67, 72, 76, 72, 67, 64];

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f64;
    let channels = config.channels() as usize;

    let pool_config = ExpanderConfig::default()
        .with_voices(8)
        .with_channels(channels)
        .with_block_size(BLOCK_SIZE)
        .with_params(1);
    let mut pool = VoiceExpander::new(SineVoice::new(0.01, 0.4), &pool_config)
        .wrap_err("failed to build voice pool")?;
    pool.activate(sample_rate, BLOCK_SIZE)
        .wrap_err("failed to activate voice pool")?;

    println!("=== expander-play ===");
    println!("Sample rate: {} Hz", sample_rate);
    println!("Channels: {}", channels);
    println!("Voices: {}", pool.voice_count());
    println!();

    let (mut tx, mut rx) = RingBuffer::<Event>::new(EVENT_QUEUE_SIZE);
    let mut steady_time = 0u64;

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames = (total_frames - frames_written).min(BLOCK_SIZE);

                pool.drain_events(&mut rx);
                pool.process(&BlockCtx { steady_time }, frames);

                let output = pool.output();
                let offset = frames_written * channels;
                for frame in 0..frames {
                    for channel in 0..channels {
                        data[offset + frame * channels + channel] =
                            output.sample(frame, channel) * 0.2;
                    }
                }

                frames_written += frames;
                steady_time += frames as u64;
            }
        },
        |err| eprintln!("Audio error: {}", err),
        None,
    )?;

    stream.play()?;

    for &key in ARPEGGIO.iter().cycle().take(ARPEGGIO.len() * 2) {
        println!("  Note On: {}", key);
        send(&mut tx, Event::NoteOn(NoteEvent::new(key, 0, 0.8)));
        thread::sleep(Duration::from_millis(180));
        send(&mut tx, Event::NoteOff(NoteEvent::new(key, 0, 0.0)));
    }

    // Let the last release ring out.
    thread::sleep(Duration::from_millis(600));
    Ok(())
}

fn send(tx: &mut rtrb::Producer<Event>, event: Event) {
    if tx.push(event).is_err() {
        eprintln!("event queue full, dropping {:?}", event);
    }
}

