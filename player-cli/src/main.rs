mod config;

use std::io::BufRead;

use player_core::controller::NullOutput;
use player_core::decoder::fake::FakeDecoder;
use player_core::decoder::SeekFrom;
use player_core::{Decoder, Player, PlayerConfig};
use player_device::FileDecoder;

/// A square wave at roughly a musical A, used by `--fake` so the engine can
/// be exercised without a real sound file or audio hardware.
fn fake_tone(channels: u16, sample_rate: u32, seconds: u32) -> FakeDecoder {
    const FREQUENCY_HZ: f32 = 440.0;
    let total_frames = u64::from(sample_rate) * u64::from(seconds);
    let period = (sample_rate as f32 / FREQUENCY_HZ) as u64;

    let mut samples = Vec::with_capacity((total_frames * u64::from(channels)) as usize);
    for frame in 0..total_frames {
        let value = if frame % period < period / 2 { 0.2 } else { -0.2 };
        for _ in 0..channels {
            samples.push(value);
        }
    }

    FakeDecoder::new(channels, sample_rate, samples)
}

fn open_decoder(args: &[String]) -> Box<dyn Decoder> {
    match args.first().map(String::as_str) {
        Some("--fake") | None => {
            log::info!("no sound file given, playing a fake test tone");
            Box::new(fake_tone(2, 44_100, 30))
        }
        Some(path) => match FileDecoder::open(path) {
            Ok(decoder) => Box::new(decoder),
            Err(err) => {
                eprintln!("error: failed to open {path}: {err}");
                std::process::exit(1);
            }
        },
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = config::read().apply(PlayerConfig::default());
    let decoder = open_decoder(&args);

    let info = decoder.info();
    let frames_per_block = config.frames_per_block;

    let (mut player, ring) = match Player::create(decoder, Box::new(NullOutput), config) {
        Ok(pair) => pair,
        Err(err) => {
            eprintln!("error: failed to start player: {err}");
            std::process::exit(1);
        }
    };

    match player_device::output::open(
        ring,
        player.state_cell().clone(),
        player.metrics().clone(),
        player.wake().clone(),
        info.channels,
        info.sample_rate,
        frames_per_block,
    ) {
        Ok(cpal_output) => player.set_output(Box::new(cpal_output)),
        Err(err) => {
            eprintln!("error: failed to open audio output: {err}");
            std::process::exit(1);
        }
    }

    println!(
        "playing: {} channels, {}Hz{}",
        info.channels,
        info.sample_rate,
        match info.total_frames {
            Some(frames) => format!(", {frames} frames"),
            None => String::new(),
        }
    );
    println!("commands: [p]ause, [r]esume, [s]top, seek <frames>, [q]uit");

    if let Err(err) = player.play() {
        eprintln!("error: failed to start playback: {err}");
        std::process::exit(1);
    }

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        match line.trim() {
            "p" => drop(player.pause()),
            "r" => drop(player.play()),
            "s" => drop(player.stop()),
            "q" => break,
            other if other.starts_with("seek ") => {
                if let Ok(frames) = other[5..].trim().parse::<i64>() {
                    match player.seek(frames, SeekFrom::Begin) {
                        Ok(pos) => println!("seeked to frame {pos}"),
                        Err(err) => eprintln!("seek failed: {err}"),
                    }
                }
            }
            _ => {}
        }

        println!("played_frames={} underruns={}", player.played_frames(), player.underruns());
    }

    if let Err(err) = player.destroy() {
        eprintln!("warning: {err}");
    }
}
