//! End-to-end scenarios driven entirely through the public `Player` API plus
//! an in-memory decoder, so they exercise the real ring/Producer/callback
//! pipeline without any audio hardware.

use std::time::{Duration, Instant};

use player_core::callback;
use player_core::controller::NullOutput;
use player_core::decoder::fake::FakeDecoder;
use player_core::decoder::SeekFrom;
use player_core::{Player, PlayerConfig, PlayerState};

fn ramp_decoder(total_frames: u64) -> FakeDecoder {
    let samples = (0..total_frames).map(|i| i as f32).collect();
    FakeDecoder::new(1, 8000, samples)
}

fn fast_config() -> PlayerConfig {
    PlayerConfig {
        frames_per_block: 4,
        max_blocks: 4,
        wake_timeout: Duration::from_millis(5),
        destroy_timeout: Duration::from_secs(2),
        ..PlayerConfig::default()
    }
}

fn wait_until(mut predicate: impl FnMut() -> bool, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if predicate() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    predicate()
}

#[test]
fn short_file_plays_to_completion_then_idles_on_silence() {
    let (mut player, mut ring) =
        Player::create(Box::new(ramp_decoder(10)), Box::new(NullOutput), fast_config()).unwrap();

    player.play().unwrap();

    let mut out = [9.0f32; 4];

    // 10 frames in blocks of 4 is 3 blocks (last zero-padded); keep pulling
    // well past end-of-stream. The Producer keeps the ring topped up with
    // zero blocks rather than stopping after the terminal block, so
    // draining this far never underruns.
    for _ in 0..20 {
        callback::fill(&mut out, &mut ring, player.state_cell(), player.metrics(), player.wake());
        std::thread::sleep(Duration::from_millis(1));
    }

    assert_eq!(player.underruns(), 0);
    assert_eq!(out, [0.0; 4]);
    // PlayedFrames tracks decode progress, not zero-padded block size: the
    // last block only had 2 real frames (8 and 9) behind its padding, and
    // stays there through the trailing silence.
    assert_eq!(player.played_frames(), 10);
}

#[test]
fn pause_preserves_position_and_resumes() {
    let (mut player, mut ring) =
        Player::create(Box::new(ramp_decoder(100)), Box::new(NullOutput), fast_config()).unwrap();

    player.play().unwrap();

    let mut out = [0.0f32; 4];
    wait_until(|| player.played_frames() >= 4, Duration::from_secs(1));
    callback::fill(&mut out, &mut ring, player.state_cell(), player.metrics(), player.wake());
    let played_before_pause = player.played_frames();
    assert!(played_before_pause > 0);

    player.pause().unwrap();
    assert_eq!(player.state(), PlayerState::Paused);

    for _ in 0..5 {
        callback::fill(&mut out, &mut ring, player.state_cell(), player.metrics(), player.wake());
        assert_eq!(out, [0.0; 4]);
    }
    assert_eq!(player.played_frames(), played_before_pause);

    player.play().unwrap();
    assert_eq!(player.state(), PlayerState::Playing);
    assert!(wait_until(
        || player.played_frames() > played_before_pause || {
            callback::fill(&mut out, &mut ring, player.state_cell(), player.metrics(), player.wake());
            player.played_frames() > played_before_pause
        },
        Duration::from_secs(1)
    ));
}

#[test]
fn stop_resets_position_and_playback() {
    let (mut player, mut ring) =
        Player::create(Box::new(ramp_decoder(100)), Box::new(NullOutput), fast_config()).unwrap();

    player.play().unwrap();
    let mut out = [0.0f32; 4];
    wait_until(|| {
        callback::fill(&mut out, &mut ring, player.state_cell(), player.metrics(), player.wake());
        player.played_frames() > 0
    }, Duration::from_secs(1));

    player.stop().unwrap();
    assert_eq!(player.state(), PlayerState::Stopped);
    assert_eq!(player.played_frames(), 0);

    callback::fill(&mut out, &mut ring, player.state_cell(), player.metrics(), player.wake());
    assert_eq!(out, [0.0; 4]);
}

#[test]
fn seek_moves_the_decode_position() {
    let config = fast_config();
    let max_blocks = config.max_blocks;
    let (mut player, mut ring) =
        Player::create(Box::new(ramp_decoder(100)), Box::new(NullOutput), config).unwrap();

    let position = player.seek(50, SeekFrom::Begin).unwrap();
    assert_eq!(position, 50);
    assert_eq!(player.played_frames(), 50);

    player.play().unwrap();

    // The seek handshake does not flush the Ring (spec §4.3/§9): up to
    // `max_blocks` blocks produced before the seek was serviced may still
    // be queued and get drained first. The post-seek content must appear
    // within that bounded number of blocks, not necessarily the very next
    // one.
    let mut out = [0.0f32; 4];
    let mut found = false;
    for _ in 0..=max_blocks {
        assert!(wait_until(
            || {
                callback::fill(&mut out, &mut ring, player.state_cell(), player.metrics(), player.wake());
                out != [0.0; 4]
            },
            Duration::from_secs(1)
        ));

        if out == [50.0, 51.0, 52.0, 53.0] {
            found = true;
            break;
        }
    }

    assert!(found, "post-seek content never appeared within the stale-block latency bound");
}

#[test]
fn underrun_on_starved_ring_is_tolerated_and_recovers() {
    // A long file, so the ring can only underrun by the Producer genuinely
    // falling behind, not by reaching end-of-stream (which now keeps the
    // ring topped up with silence forever rather than starving it).
    let (mut player, mut ring) =
        Player::create(Box::new(ramp_decoder(1_000_000)), Box::new(NullOutput), fast_config())
            .unwrap();

    player.play().unwrap();

    let mut out = [9.0f32; 4];
    // Drain with no pacing delay, far faster than the Producer's decode +
    // wake round trip can refill, to force a genuine underrun.
    for _ in 0..10_000 {
        callback::fill(&mut out, &mut ring, player.state_cell(), player.metrics(), player.wake());
        if player.underruns() > 0 {
            break;
        }
    }

    assert!(player.underruns() > 0, "never saw an underrun, producer kept pace");

    // The player is still usable after an underrun: a fresh seek and play
    // recovers normal operation rather than wedging.
    player.seek(0, SeekFrom::Begin).unwrap();
    assert!(wait_until(
        || {
            callback::fill(&mut out, &mut ring, player.state_cell(), player.metrics(), player.wake());
            out[0] == 0.0 && out[1] == 1.0
        },
        Duration::from_secs(1)
    ));
}

#[test]
fn destroy_joins_the_producer_promptly() {
    let (mut player, _ring) =
        Player::create(Box::new(ramp_decoder(1_000_000)), Box::new(NullOutput), fast_config())
            .unwrap();

    player.play().unwrap();
    std::thread::sleep(Duration::from_millis(10));

    let start = Instant::now();
    player.destroy().expect("producer joins within its timeout");
    assert!(start.elapsed() < Duration::from_secs(2));
}
