//! Host frame loop
//!
//! Drives a running [`InputSession`] at a fixed frame rate until a controller
//! requests exit or the process is interrupted. Interruption is fed into the
//! session as the hardware exit signal, so every way out of the loop goes
//! through the same frame path.

use crate::controller::peripheral::Poller;
use crate::mapping::rapid::RapidCadence;
use crate::mapping::session::{Ended, InputSession, Running};
use crate::mapping::special::EmulatorHooks;
use crate::mapping::translator::FrameOutput;
use crate::persistence::HostConfig;
use chrono::{DateTime, Local};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Requests the session made to the emulation core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostRequest {
    MediaEject,
    MediaSelect,
    MediaInsert(Option<u8>),
    CoinInsert,
}

/// Hooks for running without an emulation core: every request is logged and
/// counted, only the most recent one is kept.
#[derive(Debug, Default)]
pub struct LoggingHooks {
    total: u64,
    last: Option<(DateTime<Local>, HostRequest)>,
}

impl LoggingHooks {
    fn record(&mut self, request: HostRequest) {
        info!("Core request: {:?}", request);
        self.total += 1;
        self.last = Some((Local::now(), request));
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn last(&self) -> Option<HostRequest> {
        self.last.map(|(_, request)| request)
    }

    pub fn last_at(&self) -> Option<DateTime<Local>> {
        self.last.map(|(at, _)| at)
    }
}

impl EmulatorHooks for LoggingHooks {
    fn request_media_eject(&mut self) {
        self.record(HostRequest::MediaEject);
    }

    fn request_media_select(&mut self) {
        self.record(HostRequest::MediaSelect);
    }

    fn request_media_insert(&mut self, slot: Option<u8>) {
        self.record(HostRequest::MediaInsert(slot));
    }

    fn request_coin_insert(&mut self) {
        self.record(HostRequest::CoinInsert);
    }
}

// Periodic frame statistics
struct FrameStats {
    frames: u64,
    active_frames: u64,
    last_log_time: DateTime<Local>,
    log_interval: chrono::Duration,
}

impl FrameStats {
    fn new(log_interval: chrono::Duration) -> Self {
        Self {
            frames: 0,
            active_frames: 0,
            last_log_time: Local::now(),
            log_interval,
        }
    }

    fn record(&mut self, output: &FrameOutput) {
        self.frames += 1;
        if output.ports.iter().any(|port| *port != 0) {
            self.active_frames += 1;
        }

        let now = Local::now();
        if now - self.last_log_time > self.log_interval {
            info!(
                "Frame loop stats: {} frames in last {} seconds (avg {:.2}/sec, {} with input)",
                self.frames,
                self.log_interval.num_seconds(),
                self.frames as f64 / self.log_interval.num_seconds() as f64,
                self.active_frames
            );
            self.frames = 0;
            self.active_frames = 0;
            self.last_log_time = now;
        }
    }
}

/// Cancels `token` on Ctrl-C.
pub fn spawn_ctrl_c_listener(token: CancellationToken) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                match result {
                    Ok(()) => info!("Ctrl-C received, requesting exit"),
                    Err(e) => info!("Unable to listen for Ctrl-C: {}", e),
                }
                token.cancel();
            }
            _ = token.cancelled() => {}
        }
    })
}

/// Runs frames until exit is requested, then ends the session.
pub async fn run_frame_loop<P, H>(
    mut session: InputSession<Running>,
    poller: &mut P,
    hooks: &mut H,
    config: &HostConfig,
    shutdown: CancellationToken,
) -> InputSession<Ended>
where
    P: Poller + ?Sized,
    H: EmulatorHooks + ?Sized,
{
    let frame_rate = config.frame_rate.max(1);
    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / frame_rate as f64));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut cadence = RapidCadence::new(config.rapid_period);
    let mut stats = FrameStats::new(chrono::Duration::seconds(10));

    info!(
        "Starting frame loop for {} at {} fps",
        session.system(),
        frame_rate
    );

    loop {
        interval.tick().await;

        let is_rapid_frame = cadence.tick();
        let hardware_exit = shutdown.is_cancelled();
        let output = session.process_frame(poller, is_rapid_frame, hardware_exit, hooks);
        stats.record(&output);

        if output.exit_requested {
            debug!("Exit requested on frame {}", session.frames());
            break;
        }
    }

    shutdown.cancel();
    session.end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::peripheral::{ExpansionDescriptor, RawSample, SlotSample, StickPair};
    use crate::controller::raw;
    use crate::mapping::direction::Rotation;
    use crate::mapping::system::{MediaKind, TargetSystem};

    // Presses HOME on slot 0 during the given frame
    struct ExitAfter {
        frame: u32,
        current: u32,
        held: u32,
    }

    impl Poller for ExitAfter {
        fn scan(&mut self) {
            self.current += 1;
        }

        fn sample(&mut self, slot: usize) -> SlotSample {
            let pressed = if slot == 0 && self.current == self.frame {
                raw::MOTE_HOME
            } else {
                0
            };
            SlotSample {
                primary: RawSample::from_descriptor(
                    ExpansionDescriptor::NONE,
                    pressed,
                    self.held | pressed,
                    StickPair::CENTER,
                    StickPair::CENTER,
                ),
                alternate: None,
            }
        }
    }

    fn session(media: MediaKind) -> InputSession<Running> {
        let system = TargetSystem::Nes;
        let table = system.profile().default_table().unwrap();
        InputSession::create(system, table, Rotation::Rotate0, media)
            .unwrap()
            .start()
    }

    fn fast_config() -> HostConfig {
        HostConfig {
            frame_rate: 1000,
            ..HostConfig::default()
        }
    }

    #[test]
    fn logging_hooks_record_requests() {
        let mut hooks = LoggingHooks::default();
        assert_eq!(hooks.last(), None);

        hooks.request_media_eject();
        hooks.request_media_insert(Some(1));
        assert_eq!(hooks.total(), 2);
        assert_eq!(hooks.last(), Some(HostRequest::MediaInsert(Some(1))));
        assert!(hooks.last_at().is_some());
    }

    #[test]
    fn logging_hooks_keep_only_the_latest_request() {
        let mut hooks = LoggingHooks::default();
        for _ in 0..10_000 {
            hooks.request_coin_insert();
        }
        hooks.request_media_select();

        assert_eq!(hooks.total(), 10_001);
        assert_eq!(hooks.last(), Some(HostRequest::MediaSelect));
    }

    #[tokio::test]
    async fn home_press_ends_loop() {
        let mut poller = ExitAfter {
            frame: 5,
            current: 0,
            held: 0,
        };
        let mut hooks = LoggingHooks::default();
        let token = CancellationToken::new();

        let ended = run_frame_loop(
            session(MediaKind::Cartridge),
            &mut poller,
            &mut hooks,
            &fast_config(),
            token.clone(),
        )
        .await;

        assert_eq!(ended.frames(), 5);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn cancellation_is_a_hardware_exit() {
        let mut poller = ExitAfter {
            frame: u32::MAX,
            current: 0,
            held: 0,
        };
        let mut hooks = LoggingHooks::default();
        let token = CancellationToken::new();
        token.cancel();

        let ended = run_frame_loop(
            session(MediaKind::Cartridge),
            &mut poller,
            &mut hooks,
            &fast_config(),
            token,
        )
        .await;

        assert_eq!(ended.frames(), 1);
    }

    #[tokio::test]
    async fn arcade_coin_reaches_hooks() {
        let mut poller = ExitAfter {
            frame: 3,
            current: 0,
            held: raw::MOTE_A,
        };
        let mut hooks = LoggingHooks::default();

        run_frame_loop(
            session(MediaKind::Arcade),
            &mut poller,
            &mut hooks,
            &fast_config(),
            CancellationToken::new(),
        )
        .await;

        assert_eq!(hooks.total(), 1);
        assert_eq!(hooks.last(), Some(HostRequest::CoinInsert));
    }
}
