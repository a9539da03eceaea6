//! SpinCab - a terminal slot cabinet
//!
//! Wires the deterministic game core to a host timer, stdin buttons,
//! file-backed flash regions, and an ANSI panel. Commands: `b` cycles
//! the bet, `s` spins, `a` toggles autoplay, `q` quits.

mod autoplay;
mod term;

use std::io::BufRead;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Context;
use crossbeam_channel::{Sender, select, tick, unbounded};
use parking_lot::Mutex;

use sc_engine::{ButtonLatch, Buttons, CabinetConfig, FrameHandoff, RenderModel, SlotMachine};
use sc_flash::{FileRegion, RecordStore, SEGMENT_LEN, StoreError};

use crate::autoplay::Autoplayer;
use crate::term::TermSurface;

const CONFIG_PATH: &str = "spincab.json";
const REGION_A: &str = "spincab-a.nvm";
const REGION_B: &str = "spincab-b.nvm";

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Starting SpinCab...");

    let config = load_config()?;
    let period = Duration::from_millis(config.tick_ms);

    let primary = FileRegion::open(REGION_A, SEGMENT_LEN).context("opening primary region")?;
    let secondary = FileRegion::open(REGION_B, SEGMENT_LEN).context("opening secondary region")?;
    let store = RecordStore::new(primary, secondary, config.max_balance)?;

    let machine = Arc::new(Mutex::new(SlotMachine::boot(config, store)?));
    let latch = Arc::new(ButtonLatch::new());
    let handoff = Arc::new(FrameHandoff::new());
    let autoplayer = Arc::new(Autoplayer::new());
    let running = Arc::new(AtomicBool::new(true));
    let fault: Arc<Mutex<Option<StoreError>>> = Arc::new(Mutex::new(None));

    // first frame before the timer starts
    handoff.publish(machine.lock().frame());

    let (shutdown_tx, shutdown_rx) = unbounded::<()>();

    let ticker = {
        let machine = Arc::clone(&machine);
        let latch = Arc::clone(&latch);
        let handoff = Arc::clone(&handoff);
        let autoplayer = Arc::clone(&autoplayer);
        let running = Arc::clone(&running);
        let fault = Arc::clone(&fault);
        std::thread::spawn(move || {
            let ticks = tick(period);
            loop {
                select! {
                    recv(ticks) -> _ => {
                        let mut machine = machine.lock();
                        autoplayer.drive(machine.session().phase, &latch);
                        match machine.tick(&latch) {
                            Ok(report) => {
                                if report.redraw {
                                    handoff.publish(machine.frame());
                                }
                            }
                            Err(err) => {
                                log::error!("storage fault, stopping the cabinet: {err}");
                                *fault.lock() = Some(err);
                                running.store(false, Ordering::Relaxed);
                                break;
                            }
                        }
                    }
                    recv(shutdown_rx) -> _ => break,
                }
            }
        })
    };

    // never joined: it blocks on stdin until the process exits
    let _input = spawn_input(
        Arc::clone(&latch),
        Arc::clone(&autoplayer),
        Arc::clone(&running),
        shutdown_tx,
    );

    let mut surface = TermSurface::new();
    while running.load(Ordering::Relaxed) {
        if let Some(frame) = handoff.take() {
            frame.draw(&mut surface);
            surface.set_footer(&footer_line(&frame));
            surface.flush().context("painting the panel")?;
        }
        std::thread::sleep(Duration::from_millis(25));
    }

    let _ = ticker.join();
    if let Some(err) = fault.lock().take() {
        return Err(err).context("cabinet halted on a storage fault");
    }
    log::info!("SpinCab stopped");
    Ok(())
}

fn spawn_input(
    latch: Arc<ButtonLatch>,
    autoplayer: Arc<Autoplayer>,
    running: Arc<AtomicBool>,
    shutdown_tx: Sender<()>,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match line.trim() {
                "b" => {
                    latch.press(Buttons::BET);
                }
                "s" => {
                    latch.press(Buttons::SPIN);
                }
                "a" => {
                    let on = autoplayer.toggle();
                    log::info!("autoplay {}", if on { "on" } else { "off" });
                }
                "q" => {
                    running.store(false, Ordering::Relaxed);
                    let _ = shutdown_tx.send(());
                    break;
                }
                "" => {}
                other => log::warn!("unknown command {other:?} (use b, s, a or q)"),
            }
        }
    })
}

fn load_config() -> anyhow::Result<CabinetConfig> {
    let path = Path::new(CONFIG_PATH);
    if path.exists() {
        let json =
            std::fs::read_to_string(path).with_context(|| format!("reading {CONFIG_PATH}"))?;
        let config =
            CabinetConfig::from_json(&json).with_context(|| format!("parsing {CONFIG_PATH}"))?;
        log::info!("loaded config from {CONFIG_PATH}");
        Ok(config)
    } else {
        let config = CabinetConfig::default();
        match config.to_json() {
            Ok(json) => {
                if let Err(err) = std::fs::write(path, json) {
                    log::warn!("could not write default {CONFIG_PATH}: {err}");
                } else {
                    log::info!("wrote default config to {CONFIG_PATH}");
                }
            }
            Err(err) => log::warn!("could not serialize default config: {err}"),
        }
        Ok(config)
    }
}

fn footer_line(frame: &RenderModel) -> String {
    let led = |on: bool| if on { "(*)" } else { "( )" };
    format!(
        "{} {}   spins {}   hit {:.0}%   [s]pin [b]et [a]uto [q]uit",
        led(frame.leds.led1),
        led(frame.leds.led2),
        frame.stats.spins,
        frame.stats.hit_rate() * 100.0,
    )
}
