mod control_loop;

use crate::{ActorSettings, MasterMessage, MasterThreadMessage};
use agent::DqnAgent;
pub use control_loop::ControlLoop;
use control_loop::TickTiming;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use game_client::HttpGameClient;
use std::time::Instant;

const THREAD_NAME: &str = "env";

enum ThreadMode {
    Running,
    Held,
}

enum Flow {
    Continue(MasterThreadMessage),
    Close(MasterThreadMessage),
}

/// Everything that can fail at startup happens here, before any thread runs.
pub fn build_control_loop(
    settings: &ActorSettings,
) -> anyhow::Result<ControlLoop<HttpGameClient>> {
    use anyhow::Context;

    let server = HttpGameClient::new(&settings.server.url, settings.server.request_timeout())
        .context("building game server client")?;
    let mut agent = DqnAgent::new(&settings.agent).context("building agent")?;
    if settings.serve {
        let loaded = agent
            .load_checkpoint(&settings.checkpoint.path)
            .context("loading checkpoint for serving")?;
        if !loaded {
            tracing::warn!("nothing to serve, training from fresh weights instead");
        }
    }
    tracing::info!(url = %settings.server.url, serve = settings.serve, "control loop ready");
    Ok(ControlLoop::new(server, agent, settings))
}

fn handle(
    message: MasterMessage,
    mode: &mut ThreadMode,
    control_loop: &mut ControlLoop<HttpGameClient>,
) -> Flow {
    match message {
        MasterMessage::Save(path) => Flow::Continue(match control_loop.save(&path) {
            Ok(()) => MasterThreadMessage::Done,
            Err(err) => MasterThreadMessage::Failed(err.to_string()),
        }),
        MasterMessage::Load(path) => Flow::Continue(match control_loop.load(&path) {
            Ok(true) => MasterThreadMessage::Done,
            Ok(false) => MasterThreadMessage::Answer(format!(
                "no checkpoint at {}, keeping current weights",
                path.display()
            )),
            Err(err) => MasterThreadMessage::Failed(err.to_string()),
        }),
        MasterMessage::Hold => {
            *mode = ThreadMode::Held;
            control_loop.forget_previous();
            Flow::Continue(MasterThreadMessage::Done)
        }
        MasterMessage::Resume => {
            if let ThreadMode::Held = mode {
                control_loop.check_health();
            }
            *mode = ThreadMode::Running;
            Flow::Continue(MasterThreadMessage::Done)
        }
        MasterMessage::Query(query) => {
            Flow::Continue(MasterThreadMessage::Answer(control_loop.answer(query)))
        }
        MasterMessage::Close => {
            control_loop.save_on_close();
            Flow::Close(MasterThreadMessage::Done)
        }
    }
}

fn run(
    control_loop: &mut ControlLoop<HttpGameClient>,
    receiver: &Receiver<MasterMessage>,
    master_thread_sender: &Sender<MasterThreadMessage>,
    timing: &TickTiming,
) {
    let mut mode = ThreadMode::Held;
    loop {
        let message = match mode {
            ThreadMode::Held => match receiver.recv() {
                Ok(message) => message,
                Err(_) => break,
            },
            ThreadMode::Running => {
                let started = Instant::now();
                let outcome = match control_loop.step() {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        tracing::error!(%err, "{THREAD_NAME} thread: unrecoverable error");
                        std::process::exit(1);
                    }
                };
                match receiver.recv_timeout(outcome.delay(timing, started.elapsed())) {
                    Ok(message) => message,
                    Err(RecvTimeoutError::Timeout) => continue,
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        };
        match handle(message, &mut mode, control_loop) {
            Flow::Continue(reply) => {
                if master_thread_sender.send(reply).is_err() {
                    break;
                }
            }
            Flow::Close(reply) => {
                let _ = master_thread_sender.send(reply);
                break;
            }
        }
    }
}

pub fn spawn_env_thread(
    receiver: Receiver<MasterMessage>,
    master_thread_sender: Sender<MasterThreadMessage>,
    mut control_loop: ControlLoop<HttpGameClient>,
    settings: &ActorSettings,
) -> std::thread::JoinHandle<()> {
    let timing = TickTiming::from(&settings.server);
    std::thread::spawn(move || {
        run(&mut control_loop, &receiver, &master_thread_sender, &timing);
        tracing::info!("{THREAD_NAME} thread: closed");
    })
}
