mod master;

pub use master::{Master, MasterMessage, MasterThreadMessage, Query};
use master::{Command, CommandError, Mode};
use std::thread::JoinHandle;

fn report(result: Result<Option<String>, CommandError>, mode: Mode) {
    match result {
        Ok(Some(answer)) => println!("{answer}"),
        Ok(None) => println!("ok"),
        Err(CommandError::ModeMatch) => {
            let mode = match mode {
                Mode::Running => "running",
                Mode::Held => "hold",
            };
            eprintln!("command cannot be executed in {mode} mode");
        }
        Err(CommandError::EnvGone) => eprintln!("control loop is no longer running"),
        Err(CommandError::Failed(reason)) => eprintln!("command failed: {reason}"),
    }
}

pub fn spawn_master_thread(mut master: Master, activate: bool) -> JoinHandle<()> {
    std::thread::spawn(move || {
        if activate {
            let result = master.resume();
            report(result, master.mode());
        }

        loop {
            let mut line = String::new();
            match std::io::stdin().read_line(&mut line) {
                Ok(0) => {
                    tracing::info!("stdin closed, control loop keeps running");
                    master.wait();
                    break;
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::error!(%err, "could not read commands, control loop keeps running");
                    master.wait();
                    break;
                }
            }
            let Some(command) = Command::parse(&line) else {
                println!("invalid command");
                continue;
            };
            let result = match command {
                Command::Save(path) => master.save(path),
                Command::Load(path) => master.load(path),
                Command::Hold => master.hold(),
                Command::Resume => master.resume(),
                Command::Query(query) => master.query(query),
                Command::Close => {
                    if let Err(CommandError::Failed(reason)) = master.close() {
                        eprintln!("close failed: {reason}");
                    }
                    break;
                }
            };
            report(result, master.mode());
        }
    })
}
