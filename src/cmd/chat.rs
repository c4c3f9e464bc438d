//! The interactive chat loop.

use anyhow::Result;
use std::io::{BufRead, Write};

use stepgate::config::StepgateConfig;
use stepgate::engine::Engine;
use stepgate::store::LockManager;

pub async fn cmd_chat(config: StepgateConfig) -> Result<()> {
    println!();
    println!("{}", console::style("stepgate").bold());
    println!("{}", console::style("Type 'exit' to quit.").dim());
    println!();

    let lock_owner = config.lock_owner.clone();
    let mut engine = Engine::new(config);
    let mut held_lock: Option<LockManager> = None;

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    let mut line = String::new();
    loop {
        print!("> ");
        stdout.flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            break;
        }

        let turn = engine.handle_turn(input).await?;
        println!("{}", turn.text);

        // Take the advisory lock once a project is settled on; drop it again
        // if the conversation walks away from the project.
        match engine.project() {
            Some(paths) if held_lock.is_none() && !engine.pending_reuse() => {
                let manager = LockManager::for_project(paths);
                manager.acquire(&lock_owner)?;
                held_lock = Some(manager);
            }
            None => {
                if let Some(manager) = held_lock.take() {
                    manager.release()?;
                }
            }
            _ => {}
        }
    }

    if let Some(manager) = held_lock.take() {
        manager.release()?;
    }
    println!("{}", console::style("Session ended.").dim());
    Ok(())
}
