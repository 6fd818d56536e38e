pub(crate) mod bootstrap;
mod console;
mod save;

use std::any::Any;
use std::io::{self, BufRead};
use std::panic::{catch_unwind, AssertUnwindSafe};

use engine::Session;
use tracing::{error, info};

use bootstrap::AppWiring;
use console::{Console, ConsoleAction};

enum AppState {
    MainMenu,
    InGame { session: Session, console: Console },
}

enum Transition {
    Stay,
    Quit,
    To(AppState),
}

const MENU_TEXT: &str = "\
=== Hexfall ===
  start - begin the campaign
  load  - restore the quicksave
  quit  - leave";

/// The main line-driven loop. Every in-game step runs under catch_unwind:
/// an unexpected panic is logged and collapses back to the main menu
/// instead of taking the process down.
pub(crate) fn run(wiring: AppWiring) {
    let mut state = AppState::MainMenu;
    println!("{MENU_TEXT}");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let Ok(line) = line else {
            break;
        };
        let transition = match &mut state {
            AppState::MainMenu => handle_menu_line(&wiring, &line),
            AppState::InGame { session, console } => {
                handle_game_line(&wiring, session, console, &line)
            }
        };
        match transition {
            Transition::Stay => {}
            Transition::Quit => break,
            Transition::To(next) => {
                if matches!(next, AppState::MainMenu) {
                    println!("{MENU_TEXT}");
                }
                state = next;
            }
        }
    }
    info!("shutting_down");
}

fn handle_menu_line(wiring: &AppWiring, line: &str) -> Transition {
    match line.trim().to_ascii_lowercase().as_str() {
        "" => Transition::Stay,
        "start" => match bootstrap::new_session(wiring) {
            Ok(session) => enter_game(session),
            Err(message) => {
                error!(error = message.as_str(), "session_build_failed");
                println!("could not start: {message}");
                Transition::Stay
            }
        },
        "load" => match save::load_game(wiring, &wiring.paths.saves_dir.join(save::QUICKSAVE_FILE))
        {
            Ok(session) => enter_game(session),
            Err(message) => {
                println!("could not load: {message}");
                Transition::Stay
            }
        },
        "quit" => Transition::Quit,
        _ => {
            println!("start, load, or quit");
            Transition::Stay
        }
    }
}

fn enter_game(session: Session) -> Transition {
    println!("type 'help' for commands");
    Transition::To(AppState::InGame {
        session,
        console: Console::new(),
    })
}

fn handle_game_line(
    wiring: &AppWiring,
    session: &mut Session,
    console: &mut Console,
    line: &str,
) -> Transition {
    let step = catch_unwind(AssertUnwindSafe(|| console.handle_line(session, line)));
    let response = match step {
        Ok(response) => response,
        Err(payload) => {
            error!(
                panic = panic_message(payload.as_ref()).as_str(),
                "action_loop_panicked_returning_to_menu"
            );
            println!("something went wrong; returning to the main menu");
            return Transition::To(AppState::MainMenu);
        }
    };

    if !response.text.is_empty() {
        println!("{}", response.text);
    }
    match response.action {
        ConsoleAction::None => Transition::Stay,
        ConsoleAction::Quit => Transition::Quit,
        ConsoleAction::ToMenu => Transition::To(AppState::MainMenu),
        ConsoleAction::Save => {
            let path = wiring.paths.saves_dir.join(save::QUICKSAVE_FILE);
            match save::save_game(session, &path) {
                Ok(()) => println!("saved to {}", path.display()),
                Err(message) => println!("could not save: {message}"),
            }
            Transition::Stay
        }
        ConsoleAction::Load => {
            let path = wiring.paths.saves_dir.join(save::QUICKSAVE_FILE);
            match save::load_game(wiring, &path) {
                Ok(loaded) => {
                    println!("loaded {}", path.display());
                    Transition::To(AppState::InGame {
                        session: loaded,
                        console: Console::new(),
                    })
                }
                Err(message) => {
                    println!("could not load: {message}");
                    Transition::Stay
                }
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        String::from("unknown panic payload")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_extracts_both_payload_shapes() {
        let boxed: Box<dyn Any + Send> = Box::new("static message");
        assert_eq!(panic_message(boxed.as_ref()), "static message");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned message"));
        assert_eq!(panic_message(boxed.as_ref()), "owned message");
        let boxed: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic payload");
    }
}
