//! A simple program demonstrates how to use `storybeat` as a library.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use storybeat::core::{EngineError, EngineEvent};
use storybeat::{StoryBuilder, StoryConfig};
use tokio::io::{self, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc;
use tokio::time::sleep;

enum DemoEvent {
    Delta(String),
    Engine(EngineEvent),
}

const BAR_CHAR: &str = "▎";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = match StoryConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };

    let theme = env::args().skip(1).collect::<Vec<_>>().join(" ");
    let theme = if theme.trim().is_empty() {
        print!("Theme: ");
        flush_stdout();
        let Some(line) = read_line().await else {
            return;
        };
        line.trim().to_owned()
    } else {
        theme
    };

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let engine = StoryBuilder::with_config(theme, config)
        .on_delta({
            let event_tx = event_tx.clone();
            move |delta: &str| {
                event_tx.send(DemoEvent::Delta(delta.to_owned())).ok();
            }
        })
        .on_event(move |event| {
            event_tx.send(DemoEvent::Engine(event)).ok();
        })
        .build();

    if let Err(err) = engine.start().await {
        eprintln!("{err}");
        return;
    }

    let mut awaiting_turn = true;
    loop {
        if awaiting_turn {
            if !wait_for_turn(&mut event_rx).await {
                break;
            }
            // Illustrations usually arrive shortly after the narrative.
            sleep(Duration::from_millis(300)).await;
        }
        while let Ok(event) = event_rx.try_recv() {
            if let DemoEvent::Engine(event) = event {
                print_event(event);
            }
        }

        print!(
            "{} > ",
            engine.snapshot().elapsed_label(Instant::now()).dimmed()
        );
        flush_stdout();
        let Some(line) = read_line().await else {
            break;
        };

        let result = if engine.snapshot().transcript.is_empty() {
            // The opening beat failed, try again.
            engine.start().await
        } else {
            engine.submit(user_input(&line)).await.map(|_| ())
        };
        match result {
            Ok(()) => awaiting_turn = true,
            Err(EngineError::EmptyInput) => {
                println!("Type something to continue the story.");
                awaiting_turn = false;
            }
            Err(err) => {
                eprintln!("{err}");
                break;
            }
        }
    }
}

/// Renders the narrative reply as it streams, until the turn completes or
/// fails. Returns `false` if the engine has gone away.
async fn wait_for_turn(
    event_rx: &mut mpsc::UnboundedReceiver<DemoEvent>,
) -> bool {
    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .map(|style| style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"))
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let mut progress_bar = None;
    let mut streamed = false;

    loop {
        if !streamed {
            progress_bar
                .get_or_insert_with(|| {
                    let progress_bar = ProgressBar::new_spinner();
                    progress_bar.set_style(progress_style.clone());
                    progress_bar.set_message("📖 Writing...");
                    progress_bar
                })
                .inc(1);
        }

        let sleep = sleep(Duration::from_millis(100));
        let event = select! {
            event = event_rx.recv() => {
                let Some(event) = event else {
                    return false;
                };
                event
            },
            _ = sleep => {
                continue;
            }
        };

        // Finish the progress bar before printing anything else.
        if let Some(progress_bar) = progress_bar.take() {
            progress_bar.finish_and_clear();
        }
        match event {
            DemoEvent::Delta(delta) => {
                if !streamed {
                    streamed = true;
                    print!("{}📖 ", BAR_CHAR.bright_cyan());
                }
                print!("{}", delta.bright_white());
                flush_stdout();
            }
            DemoEvent::Engine(event) => {
                let turn_ended = matches!(
                    event,
                    EngineEvent::TurnCompleted(_)
                        | EngineEvent::NarrativeFailed(_)
                );
                if turn_ended && streamed {
                    println!();
                }
                print_event(event);
                if turn_ended {
                    return true;
                }
            }
        }
    }
}

fn print_event(event: EngineEvent) {
    match event {
        EngineEvent::TurnCompleted(id) => {
            debug!("turn completed as {id}");
        }
        EngineEvent::NarrativeFailed(err) => {
            println!(
                "{}⚠️  The story could not continue: {}",
                BAR_CHAR.bright_yellow(),
                err.message()
            );
        }
        EngineEvent::IllustrationUpdated(url) => {
            println!("{}🖼  {}", BAR_CHAR.bright_magenta(), url.underline());
        }
    }
}

/// Strips the line terminator, keeping the rest of the input verbatim.
fn user_input(line: &str) -> &str {
    line.trim_end_matches(['\r', '\n'])
}

fn flush_stdout() {
    if let Err(err) = std::io::stdout().flush() {
        warn!("failed to flush stdout: {err}");
    }
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(count) => {
            if count == 0 {
                return None;
            }
            Some(line)
        }
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_input() {
        assert_eq!(user_input("  go left \n"), "  go left ");
        assert_eq!(user_input("A\r\n"), "A");
        assert_eq!(user_input("\n"), "");
        assert_eq!(user_input("no newline"), "no newline");
    }
}
