//! Terminal setup and the merged input/redraw event stream.
//!
//! `Tui` owns the raw-mode terminal. Redraw requests go through a
//! [`FrameRequester`]; a background task coalesces bursts of requests (one
//! per stage record during a run) into a single draw.

use std::io::{stdout, Stdout};
use std::pin::Pin;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste, Event, KeyEvent};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::select;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};
use tokio_stream::{Stream, StreamExt};

pub type TerminalBackend = CrosstermBackend<Stdout>;

/// Input the app loop reacts to.
#[derive(Debug)]
pub enum TuiEvent {
    Key(KeyEvent),
    /// Text from a bracketed paste.
    Paste(String),
    /// A coalesced redraw (also emitted on resize).
    Draw,
}

pub struct Tui {
    terminal: Terminal<TerminalBackend>,
    frame_tx: mpsc::UnboundedSender<Instant>,
    draw_tx: broadcast::Sender<()>,
}

impl Tui {
    /// Enter raw mode and the alternate screen.
    pub fn init() -> Result<Self> {
        enable_raw_mode()?;
        execute!(stdout(), EnableBracketedPaste, EnterAlternateScreen)?;
        install_panic_hook();

        let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let (draw_tx, _) = broadcast::channel(1);
        tokio::spawn(coalesce_frames(frame_rx, draw_tx.clone()));

        Ok(Self {
            terminal,
            frame_tx,
            draw_tx,
        })
    }

    pub fn restore(&mut self) -> Result<()> {
        restore_terminal()
    }

    pub fn frame_requester(&self) -> FrameRequester {
        FrameRequester {
            frame_tx: self.frame_tx.clone(),
        }
    }

    /// Key presses, pastes and redraws as one stream.
    pub fn event_stream(&self) -> Pin<Box<dyn Stream<Item = TuiEvent> + Send + 'static>> {
        let mut input = crossterm::event::EventStream::new();
        let mut draw_rx = self.draw_tx.subscribe();

        Box::pin(async_stream::stream! {
            loop {
                select! {
                    Some(Ok(event)) = input.next() => match event {
                        Event::Key(key) => yield TuiEvent::Key(key),
                        Event::Paste(text) => yield TuiEvent::Paste(text),
                        Event::Resize(_, _) => yield TuiEvent::Draw,
                        _ => {}
                    },
                    result = draw_rx.recv() => match result {
                        Ok(()) | Err(RecvError::Lagged(_)) => yield TuiEvent::Draw,
                        Err(RecvError::Closed) => break,
                    },
                }
            }
        })
    }

    pub fn draw<F>(&mut self, render: F) -> Result<()>
    where
        F: FnOnce(&mut ratatui::Frame),
    {
        self.terminal.draw(render)?;
        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// Cloneable handle for requesting a redraw.
#[derive(Clone, Debug)]
pub struct FrameRequester {
    frame_tx: mpsc::UnboundedSender<Instant>,
}

impl FrameRequester {
    pub fn schedule_frame(&self) {
        let _ = self.frame_tx.send(Instant::now());
    }
}

/// Emit one draw per deadline, keeping only the earliest pending request.
async fn coalesce_frames(
    mut frame_rx: mpsc::UnboundedReceiver<Instant>,
    draw_tx: broadcast::Sender<()>,
) {
    let mut deadline: Option<Instant> = None;

    loop {
        let wake = deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));
        let sleep = tokio::time::sleep_until(tokio::time::Instant::from_std(wake));
        tokio::pin!(sleep);

        select! {
            requested = frame_rx.recv() => match requested {
                Some(at) => {
                    deadline = Some(deadline.map_or(at, |d| d.min(at)));
                }
                None => break,
            },
            _ = &mut sleep => {
                if deadline.take().is_some() {
                    let _ = draw_tx.send(());
                }
            }
        }
    }
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), DisableBracketedPaste, LeaveAlternateScreen)?;
    Ok(())
}

/// Restore the terminal before the default panic output is printed.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));
}
