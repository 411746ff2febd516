use anyhow::Result;

use polychat::app::App;
use polychat::capability::CapabilitySlot;
use polychat::config::Config;
use polychat::readiness::ReadinessMonitor;
use polychat::tui::{self, EventHandler};
use polychat::{handler, ui};

#[tokio::main]
async fn main() -> Result<()> {
    tui::install_panic_hook();

    let config = Config::load().unwrap_or_else(|_| Config::new());

    // The embedding host installs its chat service here; when nothing is
    // installed, dispatch falls back to the offline demo responder.
    let capability = CapabilitySlot::new();

    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(capability.clone(), events.sender(), config);
    let monitor = ReadinessMonitor::spawn(capability, events.sender());

    let result = run(&mut terminal, &mut app, &mut events).await;

    // Cancels the probe interval and the forced-ready deadline.
    drop(monitor);
    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event)?;

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
