use anyhow::{Context, Result};
use arboard::Clipboard;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState};
use hark::config_ext::ConfigExt;
use hark::event::{HarkEvent, ProxySink};
use hark::icon::StateIcon;
use hark::menu::{MenuAction, MeterMenu, tooltip};
use hark::{
    CaptureSession, ConfigManager, DEFAULT_LOG_LEVEL, LevelDisplay, RunningController,
    RunningState,
};
use tao::event::{Event, StartCause};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tray_icon::menu::MenuEvent;
use tray_icon::{TrayIcon, TrayIconBuilder};

fn main() -> Result<()> {
    // Initialize the logger
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("HARK_LOG")
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL)),
        )
        .init();

    // Load config
    let config_manager = ConfigManager::new()?;
    let config = config_manager.load()?;
    // save back the config to create the file if it doesn't exist
    config_manager.save(&config)?;

    // Set up hotkey
    let hotkey = config.hotkey();
    let hotkey_manager = GlobalHotKeyManager::new().context("Failed to create hotkey manager")?;
    hotkey_manager
        .register(hotkey)
        .context("Failed to register hotkey")?;

    let event_loop: EventLoop<HarkEvent> = EventLoopBuilder::with_user_event().build();
    let event_sender = event_loop.create_proxy();

    // Menu and hotkey events are forwarded into the loop so they wake it up.
    let menu_sender = event_sender.clone();
    MenuEvent::set_event_handler(Some(move |event| {
        menu_sender.send_event(HarkEvent::Menu(event)).ok();
    }));
    let hotkey_sender = event_sender.clone();
    GlobalHotKeyEvent::set_event_handler(Some(move |event| {
        hotkey_sender.send_event(HarkEvent::HotKey(event)).ok();
    }));

    // Levels are produced on the audio thread and posted to this one.
    let session = CaptureSession::new(&config, ProxySink::new(event_sender));
    let mut controller = RunningController::new(session);
    let mut display = LevelDisplay::new(config.display_precision);

    let meter_menu = MeterMenu::new(&display, controller.state())?;
    let mut icon_tray: Option<TrayIcon> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::NewEvents(StartCause::Init) => {
                // We create the icon once the event loop is actually running
                // to prevent issues like https://github.com/tauri-apps/tray-icon/issues/90
                icon_tray.replace(
                    TrayIconBuilder::new()
                        .with_menu(Box::new(meter_menu.menu().clone()))
                        .with_tooltip(tooltip(&display))
                        .with_icon(RunningState::Stopped.icon())
                        .build()
                        .expect("Failed to build tray icon"),
                );

                // We have to request a redraw here to have the icon actually show up.
                // Tao only exposes a redraw method on the Window so we use core-foundation directly.
                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};

                    let rl = CFRunLoopGetMain();
                    CFRunLoopWakeUp(rl);
                }

                if config.start_on_launch {
                    toggle(&mut controller, &meter_menu, icon_tray.as_ref());
                }

                info!("Hark ready");
            }
            Event::UserEvent(HarkEvent::Level(level)) => {
                if display.apply(level) {
                    meter_menu.render_levels(&display);
                    if let Some(tray) = icon_tray.as_ref() {
                        tray.set_tooltip(Some(tooltip(&display))).ok();
                    }
                }
            }
            Event::UserEvent(HarkEvent::Menu(event)) => match meter_menu.action(event.id()) {
                Some(MenuAction::Toggle) => {
                    toggle(&mut controller, &meter_menu, icon_tray.as_ref());
                }
                Some(MenuAction::CopyConfigPath) => {
                    let path = config_manager.config_path().to_string_lossy().into_owned();
                    if let Err(e) = Clipboard::new().and_then(|mut c| c.set_text(path)) {
                        error!("Failed to copy config path to clipboard: {}", e);
                    }
                }
                Some(MenuAction::Quit) => {
                    controller.set(RunningState::Stopped);
                    icon_tray.take();
                    *control_flow = ControlFlow::Exit;
                }
                None => {}
            },
            Event::UserEvent(HarkEvent::HotKey(event)) => {
                if event.id() == hotkey.id() && event.state() == HotKeyState::Pressed {
                    toggle(&mut controller, &meter_menu, icon_tray.as_ref());
                }
            }
            _ => {}
        }
    });
}

/// Flip the running state and re-render everything that depends on it.
fn toggle(
    controller: &mut RunningController<CaptureSession>,
    meter_menu: &MeterMenu,
    icon_tray: Option<&TrayIcon>,
) {
    let state = controller.toggle();
    meter_menu.render_state(state);
    if let Some(tray) = icon_tray {
        if let Err(e) = tray.set_icon(Some(state.icon())) {
            error!("Failed to update tray icon: {}", e);
        }
    }
}
