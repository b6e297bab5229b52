use std::path::Path;
use std::sync::LazyLock;

use hark_core::RunningState;

const COLOR_RUNNING: (u8, u8, u8) = (50, 215, 75);
pub const ICON_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/icon.png");

static ICON: LazyLock<tray_icon::Icon> = LazyLock::new(|| load_icon(ICON_PATH, None));
static ICON_RUNNING: LazyLock<tray_icon::Icon> =
    LazyLock::new(|| load_icon(ICON_PATH, Some(COLOR_RUNNING)));

/// Tray icon for each running state.
pub trait StateIcon {
    fn icon(&self) -> tray_icon::Icon;
}

impl StateIcon for RunningState {
    fn icon(&self) -> tray_icon::Icon {
        match self {
            RunningState::Stopped => ICON.clone(),
            RunningState::Running => ICON_RUNNING.clone(),
        }
    }
}

fn load_icon(path: impl AsRef<Path>, recolor: Option<(u8, u8, u8)>) -> tray_icon::Icon {
    let (icon_rgba, icon_width, icon_height) = {
        let mut image = image::open(path)
            .expect("Failed to open icon path")
            .into_rgba8();

        // Only the alpha channel carries the shape.
        if let Some((r, g, b)) = recolor {
            for pixel in image.pixels_mut() {
                pixel[0] = r;
                pixel[1] = g;
                pixel[2] = b;
            }
        }

        let (width, height) = image.dimensions();
        (image.into_raw(), width, height)
    };
    tray_icon::Icon::from_rgba(icon_rgba, icon_width, icon_height).expect("Failed to open icon")
}
