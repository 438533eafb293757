//! Two windows paced independently on one thread.
//!
//! The main window renders at 60 fps in the foreground and 10 fps otherwise.
//! Press N in the main window to open a slow on-demand window, Escape to
//! close everything.
//!
//! Run with: cargo run -p kestrel --example two_windows

use kestrel::core::logging;
use kestrel::prelude::*;
use kestrel::winit::WinitPlatform;

#[derive(Default)]
struct Spinner {
    angle: f32,
}

impl ApplicationListener for Spinner {
    fn create(&mut self, ctx: &mut WindowContext<'_>) -> anyhow::Result<()> {
        tracing::info!(window = ctx.label(), "spinner created");
        Ok(())
    }

    fn resize(&mut self, ctx: &mut WindowContext<'_>, width: u32, height: u32) -> anyhow::Result<()> {
        tracing::info!(window = ctx.label(), width, height, "resized");
        Ok(())
    }

    fn render(&mut self, ctx: &mut WindowContext<'_>) -> anyhow::Result<()> {
        self.angle = (self.angle + 90.0 * ctx.graphics().delta_seconds()) % 360.0;

        if ctx.input().is_key_just_pressed(Key::N) {
            ctx.open_window(WindowSpec::new(
                format!("extra-{}", ctx.graphics().frame_id()),
                WindowConfig::default()
                    .with_title("Extra")
                    .with_size(320, 240)
                    .with_continuous_rendering(false),
                Spinner::default(),
            ));
        }
        if ctx.input().is_key_just_pressed(Key::Escape) {
            ctx.exit();
        }

        let title = format!("{:.0} deg, {} fps", self.angle, ctx.graphics().frames_per_second());
        ctx.set_title(&title);
        Ok(())
    }

    fn dispose(&mut self, ctx: &mut WindowContext<'_>) -> anyhow::Result<()> {
        tracing::info!(window = ctx.label(), "spinner disposed");
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    logging::init();

    let config = ApplicationConfig {
        window: WindowConfig::default()
            .with_title("Kestrel")
            .with_size(800, 600)
            .with_fps(60, 10, -1),
        ..Default::default()
    };

    let mut controller = WindowController::new(WinitPlatform::new()?, config.clone());
    controller.open_window(WindowSpec::new("main", config.window.clone(), Spinner::default()))?;
    controller.run()?;
    Ok(())
}
