//! Host-side preview: runs the rain without a browser and prints each frame to
//! the terminal as truecolor blocks.

#[cfg(not(target_arch = "wasm32"))]
mod preview {
    use std::io::{self, Stdout, Write};
    use std::path::PathBuf;
    use std::thread;
    use std::time::{Duration, Instant};

    use anyhow::Context;
    use clap::{Parser, ValueEnum};
    use crossterm::{
        cursor, execute, queue,
        style::{Color, Print, ResetColor, SetForegroundColor},
        terminal::{
            self, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen,
            LeaveAlternateScreen,
        },
    };
    use digital_rain::{
        Direction, Driver, FrameOutcome, PixelSurface, Position, RainConfig, Result, Scheduler,
        Simulation, TrailMode,
    };
    use tracing::info;
    use tracing_subscriber::EnvFilter;

    #[derive(Debug, Clone, Copy, ValueEnum)]
    enum ModeArg {
        History,
        Decay,
    }

    #[derive(Debug, Clone, Copy, ValueEnum)]
    enum DirectionArg {
        Down,
        Left,
        Up,
        Right,
    }

    #[derive(Debug, Parser)]
    #[command(name = "digital-rain", about = "Terminal preview of the digital rain grid")]
    struct Args {
        /// JSON config file; flags below override it.
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        columns: Option<u32>,
        #[arg(long)]
        rows: Option<u32>,
        #[arg(long)]
        trail_length: Option<usize>,
        /// Minimum milliseconds between accepted ticks.
        #[arg(long)]
        interval_ms: Option<f64>,
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
        #[arg(long, value_enum)]
        direction: Option<DirectionArg>,
        #[arg(long)]
        party: bool,
        #[arg(long)]
        cycle_colors: bool,
        #[arg(long)]
        seed: Option<u64>,
        /// Number of ticks to render before exiting.
        #[arg(long, default_value_t = 200)]
        frames: u64,
        /// Wall-clock delay between frame callbacks.
        #[arg(long, default_value_t = 16)]
        frame_ms: u64,
    }

    impl Args {
        fn config(&self) -> anyhow::Result<RainConfig> {
            let mut config = match &self.config {
                Some(path) => {
                    let text = std::fs::read_to_string(path)
                        .with_context(|| format!("reading {}", path.display()))?;
                    RainConfig::from_json(&text)
                        .with_context(|| format!("parsing {}", path.display()))?
                }
                None => RainConfig {
                    columns: 40,
                    rows: 20,
                    ..RainConfig::default()
                },
            };
            if let Some(columns) = self.columns {
                config.columns = columns;
            }
            if let Some(rows) = self.rows {
                config.rows = rows;
            }
            if let Some(length) = self.trail_length {
                config.trail_length = length;
            }
            if let Some(ms) = self.interval_ms {
                config.min_interval_ms = ms;
            }
            if let Some(mode) = self.mode {
                config.trail_mode = match mode {
                    ModeArg::History => TrailMode::History,
                    ModeArg::Decay => TrailMode::Decay,
                };
            }
            if let Some(heading) = self.direction {
                config.direction = match heading {
                    DirectionArg::Down => Direction::Down,
                    DirectionArg::Left => Direction::Left,
                    DirectionArg::Up => Direction::Up,
                    DirectionArg::Right => Direction::Right,
                };
            }
            config.party_mode |= self.party;
            config.color_cycling |= self.cycle_colors;
            if self.seed.is_some() {
                config.seed = self.seed;
            }
            Ok(config.sanitized())
        }
    }

    /// A frame is always "requested"; the main loop delivers it after sleeping.
    #[derive(Default)]
    struct SleepScheduler {
        requested: u64,
    }

    impl Scheduler for SleepScheduler {
        type Handle = u64;

        fn schedule(&mut self) -> Result<u64> {
            self.requested += 1;
            Ok(self.requested)
        }

        fn cancel(&mut self, _handle: u64) {}
    }

    /// Owns the alternate screen for the lifetime of the preview and restores
    /// the terminal on every exit path.
    struct TermGuard {
        out: Stdout,
    }

    impl TermGuard {
        fn new() -> io::Result<Self> {
            let mut out = io::stdout();
            execute!(
                out,
                EnterAlternateScreen,
                DisableLineWrap,
                cursor::Hide,
                terminal::Clear(ClearType::All)
            )?;
            Ok(Self { out })
        }
    }

    impl Drop for TermGuard {
        fn drop(&mut self) {
            let _ = execute!(
                self.out,
                ResetColor,
                cursor::Show,
                EnableLineWrap,
                LeaveAlternateScreen
            );
        }
    }

    pub fn run() -> anyhow::Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(io::stderr)
            .init();

        let args = Args::parse();
        let config = args.config()?;
        let seed = config.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or_default()
        });
        info!(
            columns = config.columns,
            rows = config.rows,
            seed,
            "starting preview"
        );

        let sim = Simulation::with_seed(config, seed);
        let (width, height) = sim.canvas_size();
        let mut surface = PixelSurface::new(width as usize, height as usize);
        let mut driver = Driver::new(sim, SleepScheduler::default());

        let clock = Instant::now();
        let now = || clock.elapsed().as_secs_f64() * 1000.0;
        driver.start(now())?;

        let mut term = TermGuard::new()?;
        while driver.sim().ticks() < args.frames {
            thread::sleep(Duration::from_millis(args.frame_ms));
            if driver.on_frame(now(), &mut surface)? == FrameOutcome::Ticked {
                print_frame(&mut term.out, &driver, &surface)?;
            }
        }
        driver.stop();
        Ok(())
    }

    /// One terminal cell per grid cell, coloured from its top-left quadrant.
    fn print_frame(
        out: &mut impl Write,
        driver: &Driver<SleepScheduler>,
        surface: &PixelSurface,
    ) -> io::Result<()> {
        let geometry = driver.sim().geometry();
        for row in 0..geometry.rows {
            queue!(out, cursor::MoveTo(0, u16::try_from(row).unwrap_or(u16::MAX)))?;
            for column in 0..geometry.columns {
                let (x, y) = geometry.cell_origin(Position::new(column, row));
                // blended over transparent black, so the channels are already dimmed
                let [r, g, b, _] = surface
                    .pixel(x as usize, y as usize)
                    .unwrap_or_default();
                queue!(out, SetForegroundColor(Color::Rgb { r, g, b }), Print("██"))?;
            }
            queue!(out, ResetColor)?;
        }
        out.flush()
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = preview::run() {
        eprintln!("digital-rain: {err:#}");
        std::process::exit(1);
    }
}

// The browser build is driven from the library's start function.
#[cfg(target_arch = "wasm32")]
fn main() {}
