use {
    crate::{
        config::RunConfig,
        deviation::{Band, DeviationLog},
        meter::Meter,
    },
    crossterm::{
        QueueableCommand, cursor,
        style::{self, Color, StyledContent, Stylize},
        terminal,
    },
    std::{
        io::{self, Write},
        time::Duration,
    },
};

/// redraws a fixed block of lines in place.
#[derive(Debug, Default)]
pub struct Renderer {
    /// how many lines the previous frame drew.
    drawn: u16,
    /// how many frames have been drawn.
    frames: usize,
}

/// everything one frame shows.
pub struct Frame<'a> {
    pub measured: f64,
    pub elapsed: Duration,
    pub config: &'a RunConfig,
    pub log: &'a DeviationLog,
}

/// returns how far through the run `elapsed` is, from 0 to 1.
pub fn progress(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

// === impl Renderer ===

impl Renderer {
    /// the number of lines in each frame.
    pub const LINES: u16 = 4;

    const AMBER: Color = Color::AnsiValue(214);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    /// draws a frame over the previous one.
    pub fn render(&mut self, writer: &mut impl Write, frame: &Frame<'_>) -> io::Result<()> {
        if self.drawn > 0 {
            writer.queue(cursor::MoveUp(self.drawn))?;
        }

        let lines = Self::compose(frame);
        for line in &lines {
            writer
                .queue(cursor::MoveToColumn(0))?
                .queue(terminal::Clear(terminal::ClearType::UntilNewLine))?
                .queue(style::PrintStyledContent(line.clone()))?
                .queue(style::Print("\n"))?;
        }
        writer.flush()?;

        self.drawn = Self::LINES;
        self.frames += 1;
        Ok(())
    }

    /// lays out the lines of a frame.
    fn compose(
        &Frame {
            measured,
            elapsed,
            config,
            log,
        }: &Frame<'_>,
    ) -> [StyledContent<String>; Renderer::LINES as usize] {
        let target = config.target_percent();
        let width = config.bar_length();
        let duration = config.duration();

        let band = Band::classify(measured - target);
        let load = format!(
            "load     {} {measured:>5.1}% (target {target:.0}%) {}",
            Meter::percent(measured, width),
            Band::indicator(measured, target),
        );
        let load = match band {
            Band::InRange => load.green(),
            Band::Moderate => load.with(Self::AMBER),
            Band::Severe => load.red().bold(),
        };

        let done = progress(elapsed, duration);
        let progress = format!(
            "progress {} {:>5.1}%",
            Meter {
                fraction: done,
                width,
            },
            done * 100.0,
        )
        .stylize();

        let remaining = duration.saturating_sub(elapsed);
        let time = format!(
            "time     {:.1}s elapsed, {:.1}s remaining",
            elapsed.min(duration).as_secs_f64(),
            remaining.as_secs_f64(),
        )
        .grey();

        let stat = |s: Option<f64>| s.map_or_else(|| "n/a".to_owned(), |s| format!("{s:.1}%"));
        let stats = format!(
            "deviation now {} | max {} | avg {}",
            stat(log.latest()),
            stat(log.max()),
            stat(log.average()),
        )
        .stylize();

        [load, progress, time, stats]
    }
}
