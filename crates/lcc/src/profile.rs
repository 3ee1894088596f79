use std::{
    io::Write,
    time::{Duration, Instant},
};

// ---------------------------------------------------------------------------
// Profiler
// ---------------------------------------------------------------------------

/// Wall-clock timings of the driver stages, when enabled.
pub struct Profiler {
    stages: Option<Vec<(String, Duration)>>,
}

impl Profiler {
    pub fn new(enabled: bool) -> Self {
        Self {
            stages: enabled.then(Vec::new),
        }
    }

    /// Runs `f`, recording its duration under `label` if profiling is on.
    #[inline]
    pub fn time<R>(&mut self, label: impl Into<String>, f: impl FnOnce() -> R) -> R {
        let Some(stages) = &mut self.stages else {
            return f();
        };
        let start = Instant::now();
        let result = f();
        stages.push((label.into(), start.elapsed()));
        result
    }

    pub fn report(&self, writer: &mut impl Write) -> std::io::Result<()> {
        let Some(stages) = &self.stages else {
            return Ok(());
        };
        let width = stages
            .iter()
            .map(|(label, _)| label.len())
            .chain(std::iter::once("Total".len()))
            .max()
            .unwrap_or(0);
        let rule = "-".repeat(width + 28);
        let total: Duration = stages.iter().map(|(_, d)| *d).sum();
        let ms = |d: Duration| d.as_micros() as f64 / 1000.0;

        writeln!(writer, "{rule}\nProfiler Report\n{rule}")?;
        for (label, duration) in stages {
            let share = if total.is_zero() {
                0.0
            } else {
                duration.as_secs_f64() / total.as_secs_f64() * 100.0
            };
            writeln!(
                writer,
                "{label:<width$} : {:>10.4}ms ({share:>5.1}%)",
                ms(*duration)
            )?;
        }
        writeln!(writer, "{rule}")?;
        writeln!(writer, "{:<width$} : {:>10.4}ms (100.0%)", "Total", ms(total))?;
        writeln!(writer, "{rule}")
    }
}
