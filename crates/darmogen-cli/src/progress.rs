//! Terminal progress bars for the parse and generate stages

use std::sync::Mutex;

use darmogen_core::{ProgressSink, Stage};
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "├ {prefix} |{bar:40}| {percent}% | {pos}/{len} | ({msg})";

/// One bar per stage; the bar is replaced when the next stage starts.
#[derive(Default)]
pub struct CliProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=-")
    }
}

impl ProgressSink for CliProgress {
    fn start(&self, stage: Stage, total: usize) {
        if stage == Stage::Parsing {
            println!("┌ Found {} files:", total);
        }
        let bar = ProgressBar::new(total as u64);
        bar.set_style(Self::style());
        bar.set_prefix(format!("{:<10}", stage.to_string()));
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(previous) = slot.replace(bar) {
                previous.finish();
            }
        }
    }

    fn advance(&self, _stage: Stage, loaded: usize, label: &str) {
        if let Ok(slot) = self.bar.lock() {
            if let Some(bar) = slot.as_ref() {
                bar.set_position(loaded as u64);
                bar.set_message(label.to_string());
            }
        }
    }

    fn finish(&self, _stage: Stage) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish();
            }
        }
    }
}
