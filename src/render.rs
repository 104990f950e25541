use crate::i18n;
use crate::settings::{ColorMode, RenderContext};
use crate::wizard::{StepStatus, WizardStep};

const RESET: &str = "\x1b[0m";

fn paint(ctx: &RenderContext, status: StepStatus, text: &str) -> String {
    let code = match (ctx.color_mode(), status) {
        (ColorMode::Plain, _) => return text.to_string(),
        (_, StepStatus::Upcoming) => "\x1b[2m",
        (ColorMode::Light, StepStatus::Completed) => "\x1b[32m",
        (ColorMode::Dark, StepStatus::Completed) => "\x1b[92m",
        (ColorMode::Light, StepStatus::Current) => "\x1b[1;34m",
        (ColorMode::Dark, StepStatus::Current) => "\x1b[1;96m",
    };
    format!("{code}{text}{RESET}")
}

/// One line per wizard: `[x] 1 AI Model > [>] 2 Exchange > [ ] 3 Strategy`.
pub fn render_steps(ctx: &RenderContext, steps: &[(WizardStep, StepStatus)]) -> String {
    steps
        .iter()
        .enumerate()
        .map(|(i, (step, status))| {
            let mark = match status {
                StepStatus::Completed => "[x]",
                StepStatus::Current => "[>]",
                StepStatus::Upcoming => "[ ]",
            };
            let label = format!("{mark} {} {}", i + 1, i18n::step_title(ctx.language(), *step));
            paint(ctx, *status, &label)
        })
        .collect::<Vec<_>>()
        .join(" > ")
}
