//! Driver that renders engine effects as text.

use std::io::{self, Write};

use isle_app::Driver;
use isle_core::{Confirmation, Intent, Notice, Prompt, ResultRequest, UserId};
use tracing::warn;

/// Text driver over any writer.
///
/// Activities are not started anywhere; the shell prints what would have
/// been started and the user completes installs with `/complete`.
pub struct ConsoleDriver<W> {
    out: W,
    finished: bool,
}

impl<W: Write> ConsoleDriver<W> {
    /// Create a driver writing to `out`.
    pub fn new(out: W) -> Self {
        Self { out, finished: false }
    }

    /// The writer.
    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    /// Consume the driver, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Whether a teardown asked the surface to close.
    pub fn finished(&self) -> bool {
        self.finished
    }
}

/// Text of a confirmation prompt.
pub fn render_prompt(prompt: &Prompt) -> String {
    match prompt {
        Prompt::CloneViaInstall => {
            "The app will be cloned through the package installer. Continue?".to_string()
        },
        Prompt::CloneViaGooglePlay => {
            "The app will be cloned through its store page. Install it from there. Continue?"
                .to_string()
        },
        Prompt::CloneViaBuiltinMarket => {
            "The app will be cloned through the built-in app market. Continue?".to_string()
        },
        Prompt::Deactivate => "Give up device ownership?".to_string(),
        Prompt::Destroy => "Destroy the island and everything in it?".to_string(),
        Prompt::DestroyExclusives { count, listing } => {
            format!("{count} apps exist only in the island and will be lost:\n{listing}\nDestroy anyway?")
        },
        Prompt::CannotDestroy => {
            "The island cannot be destroyed from here. Remove it in system settings.".to_string()
        },
    }
}

/// Text of a notice.
pub fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::NoLaunchEntrance { package } => format!("{package} has no launch entrance"),
        Notice::NoAppMarket { package } => format!("no app market can install {package}"),
        Notice::ShortcutCreated { package } => format!("shortcut for {package} created"),
        Notice::ShortcutFailed { package } => format!("shortcut for {package} not supported"),
    }
}

impl<W: Write> Driver for ConsoleDriver<W> {
    type Error = io::Error;

    fn start_activity(&mut self, intent: &Intent, result: ResultRequest) -> io::Result<()> {
        match result {
            ResultRequest::None => writeln!(self.out, "-> start {intent}"),
            ResultRequest::ForResult { request_code } => {
                writeln!(self.out, "-> start {intent} for result #{request_code:#x}")
            },
        }
    }

    fn show_confirmation(&mut self, confirmation: &Confirmation) -> io::Result<()> {
        writeln!(self.out, "?? {}", render_prompt(&confirmation.prompt))?;
        if confirmation.on_accept.is_some() {
            writeln!(self.out, "   answer with /yes or /no")?;
        }
        Ok(())
    }

    fn notify(&mut self, notice: &Notice) {
        if let Err(e) = writeln!(self.out, "!! {}", render_notice(notice)) {
            warn!(error = %e, "failed to print notice");
        }
    }

    fn show_app_details(&mut self, package: &str, user: UserId) -> io::Result<()> {
        writeln!(self.out, "-> details of {package} in {user}")
    }

    fn create_shortcut(&mut self, package: &str) -> bool {
        writeln!(self.out, "-> shortcut {package}").is_ok()
    }

    fn finish_surface(&mut self) {
        self.finished = true;
    }
}
