use std::time::Duration;

use ratatui_image::picker::{Capability, Picker, ProtocolType, cap_parser::QueryStdioOptions};

/// What the environment says about the terminal's graphics support.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct TerminalHints {
    pub kitty_window: bool,
    pub term_kitty: bool,
    pub iterm: bool,
    pub tmux: bool,
}

impl TerminalHints {
    pub(crate) fn from_env() -> Self {
        let non_blank = |key: &str| {
            std::env::var(key)
                .ok()
                .is_some_and(|v| !v.trim().is_empty())
        };
        let contains = |key: &str, needle: &str| {
            std::env::var(key)
                .ok()
                .is_some_and(|v| v.contains(needle))
        };
        Self {
            kitty_window: non_blank("KITTY_WINDOW_ID"),
            // `KITTY_WINDOW_ID` is not forwarded over SSH, `TERM` is.
            term_kitty: std::env::var("TERM")
                .ok()
                .is_some_and(|t| t.trim().starts_with("xterm-kitty")),
            iterm: non_blank("ITERM_SESSION_ID")
                || contains("TERM_PROGRAM", "iTerm")
                || contains("LC_TERMINAL", "iTerm"),
            tmux: std::env::var_os("TMUX").is_some(),
        }
    }

    fn strong_graphics_hint(&self) -> bool {
        self.kitty_window || self.term_kitty || self.iterm
    }

    pub(crate) fn should_query(&self) -> bool {
        // inside tmux the outer terminal can only be found by asking
        self.strong_graphics_hint() || self.tmux
    }

    pub(crate) fn query_timeout(&self) -> Duration {
        if self.strong_graphics_hint() {
            Duration::from_millis(1500)
        } else if self.tmux {
            Duration::from_millis(300)
        } else {
            Duration::from_millis(0)
        }
    }

    pub(crate) fn prefers_kitty(&self, picker: &Picker) -> bool {
        if self.iterm {
            return false;
        }
        self.kitty_window
            || picker
                .capabilities()
                .iter()
                .any(|cap| matches!(cap, Capability::Kitty))
    }
}

pub(crate) fn build_picker(hints: TerminalHints) -> Picker {
    if hints.tmux {
        allow_tmux_passthrough();
    }

    let mut picker = if hints.should_query() {
        let options = QueryStdioOptions {
            timeout: hints.query_timeout(),
            text_sizing_protocol: false,
        };
        Picker::from_query_stdio_with_options(options).unwrap_or_else(|_| Picker::halfblocks())
    } else {
        Picker::halfblocks()
    };

    if hints.prefers_kitty(&picker) {
        picker.set_protocol_type(ProtocolType::Kitty);
    }
    tracing::debug!(protocol = protocol_label(&picker), ?hints, "image picker ready");
    picker
}

// Needed for graphics passthrough; old tmux just refuses, which is fine.
fn allow_tmux_passthrough() {
    let _ = std::process::Command::new("tmux")
        .args(["set-option", "-g", "allow-passthrough", "on"])
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status();
}

pub(crate) fn protocol_label(picker: &Picker) -> &'static str {
    match picker.protocol_type() {
        ProtocolType::Halfblocks => "halfblocks",
        ProtocolType::Sixel => "sixel",
        ProtocolType::Kitty => "kitty",
        ProtocolType::Iterm2 => "iterm2",
    }
}
