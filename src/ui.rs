use std::fmt::Display;

use console::Style;
use fieldx::fxstruct;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MsgType {
    Debug,
    Info,
    Warn,
    Error,
}

impl Display for MsgType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MsgType::Debug => write!(f, "DEBUG"),
            MsgType::Info => write!(f, "INFO"),
            MsgType::Warn => write!(f, "WARN"),
            MsgType::Error => write!(f, "ERROR"),
        }
    }
}

/// User-facing output: results go to stdout, prefixed diagnostics to stderr.
#[fxstruct(new(off), sync, builder)]
pub struct Console {
    /// Suppress diagnostics. Errors are still printed.
    #[fieldx(get(copy), default(false))]
    quiet: bool,

    #[fieldx(lazy, get(copy))]
    user_attended: bool,
}

impl Console {
    fn build_user_attended(&self) -> bool {
        !self.quiet && console::user_attended()
    }

    pub fn message_style(&self, msg_type: MsgType) -> Style {
        match msg_type {
            MsgType::Debug => Style::new().magenta().for_stderr(),
            MsgType::Info => Style::new().cyan().for_stderr(),
            MsgType::Warn => Style::new().yellow().for_stderr(),
            MsgType::Error => Style::new().red().for_stderr(),
        }
    }

    pub fn print_message<S: ToString>(&self, msg_type: MsgType, msg: S) {
        if self.quiet && msg_type != MsgType::Error {
            return;
        }

        let prefix = self.message_style(msg_type).apply_to(format!("[{msg_type}]"));
        eprintln!("{prefix} {}", msg.to_string());
    }

    /// Print a result block as is.
    pub fn output<S: Display>(&self, block: S) {
        println!("{block}");
    }

    pub fn report_error<S: ToString>(&self, msg: S) {
        self.print_message(MsgType::Error, msg);
    }

    pub fn report_warn<S: ToString>(&self, msg: S) {
        self.print_message(MsgType::Warn, msg);
    }

    pub fn report_info<S: ToString>(&self, msg: S) {
        self.print_message(MsgType::Info, msg);
    }

    pub fn report_debug<S: ToString>(&self, msg: S) {
        if self.user_attended() {
            self.print_message(MsgType::Debug, msg);
        }
    }
}
