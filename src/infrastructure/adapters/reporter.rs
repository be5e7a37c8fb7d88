//! 콘솔 리포터 포트 구현 어댑터.
//!
//! 진행 상황은 stdout으로, 진단 로그는 tracing을 통해 stderr로 나간다.

use std::io::{self, IsTerminal};

use crate::application::ports::Reporter;

const KEY_WIDTH: usize = 12;

/// stdout이 TTY일 때만 provider 상태에 ANSI 색을 입힌다.
pub struct ConsoleReporter {
    colored: bool,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self {
            colored: io::stdout().is_terminal(),
        }
    }
}

impl Reporter for ConsoleReporter {
    fn section(&self, name: &str) {
        println!();
        println!("{}", section_line(name));
    }

    fn kv(&self, key: &str, value: &str) {
        println!("  {key:<KEY_WIDTH$} {value}");
    }

    fn status(&self, scope: &str, message: &str) {
        println!("  [{scope}] {message}");
    }

    fn provider_status(&self, provider: &str, status: &str, extra: Option<&str>) {
        println!("{}", provider_line(provider, status, extra, self.colored));
    }

    fn raw(&self, line: &str) {
        println!("{line}");
    }
}

fn section_line(name: &str) -> String {
    format!("== {name} ==")
}

fn provider_line(provider: &str, status: &str, extra: Option<&str>, colored: bool) -> String {
    let status = if colored {
        paint(status)
    } else {
        status.to_string()
    };
    match extra {
        Some(extra) => format!("  {provider} {status} {extra}"),
        None => format!("  {provider} {status}"),
    }
}

fn paint(status: &str) -> String {
    let code = match status {
        "running" => "33",
        "done" => "32",
        "error" => "31",
        _ => return status.to_string(),
    };
    format!("\x1b[{code}m{status}\x1b[0m")
}
