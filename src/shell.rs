//! Shell quoting for commands that the admin container executes.
//!
//! pgAdmin runs `PasswordExecCommand` through `/bin/sh`. [`echo_command`]
//! splices the value between single quotes as-is; [`quoted_echo_command`]
//! escapes it with [`single_quote`] first.

/// Wraps a value in POSIX single quotes.
///
/// Embedded single quotes are closed, escaped and reopened with the `'\''`
/// sequence, so the shell always sees the value as one literal word.
#[must_use]
pub fn single_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('\'');
    for ch in value.chars() {
        if ch == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(ch);
        }
    }
    quoted.push('\'');
    quoted
}

/// Builds `echo '<value>'` with `value` embedded unchanged.
///
/// A `'` inside `value` ends the quoted word early.
#[must_use]
pub fn echo_command(value: &str) -> String {
    format!("echo '{value}'")
}

/// Builds an `echo` command whose argument is [`single_quote`]d.
#[must_use]
pub fn quoted_echo_command(value: &str) -> String {
    format!("echo {}", single_quote(value))
}
