//! Input sources for `read` and `readme`.

use std::collections::VecDeque;
use std::io::BufRead;
use std::sync::Arc;

use parking_lot::Mutex;

/// Input handler, dispatched by enum like [`crate::PrintHandlerImpl`].
pub enum InputHandlerImpl {
    Stdin,
    /// Pre-supplied lines, consumed front to back.
    Scripted(Mutex<VecDeque<String>>),
}

impl InputHandlerImpl {
    pub fn scripted<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        InputHandlerImpl::Scripted(Mutex::new(lines.into_iter().map(Into::into).collect()))
    }

    /// Next line without its line terminator; `None` at end of input.
    pub fn read_line(&self) -> std::io::Result<Option<String>> {
        match self {
            InputHandlerImpl::Stdin => {
                let mut line = String::new();
                if std::io::stdin().lock().read_line(&mut line)? == 0 {
                    return Ok(None);
                }
                let trimmed = line.trim_end_matches(['\n', '\r']).len();
                line.truncate(trimmed);
                Ok(Some(line))
            }
            InputHandlerImpl::Scripted(lines) => Ok(lines.lock().pop_front()),
        }
    }
}

pub type SharedInputHandler = Arc<InputHandlerImpl>;

pub fn stdin_handler() -> SharedInputHandler {
    Arc::new(InputHandlerImpl::Stdin)
}

pub fn scripted_handler<I, S>(lines: I) -> SharedInputHandler
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Arc::new(InputHandlerImpl::scripted(lines))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scripted_lines_come_back_in_order() {
        let input = scripted_handler(["first", "second"]);
        assert_eq!(input.read_line().ok().flatten(), Some("first".into()));
        assert_eq!(input.read_line().ok().flatten(), Some("second".into()));
        assert_eq!(input.read_line().ok().flatten(), None);
    }
}
