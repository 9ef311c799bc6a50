//! Terminal interaction: status output and prompts

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{bail, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use zeroize::Zeroizing;

/// User-facing input and output streams
pub struct Ui {
    input: Box<dyn BufRead>,
    output: Box<dyn Write>,
    terminal: bool,
}

impl Ui {
    /// Stdin/stdout of the process
    pub fn stdio() -> Self {
        Self {
            terminal: io::stdin().is_terminal(),
            input: Box::new(io::BufReader::new(io::stdin())),
            output: Box::new(io::stdout()),
        }
    }

    /// Print a line
    pub fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message)?;
        self.output.flush()?;
        Ok(())
    }

    /// Print a question and read one line of answer
    pub fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;

        let mut answer = String::new();
        if self.input.read_line(&mut answer)? == 0 {
            bail!("No input available for prompt: {}", question.trim());
        }
        Ok(answer.trim_end_matches(&['\r', '\n'][..]).to_string())
    }

    /// Like `ask`, without echoing the answer on a terminal
    pub fn ask_secret(&mut self, question: &str) -> Result<Zeroizing<String>> {
        if !self.terminal {
            return self.ask(question).map(Zeroizing::new);
        }

        write!(self.output, "{}", question)?;
        self.output.flush()?;

        terminal::enable_raw_mode()?;
        let answer = read_secret();
        terminal::disable_raw_mode()?;

        writeln!(self.output)?;
        answer
    }
}

/// What a key press does to a secret being typed
#[derive(Debug, PartialEq, Eq)]
enum SecretInput {
    Continue,
    Done,
    Cancelled,
}

/// Apply one key press to `secret`
fn apply_key(secret: &mut Zeroizing<String>, key: KeyEvent) -> SecretInput {
    if key.kind != KeyEventKind::Press {
        return SecretInput::Continue;
    }

    match key.code {
        KeyCode::Enter => SecretInput::Done,
        KeyCode::Esc => SecretInput::Cancelled,
        KeyCode::Char('c') | KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            SecretInput::Cancelled
        }
        KeyCode::Backspace => {
            secret.pop();
            SecretInput::Continue
        }
        KeyCode::Char(c) => {
            secret.push(c);
            SecretInput::Continue
        }
        _ => SecretInput::Continue,
    }
}

/// Read key events until Enter; the terminal must be in raw mode
fn read_secret() -> Result<Zeroizing<String>> {
    let mut secret = Zeroizing::new(String::new());

    loop {
        if let Event::Key(key) = event::read()? {
            match apply_key(&mut secret, key) {
                SecretInput::Continue => {}
                SecretInput::Done => return Ok(secret),
                SecretInput::Cancelled => bail!("Prompt cancelled"),
            }
        }
    }
}

/// Output buffer shared with a `Ui`, for inspecting what was printed
#[cfg(test)]
#[derive(Clone, Default)]
pub struct Captured(std::rc::Rc<std::cell::RefCell<Vec<u8>>>);

#[cfg(test)]
impl Captured {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

#[cfg(test)]
impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
impl Ui {
    /// A Ui reading from `input` and recording its output
    pub fn captured(input: &str) -> (Self, Captured) {
        let captured = Captured::default();
        let ui = Self {
            input: Box::new(io::Cursor::new(input.as_bytes().to_vec())),
            output: Box::new(captured.clone()),
            terminal: false,
        };
        (ui, captured)
    }
}
