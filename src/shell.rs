//! Line-oriented command interface.
//!
//! Each input line is one command. The shell translates session results and
//! errors into user-facing text; all validation happens in the session.
//!
//! ```text
//! load <filename>
//! get_field <header|transaction|footer> <field> [counter]
//! set_field <header|transaction|footer> <field> <value> [counter]
//! add_transaction <amount>
//! lock <header|transaction|footer> <field>
//! unlock <header|transaction|footer> <field>
//! help
//! quit
//! ```

use crate::error::{BatchError, FormatError, Result};
use crate::lock::LockConfig;
use crate::schema::RecordKind;
use crate::session::FileSession;
use log::{debug, error, info};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

pub const INTRO: &str = "Welcome to the data manager. Type help or ? to list commands.";
pub const PROMPT: &str = "(data manager) ";

const SET_FIELD_USAGE: &str =
    "set_field [header|transaction|footer] field_name value [counter_value]";

const HELP: &str = "\
Commands:
  load <filename>
  get_field <header|transaction|footer> <field> [counter]
  set_field <header|transaction|footer> <field> <value> [counter]
  add_transaction <amount>
  lock <header|transaction|footer> <field>
  unlock <header|transaction|footer> <field>
  help
  quit";

/// Whether the command loop should keep reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Command dispatcher writing its replies to `out`.
pub struct Shell<W: Write> {
    out: W,
    data_dir: PathBuf,
    lock_path: PathBuf,
    locks: LockConfig,
    session: Option<FileSession>,
}

impl<W: Write> Shell<W> {
    /// Creates a shell resolving filenames against `data_dir` and persisting
    /// lock changes to `lock_path`.
    pub fn new(
        out: W,
        data_dir: impl Into<PathBuf>,
        lock_path: impl Into<PathBuf>,
        locks: LockConfig,
    ) -> Self {
        Shell {
            out,
            data_dir: data_dir.into(),
            lock_path: lock_path.into(),
            locks,
            session: None,
        }
    }

    pub fn session(&self) -> Option<&FileSession> {
        self.session.as_ref()
    }

    /// Prints the banner and a reminder that nothing is loaded yet.
    pub fn intro(&mut self) -> Result<()> {
        writeln!(self.out, "{INTRO}")?;
        if self.session.is_none() {
            writeln!(self.out, "No file is loaded. Please load a file to begin.")?;
        }
        Ok(())
    }

    pub fn prompt(&mut self) -> Result<()> {
        write!(self.out, "{PROMPT}")?;
        self.out.flush()?;
        Ok(())
    }

    /// Runs one command line.
    pub fn execute(&mut self, line: &str) -> Result<Flow> {
        let args: Vec<&str> = line.split_whitespace().collect();
        let Some((command, rest)) = args.split_first() else {
            return Ok(Flow::Continue);
        };
        debug!("Executing command '{}' with args {:?}", command, rest);

        match *command {
            "load" => self.load(rest)?,
            "get_field" => self.get_field(rest)?,
            "set_field" => self.set_field(rest)?,
            "add_transaction" => self.add_transaction(rest)?,
            "lock" => self.set_lock(rest, true)?,
            "unlock" => self.set_lock(rest, false)?,
            "help" | "?" => writeln!(self.out, "{HELP}")?,
            "quit" | "exit" => {
                writeln!(self.out, "Exiting the program.")?;
                return Ok(Flow::Quit);
            }
            _ => writeln!(self.out, "*** Unknown syntax: {}", line.trim())?,
        }
        Ok(Flow::Continue)
    }

    fn usage(&mut self, text: &str) -> Result<()> {
        debug!("Usage: {}", text);
        writeln!(self.out, "Usage: {text}")?;
        Ok(())
    }

    fn report(&mut self, err: &BatchError) -> Result<()> {
        error!("{}", err);
        writeln!(self.out, "{err}")?;
        Ok(())
    }

    /// Reports a save failure after an in-memory change was applied.
    fn report_unsaved(&mut self, err: &BatchError) -> Result<()> {
        self.report(err)?;
        writeln!(
            self.out,
            "The change is kept in memory but was not saved to disk."
        )?;
        Ok(())
    }

    /// Parses a record type argument, reporting it when invalid.
    fn record_kind(&mut self, arg: &str) -> Result<Option<RecordKind>> {
        match arg.parse::<RecordKind>() {
            Ok(kind) => Ok(Some(kind)),
            Err(name) => {
                self.report(&BatchError::UnknownRecordType(name))?;
                Ok(None)
            }
        }
    }

    pub fn load(&mut self, args: &[&str]) -> Result<()> {
        let [filename] = args else {
            return self.usage("load <filename>");
        };

        let mut session = FileSession::new(self.data_dir.join(filename));
        let outcome = session.read_file();
        self.session = Some(session);

        match outcome {
            Ok(()) => {
                info!("File loaded: {}", filename);
                writeln!(self.out, "File '{filename}' loaded successfully.")?;
            }
            Err(e) => {
                error!("Failed to load {}: {}", filename, e);
                let hint = match &e {
                    BatchError::NotFound(_) => {
                        "Please check the file path and try loading again."
                    }
                    BatchError::Factory(_) => "Please correct the data and upload the file again.",
                    BatchError::Format(FormatError::Io(io))
                        if io.kind() == ErrorKind::PermissionDenied =>
                    {
                        "Check your file permissions."
                    }
                    _ => "Please try loading a different file.",
                };
                writeln!(self.out, "Failed to load the file: {e}")?;
                writeln!(self.out, "{hint}")?;
            }
        }
        Ok(())
    }

    fn get_field(&mut self, args: &[&str]) -> Result<()> {
        let (kind, field, counter) = match args {
            [kind, field] => (*kind, *field, None),
            [kind, field, counter] => (*kind, *field, Some(*counter)),
            _ => return self.usage("get_field record_type field_name [counter_value]"),
        };
        let Some(kind) = self.record_kind(kind)? else {
            return Ok(());
        };
        let Some(session) = self.session.as_ref() else {
            return self.report(&BatchError::NotLoaded);
        };

        match session.get_field_value(kind, field, counter) {
            Ok(Some(value)) => writeln!(self.out, "{value}")?,
            Ok(None) => writeln!(
                self.out,
                "Error: Field '{field}' not found on {kind}."
            )?,
            Err(e) => self.report(&e)?,
        }
        Ok(())
    }

    /// `set_field <kind> <field> <value...> [counter]`: the value runs to the
    /// end of the line, or up to the trailing counter for transactions.
    fn set_field(&mut self, args: &[&str]) -> Result<()> {
        let [kind, field, rest @ ..] = args else {
            return self.usage(SET_FIELD_USAGE);
        };
        if rest.is_empty() {
            return self.usage(SET_FIELD_USAGE);
        }
        let Some(kind) = self.record_kind(kind)? else {
            return Ok(());
        };
        let (value, counter) = match (kind, rest) {
            (RecordKind::Transaction, [words @ .., counter]) if !words.is_empty() => {
                (words.join(" "), Some(*counter))
            }
            _ => (rest.join(" "), None),
        };
        let Some(session) = self.session.as_mut() else {
            return self.report(&BatchError::NotLoaded);
        };

        if let Err(e) = session.set_field(&self.locks, kind, field, &value, counter) {
            return self.report(&e);
        }
        match session.save_file() {
            Ok(()) => writeln!(self.out, "Updated {kind} field '{field}'.")?,
            Err(e) => self.report_unsaved(&e)?,
        }
        Ok(())
    }

    fn add_transaction(&mut self, args: &[&str]) -> Result<()> {
        let [amount] = args else {
            return self.usage("add_transaction amount");
        };
        let Some(session) = self.session.as_mut() else {
            return self.report(&BatchError::NotLoaded);
        };

        let (counter, amount, currency) = match session.add_transaction(amount) {
            Ok(tx) => (
                tx.counter().to_string(),
                tx.amount().to_string(),
                tx.currency().to_string(),
            ),
            Err(e) => return self.report(&e),
        };
        match session.save_file() {
            Ok(()) => writeln!(
                self.out,
                "Added transaction {counter}: {amount} {currency}"
            )?,
            Err(e) => self.report_unsaved(&e)?,
        }
        Ok(())
    }

    fn set_lock(&mut self, args: &[&str], locked: bool) -> Result<()> {
        let [kind, field] = args else {
            let verb = if locked { "lock" } else { "unlock" };
            return self.usage(&format!("{verb} [header|transaction|footer] field_name"));
        };
        let Some(kind) = self.record_kind(kind)? else {
            return Ok(());
        };

        let outcome = self
            .locks
            .set_locked(kind, field, locked)
            .map_err(BatchError::from)
            .and_then(|()| self.locks.save(&self.lock_path).map_err(BatchError::from));
        match outcome {
            Ok(()) => {
                let state = if locked { "locked" } else { "unlocked" };
                info!("{} {} in {}", state, field, kind);
                writeln!(self.out, "Field '{field}' in '{kind}' is now {state}.")?;
            }
            Err(e) => self.report(&e)?,
        }
        Ok(())
    }
}
