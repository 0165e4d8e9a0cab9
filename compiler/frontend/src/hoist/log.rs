use crate::ir::{Module, Operand, Statistics};
use std::{
    env,
    fs::File,
    io::{self, BufWriter, Write},
    sync::{Mutex, MutexGuard, OnceLock, PoisonError},
};
use tracing::warn;

static FILE_LOG: OnceLock<Option<Mutex<HoistLog<BufWriter<File>>>>> = OnceLock::new();

/// A Markdown log of what the hoisting pass does.
///
/// The first failed write disables the log.
#[derive(Debug)]
pub struct HoistLog<W: Write> {
    writer: W,
    indentation: usize,
    is_broken: bool,
}
impl<W: Write> HoistLog<W> {
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            indentation: 0,
            is_broken: false,
        }
    }
    pub fn into_inner(self) -> W {
        self.writer
    }
    pub const fn is_enabled(&self) -> bool {
        !self.is_broken
    }

    pub fn log_pass_start(&mut self, module: &Module) {
        self.record(|log| {
            log.write_line("1. `hoist_into_globals(…)`")?;
            log.indent();
            log.write_newline()?;
            log.write_code_block(&module.to_string())
        });
    }
    pub fn log_pass_end(&mut self, statistics_before: Statistics, statistics_after: Statistics) {
        self.record(|log| {
            log.write_line(&format!("Before: {statistics_before}"))?;
            log.write_line(&format!("After: {statistics_after}"))?;
            log.dedent();
            Ok(())
        });
    }

    pub fn log_hoist(&mut self, operand: Operand, global: &str, initializer: Option<&str>) {
        self.record(|log| {
            log.write_line(&format!("1. Hoisting {operand} into `@{global}`"))?;
            if let Some(initializer) = initializer {
                log.indent();
                log.write_newline()?;
                log.write_code_block(initializer)?;
                log.dedent();
            }
            Ok(())
        });
    }
    pub fn log_erase(&mut self, operation: &str) {
        self.record(|log| log.write_line(&format!("1. Erasing dead `{operation}`")));
    }

    fn record(&mut self, record: impl FnOnce(&mut Self) -> io::Result<()>) {
        if self.is_broken {
            return;
        }
        if let Err(error) = record(self).and_then(|()| self.writer.flush()) {
            warn!("Couldn't write to the hoisting log, disabling it: {error}");
            self.is_broken = true;
        }
    }

    fn write_code_block(&mut self, code: &str) -> io::Result<()> {
        self.write_line("```")?;
        for line in code.lines() {
            self.write_line(line)?;
        }
        self.write_line("```")?;
        self.write_newline()
    }
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        if line.is_empty() {
            return self.write_newline();
        }
        write!(self.writer, "{}", "    ".repeat(self.indentation))?;
        writeln!(self.writer, "{line}")
    }
    fn write_newline(&mut self) -> io::Result<()> {
        writeln!(self.writer)
    }
    fn indent(&mut self) {
        self.indentation += 1;
    }
    fn dedent(&mut self) {
        self.indentation = self.indentation.saturating_sub(1);
    }
}

/// The log in the file named by the `HOIST_LOG` environment variable, if it's
/// set and the file could be created.
pub fn from_env() -> Option<MutexGuard<'static, HoistLog<BufWriter<File>>>> {
    let log = FILE_LOG.get_or_init(|| {
        let path = env::var("HOIST_LOG").ok()?;
        let create = || -> io::Result<HoistLog<BufWriter<File>>> {
            let mut file = BufWriter::new(File::create(&path)?);
            writeln!(file, "# Hoisting Log")?;
            writeln!(file)?;
            Ok(HoistLog::new(file))
        };
        match create() {
            Ok(log) => Some(Mutex::new(log)),
            Err(error) => {
                warn!("Couldn't create the hoisting log at {path}: {error}");
                None
            }
        }
    });
    log.as_ref()
        .map(|log| log.lock().unwrap_or_else(PoisonError::into_inner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{id::CountableId, ir::OperationId};

    #[derive(Default)]
    struct FullDisk {
        attempted_writes: usize,
    }
    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            self.attempted_writes += 1;
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failing_writes_disable_the_log() {
        let mut log = HoistLog::new(FullDisk::default());
        log.log_erase("$1: Int = constant 2");
        assert!(!log.is_enabled());

        log.log_erase("$2: Int = constant 3");
        log.log_pass_end(Statistics::default(), Statistics::default());
        assert_eq!(log.into_inner().attempted_writes, 1);
    }

    #[test]
    fn hoists_are_nested_lines() {
        let mut log = HoistLog::new(vec![]);
        log.log_hoist(
            Operand {
                owner: OperationId::from_usize(3),
                index: 1,
            },
            "hoisted",
            Some("initializer {\n  return\n}"),
        );
        log.log_hoist(
            Operand {
                owner: OperationId::from_usize(4),
                index: 0,
            },
            "hoisted",
            None,
        );
        let text = String::from_utf8(log.into_inner()).unwrap();
        insta::assert_snapshot!(text, @r###"
        1. Hoisting operand #1 of op3 into `@hoisted`

            ```
            initializer {
              return
            }
            ```

        1. Hoisting operand #0 of op4 into `@hoisted`
        "###);
    }
}
