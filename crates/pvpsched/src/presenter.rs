use std::io::{self, Stdout, Write};

use crate::types::{PlayerRanking, Tournament};

pub const SEPARATOR: &str = "-----------------------------";

/// Renders records to some destination. Implementations only borrow the
/// records they are handed.
pub trait Presenter {
    fn present_rankings(&mut self, rankings: &[PlayerRanking]) -> io::Result<()>;
    fn present_tournaments(&mut self, tournaments: &[Tournament]) -> io::Result<()>;
}

/// Writes one `Label: value` line per field and a dashed separator after each
/// record.
#[derive(Debug)]
pub struct ConsolePresenter<W = Stdout> {
    out: W,
}

impl ConsolePresenter<Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsolePresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn present<T: std::fmt::Display>(&mut self, records: &[T]) -> io::Result<()> {
        for record in records {
            write!(self.out, "{}", record)?;
            writeln!(self.out, "{}", SEPARATOR)?;
        }
        self.out.flush()
    }
}

impl<W: Write> Presenter for ConsolePresenter<W> {
    fn present_rankings(&mut self, rankings: &[PlayerRanking]) -> io::Result<()> {
        self.present(rankings)
    }

    fn present_tournaments(&mut self, tournaments: &[Tournament]) -> io::Result<()> {
        self.present(tournaments)
    }
}

/// Writes the records as a pretty-printed JSON array.
#[derive(Debug)]
pub struct JsonPresenter<W = Stdout> {
    out: W,
}

impl JsonPresenter<Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> JsonPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn present<T: serde::Serialize>(&mut self, records: &[T]) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, records)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> Presenter for JsonPresenter<W> {
    fn present_rankings(&mut self, rankings: &[PlayerRanking]) -> io::Result<()> {
        self.present(rankings)
    }

    fn present_tournaments(&mut self, tournaments: &[Tournament]) -> io::Result<()> {
        self.present(tournaments)
    }
}
