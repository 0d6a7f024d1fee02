//! JsonLinesSource - one JSON encoded event per line
//!
//! ```text
//! {"recipients":[{"data_center":"dc1","node_id":"n1"}],"payload":{"origin":"billing","data":[0,1]}}
//! ```

use std::path::Path;

use contracts::{ContractError, Event, EventSource};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{info, instrument};

/// Parse a single event line; `Ok(None)` for blank lines
pub fn parse_event_line(line_no: u64, line: &str) -> Result<Option<Event>, ContractError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| ContractError::decode(line_no, e.to_string()))
}

/// Source reading events from a file, stdin or any buffered reader
///
/// Blank lines are skipped. Once the input is drained the source suspends
/// indefinitely, like a quiet upstream.
pub struct JsonLinesSource<R> {
    name: String,
    lines: Lines<R>,
    line_no: u64,
    drained: bool,
}

impl<R> JsonLinesSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    /// Read events from a buffered reader
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            lines: reader.lines(),
            line_no: 0,
            drained: false,
        }
    }
}

impl JsonLinesSource<BufReader<File>> {
    /// Open an event file
    #[instrument(name = "json_lines_source_open", skip(path), fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, ContractError> {
        let file = File::open(path.as_ref()).await?;
        Ok(Self::new(
            path.as_ref().display().to_string(),
            BufReader::new(file),
        ))
    }
}

impl JsonLinesSource<BufReader<Stdin>> {
    /// Read events from standard input
    pub fn stdin() -> Self {
        Self::new("stdin", BufReader::new(tokio::io::stdin()))
    }
}

impl<R> EventSource for JsonLinesSource<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_event(&mut self) -> Result<Event, ContractError> {
        while !self.drained {
            let Some(line) = self.lines.next_line().await? else {
                self.drained = true;
                info!(source = %self.name, lines = self.line_no, "Event input drained");
                break;
            };
            self.line_no += 1;

            if let Some(event) = parse_event_line(self.line_no, &line)? {
                return Ok(event);
            }
        }

        std::future::pending().await
    }
}
