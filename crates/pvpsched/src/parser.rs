use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::types::{PlayerRanking, Tournament};

static ROW_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".schedule table tbody tr").expect("invalid selector: schedule rows")
});

static CELL_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    (1..=6)
        .map(|n| {
            Selector::parse(&format!("td:nth-child({n})")).expect("invalid selector: table cell")
        })
        .collect()
});

static SCHOOL_ICON_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("td:nth-child(4) img").expect("invalid selector: school icon")
});

static RE_TIMESTAMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"new Date\(([0-9]+)\)").expect("invalid regex: timestamp"));

/// A parsed HTML page.
///
/// Parsing is tolerant: malformed markup still produces a best-effort tree.
/// The tree is read-only once built.
pub struct ParsedDocument {
    html: Html,
}

impl ParsedDocument {
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }
}

impl std::fmt::Debug for ParsedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedDocument")
            .field("errors", &self.html.errors.len())
            .finish()
    }
}

/// Returns every body row of the table inside the `.schedule` container, in
/// document order.
pub fn extract_rows(document: &ParsedDocument) -> Vec<ElementRef<'_>> {
    document.html.select(&ROW_SELECTOR).collect()
}

fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

/// Trimmed text of the `n`th (1-based) cell of `row`, or an empty string when
/// the row has no such cell.
fn cell_text(row: ElementRef, n: usize) -> String {
    n.checked_sub(1)
        .and_then(|i| CELL_SELECTORS.get(i))
        .and_then(|selector| row.select(selector).next())
        .map(|cell| elem_text(cell).trim().to_string())
        .unwrap_or_default()
}

/// Recovers the epoch-millisecond digits from a `new Date(<digits>)` call
/// embedded in `text`. The digits are returned verbatim.
pub fn extract_timestamp(text: &str) -> Option<&str> {
    RE_TIMESTAMP
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn parse_ranking(row: ElementRef) -> PlayerRanking {
    // XXX: the fourth column only carries an icon; its class is the closest
    // thing to a school the markup exposes.
    let school = row
        .select(&SCHOOL_ICON_SELECTOR)
        .next()
        .and_then(|img| img.value().attr("class"))
        .map(|class| class.trim().to_string())
        .unwrap_or_default();

    PlayerRanking {
        position: cell_text(row, 1),
        name: cell_text(row, 2),
        level: cell_text(row, 3),
        school,
        wins: cell_text(row, 5),
        rating: cell_text(row, 6),
    }
}

pub fn parse_tournament(row: ElementRef) -> Tournament {
    let raw_start = cell_text(row, 3);
    let start_time = match extract_timestamp(&raw_start) {
        Some(millis) => millis.to_string(),
        None => raw_start,
    };

    Tournament {
        name: cell_text(row, 1),
        levels: cell_text(row, 2),
        start_time,
        duration: cell_text(row, 4),
    }
}

pub fn parse_rankings(document: &ParsedDocument) -> Vec<PlayerRanking> {
    let rankings: Vec<_> = extract_rows(document)
        .into_iter()
        .map(parse_ranking)
        .collect();
    log::debug!("Parsed {} ranking row(s)", rankings.len());
    rankings
}

pub fn parse_tournaments(document: &ParsedDocument) -> Vec<Tournament> {
    let tournaments: Vec<_> = extract_rows(document)
        .into_iter()
        .map(parse_tournament)
        .collect();
    log::debug!("Parsed {} tournament row(s)", tournaments.len());
    tournaments
}
