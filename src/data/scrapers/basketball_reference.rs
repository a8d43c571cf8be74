//! Basketball Reference season page scraper
//!
//! Extracts the advanced team statistics table (`table#advanced-team`) as
//! raw header and cell text. Column selection and cleaning happen in
//! `features::efficiency`.

use super::{get_text, http_client, with_retry, EfficiencySource};
use crate::{Config, DataSource, MoneylineError, Result};
use scraper::{ElementRef, Html, Selector};
use std::path::{Path, PathBuf};

const TABLE_ID: &str = "advanced-team";

/// Table as scraped: one header row and the body rows in page order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Index of the first column with this header
    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Client for basketball-reference.com
pub struct BasketballReferenceClient {
    client: reqwest::blocking::Client,
    url: String,
    max_attempts: u32,
}

impl BasketballReferenceClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(BasketballReferenceClient {
            client: http_client(config.data.timeout_secs)?,
            url: config.efficiency_url(),
            max_attempts: config.data.max_attempts,
        })
    }
}

impl EfficiencySource for BasketballReferenceClient {
    fn source(&self) -> DataSource {
        DataSource::BasketballReference
    }

    fn fetch_table(&self) -> Result<RawTable> {
        log::info!("Fetching efficiency table from {}", self.url);

        let html = with_retry(
            || {
                let request = self
                    .client
                    .get(&self.url)
                    .header("Accept", "text/html,application/xhtml+xml");
                get_text(request, DataSource::BasketballReference)
            },
            self.max_attempts,
        )?;

        parse_advanced_table(&html)
    }
}

/// A saved season page
pub struct SeasonPageFile {
    path: PathBuf,
}

impl SeasonPageFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        SeasonPageFile {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl EfficiencySource for SeasonPageFile {
    fn source(&self) -> DataSource {
        DataSource::BasketballReference
    }

    fn fetch_table(&self) -> Result<RawTable> {
        log::info!("Reading efficiency table from {}", self.path.display());
        let html = std::fs::read_to_string(&self.path)?;
        parse_advanced_table(&html)
    }
}

/// Parse the advanced team table from a season page.
///
/// The site ships several tables inside HTML comments; when the table is not
/// found in the live markup the comment markers are stripped and the page is
/// parsed again.
pub fn parse_advanced_table(html: &str) -> Result<RawTable> {
    let document = Html::parse_document(html);
    if let Some(table) = extract_table(&document) {
        return Ok(table);
    }

    log::debug!("Table #{} not in live markup, checking comments", TABLE_ID);
    let uncommented = html.replace("<!--", "").replace("-->", "");
    let document = Html::parse_document(&uncommented);

    extract_table(&document).ok_or_else(|| MoneylineError::Fetch {
        data_source: DataSource::BasketballReference,
        message: format!("no table with id {:?} on page", TABLE_ID),
    })
}

fn extract_table(document: &Html) -> Option<RawTable> {
    let table_selector = Selector::parse("table#advanced-team").unwrap();
    let header_selector = Selector::parse("thead tr").unwrap();
    let body_selector = Selector::parse("tbody tr, tfoot tr").unwrap();
    let cell_selector = Selector::parse("th, td").unwrap();

    let table = document.select(&table_selector).next()?;

    // The first thead row holds grouping labels; the column names are in the last
    let header_row = table.select(&header_selector).last()?;
    let headers = cell_texts(&header_row, &cell_selector);

    let rows: Vec<Vec<String>> = table
        .select(&body_selector)
        .filter(|row| !is_repeated_header(row))
        .map(|row| cell_texts(&row, &cell_selector))
        .filter(|cells| !cells.is_empty())
        .collect();

    log::info!("Parsed {} rows from #{}", rows.len(), TABLE_ID);
    Some(RawTable { headers, rows })
}

fn cell_texts(row: &ElementRef, cell_selector: &Selector) -> Vec<String> {
    row.select(cell_selector)
        .map(|c| c.text().collect::<String>().trim().to_string())
        .collect()
}

/// Long tables repeat their header rows inside the body
fn is_repeated_header(row: &ElementRef) -> bool {
    row.value()
        .attr("class")
        .map(|c| c.split_whitespace().any(|c| c == "thead" || c == "over_header"))
        .unwrap_or(false)
}
