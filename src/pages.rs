//! Page-specification parsing.
//!
//! Callers address pages with the surface syntax
//! `"all" | "N" | "N,M" | "N-M" | mixed` (e.g. `"1,3-5,7"`), resolved
//! to a set of 1-based page numbers. Malformed input fails fast with
//! [`Error::InvalidPageSpecification`] rather than silently defaulting.

use crate::error::{Error, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A resolved page selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageSelection {
    /// Every page of the document.
    All,
    /// An explicit set of 1-based page numbers.
    Pages(BTreeSet<u32>),
}

impl PageSelection {
    /// Parse a page specification string.
    ///
    /// # Examples
    ///
    /// ```
    /// use tableract::pages::PageSelection;
    ///
    /// let sel = PageSelection::parse("1,3-5,7").unwrap();
    /// assert!(sel.contains(4));
    /// assert!(!sel.contains(2));
    /// assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
    /// ```
    pub fn parse(spec: &str) -> Result<Self> {
        let trimmed = spec.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_page_spec(spec, "empty specification"));
        }
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        let mut pages = BTreeSet::new();
        for part in trimmed.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(Error::invalid_page_spec(spec, "empty list entry"));
            }
            match part.split_once('-') {
                Some((start, end)) => {
                    let start = parse_page_number(spec, start)?;
                    let end = parse_page_number(spec, end)?;
                    if end < start {
                        return Err(Error::invalid_page_spec(
                            spec,
                            format!("descending range '{}-{}'", start, end),
                        ));
                    }
                    pages.extend(start..=end);
                },
                None => {
                    pages.insert(parse_page_number(spec, part)?);
                },
            }
        }
        Ok(PageSelection::Pages(pages))
    }

    /// Build a selection from explicit page numbers.
    pub fn from_pages(pages: impl IntoIterator<Item = u32>) -> Self {
        PageSelection::Pages(pages.into_iter().collect())
    }

    /// Check whether a page is selected.
    pub fn contains(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Pages(pages) => pages.contains(&page),
        }
    }

    /// The explicit page set, or `None` for an "all" selection.
    pub fn pages(&self) -> Option<&BTreeSet<u32>> {
        match self {
            PageSelection::All => None,
            PageSelection::Pages(pages) => Some(pages),
        }
    }

    /// True for an explicit selection with no pages in it.
    pub fn is_empty(&self) -> bool {
        matches!(self, PageSelection::Pages(pages) if pages.is_empty())
    }
}

fn parse_page_number(spec: &str, token: &str) -> Result<u32> {
    let token = token.trim();
    let page: u32 = token
        .parse()
        .map_err(|_| Error::invalid_page_spec(spec, format!("'{}' is not a page number", token)))?;
    if page == 0 {
        return Err(Error::invalid_page_spec(spec, "pages are 1-based; 0 is not valid"));
    }
    Ok(page)
}

impl FromStr for PageSelection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PageSelection::parse(s)
    }
}

impl fmt::Display for PageSelection {
    /// Renders the canonical comma form (`"all"` or `"1,3,4,5,7"`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageSelection::All => write!(f, "all"),
            PageSelection::Pages(pages) => {
                let mut first = true;
                for page in pages {
                    if !first {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", page)?;
                    first = false;
                }
                Ok(())
            },
        }
    }
}
