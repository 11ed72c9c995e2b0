//! Record-id based deduplication.
//!
//! Listing pages repeat themselves: FL.ru cards contain nested elements that
//! match the card selector, and live listings shift while being paged, so the
//! same project can show up twice in one page or on two consecutive pages.
//! Ids are derived from URLs, so deduplicating by id also deduplicates by URL.

use crate::models::Offer;
use itertools::Itertools;
use std::collections::HashSet;

/// Keep the first offer for each id, preserving order.
pub fn unique_by_id(offers: Vec<Offer>) -> Vec<Offer> {
    offers.into_iter().unique_by(|o| o.id.clone()).collect()
}

/// Ids already produced during the current run.
#[derive(Debug, Default)]
pub struct Seen {
    ids: HashSet<String>,
}

impl Seen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop offers whose id was seen in an earlier batch (or earlier in this
    /// one) and remember the rest.
    pub fn retain_new(&mut self, batch: Vec<Offer>) -> Vec<Offer> {
        batch
            .into_iter()
            .filter(|o| self.ids.insert(o.id.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Site;

    fn offer(title: &str, url: &str) -> Offer {
        Offer::new(Site::FlRu, title, url)
    }

    #[test]
    fn test_unique_by_id_keeps_first_occurrence() {
        let offers = vec![
            offer("first", "https://www.fl.ru/projects/1/a.html"),
            offer("second", "https://www.fl.ru/projects/2/b.html"),
            offer("first again", "https://www.fl.ru/projects/1/a.html"),
        ];

        let unique = unique_by_id(offers);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].title, "first");
        assert_eq!(unique[1].title, "second");
    }

    #[test]
    fn test_seen_filters_across_batches() {
        let mut seen = Seen::new();

        let page1 = seen.retain_new(vec![
            offer("a", "https://kwork.ru/projects/1"),
            offer("b", "https://kwork.ru/projects/2"),
        ]);
        let page2 = seen.retain_new(vec![
            offer("b", "https://kwork.ru/projects/2"),
            offer("c", "https://kwork.ru/projects/3"),
            offer("c", "https://kwork.ru/projects/3"),
        ]);

        assert_eq!(page1.len(), 2);
        assert_eq!(page2.len(), 1);
        assert_eq!(page2[0].title, "c");
        assert_eq!(seen.len(), 3);
    }
}
