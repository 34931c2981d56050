//! Problem-instance table: the ordered item list plus the capacity bound.
//!
//! Text format: first data line is `n capacity`, followed by n lines of
//! `weight value`. Blank lines and `#` comments are skipped.

use anyhow::{Context, Result, bail};
use std::path::Path;

/// Masks are u64, so an instance can hold at most 64 items.
pub const MAX_ITEMS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub weight: i64,
    pub value: i64,
}

#[derive(Debug, Clone)]
pub struct Problem {
    items: Vec<Item>,
    capacity: i64,
}

impl Problem {
    pub fn new(items: Vec<Item>, capacity: i64) -> Result<Problem> {
        if items.len() > MAX_ITEMS {
            bail!("instance has {} items, limit is {}", items.len(), MAX_ITEMS);
        }
        if capacity < 0 {
            bail!("capacity must be non-negative, got {}", capacity);
        }
        for (i, item) in items.iter().enumerate() {
            if item.weight < 0 || item.value < 0 {
                bail!(
                    "item {} has negative weight or value ({}, {})",
                    i,
                    item.weight,
                    item.value
                );
            }
        }
        Ok(Problem { items, capacity })
    }

    pub fn from_path(path: &Path) -> Result<Problem> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("open {}", path.display()))?;
        parse_instance(&text).with_context(|| format!("parse {}", path.display()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn item(&self, i: usize) -> Item {
        self.items[i]
    }

    #[inline]
    pub fn capacity(&self) -> i64 {
        self.capacity
    }

    /// Summed (weight, value) of the items selected by `mask`.
    pub fn aggregate(&self, mask: u64) -> (i64, i64) {
        let mut weight = 0;
        let mut value = 0;
        for (i, item) in self.items.iter().enumerate() {
            if mask >> i & 1 == 1 {
                weight += item.weight;
                value += item.value;
            }
        }
        (weight, value)
    }
}

pub fn parse_instance(text: &str) -> Result<Problem> {
    let mut fields = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        for tok in line.split_whitespace() {
            let v: i64 = tok
                .parse()
                .with_context(|| format!("line {}: bad integer {:?}", lineno + 1, tok))?;
            fields.push(v);
        }
    }
    if fields.len() < 2 {
        bail!("instance needs an `n capacity` header");
    }
    let n = fields[0];
    let capacity = fields[1];
    if n < 0 {
        bail!("item count must be non-negative, got {}", n);
    }
    let n = n as usize;
    if n > MAX_ITEMS {
        bail!("instance has {} items, limit is {}", n, MAX_ITEMS);
    }
    let body = &fields[2..];
    if body.len() != 2 * n {
        bail!(
            "expected {} weight/value pairs after the header, found {} numbers",
            n,
            body.len()
        );
    }
    let items = body
        .chunks_exact(2)
        .map(|c| Item {
            weight: c[0],
            value: c[1],
        })
        .collect();
    Problem::new(items, capacity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_items() {
        let p = parse_instance("# demo\n3 10\n2 3\n4 5\n6 7\n").unwrap();
        assert_eq!(p.len(), 3);
        assert_eq!(p.capacity(), 10);
        assert_eq!(p.item(1), Item { weight: 4, value: 5 });
    }

    #[test]
    fn rejects_truncated_body() {
        assert!(parse_instance("2 5\n1 1\n").is_err());
    }

    #[test]
    fn rejects_negative_capacity() {
        assert!(parse_instance("1 -3\n1 1\n").is_err());
    }

    #[test]
    fn rejects_negative_item_fields() {
        assert!(Problem::new(vec![Item { weight: -1, value: 2 }], 5).is_err());
    }

    #[test]
    fn aggregate_sums_the_selected_items() {
        let p = parse_instance("3 10\n2 3\n4 5\n6 7\n").unwrap();
        assert_eq!(p.aggregate(0b101), (8, 10));
        assert_eq!(p.aggregate(0), (0, 0));
    }

    #[test]
    fn inline_comments_are_ignored() {
        let p = parse_instance("1 4 # n cap\n2 9 # only item\n").unwrap();
        assert_eq!(p.item(0), Item { weight: 2, value: 9 });
    }
}
