//! Parsing of delimited item-id strings into filter sets.

use crate::model::ItemId;

/// Parse a comma-delimited list of item ids.
///
/// Each token is trimmed and parsed as an integer. Malformed tokens are
/// dropped instead of failing the query, so `"1,abc,3"` yields the same set
/// as `"1,3"`. Duplicate ids are collapsed, keeping the first occurrence.
#[must_use]
pub fn parse_item_ids(raw: &str) -> Vec<ItemId> {
    let mut ids: Vec<ItemId> = Vec::new();
    for token in raw.split(',') {
        if let Ok(id) = token.trim().parse::<i64>() {
            let id = ItemId(id);
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_list() {
        assert_eq!(parse_item_ids("1,2,3"), vec![ItemId(1), ItemId(2), ItemId(3)]);
    }

    #[test]
    fn trims_whitespace() {
        assert_eq!(parse_item_ids(" 1 , 2 ,3 "), vec![ItemId(1), ItemId(2), ItemId(3)]);
    }

    #[test]
    fn drops_malformed_tokens() {
        assert_eq!(parse_item_ids("1,abc,3"), parse_item_ids("1,3"));
        assert_eq!(parse_item_ids("1,2.5,3"), vec![ItemId(1), ItemId(3)]);
    }

    #[test]
    fn empty_and_fully_malformed_input_yield_empty_set() {
        assert!(parse_item_ids("").is_empty());
        assert!(parse_item_ids("a,b,c").is_empty());
        assert!(parse_item_ids(" , ,").is_empty());
    }

    #[test]
    fn collapses_duplicates() {
        assert_eq!(parse_item_ids("2,1,2,1"), vec![ItemId(2), ItemId(1)]);
    }
}
