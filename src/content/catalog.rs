use super::types::ContentTable;
use crate::error::ContentError;
use crate::rewards::GameMeta;

/// Every content table found in a games directory, in file-name order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tables: Vec<ContentTable>,
}

impl Catalog {
    pub fn new(tables: Vec<ContentTable>) -> Self {
        Self { tables }
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ContentTable> {
        self.tables.iter()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.tables.iter().position(|t| t.meta.id == id)
    }

    pub fn table(&self, id: &str) -> Result<&ContentTable, ContentError> {
        self.position(id)
            .map(|i| &self.tables[i])
            .ok_or_else(|| ContentError::UnknownGame(id.to_string()))
    }

    /// Reward metadata for a game, if the catalog knows it.
    pub fn lookup(&self, id: &str) -> Option<GameMeta> {
        self.position(id).map(|i| self.tables[i].game_meta())
    }

    /// The game that follows `id` in catalog order.
    pub fn next_after(&self, id: &str) -> Option<&ContentTable> {
        self.position(id).and_then(|i| self.tables.get(i + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::parse_table;
    use std::path::Path;

    fn table(id: &str, coins: Option<u32>) -> ContentTable {
        let coins = coins.map(|c| format!("coins = {c}\n")).unwrap_or_default();
        let content = format!(
            "[meta]\nid = \"{id}\"\ntitle = \"{id}\"\n{coins}\n[[entry]]\nprompt = \"?\"\n  [[entry.choice]]\n  text = \"A\"\n  correct = true\n"
        );
        parse_table(&content, Path::new("mem.toml")).unwrap()
    }

    #[test]
    fn test_lookup_and_next() {
        let catalog = Catalog::new(vec![table("a", Some(7)), table("b", None), table("c", None)]);

        let meta = catalog.lookup("a").unwrap();
        assert_eq!(meta.coins, Some(7));
        assert_eq!(meta.xp, None);
        assert!(catalog.lookup("zzz").is_none());

        assert_eq!(catalog.next_after("a").map(|t| t.id()), Some("b"));
        assert_eq!(catalog.next_after("c").map(|t| t.id()), None);
        assert!(catalog.next_after("zzz").is_none());

        assert!(matches!(catalog.table("zzz"), Err(ContentError::UnknownGame(_))));
    }
}
