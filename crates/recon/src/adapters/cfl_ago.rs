use serde_json::Value;

use super::ancient_ports::chronique_uri;
use super::{field, link_pleiades, required, RawFormat, SourceAdapter};
use crate::error::ItemError;
use crate::item::Item;
use crate::namespace::NamespaceTable;

/// Chronique des fouilles agora list (CSV).
pub struct CflAgoAdapter;

impl SourceAdapter for CflAgoAdapter {
    fn name(&self) -> &'static str {
        "cflago"
    }

    fn format(&self) -> RawFormat {
        RawFormat::Csv
    }

    fn parse(&self, raw: &Value, namespaces: &NamespaceTable) -> Result<Item, ItemError> {
        let label = required(raw, "Full_name")?;
        let mut item = Item::new(chronique_uri(&field(raw, "Id"))?, label);
        link_pleiades(&mut item, namespaces, &field(raw, "Pleiades_id"))?;
        Ok(item)
    }
}
