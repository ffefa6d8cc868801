use serde_json::Value;

use super::{field, link_pleiades, RawFormat, SourceAdapter};
use crate::error::ItemError;
use crate::item::Item;
use crate::namespace::NamespaceTable;

pub(super) const CHRONIQUE_BASE: &str = "https://chronique.efa.gr/?r=topo_public&id=";

/// Some exports keep the HTML anchor the id was scraped from.
const CHRONIQUE_ANCHOR: &str = "GA_OPE_EDIT\" target=\"_blank\">";

/// Chronique des fouilles topography URI for a raw `Id` cell.
pub(super) fn chronique_uri(raw_id: &str) -> Result<String, ItemError> {
    let id = raw_id.rsplit(CHRONIQUE_ANCHOR).next().unwrap_or(raw_id).trim();
    if id.is_empty() {
        return Err(ItemError::malformed("missing chronique 'Id'"));
    }
    Ok(format!("{CHRONIQUE_BASE}{id}"))
}

/// Ancient Ports and Harbours (CSV, Chronique-keyed).
pub struct AncientPortsAdapter;

/// `NAME` as given; otherwise the first token of `NAME_MOD`, qualified by
/// `COUNTRY` when that is set.
fn port_label(raw: &Value) -> String {
    let name = field(raw, "NAME");
    if !name.is_empty() {
        return name;
    }
    let mut label = field(raw, "NAME_MOD")
        .split(['.', ',', '?'])
        .map(str::trim)
        .find(|token| !token.is_empty())
        .unwrap_or_default()
        .to_string();
    let country = field(raw, "COUNTRY");
    if !label.is_empty() && !country.is_empty() {
        label.push_str(&format!(", {country}"));
    }
    label
}

impl SourceAdapter for AncientPortsAdapter {
    fn name(&self) -> &'static str {
        "ancient_ports"
    }

    fn format(&self) -> RawFormat {
        RawFormat::Csv
    }

    fn parse(&self, raw: &Value, namespaces: &NamespaceTable) -> Result<Item, ItemError> {
        let label = port_label(raw);
        if label.is_empty() {
            return Err(ItemError::malformed("neither NAME nor NAME_MOD is set"));
        }
        let mut item = Item::new(chronique_uri(&field(raw, "Id"))?, label);
        link_pleiades(&mut item, namespaces, &field(raw, "Pleiades_id"))?;
        Ok(item)
    }
}
