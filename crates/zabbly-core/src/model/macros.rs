// ── User macros ──

use indexmap::IndexMap;

use zabbly_api::requests::MacroParam;

/// Normalize a macro key to the `{$NAME}` form.
///
/// A key that already starts with `{` is passed through verbatim, even if it
/// is otherwise malformed (e.g. `{BAR}` without the `$`).
pub fn normalize_macro_name(key: &str) -> String {
    if key.starts_with('{') {
        key.to_owned()
    } else {
        format!("{{${key}}}")
    }
}

/// Render a macro mapping into `host.create` entries, preserving order.
pub fn format_macros(macros: &IndexMap<String, String>) -> Vec<MacroParam> {
    macros
        .iter()
        .map(|(key, value)| MacroParam {
            name: normalize_macro_name(key),
            value: value.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn brackets_bare_keys_and_passes_bracketed_through() {
        let mut macros = IndexMap::new();
        macros.insert("FOO".to_owned(), "1".to_owned());
        macros.insert("{BAR}".to_owned(), "2".to_owned());

        assert_eq!(
            format_macros(&macros),
            vec![
                MacroParam {
                    name: "{$FOO}".into(),
                    value: "1".into(),
                },
                MacroParam {
                    name: "{BAR}".into(),
                    value: "2".into(),
                },
            ]
        );
    }

    #[test]
    fn already_normalized_is_untouched() {
        assert_eq!(normalize_macro_name("{$SNMP_COMMUNITY}"), "{$SNMP_COMMUNITY}");
        assert_eq!(normalize_macro_name("AGENT.PORT"), "{$AGENT.PORT}");
    }

    #[test]
    fn empty_mapping() {
        assert!(format_macros(&IndexMap::new()).is_empty());
    }
}
