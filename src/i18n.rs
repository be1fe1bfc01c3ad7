use log::debug;

/// Locales with a file under `locales/`. The first one is the fallback.
const SUPPORTED_LOCALES: &[&str] = &["en", "fr"];

pub fn update_locale(requested: &str) {
    let locale = supported_locale(requested);
    debug!("locale {requested:?} -> {locale}");
    rust_i18n::set_locale(locale);
}

/// Reduce a host tag such as `fr-FR` or `en_US` to its language and keep it
/// only if a translation ships for it.
fn supported_locale(requested: &str) -> &'static str {
    let language = requested
        .trim()
        .split(['-', '_'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|l| *l == language)
        .unwrap_or(SUPPORTED_LOCALES[0])
}

#[cfg(test)]
mod tests {
    use super::supported_locale;

    #[test]
    fn host_tags_map_to_shipped_translations() {
        assert_eq!(supported_locale("fr-FR"), "fr");
        assert_eq!(supported_locale("FR_ca"), "fr");
        assert_eq!(supported_locale("en_US"), "en");
        assert_eq!(supported_locale("de"), "en");
        assert_eq!(supported_locale("  "), "en");
    }
}
