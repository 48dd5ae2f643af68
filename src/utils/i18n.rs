use tracing::warn;

/// Locales shipped in `locales/`
const SUPPORTED_LOCALES: [&str; 1] = ["en"];

/// Switch the locale used for user-facing messages
pub fn set_locale(locale: &str) {
    // "en-US" and "en_US" both select the "en" catalog
    let language = locale
        .split(['-', '_'])
        .next()
        .unwrap_or(locale)
        .to_lowercase();

    if SUPPORTED_LOCALES.contains(&language.as_str()) {
        rust_i18n::set_locale(&language);
    } else {
        warn!("Unsupported locale {}, falling back to en", locale);
        rust_i18n::set_locale("en");
    }
}
