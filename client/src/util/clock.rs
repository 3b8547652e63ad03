//! Local date/time strings for the result metadata.

use workflow::feedback::generated_label;

/// "Generated on <date> at <time>" in the browser's locale.
pub fn generated_now() -> String {
    #[cfg(feature = "csr")]
    {
        let locale = web_sys::window()
            .and_then(|w| w.navigator().language())
            .unwrap_or_else(|| "en-US".to_owned());
        let now = js_sys::Date::new_0();
        let date: String = now.to_locale_date_string(&locale, &wasm_bindgen::JsValue::UNDEFINED).into();
        let time: String = now.to_locale_time_string(&locale).into();
        generated_label(&date, &time)
    }
    #[cfg(not(feature = "csr"))]
    {
        generated_label("today", "now")
    }
}
