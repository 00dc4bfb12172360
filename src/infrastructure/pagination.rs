//! Stateful pagination protocol for the portal's result listing
//!
//! The portal paginates through a server-side postback: every page embeds an
//! opaque state blob in a hidden form field, and any view change (such as
//! enlarging the page size) must echo that blob back together with the
//! identifier of the control being "activated". The blob is replayed
//! byte-for-byte; nothing in it is interpreted here.

use std::fmt;

use scraper::{Html, Selector};

use super::parsing::clean_text;

/// Hidden form field carrying the server-issued view state.
pub const PAGE_STATE_FIELD: &str = "PRADO_PAGESTATE";

/// Form field naming which server-side control a postback simulates.
pub const POSTBACK_TARGET_FIELD: &str = "PRADO_POSTBACK_TARGET";

/// Page-size control at the top of the results view. Also used as the
/// postback target when requesting a resize.
pub const PAGE_SIZE_TOP_FIELD: &str = "ctl0$CONTENU_PAGE$resultSearch$listePageSizeTop";

/// Duplicate page-size control at the bottom of the results view. The server
/// may reject a resize unless both controls carry the same value.
pub const PAGE_SIZE_BOTTOM_FIELD: &str = "ctl0$CONTENU_PAGE$resultSearch$listePageSizeBottom";

/// Summary element announcing the total result count.
const RESULT_COUNT_ELEMENT: &str = "span#ctl0_CONTENU_PAGE_resultSearch_nombreElement";

/// Opaque server-issued view state, replayed verbatim on the next request.
///
/// The blob can run to tens of kilobytes, so `Debug` prints its length
/// rather than its contents. It lives only for the duration of one fetch
/// cycle and is never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct PageState(String);

impl PageState {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageState").field("len", &self.0.len()).finish()
    }
}

/// Locate the hidden state field in a fetched page.
///
/// Returns `None` when the field is absent; callers fall back to the
/// unmodified page rather than treating this as an error.
pub fn extract_page_state(html: &Html) -> Option<PageState> {
    let selector = Selector::parse(r#"input[name="PRADO_PAGESTATE"]"#).ok()?;
    let value = html.select(&selector).next()?.value().attr("value")?;
    Some(PageState(value.to_string()))
}

/// Build the form body that asks the server to enlarge the result page.
///
/// Carries the recovered state, the postback target, and the identical page
/// size in both duplicate controls.
pub fn resize_postback_form(state: &PageState, page_size: u32) -> Vec<(&'static str, String)> {
    vec![
        (PAGE_SIZE_TOP_FIELD, page_size.to_string()),
        (PAGE_SIZE_BOTTOM_FIELD, page_size.to_string()),
        (PAGE_STATE_FIELD, state.as_str().to_string()),
        (POSTBACK_TARGET_FIELD, PAGE_SIZE_TOP_FIELD.to_string()),
    ]
}

/// Parse the total result count from the listing's summary element.
///
/// Absent or unparseable is `None`; downstream reporting is simply skipped.
pub fn extract_total_count(html: &Html) -> Option<u32> {
    let selector = Selector::parse(RESULT_COUNT_ELEMENT).ok()?;
    let text = clean_text(&html.select(&selector).next()?.text().collect::<String>());
    text.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_is_extracted_verbatim() {
        let html = Html::parse_document(
            r#"<form><input type="hidden" name="PRADO_PAGESTATE" value="abc/+== opaque blob"/></form>"#,
        );
        let state = extract_page_state(&html).unwrap();
        assert_eq!(state.as_str(), "abc/+== opaque blob");
    }

    #[test]
    fn missing_state_field_yields_none() {
        let html = Html::parse_document("<form><input type='hidden' name='other'/></form>");
        assert!(extract_page_state(&html).is_none());
    }

    #[test]
    fn resize_form_sets_both_page_size_controls_identically() {
        let state = PageState("blob".to_string());
        let form = resize_postback_form(&state, 500);

        let get = |field: &str| {
            form.iter()
                .find(|(name, _)| *name == field)
                .map(|(_, value)| value.as_str())
        };
        assert_eq!(get(PAGE_SIZE_TOP_FIELD), Some("500"));
        assert_eq!(get(PAGE_SIZE_BOTTOM_FIELD), Some("500"));
        assert_eq!(get(PAGE_STATE_FIELD), Some("blob"));
        assert_eq!(get(POSTBACK_TARGET_FIELD), Some(PAGE_SIZE_TOP_FIELD));
    }

    #[test]
    fn total_count_parses_the_summary_element() {
        let html = Html::parse_document(
            r#"<span id="ctl0_CONTENU_PAGE_resultSearch_nombreElement"> 734 </span>"#,
        );
        assert_eq!(extract_total_count(&html), Some(734));
    }

    #[test]
    fn unparseable_total_count_is_none() {
        let html = Html::parse_document(
            r#"<span id="ctl0_CONTENU_PAGE_resultSearch_nombreElement">environ 700</span>"#,
        );
        assert_eq!(extract_total_count(&html), None);
    }

    #[test]
    fn debug_output_hides_the_blob() {
        let state = PageState("x".repeat(40_000));
        let rendered = format!("{state:?}");
        assert!(rendered.contains("40000"));
        assert!(!rendered.contains("xxxx"));
    }
}
