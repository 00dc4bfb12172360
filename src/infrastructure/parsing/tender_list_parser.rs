//! Tender listing page parser
//!
//! Locates record cards in the listing markup and runs the per-field
//! extraction pipeline over each one. The portal's markup has no stable
//! schema, so every extractor tolerates its target element being absent:
//! a missing element means a missing field, never a placeholder value.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use super::context::ListParseContext;
use super::error::{ParsingError, ParsingResult};
use super::text::clean_text;
use crate::domain::tender::{TenderRecord, fields};

/// Label phrase that precedes the submission deadline block.
const DEADLINE_LABEL: &str = "Date limite de remise des plis";

/// Label phrase that precedes the execution location block.
const LOCATION_LABEL: &str = "Lieu d'exécution";

/// Label token opening the issuing-body line.
const ENTITE_LABEL: &str = "Entité";

/// The portal truncates the visible location list at three entries; the
/// extractor mirrors that cap. The untruncated list lives in the tooltip.
const VISIBLE_LOCATION_CAP: usize = 3;

/// Parser for the tender listing page.
pub struct TenderListParser {
    base_url: Url,

    /// Record cards: content columns that carry an executable navigation
    /// attribute. Decorative columns without one are not tenders.
    card_selector: Selector,
    reference_selector: Selector,
    vertical_text_selector: Selector,
    inner_span_selector: Selector,
    objet_selector: Selector,
    strong_selector: Selector,
    title_card_selector: Selector,
    estimation_selector: Selector,
    label_block_selector: Selector,
    date_fragment_selector: Selector,
    info_bulle_selector: Selector,
    line_break_selector: Selector,
    certificate_selector: Selector,

    /// Matches the inline navigation handler, `location.href="<path>"`.
    onclick_href: Regex,
}

impl TenderListParser {
    pub fn new(context: &ListParseContext) -> ParsingResult<Self> {
        let base_url = Url::parse(&context.base_url)
            .map_err(|e| ParsingError::invalid_base_url(&context.base_url, e))?;

        const ONCLICK_HREF: &str = r#"location\.href="([^"]+)""#;
        let onclick_href = Regex::new(ONCLICK_HREF)
            .map_err(|e| ParsingError::invalid_pattern(ONCLICK_HREF, e))?;

        Ok(Self {
            base_url,
            card_selector: compile("div.contentColumn[onclick]")?,
            reference_selector: compile(r#"span[id*="referencem"]"#)?,
            vertical_text_selector: compile("span.verticalText")?,
            inner_span_selector: compile("span")?,
            objet_selector: compile("div.p-objet")?,
            strong_selector: compile("strong")?,
            title_card_selector: compile("div.title.p-card")?,
            estimation_selector: compile("span.estim-mad")?,
            label_block_selector: compile("div.limita.p-card")?,
            date_fragment_selector: compile(r#"div[style*="vertical-align"] span[style*="display"]"#)?,
            info_bulle_selector: compile("div.info-bulle")?,
            line_break_selector: compile("br")?,
            certificate_selector: compile("img.certificat")?,
            onclick_href,
        })
    }

    /// Locate record cards in document order. Zero cards is a valid outcome,
    /// not an error.
    pub fn locate_cards<'a>(&self, html: &'a Html) -> Vec<ElementRef<'a>> {
        html.select(&self.card_selector).collect()
    }

    /// Locate every card and run the extraction pipeline on each.
    ///
    /// Per-card extraction never fails the batch: a malformed card simply
    /// yields a sparser record.
    pub fn extract_tenders(&self, html: &Html) -> Vec<TenderRecord> {
        let cards = self.locate_cards(html);
        debug!("found {} tender cards", cards.len());

        cards
            .iter()
            .enumerate()
            .map(|(index, card)| {
                debug!("extracting tender card {}/{}", index + 1, cards.len());
                self.extract_tender_from_card(*card)
            })
            .collect()
    }

    /// Apply the fixed extractor sequence to one record card.
    pub fn extract_tender_from_card(&self, card: ElementRef<'_>) -> TenderRecord {
        let mut record = TenderRecord::new();

        self.extract_url(card, &mut record);
        self.extract_reference(card, &mut record);
        self.extract_type(card, &mut record);
        self.extract_objet(card, &mut record);
        self.extract_entite(card, &mut record);
        self.extract_estimation(card, &mut record);
        self.extract_deadline(card, &mut record);
        self.extract_location(card, &mut record);
        self.extract_certification(card, &mut record);

        record
    }

    fn extract_url(&self, card: ElementRef<'_>, record: &mut TenderRecord) {
        let Some(onclick) = card.value().attr("onclick") else {
            return;
        };
        let Some(path) = self
            .onclick_href
            .captures(onclick)
            .and_then(|captures| captures.get(1))
        else {
            return;
        };

        match self.base_url.join(path.as_str()) {
            Ok(resolved) => record.insert(fields::URL, resolved.to_string()),
            Err(e) => warn!("could not resolve detail URL '{}': {}", path.as_str(), e),
        }
    }

    fn extract_reference(&self, card: ElementRef<'_>, record: &mut TenderRecord) {
        if let Some(span) = card.select(&self.reference_selector).next() {
            let reference = clean_text(&span.text().collect::<String>());
            if !reference.is_empty() {
                record.insert(fields::REFERENCE, reference);
            }
        }
    }

    /// The short tender type (AOO, AOR, ...) sits in a vertical-text label;
    /// its long form rides along as the label's descriptive attribute.
    fn extract_type(&self, card: ElementRef<'_>, record: &mut TenderRecord) {
        let Some(vertical) = card.select(&self.vertical_text_selector).next() else {
            return;
        };
        let Some(inner) = vertical.select(&self.inner_span_selector).next() else {
            return;
        };

        let tender_type = clean_text(&inner.text().collect::<String>());
        if !tender_type.is_empty() {
            record.insert(fields::TYPE, tender_type);
        }
        if let Some(title) = inner.value().attr("title") {
            let description = clean_text(title);
            if !description.is_empty() {
                record.insert(fields::TYPE_DESCRIPTION, description);
            }
        }
    }

    /// Subject line, with the embedded emphasis label removed so the field
    /// label does not leak into the value.
    fn extract_objet(&self, card: ElementRef<'_>, record: &mut TenderRecord) {
        if let Some(objet) = card.select(&self.objet_selector).next() {
            let text = self.text_excluding(objet, &self.strong_selector);
            if !text.is_empty() {
                record.insert(fields::OBJET, text);
            }
        }
    }

    /// Issuing body. The titled container must actually open with the label
    /// token; a container without it is some other title line and is skipped.
    fn extract_entite(&self, card: ElementRef<'_>, record: &mut TenderRecord) {
        let Some(title_card) = card.select(&self.title_card_selector).next() else {
            return;
        };
        let has_label = title_card.select(&self.strong_selector).next().is_some();
        let text = clean_text(&title_card.text().collect::<String>());
        if !has_label || !text.contains(ENTITE_LABEL) {
            return;
        }

        let value = clean_text(&text.replace(ENTITE_LABEL, "").replace(':', ""));
        if !value.is_empty() {
            record.insert(fields::ENTITE, value);
        }
    }

    fn extract_estimation(&self, card: ElementRef<'_>, record: &mut TenderRecord) {
        if let Some(span) = card.select(&self.estimation_selector).next() {
            let estimation = clean_text(&span.text().collect::<String>());
            if !estimation.is_empty() {
                record.insert(fields::ESTIMATION, estimation);
            }
        }
    }

    /// Deadline date and time, split across styled fragments in the block
    /// that follows the label. Fragments are de-duplicated and space-joined.
    fn extract_deadline(&self, card: ElementRef<'_>, record: &mut TenderRecord) {
        let Some(value_block) = self.next_block_after_label(card, DEADLINE_LABEL) else {
            return;
        };

        let mut parts: Vec<String> = Vec::new();
        for fragment in value_block.select(&self.date_fragment_selector) {
            let text = clean_text(&fragment.text().collect::<String>());
            if !text.is_empty() && !parts.contains(&text) {
                parts.push(text);
            }
        }

        if !parts.is_empty() {
            record.insert(fields::DEADLINE, parts.join(" "));
        }
    }

    /// Execution locations. The visible list is the text fragments sitting
    /// just before each line break, capped at three entries like the portal
    /// renders them; the tooltip carries the untruncated list.
    fn extract_location(&self, card: ElementRef<'_>, record: &mut TenderRecord) {
        let Some(value_block) = self.next_block_after_label(card, LOCATION_LABEL) else {
            return;
        };

        if let Some(bulle) = value_block.select(&self.info_bulle_selector).next() {
            let full = clean_text(&bulle.text().collect::<String>());
            if !full.is_empty() {
                record.insert(fields::LOCATION_FULL, full);
            }
        }

        let mut visible: Vec<String> = Vec::new();
        for line_break in value_block.select(&self.line_break_selector) {
            if let Some(text) = line_break.prev_sibling().and_then(|n| n.value().as_text()) {
                let text = clean_text(text);
                if !text.is_empty() {
                    visible.push(text);
                }
            }
        }

        if !visible.is_empty() {
            let joined = visible
                .iter()
                .take(VISIBLE_LOCATION_CAP)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            record.insert(fields::LOCATION, joined);
        }
    }

    fn extract_certification(&self, card: ElementRef<'_>, record: &mut TenderRecord) {
        if let Some(img) = card.select(&self.certificate_selector).next() {
            if let Some(title) = img.value().attr("title") {
                let requirement = clean_text(title);
                if !requirement.is_empty() {
                    record.insert(fields::RESPONSE_TYPE, requirement);
                }
            }
        }
    }

    /// Label-then-next-sibling scan: find the first label block whose cleaned
    /// text contains `label`, and return the block that follows it. The
    /// portal renders label and value as consecutive blocks of the same
    /// class, so stopping at the first match avoids picking up a later,
    /// unrelated occurrence of the same phrase.
    fn next_block_after_label<'a>(
        &self,
        card: ElementRef<'a>,
        label: &str,
    ) -> Option<ElementRef<'a>> {
        let blocks: Vec<ElementRef<'a>> = card.select(&self.label_block_selector).collect();
        let position = blocks
            .iter()
            .position(|block| clean_text(&block.text().collect::<String>()).contains(label))?;
        blocks.get(position + 1).copied()
    }

    /// Cleaned text content of `root` with the subtrees matching `excluded`
    /// left out.
    fn text_excluding(&self, root: ElementRef<'_>, excluded: &Selector) -> String {
        let skip: Vec<_> = root.select(excluded).map(|e| e.id()).collect();
        if skip.is_empty() {
            return clean_text(&root.text().collect::<String>());
        }

        let mut raw = String::new();
        for node in root.descendants() {
            if let Some(text) = node.value().as_text() {
                if node.ancestors().any(|ancestor| skip.contains(&ancestor.id())) {
                    continue;
                }
                raw.push_str(text);
            }
        }
        clean_text(&raw)
    }
}

fn compile(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(selector, e))
}
