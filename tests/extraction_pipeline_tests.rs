//! End-to-end extraction scenarios over fixture markup

use scraper::Html;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use adm_tenders::application::ScrapeSession;
use adm_tenders::domain::fields;
use adm_tenders::infrastructure::config::{AppConfig, PortalConfig};
use adm_tenders::infrastructure::http_client::HttpClientConfig;
use adm_tenders::infrastructure::output::{TenderExport, build_export};
use adm_tenders::infrastructure::parsing::{ListParseContext, TenderListParser};

const FULL_CARD: &str = r#"
<div class="contentColumn" onclick='location.href="?page=entreprise.EntrepriseDetailsConsultation&id=101"'>
  <span class="verticalText"><span title="Appel d'offres ouvert">AOO</span></span>
  <span id="ctl0_CONTENU_PAGE_resultSearch_r0_referencem">AOO 12/2025</span>
  <div class="p-objet"><strong>Objet :</strong> Travaux d'entretien du réseau autoroutier</div>
  <div class="title p-card"><strong>Entité :</strong> Direction Régionale Centre</div>
  <span class="estim-mad">1 500 000,00</span>
  <div class="limita p-card">Date limite de remise des plis</div>
  <div class="limita p-card">
    <div style="vertical-align: inherit;"><span style="display: inline;">31/12/2025</span></div>
    <div style="vertical-align: inherit;"><span style="display: inline;">10:00</span></div>
  </div>
  <div class="limita p-card">Lieu d'exécution</div>
  <div class="limita p-card">
    Casablanca<br/>Rabat<br/>Fès<br/>Oujda<br/>
    <div class="info-bulle">Casablanca, Rabat, Fès, Oujda</div>
  </div>
  <img class="certificat" title="Réponse électronique obligatoire"/>
</div>"#;

fn parse_full_card() -> adm_tenders::domain::TenderRecord {
    let html = Html::parse_document(FULL_CARD);
    let parser =
        TenderListParser::new(&ListParseContext::new("https://achats.example.test/")).unwrap();
    let cards = parser.locate_cards(&html);
    assert_eq!(cards.len(), 1);
    parser.extract_tender_from_card(cards[0])
}

#[test]
fn full_card_extracts_every_field() {
    let record = parse_full_card();

    assert_eq!(
        record.url(),
        Some("https://achats.example.test/?page=entreprise.EntrepriseDetailsConsultation&id=101")
    );
    assert_eq!(record.reference(), Some("AOO 12/2025"));
    assert_eq!(record.get(fields::TYPE), Some("AOO"));
    assert_eq!(
        record.get(fields::TYPE_DESCRIPTION),
        Some("Appel d'offres ouvert")
    );
    assert_eq!(
        record.get(fields::OBJET),
        Some("Travaux d'entretien du réseau autoroutier")
    );
    assert_eq!(record.get(fields::ENTITE), Some("Direction Régionale Centre"));
    assert_eq!(record.get(fields::ESTIMATION), Some("1 500 000,00"));
    assert_eq!(
        record.get(fields::RESPONSE_TYPE),
        Some("Réponse électronique obligatoire")
    );
}

#[test]
fn deadline_fragments_join_date_and_time() {
    let record = parse_full_card();
    assert_eq!(record.get(fields::DEADLINE), Some("31/12/2025 10:00"));
}

#[test]
fn visible_locations_cap_at_three_while_tooltip_keeps_all() {
    let record = parse_full_card();
    assert_eq!(record.get(fields::LOCATION), Some("Casablanca, Rabat, Fès"));
    assert_eq!(
        record.get(fields::LOCATION_FULL),
        Some("Casablanca, Rabat, Fès, Oujda")
    );
}

#[test]
fn export_round_trips_with_identical_field_maps() {
    let mut set = adm_tenders::domain::ResultSet::new();
    set.push(parse_full_card()).unwrap();

    let export = build_export(&set, "https://achats.example.test/list");
    let rendered = serde_json::to_string_pretty(&export).unwrap();
    let reread: TenderExport = serde_json::from_str(&rendered).unwrap();

    assert_eq!(reread.tenders.len(), 1);
    let original: Vec<(&str, &str)> = export.tenders[0].iter().collect();
    let returned: Vec<(&str, &str)> = reread.tenders[0].iter().collect();
    assert_eq!(original, returned);
}

fn test_config(server: &MockServer) -> AppConfig {
    AppConfig {
        portal: PortalConfig {
            base_url: format!("{}/", server.uri()),
            list_url: format!("{}/tenders", server.uri()),
            page_size: 500,
        },
        http: HttpClientConfig {
            max_requests_per_second: 100,
            max_retries: 1,
            retry_base_delay_ms: 10,
            ..Default::default()
        },
        ..Default::default()
    }
}

#[tokio::test]
async fn duplicate_reference_keeps_the_first_occurrence() {
    let server = MockServer::start().await;

    let listing = r#"<html><body>
      <form><input type="hidden" name="PRADO_PAGESTATE" value="blob"/></form>
    </body></html>"#;
    let enlarged = r#"<html><body>
      <span id="ctl0_CONTENU_PAGE_resultSearch_nombreElement">2</span>
      <div class="contentColumn" onclick='location.href="?page=d&id=1"'>
        <span id="r0_referencem">AOO-1</span>
      </div>
      <div class="contentColumn" onclick='location.href="?page=d&id=2"'>
        <span id="r1_referencem">AOO-1</span>
      </div>
    </body></html>"#;

    Mock::given(method("GET"))
        .and(path("/tenders"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tenders"))
        .respond_with(ResponseTemplate::new(200).set_body_string(enlarged))
        .mount(&server)
        .await;

    let session = ScrapeSession::new(test_config(&server)).unwrap();
    let outcome = session.run().await.unwrap();

    assert_eq!(outcome.tenders.len(), 1);
    let record = &outcome.tenders.records()[0];
    assert_eq!(record.reference(), Some("AOO-1"));
    assert_eq!(record.url(), Some(format!("{}/?page=d&id=1", server.uri()).as_str()));
    assert_eq!(outcome.total_results, Some(2));
}

#[tokio::test]
async fn detail_enrichment_merges_rows_and_skips_failing_links() {
    let server = MockServer::start().await;

    let listing = r#"<html><body>
      <div class="contentColumn" onclick='location.href="?page=d&id=1"'>
        <span id="r0_referencem">AOO-1</span>
      </div>
      <div class="contentColumn" onclick='location.href="?page=d&id=2"'>
        <span id="r1_referencem">AOO-2</span>
      </div>
    </body></html>"#;
    let detail = r#"<html><body><table>
      <tr><td>Caution provisoire</td><td>10 000,00 DH</td></tr>
      <tr><td>Référence</td><td>should not clobber</td></tr>
    </table></body></html>"#;

    Mock::given(method("GET"))
        .and(path("/tenders"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("id", "2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let session = ScrapeSession::new(test_config(&server)).unwrap();
    let mut outcome = session.run().await.unwrap();
    assert_eq!(outcome.tenders.len(), 2);

    session
        .enrich_with_details(&mut outcome.tenders)
        .await
        .unwrap();

    let first = &outcome.tenders.records()[0];
    assert_eq!(first.get("Caution provisoire"), Some("10 000,00 DH"));
    // listing-extracted fields win over detail rows reusing the same label
    assert_eq!(first.reference(), Some("AOO-1"));

    // the failing link is skipped, not fatal, and stays unenriched
    let second = &outcome.tenders.records()[1];
    assert_eq!(second.get("Caution provisoire"), None);
    assert_eq!(second.reference(), Some("AOO-2"));
}
