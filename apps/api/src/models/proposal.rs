//! Proposal schema — the canonical shape of an offerte record.
//!
//! The LLM produces this structure, the review UI edits it, and the document
//! assembler consumes it. Every field is optional: a thin briefing yields a
//! sparse proposal, and the renderer substitutes placeholders rather than
//! failing. Typed deserialization doubles as the schema-validation pass:
//! a response that parses as JSON but carries the wrong shape (a string where
//! an integer belongs) is a distinguished validation failure, not a parse
//! failure.
//!
//! Struct field order matches the export key order — `serde_json` preserves
//! declaration order, so exported JSON is stable.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallback filename stem when `offerte_nummer` is absent or empty.
const FALLBACK_FILENAME_STEM: &str = "offerte";

/// Why a model response could not be turned into a [`Proposal`].
///
/// `Syntax` means the text is not JSON at all (even after extraction and
/// repair); `Schema` means it is valid JSON that does not fit the proposal
/// shape. Callers surface different user messages for the two cases.
#[derive(Debug, Error)]
pub enum ProposalParseError {
    #[error("invalid JSON: {0}")]
    Syntax(serde_json::Error),

    #[error("schema mismatch: {0}")]
    Schema(serde_json::Error),
}

/// Root proposal record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Proposal {
    pub meta: Option<Meta>,
    pub management_summary: Option<String>,
    pub doelgroep: Option<Doelgroep>,
    pub steekproef: Option<Steekproef>,
    pub methodologie: Option<Methodologie>,
    pub planning: Option<Planning>,
    pub kosten: Option<Kosten>,
    pub deliverables: Vec<String>,
    pub verantwoordelijkheden: Option<Verantwoordelijkheden>,
    pub kwaliteitsgaranties: Vec<String>,
    pub voorwaarden: Vec<String>,
    pub disclaimers: Vec<String>,
    /// Assumptions the model made where the briefing was silent. Each entry is
    /// a single string, by convention `Categorie: omschrijving`.
    pub aannames: Vec<String>,
}

/// Identifying details shown on the cover page and in page decorations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Meta {
    pub bureau_naam: Option<String>,
    pub bureau_tagline: Option<String>,
    pub projectnaam: Option<String>,
    /// Unique per proposal; also the source of the export filename slug.
    pub offerte_nummer: Option<String>,
    pub offerte_datum: Option<String>,
    pub geldig_tot: Option<String>,
    pub opdrachtgever: Option<String>,
    pub contactpersoon: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Doelgroep {
    pub omschrijving: Option<String>,
    pub screeningcriteria: Vec<String>,
    /// Percentage-like label, not guaranteed numeric ("ca. 15%").
    pub geschatte_incidence_rate: Option<String>,
    pub ir_toelichting: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Steekproef {
    pub totaal_completes: Option<u32>,
    pub landen: Vec<Land>,
    pub quotas: Vec<Quota>,
    pub opmerkingen: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Land {
    pub land: Option<String>,
    pub completes: Option<u32>,
    pub taal: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Quota {
    pub variabele: Option<String>,
    pub verdeling: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Methodologie {
    pub onderzoekstype: Option<String>,
    pub loi_minuten: Option<f64>,
    pub wervingsaanpak: Option<String>,
    pub kwaliteitsmaatregelen: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Planning {
    pub totale_doorlooptijd_werkdagen: Option<u32>,
    pub fases: Vec<Fase>,
    pub verwachte_startdatum: Option<String>,
    pub verwachte_opleverdatum: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fase {
    pub fase: Option<String>,
    pub duur: Option<String>,
    pub omschrijving: Option<String>,
}

/// Cost breakdown. All amounts are euros.
///
/// Aggregates (`subtotaal_*`, `totaal_*`, `btw_bedrag`) are NOT required to
/// equal the sum of the line items — the model (or a user edit) is the sole
/// source of truth, and the renderer shows them verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Kosten {
    pub eenmalige_kosten: Vec<EenmaligeKost>,
    pub variabele_kosten: Vec<VariabeleKost>,
    pub subtotaal_eenmalig: Option<f64>,
    pub subtotaal_variabel: Option<f64>,
    pub totaal_excl_btw: Option<f64>,
    /// Display default is 21 when absent.
    pub btw_percentage: Option<f64>,
    pub btw_bedrag: Option<f64>,
    pub totaal_incl_btw: Option<f64>,
    pub btw_opmerking: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EenmaligeKost {
    pub omschrijving: Option<String>,
    pub toelichting: Option<String>,
    pub bedrag: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariabeleKost {
    pub land: Option<String>,
    pub cpi: Option<f64>,
    pub incentive_per_respondent: Option<f64>,
    pub aantal_completes: Option<u32>,
    pub subtotaal: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Verantwoordelijkheden {
    pub bureau: Vec<String>,
    pub opdrachtgever: Vec<String>,
}

impl Proposal {
    /// Derives the download filename stem shared by the PDF and JSON exports:
    /// `offerte_nummer` lower-cased, every character outside `[a-z0-9]`
    /// replaced by a hyphen, consecutive hyphens collapsed.
    pub fn filename_stem(&self) -> String {
        let nummer = self
            .meta
            .as_ref()
            .and_then(|m| m.offerte_nummer.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or(FALLBACK_FILENAME_STEM);

        let mut stem = String::with_capacity(nummer.len());
        for c in nummer.to_lowercase().chars() {
            let mapped = if c.is_ascii_alphanumeric() { c } else { '-' };
            if mapped == '-' && stem.ends_with('-') {
                continue;
            }
            stem.push(mapped);
        }
        stem
    }
}

/// Parses model output into a [`Proposal`], distinguishing JSON syntax errors
/// from schema mismatches.
pub fn parse_proposal(text: &str) -> Result<Proposal, ProposalParseError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(ProposalParseError::Syntax)?;
    serde_json::from_value(value).map_err(ProposalParseError::Schema)
}
