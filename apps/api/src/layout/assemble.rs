//! Document Assembler — pure mapping from a proposal record to layout blocks.
//!
//! Section order and numbering are fixed; every numbered section renders its
//! heading even when the underlying data is empty. The assumptions appendix
//! is the single exception: it is omitted entirely when no assumptions exist.
//! A divider separates adjacent sections unless a forced page break already
//! does (after the cover, after Planning).
//!
//! Cost aggregates are rendered verbatim — nothing here sums line items or
//! cross-checks totals; the proposal record is the sole source of truth.
//!
//! Pure and synchronous: reads its input, allocates its output, no I/O.

use crate::layout::blocks::{
    Block, CellAlign, ColWidth, Column, Document, LabeledValue, PageBand, PageDecor, TextStyle,
    TotalsEmphasis, TotalsRow,
};
use crate::layout::format::{
    dash, fmt_date_opt, fmt_eur_opt, fmt_int, fmt_num, EM_DASH,
};
use crate::models::proposal::{Meta, Proposal};

/// Display default when `btw_percentage` is absent.
const DEFAULT_BTW_PERCENTAGE: f64 = 21.0;

/// Maps a proposal to its document: cover, ten numbered sections, optional
/// assumptions appendix, plus page-decoration rules.
pub fn assemble(proposal: &Proposal) -> Document {
    let meta = proposal.meta.clone().unwrap_or_default();

    let mut content = Vec::new();
    content.extend(cover(&meta));
    content.extend(management_summary(proposal));
    content.push(Block::Divider);
    content.extend(doelgroep(proposal));
    content.push(Block::Divider);
    content.extend(steekproef(proposal));
    content.push(Block::Divider);
    content.extend(methodologie(proposal));
    content.push(Block::Divider);
    content.extend(planning(proposal));
    content.push(Block::PageBreak);
    content.extend(kosten(proposal));
    content.push(Block::Divider);
    content.extend(deliverables(proposal));
    content.push(Block::Divider);
    content.extend(verantwoordelijkheden(proposal));
    content.push(Block::Divider);
    content.extend(kwaliteitsgaranties(proposal));
    content.push(Block::Divider);
    content.extend(voorwaarden_disclaimers(proposal));
    if !proposal.aannames.is_empty() {
        content.push(Block::Divider);
        content.push(Block::Assumptions {
            intro: "De volgende aannames zijn gemaakt bij het opstellen van deze offerte:"
                .to_string(),
            items: proposal.aannames.clone(),
        });
    }

    Document {
        content,
        decor: page_decor(&meta),
    }
}

fn section_title(number: u8, title: &str) -> Block {
    Block::SectionTitle {
        number,
        title: title.to_string(),
    }
}

fn paragraph(text: impl Into<String>, style: TextStyle) -> Block {
    Block::Paragraph {
        text: text.into(),
        style,
    }
}

fn cover(meta: &Meta) -> Vec<Block> {
    vec![
        Block::Cover {
            bureau_naam: meta
                .bureau_naam
                .clone()
                .unwrap_or_else(|| "[BUREAUNAAM]".to_string()),
            bureau_tagline: meta
                .bureau_tagline
                .clone()
                .unwrap_or_else(|| "Intelligent Respondent Recruitment".to_string()),
            projectnaam: meta
                .projectnaam
                .clone()
                .unwrap_or_else(|| "Projectnaam".to_string()),
            details: vec![
                LabeledValue::new("Offertenummer", dash(meta.offerte_nummer.as_deref())),
                LabeledValue::new("Datum", fmt_date_opt(meta.offerte_datum.as_deref())),
                LabeledValue::new("Geldig tot", fmt_date_opt(meta.geldig_tot.as_deref())),
                LabeledValue::new("Opdrachtgever", dash(meta.opdrachtgever.as_deref())),
                LabeledValue::new("Contactpersoon", dash(meta.contactpersoon.as_deref())),
            ],
        },
        Block::PageBreak,
    ]
}

fn management_summary(proposal: &Proposal) -> Vec<Block> {
    vec![
        section_title(1, "Management Summary"),
        paragraph(
            dash(proposal.management_summary.as_deref()),
            TextStyle::Body,
        ),
    ]
}

fn doelgroep(proposal: &Proposal) -> Vec<Block> {
    let dg = proposal.doelgroep.clone().unwrap_or_default();
    let mut blocks = vec![
        section_title(2, "Doelgroep & Screening"),
        paragraph(dash(dg.omschrijving.as_deref()), TextStyle::Body),
    ];
    if !dg.screeningcriteria.is_empty() {
        blocks.push(paragraph("Screeningcriteria:", TextStyle::BodyBold));
        blocks.push(Block::BulletList {
            items: dg.screeningcriteria,
        });
    }
    blocks.push(Block::Callout {
        label: "Geschatte Incidence Rate".to_string(),
        value: dash(dg.geschatte_incidence_rate.as_deref()),
        note: dg.ir_toelichting.unwrap_or_default(),
    });
    blocks
}

fn steekproef(proposal: &Proposal) -> Vec<Block> {
    let sp = proposal.steekproef.clone().unwrap_or_default();
    let mut blocks = vec![
        section_title(3, "Steekproefopzet"),
        paragraph(
            format!(
                "Totaal aantal completes: {}",
                fmt_int(sp.totaal_completes)
            ),
            TextStyle::Lead,
        ),
    ];
    if !sp.landen.is_empty() {
        blocks.push(Block::Table {
            columns: vec![
                Column::new("Land", ColWidth::Fill, CellAlign::Left),
                Column::new("Completes", ColWidth::Fixed(80), CellAlign::Right),
                Column::new("Taal", ColWidth::Fill, CellAlign::Left),
            ],
            rows: sp
                .landen
                .iter()
                .map(|l| {
                    vec![
                        dash(l.land.as_deref()),
                        fmt_int(l.completes),
                        dash(l.taal.as_deref()),
                    ]
                })
                .collect(),
        });
    }
    if !sp.quotas.is_empty() {
        blocks.push(paragraph("Quota-verdeling:", TextStyle::BodyBold));
        blocks.push(Block::Table {
            columns: vec![
                Column::new("Variabele", ColWidth::Fixed(150), CellAlign::Left),
                Column::new("Verdeling", ColWidth::Fill, CellAlign::Left),
            ],
            rows: sp
                .quotas
                .iter()
                .map(|q| vec![dash(q.variabele.as_deref()), dash(q.verdeling.as_deref())])
                .collect(),
        });
    }
    if let Some(opmerkingen) = sp.opmerkingen {
        blocks.push(paragraph(opmerkingen, TextStyle::SmallNote));
    }
    blocks
}

fn methodologie(proposal: &Proposal) -> Vec<Block> {
    let m = proposal.methodologie.clone().unwrap_or_default();
    let loi = m
        .loi_minuten
        .map(|v| format!("{} minuten", fmt_num(v)))
        .unwrap_or_else(|| EM_DASH.to_string());
    let mut blocks = vec![
        section_title(4, "Methodologie"),
        Block::LabelValueTable {
            rows: vec![
                LabeledValue::new("Onderzoekstype", dash(m.onderzoekstype.as_deref())),
                LabeledValue::new("Lengte interview (LOI)", loi),
            ],
        },
    ];
    if let Some(wervingsaanpak) = m.wervingsaanpak {
        blocks.push(paragraph("Wervingsaanpak:", TextStyle::BodyBold));
        blocks.push(paragraph(wervingsaanpak, TextStyle::Body));
    }
    if !m.kwaliteitsmaatregelen.is_empty() {
        blocks.push(paragraph("Kwaliteitsmaatregelen:", TextStyle::BodyBold));
        blocks.push(Block::BulletList {
            items: m.kwaliteitsmaatregelen,
        });
    }
    blocks
}

fn planning(proposal: &Proposal) -> Vec<Block> {
    let p = proposal.planning.clone().unwrap_or_default();
    let mut blocks = vec![
        section_title(5, "Planning"),
        paragraph(
            format!(
                "Totale doorlooptijd: {} werkdagen",
                fmt_int(p.totale_doorlooptijd_werkdagen)
            ),
            TextStyle::Lead,
        ),
    ];
    if !p.fases.is_empty() {
        blocks.push(Block::Table {
            columns: vec![
                Column::new("Fase", ColWidth::Fixed(140), CellAlign::Left),
                Column::new("Duur", ColWidth::Fixed(80), CellAlign::Left),
                Column::new("Omschrijving", ColWidth::Fill, CellAlign::Left),
            ],
            rows: p
                .fases
                .iter()
                .map(|f| {
                    vec![
                        dash(f.fase.as_deref()),
                        dash(f.duur.as_deref()),
                        dash(f.omschrijving.as_deref()),
                    ]
                })
                .collect(),
        });
    }
    blocks.push(Block::LabelValueTable {
        rows: vec![
            LabeledValue::new(
                "Verwachte start",
                fmt_date_opt(p.verwachte_startdatum.as_deref()),
            ),
            LabeledValue::new(
                "Verwachte oplevering",
                fmt_date_opt(p.verwachte_opleverdatum.as_deref()),
            ),
        ],
    });
    blocks
}

fn kosten(proposal: &Proposal) -> Vec<Block> {
    let k = proposal.kosten.clone().unwrap_or_default();
    let mut blocks = vec![section_title(6, "Kostenoverzicht")];

    if !k.eenmalige_kosten.is_empty() {
        blocks.push(paragraph("Eenmalige kosten", TextStyle::BodyBold));
        blocks.push(Block::Table {
            columns: vec![
                Column::new("Omschrijving", ColWidth::Fixed(150), CellAlign::Left),
                Column::new("Toelichting", ColWidth::Fill, CellAlign::Left),
                Column::new("Bedrag", ColWidth::Fixed(90), CellAlign::Right),
            ],
            rows: k
                .eenmalige_kosten
                .iter()
                .map(|ek| {
                    vec![
                        dash(ek.omschrijving.as_deref()),
                        dash(ek.toelichting.as_deref()),
                        fmt_eur_opt(ek.bedrag),
                    ]
                })
                .collect(),
        });
    }

    if !k.variabele_kosten.is_empty() {
        blocks.push(paragraph("Variabele kosten (per land)", TextStyle::BodyBold));
        blocks.push(Block::Table {
            columns: vec![
                Column::new("Land", ColWidth::Fill, CellAlign::Left),
                Column::new("CPI", ColWidth::Fixed(70), CellAlign::Right),
                Column::new("Incentive", ColWidth::Fixed(70), CellAlign::Right),
                Column::new("Completes", ColWidth::Fixed(65), CellAlign::Right),
                Column::new("Subtotaal", ColWidth::Fixed(85), CellAlign::Right),
            ],
            rows: k
                .variabele_kosten
                .iter()
                .map(|vk| {
                    vec![
                        dash(vk.land.as_deref()),
                        fmt_eur_opt(vk.cpi),
                        fmt_eur_opt(vk.incentive_per_respondent),
                        fmt_int(vk.aantal_completes),
                        fmt_eur_opt(vk.subtotaal),
                    ]
                })
                .collect(),
        });
    }

    // Aggregates as supplied — no recomputation, no cross-check.
    let btw_pct = k.btw_percentage.unwrap_or(DEFAULT_BTW_PERCENTAGE);
    blocks.push(Block::TotalsTable {
        rows: vec![
            TotalsRow::new(
                "Subtotaal eenmalig",
                fmt_eur_opt(k.subtotaal_eenmalig),
                TotalsEmphasis::Normal,
            ),
            TotalsRow::new(
                "Subtotaal variabel",
                fmt_eur_opt(k.subtotaal_variabel),
                TotalsEmphasis::Normal,
            ),
            TotalsRow::new(
                "Totaal exclusief BTW",
                fmt_eur_opt(k.totaal_excl_btw),
                TotalsEmphasis::Strong,
            ),
            TotalsRow::new(
                format!("BTW ({}%)", fmt_num(btw_pct)),
                fmt_eur_opt(k.btw_bedrag),
                TotalsEmphasis::Normal,
            ),
            TotalsRow::new(
                "Totaal inclusief BTW",
                fmt_eur_opt(k.totaal_incl_btw),
                TotalsEmphasis::Grand,
            ),
        ],
    });

    if let Some(btw_opmerking) = k.btw_opmerking {
        blocks.push(paragraph(btw_opmerking, TextStyle::SmallNote));
    }
    blocks
}

fn deliverables(proposal: &Proposal) -> Vec<Block> {
    let mut blocks = vec![section_title(7, "Deliverables")];
    if !proposal.deliverables.is_empty() {
        blocks.push(Block::BulletList {
            items: proposal.deliverables.clone(),
        });
    }
    blocks
}

fn verantwoordelijkheden(proposal: &Proposal) -> Vec<Block> {
    let v = proposal.verantwoordelijkheden.clone().unwrap_or_default();
    let mut left = Vec::new();
    if !v.bureau.is_empty() {
        left.push(paragraph("Ons bureau", TextStyle::BodyBold));
        left.push(Block::BulletList { items: v.bureau });
    }
    let mut right = Vec::new();
    if !v.opdrachtgever.is_empty() {
        right.push(paragraph("Opdrachtgever", TextStyle::BodyBold));
        right.push(Block::BulletList {
            items: v.opdrachtgever,
        });
    }
    vec![
        section_title(8, "Verantwoordelijkheden"),
        Block::TwoColumn { left, right },
    ]
}

fn kwaliteitsgaranties(proposal: &Proposal) -> Vec<Block> {
    let mut blocks = vec![section_title(9, "Kwaliteitsgaranties")];
    if !proposal.kwaliteitsgaranties.is_empty() {
        blocks.push(Block::BulletList {
            items: proposal.kwaliteitsgaranties.clone(),
        });
    }
    blocks
}

fn voorwaarden_disclaimers(proposal: &Proposal) -> Vec<Block> {
    let mut blocks = vec![section_title(10, "Voorwaarden & Disclaimers")];
    if !proposal.voorwaarden.is_empty() {
        blocks.push(paragraph("Voorwaarden:", TextStyle::BodyBold));
        blocks.push(Block::BulletList {
            items: proposal.voorwaarden.clone(),
        });
    }
    if !proposal.disclaimers.is_empty() {
        blocks.push(paragraph("Disclaimers:", TextStyle::BodyBold));
        blocks.push(Block::BulletList {
            items: proposal.disclaimers.clone(),
        });
    }
    blocks
}

fn page_decor(meta: &Meta) -> PageDecor {
    PageDecor {
        header: PageBand {
            left: meta.bureau_naam.clone().unwrap_or_default(),
            right: meta.projectnaam.clone().unwrap_or_default(),
            skip_first_page: true,
        },
        footer: PageBand {
            left: format!(
                "{} | Vertrouwelijk",
                meta.offerte_nummer.clone().unwrap_or_default()
            ),
            right: "{page} / {pages}".to_string(),
            skip_first_page: true,
        },
    }
}
