//! # Loss Report
//!
//! Explanatory chapter describing the loss method, its intermediate
//! quantities and the resulting losses along a girder. The chapter is owned
//! by the caller; the builders only append to it.
//!
//! ## Example
//!
//! ```rust
//! use psloss_core::losses::{BeamType, PsLossEngineer};
//! use psloss_core::model::samples;
//! use psloss_core::report::{report_final_losses, ReportChapter};
//! use psloss_core::status::StatusCenter;
//! use psloss_core::units::DisplayUnits;
//!
//! let model = samples::pretensioned_i_girder().unwrap();
//! let mut engineer = PsLossEngineer::default();
//! let mut status = StatusCenter::new();
//! let mut chapter = ReportChapter::new("Prestress Losses");
//! report_final_losses(
//!     &mut engineer, &model.inputs(), BeamType::IBeam, model.girders[0].key,
//!     &mut chapter, DisplayUnits::Us, &mut status,
//! ).unwrap();
//! assert!(chapter.to_text().contains("Effective prestress"));
//! ```

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::errors::{LossError, LossResult};
use crate::losses::details::{LossDetails, MethodDetails, SteelElement};
use crate::losses::engineer::{method_parameters, PsLossEngineer};
use crate::losses::parameters::BeamType;
use crate::losses::temporary::TemporaryStrandEffects;
use crate::model::keys::{EndType, GirderKey, PointOfInterest};
use crate::providers::LossInputs;
use crate::status::StatusSink;
use crate::units::{DisplayUnits, Inches, Ksi};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportTable {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn new(title: impl Into<String>, columns: &[&str]) -> Self {
        ReportTable {
            title: title.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn render(&self, out: &mut String) {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }
        let line = |cells: &[String], out: &mut String| {
            let text: Vec<String> = cells
                .iter()
                .zip(&widths)
                .map(|(c, w)| format!("{:>width$}", c, width = *w))
                .collect();
            let _ = writeln!(out, "  {}", text.join("  "));
        };

        let _ = writeln!(out, "{}", self.title);
        line(&self.columns, out);
        let total: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        let _ = writeln!(out, "  {}", "-".repeat(total));
        for row in &self.rows {
            line(row, out);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ReportItem {
    Heading(String),
    Paragraph(String),
    Table(ReportTable),
}

/// Caller-owned report chapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportChapter {
    pub title: String,
    pub items: Vec<ReportItem>,
}

impl ReportChapter {
    pub fn new(title: impl Into<String>) -> Self {
        ReportChapter {
            title: title.into(),
            items: Vec::new(),
        }
    }

    pub fn heading(&mut self, text: impl Into<String>) {
        self.items.push(ReportItem::Heading(text.into()));
    }

    pub fn paragraph(&mut self, text: impl Into<String>) {
        self.items.push(ReportItem::Paragraph(text.into()));
    }

    pub fn table(&mut self, table: ReportTable) {
        self.items.push(ReportItem::Table(table));
    }

    pub fn tables(&self) -> impl Iterator<Item = &ReportTable> {
        self.items.iter().filter_map(|item| match item {
            ReportItem::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Plain text rendering.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.title);
        let _ = writeln!(out, "{}", "=".repeat(self.title.chars().count()));
        for item in &self.items {
            out.push('\n');
            match item {
                ReportItem::Heading(h) => {
                    let _ = writeln!(out, "{}", h);
                    let _ = writeln!(out, "{}", "-".repeat(h.chars().count()));
                }
                ReportItem::Paragraph(p) => {
                    let _ = writeln!(out, "{}", p);
                }
                ReportItem::Table(t) => t.render(&mut out),
            }
        }
        out
    }
}

fn stress(units: DisplayUnits, ksi: f64) -> String {
    format!("{:.2}", units.stress_value(Ksi(ksi)))
}

fn location(units: DisplayUnits, poi: &PointOfInterest) -> String {
    format!("{:.3}", units.length_value(Inches(poi.x_girder_in)))
}

fn column(label: &str, unit: &str) -> String {
    format!("{} ({})", label, unit)
}

/// POI the detailed tables are reported at: mid-span, else the middle POI.
fn reporting_poi(pois: &[PointOfInterest]) -> Option<&PointOfInterest> {
    let candidates: Vec<&PointOfInterest> = pois.iter().filter(|p| !p.attributes.closure_joint).collect();
    candidates
        .iter()
        .find(|p| p.attributes.mid_span)
        .or_else(|| candidates.get(candidates.len() / 2))
        .copied()
        .or_else(|| pois.first())
}

fn compute_all(
    engineer: &mut PsLossEngineer,
    inputs: &LossInputs<'_>,
    beam_type: BeamType,
    girder: GirderKey,
    status: &mut dyn StatusSink,
) -> LossResult<Vec<(PointOfInterest, LossDetails)>> {
    let pois = inputs.geometry.points_of_interest(girder);
    if pois.is_empty() {
        return Err(LossError::not_available(format!("points of interest on {}", girder)));
    }
    pois.into_iter()
        .map(|poi| {
            let details = engineer.compute_losses(inputs, beam_type, &poi, status)?;
            Ok((poi, details))
        })
        .collect()
}

/// Append the method description and its intermediate quantities for `girder`.
pub fn build_report(
    engineer: &mut PsLossEngineer,
    inputs: &LossInputs<'_>,
    beam_type: BeamType,
    girder: GirderKey,
    chapter: &mut ReportChapter,
    units: DisplayUnits,
    status: &mut dyn StatusSink,
) -> LossResult<()> {
    let resolved = engineer.resolve(status).clone();
    let records = match compute_all(engineer, inputs, beam_type, girder, status) {
        Ok(records) => records,
        Err(e) => {
            chapter.paragraph(format!("No results available for {}", girder));
            return Err(e);
        }
    };

    chapter.heading(format!("{} - {}", resolved.strategy.title(), girder));
    chapter.paragraph(format!(
        "Specification: {} ({}, {})",
        resolved.entry.name, resolved.method, resolved.edition
    ));
    chapter.paragraph(format!(
        "Reference: {}",
        resolved.strategy.code_reference(resolved.edition).citation()
    ));

    let pois: Vec<PointOfInterest> = records.iter().map(|(p, _)| p.clone()).collect();
    let Some(poi) = reporting_poi(&pois) else {
        return Ok(());
    };

    if resolved.strategy.is_time_step() {
        time_step_tables(engineer, inputs, girder, poi, chapter, units)?;
    } else {
        let params = method_parameters(inputs, &resolved, poi)?;
        let s = units.stress_label();
        let mut table = ReportTable::new(format!("Loss parameters at {}", units.length(Inches(poi.x_girder_in))), &["Quantity", "Value"]);
        let rows: Vec<(String, String)> = vec![
            ("Aps (in2)".to_string(), format!("{:.3}", params.aps_in2)),
            (column("fpj", s), stress(units, params.fpj_ksi)),
            ("Strand eccentricity (in)".to_string(), format!("{:.3}", params.eccentricity_in())),
            ("Ag (in2)".to_string(), format!("{:.1}", params.girder.area_in2)),
            ("Ig (in4)".to_string(), format!("{:.0}", params.girder.inertia_in4)),
            ("Relative humidity (%)".to_string(), format!("{:.0}", params.humidity)),
            ("Age at transfer (days)".to_string(), format!("{:.1}", params.transfer_age_days)),
            ("Age at hauling (days)".to_string(), format!("{:.1}", params.hauling_age_days)),
            ("Age at deck placement (days)".to_string(), format!("{:.1}", params.deck_age_days)),
            ("Final age (days)".to_string(), format!("{:.1}", params.final_age_days)),
            (column("f'ci", s), stress(units, params.fci_ksi())),
            (column("f'c", s), stress(units, params.fc_ksi())),
            (column("Eci", s), stress(units, params.eci_ksi())),
            (column("Ep", s), stress(units, params.ep_ksi())),
        ];
        for (q, v) in rows {
            table.push_row(vec![q, v]);
        }
        chapter.table(table);

        if let Some((_, details)) = records.iter().find(|(p, _)| p.id == poi.id) {
            let lines = method_quantities(&details.details, units);
            if !lines.is_empty() {
                let mut table = ReportTable::new("Method quantities", &["Quantity", "Value"]);
                for (q, v) in lines {
                    table.push_row(vec![q, v]);
                }
                chapter.table(table);
            }
        }

        let mut table = ReportTable::new(
            "Losses in the permanent strands",
            &[
                &column("Location", units.length_label()),
                &column("Before transfer", s),
                &column("After transfer", s),
                &column("At shipping", s),
                &column("After deck", s),
                &column("Final", s),
            ],
        );
        for (poi, details) in &records {
            let stages = details.stages.unwrap_or_default();
            table.push_row(vec![
                location(units, poi),
                stress(units, stages.before_transfer_ksi),
                stress(units, stages.after_transfer_ksi),
                stress(units, stages.at_shipping_ksi),
                stress(units, stages.after_deck_placement_ksi),
                stress(units, stages.final_ksi),
            ]);
        }
        chapter.table(table);
    }
    Ok(())
}

fn method_quantities(details: &MethodDetails, units: DisplayUnits) -> Vec<(String, String)> {
    let s = units.stress_label();
    let ksi = |label: &str, value: f64| (column(label, s), stress(units, value));
    let num = |label: &str, value: f64| (label.to_string(), format!("{:.4}", value));
    match details {
        MethodDetails::RefinedBefore2005(l) => vec![
            ksi("ΔfpR1", l.relaxation_at_transfer_ksi),
            ksi("ΔfpES", l.elastic_shortening_ksi),
            ksi("fcgp", l.fcgp_ksi),
            ksi("Δfcdp", l.delta_fcdp_ksi),
            ksi("ΔfpSR", l.shrinkage_ksi),
            ksi("ΔfpCR", l.creep_ksi),
            ksi("ΔfpR2", l.relaxation_after_transfer_ksi),
        ]
        .into_iter()
        .chain(temporary_quantities(l.temporary.as_ref(), units))
        .collect(),
        MethodDetails::Refined2005(l) => vec![
            ksi("ΔfpR0", l.relaxation_before_transfer_ksi),
            ksi("ΔfpES", l.elastic_shortening_ksi),
            ksi("fcgp", l.fcgp_ksi),
            num("Kid", l.kid),
            num("Kdf", l.kdf),
            num("ψb(td, ti)", l.creep_girder_deck_ti),
            num("ψb(tf, ti)", l.creep_girder_final_ti),
            num("ψb(tf, td)", l.creep_girder_final_td),
            ("εbid x 1000".to_string(), format!("{:.4}", l.shrinkage_strain_id * 1000.0)),
            ("εbdf x 1000".to_string(), format!("{:.4}", l.shrinkage_strain_df * 1000.0)),
            ksi("ΔfpSR", l.shrinkage_id_ksi),
            ksi("ΔfpCR", l.creep_id_ksi),
            ksi("ΔfpR1", l.relaxation_id_ksi),
            ksi("ΔfpSD", l.shrinkage_df_ksi),
            ksi("ΔfpCD", l.creep_df_ksi),
            ksi("ΔfpR2", l.relaxation_df_ksi),
            ksi("ΔfpSS", l.deck_shrinkage_gain_ksi),
            num("th (days)", l.hauling_age_days),
            num("ψb(th, ti)", l.creep_girder_hauling_ti),
            ("εbih x 1000".to_string(), format!("{:.4}", l.shrinkage_strain_ih * 1000.0)),
            ksi("ΔfpSRH", l.shrinkage_hauling_ksi),
            ksi("ΔfpCRH", l.creep_hauling_ksi),
            ksi("ΔfpR1H", l.relaxation_hauling_ksi),
        ]
        .into_iter()
        .chain(temporary_quantities(l.temporary.as_ref(), units))
        .collect(),
        MethodDetails::Approximate(l) => {
            let mut rows = vec![
                ("Beam type".to_string(), l.beam_type.to_string()),
                num("PPR", l.ppr),
                ksi("ΔfpES", l.elastic_shortening_ksi),
                ksi("ΔfpLT", l.time_dependent_ksi),
            ];
            if let (Some(gh), Some(gst)) = (l.gamma_h, l.gamma_st) {
                rows.push(num("γh", gh));
                rows.push(num("γst", gst));
            }
            rows
        }
        MethodDetails::LumpSum(_) | MethodDetails::NoPrestress | MethodDetails::TimeStep(_) => Vec::new(),
    }
}

fn temporary_quantities(temporary: Option<&TemporaryStrandEffects>, units: DisplayUnits) -> Vec<(String, String)> {
    let Some(t) = temporary else {
        return Vec::new();
    };
    let s = units.stress_label();
    let ksi = |label: &str, value: f64| (column(label, s), stress(units, value));
    let mut rows = vec![
        ("Temporary strands".to_string(), t.usage.label().to_string()),
        ksi("fpjTTS", t.fpj_ksi),
    ];
    if t.usage.is_post_tensioned() {
        rows.push(ksi("ΔfpF TTS", t.friction_ksi));
        rows.push(ksi("ΔfpA TTS", t.anchor_set_ksi));
    }
    rows.push(ksi("ΔfpES TTS", t.elastic_shortening_ksi));
    rows.push(ksi("fpt TTS", t.fpt_ksi));
    if t.usage.is_post_tensioned() {
        rows.push(ksi("ΔfpPT", t.pt_shortening_ksi));
    }
    rows.push(ksi("fptr", t.fptr_ksi));
    rows.push(("Ptr (kip)".to_string(), format!("{:.2}", t.removal_force_kip)));
    rows.push(ksi("Δfptr", t.removal_gain_ksi));
    rows
}

fn time_step_tables(
    engineer: &PsLossEngineer,
    inputs: &LossInputs<'_>,
    girder: GirderKey,
    poi: &PointOfInterest,
    chapter: &mut ReportChapter,
    units: DisplayUnits,
) -> LossResult<()> {
    let engine = engineer.time_step_engine();
    let s = units.stress_label();
    let len = units.small_length_label();

    let tendons = engine.stressed_tendons(girder);
    if !tendons.is_empty() {
        let mut table = ReportTable::new(
            "Tendon friction, anchor set and elongation",
            &[
                "Tendon",
                &column("Xset start", units.length_label()),
                &column("Xset end", units.length_label()),
                &column("Avg friction", s),
                &column("Avg anchor set", s),
                &column("Elongation start", len),
                &column("Elongation end", len),
            ],
        );
        for key in tendons {
            let (details, start, end) = engine.tendon_summary(girder, key)?;
            let xset = |end: EndType| {
                details
                    .end(end)
                    .map_or("-".to_string(), |e| format!("{:.3}", units.length_value(Inches(e.xset_in()))))
            };
            table.push_row(vec![
                key.to_string(),
                xset(EndType::Start),
                xset(EndType::End),
                stress(units, details.average_friction_loss_ksi),
                stress(units, details.average_anchor_set_loss_ksi),
                format!("{:.3}", units.small_length_value(Inches(start))),
                format!("{:.3}", units.small_length_value(Inches(end))),
            ]);
        }
        chapter.table(table);
    }

    let last = inputs
        .timeline
        .last_interval()
        .ok_or_else(|| LossError::missing_field("timeline.intervals"))?;
    let final_record = engine.get_losses(poi, last)?;
    for steel in &final_record.steel {
        let mut table = ReportTable::new(
            format!("{} at {}", steel.element, units.length(Inches(poi.x_girder_in))),
            &[
                "Interval",
                "Start (day)",
                "End (day)",
                &column("Elastic", s),
                &column("Creep", s),
                &column("Shrinkage", s),
                &column("Relaxation", s),
                &column("fpe", s),
            ],
        );
        for interval in 0..=last {
            let record = engine.get_losses(poi, interval)?;
            let (Some(ts), Some(loss)) = (record.time_step(), record.steel_loss(steel.element)) else {
                continue;
            };
            table.push_row(vec![
                interval.to_string(),
                format!("{:.1}", ts.start_day),
                format!("{:.1}", ts.end_day),
                stress(units, loss.incremental.elastic_ksi),
                stress(units, loss.incremental.creep_ksi),
                stress(units, loss.incremental.shrinkage_ksi),
                stress(units, loss.incremental.relaxation_ksi),
                stress(units, loss.fpe_ksi),
            ]);
        }
        chapter.table(table);
    }

    let residual = (0..=last)
        .filter_map(|i| engine.get_losses(poi, i).ok()?.time_step().map(|t| t.equilibrium_residual_kip.abs()))
        .fold(0.0, f64::max);
    chapter.paragraph(format!("Largest equilibrium residual: {:.2e} kip", residual));
    Ok(())
}

/// Append the final effective prestress and total loss at every POI.
pub fn report_final_losses(
    engineer: &mut PsLossEngineer,
    inputs: &LossInputs<'_>,
    beam_type: BeamType,
    girder: GirderKey,
    chapter: &mut ReportChapter,
    units: DisplayUnits,
    status: &mut dyn StatusSink,
) -> LossResult<()> {
    let records = match compute_all(engineer, inputs, beam_type, girder, status) {
        Ok(records) => records,
        Err(e) => {
            chapter.paragraph(format!("No results available for {}", girder));
            return Err(e);
        }
    };
    let s = units.stress_label();
    let mut table = ReportTable::new(
        format!("Effective prestress - {}", girder),
        &[
            &column("Location", units.length_label()),
            "Steel",
            &column("fpe", s),
            &column("Total loss", s),
        ],
    );
    for (poi, details) in &records {
        let mut any = false;
        for steel in details.steel.iter().filter(|s| s.stressed) {
            if matches!(steel.element, SteelElement::Strand(t) if !t.is_permanent()) {
                continue;
            }
            any = true;
            table.push_row(vec![
                location(units, poi),
                steel.element.to_string(),
                stress(units, steel.fpe_ksi),
                stress(units, steel.total_loss_ksi()),
            ]);
        }
        if !any {
            table.push_row(vec![location(units, poi), "-".to_string(), "-".to_string(), "-".to_string()]);
        }
    }
    chapter.table(table);
    Ok(())
}
