//! Console tables and CSV records for the ratings and pairings outputs.

use stanza::style::{HAlign, Header, MinWidth, Styles};
use stanza::table::{Col, Row, Table};
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount, EnumIter};

use crate::csv::Record;
use crate::pairing::{Assignment, Candidate, Pairing};
use crate::rating::PlayerRating;
use crate::stats::SliceExt;

const NO_DATA: &str = "insufficient data";

#[derive(Debug, Clone, Copy, Display, EnumCount, EnumIter)]
pub enum RatingColumn {
    #[strum(serialize = "Player Name")]
    PlayerName,
    #[strum(serialize = "SA Player ID")]
    PlayerId,
    Rounds,
    #[strum(serialize = "Rounds/Week")]
    RoundsPerWeek,
    #[strum(serialize = "HI")]
    HandicapIndex,
    #[strum(serialize = "Avg Gap")]
    AvgGap,
    Performance,
    Trend,
    Consistency,
    #[strum(serialize = "CVS (ALL)")]
    CvsAll,
    #[strum(serialize = "CVS (HOME)")]
    CvsHome,
    Blended,
    Basis,
    Role,
    Type,
    Location,
    Note,
}

impl From<RatingColumn> for usize {
    fn from(column: RatingColumn) -> Self {
        column as usize
    }
}

#[derive(Debug, Clone, Copy, Display, EnumCount, EnumIter)]
pub enum PairingColumn {
    Pair,
    Anchor,
    #[strum(serialize = "Anchor Score")]
    AnchorScore,
    #[strum(serialize = "Anchor CH")]
    AnchorCh,
    #[strum(serialize = "Anchor Perf")]
    AnchorPerf,
    Gunner,
    #[strum(serialize = "Gunner Score")]
    GunnerScore,
    #[strum(serialize = "Gunner CH")]
    GunnerCh,
    #[strum(serialize = "Gunner Perf")]
    GunnerPerf,
    #[strum(serialize = "CH Diff")]
    ChDiff,
    #[strum(serialize = "Pair Combined Score")]
    CombinedScore,
    Constraint,
    #[strum(serialize = "Location Rec")]
    LocationRec,
}

impl From<PairingColumn> for usize {
    fn from(column: PairingColumn) -> Self {
        column as usize
    }
}

pub fn rating_record(rating: &PlayerRating) -> Record {
    let mut record = Record::with_capacity(RatingColumn::COUNT);
    record.set(RatingColumn::PlayerName, &rating.player_name);
    record.set(RatingColumn::PlayerId, &rating.player_id);
    record.set(RatingColumn::Rounds, rating.rounds_all);
    record.set(RatingColumn::RoundsPerWeek, format!("{:.2}", rating.rounds_per_week));
    record.set(RatingColumn::HandicapIndex, fmt_opt(rating.current_handicap_index, 1));
    record.set(RatingColumn::AvgGap, fmt_opt(rating.avg_gap_all, 2));
    record.set(RatingColumn::Performance, fmt_label(&rating.performance));
    record.set(RatingColumn::Trend, fmt_label(&rating.trend));
    record.set(RatingColumn::Consistency, fmt_label(&rating.consistency));
    record.set(RatingColumn::CvsAll, fmt_opt(rating.cvs_all, 1));
    record.set(RatingColumn::CvsHome, fmt_opt(rating.cvs_home, 1));
    record.set(
        RatingColumn::Blended,
        fmt_opt(rating.blended.map(|blended| blended.value), 1),
    );
    record.set(
        RatingColumn::Basis,
        rating
            .blended
            .map_or_else(|| "-".to_string(), |blended| blended.basis.to_string()),
    );
    record.set(RatingColumn::Role, fmt_label(&rating.role));
    record.set(RatingColumn::Type, fmt_label(&rating.player_type));
    record.set(
        RatingColumn::Location,
        rating
            .location
            .map_or_else(|| NO_DATA.to_string(), |location| location.to_string()),
    );
    record.set(RatingColumn::Note, rating.exclusion_reason().unwrap_or(""));
    record
}

pub fn pairing_record(number: usize, pairing: &Pairing) -> Record {
    let mut record = Record::with_capacity(PairingColumn::COUNT);
    record.set(PairingColumn::Pair, number);
    record.set(PairingColumn::Anchor, &pairing.anchor.player_name);
    record.set(PairingColumn::AnchorScore, format!("{:.1}", pairing.anchor.blended));
    record.set(PairingColumn::AnchorCh, pairing.anchor.course_handicap);
    record.set(PairingColumn::AnchorPerf, fmt_label(&pairing.anchor.performance));
    record.set(PairingColumn::Gunner, &pairing.gunner.player_name);
    record.set(PairingColumn::GunnerScore, format!("{:.1}", pairing.gunner.blended));
    record.set(PairingColumn::GunnerCh, pairing.gunner.course_handicap);
    record.set(PairingColumn::GunnerPerf, fmt_label(&pairing.gunner.performance));
    record.set(PairingColumn::ChDiff, pairing.handicap_gap());
    record.set(PairingColumn::CombinedScore, format!("{:.1}", pairing.combined_score()));
    record.set(PairingColumn::Constraint, pairing.kind);
    record.set(PairingColumn::LocationRec, pairing.location_recommendation());
    record
}

pub fn tabulate_ratings(ratings: &[PlayerRating]) -> Table {
    let mut table = Table::default()
        .with_cols(
            RatingColumn::iter()
                .map(|column| {
                    let align = match column {
                        RatingColumn::PlayerName
                        | RatingColumn::PlayerId
                        | RatingColumn::Note => HAlign::Left,
                        _ => HAlign::Right,
                    };
                    Col::new(Styles::default().with(MinWidth(6)).with(align))
                })
                .collect(),
        )
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            RatingColumn::iter()
                .map(|column| column.to_string().into())
                .collect(),
        ));
    for rating in ratings {
        table.push_row(Row::new(
            Styles::default(),
            rating_record(rating).into_iter().map(Into::into).collect(),
        ));
    }
    table
}

pub fn tabulate_pairings(assignment: &Assignment) -> Table {
    let mut table = Table::default()
        .with_cols(
            PairingColumn::iter()
                .map(|column| {
                    let align = match column {
                        PairingColumn::Anchor | PairingColumn::Gunner => HAlign::Left,
                        _ => HAlign::Right,
                    };
                    Col::new(Styles::default().with(MinWidth(6)).with(align))
                })
                .collect(),
        )
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            PairingColumn::iter()
                .map(|column| column.to_string().into())
                .collect(),
        ));
    for (index, pairing) in assignment.pairings.iter().enumerate() {
        table.push_row(Row::new(
            Styles::default(),
            pairing_record(index + 1, pairing)
                .into_iter()
                .map(Into::into)
                .collect(),
        ));
    }
    table
}

pub fn tabulate_reserves(reserves: &[Candidate]) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(20)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Left)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)),
            vec!["Reserve".into(), "Blended".into(), "CH".into(), "Role".into()],
        ));
    for reserve in reserves {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                reserve.player_name.clone().into(),
                format!("{:.1}", reserve.blended).into(),
                format!("{}", reserve.course_handicap).into(),
                reserve.role.to_string().into(),
            ],
        ));
    }
    table
}

/// Pair balance at a glance: score spread and handicap gaps across the table.
pub fn tabulate_balance(pairings: &[Pairing]) -> Table {
    let scores: Vec<f64> = pairings.iter().map(Pairing::combined_score).collect();
    let gaps: Vec<f64> = pairings
        .iter()
        .map(|pairing| pairing.handicap_gap() as f64)
        .collect();
    let fold = |values: &[f64], pick: fn(f64, f64) -> f64| {
        values.iter().copied().reduce(pick).unwrap_or_default()
    };
    let rows = [
        ("Average pair score", fmt_opt(scores.mean(), 1)),
        ("Min pair score", format!("{:.1}", fold(&scores, f64::min))),
        ("Max pair score", format!("{:.1}", fold(&scores, f64::max))),
        ("Average CH diff", fmt_opt(gaps.mean(), 1)),
        ("Min CH diff", format!("{:.0}", fold(&gaps, f64::min))),
    ];
    let mut table = Table::default().with_cols(vec![
        Col::new(Styles::default().with(MinWidth(20)).with(HAlign::Left)),
        Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Right)),
    ]);
    for (label, value) in rows {
        table.push_row(Row::new(
            Styles::default(),
            vec![label.into(), value.into()],
        ));
    }
    table
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |value| format!("{value:.precision$}"))
}

fn fmt_label(label: &Option<impl ToString>) -> String {
    label
        .as_ref()
        .map_or_else(|| "-".to_string(), ToString::to_string)
}
